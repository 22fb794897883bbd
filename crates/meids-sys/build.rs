//! Build script for meids-sys.
//!
//! The bindings themselves are hand-maintained in `src/`; this script only
//! takes care of linking. It supports two modes:
//!
//! 1. With `meids-sdk` feature: Links against the installed `MEiDS` library
//! 2. Without feature: Links nothing, the extern block is compiled out

fn main() {
    println!("cargo:rerun-if-env-changed=MEIDS_LIB_DIR");

    #[cfg(feature = "meids-sdk")]
    link_library();
}

#[cfg(feature = "meids-sdk")]
fn link_library() {
    let lib_name = match std::env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("windows") => "meIDSmain",
        _ => "MEiDS",
    };

    // Explicit override wins
    if let Ok(dir) = std::env::var("MEIDS_LIB_DIR") {
        println!("cargo:rustc-link-search=native={}", dir);
        println!("cargo:rustc-link-lib={}", lib_name);
        return;
    }

    // Try pkg-config next
    if pkg_config::probe_library("meids").is_ok() {
        return;
    }

    // Fallback to standard locations
    println!("cargo:rustc-link-lib={}", lib_name);

    let lib_paths = [
        "/usr/local/lib",
        "/usr/lib",
        "/usr/lib/x86_64-linux-gnu",
        "/usr/lib64",
    ];

    for path in lib_paths {
        if std::path::Path::new(path).join("libMEiDS.so").exists()
            || std::path::Path::new(path).join("libMEiDS.a").exists()
        {
            println!("cargo:rustc-link-search=native={}", path);
            break;
        }
    }
}
