//! Emits link directives for the prebuilt Glide core engine when its
//! location is provided via `GLIDE_ENGINE_LIB_DIR`.
//!
//! With the variable unset nothing is emitted; rlib consumers defer symbol
//! resolution, and test binaries satisfy the `glide_*` symbols by linking
//! `skate-testkit` instead.

fn main() {
    println!("cargo:rerun-if-env-changed=GLIDE_ENGINE_LIB_DIR");
    if let Ok(dir) = std::env::var("GLIDE_ENGINE_LIB_DIR") {
        println!("cargo:rustc-link-search=native={dir}");
        println!("cargo:rustc-link-lib=dylib=glide_engine");
    }
}
