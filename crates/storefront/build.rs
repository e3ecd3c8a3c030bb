//! Build script for storefront crate.
//!
//! Generates content-based hashes for static assets so they can be served
//! with long-lived cache headers.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    hash_asset(&static_dir, "css", "main", "CSS_HASH");
    hash_asset(&static_dir, "js", "cart", "JS_HASH");
}

/// Hash `static/<kind>/<stem>.<kind>` and copy it to
/// `static/<kind>/derived/<stem>.<hash>.<kind>`.
///
/// Sets `env_name` for use with `env!`. An empty hash means the asset is
/// missing and templates fall back to the unhashed file.
fn hash_asset(static_dir: &Path, kind: &str, stem: &str, env_name: &str) {
    let source = static_dir.join(kind).join(format!("{stem}.{kind}"));

    println!("cargo:rerun-if-changed={}", source.display());

    let content = match fs::read(&source) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", source.display());
            println!("cargo:rustc-env={env_name}=");
            return;
        }
    };

    // First 8 hex chars of SHA256
    let hash = format!("{:x}", Sha256::digest(&content));
    let short_hash = &hash[..8];

    println!("cargo:rustc-env={env_name}={short_hash}");

    let derived_dir = static_dir.join(kind).join("derived");
    fs::create_dir_all(&derived_dir).expect("Failed to create derived asset directory");

    let derived_path = derived_dir.join(format!("{stem}.{short_hash}.{kind}"));
    fs::copy(&source, &derived_path).expect("Failed to copy asset to derived directory");
}
