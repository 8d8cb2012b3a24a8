//! Locates or builds the search-plugin fixture library.

use std::env::consts::{DLL_EXTENSION, DLL_PREFIX};
use std::path::{Path, PathBuf};
use std::process::Command;

use once_cell::sync::Lazy;

/// Overrides the fixture build with a prebuilt library.
pub const SEARCH_PLUGIN_LIB_ENV: &str = "QUIRE_SEARCH_PLUGIN_LIB";

static SEARCH_PLUGIN_LIB: Lazy<PathBuf> = Lazy::new(|| {
    if let Ok(path) = std::env::var(SEARCH_PLUGIN_LIB_ENV) {
        return PathBuf::from(path);
    }

    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../quire-extension/tests/fixtures/search-plugin/Cargo.toml");
    let target_dir = Path::new(env!("CARGO_TARGET_TMPDIR")).join("search-plugin");
    let cargo = std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());

    let status = Command::new(cargo)
        .args(["build", "--quiet", "--manifest-path"])
        .arg(&manifest)
        .arg("--target-dir")
        .arg(&target_dir)
        .status()
        .expect("failed to spawn cargo");
    assert!(
        status.success(),
        "building {} failed; set {} to a prebuilt library",
        manifest.display(),
        SEARCH_PLUGIN_LIB_ENV
    );

    target_dir
        .join("debug")
        .join(format!("{DLL_PREFIX}search_plugin.{DLL_EXTENSION}"))
});

/// Path of the search-plugin cdylib, built on first use.
pub fn search_plugin_library() -> &'static Path {
    &SEARCH_PLUGIN_LIB
}
