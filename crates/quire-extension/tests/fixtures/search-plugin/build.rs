fn main() {
    println!(
        "cargo:rustc-env=SEARCH_PLUGIN_COMPILED_AT={}",
        chrono::Utc::now().to_rfc3339()
    );
    println!("cargo:rerun-if-changed=src");
}
