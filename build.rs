//! Stamps the client banner with when and how it was built.

fn main() {
    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    println!("cargo:rustc-env=BUILD_DATE={}", built_at);

    // "debug" or "release"; custom profiles report the profile they inherit from
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    println!("cargo:rerun-if-changed=build.rs");
}
