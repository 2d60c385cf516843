//! Build script for FridgeNutri
//!
//! Embeds a build counter, the build time and the cargo profile.

use std::fs;
use std::path::Path;

const COUNTER_FILE: &str = "build_number.txt";

fn next_build_number(path: &Path) -> u64 {
    let previous = fs::read_to_string(path)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(0);
    let next = previous + 1;

    // A read-only checkout still builds; the counter just stays put
    if let Err(e) = fs::write(path, next.to_string()) {
        println!("cargo:warning=could not update {}: {}", COUNTER_FILE, e);
    }
    next
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let build_number = next_build_number(Path::new(COUNTER_FILE));
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".into());

    println!("cargo:rustc-env=FRIDGENUTRI_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=FRIDGENUTRI_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=FRIDGENUTRI_BUILD_PROFILE={}", profile);
}
