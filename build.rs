// Build script
// Records the compiler version so the status endpoint can report it

use std::process::Command;

fn main() {
    let rustc = std::env::var("RUSTC").unwrap_or_else(|_| "rustc".to_string());

    // "rustc 1.83.0 (90b35a623 2024-11-26)" -> "1.83.0"
    let version = Command::new(rustc)
        .arg("--version")
        .output()
        .ok()
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .and_then(|s| s.split_whitespace().nth(1).map(ToString::to_string))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=STATUS_API_RUSTC_VERSION={version}");
    println!("cargo:rerun-if-env-changed=RUSTC");
    println!("cargo:rerun-if-changed=build.rs");
}
