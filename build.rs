//! Embeds the dfo version string as `DFO_VERSION`.
use std::process::Command;

fn main() {
    // DFO_VERSION from the environment wins (release builds); otherwise ask
    // git for a describe string.
    if let Ok(version) = std::env::var("DFO_VERSION") {
        println!("cargo:rustc-env=DFO_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=DFO_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=DFO_VERSION");
}
