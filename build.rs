use std::process::Command;

fn main() {
    let describe = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
        .filter(|version| !version.is_empty());

    let version = match describe {
        Some(version) => version,
        None => std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "unknown".to_string()),
    };

    println!("cargo:rustc-env=GIT_DESCRIBE={version}");
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");
}
