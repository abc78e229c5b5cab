use std::{
    process::Command,
    time::{SystemTime, UNIX_EPOCH},
};

#[path = "src/build_info.rs"]
mod build_info;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
    println!("cargo:rerun-if-changed=src/build_info.rs");

    let package_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let output = Command::new("git")
        .args(["describe", "--tags", "--dirty"])
        .output();

    let version = match output {
        Ok(o) if o.status.success() => {
            let git_output = String::from_utf8(o.stdout).unwrap_or_default();
            build_info::describe_to_version(&git_output, timestamp()).unwrap_or(package_version)
        }
        // No git or no tags: the manifest version is the plugin version
        _ => package_version,
    };

    println!("cargo:rustc-env=WEATHER_COMPACT_VERSION={}", version);
}

fn timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
