use std::env;
use std::process::Command;
use time::OffsetDateTime;

fn main() {
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let build_year = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|raw| raw.parse::<i64>().ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .map(|dt| dt.year())
        .unwrap_or_else(|| OffsetDateTime::now_utc().year());

    println!("cargo:rustc-env=APP_BUILD_YEAR={build_year}");

    let package_version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());
    let profile = env::var("PROFILE").unwrap_or_default();

    // Release builds report the bare version; debug builds are "-dev" unless HEAD is the tag
    let display_version = if profile == "release" || head_is_tagged(&package_version) {
        package_version
    } else {
        format!("{package_version}-dev")
    };

    println!("cargo:rustc-env=APP_VERSION_DISPLAY={display_version}");
}

fn head_is_tagged(version: &str) -> bool {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/tags");

    Command::new("git")
        .args(["describe", "--tags", "--exact-match"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .is_some_and(|tag| tag.trim() == format!("v{version}"))
}
