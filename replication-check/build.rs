use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=PACKAGE_VERSION");
    println!("cargo:rerun-if-env-changed=FILE_VERSION");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs/heads");

    println!("cargo:rustc-env=BUILD_INFO={}", build_info());
}

/// `1.2.3+build.45.abc1234` from git, or `<FILE_VERSION>+ci` when CI
/// provides the version explicitly.
fn build_info() -> String {
    if let (Ok(_), Ok(file_ver)) = (
        std::env::var("PACKAGE_VERSION"),
        std::env::var("FILE_VERSION"),
    ) {
        return format!("{}+ci", file_ver);
    }

    let base_version = git(&["describe", "--tags", "--abbrev=0", "--match", "v[0-9]*"])
        .map(|tag| tag.trim_start_matches('v').to_string())
        .unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    let commit_count = git(&["rev-list", "--count", "HEAD"]).unwrap_or_else(|| "0".to_string());
    let commit_hash = git(&["rev-parse", "--short", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    let dirty = commit_hash != "unknown"
        && Command::new("git")
            .args(["diff", "--quiet"])
            .status()
            .map(|status| !status.success())
            .unwrap_or(false);

    format!(
        "{}+build.{}.{}{}",
        base_version,
        commit_count,
        commit_hash,
        if dirty { "-dirty" } else { "" }
    )
}

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
