//! Stamps the commit and build time read by `build_info`.

use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

const GIT_HASH_VAR: &str = "RIDEPOOL_BUILD_GIT_HASH";
const TIMESTAMP_VAR: &str = "RIDEPOOL_BUILD_TIMESTAMP";

fn main() {
    for var in [GIT_HASH_VAR, TIMESTAMP_VAR, "SOURCE_DATE_EPOCH"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let commit = std::env::var(GIT_HASH_VAR)
        .ok()
        .or_else(git_commit)
        .unwrap_or_else(|| "unknown".to_string());
    let built = std::env::var(TIMESTAMP_VAR).unwrap_or_else(|_| build_time());

    println!("cargo:rustc-env={GIT_HASH_VAR}={commit}");
    println!("cargo:rustc-env={TIMESTAMP_VAR}={built}");
}

fn git_commit() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=12", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?.trim().to_string();
    (!hash.is_empty()).then_some(hash)
}

/// Unix seconds, pinned by `SOURCE_DATE_EPOCH` for reproducible builds.
fn build_time() -> String {
    let secs = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0)
        });
    format!("unix:{secs}")
}
