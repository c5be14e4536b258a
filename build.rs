use std::process::Command;

/// Runs `git` with `args`, returning trimmed stdout on success.
fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
}

/// Exports `TESSERA_VERSION` for `--version`.
///
/// A build at a release tag reports the package version. Anything else
/// reports `dev@<short hash>`, with `+dirty` for uncommitted changes, or
/// `dev@unknown` outside a git checkout.
fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let version = if git(&["describe", "--exact-match", "--tags", "HEAD"]).is_some() {
        std::env::var("CARGO_PKG_VERSION").unwrap_or_default()
    } else {
        match git(&["rev-parse", "--short", "HEAD"]) {
            Some(hash) if !hash.is_empty() => {
                let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
                    .is_some_and(|s| !s.is_empty());
                if dirty {
                    format!("dev@{hash}+dirty")
                } else {
                    format!("dev@{hash}")
                }
            }
            _ => "dev@unknown".to_string(),
        }
    };

    println!("cargo:rustc-env=TESSERA_VERSION={version}");
}
