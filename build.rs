#![forbid(unsafe_code)]

// Embed git and toolchain details so the server can log what it was built
// from.  Builds outside a git checkout still succeed with "unknown" values.
fn main() {
    let unknown = |_| "unknown".to_string();
    set_env("GIT_BRANCH", build_data::get_git_branch().unwrap_or_else(unknown));
    set_env("GIT_COMMIT_SHORT", build_data::get_git_commit_short().unwrap_or_else(unknown));
    set_env("GIT_DIRTY", build_data::get_git_dirty().map(|d| d.to_string()).unwrap_or_else(unknown));
    // Source time rather than build time keeps builds reproducible.
    set_env("SOURCE_TIMESTAMP", build_data::get_source_time()
        .map(build_data::format_timestamp)
        .unwrap_or_else(unknown));
    set_env("RUSTC_VERSION", build_data::get_rustc_version().unwrap_or_else(unknown));
}

fn set_env(name: &str, value: String) {
    println!("cargo:rustc-env={}={}", name, value);
}
