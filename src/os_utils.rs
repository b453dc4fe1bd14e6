//! Utilities pertaining to os-level settings
//!

/// Attempt to increase open file limit to the system's hard limit on *nix-like systems
///
/// Each worker thread holds an open reader for every sample, so large multi-sample runs can
/// exceed the default soft limit. This is an optional increase so continue through all failure
/// cases without error.
///
pub fn attempt_max_open_file_limit() {
    use rlimit::Resource;

    let (soft, hard) = match Resource::NOFILE.get() {
        Ok(x) => x,
        Err(_) => return,
    };

    if soft < hard {
        rlimit::setrlimit(Resource::NOFILE, hard, hard).unwrap_or_default();
    }
}
