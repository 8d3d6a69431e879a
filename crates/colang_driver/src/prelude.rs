//! Locating the standard-library prelude.

use std::path::PathBuf;

/// Probes the standard prelude locations in order and returns the first that
/// exists: `$HOME/.colang-libs/prelude.co`, then the system library
/// directories.
pub fn locate_prelude() -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(".colang-libs").join("prelude.co"));
    }
    candidates.push(PathBuf::from("/usr/local/lib/colang/prelude.co"));
    candidates.push(PathBuf::from("/usr/lib/colang/prelude.co"));
    candidates.push(PathBuf::from("/lib/colang/prelude.co"));
    candidates.into_iter().find(|path| path.exists())
}
