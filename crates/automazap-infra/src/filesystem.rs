//! Data directory layout.

use std::path::{Path, PathBuf};

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `AUTOMAZAP_DATA_DIR` environment variable
/// 2. `~/.automazap`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AUTOMAZAP_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".automazap");
    }

    // Last resort: current directory
    PathBuf::from(".automazap")
}

/// Directory holding one file per session storage key.
pub fn storage_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("storage")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_dir_is_under_data_dir() {
        let dir = storage_dir(Path::new("/tmp/az"));
        assert_eq!(dir, PathBuf::from("/tmp/az/storage"));
    }
}
