//! Location of the persisted token file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

/// Resolve the token file path, preferring an explicit override.
///
/// Without an override the file lives in the platform data directory,
/// e.g. `~/.local/share/dsatrack/session.json` on Linux.
pub fn session_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    let dirs =
        ProjectDirs::from("", "", "dsatrack").context("Could not determine data directory")?;

    Ok(dirs.data_dir().join("session.json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let path = session_path(Some(Path::new("/tmp/tokens.json"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/tokens.json"));
    }
}
