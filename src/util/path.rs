//! Path helpers for user-supplied locations.

use std::path::{Path, PathBuf};

/// Expand `~`, `$VAR` and `${VAR}` in a user-supplied path.
///
/// Unknown variables leave the path unchanged.
pub fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(&raw)
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_plain_path_when_expanding_then_unchanged() {
        assert_eq!(expand_path(Path::new("urls.txt")), PathBuf::from("urls.txt"));
    }

    #[test]
    fn given_unknown_variable_when_expanding_then_unchanged() {
        let path = Path::new("$SITETREE_SURELY_UNSET_VAR/urls.txt");
        assert_eq!(expand_path(path), path.to_path_buf());
    }

    #[test]
    fn given_home_prefix_when_expanding_then_no_tilde_left() {
        let expanded = expand_path(Path::new("~/crawl/urls.txt"));
        assert!(expanded.ends_with("crawl/urls.txt"));
    }
}
