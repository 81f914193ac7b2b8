//! Host filesystem existence checks.

use std::path::Path;

/// Answers whether a candidate grant path exists on the host.
///
/// A missing path is never an error: the directive for it is simply omitted.
pub trait PathProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostFs;

impl PathProbe for HostFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::PathProbe;
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    /// Every path exists except the ones listed as missing.
    #[derive(Debug, Default)]
    pub struct FakeFs {
        missing: HashSet<PathBuf>,
    }

    impl FakeFs {
        pub fn everything() -> Self {
            Self::default()
        }

        pub fn without(paths: &[&str]) -> Self {
            Self {
                missing: paths.iter().map(PathBuf::from).collect(),
            }
        }
    }

    impl PathProbe for FakeFs {
        fn exists(&self, path: &Path) -> bool {
            !self.missing.contains(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_fs_reports_existing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("present");
        std::fs::write(&file, b"").unwrap();

        assert!(HostFs.exists(dir.path()));
        assert!(HostFs.exists(&file));
        assert!(!HostFs.exists(&dir.path().join("absent")));
    }
}
