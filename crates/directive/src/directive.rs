//! Primitive confinement directives.

use std::fmt;
use std::path::{Path, PathBuf};

/// Namespaces the backend can unshare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Net,
    Ipc,
    Pid,
    Uts,
    /// Unshared only when the host supports it.
    Cgroup,
}

/// One primitive operation for the confinement backend.
///
/// Directives are backend-neutral; rendering them into concrete flags is the
/// backend's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Directive {
    /// Writable bind of a host path.
    BindRw { source: PathBuf, target: PathBuf },
    /// Read-only bind of a host path.
    BindRo { source: PathBuf, target: PathBuf },
    /// Bind that keeps device nodes usable.
    DevBind { source: PathBuf, target: PathBuf },
    /// Empty tmpfs over the target.
    TmpfsClear(PathBuf),
    /// Replace a single file with the null device.
    NullBindFile(PathBuf),
    /// Make an existing mount point read-only.
    RemountRo(PathBuf),
    UnsetEnv(String),
    SetHostname(String),
    Unshare(Namespace),
    /// Fresh procfs.
    Proc(PathBuf),
    /// Minimal private device tree.
    DevFs(PathBuf),
    NewSession,
    DieWithParent,
    /// End of the directive list.
    Terminator,
}

impl Directive {
    pub fn bind_rw(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::BindRw {
            source: path.clone(),
            target: path,
        }
    }

    pub fn bind_ro(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::BindRo {
            source: path.clone(),
            target: path,
        }
    }

    pub fn dev_bind(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::DevBind {
            source: path.clone(),
            target: path,
        }
    }

    /// Host path a bind reads from.
    pub fn source(&self) -> Option<&Path> {
        match self {
            Self::BindRw { source, .. }
            | Self::BindRo { source, .. }
            | Self::DevBind { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Path inside the sandbox this directive places or alters, if any.
    pub fn target(&self) -> Option<&Path> {
        match self {
            Self::BindRw { target, .. }
            | Self::BindRo { target, .. }
            | Self::DevBind { target, .. } => Some(target),
            Self::TmpfsClear(path)
            | Self::NullBindFile(path)
            | Self::RemountRo(path)
            | Self::Proc(path)
            | Self::DevFs(path) => Some(path),
            Self::UnsetEnv(_)
            | Self::SetHostname(_)
            | Self::Unshare(_)
            | Self::NewSession
            | Self::DieWithParent
            | Self::Terminator => None,
        }
    }

    /// Whether this directive places or alters anything at or beneath `path`.
    pub fn touches(&self, path: &Path) -> bool {
        self.target().is_some_and(|target| target.starts_with(path))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BindRw { source, target } => {
                write!(f, "bind-rw {} -> {}", source.display(), target.display())
            }
            Self::BindRo { source, target } => {
                write!(f, "bind-ro {} -> {}", source.display(), target.display())
            }
            Self::DevBind { source, target } => {
                write!(f, "dev-bind {} -> {}", source.display(), target.display())
            }
            Self::TmpfsClear(path) => write!(f, "tmpfs {}", path.display()),
            Self::NullBindFile(path) => write!(f, "null-file {}", path.display()),
            Self::RemountRo(path) => write!(f, "remount-ro {}", path.display()),
            Self::UnsetEnv(name) => write!(f, "unsetenv {name}"),
            Self::SetHostname(name) => write!(f, "hostname {name}"),
            Self::Unshare(ns) => write!(f, "unshare {ns:?}"),
            Self::Proc(path) => write!(f, "proc {}", path.display()),
            Self::DevFs(path) => write!(f, "dev {}", path.display()),
            Self::NewSession => f.write_str("new-session"),
            Self::DieWithParent => f.write_str("die-with-parent"),
            Self::Terminator => f.write_str("--"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches_subtree() {
        let d = Directive::bind_ro("/tmp/.X11-unix");
        assert!(d.touches(Path::new("/tmp")));
        assert!(d.touches(Path::new("/tmp/.X11-unix")));
        assert!(!d.touches(Path::new("/tm")));
        assert!(!Directive::Terminator.touches(Path::new("/")));
    }

    #[test]
    fn test_display() {
        assert_eq!(Directive::TmpfsClear("/tmp".into()).to_string(), "tmpfs /tmp");
        assert_eq!(
            Directive::bind_rw("/home/u").to_string(),
            "bind-rw /home/u -> /home/u"
        );
    }
}
