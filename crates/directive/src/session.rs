//! Ambient session description and free-form grants.

use std::path::{Path, PathBuf};

/// Default wayland socket name beneath the runtime directory.
pub const DEFAULT_WAYLAND_DISPLAY: &str = "wayland-0";

/// Paths taken from the invoking user's session.
///
/// Families whose anchor is unknown (no home, no runtime directory) are
/// skipped during compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub home: Option<PathBuf>,
    pub runtime_dir: Option<PathBuf>,
    pub xauthority: Option<PathBuf>,
    pub wayland_display: Option<String>,
}

impl Session {
    /// X authority file, falling back to `~/.Xauthority`.
    pub fn xauthority(&self) -> Option<PathBuf> {
        self.xauthority
            .clone()
            .or_else(|| self.home.as_ref().map(|home| home.join(".Xauthority")))
    }

    /// Wayland socket beneath the runtime directory, or the display
    /// itself when it is already an absolute path.
    pub fn wayland_socket(&self) -> Option<PathBuf> {
        let name = Path::new(
            self.wayland_display
                .as_deref()
                .unwrap_or(DEFAULT_WAYLAND_DISPLAY),
        );
        if name.is_absolute() {
            return Some(name.to_path_buf());
        }
        self.runtime_path(name)
    }

    pub fn runtime_path(&self, name: impl AsRef<Path>) -> Option<PathBuf> {
        self.runtime_dir
            .as_ref()
            .map(|dir| dir.join(relative(name.as_ref())))
    }

    pub fn home_path(&self, name: impl AsRef<Path>) -> Option<PathBuf> {
        self.home.as_ref().map(|home| home.join(relative(name.as_ref())))
    }
}

/// Free-form grant lists. Membership in a list is itself the grant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomGrants {
    /// Read-write paths relative to home.
    pub home_paths: Vec<String>,
    /// Absolute read-only paths.
    pub ro_paths: Vec<PathBuf>,
    /// Device names beneath `/dev`.
    pub devices: Vec<String>,
    /// Socket names beneath the runtime directory.
    pub sockets: Vec<String>,
}

/// The program that runs inside the sandbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    /// Host path granted read-only and executed.
    pub path: PathBuf,
    /// Name the confined process reports as its own.
    pub name: String,
}

impl Executable {
    /// A bare name joined onto the binary directory.
    pub fn by_name(bin_dir: impl AsRef<Path>, name: &str) -> Self {
        Self {
            path: bin_dir.as_ref().join(name),
            name: name.to_string(),
        }
    }

    /// A path used verbatim.
    pub fn by_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, name }
    }
}

/// Keep joined entries beneath their anchor.
fn relative(path: &Path) -> &Path {
    path.strip_prefix("/").unwrap_or(path)
}
