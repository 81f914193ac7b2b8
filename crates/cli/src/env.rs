//! Environment capture.
//!
//! Every input is read once at startup into an [`Environment`] snapshot and
//! never consulted again, so nothing can change mid-resolution.

use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;

use directive::{CustomGrants, Session};
use policy::{Policy, TOKEN_DELIMITERS, WindowSystem, split_list};

pub const DEFAULTS_VAR: &str = "CONFINE_DEFAULTS";
pub const OPTIONS_VAR: &str = "CONFINE_OPTIONS";
pub const HOME_PATHS_VAR: &str = "CONFINE_HOME_PATHS";
pub const RO_PATHS_VAR: &str = "CONFINE_RO_PATHS";
pub const DEVICES_VAR: &str = "CONFINE_DEVICES";
pub const SOCKETS_VAR: &str = "CONFINE_SOCKETS";
pub const WINDOW_SYSTEM_VAR: &str = "CONFINE_WINDOW_SYSTEM";
pub const CONFIG_VAR: &str = "CONFINE_CONFIG";
pub const LOG_VAR: &str = "CONFINE_LOG";

const PATH_DELIMITERS: &[char] = &[':'];

/// Immutable snapshot of every environment input.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    vars: HashMap<String, OsString>,
}

impl Environment {
    /// Snapshot the current process environment.
    pub fn capture() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build a snapshot from explicit pairs. Non-UTF-8 names are dropped.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let vars = vars
            .into_iter()
            .filter_map(|(k, v)| k.into().into_string().ok().map(|k| (k, v.into())))
            .collect();
        Self { vars }
    }

    /// Value of `name`; unset and empty are the same.
    fn get(&self, name: &str) -> Option<&OsString> {
        self.vars.get(name).filter(|v| !v.is_empty())
    }

    fn text(&self, name: &str) -> String {
        self.get(name)
            .map(|v| v.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn path(&self, name: &str) -> Option<PathBuf> {
        self.get(name).map(PathBuf::from)
    }

    fn list(&self, name: &str, delimiters: &[char]) -> Vec<String> {
        split_list(&self.text(name), delimiters)
            .map(str::to_string)
            .collect()
    }

    /// Application defaults merged with user overrides.
    pub fn policy(&self) -> Policy {
        Policy::from_lists(&self.text(DEFAULTS_VAR), &self.text(OPTIONS_VAR))
    }

    pub fn window_system(&self) -> WindowSystem {
        let override_value = self.get(WINDOW_SYSTEM_VAR).map(|v| v.to_string_lossy());
        let ambient = self.get("XDG_SESSION_TYPE").map(|v| v.to_string_lossy());
        WindowSystem::detect(override_value.as_deref(), ambient.as_deref())
    }

    pub fn session(&self) -> Session {
        Session {
            home: self.path("HOME"),
            runtime_dir: self.path("XDG_RUNTIME_DIR"),
            xauthority: self.path("XAUTHORITY"),
            wayland_display: self
                .get("WAYLAND_DISPLAY")
                .map(|v| v.to_string_lossy().into_owned()),
        }
    }

    pub fn custom_grants(&self) -> CustomGrants {
        CustomGrants {
            home_paths: self.list(HOME_PATHS_VAR, PATH_DELIMITERS),
            ro_paths: self
                .list(RO_PATHS_VAR, PATH_DELIMITERS)
                .into_iter()
                .map(PathBuf::from)
                .collect(),
            devices: self.list(DEVICES_VAR, TOKEN_DELIMITERS),
            sockets: self.list(SOCKETS_VAR, TOKEN_DELIMITERS),
        }
    }

    pub fn config_path(&self) -> Option<PathBuf> {
        self.path(CONFIG_VAR)
    }

    pub fn log_filter(&self) -> Option<String> {
        self.get(LOG_VAR).map(|v| v.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use policy::Capability;

    fn env(pairs: &[(&str, &str)]) -> Environment {
        Environment::from_vars(pairs.iter().copied())
    }

    #[test]
    fn test_policy_merges_both_lists() {
        let env = env(&[
            (DEFAULTS_VAR, "allowgpu protecthome"),
            (OPTIONS_VAR, "noprotecthome,allowusb"),
        ]);
        let policy = env.policy();
        assert!(policy.allows(Capability::AllowGpu));
        assert!(policy.allows(Capability::AllowUsb));
        assert!(!policy.allows(Capability::ProtectHome));
    }

    #[test]
    fn test_window_system_override_and_ambient() {
        let e = env(&[(WINDOW_SYSTEM_VAR, "wayland"), ("XDG_SESSION_TYPE", "x11")]);
        assert_eq!(e.window_system(), WindowSystem::Wayland);

        let e = env(&[(WINDOW_SYSTEM_VAR, "framebuffer"), ("XDG_SESSION_TYPE", "x11")]);
        assert_eq!(e.window_system(), WindowSystem::X11);

        let e = env(&[("XDG_SESSION_TYPE", "tty")]);
        assert_eq!(e.window_system(), WindowSystem::Unsupported("tty".into()));
    }

    #[test]
    fn test_session_paths() {
        let e = env(&[
            ("HOME", "/home/u"),
            ("XDG_RUNTIME_DIR", "/run/user/1000"),
            ("WAYLAND_DISPLAY", "wayland-1"),
        ]);
        let session = e.session();
        assert_eq!(session.home, Some(PathBuf::from("/home/u")));
        assert_eq!(session.runtime_dir, Some(PathBuf::from("/run/user/1000")));
        assert_eq!(session.xauthority, None);
        assert_eq!(session.wayland_display.as_deref(), Some("wayland-1"));
    }

    #[test]
    fn test_empty_values_count_as_unset() {
        let e = env(&[("HOME", ""), (CONFIG_VAR, "")]);
        assert_eq!(e.session().home, None);
        assert_eq!(e.config_path(), None);
    }

    #[test]
    fn test_custom_grant_lists() {
        let e = env(&[
            (HOME_PATHS_VAR, ".config/app::.local/share/app"),
            (RO_PATHS_VAR, "/opt/data:/srv/shared"),
            (DEVICES_VAR, "video0, input/event3"),
            (SOCKETS_VAR, "app.sock"),
        ]);
        let custom = e.custom_grants();
        assert_eq!(custom.home_paths, vec![".config/app", ".local/share/app"]);
        assert_eq!(
            custom.ro_paths,
            vec![PathBuf::from("/opt/data"), PathBuf::from("/srv/shared")]
        );
        assert_eq!(custom.devices, vec!["video0", "input/event3"]);
        assert_eq!(custom.sockets, vec!["app.sock"]);
    }

    #[test]
    fn test_snapshot_is_detached_from_process() {
        let e = Environment::default();
        assert!(e.policy().tokens().is_empty());
        assert_eq!(e.log_filter(), None);
    }
}
