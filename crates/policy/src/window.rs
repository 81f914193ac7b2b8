//! Window system detection.

use std::fmt;

/// Effective display protocol for the confined process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSystem {
    X11,
    Wayland,
    /// Both protocols are exposed.
    Any,
    None,
    /// Any other value, carried verbatim. Treated like `None`.
    Unsupported(String),
}

impl WindowSystem {
    /// Resolve the window system from an explicit override and the
    /// ambient session type.
    ///
    /// A valid override (`none`, `any`, `x11`, `wayland`) wins. Anything else
    /// falls back to the ambient hint, kept verbatim even if unrecognized.
    pub fn detect(override_value: Option<&str>, ambient: Option<&str>) -> Self {
        if let Some(value) = override_value.and_then(Self::parse_known) {
            return value;
        }
        match ambient {
            Some(hint) => Self::parse_known(hint).unwrap_or_else(|| Self::Unsupported(hint.into())),
            None => Self::None,
        }
    }

    fn parse_known(value: &str) -> Option<Self> {
        match value {
            "x11" => Some(Self::X11),
            "wayland" => Some(Self::Wayland),
            "any" => Some(Self::Any),
            "none" => Some(Self::None),
            _ => None,
        }
    }

    /// X11 socket and authority are exposed.
    pub fn allows_x11(&self) -> bool {
        matches!(self, Self::X11 | Self::Any)
    }

    /// The wayland socket is exposed.
    pub fn allows_wayland(&self) -> bool {
        matches!(self, Self::Wayland | Self::Any)
    }

    /// Neither protocol is exposed.
    pub fn is_unsupported(&self) -> bool {
        !self.allows_x11() && !self.allows_wayland()
    }
}

impl fmt::Display for WindowSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X11 => f.write_str("x11"),
            Self::Wayland => f.write_str("wayland"),
            Self::Any => f.write_str("any"),
            Self::None => f.write_str("none"),
            Self::Unsupported(value) => f.write_str(value),
        }
    }
}
