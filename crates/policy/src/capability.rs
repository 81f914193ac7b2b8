use std::fmt;

/// How a capability behaves when no token mentions it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Style {
    /// Enabled unless explicitly negated; fails toward confinement.
    Restriction,
    /// Disabled unless explicitly named; fails toward minimal exposure.
    Grant,
}

/// Root-level areas whose visibility can be toggled with `hide<area>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    Usr,
    Bin,
    Sbin,
    Libexec,
    Lib,
    Etc,
    Tmp,
    Sys,
    Run,
    Var,
}

impl Area {
    /// Areas in the order they are compiled.
    pub const ALL: [Area; 10] = [
        Area::Usr,
        Area::Bin,
        Area::Sbin,
        Area::Libexec,
        Area::Lib,
        Area::Etc,
        Area::Sys,
        Area::Var,
        Area::Run,
        Area::Tmp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Area::Usr => "usr",
            Area::Bin => "bin",
            Area::Sbin => "sbin",
            Area::Libexec => "libexec",
            Area::Lib => "lib",
            Area::Etc => "etc",
            Area::Tmp => "tmp",
            Area::Sys => "sys",
            Area::Run => "run",
            Area::Var => "var",
        }
    }

    /// Host paths belonging to the area.
    pub fn paths(self) -> &'static [&'static str] {
        match self {
            Area::Usr => &["/usr"],
            Area::Bin => &["/bin"],
            Area::Sbin => &["/sbin"],
            Area::Libexec => &["/libexec"],
            Area::Lib => &["/lib", "/lib64", "/lib32"],
            Area::Etc => &["/etc"],
            Area::Tmp => &["/tmp"],
            Area::Sys => &["/sys"],
            Area::Run => &["/run"],
            Area::Var => &["/var"],
        }
    }
}

/// Every capability the compiler knows how to query.
///
/// Tokens outside this set are accepted by the parser and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Home is granted read-only instead of read-write.
    ProtectHome,
    IsolateNet,
    IsolateIpc,
    IsolatePid,
    IsolateUts,
    IsolateCgroup,
    NewSession,

    /// Nullify a root area.
    Hide(Area),
    HideHome,
    Ephemeral,
    AllowDev,
    AllowGpu,
    AllowUsb,
    AllowShm,
    AllowPipewire,
    AllowPulseaudio,
    AllowDconf,
    AllowDbus,
}

impl Capability {
    /// The token that names this capability.
    pub fn token(self) -> &'static str {
        match self {
            Capability::ProtectHome => "protecthome",
            Capability::IsolateNet => "isolatenet",
            Capability::IsolateIpc => "isolateipc",
            Capability::IsolatePid => "isolatepid",
            Capability::IsolateUts => "isolateuts",
            Capability::IsolateCgroup => "isolatecgroup",
            Capability::NewSession => "newsession",
            Capability::Hide(area) => match area {
                Area::Usr => "hideusr",
                Area::Bin => "hidebin",
                Area::Sbin => "hidesbin",
                Area::Libexec => "hidelibexec",
                Area::Lib => "hidelib",
                Area::Etc => "hideetc",
                Area::Tmp => "hidetmp",
                Area::Sys => "hidesys",
                Area::Run => "hiderun",
                Area::Var => "hidevar",
            },
            Capability::HideHome => "hidehome",
            Capability::Ephemeral => "ephemeral",
            Capability::AllowDev => "allowdev",
            Capability::AllowGpu => "allowgpu",
            Capability::AllowUsb => "allowusb",
            Capability::AllowShm => "allowshm",
            Capability::AllowPipewire => "allowpipewire",
            Capability::AllowPulseaudio => "allowpulseaudio",
            Capability::AllowDconf => "allowdconf",
            Capability::AllowDbus => "allowdbus",
        }
    }

    pub fn style(self) -> Style {
        match self {
            Capability::ProtectHome
            | Capability::IsolateNet
            | Capability::IsolateIpc
            | Capability::IsolatePid
            | Capability::IsolateUts
            | Capability::IsolateCgroup
            | Capability::NewSession => Style::Restriction,
            _ => Style::Grant,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hide_tokens_follow_area_names() {
        for area in Area::ALL {
            let token = Capability::Hide(area).token();
            assert_eq!(token, format!("hide{}", area.name()));
            assert_eq!(Capability::Hide(area).style(), Style::Grant);
        }
    }

    #[test]
    fn test_restrictions() {
        assert_eq!(Capability::ProtectHome.style(), Style::Restriction);
        assert_eq!(Capability::IsolateNet.style(), Style::Restriction);
        assert_eq!(Capability::AllowDbus.style(), Style::Grant);
        assert_eq!(Capability::Ephemeral.style(), Style::Grant);
    }
}
