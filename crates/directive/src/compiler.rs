//! Compiles a resolved policy into an ordered directive list.
//!
//! Each access family queries the policy once and emits one kind of
//! primitive. Every candidate host path passes through the [`PathProbe`]
//! first; a missing path silently drops its directive.

use std::path::{Path, PathBuf};

use policy::{Area, Capability, Policy, PolicyContext};

use crate::{CustomGrants, Directive, Executable, Namespace, PathProbe, Plan, Sequencer, Session};

/// Hostname set inside a private UTS namespace unless overridden.
pub const DEFAULT_HOSTNAME: &str = "sandbox";

/// Resolver sockets kept visible when `/run` is hidden but the host network
/// namespace is shared.
pub const RESOLVER_DIR: &str = "/run/systemd/resolve";

pub const X11_SOCKET_DIR: &str = "/tmp/.X11-unix";
pub const SYSTEM_BUS_SOCKET: &str = "/run/dbus/system_bus_socket";
pub const SESSION_BUS_SOCKET: &str = "bus";
pub const PIPEWIRE_SOCKET: &str = "pipewire-0";
pub const PULSEAUDIO_DIR: &str = "pulse";
pub const DCONF_DIR: &str = "dconf";

const GPU_DEVICES: &[&str] = &[
    "/dev/dri",
    "/dev/nvidia0",
    "/dev/nvidiactl",
    "/dev/nvidia-modeset",
    "/dev/nvidia-uvm",
    "/dev/nvidia-uvm-tools",
];
const USB_DEVICES: &[&str] = &["/dev/usb", "/dev/bus/usb"];
const SHM_DIR: &str = "/dev/shm";

const NAMESPACES: &[(Capability, Namespace)] = &[
    (Capability::IsolateNet, Namespace::Net),
    (Capability::IsolateIpc, Namespace::Ipc),
    (Capability::IsolatePid, Namespace::Pid),
    (Capability::IsolateUts, Namespace::Uts),
    (Capability::IsolateCgroup, Namespace::Cgroup),
];

/// Directive compiler over an immutable policy snapshot.
///
/// Compilation is pure apart from the existence probe: the same inputs
/// always yield the same [`Plan`].
pub struct Compiler<'a, P: PathProbe> {
    policy: &'a Policy,
    ctx: &'a PolicyContext,
    session: &'a Session,
    probe: &'a P,
    custom: CustomGrants,
    hostname: String,
}

impl<'a, P: PathProbe> Compiler<'a, P> {
    pub fn new(
        policy: &'a Policy,
        ctx: &'a PolicyContext,
        session: &'a Session,
        probe: &'a P,
    ) -> Self {
        Self {
            policy,
            ctx,
            session,
            probe,
            custom: CustomGrants::default(),
            hostname: DEFAULT_HOSTNAME.to_string(),
        }
    }

    pub fn with_custom(mut self, custom: CustomGrants) -> Self {
        self.custom = custom;
        self
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    /// Compile every family, then seal the list around `executable`.
    pub fn compile(&self, executable: Executable) -> Plan {
        let mut seq = Sequencer::new();

        self.namespaces(&mut seq);
        self.root_areas(&mut seq);
        self.devices(&mut seq);
        self.home(&mut seq);
        self.runtime_sockets(&mut seq);
        self.display(&mut seq);
        self.custom_paths(&mut seq);

        // Outside the precedence rules; survives a hidden binary directory.
        let grant_executable = self.probe.exists(&executable.path);
        if !grant_executable {
            tracing::warn!(path = %executable.path.display(), "executable not found on host");
        }
        tracing::debug!(nullified = ?seq.nullified(), "deferring read-only remounts");
        let plan = seq.finish(executable, grant_executable);
        tracing::debug!(directives = plan.directives().len(), "compiled policy");
        plan
    }

    fn allows(&self, capability: Capability) -> bool {
        self.policy.allows(capability)
    }

    fn namespaces(&self, seq: &mut Sequencer) {
        for &(capability, namespace) in NAMESPACES {
            if !self.allows(capability) {
                continue;
            }
            seq.push(Directive::Unshare(namespace));
            if namespace == Namespace::Uts {
                seq.push(Directive::SetHostname(self.hostname.clone()));
            }
        }
        if self.allows(Capability::NewSession) {
            seq.push(Directive::NewSession);
        }
        seq.push(Directive::DieWithParent);
    }

    fn root_areas(&self, seq: &mut Sequencer) {
        for area in Area::ALL {
            let hidden = self.allows(Capability::Hide(area));
            tracing::debug!(area = area.name(), hidden, "root area");

            if area == Area::Tmp {
                self.tmp(seq, hidden);
                continue;
            }
            for &path in area.paths() {
                if hidden {
                    self.nullify(seq, path);
                } else {
                    self.grant(seq, Directive::bind_ro(path));
                }
            }
            // Host network namespace shared: the host resolver must stay reachable.
            if area == Area::Run && hidden && !self.allows(Capability::IsolateNet) {
                self.grant(seq, Directive::bind_ro(RESOLVER_DIR));
            }
        }
        seq.push(Directive::Proc("/proc".into()));
    }

    fn tmp(&self, seq: &mut Sequencer, hidden: bool) {
        let tmp = Area::Tmp.paths()[0];
        if hidden {
            self.nullify(seq, tmp);
        } else if self.ctx.is_ephemeral {
            self.clear(seq, tmp);
        } else {
            self.grant(seq, Directive::bind_rw(tmp));
        }
    }

    fn devices(&self, seq: &mut Sequencer) {
        if self.allows(Capability::AllowDev) {
            self.grant(seq, Directive::dev_bind("/dev"));
        } else {
            seq.push(Directive::DevFs("/dev".into()));
        }
        let mut granted: Vec<PathBuf> = Vec::new();
        if self.allows(Capability::AllowGpu) {
            granted.extend(GPU_DEVICES.iter().map(PathBuf::from));
        }
        if self.allows(Capability::AllowUsb) {
            granted.extend(USB_DEVICES.iter().map(PathBuf::from));
        }
        if self.allows(Capability::AllowShm) {
            granted.push(SHM_DIR.into());
        } else {
            self.nullify(seq, SHM_DIR);
        }
        granted.extend(
            self.custom
                .devices
                .iter()
                .map(|name| Path::new("/dev").join(name.trim_start_matches('/'))),
        );
        // `dri`, `/dri` and an allowgpu grant all name the same node.
        for path in unique(&granted) {
            self.grant(seq, Directive::dev_bind(path));
        }
    }

    fn home(&self, seq: &mut Sequencer) {
        let Some(home) = &self.session.home else {
            return;
        };
        if self.allows(Capability::HideHome) {
            self.nullify(seq, home);
        } else if self.allows(Capability::ProtectHome) {
            self.grant(seq, Directive::bind_ro(home));
        } else if self.ctx.is_ephemeral {
            self.clear(seq, home);
        } else {
            self.grant(seq, Directive::bind_rw(home));
        }
    }

    fn runtime_sockets(&self, seq: &mut Sequencer) {
        if let Some(socket) = self.session.runtime_path(PIPEWIRE_SOCKET) {
            if self.allows(Capability::AllowPipewire) {
                self.grant(seq, Directive::bind_rw(socket));
            } else {
                self.null_file(seq, &socket);
            }
        }
        for (capability, dir) in [
            (Capability::AllowPulseaudio, PULSEAUDIO_DIR),
            (Capability::AllowDconf, DCONF_DIR),
        ] {
            let Some(path) = self.session.runtime_path(dir) else {
                continue;
            };
            if self.allows(capability) {
                self.grant(seq, Directive::bind_rw(path));
            } else {
                self.nullify(seq, path);
            }
        }

        let session_bus = self.session.runtime_path(SESSION_BUS_SOCKET);
        let buses = std::iter::once(PathBuf::from(SYSTEM_BUS_SOCKET)).chain(session_bus);
        let dbus = self.allows(Capability::AllowDbus);
        for socket in buses {
            if dbus {
                self.grant(seq, Directive::bind_rw(socket));
            } else {
                self.null_file(seq, &socket);
            }
        }
    }

    fn display(&self, seq: &mut Sequencer) {
        let window = &self.ctx.window_system;
        let xauthority = self.session.xauthority();
        if window.is_unsupported() {
            tracing::debug!(window = %window, "no display protocol exposed");
        }

        if window.allows_x11() {
            if let Some(xauth) = xauthority {
                self.grant(seq, Directive::bind_ro(xauth));
            }
            self.grant(seq, Directive::bind_ro(X11_SOCKET_DIR));
        } else {
            seq.push(Directive::UnsetEnv("DISPLAY".into()));
            seq.push(Directive::UnsetEnv("XAUTHORITY".into()));
            if let Some(xauth) = xauthority {
                self.null_file(seq, &xauth);
            }
            self.nullify(seq, X11_SOCKET_DIR);
        }

        let socket = self.session.wayland_socket();
        if window.allows_wayland() {
            if let Some(socket) = socket {
                self.grant(seq, Directive::bind_rw(socket));
            }
        } else {
            seq.push(Directive::UnsetEnv("WAYLAND_DISPLAY".into()));
            if let Some(socket) = socket {
                self.null_file(seq, &socket);
            }
        }
    }

    fn custom_paths(&self, seq: &mut Sequencer) {
        for rel in unique(&self.custom.home_paths) {
            let Some(path) = self.session.home_path(rel) else {
                continue;
            };
            if self.ctx.is_ephemeral {
                self.grant(seq, Directive::bind_ro(path));
            } else {
                self.grant(seq, Directive::bind_rw(path));
            }
        }
        for path in unique(&self.custom.ro_paths) {
            self.grant(seq, Directive::bind_ro(path));
        }
        for name in unique(&self.custom.sockets) {
            if let Some(path) = self.session.runtime_path(name) {
                self.grant(seq, Directive::bind_rw(path));
            }
        }
    }

    /// Emit a directive only if its host source exists.
    fn grant(&self, seq: &mut Sequencer, directive: Directive) {
        if let Some(source) = directive.source() {
            if !self.probe.exists(source) {
                tracing::trace!(path = %source.display(), "skipping missing grant source");
                return;
            }
        }
        seq.push(directive);
    }

    /// Clear and mark for a deferred read-only remount.
    fn nullify(&self, seq: &mut Sequencer, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if self.probe.exists(path) {
            seq.nullify(path);
        }
    }

    /// Writable clear, for ephemeral mode.
    fn clear(&self, seq: &mut Sequencer, path: impl AsRef<Path>) {
        let path = path.as_ref();
        if self.probe.exists(path) {
            seq.push(Directive::TmpfsClear(path.to_path_buf()));
        }
    }

    fn null_file(&self, seq: &mut Sequencer, path: &Path) {
        if self.probe.exists(path) {
            seq.push(Directive::NullBindFile(path.to_path_buf()));
        }
    }
}

/// Entries of a free-form list with repeats dropped, first occurrence kept.
fn unique<T: PartialEq>(entries: &[T]) -> impl Iterator<Item = &T> {
    entries
        .iter()
        .enumerate()
        .filter(move |&(i, entry)| !entries[..i].contains(entry))
        .map(|(_, entry)| entry)
}
