//! Compiles a resolved capability policy into confinement directives.
//!
//! # Overview
//!
//! - [`Compiler`] walks every access family (root areas, devices, home,
//!   runtime sockets, display, free-form lists), asks the [`policy::Policy`]
//!   once per family and emits primitive [`Directive`]s.
//! - [`Sequencer`] keeps the emitted list in two phases: content first, then
//!   one deferred read-only remount per nullified path and a terminator.
//! - [`PathProbe`] gates every candidate host path; missing paths are
//!   omitted, never an error.
//!
//! The result is a sealed [`Plan`] that a backend renders into its own flag
//! syntax.
//!
//! # Example
//!
//! ```no_run
//! use directive::{Compiler, Executable, HostFs, Session};
//! use policy::{Policy, PolicyContext, WindowSystem};
//!
//! let policy = Policy::from_lists("allowgpu", "hidetmp");
//! let ctx = PolicyContext::resolve(&policy, WindowSystem::detect(None, Some("wayland")));
//! let session = Session {
//!     home: Some("/home/user".into()),
//!     runtime_dir: Some("/run/user/1000".into()),
//!     ..Session::default()
//! };
//!
//! let plan = Compiler::new(&policy, &ctx, &session, &HostFs)
//!     .compile(Executable::by_name("/usr/bin", "firefox"));
//! for directive in plan.directives() {
//!     println!("{directive}");
//! }
//! ```

mod compiler;
mod directive;
mod probe;
mod sequencer;
mod session;

pub use compiler::{
    Compiler, DCONF_DIR, DEFAULT_HOSTNAME, PIPEWIRE_SOCKET, PULSEAUDIO_DIR, RESOLVER_DIR,
    SESSION_BUS_SOCKET, SYSTEM_BUS_SOCKET, X11_SOCKET_DIR,
};
pub use directive::{Directive, Namespace};
pub use probe::{HostFs, PathProbe};
pub use sequencer::{Plan, Sequencer};
pub use session::{CustomGrants, DEFAULT_WAYLAND_DISPLAY, Executable, Session};
