//! Bubblewrap backend.
//!
//! Renders a sealed [`Plan`] into `bwrap` flags and replaces the current
//! process with it. The confined process reports the target's own name, not
//! the backend's.

use std::ffi::OsString;
use std::os::unix::process::CommandExt;
use std::process::Command;

use directive::{Directive, Namespace, Plan};

use crate::error::Error;

/// A confinement backend that consumes a directive list.
pub trait Backend {
    /// Flags for every directive in order.
    fn render(&self, plan: &Plan) -> Vec<OsString>;

    /// Build the full command: backend, flags, executable, passthrough args.
    fn command(&self, plan: &Plan, args: &[String]) -> Command;
}

/// `bwrap` from bubblewrap.
#[derive(Debug, Clone)]
pub struct Bwrap {
    program: String,
}

impl Bwrap {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Replace the current process. Only returns on failure.
    pub fn exec(&self, plan: &Plan, args: &[String]) -> Error {
        tracing::info!(
            backend = %self.program,
            executable = %plan.executable().path.display(),
            directives = plan.directives().len(),
            "starting confined process"
        );
        let source = self.command(plan, args).exec();
        Error::Exec {
            command: self.program.clone(),
            source,
        }
    }
}

impl Backend for Bwrap {
    fn render(&self, plan: &Plan) -> Vec<OsString> {
        let mut out = Vec::new();
        for directive in plan.directives() {
            render_one(directive, &mut out);
        }
        out
    }

    fn command(&self, plan: &Plan, args: &[String]) -> Command {
        let executable = plan.executable();
        let mut cmd = Command::new(&self.program);
        cmd.arg0(&executable.name)
            .args(self.render(plan))
            .arg(&executable.path)
            .args(args);
        cmd
    }
}

fn render_one(directive: &Directive, out: &mut Vec<OsString>) {
    let mut push = |flag: &str, values: &[&std::ffi::OsStr]| {
        out.push(flag.into());
        out.extend(values.iter().map(|v| v.to_os_string()));
    };
    match directive {
        Directive::BindRw { source, target } => {
            push("--bind", &[source.as_os_str(), target.as_os_str()])
        }
        Directive::BindRo { source, target } => {
            push("--ro-bind", &[source.as_os_str(), target.as_os_str()])
        }
        Directive::DevBind { source, target } => {
            push("--dev-bind", &[source.as_os_str(), target.as_os_str()])
        }
        Directive::TmpfsClear(path) => push("--tmpfs", &[path.as_os_str()]),
        Directive::NullBindFile(path) => {
            push("--ro-bind", &["/dev/null".as_ref(), path.as_os_str()])
        }
        Directive::RemountRo(path) => push("--remount-ro", &[path.as_os_str()]),
        Directive::UnsetEnv(name) => push("--unsetenv", &[name.as_ref()]),
        Directive::SetHostname(name) => push("--hostname", &[name.as_ref()]),
        Directive::Unshare(ns) => push(unshare_flag(*ns), &[]),
        Directive::Proc(path) => push("--proc", &[path.as_os_str()]),
        Directive::DevFs(path) => push("--dev", &[path.as_os_str()]),
        Directive::NewSession => push("--new-session", &[]),
        Directive::DieWithParent => push("--die-with-parent", &[]),
        Directive::Terminator => push("--", &[]),
    }
}

fn unshare_flag(ns: Namespace) -> &'static str {
    match ns {
        Namespace::Net => "--unshare-net",
        Namespace::Ipc => "--unshare-ipc",
        Namespace::Pid => "--unshare-pid",
        Namespace::Uts => "--unshare-uts",
        Namespace::Cgroup => "--unshare-cgroup-try",
    }
}
