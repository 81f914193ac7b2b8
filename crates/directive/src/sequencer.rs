//! Two-phase directive ordering.
//!
//! Phase 1 collects content and grant directives in compile order and records
//! every nullified path. Phase 2, run exactly once by [`Sequencer::finish`],
//! appends the executable grant, one read-only remount per nullified path and
//! the terminator. Nothing is ever placed after a remount, so a cleared path
//! cannot be left writable by a bind that lands beneath it later.

use std::path::{Path, PathBuf};

use crate::{Directive, Executable};

/// Phase 1 accumulator.
#[derive(Debug, Default)]
pub struct Sequencer {
    directives: Vec<Directive>,
    nullified: Vec<PathBuf>,
}

impl Sequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, directive: Directive) {
        tracing::trace!(%directive, "emit");
        self.directives.push(directive);
    }

    /// Clear `path` now and lock it down in phase 2.
    ///
    /// Nullifying the same path twice is a no-op.
    pub fn nullify(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if self.nullified.contains(&path) {
            return;
        }
        self.push(Directive::TmpfsClear(path.clone()));
        self.nullified.push(path);
    }

    pub fn nullified(&self) -> &[PathBuf] {
        &self.nullified
    }

    /// Run phase 2 and seal the list.
    ///
    /// `grant_executable` is false when the executable is missing on the host.
    pub fn finish(mut self, executable: Executable, grant_executable: bool) -> Plan {
        if grant_executable {
            self.push(Directive::bind_ro(executable.path.clone()));
        }
        for path in std::mem::take(&mut self.nullified) {
            self.push(Directive::RemountRo(path));
        }
        self.push(Directive::Terminator);

        Plan {
            directives: self.directives,
            executable,
        }
    }
}

/// A sealed, ordered directive list plus the program it confines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    directives: Vec<Directive>,
    executable: Executable,
}

impl Plan {
    pub fn directives(&self) -> &[Directive] {
        &self.directives
    }

    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    /// Paths locked down by a deferred remount, in emission order.
    pub fn remounted(&self) -> impl Iterator<Item = &Path> {
        self.directives.iter().filter_map(|d| match d {
            Directive::RemountRo(path) => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn contains(&self, directive: &Directive) -> bool {
        self.directives.contains(directive)
    }

    pub fn position(&self, directive: &Directive) -> Option<usize> {
        self.directives.iter().position(|d| d == directive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exe() -> Executable {
        Executable::by_name("/usr/bin", "app")
    }

    #[test]
    fn test_remounts_follow_everything() {
        let mut seq = Sequencer::new();
        seq.nullify("/tmp");
        seq.push(Directive::bind_ro("/tmp/.X11-unix"));
        seq.nullify("/usr");
        let plan = seq.finish(exe(), true);

        let d = plan.directives();
        assert_eq!(
            d,
            &[
                Directive::TmpfsClear("/tmp".into()),
                Directive::bind_ro("/tmp/.X11-unix"),
                Directive::TmpfsClear("/usr".into()),
                Directive::bind_ro("/usr/bin/app"),
                Directive::RemountRo("/tmp".into()),
                Directive::RemountRo("/usr".into()),
                Directive::Terminator,
            ]
        );
    }

    #[test]
    fn test_nullify_is_idempotent() {
        let mut seq = Sequencer::new();
        seq.nullify("/dev/shm");
        seq.nullify("/dev/shm");
        assert_eq!(seq.nullified().len(), 1);
        let plan = seq.finish(exe(), true);
        assert_eq!(plan.remounted().count(), 1);
        let clears = plan
            .directives()
            .iter()
            .filter(|d| matches!(d, Directive::TmpfsClear(_)))
            .count();
        assert_eq!(clears, 1);
    }

    #[test]
    fn test_missing_executable_is_not_granted() {
        let plan = Sequencer::new().finish(exe(), false);
        assert_eq!(plan.directives(), &[Directive::Terminator]);
        assert_eq!(plan.executable().name, "app");
    }
}
