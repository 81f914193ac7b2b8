//! Immutable snapshot of the run-wide policy switches.

use crate::{Capability, Policy, WindowSystem};

/// Run-wide facts every directive family may consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyContext {
    pub strict_mode: bool,
    pub permissive_mode: bool,
    pub is_ephemeral: bool,
    pub window_system: WindowSystem,
}

impl PolicyContext {
    pub fn resolve(policy: &Policy, window_system: WindowSystem) -> Self {
        let ctx = Self {
            strict_mode: policy.strict_mode(),
            permissive_mode: policy.permissive_mode(),
            is_ephemeral: policy.allows(Capability::Ephemeral),
            window_system,
        };
        tracing::debug!(
            strict = ctx.strict_mode,
            permissive = ctx.permissive_mode,
            ephemeral = ctx.is_ephemeral,
            window_system = %ctx.window_system,
            "resolved policy context"
        );
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_context() {
        let policy = Policy::from_lists("sandbox ephemeral", "");
        let ctx = PolicyContext::resolve(&policy, WindowSystem::Wayland);
        assert!(ctx.strict_mode);
        assert!(!ctx.permissive_mode);
        assert!(ctx.is_ephemeral);
        assert_eq!(ctx.window_system, WindowSystem::Wayland);
    }

    #[test]
    fn test_ephemeral_can_be_denied() {
        let policy = Policy::from_lists("ephemeral", "noephemeral");
        let ctx = PolicyContext::resolve(&policy, WindowSystem::None);
        assert!(!ctx.is_ephemeral);
    }
}
