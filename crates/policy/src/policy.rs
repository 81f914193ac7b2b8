//! Precedence resolution over a token set.
//!
//! Each capability is resolved independently. From highest to lowest
//! priority:
//!
//! 1. an explicit `no<name>` token (deny always wins)
//! 2. an explicit `<name>` token
//! 3. a global switch (`sandbox` / `nosandbox`)
//! 4. the implicit default of the capability's [`Style`]

use crate::{Capability, Style, TokenSet};

/// Global token that forces every unlisted restriction on.
pub const STRICT: &str = "sandbox";

/// Global token that turns every unlisted restriction off.
pub const PERMISSIVE: &str = "nosandbox";

/// Prefix that negates a capability token.
pub const NEGATION_PREFIX: &str = "no";

/// What the token set says about a single capability, before defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Enabled,
    Disabled,
    Default,
}

/// Resolved policy over a merged token set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    tokens: TokenSet,
}

impl Policy {
    pub fn new(tokens: TokenSet) -> Self {
        Self { tokens }
    }

    /// Merge application defaults with user overrides.
    pub fn from_lists(defaults: &str, overrides: &str) -> Self {
        let tokens = TokenSet::from_sources([defaults, overrides]);
        tracing::debug!(count = tokens.len(), tokens = ?tokens.sorted(), "merged capability lists");
        Self::new(tokens)
    }

    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// Global `sandbox` switch is present.
    pub fn strict_mode(&self) -> bool {
        self.tokens.contains(STRICT)
    }

    /// Global `nosandbox` switch is present.
    pub fn permissive_mode(&self) -> bool {
        self.tokens.contains(PERMISSIVE)
    }

    /// Per-capability explicit tokens only; global switches are not consulted.
    pub fn resolution(&self, name: &str) -> Resolution {
        if self.tokens.contains(&format!("{NEGATION_PREFIX}{name}")) {
            Resolution::Disabled
        } else if self.tokens.contains(name) {
            Resolution::Enabled
        } else {
            Resolution::Default
        }
    }

    /// Restriction-style query, default on.
    pub fn is_restriction_enabled(&self, name: &str) -> bool {
        match self.resolution(name) {
            Resolution::Disabled => false,
            Resolution::Enabled => true,
            Resolution::Default if self.strict_mode() => true,
            Resolution::Default => !self.permissive_mode(),
        }
    }

    /// Grant-style query, default off.
    ///
    /// Neither global switch can turn a grant on; only its own token can.
    /// `sandbox` is not consulted here: an explicit token outranks a global
    /// switch, so strict mode tightens restrictions but leaves an explicit
    /// grant standing. `no<name>` still cancels `<name>`.
    pub fn is_grant_allowed(&self, name: &str) -> bool {
        matches!(self.resolution(name), Resolution::Enabled)
    }

    /// Query a known capability according to its style.
    pub fn allows(&self, capability: Capability) -> bool {
        let allowed = match capability.style() {
            Style::Restriction => self.is_restriction_enabled(capability.token()),
            Style::Grant => self.is_grant_allowed(capability.token()),
        };
        tracing::trace!(%capability, allowed, "resolved capability");
        allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Area;

    fn policy(tokens: &str) -> Policy {
        Policy::new(TokenSet::parse(tokens))
    }

    #[test]
    fn test_defaults_without_tokens() {
        let p = policy("");
        for name in ["protecthome", "allowgpu", "anything", "hidetmp"] {
            assert!(p.is_restriction_enabled(name), "{name}");
            assert!(!p.is_grant_allowed(name), "{name}");
        }
    }

    #[test]
    fn test_deny_always_wins() {
        for tokens in [
            "nofoo",
            "foo nofoo",
            "nofoo sandbox",
            "foo nofoo sandbox",
            "nofoo nosandbox",
            "foo nofoo sandbox nosandbox",
        ] {
            let p = policy(tokens);
            assert!(!p.is_restriction_enabled("foo"), "{tokens}");
            assert!(!p.is_grant_allowed("foo"), "{tokens}");
        }
    }

    #[test]
    fn test_nosandbox_flips_unlisted_restrictions() {
        let p = policy("nosandbox");
        assert!(!p.is_restriction_enabled("protecthome"));
        assert!(!p.is_restriction_enabled("isolatenet"));
        assert!(!p.allows(Capability::IsolatePid));
    }

    #[test]
    fn test_nosandbox_keeps_explicit_restrictions() {
        let p = policy("nosandbox isolatenet");
        assert!(p.is_restriction_enabled("isolatenet"));
        assert!(!p.is_restriction_enabled("isolateipc"));
    }

    #[test]
    fn test_sandbox_forces_unlisted_restrictions_on() {
        let p = policy("sandbox nosandbox");
        assert!(p.is_restriction_enabled("protecthome"));
        let p = policy("sandbox noprotecthome");
        assert!(!p.is_restriction_enabled("protecthome"));
        assert!(p.is_restriction_enabled("isolatenet"));
    }

    #[test]
    fn test_sandbox_does_not_satisfy_grants() {
        let p = policy("sandbox");
        assert!(!p.is_grant_allowed("allowgpu"));
        assert!(!p.allows(Capability::Ephemeral));
    }

    #[test]
    fn test_explicit_grant_is_independent_of_global_switches() {
        for tokens in ["allowgpu", "allowgpu sandbox", "allowgpu nosandbox"] {
            let p = policy(tokens);
            assert!(p.is_grant_allowed("allowgpu"), "{tokens}");
            assert!(!p.is_grant_allowed("allowusb"), "{tokens}");
        }
    }

    #[test]
    fn test_strict_mode_leaves_grants_to_their_own_tokens() {
        let p = policy("sandbox");
        assert!(p.strict_mode());
        assert!(!p.is_grant_allowed("allowgpu"));
        assert!(p.is_restriction_enabled("protecthome"));

        let p = policy("sandbox allowgpu noallowusb allowusb");
        assert!(p.is_grant_allowed("allowgpu"));
        assert!(!p.is_grant_allowed("allowusb"));
    }

    #[test]
    fn test_resolution_values() {
        let p = policy("allowgpu noallowusb");
        assert_eq!(p.resolution("allowgpu"), Resolution::Enabled);
        assert_eq!(p.resolution("allowusb"), Resolution::Disabled);
        assert_eq!(p.resolution("allowshm"), Resolution::Default);
    }

    #[test]
    fn test_allows_dispatches_on_style() {
        let p = policy("hidetmp noprotecthome");
        assert!(p.allows(Capability::Hide(Area::Tmp)));
        assert!(!p.allows(Capability::Hide(Area::Usr)));
        assert!(!p.allows(Capability::ProtectHome));
        assert!(p.allows(Capability::IsolateNet));
    }

    #[test]
    fn test_global_modes() {
        let p = Policy::from_lists("sandbox", "");
        assert!(p.strict_mode());
        assert!(!p.permissive_mode());
        let p = Policy::from_lists("", "nosandbox");
        assert!(p.permissive_mode());
    }

    #[test]
    fn test_source_order_is_irrelevant() {
        let a = Policy::from_lists("allowgpu", "noallowgpu");
        let b = Policy::from_lists("noallowgpu", "allowgpu");
        assert_eq!(a, b);
        assert!(!a.is_grant_allowed("allowgpu"));
    }
}
