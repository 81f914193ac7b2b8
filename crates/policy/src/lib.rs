//! Capability policy resolution for confined processes.
//!
//! Core principle: **restrictions fail toward confinement, grants fail
//! toward minimal exposure.**
//!
//! # Overview
//!
//! - [`TokenSet`]: capability tokens merged from application defaults and
//!   user overrides. Unknown tokens are kept and ignored.
//! - [`Policy`]: per-capability precedence queries over a token set.
//! - [`WindowSystem`]: effective display protocol.
//! - [`PolicyContext`]: run-wide switches derived from the above.
//!
//! # Example
//!
//! ```
//! use policy::{Capability, Policy, PolicyContext, WindowSystem};
//!
//! let policy = Policy::from_lists("allowgpu protecthome", "noprotecthome");
//! assert!(policy.allows(Capability::AllowGpu));
//! assert!(!policy.allows(Capability::ProtectHome));
//!
//! let window = WindowSystem::detect(Some("wayland"), Some("x11"));
//! let ctx = PolicyContext::resolve(&policy, window);
//! assert!(!ctx.is_ephemeral);
//! ```

mod capability;
mod context;
mod policy;
mod token;
mod window;

pub use capability::{Area, Capability, Style};
pub use context::PolicyContext;
pub use policy::{NEGATION_PREFIX, PERMISSIVE, Policy, Resolution, STRICT};
pub use token::{TOKEN_DELIMITERS, Token, TokenSet, split_list};
pub use window::WindowSystem;
