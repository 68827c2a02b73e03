//! Shared types, error model, and configuration for texset.
//!
//! This crate is the foundation depended on by all other texset crates.
//! It provides:
//! - [`TexsetError`] — the unified error type
//! - Domain types ([`CallerId`], [`Attachment`], [`InboundRequest`])
//! - Allow-list configuration read from the process environment

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{ENV_SUFFIX, allow_list_from_env, env_key, parse_allow_list};
pub use error::{Result, TexsetError};
pub use types::{
    ARCHIVE_SUFFIX, Attachment, AttachmentKind, ByteSource, CallerId, IMAGE_SUFFIX,
    InboundRequest,
};
