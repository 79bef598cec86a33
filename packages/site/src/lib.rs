#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Site configuration store.
//!
//! Site profiles are TOML files. A built-in set is embedded at compile time
//! (see [`registry`]); callers may layer an external directory of profiles
//! on top, overriding built-ins with the same key. Every profile is
//! validated when it is loaded so that a bad selector or URL fails at
//! startup rather than halfway through a batch.

pub mod platform;
pub mod registry;
pub mod site_def;

use std::path::PathBuf;

pub use registry::SiteRegistry;

/// Errors that can occur while loading or looking up site profiles.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// The TOML text could not be deserialized.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The profile deserialized but failed validation.
    #[error("invalid site profile '{key}': {message}")]
    Invalid {
        /// Key of the offending profile.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// Two profiles from the same source share a key.
    #[error("duplicate site key '{key}'")]
    DuplicateKey {
        /// The repeated key.
        key: String,
    },

    /// No profile is configured for the requested key.
    #[error("unknown school/team '{key}' (available: {available})")]
    UnknownSite {
        /// The requested key.
        key: String,
        /// Comma-separated list of configured keys.
        available: String,
    },

    /// A profile file could not be loaded.
    #[error("failed to load {}: {source}", path.display())]
    Load {
        /// Path of the profile file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: Box<Self>,
    },

    /// I/O error while reading a profile directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
