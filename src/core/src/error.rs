//! Error taxonomy for virtual Waggle node operations.

use thiserror::Error;

/// A specialized Result type for node operations.
pub type Result<T> = std::result::Result<T, NodeError>;

/// Fatal errors surfaced to the operator.
///
/// Every variant terminates the invocation with a non-zero exit code; none
/// are retried. Subprocess non-zero exits are propagated as the tool's own
/// exit code instead of being mapped into a variant here.
#[derive(Error, Debug)]
pub enum NodeError {
    /// The plugin directory has no `sage.json` metadata file.
    #[error("plugin is missing sage.json metadata file")]
    ManifestMissing,

    /// `sage.json` (or the image label set) lacks required fields. Reports
    /// the full missing-field set, not just the first one found.
    #[error("plugin metadata is missing fields: {}", .missing.join(", "))]
    ManifestIncomplete { missing: Vec<String> },

    /// Plugin names may only contain lowercase letters, numbers, `_` and `-`.
    #[error("plugin names can only contain lowercase letters, numbers, _ and -")]
    InvalidName,

    /// Scaffolding never overwrites an existing plugin directory.
    #[error("plugin directory {0} already exists")]
    DirectoryExists(String),

    /// The image is not present in the local engine cache.
    #[error("did not find plugin image {0} locally")]
    ImageNotFound(String),

    /// The remote pull fallback also failed.
    #[error("failed to pull plugin image {0}")]
    PullFailed(String),

    /// Broker account provisioning failed; not retried.
    #[error("failed to provision broker account {username}: {reason}")]
    Provisioning { username: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}
