//! viewfact-etl library
//!
//! Turns raw viewing-session exports into a validated fact table plus
//! labelled rejects, cleans the user and title dimensions, and loads the
//! result into SQLite.

pub mod dimensions;
pub mod generator;
pub mod io;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod summary;
pub mod validator;

pub use models::{RawSession, RejectedSession, ValidatedSession};
pub use summary::ValidationSummary;
pub use validator::{validate, validate_chunked, RejectReason, ValidationOutcome};

/// Version, git hash, build timestamp and profile of this binary
pub fn build_id() -> String {
    format!(
        "v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_id_carries_version_and_profile() {
        let id = build_id();
        assert!(id.starts_with(&format!("v{} [", env!("CARGO_PKG_VERSION"))));
        assert!(!env!("GIT_HASH").is_empty());
        assert!(id.ends_with(&format!("({})", env!("BUILD_PROFILE"))));
    }
}
