//! Custom extractors for Axum handlers.
//!
//! These extractors reject with the same error shapes as [`crate::AppError`].

pub mod id_path;
pub mod validated_json;

pub use id_path::IdPath;
pub use validated_json::ValidatedJson;
