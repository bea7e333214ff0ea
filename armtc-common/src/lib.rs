// armtc-common/src/lib.rs
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;

// Re-export key types
pub use config::Config;
pub use error::{Result, ToolchainError};
pub use model::{ArchiveKind, ArtifactSpec, Platform, PlatformLayout, ResolvedArtifact};
pub use pipeline::{PipelineOptions, Stage};
