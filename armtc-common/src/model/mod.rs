// armtc-common/src/model/mod.rs
pub mod artifact;
pub mod platform;
pub mod version;

// Re-export
pub use artifact::{ArchiveKind, ArtifactSpec, ResolvedArtifact, SourceComponent};
pub use platform::{ExtractTarget, NativeBuildTool, Platform, PlatformLayout};
pub use version::VersionRecord;

/// Bare-metal target every assembled toolchain compiles for.
pub const TARGET_TRIPLE: &str = "arm-none-eabi";
