// armtc-common/src/model/artifact.rs
use serde::{Deserialize, Serialize};

/// Archive container formats the pipeline knows how to unpack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveKind {
    Zip,
    TarBz2,
    TarXz,
    TarGz,
}

impl ArchiveKind {
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if lower.ends_with(".tar.bz2") || lower.ends_with(".tbz2") || lower.ends_with(".tbz")
        {
            Some(ArchiveKind::TarBz2)
        } else if lower.ends_with(".tar.xz") || lower.ends_with(".txz") {
            Some(ArchiveKind::TarXz)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else {
            None
        }
    }
}

/// How to locate one remote artifact on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactSpec {
    pub name: String,
    pub listing_url: String,
    /// Regex applied to every `href` target on the listing page.
    pub link_pattern: String,
    /// Required substring of the chosen link, for host-specific archives.
    pub platform_suffix: Option<String>,
}

/// A concrete archive picked from a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub name: String,
    pub download_url: String,
    pub filename: String,
    pub archive_kind: ArchiveKind,
    /// Published checksum, when upstream provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// The three LLVM-family source archives and where each lands in the source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceComponent {
    Llvm,
    Clang,
    Lld,
}

impl SourceComponent {
    pub const ALL: [SourceComponent; 3] = [
        SourceComponent::Llvm,
        SourceComponent::Clang,
        SourceComponent::Lld,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceComponent::Llvm => "llvm",
            SourceComponent::Clang => "clang",
            SourceComponent::Lld => "lld",
        }
    }

    /// Filename prefix of this component's source archive on the listing page.
    pub fn link_prefix(&self) -> &'static str {
        match self {
            SourceComponent::Llvm => "llvm-",
            SourceComponent::Clang => "cfe-",
            SourceComponent::Lld => "lld-",
        }
    }

    /// Path of the component below the LLVM source root, `None` for the root itself.
    pub fn nested_path(&self) -> Option<&'static str> {
        match self {
            SourceComponent::Llvm => None,
            SourceComponent::Clang => Some("tools/clang"),
            SourceComponent::Lld => Some("tools/lld"),
        }
    }
}

/// Suffix shared by every LLVM-family source archive.
pub const SOURCE_ARCHIVE_SUFFIX: &str = ".src.tar.xz";

/// `llvm-5.0.0.src.tar.xz` -> `llvm-5.0.0`.
pub fn source_stem(filename: &str) -> &str {
    filename
        .split(SOURCE_ARCHIVE_SUFFIX)
        .next()
        .unwrap_or(filename)
}
