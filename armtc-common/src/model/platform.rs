// armtc-common/src/model/platform.rs
//! Per-host packaging conventions, kept as data so a new host is a table row.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::artifact::ArchiveKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Linux
        }
    }

    /// Short host tag used in the install prefix name.
    pub fn tag(&self) -> &'static str {
        match self {
            Platform::Windows => "win32",
            Platform::Linux => "linux",
            Platform::MacOs => "darwin",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Platform::Windows => "Windows",
            Platform::Linux => "Linux",
            Platform::MacOs => "macOS",
        })
    }
}

/// Where the cross-toolchain archive gets unpacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractTarget {
    /// The archive has no top-level directory; unpack into `src/<dirname>`.
    NamedDir,
    /// The archive carries its own `<dirname>/` root; unpack into `src/`.
    SourceRoot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeBuildTool {
    Make,
    MsBuild,
}

impl NativeBuildTool {
    pub fn program(&self) -> &'static str {
        match self {
            NativeBuildTool::Make => "make",
            NativeBuildTool::MsBuild => "MSBuild",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLayout {
    pub platform: Platform,
    pub link_suffix: &'static str,
    pub archive_kind: ArchiveKind,
    pub extract_target: ExtractTarget,
    pub exe_suffix: &'static str,
    pub cmake_generator: &'static str,
    pub cmake_generator_args: &'static [&'static str],
    pub build_tool: NativeBuildTool,
}

const LAYOUTS: &[PlatformLayout] = &[
    PlatformLayout {
        platform: Platform::Windows,
        link_suffix: "-win32.zip",
        archive_kind: ArchiveKind::Zip,
        extract_target: ExtractTarget::NamedDir,
        exe_suffix: ".exe",
        cmake_generator: "Visual Studio 14 2015 Win64",
        cmake_generator_args: &["-Thost=x64"],
        build_tool: NativeBuildTool::MsBuild,
    },
    PlatformLayout {
        platform: Platform::Linux,
        link_suffix: "-linux.tar.bz2",
        archive_kind: ArchiveKind::TarBz2,
        extract_target: ExtractTarget::SourceRoot,
        exe_suffix: "",
        cmake_generator: "Unix Makefiles",
        cmake_generator_args: &[],
        build_tool: NativeBuildTool::Make,
    },
    PlatformLayout {
        platform: Platform::MacOs,
        link_suffix: "-mac.tar.bz2",
        archive_kind: ArchiveKind::TarBz2,
        extract_target: ExtractTarget::SourceRoot,
        exe_suffix: "",
        cmake_generator: "Unix Makefiles",
        cmake_generator_args: &[],
        build_tool: NativeBuildTool::Make,
    },
];

impl PlatformLayout {
    pub fn for_platform(platform: Platform) -> &'static PlatformLayout {
        // Every Platform variant has a row.
        LAYOUTS
            .iter()
            .find(|layout| layout.platform == platform)
            .unwrap_or(&LAYOUTS[1])
    }

    pub fn exe_name(&self, base: &str) -> String {
        format!("{base}{}", self.exe_suffix)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(Platform::Windows, "-win32.zip", ArchiveKind::Zip, ExtractTarget::NamedDir)]
    #[case(Platform::Linux, "-linux.tar.bz2", ArchiveKind::TarBz2, ExtractTarget::SourceRoot)]
    #[case(Platform::MacOs, "-mac.tar.bz2", ArchiveKind::TarBz2, ExtractTarget::SourceRoot)]
    fn table_row_per_platform(
        #[case] platform: Platform,
        #[case] suffix: &str,
        #[case] kind: ArchiveKind,
        #[case] target: ExtractTarget,
    ) {
        let layout = PlatformLayout::for_platform(platform);
        assert_eq!(layout.platform, platform);
        assert_eq!(layout.link_suffix, suffix);
        assert_eq!(layout.archive_kind, kind);
        assert_eq!(layout.extract_target, target);
    }

    #[test]
    fn windows_executables_get_suffix() {
        assert_eq!(
            PlatformLayout::for_platform(Platform::Windows).exe_name("clang"),
            "clang.exe"
        );
        assert_eq!(
            PlatformLayout::for_platform(Platform::Linux).exe_name("clang"),
            "clang"
        );
    }
}
