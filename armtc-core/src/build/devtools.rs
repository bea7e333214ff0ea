use std::path::{Path, PathBuf};

use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::{Platform, PlatformLayout};
use armtc_common::pipeline::Stage;
use tracing::debug;

const WINDOWS_CMAKE_DEFAULTS: &[&str] = &[
    r"C:\Program Files\CMake\bin\cmake.exe",
    r"C:\Program Files (x86)\CMake\bin\cmake.exe",
];

/// External programs the configure and build stages depend on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostTools {
    pub cmake: PathBuf,
    /// make or MSBuild; only the build stage needs it.
    pub build_tool: Option<PathBuf>,
    /// When present the LLVM build is compiled with clang and libc++.
    pub clang: Option<PathBuf>,
    pub python: Option<PathBuf>,
}

impl HostTools {
    /// Looks up the tools needed to reach `target`. The native build tool is
    /// required only when `target` is the build stage.
    pub fn detect(layout: &PlatformLayout, target: Stage) -> Result<Self> {
        let defaults: &[&str] = if layout.platform == Platform::Windows {
            WINDOWS_CMAKE_DEFAULTS
        } else {
            &[]
        };
        let cmake = find_tool("cmake", defaults).ok_or_else(|| ToolchainError::Environment {
            tool: "CMake".to_string(),
            hint: "Install it from https://cmake.org/download/ and make sure it is on PATH."
                .to_string(),
        })?;

        let build_tool = find_tool(layout.build_tool.program(), &[]);
        if build_tool.is_none() && target >= Stage::Build {
            return Err(missing_build_tool(layout));
        }

        let tools = Self {
            cmake,
            build_tool,
            clang: find_tool("clang", &[]),
            python: find_tool("python3", &[]).or_else(|| find_tool("python", &[])),
        };
        debug!("Host tools: {:?}", tools);
        Ok(tools)
    }
}

pub fn missing_build_tool(layout: &PlatformLayout) -> ToolchainError {
    ToolchainError::Environment {
        tool: layout.build_tool.program().to_string(),
        hint: match layout.platform {
            Platform::Windows => "Run from a Visual Studio developer command prompt.".to_string(),
            _ => "Install your platform's build essentials.".to_string(),
        },
    }
}

/// PATH lookup, then the given fallback locations.
pub fn find_tool(name: &str, defaults: &[&str]) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        debug!("Found '{}' on PATH: {}", name, path.display());
        return Some(path);
    }
    let found = defaults
        .iter()
        .map(Path::new)
        .find(|p| p.is_file())
        .map(Path::to_path_buf);
    if found.is_none() {
        debug!("'{}' not found", name);
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_default_locations() {
        let dir = tempfile::tempdir().unwrap();
        let fallback = dir.path().join("cmake-fallback");
        std::fs::write(&fallback, b"").unwrap();
        let fallback_str = fallback.to_str().unwrap();

        assert_eq!(
            find_tool("armtc-no-such-tool", &[fallback_str]),
            Some(fallback.clone())
        );
        assert_eq!(find_tool("armtc-no-such-tool", &["/nonexistent/cmake"]), None);
    }
}
