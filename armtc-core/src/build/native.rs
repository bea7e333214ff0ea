// armtc-core/src/build/native.rs
use std::path::Path;

use armtc_common::error::Result;
use armtc_common::model::{NativeBuildTool, PlatformLayout};
use armtc_io::process::CommandSpec;

use super::devtools::{missing_build_tool, HostTools};

/// Builds and installs the configured tree with the platform's native tool.
pub fn install_command(
    tools: &HostTools,
    layout: &PlatformLayout,
    build_dir: &Path,
    jobs: usize,
) -> Result<CommandSpec> {
    let build_tool = tools
        .build_tool
        .as_deref()
        .ok_or_else(|| missing_build_tool(layout))?;
    let cmd = CommandSpec::new(build_tool).current_dir(build_dir);
    let cmd = match layout.build_tool {
        NativeBuildTool::Make => cmd.arg("install").arg(format!("-j{jobs}")),
        NativeBuildTool::MsBuild => cmd.args([
            "INSTALL.vcxproj",
            "/t:Build",
            "/p:Configuration=Release",
            "/m",
        ]),
    };
    if tools.clang.is_some() {
        Ok(cmd.env("CC", "clang").env("CXX", "clang++"))
    } else {
        Ok(cmd)
    }
}
