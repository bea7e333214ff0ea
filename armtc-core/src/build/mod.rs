// armtc-core/src/build/mod.rs
//! Drives the external CMake configure and native build.

use armtc_common::error::{Result, ToolchainError};
use armtc_io::process::{run_command_inherited, CommandSpec};
use tracing::error;

pub mod cmake;
pub mod devtools;
pub mod native;

pub use devtools::HostTools;

/// Runs external commands. Tests substitute a recording fake.
pub trait CommandRunner {
    /// Runs `cmd` to completion and returns its exit code.
    fn run(&self, cmd: &CommandSpec) -> Result<i32>;
}

/// Spawns real processes with the terminal attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<i32> {
        run_command_inherited(cmd)
    }
}

/// Runs `cmd` and turns a nonzero exit into `ExternalBuild` carrying that code.
pub fn run_checked(runner: &dyn CommandRunner, cmd: &CommandSpec) -> Result<()> {
    let code = runner.run(cmd)?;
    if code == 0 {
        return Ok(());
    }
    error!("{} exited with status {}", cmd, code);
    Err(ToolchainError::ExternalBuild {
        step: cmd.program_name(),
        code,
    })
}
