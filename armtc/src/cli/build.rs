//! Contains the logic for the `build` command.
use armtc_common::error::Result;
use armtc_common::pipeline::{PipelineOptions, Stage};
use armtc_common::Config;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Force reconfigure the target
    #[arg(long, visible_alias = "rc")]
    pub reconfigure: bool,

    /// Force rebuild the target
    #[arg(long, visible_alias = "rb")]
    pub rebuild: bool,
}

impl BuildArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let options = PipelineOptions {
            reconfigure: self.reconfigure,
            rebuild: self.rebuild,
        };
        super::run_pipeline(config, Stage::Build, options)
    }
}
