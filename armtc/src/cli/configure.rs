use armtc_common::error::Result;
use armtc_common::pipeline::{PipelineOptions, Stage};
use armtc_common::Config;

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ConfigureArgs {
    /// Force reconfigure the target
    #[arg(long, visible_alias = "rc")]
    pub reconfigure: bool,
}

impl ConfigureArgs {
    pub fn run(&self, config: &Config) -> Result<()> {
        let options = PipelineOptions {
            reconfigure: self.reconfigure,
            ..PipelineOptions::default()
        };
        super::run_pipeline(config, Stage::Configure, options)
    }
}
