use armtc_common::error::Result;
use armtc_common::pipeline::{PipelineOptions, Stage};
use armtc_common::Config;

#[derive(clap::Args, Debug, Clone)]
pub struct Unpack;

impl Unpack {
    pub fn run(&self, config: &Config) -> Result<()> {
        super::run_pipeline(config, Stage::Unpack, PipelineOptions::default())
    }
}
