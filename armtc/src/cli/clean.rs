//! Contains the logic for the `clean` command.
use armtc_common::error::Result;
use armtc_common::Config;

#[derive(clap::Args, Debug, Clone)]
pub struct Clean;

impl Clean {
    pub fn run(&self, config: &Config) -> Result<()> {
        armtc_core::clean(config)
    }
}
