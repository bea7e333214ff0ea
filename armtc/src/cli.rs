// armtc/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use armtc_common::error::Result;
use armtc_common::pipeline::{PipelineOptions, Stage};
use armtc_common::Config;
use armtc_core::build::{HostTools, SystemRunner};
use armtc_core::Pipeline;
use armtc_net::http::HttpFetcher;
use clap::{ArgAction, Parser, Subcommand};

pub mod build;
pub mod clean;
pub mod configure;
pub mod download;
pub mod unpack;

use crate::cli::build::BuildArgs;
use crate::cli::clean::Clean;
use crate::cli::configure::ConfigureArgs;
use crate::cli::download::Download;
use crate::cli::unpack::Unpack;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "armtc", bin_name = "armtc")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// The build destination folder path (default is "dist")
    #[arg(short, long, value_name = "PATH", global = true)]
    pub prefix: Option<PathBuf>,

    /// Clean the projects before executing the subcommand
    #[arg(short, long, global = true)]
    pub clean: bool,

    /// Number of jobs used with make
    #[arg(short, long, default_value_t = 2, global = true)]
    pub jobs: usize,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl CliArgs {
    /// Layers the command-line options over the loaded configuration.
    pub fn apply(&self, config: Config) -> Result<Config> {
        let config = match &self.prefix {
            Some(prefix) => config.with_prefix(prefix)?,
            None => config,
        };
        Ok(config.with_jobs(self.jobs))
    }

    /// `build` when no subcommand is given.
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Build(BuildArgs::default()))
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Build the toolchain (default)
    Build(BuildArgs),
    /// Remove build files
    Clean(Clean),
    /// Download the source files
    Download(Download),
    /// Unpack the source files
    Unpack(Unpack),
    /// Configure the build targets
    Configure(ConfigureArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Build(command) => command.run(config),
            Self::Clean(command) => command.run(config),
            Self::Download(command) => command.run(config),
            Self::Unpack(command) => command.run(config),
            Self::Configure(command) => command.run(config),
        }
    }
}

/// Runs the pipeline against the network and the host's build tools.
pub fn run_pipeline(config: &Config, target: Stage, options: PipelineOptions) -> Result<()> {
    let fetcher = HttpFetcher::new(true)?;
    let runner = SystemRunner;
    let mut pipeline = Pipeline::new(config, &fetcher, &runner);
    if target >= Stage::Configure {
        pipeline = pipeline.with_host_tools(HostTools::detect(config.layout(), target)?);
    }
    pipeline.run(target, options)
}
