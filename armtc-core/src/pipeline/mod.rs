// armtc-core/src/pipeline/mod.rs
//! The staged pipeline: download -> unpack -> configure -> build.
//!
//! Every invocation walks forward from the download stage. Each stage runs its
//! own on-disk checks, so work finished by an earlier run is skipped rather
//! than trusted blindly.

use std::path::{Path, PathBuf};

use armtc_common::config::Config;
use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::{ResolvedArtifact, SourceComponent, VersionRecord};
use armtc_common::pipeline::{PipelineOptions, Stage};
use armtc_io::fs::{create_dir_all, merge_tree, remove_dir_contents};
use armtc_net::http::Fetcher;
use armtc_net::resolver::ReleaseResolver;
use tracing::{debug, info, warn};

use crate::build::{cmake, native, run_checked, CommandRunner, HostTools};
use crate::cache::ArchiveCache;
use crate::install::sources::find_component;
use crate::install::{
    assemble_prefix, llvm_version, unpack_cross_toolchain, unpack_sources, SourceArchive,
};
use crate::state::BuildState;

mod clean;

pub use clean::clean;

/// Archives available in the download cache after the download stage.
#[derive(Debug, Clone)]
pub struct Downloads {
    pub cross_toolchain: ResolvedArtifact,
    pub cross_toolchain_archive: PathBuf,
    pub sources: Vec<SourceArchive>,
}

impl Downloads {
    pub fn llvm(&self) -> Result<&SourceArchive> {
        find_component(&self.sources, SourceComponent::Llvm)
    }
}

/// What the unpack stage learned about the assembled trees.
#[derive(Debug, Clone)]
pub struct Unpacked {
    pub llvm_source_dir: PathBuf,
    pub gcc_version: String,
    pub llvm_version: String,
}

pub struct Pipeline<'a> {
    config: &'a Config,
    fetcher: &'a dyn Fetcher,
    runner: &'a dyn CommandRunner,
    tools: Option<HostTools>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config, fetcher: &'a dyn Fetcher, runner: &'a dyn CommandRunner) -> Self {
        Self {
            config,
            fetcher,
            runner,
            tools: None,
        }
    }

    /// Required before running the configure or build stage.
    pub fn with_host_tools(mut self, tools: HostTools) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Runs every stage up to and including `target`.
    pub fn run(&self, target: Stage, options: PipelineOptions) -> Result<()> {
        let plan: Vec<String> = target
            .prerequisites_and_self()
            .map(|s| s.to_string())
            .collect();
        debug!("Running stages: {}", plan.join(" -> "));

        let state_path = self.config.state_file();
        let mut state = BuildState::load(&state_path);
        if options.reconfigure {
            state.forget(Stage::Configure);
            state.save(&state_path)?;
        }

        let downloads = self.download(&mut state)?;
        self.complete(&mut state, Stage::Download)?;
        if target == Stage::Download {
            return Ok(());
        }

        let unpacked = self.unpack(&downloads)?;
        self.complete(&mut state, Stage::Unpack)?;
        if target == Stage::Unpack {
            return Ok(());
        }

        let build_dir = self.configure(&downloads, &unpacked, &state, options)?;
        self.complete(&mut state, Stage::Configure)?;
        if target == Stage::Configure {
            return Ok(());
        }

        self.build(&build_dir, &state, options)?;
        self.complete(&mut state, Stage::Build)?;
        self.copy_extras()
    }

    fn complete(&self, state: &mut BuildState, stage: Stage) -> Result<()> {
        state.mark_complete(stage);
        state.save(&self.config.state_file())
    }

    fn host_tools(&self) -> Result<&HostTools> {
        self.tools.as_ref().ok_or_else(|| ToolchainError::Environment {
            tool: "CMake".to_string(),
            hint: "Host build tools were not detected.".to_string(),
        })
    }

    pub fn download(&self, state: &mut BuildState) -> Result<Downloads> {
        info!("Checking downloaded files...");
        let resolver = ReleaseResolver::new(self.fetcher);
        let cache = ArchiveCache::new(self.config.dl_dir(), self.config.state_file());
        create_dir_all(cache.dir())?;

        info!("Fetching GNU ARM Embedded Toolchain releases...");
        let cross_toolchain =
            resolver.resolve_cross_toolchain(&self.config.cross_toolchain, self.config.layout())?;
        let cross_toolchain_archive = cache.ensure_cached(&cross_toolchain, self.fetcher, state)?;

        info!("Fetching LLVM releases...");
        let mut sources = Vec::new();
        for (component, artifact) in resolver.resolve_sources(&self.config.llvm_sources)? {
            let path = cache.ensure_cached(&artifact, self.fetcher, state)?;
            sources.push(SourceArchive {
                component,
                artifact,
                path,
            });
        }

        Ok(Downloads {
            cross_toolchain,
            cross_toolchain_archive,
            sources,
        })
    }

    pub fn unpack(&self, downloads: &Downloads) -> Result<Unpacked> {
        let src_dir = self.config.src_dir();
        let dist = self.config.dist_dir();
        create_dir_all(&src_dir)?;
        create_dir_all(&dist)?;

        let layout = self.config.layout();
        let link_suffix = self
            .config
            .cross_toolchain
            .platform_suffix
            .as_deref()
            .unwrap_or(layout.link_suffix);
        let toolchain_dir = unpack_cross_toolchain(
            &downloads.cross_toolchain_archive,
            &downloads.cross_toolchain,
            layout,
            link_suffix,
            &src_dir,
        )?;
        let gcc_version = assemble_prefix(&toolchain_dir, &dist, layout)?;

        let llvm_source_dir = unpack_sources(&downloads.sources, &src_dir)?;
        let llvm_version = llvm_version(downloads.llvm()?.stem()).to_string();
        debug!("gcc {}, llvm {}", gcc_version, llvm_version);

        Ok(Unpacked {
            llvm_source_dir,
            gcc_version,
            llvm_version,
        })
    }

    /// Configures the LLVM build directory and records component versions.
    /// Returns the build directory.
    pub fn configure(
        &self,
        downloads: &Downloads,
        unpacked: &Unpacked,
        state: &BuildState,
        options: PipelineOptions,
    ) -> Result<PathBuf> {
        let tools = self.host_tools()?;
        let build_dir = self.config.build_dir().join(downloads.llvm()?.stem());
        let dist = self.config.dist_dir();
        create_dir_all(&build_dir)?;

        info!("Configuring sources...");
        if options.reconfigure {
            remove_dir_contents(&build_dir)?;
        }

        if build_dir.join("CMakeFiles").is_dir() && state.is_complete(Stage::Configure) {
            info!("> LLVM is already configured");
        } else {
            info!("> Configuring LLVM...");
            let cmd = cmake::configure_command(
                tools,
                self.config.layout(),
                &unpacked.llvm_source_dir,
                &build_dir,
                &dist,
            );
            run_checked(self.runner, &cmd)?;
        }

        VersionRecord::new("gcc", unpacked.gcc_version.as_str()).write_to(&dist)?;
        VersionRecord::new("llvm", unpacked.llvm_version.as_str()).write_to(&dist)?;
        Ok(build_dir)
    }

    pub fn build(
        &self,
        build_dir: &Path,
        state: &BuildState,
        options: PipelineOptions,
    ) -> Result<()> {
        let tools = self.host_tools()?;
        let layout = self.config.layout();
        let clang = self.config.dist_dir().join("bin").join(layout.exe_name("clang"));

        info!("Building...");
        if !options.rebuild && clang.is_file() && state.is_complete(Stage::Build) {
            info!("> LLVM is already built");
            return Ok(());
        }
        info!("> Building LLVM...");
        let cmd = native::install_command(tools, layout, build_dir, self.config.jobs)?;
        run_checked(self.runner, &cmd)
    }

    /// Stamps `<root>/extras` over the install prefix, overwriting on every run.
    pub fn copy_extras(&self) -> Result<()> {
        let extras = self.config.extras_dir();
        if !extras.is_dir() {
            warn!("No extras directory at {}, skipping", extras.display());
            return Ok(());
        }
        let copied = merge_tree(&extras, &self.config.dist_dir())?;
        debug!("Copied {} extra files into the prefix", copied);
        Ok(())
    }
}
