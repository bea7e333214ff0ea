// armtc-core/src/lib.rs
pub mod build;
pub mod cache;
pub mod install;
pub mod pipeline;
pub mod state;

pub use build::{CommandRunner, HostTools, SystemRunner};
pub use cache::ArchiveCache;
pub use pipeline::{clean, Pipeline};
pub use state::BuildState;
