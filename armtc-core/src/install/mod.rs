// armtc-core/src/install/mod.rs
//! Tree assembly: the install prefix and the LLVM source tree.

pub mod sources;
pub mod toolchain;

pub use sources::{llvm_version, unpack_sources, SourceArchive};
pub use toolchain::{assemble_prefix, unpack_cross_toolchain};
