// armtc-io/src/lib.rs
//! Synchronous IO operations for armtc (filesystem, archives, json state, checksums, processes)

pub mod checksum;
pub mod extract;
pub mod fs;
pub mod json_io;
pub mod process;

pub use checksum::{sha256_file, verify_checksum};
pub use extract::extract_archive;
pub use json_io::{read_json, write_json};
pub use process::{run_command_inherited, CommandSpec};
