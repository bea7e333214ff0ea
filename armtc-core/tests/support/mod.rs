// Shared fixture for the pipeline integration tests: archives built on the
// fly, a listing-serving fake fetcher and a recording fake command runner.
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use armtc_common::config::Config;
use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::{Platform, PlatformLayout};
use armtc_core::build::{CommandRunner, HostTools};
use armtc_core::install::toolchain::BINUTILS;
use armtc_io::process::CommandSpec;
use armtc_net::http::Fetcher;
use armtc_net::listing::link_filename;
use tempfile::TempDir;

pub const GCC_VERSION: &str = "7.2.1";
pub const LLVM_VERSION: &str = "5.0.0";
pub const TOOLCHAIN_DIRNAME: &str = "gcc-arm-none-eabi-7-2017-q4-major";

pub fn toolchain_filename(platform: Platform) -> String {
    format!(
        "{TOOLCHAIN_DIRNAME}{}",
        PlatformLayout::for_platform(platform).link_suffix
    )
}

pub fn source_filenames() -> Vec<String> {
    ["llvm", "cfe", "lld"]
        .iter()
        .map(|p| format!("{p}-{LLVM_VERSION}.src.tar.xz"))
        .collect()
}

/// The files of an unpacked GNU ARM toolchain, relative to its root.
fn toolchain_entries(platform: Platform, flat_cxx_headers: bool) -> Vec<(String, Vec<u8>)> {
    let layout = PlatformLayout::for_platform(platform);
    let cxx = if flat_cxx_headers {
        "arm-none-eabi/include/c++".to_string()
    } else {
        format!("arm-none-eabi/include/c++/{GCC_VERSION}")
    };
    let mut entries = vec![
        ("arm-none-eabi/include/stdio.h".to_string(), b"/* stdio */".to_vec()),
        (format!("{cxx}/algorithm"), b"// algorithm".to_vec()),
        (format!("{cxx}/bits/c++config.h"), b"// config".to_vec()),
        ("arm-none-eabi/lib/libc.a".to_string(), b"libc".to_vec()),
        (
            format!("lib/gcc/arm-none-eabi/{GCC_VERSION}/crtbegin.o"),
            b"crtbegin".to_vec(),
        ),
        (
            format!("lib/gcc/arm-none-eabi/{GCC_VERSION}/libgcc.a"),
            b"libgcc".to_vec(),
        ),
    ];
    for tool in BINUTILS {
        entries.push((
            format!("bin/{}", layout.exe_name(&format!("arm-none-eabi-{tool}"))),
            format!("#!/bin/sh\n# {tool}\n").into_bytes(),
        ));
    }
    entries
}

fn write_tar<W: Write>(writer: W, entries: &[(String, Vec<u8>)]) -> W {
    let mut builder = tar::Builder::new(writer);
    for (path, data) in entries {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder.append_data(&mut header, path, data.as_slice()).unwrap();
    }
    builder.into_inner().unwrap()
}

pub fn write_tar_bz2(path: &Path, entries: &[(String, Vec<u8>)]) {
    let encoder = bzip2::write::BzEncoder::new(File::create(path).unwrap(), bzip2::Compression::fast());
    write_tar(encoder, entries).finish().unwrap();
}

pub fn write_tar_xz(path: &Path, entries: &[(String, Vec<u8>)]) {
    let encoder = xz2::write::XzEncoder::new(File::create(path).unwrap(), 1);
    write_tar(encoder, entries).finish().unwrap();
}

pub fn write_zip(path: &Path, entries: &[(String, Vec<u8>)]) {
    let mut writer = zip::ZipWriter::new(File::create(path).unwrap());
    let options = zip::write::SimpleFileOptions::default();
    for (name, data) in entries {
        writer.start_file(name.as_str(), options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap();
}

/// Serves canned listing pages and copies fixture archives on download.
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    archives: HashMap<String, PathBuf>,
    pub downloads: Cell<usize>,
    pub page_fetches: Cell<usize>,
}

impl Fetcher for FakeFetcher {
    fn fetch_text(&self, url: &str) -> Result<String> {
        self.page_fetches.set(self.page_fetches.get() + 1);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ToolchainError::Transfer(url.into(), url.into(), "no page".into()))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let source = self.archives.get(link_filename(url)).ok_or_else(|| {
            ToolchainError::Transfer(url.into(), url.into(), "Resource not found (404)".into())
        })?;
        self.downloads.set(self.downloads.get() + 1);
        Ok(fs::copy(source, dest)?)
    }
}

/// Records every command. `cmake` creates `CMakeFiles/`, the native build
/// installs `bin/clang` unless told to fail.
pub struct FakeRunner {
    pub commands: RefCell<Vec<CommandSpec>>,
    pub fail_build_with: Cell<Option<i32>>,
    clang_path: PathBuf,
}

impl FakeRunner {
    pub fn command_lines(&self) -> Vec<String> {
        self.commands.borrow().iter().map(|c| c.to_string()).collect()
    }

    pub fn programs(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(|c| c.program_name())
            .collect()
    }

    pub fn reset(&self) {
        self.commands.borrow_mut().clear();
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, cmd: &CommandSpec) -> Result<i32> {
        self.commands.borrow_mut().push(cmd.clone());
        let cwd = cmd.cwd.clone().unwrap_or_default();
        match cmd.program_name().as_str() {
            "cmake" => {
                fs::create_dir_all(cwd.join("CMakeFiles"))?;
                fs::write(cwd.join("Makefile"), b"install:\n")?;
                Ok(0)
            }
            _ => {
                if let Some(code) = self.fail_build_with.take() {
                    return Ok(code);
                }
                fs::create_dir_all(self.clang_path.parent().unwrap_or(Path::new(".")))?;
                fs::write(&self.clang_path, b"clang")?;
                Ok(0)
            }
        }
    }
}

pub struct Fixture {
    pub root: TempDir,
    pub config: Config,
    pub fetcher: FakeFetcher,
    pub runner: FakeRunner,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_options(Platform::Linux, false)
    }

    pub fn with_options(platform: Platform, flat_cxx_headers: bool) -> Self {
        let root = tempfile::tempdir().unwrap();
        let config = Config::for_root(root.path(), platform);
        let upstream = root.path().join("upstream");
        fs::create_dir_all(&upstream).unwrap();

        let mut archives = HashMap::new();
        let toolchain = toolchain_entries(platform, flat_cxx_headers);
        let toolchain_file = toolchain_filename(platform);
        let toolchain_path = upstream.join(&toolchain_file);
        match platform {
            // The Windows zip has no top-level directory.
            Platform::Windows => write_zip(&toolchain_path, &toolchain),
            _ => {
                let nested: Vec<_> = toolchain
                    .into_iter()
                    .map(|(p, d)| (format!("{TOOLCHAIN_DIRNAME}/{p}"), d))
                    .collect();
                write_tar_bz2(&toolchain_path, &nested);
            }
        }
        archives.insert(toolchain_file, toolchain_path);

        for filename in source_filenames() {
            let top = format!("{}.src", filename.trim_end_matches(".src.tar.xz"));
            let path = upstream.join(&filename);
            write_tar_xz(
                &path,
                &[(format!("{top}/CMakeLists.txt"), b"project(x)".to_vec())],
            );
            archives.insert(filename, path);
        }

        let mut pages = HashMap::new();
        pages.insert(config.cross_toolchain.listing_url.clone(), arm_listing());
        pages.insert(config.llvm_sources.listing_url.clone(), llvm_listing());

        let clang_path = config
            .dist_dir()
            .join("bin")
            .join(config.layout().exe_name("clang"));

        Self {
            root,
            config,
            fetcher: FakeFetcher {
                pages,
                archives,
                downloads: Cell::new(0),
                page_fetches: Cell::new(0),
            },
            runner: FakeRunner {
                commands: RefCell::new(Vec::new()),
                fail_build_with: Cell::new(None),
                clang_path,
            },
        }
    }

    pub fn host_tools(&self) -> HostTools {
        HostTools {
            cmake: PathBuf::from("cmake"),
            build_tool: Some(PathBuf::from(self.config.layout().build_tool.program())),
            clang: None,
            python: None,
        }
    }

    pub fn dist(&self) -> PathBuf {
        self.config.dist_dir()
    }

    pub fn cache_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.config.dl_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}

fn arm_listing() -> String {
    let base = "/-/media/Files/downloads/gnu-rm/7-2017q4";
    [Platform::Windows, Platform::Linux, Platform::MacOs]
        .iter()
        .map(|p| {
            format!(
                r#"<li><a href="{base}/{}?revision=1&amp;la=en">{p}</a></li>"#,
                toolchain_filename(*p)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn llvm_listing() -> String {
    let mut html = String::from("<ul>\n");
    for filename in source_filenames() {
        html.push_str(&format!(
            "<li><a href=\"{LLVM_VERSION}/{filename}\">{filename}</a> (<a href=\"{LLVM_VERSION}/{filename}.sig\">.sig</a>)</li>\n"
        ));
    }
    html.push_str("<li><a href=\"4.0.1/llvm-4.0.1.src.tar.xz\">old</a></li>\n</ul>");
    html
}
