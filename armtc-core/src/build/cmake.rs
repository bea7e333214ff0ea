// armtc-core/src/build/cmake.rs
use std::path::Path;

use armtc_common::model::{PlatformLayout, TARGET_TRIPLE};
use armtc_io::process::CommandSpec;

use super::devtools::HostTools;

/// The CMake invocation that configures a cross-compiling, ARM-only LLVM.
pub fn configure_command(
    tools: &HostTools,
    layout: &PlatformLayout,
    source_dir: &Path,
    build_dir: &Path,
    install_prefix: &Path,
) -> CommandSpec {
    let prefix = install_prefix.display().to_string();
    let mut cmd = CommandSpec::new(&tools.cmake)
        .current_dir(build_dir)
        .arg("-G")
        .arg(layout.cmake_generator)
        .args(layout.cmake_generator_args.iter().copied())
        .arg("-Wno-dev");

    if let Some(python) = &tools.python {
        cmd = cmd.arg(format!("-DPYTHON_EXECUTABLE={}", python.display()));
    }

    cmd = cmd.args([
        "-DCMAKE_BUILD_TYPE=Release".to_string(),
        "-DCMAKE_CROSSCOMPILING=True".to_string(),
        format!("-DCMAKE_INSTALL_PREFIX={prefix}"),
        format!("-DCMAKE_PREFIX_PATH={prefix}"),
        "-DLLVM_INCLUDE_TESTS=OFF".to_string(),
        "-DLLVM_INCLUDE_EXAMPLES=OFF".to_string(),
        "-DCLANG_INCLUDE_DOCS=OFF".to_string(),
        "-DLLVM_TARGETS_TO_BUILD=ARM".to_string(),
        format!("-DLLVM_DEFAULT_TARGET_TRIPLE={TARGET_TRIPLE}"),
    ]);

    if tools.clang.is_some() {
        cmd = cmd
            .env("CC", "clang")
            .env("CXX", "clang++")
            .arg("-DCMAKE_CXX_FLAGS=-std=c++11 -stdlib=libc++");
    }

    cmd.arg(source_dir.display().to_string())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use armtc_common::model::Platform;

    use super::*;

    fn tools(clang: bool) -> HostTools {
        HostTools {
            cmake: PathBuf::from("/usr/bin/cmake"),
            build_tool: Some(PathBuf::from("/usr/bin/make")),
            clang: clang.then(|| PathBuf::from("/usr/bin/clang")),
            python: None,
        }
    }

    #[test]
    fn unix_configure_targets_arm_only() {
        let cmd = configure_command(
            &tools(false),
            PlatformLayout::for_platform(Platform::Linux),
            Path::new("/w/src/llvm-5.0.0"),
            Path::new("/w/build/llvm-5.0.0"),
            Path::new("/d/arm-none-eabi-llvm-linux"),
        );
        assert_eq!(&cmd.args[..2], ["-G", "Unix Makefiles"]);
        assert!(cmd.args.contains(&"-DLLVM_TARGETS_TO_BUILD=ARM".to_string()));
        assert!(cmd
            .args
            .contains(&"-DCMAKE_INSTALL_PREFIX=/d/arm-none-eabi-llvm-linux".to_string()));
        assert!(cmd
            .args
            .contains(&"-DLLVM_DEFAULT_TARGET_TRIPLE=arm-none-eabi".to_string()));
        assert_eq!(cmd.args.last().map(String::as_str), Some("/w/src/llvm-5.0.0"));
        assert_eq!(cmd.cwd.as_deref(), Some(Path::new("/w/build/llvm-5.0.0")));
        assert!(cmd.envs.is_empty());
    }

    #[test]
    fn clang_host_builds_with_libcxx() {
        let cmd = configure_command(
            &tools(true),
            PlatformLayout::for_platform(Platform::MacOs),
            Path::new("src"),
            Path::new("build"),
            Path::new("dist"),
        );
        assert_eq!(cmd.envs.get("CXX").map(String::as_str), Some("clang++"));
        assert!(cmd
            .args
            .contains(&"-DCMAKE_CXX_FLAGS=-std=c++11 -stdlib=libc++".to_string()));
    }

    #[test]
    fn windows_uses_visual_studio_generator() {
        let cmd = configure_command(
            &tools(false),
            PlatformLayout::for_platform(Platform::Windows),
            Path::new("src"),
            Path::new("build"),
            Path::new("dist"),
        );
        assert_eq!(&cmd.args[..3], ["-G", "Visual Studio 14 2015 Win64", "-Thost=x64"]);
    }
}
