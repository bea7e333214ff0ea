// armtc-net/src/resolver.rs
//! Turns listing pages into concrete download URLs.

use armtc_common::error::{Result, ToolchainError};
use armtc_common::model::{
    ArchiveKind, ArtifactSpec, PlatformLayout, ResolvedArtifact, SourceComponent,
};
use tracing::{debug, info};
use url::Url;

use crate::http::Fetcher;
use crate::listing::{link_filename, parse_links};
use crate::validation::validate_url;

pub struct ReleaseResolver<'a> {
    fetcher: &'a dyn Fetcher,
}

impl<'a> ReleaseResolver<'a> {
    pub fn new(fetcher: &'a dyn Fetcher) -> Self {
        Self { fetcher }
    }

    /// Picks the first cross-toolchain link built for this host.
    pub fn resolve_cross_toolchain(
        &self,
        spec: &ArtifactSpec,
        layout: &PlatformLayout,
    ) -> Result<ResolvedArtifact> {
        let base = validate_url(&spec.listing_url)?;
        let links = self.links(spec)?;
        let suffix = spec
            .platform_suffix
            .as_deref()
            .unwrap_or(layout.link_suffix);

        let link = links
            .iter()
            .find(|link| link.contains(suffix))
            .ok_or_else(|| ToolchainError::Resolution {
                pattern: format!("{} + {}", spec.link_pattern, suffix),
                listing_url: spec.listing_url.clone(),
            })?;

        let filename = link_filename(link).to_string();
        let archive_kind =
            ArchiveKind::from_filename(&filename).unwrap_or(layout.archive_kind);
        let resolved = ResolvedArtifact {
            name: spec.name.clone(),
            download_url: absolute_url(&base, link)?,
            filename,
            archive_kind,
            sha256: None,
        };
        info!("Resolved {} -> {}", resolved.name, resolved.download_url);
        Ok(resolved)
    }

    /// Finds the llvm, clang and lld source archives, fetching the listing once.
    pub fn resolve_sources(
        &self,
        spec: &ArtifactSpec,
    ) -> Result<Vec<(SourceComponent, ResolvedArtifact)>> {
        let base = validate_url(&spec.listing_url)?;
        let links = self.links(spec)?;

        SourceComponent::ALL
            .iter()
            .map(|component| -> Result<(SourceComponent, ResolvedArtifact)> {
                let prefix = component.link_prefix();
                let link = links
                    .iter()
                    .find(|link| link_filename(link).starts_with(prefix))
                    .ok_or_else(|| ToolchainError::Resolution {
                        pattern: format!("{}*{}", prefix, spec.link_pattern),
                        listing_url: spec.listing_url.clone(),
                    })?;
                let filename = link_filename(link).to_string();
                let resolved = ResolvedArtifact {
                    name: component.name().to_string(),
                    download_url: absolute_url(&base, link)?,
                    archive_kind: ArchiveKind::from_filename(&filename)
                        .unwrap_or(ArchiveKind::TarXz),
                    filename,
                    sha256: None,
                };
                info!("Resolved {} -> {}", resolved.name, resolved.download_url);
                Ok((*component, resolved))
            })
            .collect()
    }

    fn links(&self, spec: &ArtifactSpec) -> Result<Vec<String>> {
        debug!("Scanning {} for '{}'", spec.listing_url, spec.link_pattern);
        let html = self.fetcher.fetch_text(&spec.listing_url)?;
        parse_links(&html, &spec.link_pattern)
    }
}

fn absolute_url(base: &Url, link: &str) -> Result<String> {
    let joined = base.join(link).map_err(|e| {
        ToolchainError::Validation(format!("Cannot resolve link '{link}' against {base}: {e}"))
    })?;
    Ok(joined.to_string())
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::path::Path;

    use armtc_common::model::Platform;
    use rstest::rstest;

    use super::*;

    struct PageFetcher {
        html: &'static str,
        fetches: Cell<usize>,
    }

    impl PageFetcher {
        fn new(html: &'static str) -> Self {
            Self {
                html,
                fetches: Cell::new(0),
            }
        }
    }

    impl Fetcher for PageFetcher {
        fn fetch_text(&self, _url: &str) -> Result<String> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(self.html.to_string())
        }

        fn download(&self, url: &str, _dest: &Path) -> Result<u64> {
            Err(ToolchainError::Generic(format!("unexpected download of {url}")))
        }
    }

    const ARM_PAGE: &str = r#"
        <a href="/-/media/Files/downloads/gnu-rm/7-2017q4/gcc-arm-none-eabi-7-2017-q4-major-win32.zip?revision=df1b&amp;la=en">Windows 32-bit ZIP</a>
        <a href="/-/media/Files/downloads/gnu-rm/7-2017q4/gcc-arm-none-eabi-7-2017-q4-major-win32-sha2.exe">Windows installer</a>
        <a href="/-/media/Files/downloads/gnu-rm/7-2017q4/gcc-arm-none-eabi-7-2017-q4-major-linux.tar.bz2?revision=375265d4&amp;la=en">Linux 64-bit</a>
        <a href="/-/media/Files/downloads/gnu-rm/7-2017q4/gcc-arm-none-eabi-7-2017-q4-major-mac.tar.bz2?revision=7f453378&amp;la=en">Mac OS X 64-bit</a>
        <a href="/-/media/Files/downloads/gnu-rm/6-2017q2/gcc-arm-none-eabi-6-2017-q2-update-linux.tar.bz2">Older Linux</a>"#;

    const LLVM_PAGE: &str = r#"
        <a href="5.0.0/llvm-5.0.0.src.tar.xz">LLVM</a>
        <a href="5.0.0/cfe-5.0.0.src.tar.xz">Clang</a>
        <a href="5.0.0/lld-5.0.0.src.tar.xz">LLD</a>
        <a href="4.0.1/llvm-4.0.1.src.tar.xz">LLVM 4</a>"#;

    fn arm_spec(platform: Platform) -> ArtifactSpec {
        ArtifactSpec {
            name: "gcc-arm-none-eabi".to_string(),
            listing_url: "https://developer.arm.com/open-source/gnu-toolchain/gnu-rm/downloads"
                .to_string(),
            link_pattern: "gcc-arm-none-eabi-".to_string(),
            platform_suffix: Some(PlatformLayout::for_platform(platform).link_suffix.to_string()),
        }
    }

    fn llvm_spec() -> ArtifactSpec {
        ArtifactSpec {
            name: "llvm".to_string(),
            listing_url: "https://releases.llvm.org/download.html".to_string(),
            link_pattern: r"\.src\.tar\.xz$".to_string(),
            platform_suffix: None,
        }
    }

    #[rstest]
    #[case(Platform::Windows, "gcc-arm-none-eabi-7-2017-q4-major-win32.zip", ArchiveKind::Zip)]
    #[case(Platform::Linux, "gcc-arm-none-eabi-7-2017-q4-major-linux.tar.bz2", ArchiveKind::TarBz2)]
    #[case(Platform::MacOs, "gcc-arm-none-eabi-7-2017-q4-major-mac.tar.bz2", ArchiveKind::TarBz2)]
    fn picks_first_link_for_host(
        #[case] platform: Platform,
        #[case] filename: &str,
        #[case] kind: ArchiveKind,
    ) {
        let fetcher = PageFetcher::new(ARM_PAGE);
        let resolver = ReleaseResolver::new(&fetcher);
        let resolved = resolver
            .resolve_cross_toolchain(&arm_spec(platform), PlatformLayout::for_platform(platform))
            .unwrap();

        assert_eq!(resolved.filename, filename);
        assert_eq!(resolved.archive_kind, kind);
        assert!(resolved
            .download_url
            .starts_with("https://developer.arm.com/-/media/Files/downloads/gnu-rm/7-2017q4/"));
        assert!(!resolved.download_url.contains("&amp;"));
    }

    #[test]
    fn missing_host_archive_is_a_resolution_error() {
        let fetcher = PageFetcher::new(LLVM_PAGE);
        let resolver = ReleaseResolver::new(&fetcher);
        let err = resolver
            .resolve_cross_toolchain(
                &arm_spec(Platform::Linux),
                PlatformLayout::for_platform(Platform::Linux),
            )
            .unwrap_err();
        assert!(matches!(err, ToolchainError::Resolution { .. }));
    }

    #[test]
    fn sources_come_from_a_single_listing_fetch() {
        let fetcher = PageFetcher::new(LLVM_PAGE);
        let resolver = ReleaseResolver::new(&fetcher);
        let sources = resolver.resolve_sources(&llvm_spec()).unwrap();

        assert_eq!(fetcher.fetches.get(), 1);
        let urls: Vec<_> = sources
            .iter()
            .map(|(c, a)| (c.name(), a.download_url.as_str()))
            .collect();
        assert_eq!(
            urls,
            vec![
                ("llvm", "https://releases.llvm.org/5.0.0/llvm-5.0.0.src.tar.xz"),
                ("clang", "https://releases.llvm.org/5.0.0/cfe-5.0.0.src.tar.xz"),
                ("lld", "https://releases.llvm.org/5.0.0/lld-5.0.0.src.tar.xz"),
            ]
        );
    }

    #[test]
    fn missing_source_component_fails() {
        let fetcher = PageFetcher::new(
            r#"<a href="5.0.0/llvm-5.0.0.src.tar.xz">x</a><a href="5.0.0/cfe-5.0.0.src.tar.xz">y</a>"#,
        );
        let resolver = ReleaseResolver::new(&fetcher);
        let err = resolver.resolve_sources(&llvm_spec()).unwrap_err();
        assert!(err.to_string().contains("lld-"));
    }
}
