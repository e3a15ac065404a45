pub mod binary;
pub mod browser;
mod download;
mod extract;
pub mod page;
pub mod platform;
pub mod release;

use std::fs;
use std::path::{Path, PathBuf};

pub use binary::Binary;
pub use platform::{
    DarwinArm64, HostDescriptor, PlatformKey, PlatformTable, Resolver, UnsupportedPlatform,
};
pub use release::Project;

#[derive(Debug, thiserror::Error)]
pub enum InstallerError {
    #[error(transparent)]
    UnsupportedPlatform(#[from] UnsupportedPlatform),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("download failed: {0}")]
    Download(String),

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("installation failed: {0}")]
    Installation(String),

    #[error("failed to run binary: {0}")]
    Run(String),

    #[error("uninstall failed: {0}")]
    Uninstall(String),

    #[error("page rendering failed: {0}")]
    Page(String),
}

/// Resolve `host` and point a [`Binary`] at the matching release asset.
pub fn binary_for_host(
    project: &Project,
    resolver: &Resolver,
    host: &HostDescriptor,
    install_dir: Option<PathBuf>,
) -> Result<Binary, InstallerError> {
    let key = resolver.resolve(host)?;
    Binary::new(
        project.executable_name(&key),
        project.asset_url(&key),
        install_dir,
    )
}

/// Render the install page from `src_dir` into `dst_dir`, taking the version
/// from the Cargo manifest at `manifest_path`.
pub fn render_page(
    src_dir: &Path,
    dst_dir: &Path,
    manifest_path: &Path,
) -> Result<Vec<PathBuf>, InstallerError> {
    let manifest = fs::read_to_string(manifest_path).map_err(|e| {
        InstallerError::Page(format!("failed to read {}: {e}", manifest_path.display()))
    })?;
    let version = page::manifest_version(&manifest).map_err(InstallerError::Page)?;
    page::render(src_dir, dst_dir, &version).map_err(InstallerError::Page)
}
