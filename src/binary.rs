use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::extract::ArchiveKind;
use crate::{download, InstallerError};

const CACHE_DIR_NAME: &str = ".release-shim";

/// An executable shipped inside the archive at `url`.
///
/// The install directory is owned by this binary: installing replaces it and
/// uninstalling deletes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binary {
    name: String,
    url: String,
    install_dir: PathBuf,
}

impl Binary {
    /// `install_dir` defaults to a per-URL directory under the user cache.
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        install_dir: Option<PathBuf>,
    ) -> Result<Self, InstallerError> {
        let name = name.into();
        let url = url.into();
        let install_dir = match install_dir {
            Some(dir) => dir,
            None => default_install_dir(&name, &url).map_err(InstallerError::Config)?,
        };
        Ok(Self {
            name,
            url,
            install_dir,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn path(&self) -> PathBuf {
        self.install_dir.join(&self.name)
    }

    pub fn is_installed(&self) -> bool {
        self.path().is_file()
    }

    /// Download and unpack a fresh copy, replacing any previous install.
    ///
    /// The executable is staged in a hidden sibling directory and renamed into
    /// place, so an interrupted install never leaves a partial directory behind.
    /// Nothing is written to disk until the archive has been downloaded and the
    /// executable found in it.
    pub fn install(&self, client: &Client) -> Result<PathBuf, InstallerError> {
        let kind = ArchiveKind::from_url(&self.url).map_err(InstallerError::Extraction)?;
        let staging = self.staging_dir().map_err(InstallerError::Installation)?;

        let archive = download::fetch(client, &self.url).map_err(InstallerError::Download)?;
        let bytes = kind
            .extract(&archive, &self.name)
            .map_err(InstallerError::Extraction)?;

        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| {
                InstallerError::Installation(format!(
                    "failed to clear {}: {e}",
                    staging.display()
                ))
            })?;
        }
        write_executable(&staging.join(&self.name), &bytes)
            .map_err(InstallerError::Installation)?;

        if self.install_dir.exists() {
            fs::remove_dir_all(&self.install_dir).map_err(|e| {
                InstallerError::Installation(format!(
                    "failed to remove previous install at {}: {e}",
                    self.install_dir.display()
                ))
            })?;
        }
        fs::rename(&staging, &self.install_dir).map_err(|e| {
            InstallerError::Installation(format!(
                "failed to move {} to {}: {e}",
                staging.display(),
                self.install_dir.display()
            ))
        })?;

        let path = self.path();
        tracing::info!(path = %path.display(), "installed {}", self.name);
        Ok(path)
    }

    /// Run the executable, installing it first if it is missing.
    pub fn run<I, S>(&self, client: &Client, args: I) -> Result<ExitStatus, InstallerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let path = if self.is_installed() {
            self.path()
        } else {
            tracing::info!("{} is not installed, installing", self.name);
            self.install(client)?
        };

        tracing::debug!(path = %path.display(), "running");
        Command::new(&path)
            .args(args)
            .status()
            .map_err(|e| InstallerError::Run(format!("failed to run {}: {e}", path.display())))
    }

    /// Remove the install directory. Returns `false` if nothing was installed.
    pub fn uninstall(&self) -> Result<bool, InstallerError> {
        if !self.install_dir.exists() {
            tracing::debug!(dir = %self.install_dir.display(), "nothing to uninstall");
            return Ok(false);
        }

        fs::remove_dir_all(&self.install_dir).map_err(|e| {
            InstallerError::Uninstall(format!(
                "failed to remove {}: {e}",
                self.install_dir.display()
            ))
        })?;

        tracing::info!(dir = %self.install_dir.display(), "uninstalled {}", self.name);
        Ok(true)
    }

    fn staging_dir(&self) -> Result<PathBuf, String> {
        let parent = self
            .install_dir
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let dirname = self
            .install_dir
            .file_name()
            .ok_or_else(|| format!("invalid install directory {}", self.install_dir.display()))?;

        let mut staging = OsStr::new(".").to_os_string();
        staging.push(dirname);
        Ok(parent.join(staging))
    }
}

/// Write `bytes` to `path`, creating missing parents, and mark it executable
/// on unix.
fn write_executable(path: &Path, bytes: &[u8]) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| format!("failed to create {}: {e}", dir.display()))?;
    }

    fs::write(path, bytes)
        .map_err(|e| format!("failed to write binary to {}: {e}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .map_err(|e| format!("failed to set permissions on {}: {e}", path.display()))?;
    }

    Ok(())
}

/// `<cache>/.release-shim/<stem>-<hash of url>`, falling back to `$HOME` when
/// the platform has no cache directory.
pub fn default_install_dir(name: &str, url: &str) -> Result<PathBuf, String> {
    let root = dirs::cache_dir()
        .or_else(dirs::home_dir)
        .ok_or("couldn't find your home directory, is $HOME not set?")?;
    Ok(root.join(CACHE_DIR_NAME).join(hashed_dirname(url, name)))
}

fn hashed_dirname(url: &str, name: &str) -> String {
    let stem = name.strip_suffix(".exe").unwrap_or(name);
    let digest = Sha256::digest(url.as_bytes());
    format!("{stem}-{}", hex::encode(&digest[..8]))
}
