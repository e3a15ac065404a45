use crate::platform::PlatformKey;

pub const DEFAULT_HOST: &str = "github.com";
pub const DEFAULT_ARCHIVE_EXT: &str = "tar.gz";

/// A project that publishes one prebuilt archive per platform on a release page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub host: String,
    pub owner: String,
    pub name: String,
    /// Stored without a leading `v`; the tag adds it back.
    pub version: String,
    pub archive_ext: String,
}

impl Project {
    pub fn new(owner: impl Into<String>, name: impl Into<String>, version: &str) -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            owner: owner.into(),
            name: name.into(),
            version: version.strip_prefix('v').unwrap_or(version).to_string(),
            archive_ext: DEFAULT_ARCHIVE_EXT.to_string(),
        }
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_archive_ext(mut self, ext: &str) -> Self {
        self.archive_ext = ext.trim_start_matches('.').to_string();
        self
    }

    pub fn tag(&self) -> String {
        format!("v{}", self.version)
    }

    pub fn asset_name(&self, key: &PlatformKey) -> String {
        format!("{}-{}-{key}.{}", self.name, self.tag(), self.archive_ext)
    }

    /// `host` without a scheme is served over https.
    pub fn base_url(&self) -> String {
        if self.host.starts_with("http://") || self.host.starts_with("https://") {
            self.host.trim_end_matches('/').to_string()
        } else {
            format!("https://{}", self.host)
        }
    }

    pub fn asset_url(&self, key: &PlatformKey) -> String {
        format!(
            "{}/{}/{}/releases/download/{}/{}",
            self.base_url(),
            self.owner,
            self.name,
            self.tag(),
            self.asset_name(key)
        )
    }

    /// File name of the executable inside the archive for `key`.
    pub fn executable_name(&self, key: &PlatformKey) -> String {
        if key.is_windows() {
            format!("{}.exe", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Read the `version` field of an npm `package.json`.
pub fn version_from_package_json(text: &str) -> Result<String, String> {
    let body: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| format!("failed to parse package.json: {e}"))?;

    body["version"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| "package.json has no string \"version\" field".to_string())
}
