use std::env::consts::{ARCH, OS};
use std::fmt;
use std::str::FromStr;

/// Facts about the host, named the way Node's `os.type()` / `os.arch()` name them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostDescriptor {
    pub os_kind: String,
    pub os_version_hint: Option<String>,
    pub arch: String,
    pub user_agent_hints: Vec<String>,
}

impl HostDescriptor {
    pub fn new(os_kind: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os_kind: os_kind.into(),
            os_version_hint: None,
            arch: arch.into(),
            user_agent_hints: Vec::new(),
        }
    }

    /// Describe the platform this process is running on.
    pub fn current() -> Self {
        Self::new(os_kind_for(OS), arch_for(ARCH))
    }
}

fn os_kind_for(os: &str) -> String {
    match os {
        "windows" => "Windows_NT",
        "linux" => "Linux",
        "macos" => "Darwin",
        "freebsd" => "FreeBSD",
        other => other,
    }
    .to_string()
}

fn arch_for(arch: &str) -> String {
    match arch {
        "x86_64" => "x64",
        "aarch64" => "arm64",
        "x86" => "ia32",
        other => other,
    }
    .to_string()
}

/// Target triple identifying a prebuilt artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlatformKey(String);

impl PlatformKey {
    pub fn new(triple: impl Into<String>) -> Self {
        Self(triple.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_windows(&self) -> bool {
        self.0.contains("windows")
    }
}

impl fmt::Display for PlatformKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported platform: {os_kind} {arch}")]
pub struct UnsupportedPlatform {
    pub os_kind: String,
    pub arch: String,
}

/// Which artifact an Apple Silicon host receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DarwinArm64 {
    /// Serve the x86_64 build and rely on Rosetta translation.
    #[default]
    Rosetta,
    /// Serve a native aarch64 build.
    Native,
}

impl FromStr for DarwinArm64 {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rosetta" => Ok(Self::Rosetta),
            "native" => Ok(Self::Native),
            other => Err(format!(
                "unknown darwin arm64 policy '{other}' (expected 'rosetta' or 'native')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsMatch {
    Exact(String),
    /// Vendor variants such as `MINGW32_NT-10.0` carry a version suffix.
    Prefix(String),
}

impl OsMatch {
    fn matches(&self, os_kind: &str) -> bool {
        match self {
            Self::Exact(name) => os_kind == name,
            Self::Prefix(prefix) => os_kind.starts_with(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformRule {
    pub os: Vec<OsMatch>,
    pub arches: Vec<String>,
    pub key: PlatformKey,
}

impl PlatformRule {
    pub fn new(os: Vec<OsMatch>, arches: &[&str], key: &str) -> Self {
        Self {
            os,
            arches: arches.iter().map(|a| (*a).to_string()).collect(),
            key: PlatformKey::new(key),
        }
    }

    fn matches(&self, host: &HostDescriptor) -> bool {
        self.os.iter().any(|m| m.matches(&host.os_kind))
            && self.arches.iter().any(|a| *a == host.arch)
    }
}

/// Ordered lookup table; the first matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformTable {
    rules: Vec<PlatformRule>,
}

impl Default for PlatformTable {
    fn default() -> Self {
        Self::with_darwin_arm64(DarwinArm64::default())
    }
}

impl PlatformTable {
    pub const fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_darwin_arm64(policy: DarwinArm64) -> Self {
        let windows = vec![
            OsMatch::Exact("Windows_NT".into()),
            OsMatch::Prefix("MINGW32_NT-".into()),
            OsMatch::Prefix("MINGW64_NT-".into()),
            OsMatch::Prefix("MSYS_NT-".into()),
            OsMatch::Prefix("CYGWIN_NT-".into()),
        ];
        let linux = || vec![OsMatch::Exact("Linux".into())];
        let darwin = || vec![OsMatch::Exact("Darwin".into())];

        let darwin_arm64 = match policy {
            DarwinArm64::Rosetta => "x86_64-apple-darwin",
            DarwinArm64::Native => "aarch64-apple-darwin",
        };

        let mut table = Self::empty();
        table.push(PlatformRule::new(windows, &["x64"], "x86_64-pc-windows-msvc"));
        table.push(PlatformRule::new(linux(), &["x64"], "x86_64-unknown-linux-musl"));
        table.push(PlatformRule::new(linux(), &["arm64"], "aarch64-unknown-linux-musl"));
        table.push(PlatformRule::new(darwin(), &["x64"], "x86_64-apple-darwin"));
        table.push(PlatformRule::new(darwin(), &["arm64"], darwin_arm64));
        table
    }

    pub fn push(&mut self, rule: PlatformRule) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[PlatformRule] {
        &self.rules
    }

    /// Look up one of this table's keys by name.
    pub fn key(&self, name: &str) -> Option<PlatformKey> {
        self.rules
            .iter()
            .find(|rule| rule.key.as_str() == name)
            .map(|rule| rule.key.clone())
    }

    fn lookup(&self, host: &HostDescriptor) -> Option<&PlatformKey> {
        self.rules
            .iter()
            .find(|rule| rule.matches(host))
            .map(|rule| &rule.key)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    table: PlatformTable,
    platform_override: Option<PlatformKey>,
}

impl Resolver {
    pub const fn new(table: PlatformTable) -> Self {
        Self {
            table,
            platform_override: None,
        }
    }

    /// Force every resolution to return `key`, skipping detection.
    #[must_use]
    pub fn with_override(mut self, key: Option<PlatformKey>) -> Self {
        self.platform_override = key;
        self
    }

    pub fn resolve(&self, host: &HostDescriptor) -> Result<PlatformKey, UnsupportedPlatform> {
        if let Some(key) = &self.platform_override {
            tracing::debug!(%key, "platform override in effect");
            return Ok(key.clone());
        }

        let Some(key) = self.table.lookup(host) else {
            return Err(UnsupportedPlatform {
                os_kind: host.os_kind.clone(),
                arch: host.arch.clone(),
            });
        };

        tracing::debug!(os_kind = %host.os_kind, arch = %host.arch, %key, "resolved platform");
        Ok(key.clone())
    }
}

/// Resolve against the default table with no override.
pub fn resolve(os_kind: &str, arch: &str) -> Result<PlatformKey, UnsupportedPlatform> {
    Resolver::default().resolve(&HostDescriptor::new(os_kind, arch))
}
