use std::fmt;
use std::str::FromStr;

/// Which set of install instructions to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Category {
    #[default]
    Unknown,
    Win64,
    Unix,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Unknown, Self::Win64, Self::Unix];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Win64 => "win64",
            Self::Unix => "unix",
        }
    }

    /// Category at `index` in [`Category::ALL`].
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn element_id(self) -> String {
        format!("platform-instructions-{}", self.as_str())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    /// Accepts a category name or its index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index)
                .ok_or_else(|| format!("category index {index} out of range"));
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category '{s}'"))
    }
}

/// The navigator fields a page can read. Any of them may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Navigator {
    pub platform: Option<String>,
    pub app_version: Option<String>,
    pub user_agent: Option<String>,
    pub oscpu: Option<String>,
}

const LEADING_UNIX_PLATFORMS: &[&str] = &[
    "Linux x86_64",
    "Linux i686",
    "Linux i686 on x86_64",
    "Linux aarch64",
    "Linux armv6l",
    "Linux armv7l",
    "Linux armv8l",
    "Linux ppc64",
    "Linux mips",
    "Linux mips64",
    "Mac",
];

const TRAILING_UNIX_PLATFORMS: &[&str] = &[
    "FreeBSD x86_64",
    "FreeBSD amd64",
    "NetBSD x86_64",
    "NetBSD amd64",
];

const APP_VERSION_UNIX: &[&str] = &["Mac", "FreeBSD"];

const OSCPU_UNIX: &[&str] = &["Mac", "Linux", "FreeBSD", "NetBSD"];

fn contains(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| value.contains(needle))
}

/// Exact platform matches plus the Win64 user-agent markers. Later checks
/// overwrite earlier ones.
fn by_platform(nav: &Navigator) -> Category {
    let platform = nav.platform.as_deref();
    let user_agent = nav.user_agent.as_deref();
    let mut category = Category::Unknown;

    if platform.is_some_and(|p| LEADING_UNIX_PLATFORMS.contains(&p)) {
        category = Category::Unix;
    }
    if platform == Some("Win64") || contains(user_agent, "WOW64") || contains(user_agent, "Win64") {
        category = Category::Win64;
    }
    if platform.is_some_and(|p| TRAILING_UNIX_PLATFORMS.contains(&p)) {
        category = Category::Unix;
    }
    category
}

fn by_app_version(nav: &Navigator) -> Option<Category> {
    let app_version = nav.app_version.as_deref();
    APP_VERSION_UNIX
        .iter()
        .any(|needle| contains(app_version, needle))
        .then_some(Category::Unix)
}

/// Firefox hides platform and appVersion but still reports oscpu, so this
/// layer is trusted over the others.
fn by_oscpu(oscpu: &str, mut category: Category) -> Category {
    if oscpu.contains("Win64") {
        category = Category::Win64;
    }
    if OSCPU_UNIX.iter().any(|needle| oscpu.contains(needle)) {
        category = Category::Unix;
    }
    category
}

/// Classify navigator strings. Unrecognised input is [`Category::Unknown`],
/// never an error.
pub fn detect_category(nav: &Navigator, platform_override: Option<Category>) -> Category {
    if let Some(category) = platform_override {
        return category;
    }

    let mut category = by_platform(nav);

    if category == Category::Unknown {
        category = by_app_version(nav).unwrap_or(category);
    }

    if let Some(oscpu) = nav.oscpu.as_deref() {
        category = by_oscpu(oscpu, category);
    }

    tracing::debug!(%category, "detected browser platform");
    category
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    pub element_id: String,
    pub visible: bool,
}

/// Visibility of every instructions panel; only `shown` is visible.
pub fn panel_states(shown: Category) -> Vec<PanelState> {
    Category::ALL
        .into_iter()
        .map(|category| PanelState {
            element_id: category.element_id(),
            visible: category == shown,
        })
        .collect()
}

/// Raw values echoed on the page so users can paste them into bug reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BugReport {
    pub nav_plat: String,
    pub nav_app: String,
}

impl BugReport {
    pub fn from_navigator(nav: &Navigator) -> Self {
        Self {
            nav_plat: nav.platform.clone().unwrap_or_default(),
            nav_app: nav.app_version.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    fn with_platform(platform: &str) -> Navigator {
        Navigator {
            platform: Some(platform.to_string()),
            ..Navigator::default()
        }
    }

    #[test]
    fn linux_platform_is_unix() {
        assert_eq!(detect_category(&with_platform("Linux x86_64"), None), Category::Unix);
        assert_eq!(detect_category(&with_platform("Linux armv7l"), None), Category::Unix);
        assert_eq!(detect_category(&with_platform("Mac"), None), Category::Unix);
    }

    #[test]
    fn bsd_platform_is_unix() {
        assert_eq!(detect_category(&with_platform("FreeBSD amd64"), None), Category::Unix);
        assert_eq!(detect_category(&with_platform("NetBSD x86_64"), None), Category::Unix);
    }

    #[test]
    fn nothing_matches_is_unknown() {
        assert_eq!(detect_category(&Navigator::default(), None), Category::Unknown);
        assert_eq!(detect_category(&with_platform("Win32"), None), Category::Unknown);
    }

    #[test]
    fn win64_from_platform_or_user_agent() {
        assert_eq!(detect_category(&with_platform("Win64"), None), Category::Win64);

        let nav = Navigator {
            platform: Some("Win32".into()),
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; WOW64)".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Win64);
    }

    #[test]
    fn user_agent_win64_beats_leading_unix_table() {
        let nav = Navigator {
            platform: Some("Linux x86_64".into()),
            user_agent: Some("Mozilla/5.0 (Windows NT 10.0; Win64; x64)".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Win64);
    }

    #[test]
    fn trailing_bsd_table_beats_user_agent() {
        let nav = Navigator {
            platform: Some("FreeBSD x86_64".into()),
            user_agent: Some("Win64".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Unix);
    }

    #[test]
    fn app_version_consulted_only_when_unknown() {
        let nav = Navigator {
            app_version: Some("5.0 (Macintosh; Intel Mac OS X 10_15_7)".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Unix);

        let nav = Navigator {
            platform: Some("Win64".into()),
            app_version: Some("5.0 (X11; FreeBSD amd64)".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Win64);
    }

    #[test]
    fn oscpu_win64_overrides_platform() {
        let nav = Navigator {
            platform: Some("Linux x86_64".into()),
            oscpu: Some("Windows NT 10.0; Win64; x64".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Win64);
    }

    #[test]
    fn oscpu_unix_markers() {
        for oscpu in ["Intel Mac OS X 10.15", "Linux x86_64", "FreeBSD amd64", "NetBSD"] {
            let nav = Navigator {
                oscpu: Some(oscpu.into()),
                ..Navigator::default()
            };
            assert_eq!(detect_category(&nav, None), Category::Unix, "{oscpu}");
        }
    }

    #[test]
    fn oscpu_without_markers_keeps_earlier_result() {
        let nav = Navigator {
            platform: Some("Linux aarch64".into()),
            oscpu: Some("SunOS".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, None), Category::Unix);
    }

    #[test]
    fn override_bypasses_heuristics() {
        let nav = Navigator {
            platform: Some("Linux x86_64".into()),
            oscpu: Some("Linux".into()),
            ..Navigator::default()
        };
        assert_eq!(detect_category(&nav, Some(Category::Win64)), Category::Win64);
        assert_eq!(
            detect_category(&Navigator::default(), Some(Category::Unix)),
            Category::Unix
        );
    }

    #[test]
    fn category_parsing() {
        assert_eq!(Category::from_index(0), Some(Category::Unknown));
        assert_eq!(Category::from_index(2), Some(Category::Unix));
        assert_eq!(Category::from_index(3), None);
        assert_eq!("1".parse::<Category>(), Ok(Category::Win64));
        assert_eq!("unix".parse::<Category>(), Ok(Category::Unix));
        assert!("win32".parse::<Category>().is_err());
        assert!("7".parse::<Category>().is_err());
    }

    #[test]
    fn exactly_one_panel_visible() {
        for category in Category::ALL {
            let states = panel_states(category);
            assert_eq!(states.len(), 3);
            let visible: Vec<_> = states.iter().filter(|s| s.visible).collect();
            assert_eq!(visible.len(), 1);
            assert_eq!(visible[0].element_id, category.element_id());
        }
        assert_eq!(
            panel_states(Category::Unknown)[0].element_id,
            "platform-instructions-unknown"
        );
    }

    #[test]
    fn bug_report_copies_raw_strings() {
        let nav = Navigator {
            platform: Some("Linux x86_64".into()),
            app_version: Some("5.0 (X11)".into()),
            ..Navigator::default()
        };
        let report = BugReport::from_navigator(&nav);
        assert_eq!(report.nav_plat, "Linux x86_64");
        assert_eq!(report.nav_app, "5.0 (X11)");
        assert_eq!(BugReport::from_navigator(&Navigator::default()), BugReport::default());
    }
}
