use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{ExitCode, ExitStatus};

use clap::{Parser, Subcommand};
use release_shim::browser::{self, BugReport, Category, Navigator};
use release_shim::{
    binary_for_host, release, render_page, Binary, DarwinArm64, HostDescriptor, InstallerError,
    PlatformTable, Project, Resolver,
};
use tracing_subscriber::EnvFilter;

/// release-shim - pick, install and run the prebuilt release for this platform
///
/// Set RUST_LOG (e.g. RUST_LOG=debug) to see how the platform was resolved.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the target triple for this host
    Resolve(ReleaseArgs),
    /// Print the release asset URL for this host
    Url(ReleaseArgs),
    /// Download and install the binary, printing its path
    Install(ReleaseArgs),
    /// Run the binary, installing it first if needed
    Run {
        #[command(flatten)]
        release: ReleaseArgs,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<OsString>,
    },
    /// Remove the installed binary
    Uninstall(ReleaseArgs),
    /// Classify browser navigator strings into an install-page category
    Browser(BrowserArgs),
    /// Render the install page with the version from a Cargo manifest
    RenderPage {
        src: PathBuf,
        dst: PathBuf,
        #[arg(long, default_value = "Cargo.toml")]
        manifest: PathBuf,
    },
}

/// Options shared by the subcommands that resolve a release asset.
#[derive(clap::Args, Debug)]
struct ReleaseArgs {
    /// Release owner (the `<owner>` in `<host>/<owner>/<project>`)
    #[arg(long, env = "RELEASE_SHIM_OWNER")]
    owner: Option<String>,

    /// Project name; also the executable name inside the archive
    #[arg(long, env = "RELEASE_SHIM_PROJECT")]
    project: Option<String>,

    /// Release version, with or without a leading `v`
    #[arg(long, env = "RELEASE_SHIM_VERSION")]
    release_version: Option<String>,

    /// Read the release version from this package.json instead
    #[arg(long, value_name = "PATH", conflicts_with = "release_version")]
    package_json: Option<PathBuf>,

    /// Release asset host, optionally with an `http://` or `https://` scheme
    #[arg(long, default_value = release::DEFAULT_HOST)]
    host: String,

    /// Archive extension of the release assets
    #[arg(long, default_value = release::DEFAULT_ARCHIVE_EXT)]
    archive_ext: String,

    /// Skip detection and use this target triple (must be a known key)
    #[arg(long, env = "RELEASE_SHIM_PLATFORM", value_name = "TRIPLE")]
    platform: Option<String>,

    /// Artifact for Apple Silicon hosts: `rosetta` (x86_64 build) or `native`
    #[arg(long, env = "RELEASE_SHIM_DARWIN_ARM64", default_value = "rosetta")]
    darwin_arm64: DarwinArm64,

    /// Install directory (defaults to a per-release directory in the user cache)
    #[arg(long, env = "RELEASE_SHIM_INSTALL_DIR", value_name = "PATH")]
    install_dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct BrowserArgs {
    /// navigator.platform
    #[arg(long)]
    platform_string: Option<String>,
    /// navigator.appVersion
    #[arg(long)]
    app_version: Option<String>,
    /// navigator.userAgent
    #[arg(long)]
    user_agent: Option<String>,
    /// navigator.oscpu
    #[arg(long)]
    oscpu: Option<String>,
    /// Force a category by name or index (0 unknown, 1 win64, 2 unix)
    #[arg(long = "override", value_name = "CATEGORY")]
    category_override: Option<Category>,
    /// Also print panel visibility and bug-report values
    #[arg(long)]
    panels: bool,
}

impl ReleaseArgs {
    fn resolver(&self) -> Result<Resolver, InstallerError> {
        let table = PlatformTable::with_darwin_arm64(self.darwin_arm64);
        let platform_override = match &self.platform {
            Some(name) => Some(table.key(name).ok_or_else(|| {
                InstallerError::Config(format!("unknown platform override '{name}'"))
            })?),
            None => None,
        };
        Ok(Resolver::new(table).with_override(platform_override))
    }

    fn project(&self) -> Result<Project, InstallerError> {
        let owner = self
            .owner
            .as_deref()
            .ok_or_else(|| InstallerError::Config("--owner is required".into()))?;
        let name = self
            .project
            .as_deref()
            .ok_or_else(|| InstallerError::Config("--project is required".into()))?;

        let version = match (&self.release_version, &self.package_json) {
            (Some(version), _) => version.clone(),
            (None, Some(path)) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    InstallerError::Config(format!("failed to read {}: {e}", path.display()))
                })?;
                release::version_from_package_json(&text).map_err(InstallerError::Config)?
            }
            (None, None) => {
                return Err(InstallerError::Config(
                    "--release-version or --package-json is required".into(),
                ))
            }
        };

        Ok(Project::new(owner, name, &version)
            .with_host(self.host.as_str())
            .with_archive_ext(&self.archive_ext))
    }

    fn binary(&self) -> Result<Binary, InstallerError> {
        binary_for_host(
            &self.project()?,
            &self.resolver()?,
            &HostDescriptor::current(),
            self.install_dir.clone(),
        )
    }
}

/// The child's exit code if it fits in ours. Codes outside `0..=255` and
/// deaths by signal have none.
fn forwarded_code(status: ExitStatus) -> Option<u8> {
    status.code().and_then(|code| u8::try_from(code).ok())
}

fn execute(cli: &Cli) -> Result<ExitCode, InstallerError> {
    let client = reqwest::blocking::Client::new;

    match &cli.command {
        Commands::Resolve(release) => {
            let key = release.resolver()?.resolve(&HostDescriptor::current())?;
            println!("{key}");
        }
        Commands::Url(release) => println!("{}", release.binary()?.url()),
        Commands::Install(release) => {
            let path = release.binary()?.install(&client())?;
            println!("{}", path.display());
        }
        Commands::Run { release, args } => {
            let status = release.binary()?.run(&client(), args)?;
            return Ok(forwarded_code(status).map_or(ExitCode::FAILURE, ExitCode::from));
        }
        Commands::Uninstall(release) => {
            let binary = release.binary()?;
            if !binary.uninstall()? {
                println!("{} is not installed", binary.name());
            }
        }
        Commands::Browser(args) => print_browser(args),
        Commands::RenderPage { src, dst, manifest } => {
            for path in render_page(src, dst, manifest)? {
                println!("{}", path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn print_browser(args: &BrowserArgs) {
    let nav = Navigator {
        platform: args.platform_string.clone(),
        app_version: args.app_version.clone(),
        user_agent: args.user_agent.clone(),
        oscpu: args.oscpu.clone(),
    };
    let category = browser::detect_category(&nav, args.category_override);
    println!("{category}");

    if args.panels {
        for panel in browser::panel_states(category) {
            let display = if panel.visible { "block" } else { "none" };
            println!("{}={display}", panel.element_id);
        }
        let report = BugReport::from_navigator(&nav);
        println!("nav-plat={}", report.nav_plat);
        println!("nav-app={}", report.nav_app);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match execute(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
