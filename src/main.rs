use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use weather_compact::commands::{self, DEFAULT_REPO, Options};

/// weather-compact - compact weather widget and GitHub release updater
///
/// Renders the one-line weather widget for the configured location and
/// checks GitHub for newer releases of the plugin.
///
/// The OpenWeatherMap API key is read from the settings file, or from the
/// WEATHER_COMPACT_API_KEY environment variable when set.
///
/// Examples:
///   weather-compact render               # Print the widget markup
///   weather-compact check-update --force # Bypass the release cache
#[derive(Parser, Debug)]
#[command(author, version = weather_compact::VERSION, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (defaults to <config dir>/weather-compact/settings.json)
    #[arg(long = "settings", value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// Cache directory (defaults to <cache dir>/weather-compact)
    #[arg(
        long = "cache-dir",
        env = "WEATHER_COMPACT_CACHE_DIR",
        value_name = "PATH",
        global = true
    )]
    pub cache_dir: Option<PathBuf>,

    /// OpenWeatherMap API URL (defaults to https://api.openweathermap.org)
    #[arg(long = "weather-api-url", value_name = "URL", global = true)]
    pub weather_api_url: Option<String>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "github-api-url", value_name = "URL", global = true)]
    pub github_api_url: Option<String>,

    /// Repository releases are published to
    #[arg(long = "repo", value_name = "OWNER/REPO", default_value = DEFAULT_REPO, global = true)]
    pub repo: String,

    /// Installed version to compare releases against (defaults to this build's version)
    #[arg(
        long = "current-version",
        env = "WEATHER_COMPACT_CURRENT_VERSION",
        value_name = "VERSION",
        global = true
    )]
    pub current_version: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print the weather widget markup
    Render,

    /// Check GitHub for a newer release
    CheckUpdate(CheckUpdateArgs),

    /// Print plugin details for the latest release
    Info,

    /// Rename an extracted release directory to the plugin directory name
    FixDir(FixDirArgs),
}

#[derive(clap::Args, Debug)]
pub struct CheckUpdateArgs {
    /// Ignore cached release data
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct FixDirArgs {
    /// Directory the release archive was extracted to
    #[arg(value_name = "EXTRACTED")]
    pub extracted: PathBuf,

    /// Target directory name
    #[arg(long, value_name = "DIR")]
    pub slug: Option<String>,
}

impl Cli {
    fn options(&self) -> Options {
        let defaults = Options::default();
        Options {
            settings_path: self.settings.clone(),
            cache_dir: self.cache_dir.clone(),
            weather_api_url: self.weather_api_url.clone(),
            github_api_url: self.github_api_url.clone(),
            repo: self.repo.clone(),
            current_version: self
                .current_version
                .clone()
                .unwrap_or(defaults.current_version),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = weather_compact::runtime::RealRuntime;
    let options = cli.options();

    match cli.command {
        Commands::Render => commands::render(runtime, options).await?,
        Commands::CheckUpdate(args) => {
            commands::check_update(runtime, options, args.force).await?
        }
        Commands::Info => commands::info(runtime, options).await?,
        Commands::FixDir(args) => {
            commands::fix_dir(runtime, &args.extracted, args.slug.as_deref())?
        }
    }
    Ok(())
}
