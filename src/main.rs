use anyhow::Result;
use clap::Parser;
use develop_aiidalab::commands::{self, ConfigOverrides, config::DEFAULT_LOCAL_PREFIX};
use develop_aiidalab::environment::{DEFAULT_GITHUB_USERNAME, SourceOptions};
use develop_aiidalab::runtime::RealRuntime;
use std::path::PathBuf;

/// develop-aiidalab - Manage the AiiDAlab development environment
///
/// Swaps the installed aiidalab package and home app for development
/// checkouts under a local prefix, and puts the originals back.
///
/// Examples:
///   develop-aiidalab setup      # Link development checkouts
///   develop-aiidalab status     # Show the current mode
///   develop-aiidalab restore    # Go back to the system installs
#[derive(Parser, Debug)]
#[command(author, version = env!("DEVELOP_AIIDALAB_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Root directory for development checkouts
    #[arg(
        long = "local-prefix",
        env = "AIIDALAB_DEVELOP_LOCAL_PREFIX",
        value_name = "PATH",
        default_value = DEFAULT_LOCAL_PREFIX,
        global = true
    )]
    local_prefix: PathBuf,

    /// AiiDAlab apps directory containing the home app (defaults to ~/apps)
    #[arg(long = "apps-dir", env = "AIIDALAB_APPS", value_name = "PATH", global = true)]
    apps_dir: Option<PathBuf>,

    /// Installed aiidalab package directory (defaults to asking the Python interpreter)
    #[arg(
        long = "package-dir",
        env = "AIIDALAB_DEVELOP_PACKAGE_DIR",
        value_name = "PATH",
        global = true
    )]
    package_dir: Option<PathBuf>,

    /// AiiDAlab configuration file holding the 'develop' key (defaults to ~/aiidalab.toml)
    #[arg(
        long = "config-file",
        env = "AIIDALAB_DEVELOP_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    config_file: Option<PathBuf>,

    /// Python interpreter used to locate the installed aiidalab package
    #[arg(
        long = "python",
        env = "AIIDALAB_DEVELOP_PYTHON",
        value_name = "PROGRAM",
        global = true
    )]
    python: Option<String>,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            local_prefix: Some(self.local_prefix.clone()),
            apps_dir: self.apps_dir.clone(),
            package_dir: self.package_dir.clone(),
            config_file: self.config_file.clone(),
            python: self.python.clone(),
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Set up the AiiDAlab environment for development
    Setup(SetupArgs),

    /// Show the current status of the AiiDAlab environment
    Status,

    /// Restore the system installation of aiidalab and the home app
    Restore,
}

#[derive(clap::Args, Debug)]
struct SetupArgs {
    /// GitHub user to clone the repositories from
    #[arg(short = 'u', long = "github-username", default_value = DEFAULT_GITHUB_USERNAME)]
    github_username: String,

    /// Clone over SSH instead of HTTPS
    #[arg(long = "use-ssh")]
    use_ssh: bool,

    /// Create empty development directories instead of cloning
    #[arg(long = "no-clone")]
    no_clone: bool,
}

impl From<SetupArgs> for SourceOptions {
    fn from(args: SetupArgs) -> Self {
        SourceOptions {
            github_username: args.github_username,
            use_ssh: args.use_ssh,
            no_clone: args.no_clone,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;
    let overrides = cli.overrides();

    match cli.command {
        Commands::Setup(args) => commands::setup(runtime, overrides, args.into())?,
        Commands::Status => commands::status(runtime, overrides)?,
        Commands::Restore => commands::restore(runtime, overrides)?,
    }
    Ok(())
}
