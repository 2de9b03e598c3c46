use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::environment::{Layout, ManagedPackage};
use crate::runtime::{Runtime, expand_tilde, normalize_path};

pub const DEFAULT_LOCAL_PREFIX: &str = "~/local";
pub const DEFAULT_PYTHON: &str = "python3";
const CONFIG_FILE_NAME: &str = "aiidalab.toml";
const APPS_DIR_NAME: &str = "apps";

/// Prints the directory of the installed `aiidalab` package. `abspath` keeps
/// symlinks, so a linked package still reports its system location.
const LOCATE_PACKAGE_SCRIPT: &str =
    "import os, aiidalab; print(os.path.dirname(os.path.abspath(aiidalab.__file__)))";

/// Values given on the command line or through the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub local_prefix: Option<PathBuf>,
    pub apps_dir: Option<PathBuf>,
    pub package_dir: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    pub python: Option<String>,
}

/// Fully resolved, absolute locations for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub layout: Layout,
    /// The user's AiiDAlab configuration file holding the `develop` key.
    pub config_file: PathBuf,
}

impl Config {
    #[tracing::instrument(skip(runtime))]
    pub fn resolve<R: Runtime>(runtime: &R, overrides: ConfigOverrides) -> Result<Self> {
        let home = runtime.home_dir();

        let local_prefix = overrides
            .local_prefix
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_PREFIX));
        let local_prefix = absolute(runtime, &local_prefix, home.as_deref())?;
        info!("Using local prefix: {}", local_prefix.display());

        let apps_dir = match overrides.apps_dir {
            Some(path) => absolute(runtime, &path, home.as_deref())?,
            None => require_home(home.as_deref())?.join(APPS_DIR_NAME),
        };

        let config_file = match overrides.config_file {
            Some(path) => absolute(runtime, &path, home.as_deref())?,
            None => require_home(home.as_deref())?.join(CONFIG_FILE_NAME),
        };

        let package_dir = match overrides.package_dir {
            Some(path) => absolute(runtime, &path, home.as_deref())?,
            None => {
                let python = overrides.python.as_deref().unwrap_or(DEFAULT_PYTHON);
                locate_package_dir(runtime, python)?
            }
        };

        let layout = Layout {
            local_prefix,
            apps_dir,
            package_dir,
        };

        for package in ManagedPackage::ALL {
            let paths = layout.paths(package);
            if crate::runtime::is_same_path(&paths.system, &paths.development) {
                bail!(
                    "The system location of {} is its development location {:?}; \
                     point --package-dir at the installed package instead",
                    package,
                    paths.system
                );
            }
        }

        debug!("Resolved layout: {:?}", layout);
        Ok(Self {
            layout,
            config_file,
        })
    }
}

fn require_home(home: Option<&Path>) -> Result<&Path> {
    home.context("Could not find home directory")
}

/// Expand `~` and make `path` absolute against the current directory.
/// Trailing separators are dropped, so the result names a link itself rather
/// than the directory behind it.
fn absolute<R: Runtime>(runtime: &R, path: &Path, home: Option<&Path>) -> Result<PathBuf> {
    let expanded = expand_tilde(path, home);
    if expanded.is_absolute() {
        Ok(normalize_path(&expanded))
    } else {
        Ok(normalize_path(&runtime.current_dir()?.join(expanded)))
    }
}

/// Ask the Python interpreter where the `aiidalab` package is installed.
#[tracing::instrument(skip(runtime))]
pub fn locate_package_dir<R: Runtime>(runtime: &R, python: &str) -> Result<PathBuf> {
    let output = runtime
        .run(python, &["-c".to_string(), LOCATE_PACKAGE_SCRIPT.to_string()])
        .with_context(|| {
            format!(
                "Failed to locate the installed aiidalab package with '{}'; use --package-dir",
                python
            )
        })?;

    let location = output.stdout.trim();
    if location.is_empty() {
        bail!(
            "'{}' did not report a location for the aiidalab package; use --package-dir",
            python
        );
    }
    debug!("aiidalab package found at {}", location);
    Ok(normalize_path(Path::new(location)))
}
