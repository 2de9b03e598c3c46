//! Creation of development locations.

use anyhow::{Context, Result};
use log::{debug, info};

use super::package::{ManagedPackage, PackagePaths};
use crate::error::SetupError;
use crate::runtime::Runtime;

pub const DEFAULT_GITHUB_USERNAME: &str = "aiidalab";

/// How missing development locations are populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// GitHub user or organisation the repositories are cloned from.
    pub github_username: String,
    pub use_ssh: bool,
    /// Create empty development locations instead of cloning.
    pub no_clone: bool,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            github_username: DEFAULT_GITHUB_USERNAME.to_string(),
            use_ssh: false,
            no_clone: false,
        }
    }
}

impl SourceOptions {
    pub fn repository_url(&self, package: ManagedPackage) -> String {
        if self.use_ssh {
            format!(
                "git@github.com:{}/{}.git",
                self.github_username,
                package.repository()
            )
        } else {
            format!(
                "https://github.com/{}/{}.git",
                self.github_username,
                package.repository()
            )
        }
    }
}

/// Make sure the development location of a package exists.
///
/// An existing checkout is never cloned over; if it lacks the development
/// location the package cannot be linked.
#[tracing::instrument(skip(runtime, paths, options), fields(package = %paths.package))]
pub fn ensure_development_location<R: Runtime>(
    runtime: &R,
    paths: &PackagePaths,
    options: &SourceOptions,
) -> Result<()> {
    if runtime.is_dir(&paths.development) {
        debug!("Development location {:?} exists", paths.development);
        return Ok(());
    }

    if options.no_clone {
        info!("Creating empty development location {:?}", paths.development);
        runtime.create_dir_all(&paths.development)?;
        return Ok(());
    }

    if !runtime.exists(&paths.checkout) {
        if let Some(parent) = paths.checkout.parent() {
            runtime.create_dir_all(parent)?;
        }
        let url = options.repository_url(paths.package);
        println!("Clone {} -> {}", url, paths.checkout.display());
        runtime
            .run(
                "git",
                &[
                    "clone".to_string(),
                    url.clone(),
                    paths.checkout.to_string_lossy().into_owned(),
                ],
            )
            .with_context(|| format!("Failed to clone {}", url))?;
    }

    if !runtime.is_dir(&paths.development) {
        return Err(SetupError::DevelopmentLocationMissing {
            package: paths.package,
            path: paths.development.clone(),
        }
        .into());
    }

    Ok(())
}
