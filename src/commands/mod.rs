use anyhow::{Result, bail};
use log::debug;

use crate::{
    environment::{EnvironmentManager, SourceOptions},
    runtime::Runtime,
};

pub mod config;
mod status;

pub use config::{Config, ConfigOverrides};

fn manager<R: Runtime>(
    runtime: &R,
    overrides: ConfigOverrides,
) -> Result<EnvironmentManager<'_, R>> {
    let config = Config::resolve(runtime, overrides)?;
    debug!("Using config file {:?}", config.config_file);
    Ok(EnvironmentManager::new(runtime, config.layout, config.config_file))
}

/// Link both packages to their development checkouts.
#[tracing::instrument(skip(runtime, overrides))]
pub fn setup<R: Runtime>(
    runtime: R,
    overrides: ConfigOverrides,
    source: SourceOptions,
) -> Result<()> {
    let manager = manager(&runtime, overrides)?;
    manager.setup(&source)?;
    println!("Mode: DEVELOPMENT");
    Ok(())
}

/// Report the state of both packages. Fails if any issue is detected.
#[tracing::instrument(skip(runtime, overrides))]
pub fn status<R: Runtime>(runtime: R, overrides: ConfigOverrides) -> Result<()> {
    let manager = manager(&runtime, overrides)?;
    let report = manager.status()?;

    let mut stdout = std::io::stdout().lock();
    status::print_report(&report, &mut stdout)?;

    if report.has_issues() {
        bail!("Detected one or more issues.");
    }
    Ok(())
}

/// Put the production installs of both packages back in place.
#[tracing::instrument(skip(runtime, overrides))]
pub fn restore<R: Runtime>(runtime: R, overrides: ConfigOverrides) -> Result<()> {
    let manager = manager(&runtime, overrides)?;
    manager.restore()?;
    println!("Mode: SYSTEM");
    Ok(())
}
