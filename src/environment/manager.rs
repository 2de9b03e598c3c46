//! The environment manager: `setup`, `status` and `restore` over all managed packages.

use std::fmt;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::develop_flag::DevelopFlag;
use super::package::{Layout, ManagedPackage, PackagePaths};
use super::source::{SourceOptions, ensure_development_location};
use super::state::{Inconsistency, PackageState, inspect};
use crate::error::{RestoreError, SetupError};
use crate::runtime::Runtime;

/// Overall mode of the environment, derived from every package state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Development,
    System,
    Unknown,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Development => f.write_str("DEVELOPMENT"),
            Mode::System => f.write_str("SYSTEM"),
            Mode::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageReport {
    pub paths: PackagePaths,
    pub state: PackageState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub packages: Vec<PackageReport>,
    pub config_file: PathBuf,
    /// `None` when the config file does not exist.
    pub develop_flag: Option<bool>,
}

impl StatusReport {
    pub fn mode(&self) -> Mode {
        if self
            .packages
            .iter()
            .all(|p| p.state == PackageState::DevelopmentLinked)
        {
            Mode::Development
        } else if self
            .packages
            .iter()
            .all(|p| p.state == PackageState::Untouched)
        {
            Mode::System
        } else {
            Mode::Unknown
        }
    }

    /// Whether the develop flag agrees with the mode.
    pub fn develop_flag_matches(&self) -> bool {
        match self.mode() {
            Mode::Development => self.develop_flag == Some(true),
            Mode::System => self.develop_flag != Some(true),
            Mode::Unknown => true,
        }
    }

    pub fn has_issues(&self) -> bool {
        self.mode() == Mode::Unknown || !self.develop_flag_matches()
    }
}

pub struct EnvironmentManager<'a, R: Runtime> {
    runtime: &'a R,
    layout: Layout,
    develop_flag: DevelopFlag<'a, R>,
}

impl<'a, R: Runtime> EnvironmentManager<'a, R> {
    pub fn new(runtime: &'a R, layout: Layout, config_file: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            layout,
            develop_flag: DevelopFlag::new(runtime, config_file),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Inspect every package. Has no side effects.
    #[tracing::instrument(skip(self))]
    pub fn status(&self) -> Result<StatusReport> {
        let packages = self
            .layout
            .all()
            .into_iter()
            .map(|paths| {
                let state = inspect(self.runtime, &paths);
                PackageReport { paths, state }
            })
            .collect();

        Ok(StatusReport {
            packages,
            config_file: self.develop_flag.path().to_path_buf(),
            develop_flag: self.develop_flag.read()?,
        })
    }

    /// Link every package to its development location.
    ///
    /// All packages are checked, the config file is parsed and every missing
    /// development location is created before any system location is moved.
    /// A package in an unexpected state, an unreadable config or a failed
    /// clone therefore aborts the whole setup with nothing linked.
    #[tracing::instrument(skip(self, source))]
    pub fn setup(&self, source: &SourceOptions) -> Result<()> {
        let mut pending = Vec::new();
        for paths in self.layout.all() {
            match inspect(self.runtime, &paths) {
                PackageState::DevelopmentLinked => {
                    info!("{} is already linked for development", paths.package);
                }
                PackageState::Untouched => pending.push(paths),
                state => return Err(setup_error(&paths, state).into()),
            }
        }
        self.develop_flag.read()?;

        if !pending.is_empty() {
            self.runtime
                .create_dir_all(&self.layout.local_prefix)
                .context("Failed to create local prefix")?;
        }

        for paths in &pending {
            ensure_development_location(self.runtime, paths, source)?;
        }
        for paths in &pending {
            self.link_package(paths)?;
        }

        self.develop_flag.set(true, true)?;
        Ok(())
    }

    fn link_package(&self, paths: &PackagePaths) -> Result<()> {
        println!(
            "Move {} -> {}",
            paths.system.display(),
            paths.backup.display()
        );
        self.runtime.rename(&paths.system, &paths.backup)?;

        println!(
            "Link {} -> {}",
            paths.system.display(),
            paths.development.display()
        );
        if let Err(err) = self.runtime.symlink(&paths.development, &paths.system) {
            warn!(
                "Linking {} failed, moving {:?} back",
                paths.package, paths.backup
            );
            self.runtime
                .rename(&paths.backup, &paths.system)
                .with_context(|| {
                    format!(
                        "Failed to put back {:?} after linking failed; the original is at {:?}",
                        paths.system, paths.backup
                    )
                })?;
            return Err(err.context(format!("Failed to link {}", paths.package)));
        }

        debug!("{} linked for development", paths.package);
        Ok(())
    }

    /// Put every linked package's backup back in place.
    ///
    /// Like [`setup`](Self::setup), all packages and the config file are
    /// checked first.
    #[tracing::instrument(skip(self))]
    pub fn restore(&self) -> Result<()> {
        let mut pending = Vec::new();
        for paths in self.layout.all() {
            match inspect(self.runtime, &paths) {
                PackageState::Untouched => {
                    info!("{} is already untouched", paths.package);
                }
                PackageState::DevelopmentLinked
                | PackageState::Inconsistent(Inconsistency::DevelopmentLocationMissing {
                    backup: true,
                }) => pending.push(paths),
                state => return Err(restore_error(&paths, state).into()),
            }
        }
        self.develop_flag.read()?;

        for paths in &pending {
            self.unlink_package(paths)?;
        }

        self.develop_flag.set(false, false)?;
        Ok(())
    }

    fn unlink_package(&self, paths: &PackagePaths) -> Result<()> {
        println!("Unlink {}", paths.system.display());
        self.runtime.remove_symlink(&paths.system)?;

        println!(
            "Move {} -> {}",
            paths.backup.display(),
            paths.system.display()
        );
        if let Err(err) = self.runtime.rename(&paths.backup, &paths.system) {
            warn!(
                "Restoring {} failed, linking {:?} again",
                paths.package, paths.system
            );
            self.runtime
                .symlink(&paths.development, &paths.system)
                .with_context(|| {
                    format!(
                        "Failed to link {:?} again after restoring failed; the original is at {:?}",
                        paths.system, paths.backup
                    )
                })?;
            return Err(err.context(format!("Failed to restore {}", paths.package)));
        }

        debug!("{} restored", paths.package);
        Ok(())
    }
}

fn setup_error(paths: &PackagePaths, state: PackageState) -> SetupError {
    let package: ManagedPackage = paths.package;
    match state {
        PackageState::Inconsistent(Inconsistency::SystemLocationMissing) => {
            SetupError::SystemLocationMissing {
                package,
                path: paths.system.clone(),
                state,
            }
        }
        PackageState::Inconsistent(Inconsistency::BackupWithoutLink) => {
            SetupError::UnexpectedBackup {
                package,
                backup: paths.backup.clone(),
                state,
            }
        }
        state => SetupError::Inconsistent { package, state },
    }
}

fn restore_error(paths: &PackagePaths, state: PackageState) -> RestoreError {
    match state {
        PackageState::Inconsistent(
            Inconsistency::LinkWithoutBackup
            | Inconsistency::DevelopmentLocationMissing { backup: false },
        ) => RestoreError::MissingBackup {
            package: paths.package,
            backup: paths.backup.clone(),
            state,
        },
        state => RestoreError::Inconsistent {
            package: paths.package,
            state,
        },
    }
}
