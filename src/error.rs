//! Errors raised when a managed package is in a state an operation cannot handle.

use std::path::PathBuf;
use thiserror::Error;

use crate::environment::{ManagedPackage, PackageState};

/// `setup` was attempted on a package in an unexpected state.
#[derive(Error, Debug)]
pub enum SetupError {
    /// Nothing is installed at the system location, so there is nothing to back up.
    #[error("Cannot set up {package}: system location {path:?} does not exist (state: {state})")]
    SystemLocationMissing {
        package: ManagedPackage,
        path: PathBuf,
        state: PackageState,
    },

    /// A backup is already present although the package is not linked.
    #[error("Cannot set up {package}: unexpected backup at {backup:?} (state: {state})")]
    UnexpectedBackup {
        package: ManagedPackage,
        backup: PathBuf,
        state: PackageState,
    },

    /// Any other inconsistent state.
    #[error("Cannot set up {package}: package is in an unexpected state ({state})")]
    Inconsistent {
        package: ManagedPackage,
        state: PackageState,
    },

    /// The development location is still missing after it should have been created.
    #[error("Cannot set up {package}: development location {path:?} does not exist")]
    DevelopmentLocationMissing {
        package: ManagedPackage,
        path: PathBuf,
    },
}

/// `restore` was attempted without a valid backup.
#[derive(Error, Debug)]
pub enum RestoreError {
    /// The package is linked for development but its backup is gone.
    #[error("Cannot restore {package}: no backup found at {backup:?} (state: {state})")]
    MissingBackup {
        package: ManagedPackage,
        backup: PathBuf,
        state: PackageState,
    },

    /// Any other inconsistent state.
    #[error("Cannot restore {package}: package is in an unexpected state ({state})")]
    Inconsistent {
        package: ManagedPackage,
        state: PackageState,
    },
}
