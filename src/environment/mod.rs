//! Environment manager for the AiiDAlab development setup.
//!
//! Each [`ManagedPackage`] is either untouched (the production install sits at
//! its system location), development-linked (the system location is a symlink
//! to a checkout under the local prefix and the original is kept as a backup
//! next to it) or inconsistent. The state is always derived from disk by
//! [`inspect`]; nothing is recorded besides the backup itself.
//!
//! # Structure
//!
//! - `package` - Managed packages and their on-disk locations
//! - `state` - State derivation
//! - `source` - Creating development locations (`git clone` or empty directory)
//! - `develop_flag` - The `develop` key in `aiidalab.toml`
//! - `manager` - `setup`, `status` and `restore`

mod develop_flag;
mod manager;
mod package;
mod source;
mod state;

pub use develop_flag::DevelopFlag;
pub use manager::{EnvironmentManager, Mode, PackageReport, StatusReport};
pub use package::{Layout, ManagedPackage, PackagePaths};
pub use source::{DEFAULT_GITHUB_USERNAME, SourceOptions, ensure_development_location};
pub use state::{Inconsistency, PackageState, inspect};
