use std::fmt;
use std::path::{Path, PathBuf};

use log::debug;

use super::package::PackagePaths;
use crate::runtime::{Runtime, is_same_path};

/// Why a package is neither untouched nor cleanly linked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inconsistency {
    /// Nothing at the system location and no backup.
    SystemLocationMissing,
    /// A backup exists but the system location is not linked for development.
    BackupWithoutLink,
    /// The system location is linked for development but the backup is gone.
    LinkWithoutBackup,
    /// The system location links to a development location that does not exist.
    DevelopmentLocationMissing { backup: bool },
    /// The system location is a symlink whose target does not exist.
    BrokenSystemLink { target: Option<PathBuf> },
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inconsistency::SystemLocationMissing => f.write_str("system location missing"),
            Inconsistency::BackupWithoutLink => f.write_str("backup present but link absent"),
            Inconsistency::LinkWithoutBackup => f.write_str("link present but backup missing"),
            Inconsistency::DevelopmentLocationMissing { .. } => {
                f.write_str("link target missing")
            }
            Inconsistency::BrokenSystemLink { target: Some(target) } => {
                write!(f, "system link points to missing {}", target.display())
            }
            Inconsistency::BrokenSystemLink { target: None } => {
                f.write_str("system link cannot be read")
            }
        }
    }
}

/// Derived state of one managed package. Never stored; see [`inspect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackageState {
    Untouched,
    DevelopmentLinked,
    Inconsistent(Inconsistency),
}

impl PackageState {
    pub fn is_consistent(&self) -> bool {
        !matches!(self, PackageState::Inconsistent(_))
    }
}

impl fmt::Display for PackageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackageState::Untouched => f.write_str("untouched"),
            PackageState::DevelopmentLinked => f.write_str("development-linked"),
            PackageState::Inconsistent(reason) => write!(f, "inconsistent: {}", reason),
        }
    }
}

/// Anything at `path`, including a dangling symlink.
fn is_present<R: Runtime>(runtime: &R, path: &Path) -> bool {
    runtime.exists(path) || runtime.is_symlink(path)
}

/// Whether a link target names the development location. The lexical check
/// covers links this tool created; resolving both sides also accepts a local
/// prefix reached through a different symlinked name.
fn points_to_development<R: Runtime>(runtime: &R, target: &Path, development: &Path) -> bool {
    if is_same_path(target, development) {
        return true;
    }
    match (runtime.canonicalize(target), runtime.canonicalize(development)) {
        (Ok(target), Ok(development)) => target == development,
        _ => false,
    }
}

/// Derive the state of a package from what is on disk. Has no side effects.
#[tracing::instrument(skip(runtime, paths), fields(package = %paths.package))]
pub fn inspect<R: Runtime>(runtime: &R, paths: &PackagePaths) -> PackageState {
    use Inconsistency::*;

    let has_backup = is_present(runtime, &paths.backup);

    let state = if runtime.is_symlink(&paths.system) {
        match runtime.resolve_link(&paths.system) {
            Ok(target) if points_to_development(runtime, &target, &paths.development) => {
                if !runtime.is_dir(&paths.development) {
                    PackageState::Inconsistent(DevelopmentLocationMissing { backup: has_backup })
                } else if !has_backup {
                    PackageState::Inconsistent(LinkWithoutBackup)
                } else {
                    PackageState::DevelopmentLinked
                }
            }
            Ok(target) => {
                if has_backup {
                    PackageState::Inconsistent(BackupWithoutLink)
                } else if runtime.exists(&paths.system) {
                    // A production install may itself be a link (e.g. to /opt)
                    PackageState::Untouched
                } else {
                    PackageState::Inconsistent(BrokenSystemLink {
                        target: Some(target),
                    })
                }
            }
            Err(e) => {
                debug!("Cannot resolve {:?}: {}", paths.system, e);
                if has_backup {
                    PackageState::Inconsistent(BackupWithoutLink)
                } else {
                    PackageState::Inconsistent(BrokenSystemLink { target: None })
                }
            }
        }
    } else if runtime.exists(&paths.system) {
        if has_backup {
            PackageState::Inconsistent(BackupWithoutLink)
        } else {
            PackageState::Untouched
        }
    } else if has_backup {
        PackageState::Inconsistent(BackupWithoutLink)
    } else {
        PackageState::Inconsistent(SystemLocationMissing)
    };

    debug!("{} is {}", paths.package, state);
    state
}
