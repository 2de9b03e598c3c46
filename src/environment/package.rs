use std::fmt;
use std::path::{Path, PathBuf};

/// Suffix of the hidden sibling that holds a displaced system location.
const BACKUP_SUFFIX: &str = "develop-aiidalab-backup";

/// The two packages whose installations are swapped for development checkouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManagedPackage {
    /// The `aiidalab` Python package.
    Aiidalab,
    /// The AiiDAlab home app.
    AiidalabHome,
}

impl ManagedPackage {
    /// Processing order for `setup` and `restore`.
    pub const ALL: [ManagedPackage; 2] = [ManagedPackage::Aiidalab, ManagedPackage::AiidalabHome];

    pub fn name(&self) -> &'static str {
        match self {
            ManagedPackage::Aiidalab => "aiidalab",
            ManagedPackage::AiidalabHome => "aiidalab-home",
        }
    }

    /// Name of the upstream git repository.
    pub fn repository(&self) -> &'static str {
        self.name()
    }
}

impl fmt::Display for ManagedPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk locations of one managed package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackagePaths {
    pub package: ManagedPackage,
    /// Where the package is normally installed.
    pub system: PathBuf,
    /// What the system location is linked to while developing.
    pub development: PathBuf,
    /// Repository checkout that contains the development location.
    pub checkout: PathBuf,
    /// Where the original system location is kept while linked.
    pub backup: PathBuf,
}

/// Directory roots the managed package locations are derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub local_prefix: PathBuf,
    /// AiiDAlab apps directory; the home app lives in `home` below it.
    pub apps_dir: PathBuf,
    /// Installed `aiidalab` Python package directory.
    pub package_dir: PathBuf,
}

impl Layout {
    pub fn paths(&self, package: ManagedPackage) -> PackagePaths {
        let (system, checkout, development) = match package {
            ManagedPackage::Aiidalab => {
                let checkout = self.local_prefix.join("aiidalab");
                let development = checkout.join("aiidalab");
                (self.package_dir.clone(), checkout, development)
            }
            ManagedPackage::AiidalabHome => {
                let checkout = self.local_prefix.join("aiidalab-home");
                (self.apps_dir.join("home"), checkout.clone(), checkout)
            }
        };
        let backup = backup_path(&system, package);

        PackagePaths {
            package,
            system,
            development,
            checkout,
            backup,
        }
    }

    /// Paths of every managed package, in processing order.
    pub fn all(&self) -> Vec<PackagePaths> {
        ManagedPackage::ALL.iter().map(|p| self.paths(*p)).collect()
    }
}

/// Hidden sibling of `system`, so moving it aside never crosses a filesystem.
fn backup_path(system: &Path, package: ManagedPackage) -> PathBuf {
    let name = system
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| package.name().to_string());
    let parent = system.parent().unwrap_or(system);
    parent.join(format!(".{}.{}", name, BACKUP_SUFFIX))
}
