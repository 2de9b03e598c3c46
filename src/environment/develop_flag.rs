//! The `develop` key of the user's AiiDAlab configuration file.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

const DEVELOP_KEY: &str = "develop";

pub struct DevelopFlag<'a, R: Runtime> {
    runtime: &'a R,
    path: PathBuf,
}

impl<'a, R: Runtime> DevelopFlag<'a, R> {
    pub fn new(runtime: &'a R, path: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<toml::Table> {
        let contents = self.runtime.read_to_string(&self.path)?;
        toml::from_str(&contents).with_context(|| format!("Failed to parse {:?}", self.path))
    }

    /// Current value of the flag, or `None` if the config file does not exist.
    /// A missing or non-boolean key counts as `false`.
    pub fn read(&self) -> Result<Option<bool>> {
        if !self.runtime.exists(&self.path) {
            return Ok(None);
        }
        let table = self.load()?;
        Ok(Some(
            table
                .get(DEVELOP_KEY)
                .and_then(toml::Value::as_bool)
                .unwrap_or(false),
        ))
    }

    /// Set the flag, keeping every other key. With `create` false a missing
    /// file is left alone. Returns whether the file was written.
    pub fn set(&self, value: bool, create: bool) -> Result<bool> {
        let mut table = if self.runtime.exists(&self.path) {
            self.load()?
        } else if create {
            toml::Table::new()
        } else {
            debug!("{:?} does not exist, leaving it absent", self.path);
            return Ok(false);
        };

        table.insert(DEVELOP_KEY.to_string(), toml::Value::Boolean(value));
        let encoded = toml::to_string(&table)
            .with_context(|| format!("Failed to encode {:?}", self.path))?;
        self.runtime.write(&self.path, encoded.as_bytes())?;
        debug!("Set '{}' to {} in {:?}", DEVELOP_KEY, value, self.path);
        Ok(true)
    }
}
