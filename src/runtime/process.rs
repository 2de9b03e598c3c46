//! Running external programs.

use anyhow::{Context, Result, bail};
use log::debug;
use std::process::Command;

use super::{CommandOutput, RealRuntime};

impl RealRuntime {
    #[tracing::instrument(skip(self))]
    pub(crate) fn run_impl(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let command_line = format!("{} {}", program, args.join(" "));
        debug!("Running: {}", command_line);

        let output = Command::new(program)
            .args(args)
            .output()
            .with_context(|| format!("Failed to execute command: {}", command_line))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            bail!(
                "Command failed ({}): {}\nError: {}",
                output.status,
                command_line,
                stderr.trim()
            );
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
