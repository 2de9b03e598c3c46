use anyhow::Result;
use std::io::Write;

use crate::environment::{Mode, PackageReport, PackageState, StatusReport};

const OK: char = '\u{2714}';
const ISSUE: char = '\u{2718}';

fn package_line(report: &PackageReport) -> (bool, String) {
    let paths = &report.paths;
    match &report.state {
        PackageState::DevelopmentLinked => (
            true,
            format!(
                "{}: development-linked, {} -> {}",
                paths.package,
                paths.system.display(),
                paths.development.display()
            ),
        ),
        PackageState::Untouched => (
            true,
            format!("{}: untouched, {}", paths.package, paths.system.display()),
        ),
        PackageState::Inconsistent(reason) => (
            false,
            format!(
                "{}: inconsistent ({}), {}",
                paths.package,
                reason,
                paths.system.display()
            ),
        ),
    }
}

fn develop_flag_line(report: &StatusReport) -> Option<String> {
    let file = report.config_file.display();
    match (report.mode(), report.develop_flag) {
        (Mode::Unknown, _) => None,
        (Mode::Development, None) => Some(format!("File '{}' does not exist.", file)),
        (Mode::System, None) => Some(format!("Local config file '{}' does not exist.", file)),
        (_, Some(true)) => Some(format!("Key 'develop' set to true in '{}'.", file)),
        (_, Some(false)) => Some(format!("Key 'develop' not set to true in '{}'.", file)),
    }
}

/// Write a human readable status report.
pub(crate) fn print_report<W: Write>(report: &StatusReport, out: &mut W) -> Result<()> {
    writeln!(out, "Mode: {}", report.mode())?;

    for package in &report.packages {
        let (ok, line) = package_line(package);
        writeln!(out, "{} {}", if ok { OK } else { ISSUE }, line)?;
    }

    if report.mode() == Mode::Unknown {
        writeln!(
            out,
            "{} Packages are not all untouched or all development-linked.",
            ISSUE
        )?;
    }

    if let Some(line) = develop_flag_line(report) {
        let mark = if report.develop_flag_matches() { OK } else { ISSUE };
        writeln!(out, "{} {}", mark, line)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{Inconsistency, ManagedPackage};
    use crate::test_utils::test_layout;
    use std::path::{Path, PathBuf};

    fn report(states: [PackageState; 2], develop_flag: Option<bool>) -> StatusReport {
        let layout = test_layout(Path::new("/home/user"));
        StatusReport {
            packages: ManagedPackage::ALL
                .iter()
                .zip(states)
                .map(|(package, state)| PackageReport {
                    paths: layout.paths(*package),
                    state,
                })
                .collect(),
            config_file: PathBuf::from("/home/user/aiidalab.toml"),
            develop_flag,
        }
    }

    fn render(report: &StatusReport) -> String {
        let mut out = Vec::new();
        print_report(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_development_mode_report() {
        let output = render(&report(
            [
                PackageState::DevelopmentLinked,
                PackageState::DevelopmentLinked,
            ],
            Some(true),
        ));

        assert!(output.starts_with("Mode: DEVELOPMENT\n"));
        assert!(output.contains("\u{2714} aiidalab: development-linked"));
        assert!(output.contains("\u{2714} aiidalab-home: development-linked"));
        assert!(output.contains("\u{2714} Key 'develop' set to true"));
        assert!(!output.contains('\u{2718}'));
    }

    #[test]
    fn test_system_mode_without_config_file() {
        let output = render(&report(
            [PackageState::Untouched, PackageState::Untouched],
            None,
        ));

        assert!(output.starts_with("Mode: SYSTEM\n"));
        assert!(
            output.contains("\u{2714} Local config file '/home/user/aiidalab.toml' does not exist.")
        );
    }

    #[test]
    fn test_development_mode_with_flag_unset_is_flagged() {
        let output = render(&report(
            [
                PackageState::DevelopmentLinked,
                PackageState::DevelopmentLinked,
            ],
            Some(false),
        ));

        assert!(output.contains("\u{2718} Key 'develop' not set to true"));
    }

    #[test]
    fn test_inconsistent_package_is_flagged() {
        let output = render(&report(
            [
                PackageState::Untouched,
                PackageState::Inconsistent(Inconsistency::SystemLocationMissing),
            ],
            None,
        ));

        assert!(output.starts_with("Mode: UNKNOWN\n"));
        assert!(output.contains(
            "\u{2718} aiidalab-home: inconsistent (system location missing), /home/user/apps/home"
        ));
        assert!(output.contains("Packages are not all untouched"));
    }
}
