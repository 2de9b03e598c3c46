use assert_cmd::Command;
use assert_cmd::cargo;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{TempDir, tempdir};

/// A fake AiiDAlab account: production installs of both packages, no checkouts.
struct Account {
    dir: TempDir,
}

impl Account {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path();

        write_file(&root.join("site-packages/aiidalab/__init__.py"), "__version__ = '21.0'\n");
        write_file(&root.join("site-packages/aiidalab/utils.py"), "def f():\n    return 1\n");
        write_file(&root.join("apps/home/start.py"), "print('home')\n");
        write_file(&root.join("apps/home/img/logo.svg"), "<svg/>\n");

        Self { dir }
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    fn cmd(&self, subcommand: &str) -> Command {
        self.cmd_with_package_dir(subcommand, self.path("site-packages/aiidalab").as_os_str())
    }

    fn cmd_with_package_dir(&self, subcommand: &str, package_dir: &std::ffi::OsStr) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("develop-aiidalab"));
        cmd.env_remove("AIIDALAB_APPS")
            .env_remove("AIIDALAB_DEVELOP_PACKAGE_DIR")
            .arg("--local-prefix")
            .arg(self.path("local"))
            .arg("--apps-dir")
            .arg(self.path("apps"))
            .arg("--package-dir")
            .arg(package_dir)
            .arg("--config-file")
            .arg(self.path("aiidalab.toml"))
            .arg(subcommand);
        if subcommand == "setup" {
            cmd.arg("--no-clone");
        }
        cmd
    }
}

fn write_file(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Every file under `dir` with its bytes, sorted by relative path.
fn snapshot(dir: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    fn walk(base: &Path, dir: &Path, out: &mut Vec<(PathBuf, Vec<u8>)>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(base, &path, out);
            } else {
                let relative = path.strip_prefix(base).unwrap().to_path_buf();
                out.push((relative, fs::read(&path).unwrap()));
            }
        }
    }
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}

#[test]
fn test_setup_status_restore_cycle() {
    let account = Account::new();
    let package_before = snapshot(&account.path("site-packages/aiidalab"));
    let home_before = snapshot(&account.path("apps/home"));

    account
        .cmd("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Link"))
        .stdout(predicate::str::contains("Mode: DEVELOPMENT"));

    assert!(account.path("apps/home").is_symlink());
    assert!(account.path("site-packages/aiidalab").is_symlink());
    assert!(account.path("local/aiidalab-home").is_dir());
    assert!(account.path("local/aiidalab/aiidalab").is_dir());
    assert!(
        fs::read_to_string(account.path("aiidalab.toml"))
            .unwrap()
            .contains("develop = true")
    );

    account
        .cmd("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: DEVELOPMENT"))
        .stdout(predicate::str::contains("aiidalab: development-linked"))
        .stdout(predicate::str::contains("aiidalab-home: development-linked"));

    account
        .cmd("restore")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: SYSTEM"));

    assert!(!account.path("apps/home").is_symlink());
    assert!(!account.path("site-packages/aiidalab").is_symlink());
    assert_eq!(snapshot(&account.path("site-packages/aiidalab")), package_before);
    assert_eq!(snapshot(&account.path("apps/home")), home_before);
    assert!(
        fs::read_to_string(account.path("aiidalab.toml"))
            .unwrap()
            .contains("develop = false")
    );

    account
        .cmd("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: SYSTEM"))
        .stdout(predicate::str::contains("aiidalab: untouched"))
        .stdout(predicate::str::contains("aiidalab-home: untouched"));
}

#[test]
fn test_setup_twice_is_idempotent() {
    let account = Account::new();

    account.cmd("setup").assert().success();
    let local_after_first = snapshot(&account.path("local"));
    let config_after_first = fs::read(account.path("aiidalab.toml")).unwrap();

    account
        .cmd("setup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Move").not());

    assert_eq!(snapshot(&account.path("local")), local_after_first);
    assert_eq!(fs::read(account.path("aiidalab.toml")).unwrap(), config_after_first);
    assert!(account.path("apps/.home.develop-aiidalab-backup").is_dir());
    assert!(
        account
            .path("site-packages/.aiidalab.develop-aiidalab-backup")
            .is_dir()
    );
}

#[test]
fn test_setup_uses_existing_checkouts() {
    let account = Account::new();
    write_file(&account.path("local/aiidalab-home/start.py"), "print('dev home')\n");

    account.cmd("setup").assert().success();

    assert_eq!(
        fs::read_to_string(account.path("apps/home/start.py")).unwrap(),
        "print('dev home')\n"
    );
}

#[test]
fn test_setup_missing_system_location_fails() {
    let account = Account::new();
    fs::remove_dir_all(account.path("apps/home")).unwrap();

    account
        .cmd("setup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("aiidalab-home"))
        .stderr(predicate::str::contains("does not exist"));

    // Nothing was changed for the other package
    assert!(!account.path("site-packages/aiidalab").is_symlink());
    assert!(!account.path("aiidalab.toml").exists());
}

#[test]
fn test_setup_accepts_package_dir_with_trailing_slash() {
    let account = Account::new();
    let mut package_dir = account.path("site-packages/aiidalab").into_os_string();
    package_dir.push(std::path::MAIN_SEPARATOR_STR);

    account
        .cmd_with_package_dir("setup", &package_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: DEVELOPMENT"));

    assert!(account.path("site-packages/aiidalab").is_symlink());
    assert!(
        account
            .path("site-packages/.aiidalab.develop-aiidalab-backup")
            .is_dir()
    );

    account
        .cmd_with_package_dir("status", &package_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("aiidalab: development-linked"));
}

#[test]
fn test_setup_with_unreadable_config_fails_before_changes() {
    let account = Account::new();
    write_file(&account.path("aiidalab.toml"), "develop = = true\n");

    account
        .cmd("setup")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Move").not())
        .stderr(predicate::str::contains("Failed to parse"));

    assert!(!account.path("site-packages/aiidalab").is_symlink());
    assert!(!account.path("apps/home").is_symlink());
    assert!(!account.path("local").exists());
}

#[test]
fn test_restore_untouched_is_noop() {
    let account = Account::new();
    let before = snapshot(account.root());

    account
        .cmd("restore")
        .assert()
        .success()
        .stdout(predicate::str::contains("Mode: SYSTEM"));

    assert_eq!(snapshot(account.root()), before);
}

#[test]
fn test_restore_without_backup_fails() {
    let account = Account::new();
    account.cmd("setup").assert().success();
    fs::remove_dir_all(account.path("apps/.home.develop-aiidalab-backup")).unwrap();

    account
        .cmd("restore")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Cannot restore aiidalab-home"))
        .stderr(predicate::str::contains("no backup"));
}

#[test]
fn test_status_reports_inconsistent_state() {
    let account = Account::new();
    account.cmd("setup").assert().success();
    fs::remove_dir_all(account.path("site-packages/.aiidalab.develop-aiidalab-backup")).unwrap();

    account
        .cmd("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Mode: UNKNOWN"))
        .stdout(predicate::str::contains(
            "aiidalab: inconsistent (link present but backup missing)",
        ))
        .stderr(predicate::str::contains("Detected one or more issues."));
}

#[test]
fn test_status_flags_develop_key_mismatch() {
    let account = Account::new();
    write_file(&account.path("aiidalab.toml"), "develop = true\n");

    account
        .cmd("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Mode: SYSTEM"))
        .stdout(predicate::str::contains("Key 'develop' set to true"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::new(cargo::cargo_bin!("develop-aiidalab"));
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("setup"))
        .stdout(predicate::str::contains("status"))
        .stdout(predicate::str::contains("restore"))
        .stdout(predicate::str::contains("--local-prefix"));
}
