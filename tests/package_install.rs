//! Test the full installation sequence against fake vendor tools.
//!
//! A temporary TRA directory is populated with shell scripts standing
//! in for `AppManage`/`AppStatusCheck`; they record their command lines
//! and emulate the `-out` behavior. Hooks dump their `INSTALL_*`
//! environment so propagation and temp-file cleanup can be checked.
#![cfg(unix)]

use std::{
    collections::HashMap,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use bwinstall::{
    domain::{Credentials, DomainProfile},
    error::InstallErrorKind,
    inst::InstallConfig,
    path::TibcoEnv,
};
use tempfile::TempDir;

const PREPARE_HOOK: &str = "#!/bin/sh\n\
env | grep '^INSTALL_' > \"$INSTALL_PACKAGEDIR/prepare-env\"\n\
if [ -f \"$INSTALL_CREDENTIAL\" ]; then touch \"$INSTALL_PACKAGEDIR/cred-present\"; fi\n\
exit 0\n";

const COMPLETE_HOOK: &str = "#!/bin/sh\n\
env | grep '^INSTALL_' > \"$INSTALL_PACKAGEDIR/complete-env\"\n\
exit 0\n";

struct Fixture {
    _root: TempDir,
    tibco_home: PathBuf,
    tra_home: PathBuf,
    app_env: PathBuf,
    package_dir: PathBuf,
    log: PathBuf,
}

impl Fixture {
    /// Builds a package plus fake tools.
    ///
    /// `installed` controls the `-app` status check, `domain_ok` the
    /// domain status check, and `fail_pattern` makes the fake
    /// `AppManage` exit non-zero for matching command lines.
    fn new(installed: bool, domain_ok: bool, fail_pattern: Option<&str>) -> Self {
        let root = TempDir::new().unwrap();
        let tibco_home = root.path().join("tibco");
        let tra_home = root.path().join("tra");
        let app_env = root.path().join("app-env");
        let package_dir = root.path().join("orders");
        let log = root.path().join("calls.log");

        std::fs::create_dir_all(&tibco_home).unwrap();
        std::fs::create_dir_all(tra_home.join("bin")).unwrap();
        std::fs::create_dir_all(&app_env).unwrap();
        std::fs::create_dir_all(package_dir.join("envconfig")).unwrap();
        std::fs::create_dir_all(package_dir.join("hooks")).unwrap();

        std::fs::write(
            app_env.join("domain.ron"),
            "(domain: \"BWDEV\", user: \"admin\")\n",
        )
        .unwrap();

        std::fs::write(
            package_dir.join("package-info"),
            "appname=orders\n\
             archive=orders.ear\n\
             prepare=hooks/prepare.sh\n\
             complete=hooks/complete.sh\n",
        )
        .unwrap();
        std::fs::write(package_dir.join("orders.ear"), b"not a real archive").unwrap();
        std::fs::write(package_dir.join("envconfig/BWDEV.xml"), b"<application/>").unwrap();

        write_script(&package_dir.join("hooks/prepare.sh"), PREPARE_HOOK);
        write_script(&package_dir.join("hooks/complete.sh"), COMPLETE_HOOK);

        let status_script = format!(
            "#!/bin/sh\n\
             echo \"AppStatusCheck $*\" >> {log}\n\
             case \"$*\" in\n\
               *-app*) exit {app_code} ;;\n\
             esac\n\
             exit {domain_code}\n",
            log = log.display(),
            app_code = if installed { 0 } else { 1 },
            domain_code = if domain_ok { 0 } else { 2 },
        );

        let fail_block = match fail_pattern {
            Some(pattern) => format!("case \"$*\" in\n  {pattern}) exit 7 ;;\nesac\n"),
            None => String::new(),
        };
        let manage_script = format!(
            "#!/bin/sh\n\
             echo \"AppManage $*\" >> {log}\n\
             {fail_block}\
             out=\"\"\n\
             prev=\"\"\n\
             for arg in \"$@\"; do\n\
               if [ \"$prev\" = \"-out\" ]; then out=\"$arg\"; fi\n\
               prev=\"$arg\"\n\
             done\n\
             if [ -n \"$out\" ]; then echo \"<exported/>\" > \"$out\"; fi\n\
             exit 0\n",
            log = log.display(),
        );

        write_script(&tra_home.join("bin/AppStatusCheck"), &status_script);
        write_script(&tra_home.join("bin/AppManage"), &manage_script);

        Self {
            _root: root,
            tibco_home,
            tra_home,
            app_env,
            package_dir,
            log,
        }
    }

    fn env(&self) -> TibcoEnv {
        TibcoEnv::new(&self.tibco_home, &self.tra_home, &self.app_env)
    }

    fn profile(&self) -> DomainProfile {
        DomainProfile::load(self.app_env.join("domain.ron")).unwrap()
    }

    fn config(&self) -> InstallConfig {
        InstallConfig::new(Credentials::new("admin", "secret"))
    }

    fn log_lines(&self) -> Vec<String> {
        if !self.log.exists() {
            return Vec::new();
        }

        std::fs::read_to_string(&self.log)
            .unwrap()
            .lines()
            .map(|line| line.to_string())
            .collect()
    }

    fn hook_env(&self, dump_name: &str) -> HashMap<String, String> {
        std::fs::read_to_string(self.package_dir.join(dump_name))
            .unwrap()
            .lines()
            .filter_map(|line| {
                line.split_once('=')
                    .map(|(key, value)| (key.to_string(), value.to_string()))
            })
            .collect()
    }
}

fn write_script(path: &Path, contents: &str) {
    std::fs::write(path, contents).unwrap();
    let mut perm = path.metadata().unwrap().permissions();
    perm.set_mode(0o755);
    std::fs::set_permissions(path, perm).unwrap();
}

#[test_log::test]
fn test_fresh_install_sequence() {
    let fixture = Fixture::new(false, true, None);

    let outcome = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    )
    .unwrap();

    assert_eq!(outcome.app_name, "orders");
    assert!(!outcome.updated);
    assert!(!outcome.deployed);

    let lines = fixture.log_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("AppStatusCheck -domain BWDEV -cred "));
    assert!(lines[1].starts_with("AppStatusCheck -app orders -domain BWDEV"));
    assert!(lines[2].starts_with("AppManage -upload -ear "));
    assert!(lines[2].contains("orders.ear"));
    assert!(lines[2].contains("envconfig/BWDEV.xml"));

    let env = fixture.hook_env("prepare-env");
    assert_eq!(env["INSTALL_APPNAME"], "orders");
    assert_eq!(env["INSTALL_DOMAIN"], "BWDEV");
    assert_eq!(env["INSTALL_USER"], "admin");
    assert_eq!(env["INSTALL_UPDATE"], "false");
    assert_eq!(env["INSTALL_OVERWRITE"], "false");
    assert_eq!(env["INSTALL_CURRENTCONFIG"], "");
    assert!(env["INSTALL_ARCHIVE"].ends_with("orders.ear"));
    assert!(env["INSTALL_BASECONFIG"].ends_with("envconfig/BWDEV.xml"));
    assert_eq!(env["INSTALL_DEPLOYCONFIG"], env["INSTALL_BASECONFIG"]);

    // The credential file existed while hooks ran and is gone now.
    assert!(fixture.package_dir.join("cred-present").exists());
    assert!(!Path::new(&env["INSTALL_CREDENTIAL"]).exists());

    // Complete hooks ran with the same environment.
    let env = fixture.hook_env("complete-env");
    assert_eq!(env["INSTALL_APPNAME"], "orders");
}

#[test_log::test]
fn test_upgrade_merges_configuration() {
    let fixture = Fixture::new(true, true, None);

    let outcome = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    )
    .unwrap();

    assert!(outcome.updated);

    let lines = fixture.log_lines();
    assert_eq!(lines.len(), 5);
    assert!(lines[2].starts_with("AppManage -export -app orders"));
    assert!(!lines[2].contains("-deployconfig"));
    assert!(lines[3].starts_with("AppManage -export -app orders"));
    assert!(lines[3].contains("-deployconfig"));
    assert!(lines[4].starts_with("AppManage -upload "));

    let env = fixture.hook_env("prepare-env");
    assert_eq!(env["INSTALL_UPDATE"], "true");

    // The deployment configuration is a merged temp file, not the base
    // document, and it is removed after the install.
    assert_ne!(env["INSTALL_DEPLOYCONFIG"], env["INSTALL_BASECONFIG"]);
    assert!(!env["INSTALL_CURRENTCONFIG"].is_empty());
    assert!(!Path::new(&env["INSTALL_DEPLOYCONFIG"]).exists());
    assert!(!Path::new(&env["INSTALL_CURRENTCONFIG"]).exists());
}

#[test_log::test]
fn test_overwrite_skips_merge() {
    let fixture = Fixture::new(true, true, None);

    let mut config = fixture.config();
    config.overwrite = true;

    bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &config,
    )
    .unwrap();

    let lines = fixture.log_lines();
    assert!(lines.iter().all(|line| !line.contains("-export")));

    let env = fixture.hook_env("prepare-env");
    assert_eq!(env["INSTALL_OVERWRITE"], "true");
    assert_eq!(env["INSTALL_UPDATE"], "true");
    assert_eq!(env["INSTALL_CURRENTCONFIG"], "");
    assert_eq!(env["INSTALL_DEPLOYCONFIG"], env["INSTALL_BASECONFIG"]);
}

#[test_log::test]
fn test_deploy_flag_deploys() {
    let fixture = Fixture::new(false, true, None);

    let mut config = fixture.config();
    config.deploy = true;

    let outcome = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &config,
    )
    .unwrap();

    assert!(outcome.deployed);

    let lines = fixture.log_lines();
    assert!(lines
        .iter()
        .any(|line| line.starts_with("AppManage -deploy -app orders")));
}

#[test_log::test]
fn test_domain_check_failure_short_circuits() {
    let fixture = Fixture::new(false, false, None);

    let result = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    );

    let error = result.unwrap_err();
    assert!(matches!(
        error.kind(),
        InstallErrorKind::DomainUnavailable
    ));
    assert_eq!(error.exit_code(), 2);

    // Only the status check ran; no hook touched the package.
    assert_eq!(fixture.log_lines().len(), 1);
    assert!(!fixture.package_dir.join("prepare-env").exists());
}

#[test_log::test]
fn test_hook_failure_aborts_before_upload() {
    let fixture = Fixture::new(false, true, None);

    write_script(
        &fixture.package_dir.join("hooks/prepare.sh"),
        "#!/bin/sh\n\
         echo \"$INSTALL_CREDENTIAL\" > \"$INSTALL_PACKAGEDIR/cred-path\"\n\
         exit 1\n",
    );

    let result = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    );

    assert!(matches!(
        result.unwrap_err().kind(),
        InstallErrorKind::HookFailure
    ));

    let lines = fixture.log_lines();
    assert!(lines.iter().all(|line| !line.contains("-upload")));

    // Temp credential file is removed on the failure path too.
    let cred_path = std::fs::read_to_string(fixture.package_dir.join("cred-path")).unwrap();
    assert!(!Path::new(cred_path.trim()).exists());
}

#[test_log::test]
fn test_upload_failure_cleans_credential() {
    let fixture = Fixture::new(false, true, Some("-upload*"));

    let result = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    );

    let error = result.unwrap_err();
    assert!(matches!(error.kind(), InstallErrorKind::ToolFailure));
    assert_eq!(error.exit_code(), 1);

    let env = fixture.hook_env("prepare-env");
    assert!(!Path::new(&env["INSTALL_CREDENTIAL"]).exists());

    // Nothing after the failed upload ran.
    assert!(!fixture.package_dir.join("complete-env").exists());
}

#[test_log::test]
fn test_missing_envconfig_fails_before_tools() {
    let fixture = Fixture::new(false, true, None);

    std::fs::remove_file(fixture.package_dir.join("envconfig/BWDEV.xml")).unwrap();

    let result = bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    );

    assert!(matches!(
        result.unwrap_err().kind(),
        InstallErrorKind::MissingEnvConfig
    ));
    assert!(fixture.log_lines().is_empty());
}

#[test_log::test]
fn test_default_config_selected_without_domain_config() {
    let fixture = Fixture::new(false, true, None);

    std::fs::remove_file(fixture.package_dir.join("envconfig/BWDEV.xml")).unwrap();
    std::fs::write(
        fixture.package_dir.join("envconfig/default.xml"),
        b"<application/>",
    )
    .unwrap();

    bwinstall::install(
        &fixture.package_dir,
        &fixture.env(),
        &fixture.profile(),
        &fixture.config(),
    )
    .unwrap();

    let env = fixture.hook_env("prepare-env");
    assert!(env["INSTALL_BASECONFIG"].ends_with("envconfig/default.xml"));
}
