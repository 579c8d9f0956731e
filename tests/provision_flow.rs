use async_trait::async_trait;
use bisque_provision::core::plan::ProvisionPlan;
use bisque_provision::core::sequence::StageSequence;
use bisque_provision::domain::model::PackageSpec;
use bisque_provision::domain::ports::{Installer, ModuleProbe};
use bisque_provision::stages::{
    CleanupStage, EnvCheckStage, InstallStage, RequirementsStage, VerifyStage,
};
use bisque_provision::utils::error::{ProvisionError, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// When the mock drops the health-check executable into the venv.
#[derive(Clone, Copy, PartialEq)]
enum ExeBehavior {
    OnInstall,
    OnForceOnly,
    Never,
}

struct MockInstaller {
    calls: Mutex<Vec<String>>,
    force_calls: Mutex<Vec<String>>,
    manifests: Mutex<Vec<PathBuf>>,
    fail_on: Option<String>,
    venv_bin: PathBuf,
    exe_behavior: ExeBehavior,
}

impl MockInstaller {
    fn new(venv_bin: PathBuf, exe_behavior: ExeBehavior) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            force_calls: Mutex::new(Vec::new()),
            manifests: Mutex::new(Vec::new()),
            fail_on: None,
            venv_bin,
            exe_behavior,
        }
    }

    fn with_failure_on(mut self, package: &str) -> Self {
        self.fail_on = Some(package.to_string());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn force_calls(&self) -> Vec<String> {
        self.force_calls.lock().unwrap().clone()
    }

    fn manifests(&self) -> Vec<PathBuf> {
        self.manifests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Installer for MockInstaller {
    async fn install_manifest(&self, manifest: &Path) -> Result<()> {
        self.calls.lock().unwrap().push("requirements".to_string());
        self.manifests.lock().unwrap().push(manifest.to_path_buf());
        Ok(())
    }

    async fn install(&self, package: &PackageSpec, force: bool) -> Result<()> {
        self.calls.lock().unwrap().push(package.name.clone());
        if force {
            self.force_calls.lock().unwrap().push(package.name.clone());
        }

        if self.fail_on.as_deref() == Some(package.name.as_str()) {
            return Err(ProvisionError::InstallError {
                package: package.name.clone(),
                details: "simulated failure".to_string(),
            });
        }

        if let Some(executable) = &package.health_check_executable {
            let create = match self.exe_behavior {
                ExeBehavior::OnInstall => true,
                ExeBehavior::OnForceOnly => force,
                ExeBehavior::Never => false,
            };
            if create {
                std::fs::create_dir_all(&self.venv_bin).unwrap();
                std::fs::write(self.venv_bin.join(executable), "").unwrap();
            }
        }

        Ok(())
    }
}

struct MockProbe {
    probed: Mutex<Vec<String>>,
}

impl MockProbe {
    fn new() -> Self {
        Self {
            probed: Mutex::new(Vec::new()),
        }
    }

    fn probed(&self) -> Vec<String> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModuleProbe for MockProbe {
    async fn import_module(&self, module: &str) -> Result<()> {
        self.probed.lock().unwrap().push(module.to_string());
        Ok(())
    }
}

fn make_venv() -> TempDir {
    let venv = TempDir::new().unwrap();
    std::fs::create_dir_all(venv.path().join("bin")).unwrap();
    std::fs::write(venv.path().join("bin/python"), "").unwrap();
    venv
}

fn make_source_root() -> TempDir {
    let source = TempDir::new().unwrap();
    std::fs::create_dir_all(source.path().join("docs")).unwrap();
    std::fs::create_dir_all(source.path().join("tmp")).unwrap();
    source
}

fn build_sequence(
    installer: Arc<MockInstaller>,
    probe: Arc<MockProbe>,
    venv_root: &Path,
    source_root: &Path,
    plan: &ProvisionPlan,
) -> StageSequence {
    let mut sequence = StageSequence::new("test_run".to_string());
    sequence.add_stage(Box::new(EnvCheckStage::new(venv_root.to_path_buf())));
    sequence.add_stage(Box::new(RequirementsStage::new(
        installer.clone(),
        source_root.to_path_buf(),
        plan.requirements_manifest.clone(),
    )));
    sequence.add_stage(Box::new(InstallStage::new(
        installer,
        plan.clone(),
        venv_root.to_path_buf(),
    )));
    sequence.add_stage(Box::new(VerifyStage::new(probe, plan.verify_modules.clone())));
    sequence.add_stage(Box::new(CleanupStage::new(
        source_root.to_path_buf(),
        plan.cleanup_dirs.clone(),
    )));
    sequence
}

const EXPECTED_ORDER: [&str; 11] = [
    "requirements",
    "WebHelpers",
    "WebError",
    "paste",
    "Pylons",
    "Minimatic",
    "bqcore",
    "bqapi",
    "bqengine",
    "bqfeature",
    "bqserver",
];

#[tokio::test]
async fn test_full_build_happy_path_is_repeatable() {
    let venv = make_venv();
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let installer = Arc::new(MockInstaller::new(
        venv.path().join("bin"),
        ExeBehavior::OnInstall,
    ));
    let probe = Arc::new(MockProbe::new());

    // first run
    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    let results = sequence.execute_all().await.unwrap();

    assert_eq!(results.len(), 5);
    assert_eq!(installer.calls(), EXPECTED_ORDER.to_vec());
    assert_eq!(probe.probed(), plan.verify_modules);
    assert!(installer.force_calls().is_empty());
    assert!(!source.path().join("docs").exists());
    assert!(!source.path().join("tmp").exists());

    // second run against the now-clean tree succeeds too
    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    sequence.execute_all().await.unwrap();

    assert_eq!(installer.calls().len(), EXPECTED_ORDER.len() * 2);
}

#[tokio::test]
async fn test_failing_install_stops_before_later_packages() {
    let venv = make_venv();
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let installer = Arc::new(
        MockInstaller::new(venv.path().join("bin"), ExeBehavior::OnInstall)
            .with_failure_on("Pylons"),
    );
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    let result = sequence.execute_all().await;

    match result {
        Err(ProvisionError::StageError { stage, .. }) => assert_eq!(stage, "package-install"),
        other => panic!("expected stage error, got {:?}", other.map(|_| ())),
    }

    // nothing after the failing package was attempted
    assert_eq!(
        installer.calls(),
        vec!["requirements", "WebHelpers", "WebError", "paste", "Pylons"]
    );
    assert!(probe.probed().is_empty());
    // cleanup never ran either
    assert!(source.path().join("docs").exists());
}

#[tokio::test]
async fn test_missing_environment_fails_before_any_install() {
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let missing_venv = source.path().join("no-such-venv");
    let installer = Arc::new(MockInstaller::new(
        missing_venv.join("bin"),
        ExeBehavior::OnInstall,
    ));
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        &missing_venv,
        source.path(),
        &plan,
    );
    let result = sequence.execute_all().await;

    match result {
        Err(ProvisionError::StageError { stage, .. }) => assert_eq!(stage, "environment-check"),
        other => panic!("expected stage error, got {:?}", other.map(|_| ())),
    }
    assert!(installer.calls().is_empty());
}

#[tokio::test]
async fn test_health_check_reinstalls_exactly_once_then_fails() {
    let venv = make_venv();
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let installer = Arc::new(MockInstaller::new(
        venv.path().join("bin"),
        ExeBehavior::Never,
    ));
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    let result = sequence.execute_all().await;

    match result {
        Err(ProvisionError::StageError { stage, details }) => {
            assert_eq!(stage, "package-install");
            assert!(details.contains("bq-admin"), "details: {}", details);
        }
        other => panic!("expected stage error, got {:?}", other.map(|_| ())),
    }

    // exactly one forced reinstall of the health-checked package
    assert_eq!(installer.force_calls(), vec!["bqcore"]);
    // nothing past bqcore was attempted (second bqcore entry is the reinstall)
    assert_eq!(
        installer.calls(),
        vec![
            "requirements",
            "WebHelpers",
            "WebError",
            "paste",
            "Pylons",
            "Minimatic",
            "bqcore",
            "bqcore",
        ]
    );
}

#[tokio::test]
async fn test_health_check_recovers_after_forced_reinstall() {
    let venv = make_venv();
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let installer = Arc::new(MockInstaller::new(
        venv.path().join("bin"),
        ExeBehavior::OnForceOnly,
    ));
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer.clone(),
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    sequence.execute_all().await.unwrap();

    assert_eq!(installer.force_calls(), vec!["bqcore"]);
    assert!(venv.path().join("bin/bq-admin").is_file());
}

#[tokio::test]
async fn test_configured_manifest_reaches_requirements_install() {
    let venv = make_venv();
    let source = make_source_root();
    let mut plan = ProvisionPlan::bisque_default();
    plan.requirements_manifest = "custom.txt".to_string();

    let installer = Arc::new(MockInstaller::new(
        venv.path().join("bin"),
        ExeBehavior::OnInstall,
    ));
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer.clone(),
        probe,
        venv.path(),
        source.path(),
        &plan,
    );
    sequence.execute_all().await.unwrap();

    assert_eq!(installer.manifests(), vec![source.path().join("custom.txt")]);
}

#[tokio::test]
async fn test_verification_probes_fixed_modules_in_order() {
    let venv = make_venv();
    let source = make_source_root();
    let plan = ProvisionPlan::bisque_default();

    let installer = Arc::new(MockInstaller::new(
        venv.path().join("bin"),
        ExeBehavior::OnInstall,
    ));
    let probe = Arc::new(MockProbe::new());

    let mut sequence = build_sequence(
        installer,
        probe.clone(),
        venv.path(),
        source.path(),
        &plan,
    );
    sequence.execute_all().await.unwrap();

    assert_eq!(
        probe.probed(),
        vec!["pylons", "webhelpers", "weberror", "paste", "bq"]
    );
}
