use bisque_provision::config::plan_config::PlanConfig;
use bisque_provision::core::plan::ProvisionPlan;
use bisque_provision::core::sequence::StageSequence;
use bisque_provision::core::ConfigProvider;
use bisque_provision::stages::{
    CleanupStage, EnvCheckStage, InstallStage, RequirementsStage, VerifyStage,
};
use bisque_provision::utils::{logger, validation::Validate};
use bisque_provision::{CliConfig, PipInstaller, ProvisionEngine, PythonProbe};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting bisque-provision ({})", config.action);
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    // Load the plan: TOML file if given, otherwise the built-in package set.
    let (plan, plan_monitoring) = match &config.plan {
        Some(path) => {
            tracing::info!("📁 Loading provisioning plan from: {}", path.display());
            let plan_config = match PlanConfig::from_file(path) {
                Ok(plan_config) => plan_config,
                Err(e) => {
                    eprintln!("❌ Failed to load plan file '{}': {}", path.display(), e);
                    eprintln!("💡 Make sure the file exists and is valid TOML");
                    std::process::exit(e.exit_code());
                }
            };

            if let Err(e) = plan_config.validate() {
                tracing::error!("❌ Plan validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(e.exit_code());
            }

            let monitoring = plan_config.monitoring_enabled();
            (
                plan_config.into_plan_with_manifest(config.requirements_manifest()),
                monitoring,
            )
        }
        None => {
            let mut plan = ProvisionPlan::bisque_default();
            plan.requirements_manifest = config.requirements_manifest().to_string();
            (plan, false)
        }
    };

    let execution_id = format!("prov_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    let monitor_enabled = config.monitor || plan_monitoring;

    if config.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No changes will be made");
        if let Err(e) = display_dry_run(&config, &plan) {
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
        return Ok(());
    }

    let sequence = match build_sequence(
        &config,
        &config.action,
        &plan,
        execution_id.clone(),
        monitor_enabled,
    ) {
        Ok(sequence) => sequence,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    };

    display_run_summary(&config, &plan, &sequence, &execution_id);

    let mut engine = ProvisionEngine::new(sequence);

    match engine.run().await {
        Ok(results) => {
            let summary = StageSequence::get_execution_summary(&results);
            tracing::info!("🎉 Provisioning completed successfully!");
            println!("✅ Provisioning completed successfully!");
            println!("🆔 Execution ID: {}", execution_id);
            if let Some(duration) = summary.get("total_duration_ms") {
                println!("⏱️ Total duration: {}ms", duration);
            }
        }
        Err(e) => {
            tracing::error!("❌ Provisioning failed: {}", e);
            eprintln!("❌ {}", e);
            eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

fn build_sequence(
    config: &impl ConfigProvider,
    action: &str,
    plan: &ProvisionPlan,
    execution_id: String,
    monitor_enabled: bool,
) -> bisque_provision::Result<StageSequence> {
    let venv_root = config.venv_root().to_path_buf();
    let source_root = config.source_root().to_path_buf();

    let installer = Arc::new(PipInstaller::new(venv_root.clone(), source_root.clone()));
    let probe = Arc::new(PythonProbe::new(venv_root.clone()));

    let mut sequence = StageSequence::new(execution_id).with_monitoring(monitor_enabled);

    match action {
        "build" => {
            sequence.add_stage(Box::new(EnvCheckStage::new(venv_root.clone())));
            sequence.add_stage(Box::new(RequirementsStage::new(
                installer.clone(),
                source_root.clone(),
                plan.requirements_manifest.clone(),
            )));
            sequence.add_stage(Box::new(InstallStage::new(
                installer,
                plan.clone(),
                venv_root,
            )));
            sequence.add_stage(Box::new(VerifyStage::new(
                probe,
                plan.verify_modules.clone(),
            )));
            sequence.add_stage(Box::new(CleanupStage::new(
                source_root,
                plan.cleanup_dirs.clone(),
            )));
        }
        "verify" => {
            sequence.add_stage(Box::new(EnvCheckStage::new(venv_root)));
            sequence.add_stage(Box::new(VerifyStage::new(
                probe,
                plan.verify_modules.clone(),
            )));
        }
        "clean" => {
            sequence.add_stage(Box::new(CleanupStage::new(
                source_root,
                plan.cleanup_dirs.clone(),
            )));
        }
        // unreachable: validated up front
        other => {
            return Err(bisque_provision::ProvisionError::ConfigError {
                message: format!("Unknown action: {}", other),
            });
        }
    }

    Ok(sequence)
}

fn display_run_summary(
    config: &CliConfig,
    plan: &ProvisionPlan,
    sequence: &StageSequence,
    execution_id: &str,
) {
    println!("📋 Provisioning Summary:");
    println!("  Plan: {}", plan.name);
    println!("  Action: {}", config.action);
    println!("  Execution ID: {}", execution_id);
    println!("  Environment root: {}", config.venv.display());
    println!("  Source root: {}", config.source_root.display());
    println!("  Stages: {}", sequence.stage_names().join(" -> "));
    println!();
}

fn display_dry_run(config: &CliConfig, plan: &ProvisionPlan) -> bisque_provision::Result<()> {
    println!("🔍 Dry Run Analysis:");
    println!();
    println!("  Environment root: {}", config.venv.display());
    println!("  Source root: {}", config.source_root.display());
    println!("  Requirements manifest: {}", plan.requirements_manifest);
    println!();

    println!("📝 Resolved install order:");
    for (index, package) in plan.install_order()?.iter().enumerate() {
        println!("  {}. {}", index + 1, package.name);
        if !package.depends_on.is_empty() {
            println!("     Dependencies: {}", package.depends_on.join(", "));
        }
        if let Some(executable) = &package.health_check_executable {
            println!("     Health check: {}", executable);
        }
    }
    println!();

    println!("🔎 Verification modules (in order):");
    for module in &plan.verify_modules {
        println!("  - {}", module);
    }
    println!();

    println!("🧹 Cleanup directories:");
    for dir in &plan.cleanup_dirs {
        println!("  - {}", dir);
    }
    println!();
    println!("✅ Dry run analysis complete.");

    Ok(())
}
