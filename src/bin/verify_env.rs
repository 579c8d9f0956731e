use bisque_provision::config::plan_config::PlanConfig;
use bisque_provision::core::plan::ProvisionPlan;
use bisque_provision::core::sequence::StageSequence;
use bisque_provision::stages::{EnvCheckStage, VerifyStage};
use bisque_provision::utils::logger;
use bisque_provision::utils::validation::Validate;
use bisque_provision::PythonProbe;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

/// Standalone verification tool: checks that the provisioned environment
/// still imports cleanly. Import failures are fatal, same as in the full
/// pipeline.
#[derive(Parser)]
#[command(name = "verify-env")]
#[command(about = "Verify a provisioned BisQue environment")]
struct Args {
    /// Environment root to verify
    #[arg(long, env = "VENV", default_value = "/usr/lib/bisque")]
    venv: PathBuf,

    /// TOML plan providing the module list (defaults to the built-in set)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    let plan = match &args.plan {
        Some(path) => {
            let plan_config = match PlanConfig::from_file(path) {
                Ok(plan_config) => plan_config,
                Err(e) => {
                    eprintln!("❌ Failed to load plan file '{}': {}", path.display(), e);
                    std::process::exit(e.exit_code());
                }
            };
            if let Err(e) = plan_config.validate() {
                eprintln!("❌ {}", e);
                std::process::exit(e.exit_code());
            }
            plan_config.into_plan()
        }
        None => ProvisionPlan::bisque_default(),
    };

    let execution_id = format!("verify_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"));
    tracing::info!(
        "🔎 Verifying environment {} ({} modules)",
        args.venv.display(),
        plan.verify_modules.len()
    );

    let probe = Arc::new(PythonProbe::new(args.venv.clone()));

    let mut sequence = StageSequence::new(execution_id);
    sequence.add_stage(Box::new(EnvCheckStage::new(args.venv.clone())));
    sequence.add_stage(Box::new(VerifyStage::new(probe, plan.verify_modules)));

    match sequence.execute_all().await {
        Ok(_) => {
            println!("✅ Environment verification passed");
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Verification failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(e.exit_code());
        }
    }
}
