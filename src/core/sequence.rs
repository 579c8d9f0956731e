use crate::core::stage::{Stage, StageContext};
use crate::domain::model::StageReport;
use crate::utils::error::{ProvisionError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::time::Instant;

/// Ordered, fail-fast executor for provisioning stages.
pub struct StageSequence {
    stages: Vec<Box<dyn Stage>>,
    monitor: Option<SystemMonitor>,
    monitor_enabled: bool,
    execution_id: String,
}

impl StageSequence {
    pub fn new(execution_id: String) -> Self {
        Self {
            stages: Vec::new(),
            monitor: None,
            monitor_enabled: false,
            execution_id,
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor_enabled = enabled;
        if enabled {
            self.monitor = Some(SystemMonitor::new(enabled));
        }
        self
    }

    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.get_name()).collect()
    }

    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Run every stage in order. The first failure aborts the whole sequence;
    /// no later stage is attempted and nothing is rolled back.
    pub async fn execute_all(&mut self) -> Result<Vec<StageReport>> {
        let mut results = Vec::new();
        let mut context = StageContext::new(self.execution_id.clone());

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Provisioning started.");
            }
        }

        for stage in &self.stages {
            if !stage.should_execute(&context) {
                tracing::info!("⏭️ Skipping stage: {} (condition not met)", stage.get_name());
                continue;
            }

            let start_time = Instant::now();
            tracing::info!("▶️ Running stage: {}", stage.get_name());

            match stage.run(&context).await {
                Ok(outcome) => {
                    let duration = start_time.elapsed();

                    let report = StageReport {
                        stage_name: stage.get_name().to_string(),
                        duration,
                        metadata: outcome.metadata,
                    };

                    tracing::info!(
                        "✅ Stage completed: {} (duration: {:?})",
                        report.stage_name,
                        report.duration
                    );

                    for (key, value) in &report.metadata {
                        context.add_shared_data(key.clone(), value.clone());
                    }
                    context.add_report(report.clone());
                    results.push(report);
                }
                Err(e) => {
                    tracing::error!("❌ Stage '{}' failed: {}", stage.get_name(), e);
                    return Err(ProvisionError::StageError {
                        stage: stage.get_name().to_string(),
                        details: e.to_string(),
                    });
                }
            }
        }

        if self.monitor_enabled {
            if let Some(monitor) = &self.monitor {
                monitor.log_stats("Provisioning completed.");
            }
        }

        Ok(results)
    }

    pub fn get_execution_summary(results: &[StageReport]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_stages = results.len();
        let total_duration: std::time::Duration = results.iter().map(|r| r.duration).sum();

        summary.insert(
            "total_stages".to_string(),
            serde_json::Value::Number(total_stages.into()),
        );
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let stage_names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.stage_name.clone()))
            .collect();
        summary.insert(
            "executed_stages".to_string(),
            serde_json::Value::Array(stage_names),
        );

        summary
    }
}
