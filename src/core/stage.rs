use crate::domain::model::StageReport;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// Shared state threaded through the stage sequence. The environment root is
/// carried explicitly by the stages themselves; nothing here is process-global.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub previous_reports: Vec<StageReport>,
    pub shared_data: HashMap<String, serde_json::Value>,
    pub execution_id: String,
}

impl StageContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            previous_reports: Vec::new(),
            shared_data: HashMap::new(),
            execution_id,
        }
    }

    pub fn get_previous_report(&self) -> Option<&StageReport> {
        self.previous_reports.last()
    }

    pub fn get_report_by_name(&self, name: &str) -> Option<&StageReport> {
        self.previous_reports.iter().find(|r| r.stage_name == name)
    }

    pub fn add_shared_data(&mut self, key: String, value: serde_json::Value) {
        self.shared_data.insert(key, value);
    }

    pub fn get_shared_data(&self, key: &str) -> Option<&serde_json::Value> {
        self.shared_data.get(key)
    }

    pub fn add_report(&mut self, report: StageReport) {
        self.previous_reports.push(report);
    }
}

/// What a stage hands back on success; the sequence attaches timing.
#[derive(Debug, Clone, Default)]
pub struct StageOutcome {
    pub metadata: HashMap<String, serde_json::Value>,
}

impl StageOutcome {
    pub fn with_metadata(mut self, key: &str, value: serde_json::Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }
}

/// One step of the provisioning pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    async fn run(&self, context: &StageContext) -> Result<StageOutcome>;

    fn get_name(&self) -> &str;

    /// Stages may opt out based on what earlier stages recorded.
    fn should_execute(&self, _context: &StageContext) -> bool {
        true
    }
}
