use crate::core::sequence::StageSequence;
use crate::domain::model::StageReport;
use crate::utils::error::Result;

/// Thin front for a configured stage sequence; owns the run lifecycle.
pub struct ProvisionEngine {
    sequence: StageSequence,
}

impl ProvisionEngine {
    pub fn new(sequence: StageSequence) -> Self {
        Self { sequence }
    }

    pub async fn run(&mut self) -> Result<Vec<StageReport>> {
        println!(
            "Starting provisioning run {}...",
            self.sequence.execution_id()
        );
        println!("Stages: {}", self.sequence.stage_names().join(" -> "));

        let results = self.sequence.execute_all().await?;

        println!("Completed {} stage(s)", results.len());
        Ok(results)
    }
}
