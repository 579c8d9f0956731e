use crate::core::stage::{Stage, StageContext, StageOutcome};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Removes directories not needed at runtime. Idempotent: directories that
/// are already absent are a no-op, so a re-run never fails here.
pub struct CleanupStage {
    source_root: PathBuf,
    dirs: Vec<String>,
}

impl CleanupStage {
    pub fn new(source_root: PathBuf, dirs: Vec<String>) -> Self {
        Self { source_root, dirs }
    }
}

#[async_trait]
impl Stage for CleanupStage {
    async fn run(&self, _context: &StageContext) -> Result<StageOutcome> {
        let mut removed = Vec::new();

        for dir in &self.dirs {
            let path = self.source_root.join(dir);
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => {
                    tracing::info!("🧹 Removed {}", path.display());
                    removed.push(serde_json::Value::String(dir.clone()));
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::debug!("Already absent: {}", path.display());
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(StageOutcome::default()
            .with_metadata("removed_dirs", serde_json::Value::Array(removed)))
    }

    fn get_name(&self) -> &str {
        "cleanup"
    }
}
