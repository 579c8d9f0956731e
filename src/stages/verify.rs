use crate::core::stage::{Stage, StageContext, StageOutcome};
use crate::domain::ports::ModuleProbe;
use crate::utils::error::{ProvisionError, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Imports the plan's module list in order, printing one result line per
/// module. Every module is probed even after a failure so the operator sees
/// the full picture, but any failure makes the stage fatal.
pub struct VerifyStage {
    probe: Arc<dyn ModuleProbe>,
    modules: Vec<String>,
}

impl VerifyStage {
    pub fn new(probe: Arc<dyn ModuleProbe>, modules: Vec<String>) -> Self {
        Self { probe, modules }
    }
}

#[async_trait]
impl Stage for VerifyStage {
    async fn run(&self, _context: &StageContext) -> Result<StageOutcome> {
        let mut failed = Vec::new();
        let mut results = Vec::new();

        for module in &self.modules {
            match self.probe.import_module(module).await {
                Ok(()) => {
                    println!("✅ import {} ok", module);
                    tracing::info!("✅ import {} ok", module);
                    results.push(serde_json::json!({ "module": module, "ok": true }));
                }
                Err(e) => {
                    println!("❌ import {} failed", module);
                    tracing::error!("❌ import {} failed: {}", module, e);
                    results.push(serde_json::json!({ "module": module, "ok": false }));
                    failed.push(module.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(ProvisionError::ImportFailed {
                module: failed.join(", "),
            });
        }

        Ok(StageOutcome::default()
            .with_metadata("verified_modules", serde_json::Value::Array(results)))
    }

    fn get_name(&self) -> &str {
        "verification"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct MockProbe {
        fail_on: Option<String>,
        probed: Mutex<Vec<String>>,
    }

    impl MockProbe {
        fn new(fail_on: Option<&str>) -> Self {
            Self {
                fail_on: fail_on.map(|m| m.to_string()),
                probed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ModuleProbe for MockProbe {
        async fn import_module(&self, module: &str) -> Result<()> {
            self.probed.lock().unwrap().push(module.to_string());
            if self.fail_on.as_deref() == Some(module) {
                return Err(ProvisionError::ImportFailed {
                    module: module.to_string(),
                });
            }
            Ok(())
        }
    }

    fn modules() -> Vec<String> {
        ["pylons", "webhelpers", "weberror", "paste", "bq"]
            .iter()
            .map(|m| m.to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_all_modules_probed_in_order() {
        let probe = Arc::new(MockProbe::new(None));
        let stage = VerifyStage::new(probe.clone(), modules());
        let context = StageContext::new("test".to_string());

        let outcome = stage.run(&context).await.unwrap();

        assert_eq!(*probe.probed.lock().unwrap(), modules());
        let results = outcome
            .metadata
            .get("verified_modules")
            .unwrap()
            .as_array()
            .unwrap();
        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_failure_is_fatal_but_every_module_still_reports() {
        let probe = Arc::new(MockProbe::new(Some("weberror")));
        let stage = VerifyStage::new(probe.clone(), modules());
        let context = StageContext::new("test".to_string());

        let result = stage.run(&context).await;

        // every module was still probed, in order
        assert_eq!(*probe.probed.lock().unwrap(), modules());
        match result {
            Err(ProvisionError::ImportFailed { module }) => assert_eq!(module, "weberror"),
            other => panic!("expected import failure, got {:?}", other.map(|_| ())),
        }
    }
}
