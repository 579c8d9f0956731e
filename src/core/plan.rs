use crate::core::graph::DependencyGraph;
use crate::domain::model::PackageSpec;
use crate::utils::error::{ProvisionError, Result};

/// Console script installed by bqcore; its presence is the install health check.
pub const ADMIN_EXECUTABLE: &str = "bq-admin";

/// Modules probed by the verification stage, in reporting order.
pub const DEFAULT_VERIFY_MODULES: [&str; 5] = ["pylons", "webhelpers", "weberror", "paste", "bq"];

/// Source-tree directories removed after installation. Storage reduction for
/// container images; deployments that need them override the list in the plan.
pub const DEFAULT_CLEANUP_DIRS: [&str; 4] = ["docs", "dev", "tools", "tmp"];

pub const DEFAULT_REQUIREMENTS_MANIFEST: &str = "requirements.txt";

/// Everything the pipeline installs, verifies and removes for one run.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
    pub name: String,
    /// Requirements manifest path, relative to the source root.
    pub requirements_manifest: String,
    pub packages: Vec<PackageSpec>,
    pub verify_modules: Vec<String>,
    /// Directories removed by cleanup, relative to the source root.
    pub cleanup_dirs: Vec<String>,
}

impl ProvisionPlan {
    /// The BisQue package set: legacy compatibility shims first, then the
    /// first-party packages. Declared dependencies reproduce the
    /// historically known-good install order under `install_order`.
    pub fn bisque_default() -> Self {
        let packages = vec![
            PackageSpec::source_tree("WebHelpers", "legacy_upgraded/WebHelpers-2.0", &[]),
            PackageSpec::source_tree("WebError", "legacy_upgraded/WebError-2.0", &[]),
            PackageSpec::index("paste", "Paste", &[]),
            PackageSpec::source_tree(
                "Pylons",
                "legacy_upgraded/Pylons-2.0",
                &["WebHelpers", "WebError", "paste"],
            ),
            PackageSpec::source_tree("Minimatic", "legacy_upgraded/Minimatic-2.0", &["Pylons"]),
            PackageSpec::source_tree("bqcore", "bqcore", &["Pylons", "Minimatic"])
                .with_health_check(ADMIN_EXECUTABLE),
            PackageSpec::source_tree("bqapi", "bqapi", &["bqcore"]),
            PackageSpec::source_tree("bqengine", "bqengine", &["bqcore", "bqapi"]),
            PackageSpec::source_tree("bqfeature", "bqfeature", &["bqcore", "bqapi"]),
            PackageSpec::source_tree(
                "bqserver",
                "bqserver",
                &["bqcore", "bqapi", "bqengine", "bqfeature"],
            ),
        ];

        Self {
            name: "bisque".to_string(),
            requirements_manifest: DEFAULT_REQUIREMENTS_MANIFEST.to_string(),
            packages,
            verify_modules: DEFAULT_VERIFY_MODULES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            cleanup_dirs: DEFAULT_CLEANUP_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Packages in computed installation order.
    pub fn install_order(&self) -> Result<Vec<PackageSpec>> {
        let graph = DependencyGraph::from_packages(&self.packages)?;
        let order = graph.topo_order()?;

        order
            .iter()
            .map(|name| {
                self.package(name)
                    .cloned()
                    .ok_or_else(|| ProvisionError::ConfigError {
                        message: format!("Package '{}' vanished during ordering", name),
                    })
            })
            .collect()
    }

    pub fn package(&self, name: &str) -> Option<&PackageSpec> {
        self.packages.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_plan_reproduces_manual_order() {
        let plan = ProvisionPlan::bisque_default();
        let order: Vec<String> = plan
            .install_order()
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(
            order,
            vec![
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
            ]
        );
    }

    #[test]
    fn test_default_plan_verify_modules() {
        let plan = ProvisionPlan::bisque_default();
        assert_eq!(
            plan.verify_modules,
            vec!["pylons", "webhelpers", "weberror", "paste", "bq"]
        );
    }

    #[test]
    fn test_only_bqcore_carries_a_health_check() {
        let plan = ProvisionPlan::bisque_default();
        let checked: Vec<&str> = plan
            .packages
            .iter()
            .filter(|p| p.health_check_executable.is_some())
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(checked, vec!["bqcore"]);
        assert_eq!(
            plan.package("bqcore").unwrap().health_check_executable,
            Some(ADMIN_EXECUTABLE.to_string())
        );
    }
}
