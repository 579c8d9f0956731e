use crate::core::graph::DependencyGraph;
use crate::core::plan::{
    ProvisionPlan, DEFAULT_CLEANUP_DIRS, DEFAULT_REQUIREMENTS_MANIFEST, DEFAULT_VERIFY_MODULES,
};
use crate::domain::model::{InstallSource, PackageSpec};
use crate::utils::error::{ProvisionError, Result};
use crate::utils::validation::{validate_non_empty_string, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// TOML provisioning plan. Any omitted section falls back to the built-in
/// BisQue defaults, so a plan file can override just the cleanup list or
/// just the package set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub plan: PlanMeta,
    pub packages: Option<Vec<PackageEntry>>,
    pub verify: Option<VerifySection>,
    pub cleanup: Option<CleanupSection>,
    pub monitoring: Option<MonitoringSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMeta {
    pub name: String,
    pub description: Option<String>,
    pub requirements: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageEntry {
    pub name: String,
    /// Subdirectory of the source root; exclusive with `requirement`.
    pub source_tree: Option<String>,
    /// Package-index requirement string; exclusive with `source_tree`.
    pub requirement: Option<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    pub health_check_executable: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifySection {
    pub modules: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupSection {
    pub directories: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringSection {
    pub enabled: bool,
}

impl PlanConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ProvisionError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| ProvisionError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replace `${VAR}` references with environment values; unknown variables
    /// are left as-is so validation can point at them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_non_empty_string("plan.name", &self.plan.name)?;

        if let Some(packages) = &self.packages {
            for entry in packages {
                validate_non_empty_string("packages.name", &entry.name)?;

                match (&entry.source_tree, &entry.requirement) {
                    (Some(_), Some(_)) | (None, None) => {
                        return Err(ProvisionError::InvalidConfigValueError {
                            field: format!("packages.{}", entry.name),
                            value: entry.name.clone(),
                            reason: "Exactly one of source_tree or requirement must be set"
                                .to_string(),
                        });
                    }
                    _ => {}
                }
            }

            // dependency names must resolve and the graph must be acyclic
            let specs: Vec<PackageSpec> = packages.iter().map(PackageEntry::to_spec).collect();
            DependencyGraph::from_packages(&specs)?.topo_order()?;
        }

        if let Some(verify) = &self.verify {
            for module in &verify.modules {
                validate_non_empty_string("verify.modules", module)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    /// Materialize the plan, filling gaps from the BisQue defaults.
    pub fn into_plan(self) -> ProvisionPlan {
        self.into_plan_with_manifest(DEFAULT_REQUIREMENTS_MANIFEST)
    }

    /// Materialize the plan; `manifest` is used when the plan file does not
    /// pin its own requirements manifest, so a CLI-supplied value reaches
    /// the requirements stage.
    pub fn into_plan_with_manifest(self, manifest: &str) -> ProvisionPlan {
        let defaults = ProvisionPlan::bisque_default();

        ProvisionPlan {
            name: self.plan.name,
            requirements_manifest: self
                .plan
                .requirements
                .unwrap_or_else(|| manifest.to_string()),
            packages: self
                .packages
                .map(|entries| entries.iter().map(PackageEntry::to_spec).collect())
                .unwrap_or(defaults.packages),
            verify_modules: self
                .verify
                .map(|v| v.modules)
                .unwrap_or_else(|| DEFAULT_VERIFY_MODULES.iter().map(|m| m.to_string()).collect()),
            cleanup_dirs: self
                .cleanup
                .map(|c| c.directories)
                .unwrap_or_else(|| DEFAULT_CLEANUP_DIRS.iter().map(|d| d.to_string()).collect()),
        }
    }
}

impl PackageEntry {
    fn to_spec(&self) -> PackageSpec {
        let source = match (&self.source_tree, &self.requirement) {
            (Some(subdir), _) => InstallSource::SourceTree {
                subdir: subdir.clone(),
            },
            (None, Some(requirement)) => InstallSource::Index {
                requirement: requirement.clone(),
            },
            // rejected by validate_config; fall back to the package name
            (None, None) => InstallSource::Index {
                requirement: self.name.clone(),
            },
        };

        PackageSpec {
            name: self.name.clone(),
            source,
            depends_on: self.depends_on.clone(),
            health_check_executable: self.health_check_executable.clone(),
        }
    }
}

impl Validate for PlanConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
