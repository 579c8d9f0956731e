use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Where a package's distribution comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallSource {
    /// Built from a subdirectory of the source root.
    SourceTree { subdir: String },
    /// Fetched from the package index by requirement string.
    Index { requirement: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub source: InstallSource,
    /// Names of packages that must be installed before this one.
    #[serde(default)]
    pub depends_on: Vec<String>,
    /// Console script that must exist in the environment after this
    /// package installs. Missing script triggers one forced reinstall.
    #[serde(default)]
    pub health_check_executable: Option<String>,
}

impl PackageSpec {
    pub fn source_tree(name: &str, subdir: &str, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            source: InstallSource::SourceTree {
                subdir: subdir.to_string(),
            },
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            health_check_executable: None,
        }
    }

    pub fn index(name: &str, requirement: &str, depends_on: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            source: InstallSource::Index {
                requirement: requirement.to_string(),
            },
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
            health_check_executable: None,
        }
    }

    pub fn with_health_check(mut self, executable: &str) -> Self {
        self.health_check_executable = Some(executable.to_string());
        self
    }
}

/// Record of one completed stage.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub stage_name: String,
    pub duration: Duration,
    pub metadata: HashMap<String, serde_json::Value>,
}
