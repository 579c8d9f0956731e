use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Environment root not provisioned: {path}")]
    MissingEnvironment { path: String },

    #[error("Command `{command}` exited with status {status}")]
    CommandFailed { command: String, status: i32 },

    #[error("Installation of package '{package}' failed: {details}")]
    InstallError { package: String, details: String },

    #[error("Executable '{name}' still missing from {path} after forced reinstall")]
    ExecutableMissing { name: String, path: String },

    #[error("Module import failed: {module}")]
    ImportFailed { module: String },

    #[error("Dependency cycle among packages: {members:?}")]
    DependencyCycle { members: Vec<String> },

    #[error("Package '{package}' depends on unknown package '{dependency}'")]
    UnknownDependency { package: String, dependency: String },

    #[error("Stage '{stage}' failed: {details}")]
    StageError { stage: String, details: String },
}

impl ProvisionError {
    /// Exit code reported by the binaries: configuration problems map to 2,
    /// everything else to 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::ConfigError { .. }
            | ProvisionError::InvalidConfigValueError { .. }
            | ProvisionError::MissingConfigError { .. }
            | ProvisionError::DependencyCycle { .. }
            | ProvisionError::UnknownDependency { .. } => 2,
            _ => 1,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ProvisionError::MissingEnvironment { path } => format!(
                "Create the environment first, e.g. `python -m venv {}`, then re-run",
                path
            ),
            ProvisionError::ExecutableMissing { name, .. } => format!(
                "Check the bqcore console_scripts entry points; '{}' should be registered there",
                name
            ),
            ProvisionError::ImportFailed { .. } => {
                "Inspect the install log of the owning package for build errors".to_string()
            }
            ProvisionError::DependencyCycle { .. } | ProvisionError::UnknownDependency { .. } => {
                "Fix the depends_on declarations in the provisioning plan".to_string()
            }
            ProvisionError::ConfigError { .. }
            | ProvisionError::InvalidConfigValueError { .. }
            | ProvisionError::MissingConfigError { .. } => {
                "Check the CLI flags and the plan file against the documentation".to_string()
            }
            _ => "Re-run with --verbose for the full command output".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
