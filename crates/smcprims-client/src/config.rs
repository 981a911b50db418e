use std::path::PathBuf;

use smcprims_channel::DEFAULT_SERVICE_NAME;

/// Controls how a session reaches the SMC.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// IOService to open. Default: `AppleSMC`.
    pub service_name: String,
    /// When set, serve requests from a simulated SMC snapshot instead of
    /// the driver.
    pub simulation: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            service_name: DEFAULT_SERVICE_NAME.to_string(),
            simulation: None,
        }
    }
}

impl SessionConfig {
    /// Use a simulated SMC loaded from `path`.
    pub fn with_simulation(mut self, path: impl Into<PathBuf>) -> Self {
        self.simulation = Some(path.into());
        self
    }

    /// Override the IOService name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }
}
