use cinder_crypto::HashingConfig;
use cinder_fs::DefaultPathProvider;
use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Validate, Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[garde(dive)]
    pub hashing: HashingConfig,
    #[garde(dive)]
    pub telemetry: cinder_telemetry::config::Config,
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{{ hashing: {}, telemetry: {} }}",
            self.hashing, self.telemetry
        )
    }
}

impl DefaultPathProvider for Config {
    const DEFAULT_FILENAME: &'static str = "config/cinder.toml";
}
