use std::fmt::Display;

use garde::Validate;
use serde::{Deserialize, Serialize};

#[derive(Validate, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Comma separated `EnvFilter` directives, overridden by `RUST_LOG`.
    #[garde(ascii, length(min = 1))]
    pub filter: String,
    #[garde(skip)]
    pub format: Format,
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ filter: {}, format: {} }}", self.filter, self.format)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: Format::default(),
        }
    }
}

#[derive(Debug, strum::Display, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    #[default]
    Compact,
    Pretty,
    Json,
}
