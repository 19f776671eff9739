//! Environment-driven loader settings
//!
//! # Naming convention
//!
//! Settings are read from variables named `<PREFIX><SEP><KEY>`, upper-cased,
//! with `__` as the separator. With the default prefix:
//!
//! | Variable                   | Setting                           |
//! |----------------------------|-----------------------------------|
//! | `STYLE_OVERLAY__PROFILE`   | profile path                      |
//! | `STYLE_OVERLAY__STRICT`    | reject unknown fields (`true`/`1`) |
//! | `STYLE_OVERLAY__MODE`      | preferred mode                    |
//! | `STYLE_OVERLAY__FORMAT`    | source format override            |
//!
//! Command-line flags take precedence over these values.

use std::path::PathBuf;

use tracing::debug;

use crate::error::{OverlayError, Result};
use crate::loader::LoadOptions;
use crate::mode::Mode;
use crate::parser::SourceFormat;

/// Default variable prefix
pub const ENV_PREFIX: &str = "STYLE_OVERLAY";

/// Variable naming for overlay settings
#[derive(Debug, Clone)]
pub struct EnvNaming {
    /// Prefix for all variables
    pub prefix: String,
    /// Separator between prefix and key (default: "__")
    pub separator: String,
    /// Whether to uppercase variable names (default: true)
    pub uppercase: bool,
}

impl Default for EnvNaming {
    fn default() -> Self {
        Self::with_prefix(ENV_PREFIX)
    }
}

impl EnvNaming {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: "__".to_string(),
            uppercase: true,
        }
    }

    /// Variable name for a setting key
    pub fn var_name(&self, key: &str) -> String {
        let name = format!("{}{}{}", self.prefix, self.separator, key).replace('-', "_");
        if self.uppercase {
            name.to_uppercase()
        } else {
            name
        }
    }

    /// Setting key for a variable name, if it carries the prefix
    pub fn parse_name(&self, name: &str) -> Option<String> {
        let name = if self.uppercase {
            name.to_uppercase()
        } else {
            name.to_string()
        };
        let prefix = format!("{}{}", self.prefix, self.separator);
        let prefix = if self.uppercase {
            prefix.to_uppercase()
        } else {
            prefix
        };
        name.strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(str::to_lowercase)
    }
}

/// Loader settings gathered from the environment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayConfig {
    pub profile: Option<PathBuf>,
    pub strict: bool,
    pub mode: Option<Mode>,
    pub format: Option<SourceFormat>,
}

impl OverlayConfig {
    /// Read settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Read settings from explicit variables using the default naming
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::from_vars_with(&EnvNaming::default(), vars)
    }

    pub fn from_vars_with<I, K, V>(naming: &EnvNaming, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();
        for (name, value) in vars {
            let key = match naming.parse_name(name.as_ref()) {
                Some(key) => key,
                None => continue,
            };
            let var = name.as_ref();
            let value = value.as_ref().trim();
            match key.as_str() {
                "profile" if !value.is_empty() => config.profile = Some(PathBuf::from(value)),
                "strict" => config.strict = parse_flag(var, value)?,
                "mode" if !value.is_empty() => {
                    let mode = value.parse::<Mode>().map_err(|e| {
                        OverlayError::invalid_input(format!("{}: {}", var, e.reason))
                    })?;
                    config.mode = Some(mode);
                }
                "format" if !value.is_empty() => {
                    let format = value
                        .parse::<SourceFormat>()
                        .map_err(|e| OverlayError::invalid_input(format!("{}: {}", var, e)))?;
                    config.format = Some(format);
                }
                "profile" | "mode" | "format" => {}
                other => debug!(variable = var, key = other, "ignoring unrecognised setting"),
            }
        }
        Ok(config)
    }

    /// Options for [`crate::ProfileLoader`]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            strict: self.strict,
            format: self.format,
        }
    }
}

fn parse_flag(var: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(OverlayError::invalid_input(format!(
            "{}: expected a boolean, got '{}'",
            var, other
        ))),
    }
}
