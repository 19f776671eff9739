//! Loading profiles from text and files

use std::path::Path;

use tracing::{debug, info};

use crate::config::OverlayConfig;
use crate::error::{OverlayError, Result};
use crate::parser::{parse_source, ProfileDraft, SourceFormat};
use crate::profile::StyleProfile;
use crate::validation::{SchemaValidator, ValidationOptions, ValidationReport};

/// How the loader reads and validates
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadOptions {
    /// Reject unknown fields
    pub strict: bool,
    /// Force a source format instead of detecting it from the file extension
    pub format: Option<SourceFormat>,
}

/// Parses and validates profiles in one step
#[derive(Debug, Clone, Default)]
pub struct ProfileLoader {
    options: LoadOptions,
    validator: SchemaValidator,
}

impl ProfileLoader {
    pub fn new(options: LoadOptions) -> Self {
        Self {
            options,
            validator: SchemaValidator::new(ValidationOptions {
                strict: options.strict,
            }),
        }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.load_options())
    }

    pub fn options(&self) -> LoadOptions {
        self.options
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    /// Parse text without validating it
    pub fn parse_str(&self, text: &str) -> Result<ProfileDraft> {
        let format = self.options.format.unwrap_or_default();
        Ok(parse_source(text, format)?)
    }

    /// Parse and validate text
    pub fn load_str(&self, text: &str) -> Result<StyleProfile> {
        let draft = self.parse_str(text)?;
        Ok(self.validator.validate(&draft)?)
    }

    /// Read and parse a file without validating it
    pub fn read_draft(&self, path: &Path) -> Result<ProfileDraft> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            OverlayError::file_error(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let format = self
            .options
            .format
            .unwrap_or_else(|| SourceFormat::from_path(path));
        debug!(path = %path.display(), ?format, bytes = text.len(), "read profile source");
        Ok(parse_source(&text, format)?)
    }

    /// Read, parse and validate a file
    pub fn load_file(&self, path: &Path) -> Result<StyleProfile> {
        let draft = self.read_draft(path)?;
        let profile = self.validator.validate(&draft)?;
        info!(path = %path.display(), profile = profile.id(), "loaded style profile");
        Ok(profile)
    }

    /// Read and parse a file, then report every validation finding
    pub fn audit_file(&self, path: &Path) -> Result<ValidationReport> {
        let draft = self.read_draft(path)?;
        Ok(self.validator.audit(&draft))
    }
}
