//! Style Overlay Core
//!
//! Loads "cognitive style overlay" profiles: small structured documents that
//! carry tone, vocabulary and formatting preferences for a downstream
//! response renderer. A profile is configuration data only; nothing here
//! generates or interprets content.
//!
//! ## Architecture
//!
//! 1. **Parser** (`parser`, `document`): structured text → [`ProfileDraft`].
//!    Malformed structure is a [`ParseError`] carrying the offending line.
//!
//! 2. **Validation** (`validation`): [`ProfileDraft`] → immutable
//!    [`StyleProfile`]. Invalid fields are a [`ValidationError`] naming the
//!    field. `audit` collects every finding instead of stopping at the first.
//!
//! 3. **Formatter bias** (`bias`): a read-only [`FormatterBias`] view a
//!    renderer consults for output shapes, cadence, signals and heat.
//!
//! 4. **Modes** (`mode`): the closed ORACLE / OPERATOR / SURGEON set and the
//!    [`ModeSwitch`] selector.
//!
//! ## Example
//!
//! ```rust
//! use style_overlay_core::{load_profile, Mode, ModeSwitch, OutputShape};
//!
//! let profile = load_profile(
//!     "id: demo\n\
//!      core_style:\n\
//!      \x20 - output_preference: table | no-fluff\n\
//!      \x20 - mode_switch: [OPERATOR⚙️, SURGEON🔪]\n\
//!      heat_dial: 4\n",
//! )
//! .unwrap();
//!
//! let bias = profile.formatter_bias();
//! assert_eq!(bias.preferred_shape(), Some(OutputShape::Table));
//! assert!(!bias.allows_fluff());
//! assert_eq!(bias.heat_level(), 4);
//!
//! let switch = ModeSwitch::select(&profile, Mode::Surgeon).unwrap();
//! assert_eq!(switch.mode(), Mode::Surgeon);
//! ```

pub mod bias;
pub mod config;
pub mod document;
pub mod error;
pub mod loader;
pub mod mode;
pub mod parser;
pub mod profile;
pub mod validation;

pub use bias::{FormatterBias, Intensity, Urgency};
pub use config::{EnvNaming, OverlayConfig};
pub use document::Node;
pub use error::{OverlayError, ParseError, Result, ValidationError};
pub use loader::{LoadOptions, ProfileLoader};
pub use mode::{Mode, ModeSwitch};
pub use parser::{parse_profile, parse_source, ProfileDraft, SourceFormat};
pub use profile::{
    Cadence, CognitiveDriver, DialRange, FormattingSignal, HeatDial, LexiconBias, OutputShape,
    PolarityPair, SignalKind, StyleProfile,
};
pub use validation::{
    SchemaValidator, ValidationFinding, ValidationOptions, ValidationReport, ValidationSeverity,
};

/// Parse and validate overlay text with default options
pub fn load_profile(text: &str) -> Result<StyleProfile> {
    ProfileLoader::default().load_str(text)
}
