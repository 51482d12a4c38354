//! Natural-language to filter translation
//!
//! A request such as "2020年后的深度学习文献" is sent to a text generation
//! model together with a fixed description of the filterable schema. The
//! model's answer goes through a single boundary:
//!
//! 1. locate the first balanced JSON object in the output ([`extract`])
//! 2. parse it
//! 3. validate the `filter` / `sort` part with [`FilterSpec::from_json`]
//!
//! Any failure aborts the request; nothing is repaired or defaulted.
//!
//! # Examples
//!
//! ```
//! use litgroups::query::Limits;
//! use litgroups::translate::{GenerationError, TextGenerator, Translator};
//!
//! struct Canned;
//!
//! impl TextGenerator for Canned {
//!     fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
//!         Ok(r#"{"filter": {"isFavorite": true}, "suggestedName": "Favs"}"#.into())
//!     }
//! }
//!
//! let translator = Translator::new(Canned, Limits::default(), 500);
//! let translation = translator.translate("my favourite papers").unwrap();
//! assert_eq!(translation.hints.name, "Favs");
//! assert_eq!(translation.spec.source_text.as_deref(), Some("my favourite papers"));
//! ```

pub mod client;
pub mod error;
pub mod extract;
pub mod prompt;

pub use client::ChatClient;
pub use error::{GenerationError, TranslateError};

use crate::groups::types::{
    DEFAULT_COLOR, MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_color, validate_group_name, validate_icon,
};
use crate::query::{FilterSpec, Limits};
use chrono::Local;
use serde::Serialize;
use serde_json::Value;

/// Default display name for translated groups
pub const DEFAULT_NAME: &str = "Custom Group";
/// Default icon for translated groups
pub const DEFAULT_ICON: &str = "search";

/// Text generation capability: prompt in, text out
pub trait TextGenerator {
    /// # Errors
    ///
    /// Returns `GenerationError` on transport, authorization or timeout failures.
    fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

impl<G: TextGenerator + ?Sized> TextGenerator for &G {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

impl<G: TextGenerator + ?Sized> TextGenerator for Box<G> {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        (**self).generate(prompt)
    }
}

/// Display suggestions that accompany a translated filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayHints {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub description: Option<String>,
}

impl Default for DisplayHints {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            icon: DEFAULT_ICON.to_string(),
            color: DEFAULT_COLOR.to_string(),
            description: None,
        }
    }
}

impl DisplayHints {
    /// Read the optional `suggested*` / `description` keys, keeping defaults
    /// for anything missing or unusable
    fn from_answer(answer: &Value) -> Self {
        let text = |key: &str| {
            answer
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        };
        let mut hints = Self::default();
        if let Some(name) = text("suggestedName") {
            let name: String = name.chars().take(MAX_NAME_LEN).collect();
            if validate_group_name(&name).is_ok() {
                hints.name = name.trim().to_string();
            }
        }
        if let Some(icon) = text("suggestedIcon").filter(|i| validate_icon(i).is_ok()) {
            hints.icon = icon.to_string();
        }
        if let Some(color) = text("suggestedColor").filter(|c| validate_color(c).is_ok()) {
            hints.color = color.to_lowercase();
        }
        hints.description = text("description").map(|d| d.chars().take(MAX_DESCRIPTION_LEN).collect());
        hints
    }
}

/// A validated translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Validated specification with the request text attached
    pub spec: FilterSpec,
    pub hints: DisplayHints,
}

/// Turns free text into validated filter specifications
pub struct Translator<G> {
    generator: G,
    limits: Limits,
    max_input_chars: usize,
}

impl<G: TextGenerator> Translator<G> {
    #[must_use]
    pub const fn new(generator: G, limits: Limits, max_input_chars: usize) -> Self {
        Self {
            generator,
            limits,
            max_input_chars,
        }
    }

    /// Translate one request with exactly one generation call
    ///
    /// # Errors
    ///
    /// - `TranslateError::EmptyInput` / `TooLong` before any call is made
    /// - `TranslateError::Upstream` if the model cannot be reached
    /// - `TranslateError::Parse` if the answer holds no JSON object
    /// - `TranslateError::Validation` if the object is not an acceptable filter
    pub fn translate(&self, text: &str) -> Result<Translation, TranslateError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        let len = text.chars().count();
        if len > self.max_input_chars {
            return Err(TranslateError::TooLong {
                len,
                max: self.max_input_chars,
            });
        }

        let prompt = prompt::build(text, Local::now().date_naive());
        let output = self.generator.generate(&prompt)?;
        tracing::debug!(chars = output.len(), "received translation output");

        let span = extract::first_object(&output)
            .ok_or_else(|| TranslateError::Parse("the answer did not contain a JSON object".into()))?;
        let answer: Value = serde_json::from_str(span)
            .map_err(|e| TranslateError::Parse(format!("the answer is not valid JSON ({e})")))?;

        let spec = FilterSpec::from_json(&answer, &self.limits).map_err(|e| {
            tracing::debug!(error = %e, "translated filter rejected");
            TranslateError::Validation(e)
        })?;

        Ok(Translation {
            spec: spec.with_source_text(text),
            hints: DisplayHints::from_answer(&answer),
        })
    }
}
