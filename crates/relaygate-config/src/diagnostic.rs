// SPDX-FileCopyrightText: 2026 Relaygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration error diagnostics.
//!
//! Figment reports load failures as a flat error chain. [`Diagnoser`] turns
//! each into a miette diagnostic, attaching the offending TOML span when the
//! error came from a file that was actually read, and a fuzzy "did you mean"
//! suggestion for misspelled keys. Inline string loads carry no file, so
//! those diagnostics render without a span.

use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Minimum Jaro-Winkler similarity before a key suggestion is offered.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A configuration error ready for miette rendering.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// Unrecognized key, rejected by strict deserialization.
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(code(relaygate::config::unknown_key), help("{help}"))]
    UnknownKey {
        key: String,
        /// Suggestion plus the valid key listing, precomputed at conversion.
        help: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A known key carrying the wrong TOML type.
    #[error("`{key}`: expected {expected}, found {found}")]
    #[diagnostic(code(relaygate::config::invalid_type))]
    InvalidType {
        key: String,
        expected: String,
        found: String,
    },

    /// A semantic constraint violated after deserialization.
    #[error("{message}")]
    #[diagnostic(code(relaygate::config::validation))]
    Validation { message: String },

    /// Any figment error without a dedicated variant.
    #[error("{0}")]
    #[diagnostic(code(relaygate::config::other))]
    Other(String),
}

/// Converts figment errors into [`ConfigError`] diagnostics, resolving
/// source spans against the TOML files that were read for this load.
pub struct Diagnoser<'a> {
    /// (path, contents) pairs, as recorded by the loader.
    sources: &'a [(String, String)],
}

impl<'a> Diagnoser<'a> {
    pub fn new(sources: &'a [(String, String)]) -> Self {
        Self { sources }
    }

    /// Convert every error in the chain.
    pub fn diagnose(&self, err: figment::Error) -> Vec<ConfigError> {
        err.into_iter().map(|e| self.convert(e)).collect()
    }

    fn convert(&self, error: figment::Error) -> ConfigError {
        use figment::error::Kind;

        match &error.kind {
            Kind::UnknownField(field, valid) => {
                let listing = valid.join(", ");
                let help = match suggest_key(field, valid) {
                    Some(best) => format!("did you mean `{best}`? valid keys are {listing}"),
                    None => format!("valid keys are {listing}"),
                };
                let (span, src) = self.locate(&error, field);
                ConfigError::UnknownKey {
                    key: field.clone(),
                    help,
                    span,
                    src,
                }
            }
            Kind::InvalidType(found, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                expected: expected.clone(),
                found: found.to_string(),
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }

    /// Span and source for `field`, when the error originated from a file
    /// whose contents the loader recorded.
    fn locate(
        &self,
        error: &figment::Error,
        field: &str,
    ) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
        let file = error
            .metadata
            .as_ref()
            .and_then(|m| m.source.as_ref())
            .and_then(|s| match s {
                figment::Source::File(path) => Some(path.display().to_string()),
                _ => None,
            });
        let Some(file) = file else {
            return (None, None);
        };
        let Some((name, text)) = self.sources.iter().find(|(name, _)| *name == file) else {
            return (None, None);
        };

        let section = error.path.first().map(String::as_str);
        match key_span(text, section, field) {
            Some(span) => (Some(span), Some(NamedSource::new(name, text.clone()))),
            None => (None, None),
        }
    }
}

/// Byte span of the assignment to `field` inside `section` (`None` means
/// top level). Tracks table headers line by line, so a key name that also
/// appears under another table is not misattributed.
fn key_span(text: &str, section: Option<&str>, field: &str) -> Option<SourceSpan> {
    let mut offset = 0usize;
    let mut table: Option<&str> = None;

    for line in text.lines() {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            table = header.split(']').next();
        } else if table == section {
            if let Some(rest) = trimmed.strip_prefix(field) {
                if rest.trim_start().starts_with('=') {
                    let indent = line.len() - trimmed.len();
                    return Some(SourceSpan::new((offset + indent).into(), field.len()));
                }
            }
        }
        offset += line.len() + 1;
    }

    None
}

/// The closest valid key by Jaro-Winkler similarity, if any scores above
/// the suggestion threshold. 0.75 catches `api_kye` and `defalt_model`
/// while staying quiet for keys that resemble nothing.
pub fn suggest_key(unknown: &str, valid: &[&str]) -> Option<String> {
    valid
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Render diagnostics to stderr with the graphical handler, followed by a
/// one-line error count.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    let mut out = String::new();
    for error in errors {
        if handler.render_report(&mut out, error).is_err() {
            out.push_str(&format!("error: {error}\n"));
        }
    }
    eprint!("{out}");
    eprintln!(
        "relaygate: {} configuration error{}",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
}
