use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a page from being rendered.
#[derive(Debug, Error)]
pub enum PepFragError {
    #[error("Error parsing peptide sequence: {0}")]
    Parse(String),

    #[error("Peptide sequence cannot contain charge state!")]
    ChargeState,

    #[error("Peptide length cannot exceed {max} amino acids")]
    TooLong { max: usize },

    #[error("Peptide sequence cannot contain adduct!")]
    Adducts,

    #[error("Sequence cannot contain ambiguity!")]
    Ambiguity,

    #[error("Peptide sequence cannot be empty")]
    Empty,

    #[error("Error calculating peptide mass: {0}")]
    Mass(String),

    /// Not an error in the input, the requested ions simply do not exist.
    #[error("No fragments found. Please check your input and try again.")]
    NoFragments,

    #[error("Invalid value {value:?} for parameter '{key}': {reason}")]
    Parameter {
        key: String,
        value: String,
        reason: String,
    },

    #[error("Invalid url {url:?}: {reason}")]
    Url { url: String, reason: String },

    #[error("Could not read configuration file {path:?}: {reason}")]
    Config { path: PathBuf, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl PepFragError {
    pub fn parameter(key: &str, value: &str, reason: impl Into<String>) -> Self {
        Self::Parameter {
            key: key.to_owned(),
            value: value.to_owned(),
            reason: reason.into(),
        }
    }

    /// Warnings halt the render just like errors but are reported less loudly.
    pub const fn is_warning(&self) -> bool {
        matches!(self, Self::NoFragments)
    }
}
