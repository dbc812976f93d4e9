use thiserror::Error;

/// Problems detected while assembling a [`crate::CategoryTaxonomy`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TaxonomyError {
    #[error("taxonomy has no groups")]
    Empty,
    #[error("group `{0}` is declared twice")]
    DuplicateGroup(String),
    #[error("group `{0}` has no labels")]
    EmptyGroup(String),
    #[error("label `{label}` appears in both `{first}` and `{second}`")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },
    #[error("group `{group}` has hue {hue}, expected 0..=360")]
    InvalidHue { group: String, hue: f32 },
    #[error("boost override for unknown label `{0}`")]
    UnknownLabel(String),
    #[error("boost override for `{label}` must be finite and non-negative, got {factor}")]
    InvalidBoost { label: String, factor: f32 },
    #[error("modulator references unknown group `{0}`")]
    UnknownGroup(String),
    #[error("taxonomy exceeds {max} {what}")]
    TooMany { what: &'static str, max: usize },
}

/// Tuning values rejected by [`crate::Profile::validate`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    #[error("{field} must lie in {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be strictly positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field}: lower bound {low} exceeds upper bound {high}")]
    InvertedRange {
        field: &'static str,
        low: f64,
        high: f64,
    },
}
