/// Errors raised while building a category configuration.
///
/// Extraction itself never fails; every variant here is a startup condition that must be
/// fixed before any document is served.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no categories configured")]
    NoCategories,

    #[error("category name must not be empty")]
    EmptyName,

    #[error("category name '{0}' is reserved for a fixed result field")]
    ReservedName(String),

    #[error("duplicate category: {0}")]
    DuplicateCategory(String),

    #[error("category {category}: keyword '{keyword}' must be non-empty lowercase text")]
    InvalidKeyword { category: String, keyword: String },

    #[error("category {category}: duplicate keyword '{keyword}'")]
    DuplicateKeyword { category: String, keyword: String },

    #[error("category {category}: weight must be a positive number, got {weight}")]
    InvalidWeight { category: String, weight: f64 },

    #[error("category {0}: limit must be at least 1")]
    InvalidLimit(String),

    #[error("invalid option {name}: {message}")]
    InvalidOption { name: &'static str, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
