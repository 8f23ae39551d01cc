use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown taxonomy '{0}' (expected 'finding' or 'asset')")]
    UnknownTaxonomy(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
