use thiserror::Error;

pub type Result<T> = std::result::Result<T, SearchError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Unknown locale '{0}' (expected 'vi' or 'en')")]
    UnknownLocale(String),
}
