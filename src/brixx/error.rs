use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cannot set by reference on an immutable record (key \"{key}\")")]
    Immutability { key: String },

    #[error("Cannot assign \"{key}\" on a frozen object")]
    Frozen { key: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Cannot set undefined key \"{key}\" on {type_name}")]
    UndefinedKey { key: String, type_name: String },

    #[error("Cannot freeze a {0} value")]
    NotFreezable(&'static str),

    #[error("\"{0}\" is not a function")]
    NotCallable(String),

    #[error("Settings error: {0}")]
    Settings(#[from] confique::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
