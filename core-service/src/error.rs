use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Resolver error: {0}")]
    Resolver(#[from] core_resolver::ResolverError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
