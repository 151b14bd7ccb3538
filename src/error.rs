#[derive(thiserror::Error, Debug)]
pub enum KappaError {
    #[error("Invalid Input: {0}")]
    BadInput(String),

    #[error("TwitchChat Error: {0}")]
    TwitchChatError(#[from] twitchchat::runner::Error),

    #[error("I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("Markings: {0}")]
    MarkingsError(#[from] markings::Error),

    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("JSON Error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Platform refused ({status}): {message}")]
    Refused { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, KappaError>;

/// Why a `!setclipcooldown` was refused
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("only the channel owner may change the cooldown")]
    PermissionDenied,

    #[error("not a cooldown in seconds: {0:?}")]
    InvalidArgument(String),
}

/// Why a clip could not be created
#[derive(thiserror::Error, Debug)]
pub enum ClipError {
    #[error("could not resolve broadcaster: {0}")]
    LookupFailed(String),

    #[error("could not create clip: {0}")]
    CreateFailed(String),

    #[error("Markings: {0}")]
    Template(#[from] markings::Error),
}
