use medex_common::chat::ChatClientError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("category configuration error: {0}")]
    Categories(#[from] medex_core::ConfigError),

    #[error("chat client error: {0}")]
    ChatClient(#[from] ChatClientError),
}
