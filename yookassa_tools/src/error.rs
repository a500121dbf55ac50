use thiserror::Error;

#[derive(Debug, Error)]
pub enum YooKassaApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Could not reach YooKassa: {0}")]
    RequestError(String),
    #[error("YooKassa did not respond in time")]
    Timeout,
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Payment request failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Unexpected confirmation type: {0}")]
    UnexpectedConfirmation(String),
}

impl From<reqwest::Error> for YooKassaApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            YooKassaApiError::Timeout
        } else {
            YooKassaApiError::RequestError(e.to_string())
        }
    }
}
