use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("push service returned status {0}")]
    Status(reqwest::StatusCode),
}
