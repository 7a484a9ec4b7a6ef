use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TwoFaError {
    #[error("Invalid 2FA code")]
    InvalidCode,
}
