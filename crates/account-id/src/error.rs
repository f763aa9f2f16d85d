use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdCodecError {
    #[error("invalid country code: {0}")]
    InvalidCountry(String),
    #[error("invalid date of birth: {0}")]
    InvalidDob(String),
    #[error("invalid gender")]
    InvalidGender,
    #[error("invalid account type: {0}")]
    InvalidAccountType(String),
    #[error("invalid id format: expected 20 characters across 5 blocks, got {0}")]
    InvalidFormat(String),
    #[error("checksum mismatch")]
    InvalidChecksum,
    #[error("dob block does not decode to a date in range")]
    InvalidDobEncoding,
}
