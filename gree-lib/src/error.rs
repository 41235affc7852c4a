use std::io;
use std::path::PathBuf;
use strum_macros::Display;
use thiserror::Error;

/// Everything a device exchange can fail with; [`GreeError::kind`] sorts
/// each variant into retry-or-report buckets.
#[derive(Error, Debug)]
pub enum GreeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Timeout waiting for device reply: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Could not resolve device address {0}")]
    AddressResolution(String),

    #[error("Invalid base64 in `{field}`: {source}")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decrypted payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("Ciphertext length {0} is not a multiple of the AES block size")]
    UnalignedCiphertext(usize),

    #[error("Reply is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Reply field `{field}` has unexpected type, expected {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("Status reply has {actual} values for {expected} requested properties")]
    StatusLengthMismatch { expected: usize, actual: usize },

    #[error("Device key must be 16 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("GCM tag must be 16 bytes, got {0}")]
    InvalidTagLength(usize),

    #[error("GCM authentication failed: reply tag does not verify")]
    Authentication,

    #[error("Client is not bound to the device (no key material)")]
    NotBound,

    #[error("Command has {names} property names but {values} values")]
    CommandLengthMismatch { names: usize, values: usize },

    #[error("Unsupported encryption version {0}")]
    UnsupportedVersion(u8),

    #[error("Unsupported command value: {0}")]
    UnsupportedValue(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Coarse classification of [`GreeError`], used by callers to decide
/// between retrying and reporting a configuration problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ErrorKind {
    Transport,
    Decode,
    Authentication,
    State,
    UnsupportedVersion,
    UnsupportedValue,
}

impl ErrorKind {
    /// Whether the failure looks like an unreachable or misbehaving device
    /// rather than a misconfiguration.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Transport | ErrorKind::Decode)
    }
}

impl GreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GreeError::Io(_) | GreeError::Timeout(_) | GreeError::AddressResolution(_) => ErrorKind::Transport,
            GreeError::Base64 { .. }
            | GreeError::Json(_)
            | GreeError::InvalidUtf8
            | GreeError::UnalignedCiphertext(_)
            | GreeError::MissingField(_)
            | GreeError::InvalidField { .. }
            | GreeError::StatusLengthMismatch { .. }
            | GreeError::InvalidTagLength(_) => ErrorKind::Decode,
            GreeError::Authentication => ErrorKind::Authentication,
            GreeError::NotBound
            | GreeError::CommandLengthMismatch { .. }
            | GreeError::InvalidKeyLength(_)
            | GreeError::ConfigRead { .. }
            | GreeError::InvalidConfig(_) => ErrorKind::State,
            GreeError::UnsupportedVersion(_) => ErrorKind::UnsupportedVersion,
            GreeError::UnsupportedValue(_) => ErrorKind::UnsupportedValue,
        }
    }

    pub(crate) fn base64(field: &'static str) -> impl FnOnce(base64::DecodeError) -> Self {
        move |source| GreeError::Base64 { field, source }
    }
}

pub type Result<T> = std::result::Result<T, GreeError>;
