use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ScanError {
    #[error("invalid UniProt accession: {0}")]
    InvalidAccession(String),

    #[error("failed to read identifier list at {0}")]
    InputRead(PathBuf),

    #[error("failed to write report at {0}: {1}")]
    OutputWrite(PathBuf, String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("UniProt request failed: {0}")]
    UniprotHttp(String),

    #[error("UniProt returned status {status}: {message}")]
    UniprotStatus { status: u16, message: String },

    #[error("efetch request failed: {0}")]
    EntrezHttp(String),

    #[error("efetch returned status {status}: {message}")]
    EntrezStatus { status: u16, message: String },

    #[error("flat record parse failed: {0}")]
    FlatRecord(String),
}
