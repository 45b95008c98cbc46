use std::fmt::{Display, Formatter, Result};

#[derive(Debug)]
pub enum Error {
  ReqwestError(reqwest::Error),
  JsonError(serde_json::Error),
  IoError(std::io::Error),
  InvalidIdentifier(String),
  SubmissionError(String),
  MalformedResponse(String),
  TaskNotFound(String),
  TaskStatusError(String),
  ExportFailed(String),
  ExportTimeout(String),
  Cancelled,
  DownloadError(String),
}

impl std::error::Error for Error {}

impl Display for Error {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result {
    match self {
      Error::ReqwestError(e) => std::fmt::Display::fmt(e, f),
      Error::JsonError(e) => std::fmt::Display::fmt(e, f),
      Error::IoError(e) => std::fmt::Display::fmt(e, f),
      Error::InvalidIdentifier(e) => std::fmt::Display::fmt(e, f),
      Error::SubmissionError(e) => std::fmt::Display::fmt(e, f),
      Error::MalformedResponse(e) => std::fmt::Display::fmt(e, f),
      Error::TaskNotFound(e) => std::fmt::Display::fmt(e, f),
      Error::TaskStatusError(e) => std::fmt::Display::fmt(e, f),
      Error::ExportFailed(e) => std::fmt::Display::fmt(e, f),
      Error::ExportTimeout(e) => std::fmt::Display::fmt(e, f),
      Error::Cancelled => f.write_str("Export was cancelled by the caller."),
      Error::DownloadError(e) => std::fmt::Display::fmt(e, f),
    }
  }
}

impl From<reqwest::Error> for Error {
  fn from(reqwest_error: reqwest::Error) -> Self {
    Error::ReqwestError(reqwest_error)
  }
}

impl From<serde_json::Error> for Error {
  fn from(serde_json_error: serde_json::Error) -> Self {
    Error::JsonError(serde_json_error)
  }
}

impl From<std::io::Error> for Error {
  fn from(io_error: std::io::Error) -> Self {
    Error::IoError(io_error)
  }
}
