#![allow(non_shorthand_field_patterns)]
#![doc = "Error handling primitives shared across the citation assembler."]
// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! The derive emitted by [`masterror::Error`] expands pattern matches that
//! trigger the `non_shorthand_field_patterns` lint. The lint is disabled for
//! the module to keep the generated implementations warning-free while still
//! exposing a thoroughly documented error surface for library consumers.

use std::path::{Path, PathBuf};

/// Unified error type returned by the citation assembler and CLI.
///
/// Each variant captures sufficient context for diagnostics while avoiding
/// accidental exposure of sensitive data. Existence-check failures surface as
/// [`Error::UserNotFound`] so callers can distinguish "user does not exist"
/// from "user exists but no identifier was found"; upstream enrichment
/// failures never reach this type and degrade to empty data instead.
#[derive(Debug, masterror::Error)]
pub enum Error {
    /// Wraps I/O errors that occur while writing the citation file.
    #[error("failed to write citation file at {path:?}: {source}")]
    Io {
        /// Location of the citation file being produced.
        path:   PathBuf,
        /// Underlying I/O error reported by the operating system.
        source: std::io::Error
    },
    /// Wraps YAML encoding errors when serializing the citation document.
    #[error("failed to serialize citation document: {source}")]
    Serialize {
        /// Underlying serialization error from serde_yaml.
        source: serde_yaml::Error
    },
    /// Wraps JSON decoding errors from upstream API payloads.
    #[error("failed to decode API payload: {source}")]
    Json {
        /// Source decoding error from serde_json.
        source: serde_json::Error
    },
    /// Returned when inputs or fetched data violate invariants.
    #[error("invalid input: {message}")]
    Validation {
        /// Human readable message describing the validation problem.
        message: String
    },
    /// Service errors when interacting with external APIs.
    #[error("service error: {message}")]
    Service {
        /// Human readable message describing the service error.
        message: String
    },
    /// Returned when a profile existence check fails.
    ///
    /// This is the fail-fast half of the platform client contract: profile
    /// lookups propagate, enrichment lookups degrade to empty data.
    #[error("GitHub user {username} does not exist")]
    UserNotFound {
        /// Login that failed the existence check.
        username: String
    }
}

impl Error {
    /// Constructs a validation error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the validation failure.
    pub fn validation<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Validation {
            message: message.into()
        }
    }

    /// Constructs a service error from the provided displayable value.
    ///
    /// # Parameters
    ///
    /// * `message` - Human-readable description of the service error.
    pub fn service<M>(message: M) -> Self
    where
        M: Into<String>
    {
        Self::Service {
            message: message.into()
        }
    }

    /// Constructs a [`Error::UserNotFound`] for the given login.
    ///
    /// # Parameters
    ///
    /// * `username` - Login that failed the existence check.
    pub fn user_not_found<U>(username: U) -> Self
    where
        U: Into<String>
    {
        Self::UserNotFound {
            username: username.into()
        }
    }

    /// Formats the error for diagnostics without the variant name.
    ///
    /// This method is primarily intended for CLI contexts where the variant
    /// name does not add value to end users. The returned string matches the
    /// [`std::fmt::Display`] implementation.
    pub fn to_display_string(&self) -> String {
        format!("{self}")
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Serialize {
            source
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json {
            source
        }
    }
}

impl From<masterror::AppError> for Error {
    fn from(error: masterror::AppError) -> Self {
        Self::Service {
            message: error.to_string()
        }
    }
}

/// Creates an [`Error::Io`] variant capturing the failing path and source.
///
/// # Parameters
///
/// * `path` - Location of the citation file that triggered the error.
/// * `source` - I/O error reported by the operating system.
pub fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn validation_constructor_populates_message() {
        let error = Error::validation("something went wrong");
        match error {
            Error::Validation {
                ref message
            } => {
                assert_eq!(message, "something went wrong");
            }
            other => panic!("expected validation error, got {other:?}")
        }
    }

    #[test]
    fn user_not_found_constructor_populates_username() {
        let error = Error::user_not_found("ghost");
        match error {
            Error::UserNotFound {
                ref username
            } => {
                assert_eq!(username, "ghost");
            }
            other => panic!("expected user-not-found error, got {other:?}")
        }
    }

    #[test]
    fn user_not_found_display_names_the_login() {
        let error = Error::user_not_found("ghost");
        assert_eq!(error.to_string(), "GitHub user ghost does not exist");
    }

    #[test]
    fn to_display_string_matches_display() {
        let error = Error::validation("display me");
        assert_eq!(error.to_string(), error.to_display_string());
    }

    #[test]
    fn io_error_helper_wraps_path_and_source() {
        let path = std::path::Path::new("/tmp/CITATION.cff");
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = super::io_error(path, io_error);

        match error {
            Error::Io {
                path: ref stored_path,
                ref source
            } => {
                assert_eq!(stored_path, path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected io error, got {other:?}")
        }
    }

    #[test]
    fn serde_yaml_conversion_maps_to_serialize_variant() {
        let error = serde_yaml::from_str::<usize>("not-a-number").unwrap_err();
        let mapped: Error = error.into();
        assert!(matches!(mapped, Error::Serialize { .. }));
    }

    #[test]
    fn serde_json_conversion_maps_to_json_variant() {
        let invalid = serde_json::from_str::<serde_json::Value>("not-json").unwrap_err();
        let mapped: Error = invalid.into();
        assert!(matches!(mapped, Error::Json { .. }));
    }

    #[test]
    fn app_error_conversion_maps_to_service_variant() {
        let app_error = masterror::AppError::service("upstream exploded");
        let mapped: Error = app_error.into();
        assert!(matches!(mapped, Error::Service { .. }));
    }
}
