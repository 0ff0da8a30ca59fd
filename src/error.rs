//! Failures surfaced by `AirPath`
//!
//! Only [`AirPathError::Validation`] ever leaves route planning. Provider
//! errors (`Api`, `Lookup`) are absorbed by the planner and turned into
//! dropped candidates or neutral readings; `Config` stops the binary at startup.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AirPathError {
    /// Settings that cannot be used as given
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// An upstream service could not be reached or answered with garbage
    #[error("API error: {message}")]
    Api { message: String },

    /// The request itself cannot be planned
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A single air quality, geocoding or directions lookup came back empty
    #[error("Lookup failed: {message}")]
    Lookup { message: String },
}

impl AirPathError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn lookup(message: impl Into<String>) -> Self {
        Self::Lookup {
            message: message.into(),
        }
    }

    /// Sentence suitable for an HTTP body or terminal output
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { .. } => {
                "AirPath is misconfigured. Check the config file and the AIRPATH_* environment."
                    .to_string()
            }
            Self::Api { .. } | Self::Lookup { .. } => {
                "An air quality, geocoding or directions service is unavailable right now."
                    .to_string()
            }
            Self::Validation { message } => format!("Invalid input: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AirPathError::config("missing key"), "misconfigured")]
    #[case(AirPathError::api("502 from upstream"), "unavailable")]
    #[case(AirPathError::lookup("no station nearby"), "unavailable")]
    #[case(AirPathError::validation("destination is required"), "destination is required")]
    fn test_user_message(#[case] error: AirPathError, #[case] expected: &str) {
        assert!(error.user_message().contains(expected));
    }

    #[test]
    fn test_display_keeps_details() {
        let error = AirPathError::lookup("no station within 10 km");
        assert_eq!(error.to_string(), "Lookup failed: no station within 10 km");
        assert!(matches!(
            AirPathError::validation("x"),
            AirPathError::Validation { .. }
        ));
    }
}
