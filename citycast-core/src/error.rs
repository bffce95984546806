//! Lookup error types.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("city name required")]
    EmptyInput,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl LookupError {
    /// Short message suitable for showing to the person who typed the query.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyInput => "Please enter a city name".to_string(),
            Self::CityNotFound(_) => "City not found".to_string(),
            Self::NetworkError(msg) => msg.clone(),
            Self::MalformedResponse(_) => "Failed to fetch weather".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_message() {
        assert_eq!(LookupError::EmptyInput.to_string(), "city name required");
        assert!(LookupError::EmptyInput.user_message().contains("city name"));
    }

    #[test]
    fn network_error_keeps_transport_message() {
        let err = LookupError::NetworkError("connection refused".into());
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.user_message(), "connection refused");
    }

    #[test]
    fn city_not_found_names_the_query() {
        let err = LookupError::CityNotFound("Zzzznotacity".into());
        assert!(err.to_string().contains("Zzzznotacity"));
        assert_eq!(err.user_message(), "City not found");
    }
}
