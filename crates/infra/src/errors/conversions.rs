//! Conversions from external infrastructure errors into domain errors.

use hotelops_domain::HotelOpsError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub HotelOpsError);

impl From<InfraError> for HotelOpsError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<HotelOpsError> for InfraError {
    fn from(value: HotelOpsError) -> Self {
        Self(value)
    }
}

/// Classifies a third-party error into the domain taxonomy
trait IntoHotelOpsError {
    fn into_hotelops(self) -> HotelOpsError;
}

// reqwest::Error → HotelOpsError

impl IntoHotelOpsError for HttpError {
    fn into_hotelops(self) -> HotelOpsError {
        if self.is_timeout() {
            return HotelOpsError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return HotelOpsError::Network("HTTP connection failure".into());
        }

        if self.is_builder() {
            return HotelOpsError::InvalidInput(format!("invalid HTTP request: {self}"));
        }

        HotelOpsError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        Self(value.into_hotelops())
    }
}

// std::io::Error → HotelOpsError

impl IntoHotelOpsError for std::io::Error {
    fn into_hotelops(self) -> HotelOpsError {
        use std::io::ErrorKind;

        match self.kind() {
            ErrorKind::NotFound => HotelOpsError::Storage(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => {
                HotelOpsError::Storage(format!("permission denied: {self}"))
            }
            _ => HotelOpsError::Storage(self.to_string()),
        }
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        Self(value.into_hotelops())
    }
}

// serde_json::Error → HotelOpsError

impl IntoHotelOpsError for serde_json::Error {
    fn into_hotelops(self) -> HotelOpsError {
        if self.is_io() {
            HotelOpsError::Storage(format!("JSON I/O failure: {self}"))
        } else {
            HotelOpsError::InvalidInput(format!("invalid JSON: {self}"))
        }
    }
}

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        Self(value.into_hotelops())
    }
}
