use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the store and the report generator.
#[derive(Debug, Error)]
pub enum ItineraryError {
    /// The document does not match the itinerary schema.
    #[error("invalid itinerary at `{path}`: {message}")]
    Validation { path: String, message: String },

    /// The input is not a JSON document at all.
    #[error("malformed itinerary JSON: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("failed to access {}: {source}", .path.display())]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no itinerary stored at {}", .0.display())]
    NotFound(PathBuf),

    #[error("{0} is not available in this build")]
    CapabilityUnavailable(&'static str),

    #[cfg(feature = "xlsx")]
    #[error("failed to render workbook: {0}")]
    Render(#[from] rust_xlsxwriter::XlsxError),

    #[error("failed to serialize itinerary: {0}")]
    Serialize(#[source] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ItineraryError>;

impl ItineraryError {
    pub(crate) fn invalid(path: impl Into<String>, message: impl Into<String>) -> Self {
        ItineraryError::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ItineraryError::Persistence {
            path: path.into(),
            source,
        }
    }

    /// Stable machine-readable code, used in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            ItineraryError::Validation { .. } => "VALIDATION_ERROR",
            ItineraryError::Parse(_) => "PARSE_ERROR",
            ItineraryError::Persistence { .. } => "PERSISTENCE_ERROR",
            ItineraryError::NotFound(_) => "NOT_FOUND",
            ItineraryError::CapabilityUnavailable(_) => "CAPABILITY_UNAVAILABLE",
            #[cfg(feature = "xlsx")]
            ItineraryError::Render(_) => "RENDER_ERROR",
            ItineraryError::Serialize(_) => "SERIALIZATION_ERROR",
        }
    }

    /// True when the caller sent a document that cannot be accepted.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ItineraryError::Validation { .. } | ItineraryError::Parse(_)
        )
    }
}
