use thiserror::Error;

/// Why an image area value was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AreaRejection {
    #[error("Image area must be a positive integer.")]
    NotPositive,
    #[error("Invalid image area selected. Please choose from the provided options.")]
    Unsupported,
}

/// Every way an imagery request can fail.
///
/// The `Display` text is what the user sees in place of the image, so it is
/// written for people rather than logs. Use [`FetchError::kind`] for a
/// stable machine-readable tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Please provide the API key, latitude, longitude, date and image area.")]
    MissingFields,

    #[error("Latitude and Longitude must be valid numbers.")]
    InvalidCoordinates,

    #[error("{0}")]
    InvalidArea(AreaRejection),

    #[error(
        "Imagery API error: {0}. Please check your coordinates and date. \
         Often, no imagery exists for specific points or dates or the API key is invalid."
    )]
    ProviderError(u16),

    #[error(
        "No image found for the specified location and date. Try different coordinates \
         or a date with known imagery (e.g., San Francisco: 37.77, -122.41, 2023-01-15)."
    )]
    NoImageAvailable,

    #[error("Network connection error. Please check your internet connection.")]
    NetworkError,

    #[error("An unexpected error occurred: {0}")]
    UnknownError(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::MissingFields => "missing_fields",
            FetchError::InvalidCoordinates => "invalid_coordinates",
            FetchError::InvalidArea(_) => "invalid_area",
            FetchError::ProviderError(_) => "provider_error",
            FetchError::NoImageAvailable => "no_image_available",
            FetchError::NetworkError => "network_error",
            FetchError::UnknownError(_) => "unknown_error",
        }
    }

    /// True for failures caught before any outbound call was made.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            FetchError::MissingFields | FetchError::InvalidCoordinates | FetchError::InvalidArea(_)
        )
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            FetchError::NetworkError
        } else {
            FetchError::UnknownError(err.to_string())
        }
    }
}
