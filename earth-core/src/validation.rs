//! Ordered validation of imagery form submissions.
//!
//! Rules run in a fixed order and the first failure wins, so a submission
//! with both bad coordinates and a bad area reports the coordinates:
//!
//! 1. every field is present
//! 2. latitude and longitude are real numbers
//! 3. the area is a positive integer
//! 4. the area is one of the supported [`AreaCode`]s

use crate::{
    error::FetchError,
    model::{AreaCode, ImageRequest, ValidatedRequest},
};

type Rule = fn(&ImageRequest) -> Result<(), FetchError>;

/// Rules that only accept or reject; the area rules also produce the
/// [`AreaCode`] and run after these.
const FIELD_RULES: &[Rule] = &[require_all_fields, require_numeric_coordinates];

pub fn validate(request: &ImageRequest) -> Result<ValidatedRequest, FetchError> {
    for rule in FIELD_RULES {
        rule(request)?;
    }

    let value = require_positive_area(request)?;
    let area = require_known_area(value)?;

    Ok(ValidatedRequest {
        api_key: request.api_key.trim().to_string(),
        latitude: request.latitude.trim().to_string(),
        longitude: request.longitude.trim().to_string(),
        date: request.date.trim().to_string(),
        area,
    })
}

// Whitespace counts as present; later rules decide whether it parses.
fn require_all_fields(request: &ImageRequest) -> Result<(), FetchError> {
    let fields = [
        &request.api_key,
        &request.latitude,
        &request.longitude,
        &request.date,
        &request.area,
    ];

    if fields.iter().any(|f| f.is_empty()) {
        return Err(FetchError::MissingFields);
    }
    Ok(())
}

fn require_numeric_coordinates(request: &ImageRequest) -> Result<(), FetchError> {
    let is_real = |s: &str| s.trim().parse::<f64>().is_ok_and(f64::is_finite);

    if is_real(&request.latitude) && is_real(&request.longitude) {
        Ok(())
    } else {
        Err(FetchError::InvalidCoordinates)
    }
}

fn require_positive_area(request: &ImageRequest) -> Result<u64, FetchError> {
    AreaCode::positive_value(&request.area).map_err(FetchError::InvalidArea)
}

fn require_known_area(value: u64) -> Result<AreaCode, FetchError> {
    AreaCode::from_square_km(value).map_err(FetchError::InvalidArea)
}
