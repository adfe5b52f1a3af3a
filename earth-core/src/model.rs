use chrono::{DateTime, Utc};
use std::{fmt, num::IntErrorKind, path::PathBuf};

use crate::error::AreaRejection;

/// A form submission exactly as it arrived, before any validation.
#[derive(Clone, Default)]
pub struct ImageRequest {
    pub api_key: String,
    pub latitude: String,
    pub longitude: String,
    pub date: String,
    pub area: String,
}

// Keeps the provider key out of logs.
impl fmt::Debug for ImageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRequest")
            .field("api_key", &"<redacted>")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("date", &self.date)
            .field("area", &self.area)
            .finish()
    }
}

/// Supported image areas, in square kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaCode {
    Km1,
    Km25,
    Km100,
    Km400,
    Km2500,
    Km10000,
}

impl AreaCode {
    pub const fn all() -> &'static [AreaCode] {
        &[
            AreaCode::Km1,
            AreaCode::Km25,
            AreaCode::Km100,
            AreaCode::Km400,
            AreaCode::Km2500,
            AreaCode::Km10000,
        ]
    }

    pub fn square_km(&self) -> u32 {
        match self {
            AreaCode::Km1 => 1,
            AreaCode::Km25 => 25,
            AreaCode::Km100 => 100,
            AreaCode::Km400 => 400,
            AreaCode::Km2500 => 2500,
            AreaCode::Km10000 => 10000,
        }
    }

    /// Width and height of the requested tile, in degrees.
    pub fn resolution(&self) -> f64 {
        match self {
            AreaCode::Km1 => 0.009,
            AreaCode::Km25 => 0.045,
            AreaCode::Km100 => 0.090,
            AreaCode::Km400 => 0.180,
            AreaCode::Km2500 => 0.450,
            AreaCode::Km10000 => 0.901,
        }
    }

    /// Side length label for form options, e.g. "10 km x 10 km".
    pub fn label(&self) -> &'static str {
        match self {
            AreaCode::Km1 => "1 km x 1 km",
            AreaCode::Km25 => "5 km x 5 km",
            AreaCode::Km100 => "10 km x 10 km",
            AreaCode::Km400 => "20 km x 20 km",
            AreaCode::Km2500 => "50 km x 50 km",
            AreaCode::Km10000 => "100 km x 100 km",
        }
    }

    /// Parse a raw form value: an integer that is positive and in the table.
    pub fn parse(raw: &str) -> Result<AreaCode, AreaRejection> {
        AreaCode::from_square_km(AreaCode::positive_value(raw)?)
    }

    /// Read the area as a positive integer. Anything that is not an integer
    /// is unsupported; zero and negatives are reported separately.
    ///
    /// Integers too large for `i64` keep their sign: huge negatives are not
    /// positive, huge positives fall through to the table lookup.
    pub fn positive_value(raw: &str) -> Result<u64, AreaRejection> {
        match raw.trim().parse::<i64>() {
            Ok(v) if v > 0 => Ok(v.unsigned_abs()),
            Ok(_) => Err(AreaRejection::NotPositive),
            Err(e) => match e.kind() {
                IntErrorKind::PosOverflow => Ok(u64::MAX),
                IntErrorKind::NegOverflow => Err(AreaRejection::NotPositive),
                _ => Err(AreaRejection::Unsupported),
            },
        }
    }

    pub fn from_square_km(value: u64) -> Result<AreaCode, AreaRejection> {
        u32::try_from(value)
            .ok()
            .and_then(|v| AreaCode::try_from(v).ok())
            .ok_or(AreaRejection::Unsupported)
    }
}

impl TryFrom<u32> for AreaCode {
    type Error = AreaRejection;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        AreaCode::all()
            .iter()
            .copied()
            .find(|code| code.square_km() == value)
            .ok_or(AreaRejection::Unsupported)
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.square_km())
    }
}

/// A request whose every field passed validation.
///
/// Coordinates and date are passed on as the trimmed strings the user typed,
/// not as reformatted numbers.
#[derive(Clone)]
pub struct ValidatedRequest {
    pub api_key: String,
    pub latitude: String,
    pub longitude: String,
    pub date: String,
    pub area: AreaCode,
}

impl ValidatedRequest {
    pub fn resolution(&self) -> f64 {
        self.area.resolution()
    }
}

impl fmt::Debug for ValidatedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedRequest")
            .field("api_key", &"<redacted>")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .field("date", &self.date)
            .field("area", &self.area)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    /// Pick a format from a `Content-Type` value. JPEG wins ties and is the
    /// fallback for anything unrecognised or missing.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        let lower = content_type.unwrap_or_default().to_ascii_lowercase();
        if lower.contains("jpeg") || lower.contains("jpg") {
            ImageFormat::Jpeg
        } else if lower.contains("png") {
            ImageFormat::Png
        } else {
            ImageFormat::Jpeg
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Png => "png",
        }
    }
}

/// An image written to the static asset directory.
#[derive(Debug, Clone)]
pub struct StoredImage {
    pub file_name: String,
    pub path: PathBuf,
    /// URL path the web layer serves the file from, e.g. `/static/earth_image_….png`.
    pub public_url: String,
    pub format: ImageFormat,
    pub size_bytes: usize,
    /// Acquisition date reported by the provider, if any.
    pub captured_at: Option<String>,
    pub stored_at: DateTime<Utc>,
}
