//! GPS block decoding.

use exif::{Exif, In, Tag, Value};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decimal places kept for coordinates (about 1 m at the equator)
const COORDINATE_PRECISION: f64 = 100_000.0;

/// A rounded latitude/longitude pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// Build a location, rounding both components to 5 decimals.
    ///
    /// Returns `None` when either component is zero or not finite: a zero
    /// reading is what cameras write when they had no fix.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let usable = |v: f64| v.is_finite() && v != 0.0;
        if !usable(latitude) || !usable(longitude) {
            return None;
        }
        Some(Self {
            latitude: round_coordinate(latitude),
            longitude: round_coordinate(longitude),
        })
    }
}

/// `lat_lon` in shortest decimal form, e.g. `51.50735_-0.12776`
impl fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.latitude, self.longitude)
    }
}

/// Adding `0.0` turns a `-0.0` from rounding a tiny negative into `0.0`
fn round_coordinate(value: f64) -> f64 {
    (value * COORDINATE_PRECISION).round() / COORDINATE_PRECISION + 0.0
}

/// Degrees/minutes/seconds to decimal degrees
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag, negative_ref: u8) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let Value::Rational(ref dms) = field.value else {
        return None;
    };
    if dms.len() < 3 {
        return None;
    }
    let magnitude = dms_to_decimal(dms[0].to_f64(), dms[1].to_f64(), dms[2].to_f64());

    let negative = exif
        .get_field(ref_tag, In::PRIMARY)
        .and_then(|f| match f.value {
            Value::Ascii(ref v) => v.first().and_then(|s| s.first()).copied(),
            _ => None,
        })
        .map(|c| c.to_ascii_uppercase() == negative_ref)
        .unwrap_or(false);

    Some(if negative { -magnitude } else { magnitude })
}

/// Location from the GPS IFD, if both coordinates are present and usable
pub fn location_from_exif(exif: &Exif) -> Option<GeoLocation> {
    let latitude = coordinate(exif, Tag::GPSLatitude, Tag::GPSLatitudeRef, b'S')?;
    let longitude = coordinate(exif, Tag::GPSLongitude, Tag::GPSLongitudeRef, b'W')?;
    GeoLocation::new(latitude, longitude)
}
