//! Core value types for field sensor readings.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::ParseError;

/// Number of fields in one serialized record line.
pub const RECORD_FIELDS: usize = 5;

/// A geographic position fix in signed decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GeoFix {
    /// Latitude in degrees, positive north.
    pub latitude: f64,
    /// Longitude in degrees, positive east.
    pub longitude: f64,
}

impl GeoFix {
    /// Create a fix from latitude and longitude in degrees.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

/// One logged sensor reading.
///
/// A `Sample` is only constructed after both characteristic reads and the
/// position fix have succeeded; partially-read data never becomes a sample.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    /// Instant the reading was taken, UTC.
    pub timestamp: OffsetDateTime,
    /// Latitude of the logging host in degrees.
    pub latitude: f64,
    /// Longitude of the logging host in degrees.
    pub longitude: f64,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
}

impl Sample {
    /// Assemble a sample from a timestamp, position fix, and decoded values.
    pub fn new(timestamp: OffsetDateTime, fix: GeoFix, temperature: f64, humidity: f64) -> Self {
        Self {
            timestamp,
            latitude: fix.latitude,
            longitude: fix.longitude,
            temperature,
            humidity,
        }
    }

    /// Serialize the sample to one newline-terminated record line.
    ///
    /// Fields are double-quoted and comma-separated in the fixed order
    /// `timestamp,latitude,longitude,temperature,humidity`. Embedded double
    /// quotes are doubled per RFC 4180; for the timestamps and decimal
    /// numbers actually produced this is byte-identical to unescaped output.
    pub fn to_csv_line(&self) -> String {
        let timestamp = self
            .timestamp
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.timestamp.unix_timestamp().to_string());

        let mut line = String::new();
        for (index, field) in [
            timestamp,
            self.latitude.to_string(),
            self.longitude.to_string(),
            self.temperature.to_string(),
            self.humidity.to_string(),
        ]
        .iter()
        .enumerate()
        {
            if index > 0 {
                line.push(',');
            }
            quote_field(&mut line, field);
        }
        line.push('\n');
        line
    }

    /// Parse a record line previously produced by [`to_csv_line`](Self::to_csv_line).
    ///
    /// The trailing newline is optional.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] when the line has the wrong field count,
    /// unquoted fields, or fields that fail to parse as a timestamp or number.
    pub fn from_csv_line(line: &str) -> Result<Self, ParseError> {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let fields = split_quoted(line)?;
        if fields.len() != RECORD_FIELDS {
            return Err(ParseError::FieldCount {
                expected: RECORD_FIELDS,
                actual: fields.len(),
            });
        }

        let timestamp = OffsetDateTime::parse(&fields[0], &Rfc3339)
            .map_err(|_| ParseError::InvalidTimestamp(fields[0].clone()))?;

        Ok(Self {
            timestamp,
            latitude: parse_number(&fields[1])?,
            longitude: parse_number(&fields[2])?,
            temperature: parse_number(&fields[3])?,
            humidity: parse_number(&fields[4])?,
        })
    }
}

/// Decode a characteristic payload into a measurement value.
///
/// The sensor firmware transmits each value as base64-encoded UTF-8 text
/// (e.g. `"MjUuNQ=="` for `25.5`). The payload is base64-decoded,
/// interpreted as UTF-8, and parsed as a finite floating-point number.
/// `NaN` and infinities are rejected, never mapped to zero.
///
/// # Errors
///
/// Returns a [`ParseError`] naming the failing stage: encoding, text
/// interpretation, or number parsing.
pub fn decode_measurement(payload: &[u8]) -> Result<f64, ParseError> {
    use base64::Engine as _;

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| ParseError::InvalidEncoding(e.to_string()))?;
    let text = core::str::from_utf8(&decoded).map_err(|_| ParseError::NotText)?;
    let text = text.trim_end_matches('\0').trim();
    let value: f64 = text
        .parse()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))?;
    if !value.is_finite() {
        return Err(ParseError::InvalidNumber(text.to_string()));
    }
    Ok(value)
}

fn parse_number(field: &str) -> Result<f64, ParseError> {
    let value: f64 = field
        .parse()
        .map_err(|_| ParseError::InvalidNumber(field.to_string()))?;
    if !value.is_finite() {
        return Err(ParseError::InvalidNumber(field.to_string()));
    }
    Ok(value)
}

fn quote_field(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

/// Split a record line into fields, honoring doubled quotes.
///
/// Every field must be wrapped in double quotes; a `""` inside a field is an
/// escaped quote. Fields are separated by single commas.
pub(crate) fn split_quoted(line: &str) -> Result<Vec<String>, ParseError> {
    let mut fields = Vec::new();
    let mut chars = line.chars().peekable();

    loop {
        let index = fields.len();
        match chars.next() {
            Some('"') => {}
            _ => return Err(ParseError::UnquotedField { index }),
        }

        let mut field = String::new();
        loop {
            match chars.next() {
                Some('"') => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        break;
                    }
                }
                Some(c) => field.push(c),
                None => return Err(ParseError::UnquotedField { index }),
            }
        }
        fields.push(field);

        match chars.next() {
            Some(',') => {}
            None => return Ok(fields),
            Some(_) => {
                return Err(ParseError::UnquotedField {
                    index: fields.len(),
                });
            }
        }
    }
}
