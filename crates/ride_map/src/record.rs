//! Location records and the once-per-sequence mode dispatch.
//!
//! Upstream stores coordinates as text, so numeric fields accept either JSON
//! numbers or numeric strings. Validation happens here, before any rendering.

use crate::error::{MapError, Result};
use log::warn;
use serde::Deserialize;
use serde_json::Value;
use strum_macros::Display;

/// How the whole sequence is drawn. Fixed for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RenderMode {
    /// One marker per business location.
    #[strum(serialize = "poi")]
    Poi,
    /// Origin/destination circle pair per trip.
    #[strum(serialize = "ride")]
    Ride,
}

impl RenderMode {
    /// Interprets the host's "is this a business map" attribute.
    ///
    /// A present, non-empty attribute selects POI mode unless it spells out a
    /// false value (`false`, `0`, `no`, `off`).
    pub fn from_flag(flag: Option<&str>) -> Self {
        let Some(raw) = flag else {
            return RenderMode::Ride;
        };
        match raw.trim().to_ascii_lowercase().as_str() {
            "" | "false" | "0" | "no" | "off" => RenderMode::Ride,
            _ => RenderMode::Poi,
        }
    }

    pub fn is_business_map(self) -> bool {
        self == RenderMode::Poi
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Builds a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(latitude: f64, longitude: f64) -> std::result::Result<Self, String> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(format!("non-finite coordinate ({latitude}, {longitude})"));
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(format!("latitude {latitude} out of range"));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("longitude {longitude} out of range"));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoiRecord {
    pub name: String,
    pub address: String,
    pub position: Coordinate,
    /// Discount percentage; `None` when absent or zero.
    pub discount: Option<f64>,
    /// Promotion percentage; `None` when absent or zero.
    pub promotion: Option<f64>,
}

impl PoiRecord {
    pub fn new(name: impl Into<String>, address: impl Into<String>, position: Coordinate) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            position,
            discount: None,
            promotion: None,
        }
    }

    pub fn with_discount(mut self, percent: f64) -> Self {
        self.discount = truthy(percent);
        self
    }

    pub fn with_promotion(mut self, percent: f64) -> Self {
        self.promotion = truthy(percent);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RideRecord {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl RideRecord {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

/// A whole sequence of records, all of one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordSet {
    Poi(Vec<PoiRecord>),
    Ride(Vec<RideRecord>),
}

/// Outcome of validating a dataset: the accepted records in input order, plus
/// a `MalformedRecord` error for every skipped element.
#[derive(Debug)]
pub struct ParsedRecords {
    pub records: RecordSet,
    pub rejected: Vec<MapError>,
}

impl RecordSet {
    pub fn empty(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Poi => RecordSet::Poi(Vec::new()),
            RenderMode::Ride => RecordSet::Ride(Vec::new()),
        }
    }

    pub fn mode(&self) -> RenderMode {
        match self {
            RecordSet::Poi(_) => RenderMode::Poi,
            RecordSet::Ride(_) => RenderMode::Ride,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RecordSet::Poi(records) => records.len(),
            RecordSet::Ride(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Parses a JSON array of records in the shape selected by `mode`.
    ///
    /// Bad elements are skipped and reported in [`ParsedRecords::rejected`].
    /// A document that is not valid JSON fails as a whole with
    /// [`MapError::Dataset`]; this includes numbers outside the `f64` range
    /// (such as `1e400`), which the JSON reader refuses before any element
    /// is looked at.
    pub fn from_json(text: &str, mode: RenderMode) -> Result<ParsedRecords> {
        let document: Value = serde_json::from_str(text)?;
        match document {
            Value::Array(items) => Ok(Self::from_values(items, mode)),
            other => Err(MapError::NotAnArray {
                found: json_kind(&other),
            }),
        }
    }

    pub fn from_values(items: Vec<Value>, mode: RenderMode) -> ParsedRecords {
        let mut rejected = Vec::new();
        let mut reject = |index: usize, reason: String| {
            warn!("Skipping malformed {mode} record at index {index}: {reason}");
            rejected.push(MapError::MalformedRecord { index, reason });
        };

        let records = match mode {
            RenderMode::Poi => {
                let mut accepted = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match parse_poi(item) {
                        Ok(record) => accepted.push(record),
                        Err(reason) => reject(index, reason),
                    }
                }
                RecordSet::Poi(accepted)
            }
            RenderMode::Ride => {
                let mut accepted = Vec::with_capacity(items.len());
                for (index, item) in items.into_iter().enumerate() {
                    match parse_ride(item) {
                        Ok(record) => accepted.push(record),
                        Err(reason) => reject(index, reason),
                    }
                }
                RecordSet::Ride(accepted)
            }
        };

        ParsedRecords { records, rejected }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawPoi {
    name: String,
    address: String,
    latitude: Option<NumberOrText>,
    longitude: Option<NumberOrText>,
    // Non-numeric offers become `None`; they never reject the record.
    discount: Option<Value>,
    promotion: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRide {
    origin_latitude: Option<NumberOrText>,
    origin_longitude: Option<NumberOrText>,
    destination_latitude: Option<NumberOrText>,
    destination_longitude: Option<NumberOrText>,
}

fn parse_poi(item: Value) -> std::result::Result<PoiRecord, String> {
    let raw: RawPoi = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let position = Coordinate::new(
        required_number("latitude", raw.latitude)?,
        required_number("longitude", raw.longitude)?,
    )?;

    Ok(PoiRecord {
        discount: percent(&raw.name, "discount", raw.discount),
        promotion: percent(&raw.name, "promotion", raw.promotion),
        name: raw.name,
        address: raw.address,
        position,
    })
}

fn parse_ride(item: Value) -> std::result::Result<RideRecord, String> {
    let raw: RawRide = serde_json::from_value(item).map_err(|e| e.to_string())?;
    let origin = Coordinate::new(
        required_number("origin_latitude", raw.origin_latitude)?,
        required_number("origin_longitude", raw.origin_longitude)?,
    )?;
    let destination = Coordinate::new(
        required_number("destination_latitude", raw.destination_latitude)?,
        required_number("destination_longitude", raw.destination_longitude)?,
    )?;
    Ok(RideRecord::new(origin, destination))
}

fn required_number(
    field: &str,
    raw: Option<NumberOrText>,
) -> std::result::Result<f64, String> {
    match raw {
        None => Err(format!("missing {field}")),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{field} is not numeric: {text:?}")),
    }
}

/// Zero, null, `false`, blank and NaN all mean "no offer". Any other
/// non-numeric value is dropped with a warning.
fn percent(name: &str, field: &str, raw: Option<Value>) -> Option<f64> {
    match raw? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) => n.as_f64().and_then(truthy),
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(n) => truthy(n),
            Err(_) => {
                warn!("Ignoring non-numeric {field} {text:?} for {name}");
                None
            }
        },
        other => {
            warn!("Ignoring {} {field} for {name}", json_kind(&other));
            None
        }
    }
}

fn truthy(value: f64) -> Option<f64> {
    (value != 0.0 && !value.is_nan()).then_some(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
