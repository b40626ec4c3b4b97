//! Observation - Ingestion output
//!
//! One parsed position/state report plus its classification.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;

use crate::Classification;

/// Timestamp format shared by both sinks
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Fields extracted from one `MSG` line, before classification
#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    /// Capture-local clock at parse time
    pub captured_at: NaiveDateTime,

    /// ICAO 24-bit address as hex text (not unique across reports)
    pub icao: String,

    /// Flight callsign, empty when the feed leaves it blank
    pub callsign: String,

    /// Altitude (ft)
    pub altitude: Option<f64>,

    /// Ground speed (kt)
    pub speed: Option<f64>,

    /// Latitude (deg)
    pub lat: Option<f64>,

    /// Longitude (deg)
    pub lon: Option<f64>,
}

impl PositionReport {
    /// Create a report stamped with the current local time
    pub fn now(icao: impl Into<String>, callsign: impl Into<String>) -> Self {
        Self {
            captured_at: Local::now().naive_local(),
            icao: icao.into(),
            callsign: callsign.into(),
            altitude: None,
            speed: None,
            lat: None,
            lon: None,
        }
    }
}

/// A fully parsed and classified telemetry record.
///
/// Immutable once built: the only constructor derives the classification
/// from the report's altitude and speed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    #[serde(rename = "time", serialize_with = "serialize_timestamp")]
    captured_at: NaiveDateTime,
    icao: String,
    callsign: String,
    altitude: Option<f64>,
    lat: Option<f64>,
    lon: Option<f64>,
    speed: Option<f64>,
    classification: Classification,
}

impl Observation {
    /// Classify a report and freeze it into an observation
    pub fn from_report(report: PositionReport) -> Self {
        let classification = Classification::classify(report.altitude, report.speed);
        Self {
            captured_at: report.captured_at,
            icao: report.icao,
            callsign: report.callsign,
            altitude: report.altitude,
            lat: report.lat,
            lon: report.lon,
            speed: report.speed,
            classification,
        }
    }

    pub fn captured_at(&self) -> NaiveDateTime {
        self.captured_at
    }

    /// Capture time rendered with [`TIMESTAMP_FORMAT`]
    pub fn timestamp(&self) -> String {
        self.captured_at.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn icao(&self) -> &str {
        &self.icao
    }

    pub fn callsign(&self) -> &str {
        &self.callsign
    }

    pub fn altitude(&self) -> Option<f64> {
        self.altitude
    }

    pub fn speed(&self) -> Option<f64> {
        self.speed
    }

    pub fn lat(&self) -> Option<f64> {
        self.lat
    }

    pub fn lon(&self) -> Option<f64> {
        self.lon
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }
}

fn serialize_timestamp<S>(ts: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(&ts.format(TIMESTAMP_FORMAT))
}
