//! SBS (BaseStation) message parsing
//!
//! Only transmission lines (`MSG,...`) carry position/state reports; every
//! other line type is skipped without looking at its fields.
//!
//! Field positions used (zero-indexed):
//!
//! | idx | field    |
//! |-----|----------|
//! | 4   | ICAO hex |
//! | 10  | callsign |
//! | 11  | altitude |
//! | 12  | speed    |
//! | 14  | latitude |
//! | 15  | longitude|

use std::fmt;

use contracts::PositionReport;

use crate::numeric::parse_number;

/// Leading token of a position/state report line
pub const RECORD_MARKER: &str = "MSG";

/// Minimum comma-separated fields in an accepted line
pub const MIN_FIELDS: usize = 16;

const FIELD_ICAO: usize = 4;
const FIELD_CALLSIGN: usize = 10;
const FIELD_ALTITUDE: usize = 11;
const FIELD_SPEED: usize = 12;
const FIELD_LAT: usize = 14;
const FIELD_LON: usize = 15;

/// Why a line produced no report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing but whitespace
    Blank,
    /// Line does not start with the record marker
    NotPositionReport,
    /// Fewer than [`MIN_FIELDS`] fields
    TooFewFields { found: usize },
    /// A required field could not be read
    MalformedRow { field: usize },
}

impl SkipReason {
    /// Short label for metrics and stats
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::NotPositionReport => "not_position_report",
            Self::TooFewFields { .. } => "too_few_fields",
            Self::MalformedRow { .. } => "malformed_row",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank line"),
            Self::NotPositionReport => write!(f, "line does not start with {RECORD_MARKER}"),
            Self::TooFewFields { found } => {
                write!(f, "expected at least {MIN_FIELDS} fields, found {found}")
            }
            Self::MalformedRow { field } => write!(f, "field {field} missing"),
        }
    }
}

/// Result of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(PositionReport),
    Skipped(SkipReason),
}

/// Parse one trimmed feed line.
///
/// Either every field is extracted or the whole line is skipped; a report is
/// never partially filled.
pub fn parse_line(line: &str) -> ParseOutcome {
    if line.trim().is_empty() {
        return ParseOutcome::Skipped(SkipReason::Blank);
    }
    if !line.starts_with(RECORD_MARKER) {
        return ParseOutcome::Skipped(SkipReason::NotPositionReport);
    }

    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_FIELDS {
        return ParseOutcome::Skipped(SkipReason::TooFewFields {
            found: fields.len(),
        });
    }

    match extract(&fields) {
        Ok(report) => ParseOutcome::Parsed(report),
        Err(reason) => ParseOutcome::Skipped(reason),
    }
}

fn extract(fields: &[&str]) -> Result<PositionReport, SkipReason> {
    let field = |idx: usize| -> Result<&str, SkipReason> {
        fields
            .get(idx)
            .copied()
            .ok_or(SkipReason::MalformedRow { field: idx })
    };

    let icao = field(FIELD_ICAO)?.trim();
    let callsign = field(FIELD_CALLSIGN)?.trim();
    let altitude = parse_number(Some(field(FIELD_ALTITUDE)?));
    let speed = parse_number(Some(field(FIELD_SPEED)?));
    let lat = parse_number(Some(field(FIELD_LAT)?));
    let lon = parse_number(Some(field(FIELD_LON)?));

    Ok(PositionReport {
        altitude,
        speed,
        lat,
        lon,
        ..PositionReport::now(icao, callsign)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const AIRBORNE_POSITION: &str =
        "MSG,3,1,1,4CA2D1,1,2024/05/01,12:30:05.000,2024/05/01,12:30:05.000,RYR123 ,37000,450,,53.3498,-6.2603,,,0,0,0,0";

    fn parsed(line: &str) -> PositionReport {
        match parse_line(line) {
            ParseOutcome::Parsed(report) => report,
            ParseOutcome::Skipped(reason) => panic!("unexpected skip: {reason}"),
        }
    }

    #[test]
    fn test_full_line() {
        let report = parsed(AIRBORNE_POSITION);
        assert_eq!(report.icao, "4CA2D1");
        assert_eq!(report.callsign, "RYR123");
        assert_eq!(report.altitude, Some(37000.0));
        assert_eq!(report.speed, Some(450.0));
        assert_eq!(report.lat, Some(53.3498));
        assert_eq!(report.lon, Some(-6.2603));
    }

    #[test]
    fn test_exactly_sixteen_fields() {
        let report = parsed("MSG,3,1,1,ABC123,1,d,t,d,t,,1200,,,51.5,-0.1");
        assert_eq!(report.icao, "ABC123");
        assert_eq!(report.callsign, "");
        assert_eq!(report.altitude, Some(1200.0));
        assert_eq!(report.speed, None);
        assert_eq!(report.lon, Some(-0.1));
    }

    #[test]
    fn test_too_few_fields() {
        let outcome = parse_line("MSG,3,1,1,4CA2D1,1,d,t,d,t,CS,100,50,,51.5");
        assert_eq!(
            outcome,
            ParseOutcome::Skipped(SkipReason::TooFewFields { found: 15 })
        );
    }

    #[test]
    fn test_other_record_types_skipped() {
        for line in [
            "SEL,,496,2286,4CA4E5,27215,2010/02/19,18:06:07.710,2010/02/19,18:06:07.710,RYR1427",
            "AIR,,,,,,,,,,,,,,,,,,,,,",
            "STA,,5,179,400AE7,10103,2008/11/28,14:58:51.153,2008/11/28,14:58:51.153,RM",
        ] {
            assert_eq!(
                parse_line(line),
                ParseOutcome::Skipped(SkipReason::NotPositionReport)
            );
        }
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   "), ParseOutcome::Skipped(SkipReason::Blank));
    }

    #[test]
    fn test_bad_numbers_become_absent() {
        let report = parsed("MSG,3,1,1,ABC123,1,d,t,d,t,CS,NaN,fast,,north,");
        assert_eq!(report.altitude, None);
        assert_eq!(report.speed, None);
        assert_eq!(report.lat, None);
        assert_eq!(report.lon, None);
    }

    #[test]
    fn test_skip_reason_labels() {
        assert_eq!(SkipReason::TooFewFields { found: 3 }.as_str(), "too_few_fields");
        assert_eq!(
            SkipReason::TooFewFields { found: 3 }.to_string(),
            "expected at least 16 fields, found 3"
        );
    }
}
