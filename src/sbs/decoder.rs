use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

/// An SBS line must carry the MSG tag plus 21 positional fields.
const MIN_FIELD_COUNT: usize = 22;

/// BaseStation date/time pair, e.g. "2008/11/28 23:48:18.611".
/// The fractional seconds are optional; real feeds carry milliseconds.
const DATE_TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

/// One decoded SBS-1 BaseStation record.
///
/// Decoding is best-effort: a numeric or boolean field that fails to parse
/// takes the type's zero value rather than rejecting the whole record, and an
/// unparsable date pair becomes `None`. Only structural problems (wrong tag,
/// too few fields) reject a line. Zero and empty optional fields are omitted
/// from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SbsMessage {
    /// Decode-time instant as Unix nanoseconds, not taken from the payload
    pub timestamp: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message_type: String,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub transmission_type: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub aircraft_id: String,
    /// ICAO 24-bit address as a hex string, e.g. "738065" or "AB1234"
    #[serde(skip_serializing_if = "String::is_empty")]
    pub icao24: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flight_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logged_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub callsign: String,
    /// Altitude in feet
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub altitude: i32,
    /// Ground speed in knots
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub ground_speed: f32,
    /// Track in degrees
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub track: f32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub lat: f32,
    #[serde(skip_serializing_if = "is_zero_f32")]
    pub lon: f32,
    /// Vertical rate in feet/minute
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub vertical_rate: i32,
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub squawk: i32,
    #[serde(skip_serializing_if = "is_false")]
    pub alert: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub emergency: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub spi: bool,
    #[serde(skip_serializing_if = "is_false")]
    pub on_ground: bool,
}

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

fn is_zero_f32(value: &f32) -> bool {
    *value == 0.0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Outcome of decoding one line from the feed
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeOutcome {
    Accepted(Box<SbsMessage>),
    Rejected(RejectReason),
}

/// Why a line was structurally rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The leading field was not the literal "MSG" tag
    NotMsg,
    /// Fewer than the 22 comma-separated fields SBS requires
    TooFewFields(usize),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotMsg => write!(f, "not an MSG record"),
            RejectReason::TooFewFields(n) => {
                write!(f, "expected at least {MIN_FIELD_COUNT} fields, got {n}")
            }
        }
    }
}

/// Decode an SBS CSV line into an `SbsMessage`.
///
/// SBS format: MSG,<transmission_type>,<session_id>,<aircraft_id>,<icao24>,
///             <flight_id>,<date_gen>,<time_gen>,<date_log>,<time_log>,
///             <callsign>,<altitude>,<ground_speed>,<track>,<lat>,<lon>,
///             <vertical_rate>,<squawk>,<alert>,<emergency>,<spi>,<on_ground>
pub fn decode(line: &str) -> DecodeOutcome {
    let fields: Vec<&str> = line.trim().split(',').collect();

    if fields.len() < MIN_FIELD_COUNT {
        return DecodeOutcome::Rejected(RejectReason::TooFewFields(fields.len()));
    }
    if fields[0] != "MSG" {
        return DecodeOutcome::Rejected(RejectReason::NotMsg);
    }

    let message = SbsMessage {
        timestamp: Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default()
            .to_string(),
        message_type: "MSG".to_string(),
        transmission_type: parse_i32(fields[1]),
        session_id: fields[2].to_string(),
        aircraft_id: fields[3].to_string(),
        icao24: fields[4].to_string(),
        flight_id: fields[5].to_string(),
        generated_date: parse_date_time(fields[6], fields[7]),
        logged_date: parse_date_time(fields[8], fields[9]),
        callsign: fields[10].trim().to_string(),
        altitude: parse_i32(fields[11]),
        ground_speed: parse_f32(fields[12]),
        track: parse_f32(fields[13]),
        lat: parse_f32(fields[14]),
        lon: parse_f32(fields[15]),
        vertical_rate: parse_i32(fields[16]),
        squawk: parse_i32(fields[17]),
        alert: parse_bool(fields[18]),
        emergency: parse_bool(fields[19]),
        spi: parse_bool(fields[20]),
        on_ground: parse_bool(fields[21]),
    };

    DecodeOutcome::Accepted(Box::new(message))
}

/// Parse an integer field, narrowing into i32 range; 0 on failure
fn parse_i32(field: &str) -> i32 {
    field.parse::<i64>().map(|v| v as i32).unwrap_or(0)
}

/// Parse a float field at f32 precision; 0.0 on failure
fn parse_f32(field: &str) -> f32 {
    field.parse::<f32>().unwrap_or(0.0)
}

/// Parse a flag field: any nonzero integer is true; false on failure
fn parse_bool(field: &str) -> bool {
    field.parse::<i64>().map(|v| v != 0).unwrap_or(false)
}

/// Parse a paired date and time field; None when unparsable
fn parse_date_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), DATE_TIME_FORMAT)
        .ok()
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn decode_ok(line: &str) -> SbsMessage {
        match decode(line) {
            DecodeOutcome::Accepted(message) => *message,
            DecodeOutcome::Rejected(reason) => panic!("line rejected ({reason}): {line}"),
        }
    }

    #[test]
    fn test_decode_full_position_message() {
        let line = "MSG,3,1,1,4BB268,4721,2023/06/01,12:34:56,2023/06/01,12:34:57, UAL123 ,35000,450.5,90.2,37.6213,-122.3790,1000,1234,1,0,0,0";
        let msg = decode_ok(line);

        assert_eq!(msg.message_type, "MSG");
        assert_eq!(msg.transmission_type, 3);
        assert_eq!(msg.session_id, "1");
        assert_eq!(msg.aircraft_id, "1");
        assert_eq!(msg.icao24, "4BB268");
        assert_eq!(msg.flight_id, "4721");
        assert_eq!(msg.callsign, "UAL123");
        assert_eq!(msg.altitude, 35000);
        assert_eq!(msg.ground_speed, 450.5);
        assert_eq!(msg.track, 90.2);
        assert_eq!(msg.lat, 37.6213);
        assert_eq!(msg.lon, -122.3790);
        assert_eq!(msg.vertical_rate, 1000);
        assert_eq!(msg.squawk, 1234);
        assert!(msg.alert);
        assert!(!msg.emergency);
        assert!(!msg.spi);
        assert!(!msg.on_ground);
    }

    #[test]
    fn test_reject_non_msg_tag() {
        let line = "STA,3,1,1,4BB268,1,2023/06/01,12:34:56,2023/06/01,12:34:57,,35000,,,51.5,0.1,,,0,0,0,0";
        assert_eq!(decode(line), DecodeOutcome::Rejected(RejectReason::NotMsg));
    }

    #[test]
    fn test_reject_too_few_fields() {
        let line = "MSG,3,1,1,738065";
        assert_eq!(
            decode(line),
            DecodeOutcome::Rejected(RejectReason::TooFewFields(5))
        );
    }

    #[test]
    fn test_reject_empty_line() {
        assert_eq!(
            decode(""),
            DecodeOutcome::Rejected(RejectReason::TooFewFields(1))
        );
    }

    #[test]
    fn test_non_numeric_fields_default_without_rejecting() {
        let line = "MSG,junk,1,1,738065,1,2023/06/01,12:34:56,2023/06/01,12:34:57,,not-a-number,fast,,,,,,x,y,z,w";
        let msg = decode_ok(line);

        assert_eq!(msg.transmission_type, 0);
        assert_eq!(msg.altitude, 0);
        assert_eq!(msg.ground_speed, 0.0);
        assert!(!msg.alert);
        assert!(!msg.emergency);
        assert!(!msg.spi);
        assert!(!msg.on_ground);
    }

    #[test]
    fn test_date_pair_parses_to_expected_instant() {
        let line = "MSG,1,1,1,738065,1,2023/05/01,12:00:00,2023/05/01,12:00:05,RYR1427,,,,,,,0,,0,0,0";
        let msg = decode_ok(line);

        let expected = Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(msg.generated_date, Some(expected));
        assert_eq!(
            msg.logged_date,
            Some(Utc.with_ymd_and_hms(2023, 5, 1, 12, 0, 5).unwrap())
        );
    }

    #[test]
    fn test_garbage_date_yields_none_not_rejection() {
        let line = "MSG,1,1,1,738065,1,garbage,12:00:00,2023/05/01,nonsense,RYR1427,,,,,,,0,,0,0,0";
        let msg = decode_ok(line);

        assert_eq!(msg.generated_date, None);
        assert_eq!(msg.logged_date, None);
        assert_eq!(msg.callsign, "RYR1427");
    }

    #[test]
    fn test_fractional_seconds_accepted() {
        let line = "MSG,1,1,1,738065,1,2008/11/28,23:48:18.611,2008/11/28,23:53:19.161,RYR1427,,,,,,,0,,0,0,0";
        let msg = decode_ok(line);

        assert!(msg.generated_date.is_some());
        assert!(msg.logged_date.is_some());
    }

    #[test]
    fn test_boolean_flag_values() {
        let line = "MSG,6,1,1,738065,1,2023/06/01,12:34:56,2023/06/01,12:34:57,,,,,,,,7541,1,0,-1,yes";
        let msg = decode_ok(line);

        assert!(msg.alert);
        assert!(!msg.emergency);
        assert!(msg.spi); // nonzero integer is true
        assert!(!msg.on_ground); // non-numeric is false
    }

    #[test]
    fn test_timestamp_is_decode_time_nanoseconds() {
        let before = Utc::now().timestamp_nanos_opt().unwrap();
        let line = "MSG,3,,,AB1234,,,,,,,5000,,,51.5074,-0.1278,,,0,0,0,0";
        let msg = decode_ok(line);
        let after = Utc::now().timestamp_nanos_opt().unwrap();

        let ts: i64 = msg.timestamp.parse().expect("timestamp must be numeric");
        assert!(ts >= before && ts <= after);
    }

    #[test]
    fn test_leading_trailing_whitespace_trimmed() {
        let line = "  MSG,3,,,AB1234,,,,,,,5000,,,51.5074,-0.1278,,,0,0,0,0\r";
        let msg = decode_ok(line);
        assert_eq!(msg.icao24, "AB1234");
        assert_eq!(msg.altitude, 5000);
    }

    #[test]
    fn test_integer_narrows_into_i32() {
        let line = "MSG,3,,,AB1234,,,,,,,4294967296,,,,,,,0,0,0,0";
        let msg = decode_ok(line);
        // 2^32 wraps to 0 in 32-bit range, same as the feed's historical behavior
        assert_eq!(msg.altitude, 0);
    }

    #[test]
    fn test_serialization_omits_zero_and_empty_fields() {
        let line = "MSG,3,,,AB1234,,,,,,,5000,,,51.5074,-0.1278,,,0,0,0,0";
        let msg = decode_ok(line);
        let json = serde_json::to_value(&msg).unwrap();
        let obj = json.as_object().unwrap();

        assert_eq!(obj["message_type"], "MSG");
        assert_eq!(obj["icao24"], "AB1234");
        assert_eq!(obj["altitude"], 5000);
        assert!(obj.contains_key("timestamp"));
        // defaulted / empty fields are dropped from the wire form
        assert!(!obj.contains_key("callsign"));
        assert!(!obj.contains_key("ground_speed"));
        assert!(!obj.contains_key("squawk"));
        assert!(!obj.contains_key("alert"));
        assert!(!obj.contains_key("on_ground"));
        assert!(!obj.contains_key("generated_date"));
    }
}
