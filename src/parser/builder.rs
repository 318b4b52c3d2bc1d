use super::Corrections;
use super::constants::{
    ALTITUDE, FLIGHT_LEVEL_PREFIX, FLIGHT_LEVEL_TOKEN, GROUND_SPEED, GROUND_TRACK,
    HEADER_BODY_DELIMITER, HOUR, LATITUDE_DEGREES, LATITUDE_HEMISPHERE, LATITUDE_MINUTES,
    LONGITUDE_DEGREES, LONGITUDE_HEMISPHERE, LONGITUDE_MINUTES, MINUTE, OGN_BEACON_ID,
    OGN_BEACON_ID_REGEX, PATH_DELIMITER, SECOND, SECOND_COMPONENT, SOURCE_DELIMITER,
    TOKEN_DELIMITER, VERTICAL_SPEED_SUFFIX, VERTICAL_SPEED_TOKEN,
};
use super::types::{OGNBeaconID, PositionBody, PositionHeader, PositionPacket};

#[derive(Debug, PartialEq)]
pub enum DecodeError {
    MissingHeaderOrBody,
    MissingDestination,
    SliceOutOfRange {
        field: &'static str,
        range: std::ops::Range<usize>,
    },
    MissingToken(&'static str),
    InvalidNumber {
        field: &'static str,
        value: String,
    },
    InvalidTime(String),
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::MissingHeaderOrBody => write!(f, "Line has no header/body delimiter"),
            DecodeError::MissingDestination => write!(f, "Header has no destination"),
            DecodeError::SliceOutOfRange { field, range } => write!(
                f,
                "Body too short for {field} at {}..{}",
                range.start, range.end
            ),
            DecodeError::MissingToken(field) => write!(f, "Body has no {field} token"),
            DecodeError::InvalidNumber { field, value } => {
                write!(f, "{field} component '{value}' is not a number")
            }
            DecodeError::InvalidTime(time) => write!(f, "Invalid time of day: {time}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decodes one `HEADER:BODY` position line, stamping it with today's UTC date.
pub fn build_position_from_string(
    line: &str,
    corrections: Corrections,
) -> Result<PositionPacket, DecodeError> {
    build_position_on_date(line, corrections, chrono::Utc::now().date_naive())
}

pub fn build_position_on_date(
    line: &str,
    corrections: Corrections,
    date: chrono::NaiveDate,
) -> Result<PositionPacket, DecodeError> {
    let (header, body) = split_header_and_body(line, corrections.full_body)?;
    let header = build_header(header)?;

    let time = if corrections.clock_seconds {
        clock_time(body, date)?
    } else {
        rolled_over_time(body, date)?
    };

    let mut latitude = degrees_and_minutes(body, LATITUDE_DEGREES, LATITUDE_MINUTES, "latitude")?;
    let mut longitude =
        degrees_and_minutes(body, LONGITUDE_DEGREES, LONGITUDE_MINUTES, "longitude")?;
    if corrections.hemisphere_signs {
        if body.as_bytes().get(LATITUDE_HEMISPHERE) == Some(&b'S') {
            latitude = -latitude;
        }
        if body.as_bytes().get(LONGITUDE_HEMISPHERE) == Some(&b'W') {
            longitude = -longitude;
        }
    }

    let ground_track = parse_integer(slice(body, GROUND_TRACK, "ground_track")?, "ground_track")?;
    let ground_speed = parse_integer(slice(body, GROUND_SPEED, "ground_speed")?, "ground_speed")?;
    let altitude = parse_integer(slice(body, ALTITUDE, "altitude")?, "altitude")?;

    let (vertical_speed, flight_level) = if corrections.searched_tokens {
        searched_climb_and_level(body)?
    } else {
        positional_climb_and_level(body)?
    };

    Ok(PositionPacket {
        header,
        body: PositionBody {
            time,
            latitude,
            longitude,
            ground_track,
            ground_speed,
            altitude,
            vertical_speed,
            flight_level,
            beacon_id: extract_beacon_id(body),
        },
    })
}

fn split_header_and_body(line: &str, full_body: bool) -> Result<(&str, &str), DecodeError> {
    if full_body {
        return line
            .split_once(HEADER_BODY_DELIMITER)
            .ok_or(DecodeError::MissingHeaderOrBody);
    }

    // the body stops at the next delimiter
    let mut parts = line.split(HEADER_BODY_DELIMITER);
    let header = parts.next().unwrap_or_default();
    let body = parts.next().ok_or(DecodeError::MissingHeaderOrBody)?;
    Ok((header, body))
}

fn build_header(header: &str) -> Result<PositionHeader, DecodeError> {
    let mut parts = header.split(SOURCE_DELIMITER);
    let source = parts.next().unwrap_or_default();
    let path = parts.next().ok_or(DecodeError::MissingDestination)?;
    let destination = path.split(PATH_DELIMITER).next().unwrap_or_default();

    Ok(PositionHeader {
        source: source.to_string(),
        destination: destination.to_string(),
    })
}

fn slice<'a>(
    body: &'a str,
    range: std::ops::Range<usize>,
    field: &'static str,
) -> Result<&'a str, DecodeError> {
    body.get(range.clone())
        .ok_or(DecodeError::SliceOutOfRange { field, range })
}

fn invalid_number(value: &str, field: &'static str) -> DecodeError {
    DecodeError::InvalidNumber {
        field,
        value: value.to_string(),
    }
}

/// Reads the leading integer of `value` and ignores whatever follows it, so
/// `-1.1rot` reads as -1 and `0e` as 0. Fails only when there are no digits.
fn parse_integer<T>(value: &str, field: &'static str) -> Result<T, DecodeError>
where
    T: TryFrom<i64>,
{
    integer_prefix(value)
        .and_then(|number| T::try_from(number).ok())
        .ok_or_else(|| invalid_number(value, field))
}

/// Decimal counterpart of [`parse_integer`]: `15.41N` reads as 15.41.
fn parse_decimal(value: &str, field: &'static str) -> Result<f64, DecodeError> {
    decimal_prefix(value)
        .filter(|number| number.is_finite())
        .ok_or_else(|| invalid_number(value, field))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|byte| byte.is_ascii_digit()).count()
}

fn sign_length(value: &str) -> usize {
    usize::from(value.starts_with(['+', '-']))
}

fn integer_prefix(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let sign = sign_length(value);
    let digits = count_digits(&value.as_bytes()[sign..]);
    if digits == 0 {
        return None;
    }
    value[..sign + digits].parse().ok()
}

fn decimal_prefix(value: &str) -> Option<f64> {
    let value = value.trim_start();
    let bytes = value.as_bytes();

    let mut end = sign_length(value);
    let integer_digits = count_digits(&bytes[end..]);
    end += integer_digits;

    let mut fraction_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        fraction_digits = count_digits(&bytes[end + 1..]);
        if fraction_digits > 0 {
            end += 1 + fraction_digits;
        }
    }
    if integer_digits + fraction_digits == 0 {
        return None;
    }

    // an exponent only counts when digits follow it
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let exponent_start = end + 1;
        let exponent_sign = sign_length(&value[exponent_start..]);
        let exponent_digits = count_digits(&bytes[exponent_start + exponent_sign..]);
        if exponent_digits > 0 {
            end = exponent_start + exponent_sign + exponent_digits;
        }
    }

    value[..end].parse().ok()
}

fn degrees_and_minutes(
    body: &str,
    degrees: std::ops::Range<usize>,
    minutes: std::ops::Range<usize>,
    field: &'static str,
) -> Result<f64, DecodeError> {
    let degrees = parse_decimal(slice(body, degrees, field)?, field)?;
    let minutes = parse_decimal(slice(body, minutes, field)?, field)?;
    Ok(convert_latlon_minutes_to_decimals(degrees, minutes))
}

fn convert_latlon_minutes_to_decimals(degrees: f64, minutes: f64) -> f64 {
    degrees + minutes / 60.0
}

// Seconds come from the minute offset and roll over into minutes and hours.
fn rolled_over_time(
    body: &str,
    date: chrono::NaiveDate,
) -> Result<chrono::DateTime<chrono::Utc>, DecodeError> {
    let hours: i64 = parse_integer(slice(body, HOUR, "hour")?, "hour")?;
    let minutes: i64 = parse_integer(slice(body, MINUTE, "minute")?, "minute")?;
    let seconds: i64 = parse_integer(slice(body, SECOND_COMPONENT, "second")?, "second")?;

    let midnight = date.and_time(chrono::NaiveTime::MIN).and_utc();
    Ok(midnight
        + chrono::TimeDelta::hours(hours)
        + chrono::TimeDelta::minutes(minutes)
        + chrono::TimeDelta::seconds(seconds))
}

fn clock_time(
    body: &str,
    date: chrono::NaiveDate,
) -> Result<chrono::DateTime<chrono::Utc>, DecodeError> {
    let hours: u32 = parse_integer(slice(body, HOUR, "hour")?, "hour")?;
    let minutes: u32 = parse_integer(slice(body, MINUTE, "minute")?, "minute")?;
    let seconds: u32 = parse_integer(slice(body, SECOND, "second")?, "second")?;

    let time = chrono::NaiveTime::from_hms_opt(hours, minutes, seconds)
        .ok_or_else(|| DecodeError::InvalidTime(format!("{hours:02}:{minutes:02}:{seconds:02}")))?;
    Ok(date.and_time(time).and_utc())
}

fn positional_climb_and_level(body: &str) -> Result<(i32, i32), DecodeError> {
    let mut tokens = body.split(TOKEN_DELIMITER);
    let vertical_speed = tokens
        .nth(VERTICAL_SPEED_TOKEN)
        .ok_or(DecodeError::MissingToken("vertical_speed"))?;
    let flight_level = tokens
        .nth(FLIGHT_LEVEL_TOKEN - VERTICAL_SPEED_TOKEN - 1)
        .ok_or(DecodeError::MissingToken("flight_level"))?;

    Ok((
        parse_integer(
            &vertical_speed.replacen(VERTICAL_SPEED_SUFFIX, "", 1),
            "vertical_speed",
        )?,
        parse_integer(
            &flight_level.replacen(FLIGHT_LEVEL_PREFIX, "", 1),
            "flight_level",
        )?,
    ))
}

fn searched_climb_and_level(body: &str) -> Result<(i32, i32), DecodeError> {
    let vertical_speed = body
        .split(TOKEN_DELIMITER)
        .find_map(|token| token.strip_suffix(VERTICAL_SPEED_SUFFIX))
        .ok_or(DecodeError::MissingToken("vertical_speed"))?;
    let flight_level = body
        .split(TOKEN_DELIMITER)
        .find_map(|token| token.strip_prefix(FLIGHT_LEVEL_PREFIX))
        .ok_or(DecodeError::MissingToken("flight_level"))?;

    Ok((
        parse_integer(vertical_speed, "vertical_speed")?,
        parse_integer(flight_level, "flight_level")?,
    ))
}

fn extract_beacon_id(body: &str) -> Option<OGNBeaconID> {
    let captures = OGN_BEACON_ID_REGEX.captures(body)?;
    let id = captures.name(OGN_BEACON_ID)?.as_str();
    id.parse::<OGNBeaconID>()
        .map_err(|err| log::debug!("Ignoring beacon id: {err}"))
        .ok()
}
