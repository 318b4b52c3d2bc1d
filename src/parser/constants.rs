pub const KEEPALIVE_PREFIX: char = '#';
pub const HEADER_BODY_DELIMITER: char = ':';
pub const SOURCE_DELIMITER: char = '>';
pub const PATH_DELIMITER: char = ',';
pub const TOKEN_DELIMITER: char = ' ';

// Byte offsets into the position body, end-exclusive.
pub const HOUR: std::ops::Range<usize> = 1..3;
pub const MINUTE: std::ops::Range<usize> = 3..5;
pub const SECOND_COMPONENT: std::ops::Range<usize> = 3..7;
pub const SECOND: std::ops::Range<usize> = 5..7;
pub const LATITUDE_DEGREES: std::ops::Range<usize> = 8..10;
pub const LATITUDE_MINUTES: std::ops::Range<usize> = 10..15;
pub const LATITUDE_HEMISPHERE: usize = 15;
pub const LONGITUDE_DEGREES: std::ops::Range<usize> = 17..20;
pub const LONGITUDE_MINUTES: std::ops::Range<usize> = 20..25;
pub const LONGITUDE_HEMISPHERE: usize = 25;
pub const GROUND_TRACK: std::ops::Range<usize> = 27..30;
pub const GROUND_SPEED: std::ops::Range<usize> = 31..34;
pub const ALTITUDE: std::ops::Range<usize> = 37..43;

pub const VERTICAL_SPEED_TOKEN: usize = 3;
pub const FLIGHT_LEVEL_TOKEN: usize = 5;
pub const VERTICAL_SPEED_SUFFIX: &str = "fpm";
pub const FLIGHT_LEVEL_PREFIX: &str = "FL";

pub const OGN_BEACON_ID: &str = "ogn_beacon_id";

pub static OGN_BEACON_ID_REGEX: once_cell::sync::Lazy<regex::Regex> =
    once_cell::sync::Lazy::new(|| {
        let regex_string = format!(r"(?:^|\s)id(?P<{OGN_BEACON_ID}>[0-9A-Fa-f]{{8}})(?:\s|$)");
        regex::Regex::new(&regex_string).unwrap()
    });
