#[derive(Debug, PartialEq, Clone)]
pub struct PositionPacket {
    pub header: PositionHeader,
    pub body: PositionBody,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PositionHeader {
    pub source: String,
    pub destination: String,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PositionBody {
    pub time: chrono::DateTime<chrono::Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Degrees.
    pub ground_track: i32,
    /// As transmitted (knots on the OGN feed).
    pub ground_speed: i32,
    /// Feet.
    pub altitude: i32,
    /// Feet per minute.
    pub vertical_speed: i32,
    pub flight_level: i32,
    pub beacon_id: Option<OGNBeaconID>,
}

/// Decoded `idXXYYYYYY` token: two hex digits of flags followed by the 24-bit address.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OGNBeaconID {
    pub prefix: OGNIDPrefix,
    pub address: DeviceAddress,
}

impl std::str::FromStr for OGNBeaconID {
    type Err = OGNBeaconIDError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 8 || !s.is_ascii() {
            return Err(OGNBeaconIDError::InvalidLength(s.to_string()));
        }
        let (prefix_hex, address_hex) = s.split_at(2);

        let prefix = OGNIDPrefix::from_hex_str(prefix_hex)?;
        let raw_address = u32::from_str_radix(address_hex, 16)
            .map_err(|_| OGNBeaconIDError::InvalidHex(address_hex.to_string()))?;

        Ok(OGNBeaconID {
            prefix,
            address: DeviceAddress::new(raw_address)?,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum OGNBeaconIDError {
    InvalidLength(String),
    InvalidHex(String),
    AddressOutOfRange(u32),
}
impl std::fmt::Display for OGNBeaconIDError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OGNBeaconIDError::InvalidLength(string) => {
                write!(f, "Beacon id '{string}' is not 8 hex digits")
            }
            OGNBeaconIDError::InvalidHex(string) => {
                write!(f, "Beacon id component '{string}' is not hexadecimal")
            }
            OGNBeaconIDError::AddressOutOfRange(value) => write!(
                f,
                "Value 0x{value:X} exceeds 24-bit address limit (0x{:X})",
                DeviceAddress::MAX_VALUE
            ),
        }
    }
}
impl std::error::Error for OGNBeaconIDError {}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OGNIDPrefix {
    pub aircraft_type: OGNAircraftType,
    pub address_type: OGNAddressType,
    pub no_track: bool,
    pub stealth_mode: bool,
}

impl OGNIDPrefix {
    // bit 7: stealth, bit 6: no-track, bits 5..2: aircraft type, bits 1..0: address type
    #[must_use]
    pub fn new(value: u8) -> Self {
        OGNIDPrefix {
            aircraft_type: OGNAircraftType::from_bits((value >> 2) & 0b1111),
            address_type: OGNAddressType::from_bits(value & 0b11),
            no_track: (value >> 6) & 0b1 == 1,
            stealth_mode: (value >> 7) & 0b1 == 1,
        }
    }

    pub fn from_hex_str(s: &str) -> Result<Self, OGNBeaconIDError> {
        u8::from_str_radix(s, 16)
            .map(OGNIDPrefix::new)
            .map_err(|_| OGNBeaconIDError::InvalidHex(s.to_string()))
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OGNAddressType {
    Unknown,
    ICAO,
    FLARM,
    OgnTracker,
}
impl OGNAddressType {
    fn from_bits(value: u8) -> Self {
        match value & 0b11 {
            1 => OGNAddressType::ICAO,
            2 => OGNAddressType::FLARM,
            3 => OGNAddressType::OgnTracker,
            _ => OGNAddressType::Unknown,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum OGNAircraftType {
    Reserved,
    Glider,
    TowPlane,
    Helicopter,
    Parachute,
    DropPlane,
    HangGlider,
    Paraglider,
    ReciprocatingEngineAircraft,
    JetTurbopropAircraft,
    Unknown,
    Balloon,
    Airship,
    UAV,
    StaticObstacle,
}

impl OGNAircraftType {
    fn from_bits(value: u8) -> Self {
        match value & 0b1111 {
            1 => OGNAircraftType::Glider,
            2 => OGNAircraftType::TowPlane,
            3 => OGNAircraftType::Helicopter,
            4 => OGNAircraftType::Parachute,
            5 => OGNAircraftType::DropPlane,
            6 => OGNAircraftType::HangGlider,
            7 => OGNAircraftType::Paraglider,
            8 => OGNAircraftType::ReciprocatingEngineAircraft,
            9 => OGNAircraftType::JetTurbopropAircraft,
            10 => OGNAircraftType::Unknown,
            11 => OGNAircraftType::Balloon,
            12 => OGNAircraftType::Airship,
            13 => OGNAircraftType::UAV,
            15 => OGNAircraftType::StaticObstacle,
            _ => OGNAircraftType::Reserved,
        }
    }
}

/// 24-bit ICAO, FLARM or OGN tracker address.
#[derive(Debug, PartialEq, Clone, Copy, Eq, Hash)]
pub struct DeviceAddress(u32);

impl DeviceAddress {
    pub const MAX_VALUE: u32 = 0x00FF_FFFF;

    pub fn new(value: u32) -> Result<Self, OGNBeaconIDError> {
        if value <= Self::MAX_VALUE {
            Ok(DeviceAddress(value))
        } else {
            Err(OGNBeaconIDError::AddressOutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceAddress, OGNAddressType, OGNAircraftType, OGNBeaconID, OGNBeaconIDError};

    #[test]
    fn when_parsing_flarm_glider_id_then_prefix_and_address_are_decoded() {
        let beacon: OGNBeaconID = "0ADDA5BA".parse().expect("valid beacon id");

        assert_eq!(beacon.prefix.aircraft_type, OGNAircraftType::TowPlane);
        assert_eq!(beacon.prefix.address_type, OGNAddressType::FLARM);
        assert!(!beacon.prefix.no_track);
        assert!(!beacon.prefix.stealth_mode);
        assert_eq!(beacon.address.value(), 0x00DD_A5BA);
        assert_eq!(beacon.address.to_string(), "DDA5BA");
    }

    #[test]
    fn when_prefix_has_high_bits_set_then_stealth_and_no_track_are_reported() {
        let beacon: OGNBeaconID = "C5440356".parse().expect("valid beacon id");

        assert!(beacon.prefix.stealth_mode);
        assert!(beacon.prefix.no_track);
        assert_eq!(beacon.prefix.aircraft_type, OGNAircraftType::Glider);
        assert_eq!(beacon.prefix.address_type, OGNAddressType::ICAO);
    }

    #[test]
    fn when_beacon_id_has_wrong_length_then_error_is_returned() {
        let result = "0ADDA5".parse::<OGNBeaconID>();
        assert_eq!(
            result,
            Err(OGNBeaconIDError::InvalidLength(String::from("0ADDA5")))
        );
    }

    #[test]
    fn when_beacon_id_is_not_hex_then_error_is_returned() {
        let result = "0AZZA5BA".parse::<OGNBeaconID>();
        assert_eq!(
            result,
            Err(OGNBeaconIDError::InvalidHex(String::from("ZZA5BA")))
        );
    }

    #[test]
    fn when_address_exceeds_24_bits_then_error_is_returned() {
        assert!(DeviceAddress::new(0x0100_0000).is_err());
        assert!(DeviceAddress::new(DeviceAddress::MAX_VALUE).is_ok());
    }
}
