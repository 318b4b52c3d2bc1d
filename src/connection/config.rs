use crate::connection::resolver::{DEFAULT_HOST, DEFAULT_PORT};
use crate::parser::{Corrections, DecoderMode};

/// Where to connect and how to log in. Host and port fall back to the public
/// OGN feed when a config file leaves them out.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct ConnectionConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub auth: AuthConfig,
    pub filter: PositionFilter,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct AuthConfig {
    pub username: String,
    #[serde(default)]
    pub passcode: Option<u32>,
    #[serde(default)]
    pub receive_only: bool,
}

/// Range filter: positions within `distance` km of the given point.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct PositionFilter {
    pub latitude: f64,
    pub longitude: f64,
    pub distance: f64,
}

fn default_host() -> String {
    String::from(DEFAULT_HOST)
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl ConnectionConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{0}:{1}", self.host, self.port)
    }

    /// The APRS-IS login line, `\r\n` terminated.
    #[must_use]
    pub fn login_line(&self, client_name: &str, client_version: &str) -> String {
        format!(
            "user {0} pass {1} vers {client_name} {client_version} filter r/{2}/{3}/{4}\r\n",
            self.auth.username,
            self.auth.passcode_token(),
            self.filter.latitude,
            self.filter.longitude,
            self.filter.distance,
        )
    }
}

impl AuthConfig {
    /// `-1` for receive-only sessions and for a missing or zero passcode,
    /// which APRS-IS servers never issue.
    #[must_use]
    pub fn passcode_token(&self) -> String {
        match self.passcode {
            Some(passcode) if passcode != 0 && !self.receive_only => passcode.to_string(),
            _ => String::from("-1"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepAlivePolicy {
    /// Keep processing the rest of the received chunk.
    #[default]
    Continue,
    /// Drop the remaining lines of the chunk after a keepalive.
    Stop,
}

pub const DEFAULT_KEEPALIVE_TIMEOUT_MS: u64 = 60_000;
pub const DEFAULT_WATCHDOG_INTERVAL_MS: u64 = 500;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    pub keepalive_timeout_ms: u64,
    pub watchdog_interval_ms: u64,
    pub connect_timeout_ms: u64,
    /// Wait after a failed connect attempt. A dropped connection reconnects immediately.
    pub retry_delay_ms: u64,
    pub decoder_mode: DecoderMode,
    /// Replaces the `decoder_mode` preset with individually chosen corrections.
    pub corrections: Option<Corrections>,
    pub keepalive_policy: KeepAlivePolicy,
}

impl ClientOptions {
    #[must_use]
    pub fn keepalive_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.keepalive_timeout_ms)
    }

    #[must_use]
    pub fn watchdog_interval(&self) -> std::time::Duration {
        // a zero read timeout is rejected by the socket
        std::time::Duration::from_millis(self.watchdog_interval_ms.max(1))
    }

    #[must_use]
    pub fn connect_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.connect_timeout_ms.max(1))
    }

    #[must_use]
    pub fn corrections(&self) -> Corrections {
        self.corrections
            .unwrap_or_else(|| self.decoder_mode.into())
    }

    #[must_use]
    pub fn retry_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for ClientOptions {
    fn default() -> Self {
        ClientOptions {
            keepalive_timeout_ms: DEFAULT_KEEPALIVE_TIMEOUT_MS,
            watchdog_interval_ms: DEFAULT_WATCHDOG_INTERVAL_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            decoder_mode: DecoderMode::default(),
            corrections: None,
            keepalive_policy: KeepAlivePolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AuthConfig, ClientOptions, ConnectionConfig, KeepAlivePolicy, PositionFilter};
    use crate::parser::{Corrections, DecoderMode};

    fn config_with_auth(passcode: Option<u32>, receive_only: bool) -> ConnectionConfig {
        ConnectionConfig {
            host: String::from("aprs.glidernet.org"),
            port: 14580,
            auth: AuthConfig {
                username: String::from("GNETRS"),
                passcode,
                receive_only,
            },
            filter: PositionFilter {
                latitude: 56.189_107_34,
                longitude: -3.321_931_47,
                distance: 10.0,
            },
        }
    }

    #[test]
    fn when_passcode_given_and_not_receive_only_then_passcode_is_sent() {
        let config = config_with_auth(Some(12345), false);
        assert_eq!(
            config.login_line("glidernet", "0.1.0"),
            "user GNETRS pass 12345 vers glidernet 0.1.0 filter r/56.18910734/-3.32193147/10\r\n"
        );
    }

    #[test]
    fn when_receive_only_or_no_passcode_then_minus_one_is_sent() {
        for (passcode, receive_only) in [
            (Some(12345), true),
            (None, false),
            (None, true),
            (Some(0), false),
        ] {
            let config = config_with_auth(passcode, receive_only);
            assert_eq!(config.auth.passcode_token(), "-1");
            assert!(
                config
                    .login_line("glidernet", "0.1.0")
                    .starts_with("user GNETRS pass -1 vers")
            );
        }
    }

    #[test]
    fn when_filter_has_fractional_distance_then_it_is_not_rounded() {
        let mut config = config_with_auth(None, true);
        config.filter.distance = 12.5;
        assert!(
            config
                .login_line("glidernet", "0.1.0")
                .ends_with("filter r/56.18910734/-3.32193147/12.5\r\n")
        );
    }

    #[test]
    fn when_options_are_partially_specified_then_defaults_fill_the_rest() {
        let options: ClientOptions =
            toml::from_str("keepalive_timeout_ms = 1000\ndecoder_mode = \"corrected\"").unwrap();
        assert_eq!(options.keepalive_timeout_ms, 1000);
        assert_eq!(options.decoder_mode, DecoderMode::Corrected);
        assert_eq!(options.watchdog_interval_ms, 500);
        assert_eq!(options.keepalive_policy, KeepAlivePolicy::Continue);
    }

    #[test]
    fn when_corrections_table_is_given_then_it_replaces_the_preset() {
        let options: ClientOptions = toml::from_str(
            "decoder_mode = \"corrected\"\n[corrections]\nclock_seconds = true\nsearched_tokens = true",
        )
        .unwrap();
        assert_eq!(
            options.corrections(),
            Corrections {
                clock_seconds: true,
                searched_tokens: true,
                ..Corrections::NONE
            }
        );

        let preset_only: ClientOptions = toml::from_str("decoder_mode = \"corrected\"").unwrap();
        assert_eq!(preset_only.corrections(), Corrections::ALL);
        assert_eq!(ClientOptions::default().corrections(), Corrections::NONE);
    }

    #[test]
    fn when_host_and_port_are_missing_then_public_feed_is_used() {
        let config: ConnectionConfig = toml::from_str(
            "auth = { username = \"N0CALL\" }\nfilter = { latitude = 1.0, longitude = 2.0, distance = 3.0 }",
        )
        .unwrap();
        assert_eq!(config.address(), "aprs.glidernet.org:14580");
    }

    #[test]
    fn when_interval_is_zero_then_watchdog_interval_is_clamped() {
        let options = ClientOptions {
            watchdog_interval_ms: 0,
            ..ClientOptions::default()
        };
        assert_eq!(
            options.watchdog_interval(),
            std::time::Duration::from_millis(1)
        );
    }
}
