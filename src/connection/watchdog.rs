/// Liveness check for a single connection. One is armed per connect and it
/// lives inside the connection, so a reconnect always replaces it.
#[derive(Debug, PartialEq, Eq)]
pub struct Watchdog {
    interval: std::time::Duration,
    timeout: std::time::Duration,
    next_tick: std::time::Instant,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Tick {
    NotDue,
    Alive,
    Expired,
}

impl Watchdog {
    #[must_use]
    pub fn arm(
        interval: std::time::Duration,
        timeout: std::time::Duration,
        now: std::time::Instant,
    ) -> Self {
        Watchdog {
            interval,
            timeout,
            next_tick: now + interval,
        }
    }

    /// How long a blocking read may wait before the next check is due.
    #[must_use]
    pub fn time_until_tick(&self, now: std::time::Instant) -> std::time::Duration {
        self.next_tick
            .saturating_duration_since(now)
            .max(std::time::Duration::from_millis(1))
    }

    pub fn poll(
        &mut self,
        now: std::time::Instant,
        last_keepalive: std::time::Instant,
    ) -> Tick {
        if now < self.next_tick {
            return Tick::NotDue;
        }
        self.next_tick = now + self.interval;

        if now.saturating_duration_since(last_keepalive) > self.timeout {
            Tick::Expired
        } else {
            Tick::Alive
        }
    }
}
