use std::time::Duration;

pub const SERVICE_NAME: &str = "sampha API";

pub const PORT_VAR: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// No socket progress in either direction for this long closes the connection.
pub const IDLE_TIMEOUT: Duration = Duration::from_secs(60);
/// Time allowed for a client to send a complete request head.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);
/// Time a single blocked socket write may take.
pub const WRITE_TIMEOUT: Duration = Duration::from_secs(30);
/// How long in-flight connections get to finish after shutdown starts.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timeouts {
    pub idle: Duration,
    pub read: Duration,
    pub write: Duration,
    pub drain: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            idle: IDLE_TIMEOUT,
            read: READ_TIMEOUT,
            write: WRITE_TIMEOUT,
            drain: DRAIN_TIMEOUT,
        }
    }
}

/// Picks the listening port: the command line wins, then `PORT`, then 8080.
///
/// A `PORT` that doesn't parse, or is zero, is ignored with a warning.
pub fn resolve_port(cli: Option<u16>, env: Option<&str>) -> u16 {
    if let Some(port) = cli {
        return port;
    }
    match env.map(|v| v.trim().parse::<u16>()) {
        Some(Ok(port)) if port != 0 => port,
        Some(_) => {
            log::warn!(
                "Ignoring invalid {}={:?}, using {}",
                PORT_VAR,
                env.unwrap_or_default(),
                DEFAULT_PORT
            );
            DEFAULT_PORT
        }
        None => DEFAULT_PORT,
    }
}
