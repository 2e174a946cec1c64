use std::time::Duration;

pub(super) const fn default_port() -> u16 {
    17778
}

pub(super) const fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(5)
}
