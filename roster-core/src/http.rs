//! Blocking HTTP agent shared by the directory and target adapters.

use std::time::Duration;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// `User-Agent` sent on every request.
pub const USER_AGENT: &str = concat!("roster/", env!("CARGO_PKG_VERSION"));

pub fn agent() -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
}
