//! Process-wide `tracing` subscriber setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::LaunchpadError;

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins when set; otherwise both launchpad crates log at
/// `default_level`.
pub fn init_logging(default_level: &str) -> Result<(), LaunchpadError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "launchpad_core={default_level},chain_sol={default_level}"
        ))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| LaunchpadError::Config(format!("logging already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_an_error() {
        assert!(init_logging("debug").is_ok());
        assert!(matches!(init_logging("info"), Err(LaunchpadError::Config(_))));
    }
}
