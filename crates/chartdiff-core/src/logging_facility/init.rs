//! Logging initialization
//!
//! All output goes to stderr so that machine-readable results on stdout
//! stay clean.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output at debug level
    Development,
    /// JSON structured output at info level
    Production,
    /// Test capture mode
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Only the first call has an effect. `RUST_LOG` overrides the profile's
/// default filter.
///
/// # Example
///
/// ```
/// use chartdiff_core::logging_facility::{init, Profile};
///
/// init(Profile::Production);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("chartdiff=debug")),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new("chartdiff=info")),
                )
                .init();
        }
        Profile::Test => {
            // Capture is installed separately via init_test_capture()
            tracing_subscriber::registry().init();
        }
    });
}

impl std::str::FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Profile::Development),
            "production" | "prod" | "json" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown logging profile '{}'", other)),
        }
    }
}
