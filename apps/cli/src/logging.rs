//! Logging initialization for the `newton` binary
//!
//! `RUST_LOG` takes precedence. Without it the level follows the number of
//! `-v` flags: warn, info, debug, trace.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_logging(verbosity: u8, json: bool) -> anyhow::Result<()> {
    let env_filter = build_env_filter(verbosity);
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = level(verbosity);
        EnvFilter::new(format!(
            "newton={level},newton_parser={level},newton_physics={level}"
        ))
    })
}
