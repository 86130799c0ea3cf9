//! Pieces shared by the binaries.
use std::io::{stderr, IsTerminal};

use clap::Parser;
use tracing::{info, metadata::LevelFilter, Level};
use tracing_subscriber::{
    fmt, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Default address of the relay.
pub const DEFAULT_RELAY_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, Parser)]
pub struct Verbosity {
    /// Silence all output
    #[clap(short, long, global = true)]
    quiet: bool,

    /// Verbose mode (-v, or -vv for even more verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

impl Verbosity {
    /// Installs the global subscriber.
    ///
    /// Closed spans are reported together with their busy time, which is how the binaries report
    /// how long each protocol step took.
    pub fn setup_logging(&self) {
        let filter_layer = self.log_filter();

        let fmt_layer = fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(stderr().is_terminal())
            .with_writer(stderr);

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();

        info!("Logging setup at level {}", LevelFilter::current());
    }

    fn log_filter(&self) -> EnvFilter {
        EnvFilter::builder()
            .with_default_directive(
                if self.quiet {
                    LevelFilter::OFF
                } else {
                    LevelFilter::from_level(match self.verbose {
                        0 => Level::INFO,
                        1 => Level::DEBUG,
                        _ => Level::TRACE,
                    })
                }
                .into(),
            )
            .from_env_lossy()
    }
}
