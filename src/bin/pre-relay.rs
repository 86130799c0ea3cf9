use std::{error::Error, net::SocketAddr};

use clap::Parser;
use relaypre::{cli::Verbosity, relay::Relay};

#[derive(Debug, Parser)]
#[clap(
    name = "pre-relay",
    about = "Untrusted relay that verifies and re-encrypts ciphertexts"
)]
struct Args {
    #[clap(flatten)]
    logging: Verbosity,

    /// Address to listen on
    #[arg(long, env = "PRE_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    listen: SocketAddr,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    args.logging.setup_logging();

    Relay::bind(args.listen)?.serve()?;
    Ok(())
}
