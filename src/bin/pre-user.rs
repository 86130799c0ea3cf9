use std::{error::Error, thread, time::Duration};

use clap::Parser;
use tracing::{info, info_span, warn};

use relaypre::{
    cli::{Verbosity, DEFAULT_RELAY_ADDR},
    group::encode_message,
    keys::KeyPair,
    pre::{BilinearPre, Pre},
    relay::RelayClient,
    ByteAccess,
};

#[derive(Debug, Parser)]
#[clap(
    name = "pre-user",
    about = "Data user: registers a key and fetches a re-encrypted ciphertext from the relay"
)]
struct Args {
    #[clap(flatten)]
    logging: Verbosity,

    /// Address of the relay
    #[arg(long, env = "PRE_RELAY_ADDR", default_value = DEFAULT_RELAY_ADDR)]
    relay: String,

    /// Principal the user registers as
    #[arg(long, env = "PRE_USER", default_value = "user")]
    user: String,

    /// Principal whose ciphertext is requested
    #[arg(long, env = "PRE_OWNER", default_value = "owner")]
    owner: String,

    /// Expected message; the decryption is compared against it when given
    #[arg(long, env = "PRE_MESSAGE")]
    message: Option<String>,

    /// Seconds to wait for the owner before requesting the ciphertext
    #[arg(long, env = "PRE_USER_WAIT", default_value_t = 10)]
    wait: u64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    args.logging.setup_logging();

    let pre = BilinearPre::new();
    let client = RelayClient::new(args.relay.as_str())?;

    let user = info_span!("generate_keys").in_scope(|| KeyPair::generate(rand::thread_rng()));
    client.upload_public_key(&args.user, user.public())?;
    info!(key = %user.public().fingerprint(), "registered user key");

    info!(seconds = args.wait, "waiting for the owner");
    thread::sleep(Duration::from_secs(args.wait));

    let reencrypted = client.request_reencryption(&args.owner)?;
    info!(ciphertext = %reencrypted.fingerprint(), "received re-encrypted ciphertext");
    let decryption = info_span!("decrypt_reencrypted")
        .in_scope(|| pre.decrypt_reencrypted(user.secret(), &reencrypted));

    match args.message {
        Some(expected) if encode_message(expected.as_bytes()) == decryption => {
            info!("decryption matches the expected message");
        }
        Some(_) => {
            warn!("decryption does not match the expected message");
            return Err("re-encrypted decryption does not match".into());
        }
        None => info!(decryption = %hex::encode(&decryption.to_bytes()[..16]), "decrypted"),
    }
    Ok(())
}
