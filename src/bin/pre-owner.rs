use std::error::Error;

use clap::Parser;
use tracing::{info, info_span};

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
    name = "pre-owner",
    about = "Data owner: encrypts a message and delegates it to a user through the relay"
)]
struct Args {
    #[clap(flatten)]
    logging: Verbosity,

    /// Address of the relay
    #[arg(long, env = "PRE_RELAY_ADDR", default_value = DEFAULT_RELAY_ADDR)]
    relay: String,

    /// Principal the owner registers as
    #[arg(long, env = "PRE_OWNER", default_value = "owner")]
    owner: String,

    /// Principal to delegate to; their public key must already be registered
    #[arg(long, env = "PRE_USER", default_value = "user")]
    user: String,

    /// Message to encrypt
    #[arg(long, env = "PRE_MESSAGE", default_value = "HelloPRE123!")]
    message: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    args.logging.setup_logging();

    let mut rng = rand::thread_rng();
    let pre = BilinearPre::new();
    let client = RelayClient::new(args.relay.as_str())?;

    let owner = info_span!("generate_keys").in_scope(|| KeyPair::generate(&mut rng));
    info!(key = %owner.public().fingerprint(), "generated owner keys");
    client.upload_public_key(&args.owner, owner.public())?;

    let user = client.fetch_public_key(&args.user)?;
    info!(principal = %args.user, key = %user.fingerprint(), "fetched user key");

    let message = encode_message(args.message.as_bytes());
    let ciphertext =
        info_span!("encrypt").in_scope(|| pre.encrypt(&mut rng, owner.public(), &message));
    let rekey = info_span!("generate_rekey")
        .in_scope(|| pre.generate_rekey(owner.public(), owner.secret(), &user));

    client.upload_rekey(&args.owner, &rekey)?;
    client.upload_ciphertext(&args.owner, &ciphertext)?;
    info!(
        ciphertext = %ciphertext.fingerprint(),
        rekey = %rekey.fingerprint(),
        "uploaded ciphertext and re-encryption key"
    );

    let stored = client.fetch_ciphertext(&args.owner)?;
    let decryption = info_span!("decrypt")
        .in_scope(|| pre.decrypt(owner.public(), owner.secret(), &stored));
    if decryption != message {
        return Err("direct decryption of the stored ciphertext does not match".into());
    }
    info!("direct decryption matches the message");
    Ok(())
}
