//! The untrusted relay and its client.
//!
//! The relay stores public keys, one ciphertext and one delegation key, and re-encrypts the
//! ciphertext on request. It never sees a secret key or a plaintext, and it never transforms a
//! ciphertext that fails verification.
//!
//! Each connection carries exactly one command. The relay accepts a connection, serves the
//! command to completion, closes the connection and waits for the next one. Because the handler
//! borrows the [`Session`] mutably, there is never more than one command touching it.
use std::{
    io::{Read, Write},
    net::{SocketAddr, TcpListener, ToSocketAddrs},
};

use tracing::{debug, error, info, info_span, warn};

use crate::{
    error::{Error, Result},
    keys::{PublicKey, ReKey},
    pre::Ciphertext,
    ByteAccess,
};

mod client;
mod session;
pub mod wire;

pub use self::{
    client::RelayClient,
    session::{Session, State},
};
use self::wire::{read_command, read_principal, write_text, Command, Frames, STATUS_ERR, STATUS_OK};

/// A relay bound to a TCP socket.
#[derive(Debug)]
pub struct Relay {
    listener: TcpListener,
    session: Session,
}

impl Relay {
    /// Binds the relay to the given address.
    pub fn bind<A: ToSocketAddrs>(addr: A) -> Result<Relay> {
        let listener = TcpListener::bind(addr)?;
        Ok(Relay {
            listener,
            session: Session::new(),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Accepts and serves exactly one connection.
    ///
    /// Errors while serving the connection are logged and end that connection only; the returned
    /// error is reserved for failing to accept.
    pub fn serve_next(&mut self) -> Result<()> {
        let (mut stream, peer) = self.listener.accept()?;
        let _span = info_span!("connection", %peer).entered();
        if let Err(error) = handle_connection(&mut self.session, &mut stream) {
            warn!(%error, "connection closed");
        }
        Ok(())
    }

    /// Serves connections one after another, forever.
    pub fn serve(mut self) -> Result<()> {
        info!(addr = %self.local_addr()?, "relay listening");
        loop {
            if let Err(error) = self.serve_next() {
                error!(%error, "failed to accept connection");
            }
        }
    }
}

/// Reads one command from `stream`, applies it to `session` and writes the response.
///
/// Refusals (missing uploads, unknown principals, failed verification, malformed elements) are
/// answered with an error status. Unknown commands and transport errors end the connection
/// without a response and are returned to the caller.
pub fn handle_connection<S: Read + Write>(session: &mut Session, stream: &mut S) -> Result<()> {
    let command = match read_command(stream) {
        Ok(command) => command,
        Err(error @ Error::UnknownCommand(_)) => {
            error!(%error, "rejecting unknown command");
            return Err(error);
        }
        Err(error) => return Err(error),
    };
    let result = read_principal(stream).and_then(|principal| {
        let _span = info_span!("command", %command, %principal).entered();
        dispatch(session, command, &principal, stream)
    });
    match result {
        Err(error) if error.is_rejection() => {
            warn!(%command, %error, "request refused");
            write_text(stream, STATUS_ERR)?;
            write_text(stream, &error.to_string())?;
            stream.flush()?;
            Ok(())
        }
        other => other,
    }
}

fn dispatch<S: Read + Write>(
    session: &mut Session,
    command: Command,
    principal: &str,
    stream: &mut S,
) -> Result<()> {
    match command {
        Command::UploadPk => {
            let key = PublicKey::read_frames(stream)?;
            session.store_public_key(principal, key);
            write_text(stream, STATUS_OK)?;
        }
        Command::GetPk => {
            let key = session.public_key(principal)?;
            write_text(stream, STATUS_OK)?;
            key.write_frames(stream)?;
            debug!(key = %key.fingerprint(), "sent public key");
        }
        Command::UploadKey => {
            let rekey = ReKey::read_frames(stream)?;
            session.store_rekey(principal, rekey);
            write_text(stream, STATUS_OK)?;
        }
        Command::UploadCt => {
            let ciphertext = Ciphertext::read_frames(stream)?;
            session.store_ciphertext(principal, ciphertext);
            write_text(stream, STATUS_OK)?;
        }
        Command::GetCt => {
            let ciphertext = session.ciphertext()?;
            if let Some(owner) = session.ciphertext_principal().filter(|&p| p != principal) {
                debug!(owner, "ciphertext was uploaded for another principal");
            }
            write_text(stream, STATUS_OK)?;
            ciphertext.write_frames(stream)?;
            debug!(ciphertext = %ciphertext.fingerprint(), "sent original ciphertext");
        }
        Command::RequestCt => {
            let reencrypted = session.reencrypt(principal)?;
            info!(reencrypted = %reencrypted.fingerprint(), "verification passed, re-encrypted");
            write_text(stream, STATUS_OK)?;
            reencrypted.write_frames(stream)?;
        }
    }
    stream.flush()?;
    Ok(())
}
