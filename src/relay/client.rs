use std::{
    io::Write,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
};

use tracing::debug;

use super::wire::{check_principal, read_text, write_text, Command, Frames, STATUS_ERR, STATUS_OK};
use crate::{
    error::{Error, Result},
    keys::{PublicKey, ReKey},
    pre::{Ciphertext, ReEncrypted},
};

/// Talks to a [`Relay`][super::Relay], one connection per command.
#[derive(Debug, Clone)]
pub struct RelayClient {
    addr: SocketAddr,
}

impl RelayClient {
    pub fn new<A: ToSocketAddrs>(addr: A) -> Result<RelayClient> {
        let addr = addr.to_socket_addrs()?.next().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "no address to connect to")
        })?;
        Ok(RelayClient { addr })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends a full request and reads the response status.
    fn request<F>(&self, command: Command, principal: &str, payload: F) -> Result<TcpStream>
    where
        F: FnOnce(&mut TcpStream) -> Result<()>,
    {
        check_principal(principal)?;
        let mut stream = TcpStream::connect(self.addr)?;
        write_text(&mut stream, command.name())?;
        write_text(&mut stream, principal)?;
        payload(&mut stream)?;
        stream.flush()?;
        debug!(%command, principal, "request sent");

        let status = read_text(&mut stream)?;
        match status.as_str() {
            STATUS_OK => Ok(stream),
            STATUS_ERR => Err(Error::Rejected(read_text(&mut stream)?)),
            _ => Err(Error::UnexpectedStatus(status)),
        }
    }

    pub fn upload_public_key(&self, principal: &str, key: &PublicKey) -> Result<()> {
        self.request(
            Command::UploadPk,
            principal,
            |stream| key.write_frames(stream),
        )?;
        Ok(())
    }

    pub fn fetch_public_key(&self, principal: &str) -> Result<PublicKey> {
        let mut stream = self.request(Command::GetPk, principal, |_| Ok(()))?;
        PublicKey::read_frames(&mut stream)
    }

    pub fn upload_rekey(&self, principal: &str, rekey: &ReKey) -> Result<()> {
        self.request(
            Command::UploadKey,
            principal,
            |stream| rekey.write_frames(stream),
        )?;
        Ok(())
    }

    pub fn upload_ciphertext(&self, principal: &str, ciphertext: &Ciphertext) -> Result<()> {
        self.request(
            Command::UploadCt,
            principal,
            |stream| ciphertext.write_frames(stream),
        )?;
        Ok(())
    }

    pub fn fetch_ciphertext(&self, principal: &str) -> Result<Ciphertext> {
        let mut stream = self.request(Command::GetCt, principal, |_| Ok(()))?;
        Ciphertext::read_frames(&mut stream)
    }

    /// Asks the relay to verify and re-encrypt its stored ciphertext.
    pub fn request_reencryption(&self, principal: &str) -> Result<ReEncrypted> {
        let mut stream = self.request(Command::RequestCt, principal, |_| Ok(()))?;
        ReEncrypted::read_frames(&mut stream)
    }
}
