//! Framing of the relay protocol.
//!
//! Every field travels in its own frame: a 4-byte big-endian length followed by the bytes. A
//! request is the command name, the principal id, and then one frame per group element. A response
//! starts with a status frame, followed by the payload on success or a reason on failure.
use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

use bincode::Options;
use bls12_381_plus::Gt;
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    error::{Error, Result},
    group::Point,
    keys::{PublicKey, ReKey},
    pre::{Ciphertext, ReEncrypted},
};

/// Frames larger than this are refused before any allocation happens.
pub const MAX_FRAME_LEN: usize = 1 << 16;

/// Longest accepted principal id, in bytes.
pub const MAX_PRINCIPAL_LEN: usize = 50;

pub const STATUS_OK: &str = "OK";
pub const STATUS_ERR: &str = "ERR";

pub fn write_frame<W: Write>(writer: &mut W, bytes: &[u8]) -> Result<()> {
    if bytes.len() > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(bytes.len()));
    }
    writer.write_all(&(bytes.len() as u32).to_be_bytes())?;
    writer.write_all(bytes)?;
    Ok(())
}

pub fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    let mut length = [0; 4];
    reader.read_exact(&mut length)?;
    let length = u32::from_be_bytes(length) as usize;
    if length > MAX_FRAME_LEN {
        return Err(Error::FrameTooLarge(length));
    }
    let mut bytes = vec![0; length];
    reader.read_exact(&mut bytes)?;
    Ok(bytes)
}

pub fn write_text<W: Write>(writer: &mut W, text: &str) -> Result<()> {
    write_frame(writer, text.as_bytes())
}

pub fn read_text<R: Read>(reader: &mut R) -> Result<String> {
    String::from_utf8(read_frame(reader)?).map_err(|_| Error::MalformedElement)
}

/// Element encoding: fixed-width integers, and a frame must hold exactly one element.
fn element_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

pub fn write_element<W: Write, T: Serialize>(writer: &mut W, element: &T) -> Result<()> {
    let bytes = element_options()
        .serialize(element)
        .map_err(|_| Error::MalformedElement)?;
    write_frame(writer, &bytes)
}

pub fn read_element<R: Read, T: DeserializeOwned>(reader: &mut R) -> Result<T> {
    element_options()
        .deserialize(&read_frame(reader)?)
        .map_err(|_| Error::MalformedElement)
}

/// Validates a principal id read from or written to the wire.
pub fn check_principal(principal: &str) -> Result<()> {
    if principal.is_empty() || principal.len() > MAX_PRINCIPAL_LEN {
        return Err(Error::InvalidPrincipal {
            max: MAX_PRINCIPAL_LEN,
        });
    }
    Ok(())
}

pub fn read_principal<R: Read>(reader: &mut R) -> Result<String> {
    let principal = read_text(reader).map_err(|error| match error {
        Error::MalformedElement => Error::InvalidPrincipal {
            max: MAX_PRINCIPAL_LEN,
        },
        other => other,
    })?;
    check_principal(&principal)?;
    Ok(principal)
}

/// The commands the relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    UploadPk,
    GetPk,
    UploadKey,
    UploadCt,
    GetCt,
    RequestCt,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::UploadPk => "UPLOAD_PK",
            Command::GetPk => "GET_PK",
            Command::UploadKey => "UPLOAD_KEY",
            Command::UploadCt => "UPLOAD_CT",
            Command::GetCt => "GET_CT",
            Command::RequestCt => "REQUEST_CT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s {
            "UPLOAD_PK" => Command::UploadPk,
            "GET_PK" => Command::GetPk,
            "UPLOAD_KEY" => Command::UploadKey,
            "UPLOAD_CT" => Command::UploadCt,
            "GET_CT" => Command::GetCt,
            "REQUEST_CT" => Command::RequestCt,
            other => return Err(Error::UnknownCommand(other.into())),
        })
    }
}

/// Reads the command frame of a request.
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let bytes = read_frame(reader)?;
    match std::str::from_utf8(&bytes) {
        Ok(name) => name.parse(),
        Err(_) => Err(Error::UnknownCommand(String::from_utf8_lossy(&bytes).into_owned())),
    }
}

/// Objects that travel as a fixed sequence of element frames.
pub trait Frames: Sized {
    fn write_frames<W: Write>(&self, writer: &mut W) -> Result<()>;
    fn read_frames<R: Read>(reader: &mut R) -> Result<Self>;
}

impl Frames for PublicKey {
    fn write_frames<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_element(writer, &self.pk1)?;
        write_element(writer, &self.pk2)?;
        write_element(writer, &self.pk3)
    }

    fn read_frames<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(PublicKey {
            pk1: read_element(reader)?,
            pk2: read_element(reader)?,
            pk3: read_element(reader)?,
        })
    }
}

impl Frames for ReKey {
    fn write_frames<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_element(writer, self.point())
    }

    fn read_frames<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ReKey::from(read_element::<_, Point>(reader)?))
    }
}

impl Frames for Ciphertext {
    fn write_frames<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_element(writer, &self.c1)?;
        write_element(writer, &self.c2)?;
        write_element(writer, &self.c3)?;
        write_element(writer, &self.c4)?;
        write_element(writer, &self.c5)
    }

    fn read_frames<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(Ciphertext {
            c1: read_element(reader)?,
            c2: read_element::<_, Gt>(reader)?,
            c3: read_element(reader)?,
            c4: read_element(reader)?,
            c5: read_element(reader)?,
        })
    }
}

impl Frames for ReEncrypted {
    fn write_frames<W: Write>(&self, writer: &mut W) -> Result<()> {
        write_element(writer, &self.c1)?;
        write_element(writer, &self.c2)?;
        write_element(writer, &self.c3)
    }

    fn read_frames<R: Read>(reader: &mut R) -> Result<Self> {
        Ok(ReEncrypted {
            c1: read_element::<_, Gt>(reader)?,
            c2: read_element(reader)?,
            c3: read_element(reader)?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn frames_are_length_prefixed() {
        let mut buffer = Vec::new();
        write_frame(&mut buffer, b"GET_PK").unwrap();
        assert_eq!(&buffer[..4], &[0, 0, 0, 6]);
        assert_eq!(read_frame(&mut Cursor::new(buffer)).unwrap(), b"GET_PK");
    }

    #[test]
    fn oversized_frame_is_refused() {
        let mut buffer = Cursor::new(((MAX_FRAME_LEN + 1) as u32).to_be_bytes().to_vec());
        assert!(matches!(
            read_frame(&mut buffer),
            Err(Error::FrameTooLarge(_))
        ));
    }

    #[test]
    fn command_names() {
        for command in [
            Command::UploadPk,
            Command::GetPk,
            Command::UploadKey,
            Command::UploadCt,
            Command::GetCt,
            Command::RequestCt,
        ] {
            assert_eq!(command.name().parse::<Command>().unwrap(), command);
        }
        assert!(matches!(
            "DELETE_CT".parse::<Command>(),
            Err(Error::UnknownCommand(_))
        ));
    }

    #[test]
    fn principal_limits() {
        assert!(check_principal("bob").is_ok());
        assert!(check_principal("").is_err());
        assert!(check_principal(&"x".repeat(MAX_PRINCIPAL_LEN + 1)).is_err());
    }

    #[test]
    fn ciphertext_frames() {
        let mut rng = rand::thread_rng();
        let pair = crate::keys::KeyPair::generate(&mut rng);
        let ciphertext = crate::pre::encrypt(
            &mut rng,
            &crate::group::encode_message(b"frames"),
            &pair.public().pk1,
            &pair.public().pk2,
        );
        let mut buffer = Vec::new();
        ciphertext.write_frames(&mut buffer).unwrap();
        let decoded = Ciphertext::read_frames(&mut Cursor::new(buffer)).unwrap();
        assert_eq!(ciphertext, decoded);
    }

    #[test]
    fn trailing_bytes_in_element_are_refused() {
        let point = Point::random(rand::thread_rng());
        let mut bytes = bincode::serialize(&point).unwrap();
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &bytes).unwrap();
        assert_eq!(read_element::<_, Point>(&mut Cursor::new(buffer)).unwrap(), point);

        bytes.push(0);
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &bytes).unwrap();
        assert!(matches!(
            read_element::<_, Point>(&mut Cursor::new(buffer)),
            Err(Error::MalformedElement)
        ));
    }

    #[test]
    fn truncated_ciphertext_is_an_io_error() {
        let mut rng = rand::thread_rng();
        let mut buffer = Vec::new();
        write_element(&mut buffer, &Point::random(&mut rng)).unwrap();
        assert!(matches!(
            Ciphertext::read_frames(&mut Cursor::new(buffer)),
            Err(Error::Io(_))
        ));
    }
}
