use std::{fs, io, path::Path};

/// Contents of a file that is expected to be HTML.
#[derive(Debug, PartialEq, Eq)]
pub enum Payload {
    Html(String),
    /// Not valid UTF-8; the bytes are kept so they can be copied as-is.
    Opaque(Vec<u8>),
}

impl Payload {
    pub fn read(path: &Path) -> io::Result<Self> {
        Ok(Self::decode(fs::read(path)?))
    }

    pub fn decode(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => Payload::Html(text),
            Err(e) => Payload::Opaque(e.into_bytes()),
        }
    }
}
