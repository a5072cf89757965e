//! Binary scene codec.
//!
//! Layout: a 4-byte magic, a little-endian `u16` format version, then the
//! bincode-encoded tree. The header exists so a stale on-disk format decodes
//! as a clean [`CodecError`]. Callers treat every decode failure as a cache
//! miss, never as a fatal error.

use crate::node::SceneNode;
use std::fmt;

const MAGIC: &[u8; 4] = b"FFSC";
const FORMAT_VERSION: u16 = 1;
const HEADER_LEN: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    TruncatedHeader,
    BadMagic,
    VersionMismatch { found: u16 },
    Payload(String),
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedHeader => write!(f, "scene payload shorter than its header"),
            Self::BadMagic => write!(f, "scene payload has wrong magic bytes"),
            Self::VersionMismatch { found } => {
                write!(
                    f,
                    "scene format version {found} does not match {FORMAT_VERSION}"
                )
            }
            Self::Payload(msg) => write!(f, "scene payload is corrupt: {msg}"),
        }
    }
}

impl std::error::Error for CodecError {}

/// Encodes a tree, dropping transient state (live shadow handles, callback
/// bindings) by construction.
pub fn encode(tree: &SceneNode) -> Result<Vec<u8>, CodecError> {
    let body = bincode::serialize(tree).map_err(|e| CodecError::Payload(e.to_string()))?;
    let mut out = Vec::with_capacity(HEADER_LEN + body.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&body);
    Ok(out)
}

/// Decodes a tree. Tags, view names, structure, props, frames, shadows, and
/// method calls come back intact; callback refs come back detached.
pub fn decode(bytes: &[u8]) -> Result<SceneNode, CodecError> {
    if bytes.len() < HEADER_LEN {
        return Err(CodecError::TruncatedHeader);
    }
    if &bytes[..4] != MAGIC {
        return Err(CodecError::BadMagic);
    }
    let found = u16::from_le_bytes([bytes[4], bytes[5]]);
    if found != FORMAT_VERSION {
        return Err(CodecError::VersionMismatch { found });
    }
    bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|e| CodecError::Payload(e.to_string()))
}
