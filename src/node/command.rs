//! Metadata commands and their wire codec
//!
//! A command is the unit of log replication: one flat binary record
//! describing a single metadata mutation. The record layout is uniform
//! across variants so a single decode routine handles all of them:
//!
//! ```text
//! [TAG:1][PATH_LEN:8][PATH:n][OLD_LEN:8][OLD:n][NEW_LEN:8][NEW:n][SIZE:8]
//! ```
//!
//! Length prefixes and the size field are little-endian u64. Fields a
//! variant does not use are encoded as zero-length/zero placeholders.

use crate::common::{Error, Result};
use bytes::{Buf, BufMut};

const TAG_CREATE: u8 = 0;
const TAG_DELETE: u8 = 1;
const TAG_RENAME: u8 = 2;

/// One metadata mutation, produced on the leader and replayed on every node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create (or overwrite) a file record
    Create { path: String, size: u64 },
    /// Remove a file record; applying to an absent path is a no-op
    Delete { path: String },
    /// Drop `old_path` and insert `new_path` atomically
    Rename {
        old_path: String,
        new_path: String,
        size: u64,
    },
}

impl Command {
    /// Serialize to the flat record layout. Total and deterministic.
    pub fn encode(&self) -> Vec<u8> {
        let (tag, path, old_path, new_path, size) = match self {
            Command::Create { path, size } => (TAG_CREATE, path.as_str(), "", "", *size),
            Command::Delete { path } => (TAG_DELETE, path.as_str(), "", "", 0),
            Command::Rename {
                old_path,
                new_path,
                size,
            } => (TAG_RENAME, "", old_path.as_str(), new_path.as_str(), *size),
        };

        let mut buf =
            Vec::with_capacity(1 + 3 * 8 + path.len() + old_path.len() + new_path.len() + 8);
        buf.put_u8(tag);
        for field in [path, old_path, new_path] {
            buf.put_u64_le(field.len() as u64);
            buf.put_slice(field.as_bytes());
        }
        buf.put_u64_le(size);
        buf
    }

    /// Deserialize a record produced by [`Command::encode`].
    ///
    /// Fails with `MalformedCommand` when a declared length exceeds the
    /// remaining bytes (or a field is truncated), and `UnknownCommand` on
    /// an unrecognized tag. Never reads out of bounds.
    pub fn decode(mut buf: &[u8]) -> Result<Command> {
        if !buf.has_remaining() {
            return Err(Error::MalformedCommand("empty record".into()));
        }
        let tag = buf.get_u8();

        let path = read_string(&mut buf, "path")?;
        let old_path = read_string(&mut buf, "old_path")?;
        let new_path = read_string(&mut buf, "new_path")?;
        if buf.remaining() < 8 {
            return Err(Error::MalformedCommand("truncated size field".into()));
        }
        let size = buf.get_u64_le();

        match tag {
            TAG_CREATE => Ok(Command::Create { path, size }),
            TAG_DELETE => Ok(Command::Delete { path }),
            TAG_RENAME => Ok(Command::Rename {
                old_path,
                new_path,
                size,
            }),
            other => Err(Error::UnknownCommand(other)),
        }
    }
}

fn read_string(buf: &mut &[u8], field: &str) -> Result<String> {
    if buf.remaining() < 8 {
        return Err(Error::MalformedCommand(format!(
            "truncated length prefix for {}",
            field
        )));
    }
    let len = buf.get_u64_le();
    if len > buf.remaining() as u64 {
        return Err(Error::MalformedCommand(format!(
            "{} length {} exceeds remaining {} bytes",
            field,
            len,
            buf.remaining()
        )));
    }
    let raw = buf.copy_to_bytes(len as usize);
    String::from_utf8(raw.to_vec())
        .map_err(|_| Error::MalformedCommand(format!("{} is not valid UTF-8", field)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_create() {
        let cmd = Command::Create {
            path: "docs/report.pdf".to_string(),
            size: 4096,
        };
        assert_eq!(Command::decode(&cmd.encode()).unwrap(), cmd);
    }

    #[test]
    fn test_roundtrip_delete() {
        let cmd = Command::Delete {
            path: "tmp/scratch".to_string(),
        };
        assert_eq!(Command::decode(&cmd.encode()).unwrap(), cmd);
    }

    #[test]
    fn test_roundtrip_rename() {
        let cmd = Command::Rename {
            old_path: "a/old.txt".to_string(),
            new_path: "b/new.txt".to_string(),
            size: u64::MAX,
        };
        assert_eq!(Command::decode(&cmd.encode()).unwrap(), cmd);
    }

    #[test]
    fn test_roundtrip_empty_strings() {
        let cmd = Command::Create {
            path: String::new(),
            size: 0,
        };
        assert_eq!(Command::decode(&cmd.encode()).unwrap(), cmd);

        let cmd = Command::Rename {
            old_path: String::new(),
            new_path: String::new(),
            size: 7,
        };
        assert_eq!(Command::decode(&cmd.encode()).unwrap(), cmd);
    }

    #[test]
    fn test_unused_fields_are_placeholders() {
        // Every variant carries all four fields, so records with equal
        // string content have equal length regardless of variant.
        let create = Command::Create {
            path: "x".to_string(),
            size: 1,
        }
        .encode();
        let delete = Command::Delete {
            path: "x".to_string(),
        }
        .encode();
        assert_eq!(create.len(), delete.len());
    }

    #[test]
    fn test_decode_rejects_truncation() {
        let full = Command::Create {
            path: "some/path".to_string(),
            size: 10,
        }
        .encode();

        // Every proper prefix must fail, never panic.
        for cut in 0..full.len() {
            assert!(matches!(
                Command::decode(&full[..cut]),
                Err(Error::MalformedCommand(_))
            ));
        }
    }

    #[test]
    fn test_decode_rejects_oversized_length() {
        let mut buf = vec![TAG_DELETE];
        buf.extend_from_slice(&u64::MAX.to_le_bytes());
        buf.extend_from_slice(b"short");
        assert!(matches!(
            Command::decode(&buf),
            Err(Error::MalformedCommand(_))
        ));
    }

    #[test]
    fn test_decode_rejects_unknown_tag() {
        let mut buf = Command::Delete {
            path: "p".to_string(),
        }
        .encode();
        buf[0] = 99;
        assert!(matches!(Command::decode(&buf), Err(Error::UnknownCommand(99))));
    }
}
