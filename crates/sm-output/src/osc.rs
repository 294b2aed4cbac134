//! Minimal OSC 1.0 message codec.
//!
//! Only what the renderer protocol needs: one message per packet (no
//! bundles), `f` (float32) and `i` (int32) arguments.
//!
//! Wire format:
//!
//! ```text
//! [address, NUL-terminated, padded to 4] [",ff…", NUL-terminated, padded to 4] [args, big-endian]
//! ```

use crate::{OutputError, OutputResult};

/// One OSC argument.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OscArg {
    Float(f32),
    Int(i32),
}

impl OscArg {
    fn tag(self) -> u8 {
        match self {
            OscArg::Float(_) => b'f',
            OscArg::Int(_) => b'i',
        }
    }
}

/// An address plus its arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct OscMessage {
    address: String,
    args:    Vec<OscArg>,
}

impl OscMessage {
    /// A message with no arguments yet.
    ///
    /// The address must start with `/` and contain no NUL byte.
    pub fn new(address: impl Into<String>) -> OutputResult<Self> {
        let address = address.into();
        if !address.starts_with('/') {
            return Err(OutputError::Encode(format!("address {address:?} must start with '/'")));
        }
        if address.contains('\0') {
            return Err(OutputError::Encode(format!("address {address:?} contains NUL")));
        }
        Ok(Self { address, args: Vec::new() })
    }

    pub fn float(mut self, value: f32) -> Self {
        self.args.push(OscArg::Float(value));
        self
    }

    pub fn floats(mut self, values: [f32; 3]) -> Self {
        self.args.extend(values.map(OscArg::Float));
        self
    }

    pub fn int(mut self, value: i32) -> Self {
        self.args.push(OscArg::Int(value));
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn args(&self) -> &[OscArg] {
        &self.args
    }

    /// Append the encoded packet to `buf`.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        write_padded_str(buf, self.address.as_bytes());
        let mut tags = Vec::with_capacity(self.args.len() + 1);
        tags.push(b',');
        tags.extend(self.args.iter().map(|a| a.tag()));
        write_padded_str(buf, &tags);
        for arg in &self.args {
            match *arg {
                OscArg::Float(v) => buf.extend_from_slice(&v.to_be_bytes()),
                OscArg::Int(v) => buf.extend_from_slice(&v.to_be_bytes()),
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(padded_len(self.address.len()) + 8 + 4 * self.args.len());
        self.encode_into(&mut buf);
        buf
    }

    /// Parse one packet.  Rejects bundles and unsupported type tags.
    pub fn decode(bytes: &[u8]) -> OutputResult<Self> {
        let mut pos = 0;
        let address = read_padded_str(bytes, &mut pos)?;
        let tags = read_padded_str(bytes, &mut pos)?;
        let Some(tags) = tags.strip_prefix(',') else {
            return Err(OutputError::Encode(format!("type tag {tags:?} lacks leading ','")));
        };

        let mut msg = Self::new(address)?;
        for tag in tags.bytes() {
            let word = bytes
                .get(pos..pos + 4)
                .ok_or_else(|| OutputError::Encode("truncated argument".into()))?;
            let word = [word[0], word[1], word[2], word[3]];
            pos += 4;
            msg.args.push(match tag {
                b'f' => OscArg::Float(f32::from_be_bytes(word)),
                b'i' => OscArg::Int(i32::from_be_bytes(word)),
                other => {
                    return Err(OutputError::Encode(format!(
                        "unsupported type tag {:?}",
                        other as char
                    )));
                }
            });
        }
        Ok(msg)
    }
}

/// Length of a string once NUL-terminated and padded to a multiple of 4.
fn padded_len(len: usize) -> usize {
    (len + 4) & !3
}

fn write_padded_str(buf: &mut Vec<u8>, s: &[u8]) {
    buf.extend_from_slice(s);
    buf.resize(buf.len() + padded_len(s.len()) - s.len(), 0);
}

fn read_padded_str(bytes: &[u8], pos: &mut usize) -> OutputResult<String> {
    let rest = bytes.get(*pos..).unwrap_or_default();
    let len = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| OutputError::Encode("unterminated string".into()))?;
    let s = std::str::from_utf8(&rest[..len])
        .map_err(|e| OutputError::Encode(format!("string is not UTF-8: {e}")))?;
    *pos += padded_len(len);
    if *pos > bytes.len() {
        return Err(OutputError::Encode("string padding past end of packet".into()));
    }
    Ok(s.to_owned())
}
