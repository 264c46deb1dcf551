use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::feedback::PacketError;
use crate::framework::NodeName;
use crate::util::{pad_address, strip_address};

/// width of the destination field
pub const DST_LENGTH: usize = 5;
/// width of the protocol field
pub const PROT_LENGTH: usize = 1;
/// destination used for route advertisements, travels as `00000`
pub const BROADCAST: &str = "0";

/// A serialized packet, as it sits in an interface queue
pub type Frame = Vec<u8>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Data,
    /// route advertisement
    Control,
}

impl Protocol {
    pub fn tag(self) -> u8 {
        match self {
            Protocol::Data => b'1',
            Protocol::Control => b'2',
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self, PacketError> {
        match tag {
            b'1' => Ok(Protocol::Data),
            b'2' => Ok(Protocol::Control),
            other => Err(PacketError::UnknownProtocol(other as char)),
        }
    }
}

/// Network layer packet
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkPacket {
    pub dst: NodeName,
    pub prot: Protocol,
    pub payload: Vec<u8>,
}

impl NetworkPacket {
    pub fn new(dst: impl Into<NodeName>, prot: Protocol, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            dst: dst.into(),
            prot,
            payload: payload.into(),
        }
    }

    pub fn data(dst: impl Into<NodeName>, payload: impl Into<Vec<u8>>) -> Self {
        Self::new(dst, Protocol::Data, payload)
    }

    /// a route advertisement, always addressed to [`BROADCAST`]
    pub fn control(payload: impl Into<Vec<u8>>) -> Self {
        Self::new(BROADCAST, Protocol::Control, payload)
    }

    /// `zeropad(dst, 5) + tag + payload`
    pub fn encode(&self) -> Result<Frame, PacketError> {
        let field = pad_address(&self.dst).ok_or_else(|| PacketError::DestinationTooWide {
            dst: self.dst.clone(),
            width: DST_LENGTH,
        })?;
        // a multibyte name can be narrow enough in chars but too wide in bytes
        if field.len() != DST_LENGTH {
            return Err(PacketError::DestinationTooWide {
                dst: self.dst.clone(),
                width: DST_LENGTH,
            });
        }
        let mut frame = Vec::with_capacity(DST_LENGTH + PROT_LENGTH + self.payload.len());
        frame.extend_from_slice(field.as_bytes());
        frame.push(self.prot.tag());
        frame.extend_from_slice(&self.payload);
        Ok(frame)
    }

    pub fn decode(frame: &[u8]) -> Result<Self, PacketError> {
        if frame.len() < DST_LENGTH + PROT_LENGTH {
            return Err(PacketError::Truncated(frame.len()));
        }
        let (field, rest) = frame.split_at(DST_LENGTH);
        let field = std::str::from_utf8(field).map_err(|_| PacketError::InvalidUtf8)?;
        let prot = Protocol::from_tag(rest[0])?;
        Ok(Self {
            dst: strip_address(field).to_string(),
            prot,
            payload: rest[PROT_LENGTH..].to_vec(),
        })
    }

    pub fn payload_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

impl Display for NetworkPacket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tag = self.prot.tag() as char;
        match pad_address(&self.dst) {
            Some(field) => write!(f, "{field}{tag}{}", self.payload_str()),
            None => write!(f, "{}{tag}{}", self.dst, self.payload_str()),
        }
    }
}
