//! Frame encode/decode pipeline.
//!
//! ```text
//! [len(frame_body):4][frame_body]
//! frame_body = compressed_or_raw(header || body)
//! header     = [len(packet_0):4][len(packet_1):4]...
//! body       = packet_0 packet_1 ...
//! ```

use std::sync::Arc;

use crate::base58;
use crate::compression::Registry;
use crate::error::WireError;
use crate::message::{payload_id, Message, META_PACKETS};
use crate::protocol::ProtocolIdentity;
use crate::stream::DEFAULT_MAX_FRAME_LEN;
use crate::ulong::{decode_u32be, encode_len, LENGTH_FIELD_SIZE};

/// Concatenate a header of packet lengths with the packet bytes.
pub fn pack_packets<P: AsRef<[u8]>>(packets: &[P]) -> Result<Vec<u8>, WireError> {
    let body_len: usize = packets.iter().map(|packet| packet.as_ref().len()).sum();
    let mut header = Vec::with_capacity(packets.len() * LENGTH_FIELD_SIZE + body_len);
    let mut body = Vec::with_capacity(body_len);
    for packet in packets {
        let packet = packet.as_ref();
        header.extend_from_slice(&encode_len(packet.len())?);
        body.extend_from_slice(packet);
    }
    header.extend_from_slice(&body);
    Ok(header)
}

/// Split `header || body` back into packets.
///
/// The packet count is not stored. Length fields are read until the bytes
/// consumed by length fields equal the bytes left unclaimed by the lengths
/// read so far; any buffer that cannot reach that point within bounds is
/// rejected.
pub fn parse_packets(buf: &[u8]) -> Result<Vec<&[u8]>, WireError> {
    let mut processed = 0usize;
    let mut expected = buf.len();
    let mut lengths = Vec::new();
    while processed != expected {
        let end = processed + LENGTH_FIELD_SIZE;
        if end > expected {
            return Err(WireError::malformed(format!(
                "length header overruns body at offset {processed} of {}",
                buf.len()
            )));
        }
        let len = decode_u32be(&buf[processed..end])? as usize;
        processed = end;
        expected = expected.checked_sub(len).ok_or_else(|| {
            WireError::malformed(format!("packet length {len} exceeds remaining frame"))
        })?;
        if processed > expected {
            return Err(WireError::malformed(format!(
                "packet lengths claim {} bytes past the {} byte frame",
                processed - expected,
                buf.len()
            )));
        }
        lengths.push(len);
    }

    let mut packets = Vec::with_capacity(lengths.len());
    for len in lengths {
        let end = processed + len;
        let packet = buf.get(processed..end).ok_or(WireError::InvalidLength {
            needed: len,
            available: buf.len().saturating_sub(processed),
        })?;
        packets.push(packet);
        processed = end;
    }
    log::trace!("wire: parsed {} packets from {} bytes", packets.len(), buf.len());
    Ok(packets)
}

/// Validate and remove the outer size header, unless the caller asserts the
/// buffer is already exactly one frame body.
pub fn strip_size_header(bytes: &[u8], sizeless: bool) -> Result<&[u8], WireError> {
    if sizeless {
        return Ok(bytes);
    }
    let field = bytes.get(..LENGTH_FIELD_SIZE).ok_or(WireError::InvalidLength {
        needed: LENGTH_FIELD_SIZE,
        available: bytes.len(),
    })?;
    let declared = decode_u32be(field)?;
    let body = &bytes[LENGTH_FIELD_SIZE..];
    if declared as usize != body.len() {
        return Err(WireError::SizeMismatch { declared, actual: body.len() });
    }
    Ok(body)
}

fn text_packet(packet: &[u8], what: &str) -> Result<String, WireError> {
    String::from_utf8(packet.to_vec())
        .map_err(|_| WireError::malformed(format!("{what} packet is not valid UTF-8")))
}

/// A decoded frame together with the message id it carried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub message: Message,
    /// The id as embedded by the sender; only checked against the payload
    /// when the codec verifies ids.
    pub message_id: String,
}

/// Encodes and decodes frames against a fixed compression registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCodec {
    registry: Registry,
    verify_message_ids: bool,
    max_body_len: u32,
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(Registry::default())
    }
}

impl FrameCodec {
    pub fn new(registry: Registry) -> Self {
        Self { registry, verify_message_ids: false, max_body_len: DEFAULT_MAX_FRAME_LEN }
    }

    /// Upper bound on a decompressed frame body.
    pub fn with_max_body_len(mut self, max_body_len: u32) -> Self {
        self.max_body_len = max_body_len;
        self
    }

    pub fn max_body_len(&self) -> u32 {
        self.max_body_len
    }

    /// Recompute the payload id on decode and reject frames whose embedded
    /// id disagrees.
    pub fn with_message_id_verification(mut self, enabled: bool) -> Self {
        self.verify_message_ids = enabled;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn verifies_message_ids(&self) -> bool {
        self.verify_message_ids
    }

    /// Encode everything but the outer size header.
    pub fn encode_body(&self, msg: &Message) -> Result<Vec<u8>, WireError> {
        let packed = pack_packets(&msg.packets())?;
        match msg.compression_used(&self.registry) {
            Some(method) => {
                log::debug!("wire: compressing {} byte body with {}", packed.len(), method);
                method.compress(&packed)
            }
            None => Ok(packed),
        }
    }

    /// Encode a complete, self-delimiting frame.
    pub fn encode(&self, msg: &Message) -> Result<Vec<u8>, WireError> {
        let body = self.encode_body(msg)?;
        let mut frame = Vec::with_capacity(LENGTH_FIELD_SIZE + body.len());
        frame.extend_from_slice(&encode_len(body.len())?);
        frame.extend_from_slice(&body);
        Ok(frame)
    }

    /// Decode a frame into a message. `compression` is the receiver's
    /// candidate list; the frame itself does not say how it was compressed.
    pub fn decode<S: AsRef<str>>(
        &self,
        protocol: impl Into<Arc<ProtocolIdentity>>,
        bytes: &[u8],
        sizeless: bool,
        compression: &[S],
    ) -> Result<Message, WireError> {
        self.decode_frame(protocol, bytes, sizeless, compression).map(|frame| frame.message)
    }

    /// Like [`FrameCodec::decode`], keeping the embedded message id.
    pub fn decode_frame<S: AsRef<str>>(
        &self,
        protocol: impl Into<Arc<ProtocolIdentity>>,
        bytes: &[u8],
        sizeless: bool,
        compression: &[S],
    ) -> Result<DecodedFrame, WireError> {
        let body = strip_size_header(bytes, sizeless)?;
        let decompressed;
        let body = match self.registry.select_for_decode(compression) {
            Some(method) => {
                log::debug!("wire: decompressing {} byte body with {}", body.len(), method);
                decompressed = method.decompress_with_limit(body, self.max_body_len as usize)?;
                decompressed.as_slice()
            }
            None => body,
        };

        let packets = parse_packets(body)?;
        if packets.len() < META_PACKETS {
            return Err(WireError::malformed(format!(
                "expected at least {META_PACKETS} packets, found {}",
                packets.len()
            )));
        }
        let msg_type = text_packet(packets[0], "type")?;
        let sender = text_packet(packets[1], "sender")?;
        let message_id = text_packet(packets[2], "message id")?;
        let timestamp = base58::decode_int(&text_packet(packets[3], "timestamp")?)?;
        let payload: Vec<Vec<u8>> =
            packets[META_PACKETS..].iter().map(|packet| packet.to_vec()).collect();

        if self.verify_message_ids {
            let computed = payload_id(&payload);
            if computed != message_id {
                return Err(WireError::ChecksumMismatch { embedded: message_id, computed });
            }
        }

        log::debug!(
            "wire: decoded {:?} from {:?} with {} payload packets",
            msg_type,
            sender,
            payload.len()
        );
        let compression = compression.iter().map(|name| name.as_ref().to_string()).collect();
        let message =
            Message::with_timestamp(protocol, msg_type, sender, payload, compression, timestamp);
        Ok(DecodedFrame { message, message_id })
    }
}
