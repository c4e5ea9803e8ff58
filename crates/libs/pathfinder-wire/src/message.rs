use std::borrow::Cow;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha384};

use crate::base58;
use crate::compression::{Compression, Registry};
use crate::error::WireError;
use crate::frame::FrameCodec;
use crate::protocol::ProtocolIdentity;

/// Number of metadata packets preceding the payload in every frame:
/// type, sender, message id, timestamp.
pub const META_PACKETS: usize = 4;

pub(crate) fn now_epoch_secs() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

/// Base58 of SHA-384 over the payload entries joined without separators.
///
/// The hash covers joined content, not framing: `["ab", "c"]` and
/// `["a", "bc"]` share an id.
pub fn payload_id<P: AsRef<[u8]>>(payload: &[P]) -> String {
    let mut hasher = Sha384::new();
    for packet in payload {
        hasher.update(packet.as_ref());
    }
    base58::encode_bytes(&hasher.finalize())
}

/// A typed, multi-part message exchanged between peers.
///
/// Values are immutable once built. Changing the compression candidates
/// produces a new message through [`Message::with_compression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    protocol: Arc<ProtocolIdentity>,
    msg_type: String,
    sender: String,
    payload: Vec<Vec<u8>>,
    timestamp: u64,
    compression: Vec<String>,
    compression_failed: bool,
}

impl Message {
    /// Build a message stamped with the current UTC second.
    pub fn new(
        protocol: impl Into<Arc<ProtocolIdentity>>,
        msg_type: impl Into<String>,
        sender: impl Into<String>,
        payload: Vec<Vec<u8>>,
        compression: Vec<String>,
    ) -> Self {
        Self::with_timestamp(protocol, msg_type, sender, payload, compression, now_epoch_secs())
    }

    /// Build a message from text payload entries, stamped with the current
    /// UTC second.
    pub fn from_text_payload<I, S>(
        protocol: impl Into<Arc<ProtocolIdentity>>,
        msg_type: impl Into<String>,
        sender: impl Into<String>,
        payload: I,
        compression: Vec<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let payload = payload.into_iter().map(|entry| entry.as_ref().as_bytes().to_vec()).collect();
        Self::new(protocol, msg_type, sender, payload, compression)
    }

    /// Build a message with an explicit timestamp, e.g. when replaying a
    /// stored message.
    pub fn with_timestamp(
        protocol: impl Into<Arc<ProtocolIdentity>>,
        msg_type: impl Into<String>,
        sender: impl Into<String>,
        payload: Vec<Vec<u8>>,
        compression: Vec<String>,
        timestamp: u64,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            msg_type: msg_type.into(),
            sender: sender.into(),
            payload,
            timestamp,
            compression,
            compression_failed: false,
        }
    }

    /// Same message with a different compression candidate list.
    pub fn with_compression<I, S>(&self, compression: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { compression: compression.into_iter().map(Into::into).collect(), ..self.clone() }
    }

    pub fn protocol(&self) -> &Arc<ProtocolIdentity> {
        &self.protocol
    }

    pub fn msg_type(&self) -> &str {
        &self.msg_type
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn payload(&self) -> &[Vec<u8>] {
        &self.payload
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn compression(&self) -> &[String] {
        &self.compression
    }

    /// Reserved; no current operation sets it.
    pub fn compression_failed(&self) -> bool {
        self.compression_failed
    }

    /// Content fingerprint of the payload. See [`payload_id`].
    pub fn id(&self) -> String {
        payload_id(&self.payload)
    }

    /// The timestamp as it appears in the frame.
    pub fn timestamp_text(&self) -> String {
        base58::encode_int(self.timestamp)
    }

    /// The algorithm [`Message::to_bytes`] applies under `registry`.
    pub fn compression_used(&self, registry: &Registry) -> Option<Compression> {
        registry.select_for_encode(self.compression.as_slice())
    }

    /// Packets in wire order: type, sender, id, timestamp, then payload.
    pub fn packets(&self) -> Vec<Cow<'_, [u8]>> {
        let mut packets = Vec::with_capacity(META_PACKETS + self.payload.len());
        packets.push(Cow::Borrowed(self.msg_type.as_bytes()));
        packets.push(Cow::Borrowed(self.sender.as_bytes()));
        packets.push(Cow::Owned(self.id().into_bytes()));
        packets.push(Cow::Owned(self.timestamp_text().into_bytes()));
        packets.extend(self.payload.iter().map(|entry| Cow::Borrowed(entry.as_slice())));
        packets
    }

    /// Encode with the default registry.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        FrameCodec::default().encode(self)
    }

    /// Total length of [`Message::to_bytes`], size header included.
    pub fn frame_len(&self) -> Result<usize, WireError> {
        self.to_bytes().map(|frame| frame.len())
    }

    /// Decode with the default registry.
    pub fn from_bytes<S: AsRef<str>>(
        protocol: impl Into<Arc<ProtocolIdentity>>,
        bytes: &[u8],
        sizeless: bool,
        compression: &[S],
    ) -> Result<Self, WireError> {
        FrameCodec::default().decode(protocol, bytes, sizeless, compression)
    }
}
