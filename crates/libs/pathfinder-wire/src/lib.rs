//! # pathfinder-wire
//!
//! Self-describing binary message frames for the pathfinder peer-to-peer
//! network.
//!
//! A [`Message`] is a type tag, a sender, a timestamp and an ordered list of
//! opaque payload packets. On the wire every packet is length-prefixed and
//! the whole body is optionally compressed and prefixed with its own length,
//! so a stream reader always knows where one frame ends.
//!
//! ## Wire Format
//!
//! ```text
//! [len(frame_body):4][frame_body]
//! frame_body = compressed_or_raw(header || body)
//! packets    = [msg_type, sender, message_id, timestamp_base58, payload_0, ...]
//! ```
//!
//! All lengths are big-endian `u32`. The frame carries no compression tag;
//! sender and receiver agree on candidates out of band.
//!
//! ## Example
//!
//! ```rust
//! use pathfinder_wire::{Message, ProtocolIdentity};
//!
//! let protocol = ProtocolIdentity::new("hi", "Plaintext");
//! let msg = Message::from_text_payload(
//!     protocol.clone(),
//!     "test",
//!     "test sender",
//!     ["test1", "test2"],
//!     vec!["zlib".to_string()],
//! );
//! let frame = msg.to_bytes().expect("encode");
//! let decoded = Message::from_bytes(protocol, &frame, false, &["zlib"]).expect("decode");
//! assert_eq!(decoded.payload(), msg.payload());
//! ```

pub mod base58;
pub mod compression;
pub mod config;
mod error;
pub mod frame;
pub mod message;
pub mod protocol;
pub mod stream;
pub mod ulong;

pub use compression::{Compression, Registry};
pub use config::CodecConfig;
pub use error::{ConfigError, WireError};
pub use frame::{DecodedFrame, FrameCodec};
pub use message::Message;
pub use protocol::ProtocolIdentity;
pub use stream::FrameReader;
