use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use pathfinder_wire::{CodecConfig, DecodedFrame, FrameCodec, Message, ProtocolIdentity};

pub fn encode(codec: &FrameCodec, msg: &Message, sizeless: bool) -> Result<String> {
    let bytes = if sizeless { codec.encode_body(msg)? } else { codec.encode(msg)? };
    log::info!("encoded {} byte frame for message {}", bytes.len(), msg.id());
    Ok(hex::encode(bytes))
}

pub fn decode(
    codec: &FrameCodec,
    protocol: ProtocolIdentity,
    frame_hex: &str,
    sizeless: bool,
    compression: &[String],
) -> Result<String> {
    let bytes = hex::decode(frame_hex.trim()).context("frame is not valid hex")?;
    let frame = codec
        .decode_frame(protocol, &bytes, sizeless, compression)
        .context("failed to decode frame")?;
    Ok(render(&frame))
}

/// Split a file of back-to-back frames and summarise each one.
pub fn split(
    config: &CodecConfig,
    protocol: ProtocolIdentity,
    path: &Path,
    compression: &[String],
) -> Result<String> {
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let codec = config.build_codec()?;
    let mut reader = config.build_reader();
    reader.push(&data);

    let mut out = String::new();
    let mut index = 0usize;
    while let Some(body) = reader.next_frame()? {
        let frame = codec
            .decode_frame(protocol.clone(), &body, true, compression)
            .with_context(|| format!("frame {index} did not decode"))?;
        let _ = writeln!(
            out,
            "#{index} {} bytes type={} sender={} packets={}",
            body.len(),
            frame.message.msg_type(),
            frame.message.sender(),
            frame.message.payload().len()
        );
        index += 1;
    }
    if reader.buffered() > 0 {
        bail!("{} trailing bytes do not form a complete frame", reader.buffered());
    }
    Ok(out)
}

fn render_packet(packet: &[u8]) -> String {
    match std::str::from_utf8(packet) {
        Ok(text) if !text.chars().any(char::is_control) => format!("{text:?}"),
        _ => format!("0x{}", hex::encode(packet)),
    }
}

pub fn render(frame: &DecodedFrame) -> String {
    let msg = &frame.message;
    let mut out = String::new();
    let _ = writeln!(out, "type:      {}", msg.msg_type());
    let _ = writeln!(out, "sender:    {}", msg.sender());
    let _ = writeln!(out, "timestamp: {}", msg.timestamp());
    let _ = writeln!(out, "id:        {}", frame.message_id);
    for (index, packet) in msg.payload().iter().enumerate() {
        let _ = writeln!(out, "payload[{index}]: {}", render_packet(packet));
    }
    out
}
