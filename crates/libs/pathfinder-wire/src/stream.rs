use crate::error::WireError;
use crate::ulong::{decode_u32be, LENGTH_FIELD_SIZE};

/// Largest frame body accepted by default.
pub const DEFAULT_MAX_FRAME_LEN: u32 = 16 * 1024 * 1024;

/// Splits a byte stream into frame bodies.
///
/// Bytes arrive in arbitrary chunks via [`FrameReader::push`]; each call to
/// [`FrameReader::next_frame`] yields one complete body with its size header
/// removed, ready for a sizeless decode.
#[derive(Debug)]
pub struct FrameReader {
    buffer: Vec<u8>,
    /// Start of the unread bytes in `buffer`.
    start: usize,
    max_frame_len: u32,
}

impl FrameReader {
    pub fn new(max_frame_len: u32) -> Self {
        Self { buffer: Vec::new(), start: 0, max_frame_len }
    }

    pub fn max_frame_len(&self) -> u32 {
        self.max_frame_len
    }

    pub fn push(&mut self, data: &[u8]) {
        if self.start > 0 {
            self.buffer.drain(..self.start);
            self.start = 0;
        }
        self.buffer.extend_from_slice(data);
    }

    /// Bytes held that do not yet form a complete frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len() - self.start
    }

    /// Pop the next complete frame body, or `None` until more bytes arrive.
    ///
    /// A size header above the configured limit is an error; the stream
    /// cannot be resynchronised after it and should be dropped.
    pub fn next_frame(&mut self) -> Result<Option<Vec<u8>>, WireError> {
        let pending = &self.buffer[self.start..];
        let Some(field) = pending.get(..LENGTH_FIELD_SIZE) else {
            return Ok(None);
        };
        let declared = decode_u32be(field)?;
        if declared > self.max_frame_len {
            log::warn!("stream: rejecting {} byte frame (limit {})", declared, self.max_frame_len);
            return Err(WireError::FrameTooLarge { declared, limit: self.max_frame_len });
        }
        let end = LENGTH_FIELD_SIZE + declared as usize;
        if pending.len() < end {
            log::trace!("stream: waiting for {} more bytes", end - pending.len());
            return Ok(None);
        }
        let body = pending[LENGTH_FIELD_SIZE..end].to_vec();
        self.start += end;
        if self.start == self.buffer.len() {
            self.buffer.clear();
            self.start = 0;
        }
        Ok(Some(body))
    }

    /// Pop every complete frame body currently buffered.
    pub fn drain_frames(&mut self) -> Result<Vec<Vec<u8>>, WireError> {
        let mut frames = Vec::new();
        while let Some(frame) = self.next_frame()? {
            frames.push(frame);
        }
        Ok(frames)
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(body: &[u8]) -> Vec<u8> {
        let mut out = (body.len() as u32).to_be_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn waits_for_a_complete_frame() {
        let mut reader = FrameReader::default();
        let bytes = frame(b"hello");
        reader.push(&bytes[..2]);
        assert_eq!(reader.next_frame().expect("frame"), None);
        reader.push(&bytes[2..6]);
        assert_eq!(reader.next_frame().expect("frame"), None);
        reader.push(&bytes[6..]);
        assert_eq!(reader.next_frame().expect("frame"), Some(b"hello".to_vec()));
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn splits_back_to_back_frames() {
        let mut reader = FrameReader::default();
        let mut bytes = frame(b"one");
        bytes.extend(frame(b""));
        bytes.extend(frame(b"three"));
        bytes.extend_from_slice(&[0, 0]);
        reader.push(&bytes);
        let frames = reader.drain_frames().expect("frames");
        assert_eq!(frames, vec![b"one".to_vec(), Vec::new(), b"three".to_vec()]);
        assert_eq!(reader.buffered(), 2);
    }

    #[test]
    fn keeps_partial_frame_across_pushes() {
        let mut reader = FrameReader::default();
        let mut bytes = Vec::new();
        for index in 0..1000u32 {
            bytes.extend(frame(&index.to_be_bytes()));
        }
        let tail = frame(b"tail");
        bytes.extend_from_slice(&tail[..3]);
        reader.push(&bytes);

        let frames = reader.drain_frames().expect("frames");
        assert_eq!(frames.len(), 1000);
        assert_eq!(frames[999], 999u32.to_be_bytes());
        assert_eq!(reader.buffered(), 3);

        reader.push(&tail[3..]);
        assert_eq!(reader.next_frame().expect("tail"), Some(b"tail".to_vec()));
        assert_eq!(reader.buffered(), 0);
    }

    #[test]
    fn rejects_oversized_frames() {
        let mut reader = FrameReader::new(8);
        reader.push(&frame(&[0u8; 9]));
        assert!(matches!(
            reader.next_frame(),
            Err(WireError::FrameTooLarge { declared: 9, limit: 8 })
        ));
    }
}
