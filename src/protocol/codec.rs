use bytes::BytesMut;
use log::{debug, warn};
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

use crate::error::ProtocolError;
use crate::protocol::frame::Frame;

/// Longest line accepted from the peer, terminator excluded.
pub const MAX_FRAME_BYTES: usize = 4096;

/// Newline-delimited framing for [`Frame`]s.
///
/// Reads are buffered until a whole line is available, so the peer's writes
/// may be split or coalesced freely. Lines that are too long, malformed, or
/// start with an unknown keyword are logged and skipped; only I/O failures
/// surface as errors.
#[derive(Debug)]
pub struct FrameCodec {
    lines: LinesCodec,
}

impl FrameCodec {
    pub fn new() -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(MAX_FRAME_BYTES),
        }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        loop {
            match self.lines.decode(src) {
                Ok(Some(line)) => {
                    if let Some(frame) = accept(&line) {
                        return Ok(Some(frame));
                    }
                }
                Ok(None) => return Ok(None),
                Err(err) => skip_or_fail(err)?,
            }
        }
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, ProtocolError> {
        loop {
            match self.lines.decode_eof(src) {
                Ok(Some(line)) => {
                    if let Some(frame) = accept(&line) {
                        return Ok(Some(frame));
                    }
                }
                Ok(None) => return Ok(None),
                Err(err) => skip_or_fail(err)?,
            }
        }
    }
}

impl Encoder<Frame> for FrameCodec {
    type Error = ProtocolError;

    fn encode(&mut self, frame: Frame, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        self.lines
            .encode(frame.to_string(), dst)
            .map_err(|err| match err {
                LinesCodecError::Io(err) => ProtocolError::Io(err),
                LinesCodecError::MaxLineLengthExceeded => ProtocolError::FrameTooLong(MAX_FRAME_BYTES),
            })
    }
}

fn accept(line: &str) -> Option<Frame> {
    match Frame::parse(line) {
        Ok(Some(frame)) => Some(frame),
        Ok(None) => {
            debug!("Ignoring unrecognized frame: {:?}", line);
            None
        }
        Err(e) => {
            warn!("Dropping malformed frame {:?}: {}", line, e);
            None
        }
    }
}

fn skip_or_fail(err: LinesCodecError) -> Result<(), ProtocolError> {
    match err {
        LinesCodecError::MaxLineLengthExceeded => {
            warn!("{}", ProtocolError::FrameTooLong(MAX_FRAME_BYTES));
            Ok(())
        }
        LinesCodecError::Io(err) => Err(ProtocolError::Io(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(codec: &mut FrameCodec, buf: &mut BytesMut) -> Vec<Frame> {
        let mut frames = Vec::new();
        while let Some(frame) = codec.decode(buf).unwrap() {
            frames.push(frame);
        }
        frames
    }

    #[test]
    fn waits_for_the_newline() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("MOVE ");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"4\nCHA");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::Move(4)));
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        buf.extend_from_slice(b"T hi there\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Frame::Chat("hi there".into())));
    }

    #[test]
    fn coalesced_writes_yield_every_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("NAME Bob\nMOVE 0\nRESET\n");
        assert_eq!(
            decode_all(&mut codec, &mut buf),
            vec![Frame::Name("Bob".into()), Frame::Move(0), Frame::Reset]
        );
    }

    #[test]
    fn junk_lines_are_skipped() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("PING\nMOVE eleven\n\nDRAW\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec![Frame::Draw]);
    }

    #[test]
    fn overlong_line_is_discarded() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        buf.extend_from_slice(b"CHAT ");
        buf.extend_from_slice(&vec![b'a'; MAX_FRAME_BYTES + 10]);
        buf.extend_from_slice(b"\nMOVE 2\n");
        assert_eq!(decode_all(&mut codec, &mut buf), vec![Frame::Move(2)]);
    }

    #[test]
    fn trailing_frame_without_newline_at_eof() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::from("TIMEOUT Alice");
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), Some(Frame::Timeout("Alice".into())));
        assert_eq!(codec.decode_eof(&mut buf).unwrap(), None);
    }

    #[test]
    fn encodes_one_line_per_frame() {
        let mut codec = FrameCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(Frame::Move(7), &mut buf).unwrap();
        codec.encode(Frame::Winner("Alice".into()), &mut buf).unwrap();
        assert_eq!(&buf[..], b"MOVE 7\nWINNER Alice\n");
    }
}
