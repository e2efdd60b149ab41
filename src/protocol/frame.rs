use std::fmt;

use crate::error::ProtocolError;
use crate::game::CELL_COUNT;

/// One protocol message. On the wire a frame is a single line:
/// the kind keyword, then a space and the payload if it has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Display name of the sender.
    Name(String),
    /// Cell index the sender just marked.
    Move(usize),
    /// Free text; the payload is the rest of the line.
    Chat(String),
    Reset,
    /// Display name of the winner.
    Winner(String),
    Draw,
    /// Display name of the peer whose turn timer ran out.
    Timeout(String),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Name(_) => "NAME",
            Frame::Move(_) => "MOVE",
            Frame::Chat(_) => "CHAT",
            Frame::Reset => "RESET",
            Frame::Winner(_) => "WINNER",
            Frame::Draw => "DRAW",
            Frame::Timeout(_) => "TIMEOUT",
        }
    }

    /// Parses one line without its terminator.
    ///
    /// `Ok(None)` means the leading keyword is not part of the grammar. Such
    /// lines are skipped rather than treated as errors so that a peer speaking
    /// a newer dialect does not break the session.
    pub fn parse(line: &str) -> Result<Option<Frame>, ProtocolError> {
        let (kind, payload) = match line.split_once(' ') {
            Some((kind, payload)) => (kind, payload),
            None => (line, ""),
        };
        let frame = match kind {
            "NAME" => Frame::Name(text_payload("NAME", payload)?),
            "MOVE" => Frame::Move(cell_payload(payload)?),
            "CHAT" => Frame::Chat(text_payload("CHAT", payload)?),
            "RESET" => Frame::Reset,
            "WINNER" => Frame::Winner(text_payload("WINNER", payload)?),
            "DRAW" => Frame::Draw,
            "TIMEOUT" => Frame::Timeout(text_payload("TIMEOUT", payload)?),
            _ => return Ok(None),
        };
        Ok(Some(frame))
    }

    fn payload(&self) -> Option<String> {
        match self {
            Frame::Name(text) | Frame::Chat(text) | Frame::Winner(text) | Frame::Timeout(text) => {
                Some(single_line(text))
            }
            Frame::Move(cell) => Some(cell.to_string()),
            Frame::Reset | Frame::Draw => None,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload() {
            Some(payload) => write!(f, "{} {}", self.kind(), payload),
            None => f.write_str(self.kind()),
        }
    }
}

fn text_payload(kind: &'static str, payload: &str) -> Result<String, ProtocolError> {
    if payload.is_empty() {
        return Err(ProtocolError::MissingPayload(kind));
    }
    Ok(payload.to_string())
}

fn cell_payload(payload: &str) -> Result<usize, ProtocolError> {
    let trimmed = payload.trim();
    if trimmed.is_empty() {
        return Err(ProtocolError::MissingPayload("MOVE"));
    }
    match trimmed.parse::<usize>() {
        Ok(cell) if cell < CELL_COUNT => Ok(cell),
        _ => Err(ProtocolError::InvalidCell(trimmed.to_string())),
    }
}

/// Line breaks would split the frame, so they travel as spaces.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_survives_encoding() {
        let frames = [
            Frame::Name("Alice".into()),
            Frame::Move(8),
            Frame::Chat("good luck, have fun".into()),
            Frame::Reset,
            Frame::Winner("Bob the Builder".into()),
            Frame::Draw,
            Frame::Timeout("Alice".into()),
        ];
        for frame in frames {
            let line = frame.to_string();
            assert_eq!(Frame::parse(&line).unwrap(), Some(frame), "line {line:?}");
        }
    }

    #[test]
    fn wire_text_matches_grammar() {
        assert_eq!(Frame::Name("Alice".into()).to_string(), "NAME Alice");
        assert_eq!(Frame::Move(4).to_string(), "MOVE 4");
        assert_eq!(Frame::Reset.to_string(), "RESET");
        assert_eq!(Frame::Chat("two\nlines".into()).to_string(), "CHAT two lines");
    }

    #[test]
    fn chat_keeps_inner_whitespace() {
        assert_eq!(
            Frame::parse("CHAT  spaced   out ").unwrap(),
            Some(Frame::Chat(" spaced   out ".into()))
        );
    }

    #[test]
    fn unknown_keywords_are_skipped() {
        assert_eq!(Frame::parse("HELLO there").unwrap(), None);
        assert_eq!(Frame::parse("").unwrap(), None);
        assert_eq!(Frame::parse("move 3").unwrap(), None);
    }

    #[test]
    fn malformed_moves_are_errors() {
        assert!(matches!(Frame::parse("MOVE x"), Err(ProtocolError::InvalidCell(_))));
        assert!(matches!(Frame::parse("MOVE 9"), Err(ProtocolError::InvalidCell(_))));
        assert!(matches!(Frame::parse("MOVE -1"), Err(ProtocolError::InvalidCell(_))));
        assert!(matches!(Frame::parse("MOVE"), Err(ProtocolError::MissingPayload("MOVE"))));
    }

    #[test]
    fn text_frames_need_a_payload() {
        assert!(matches!(Frame::parse("NAME"), Err(ProtocolError::MissingPayload("NAME"))));
        assert!(matches!(Frame::parse("CHAT "), Err(ProtocolError::MissingPayload("CHAT"))));
        assert_eq!(Frame::parse("DRAW").unwrap(), Some(Frame::Draw));
    }
}
