//! Newline framing over a byte stream that may split lines anywhere.

/// Upper bound on a buffered partial line. APRS-IS lines are a few hundred
/// bytes; anything longer is flushed as-is instead of growing without bound.
pub const MAX_PENDING_BYTES: usize = 16 * 1024;

#[derive(Debug, PartialEq, Eq)]
pub enum Segment {
    /// A `\n` terminated line with the terminator (and any `\r`) removed.
    CompleteLine(String),
    /// Bytes after the last `\n`, waiting for the rest of the line.
    PendingFragment(Vec<u8>),
}

#[must_use]
pub fn split_segments(bytes: &[u8]) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut rest = bytes;

    while let Some(position) = rest.iter().position(|&byte| byte == b'\n') {
        segments.push(Segment::CompleteLine(decode_line(&rest[..position])));
        rest = &rest[position + 1..];
    }
    if !rest.is_empty() {
        segments.push(Segment::PendingFragment(rest.to_vec()));
    }
    segments
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Per-connection residual buffer. Feed it every chunk read from the socket
/// and it hands back the complete, non-empty lines in arrival order.
#[derive(Debug, Default)]
pub struct LineFramer {
    residual: Vec<u8>,
}

impl LineFramer {
    #[must_use]
    pub fn new() -> Self {
        LineFramer::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.residual.extend_from_slice(chunk);
        let buffered = std::mem::take(&mut self.residual);

        let mut lines = Vec::new();
        for segment in split_segments(&buffered) {
            match segment {
                Segment::CompleteLine(line) if line.is_empty() => {}
                Segment::CompleteLine(line) => lines.push(line),
                Segment::PendingFragment(fragment) if fragment.len() > MAX_PENDING_BYTES => {
                    log::warn!(
                        "Flushing {} bytes without a line terminator",
                        fragment.len()
                    );
                    lines.push(decode_line(&fragment));
                }
                Segment::PendingFragment(fragment) => self.residual = fragment,
            }
        }
        lines
    }

    #[must_use]
    pub fn pending(&self) -> &[u8] {
        &self.residual
    }
}

#[cfg(test)]
mod tests {
    use super::{LineFramer, MAX_PENDING_BYTES, Segment, split_segments};

    #[test]
    fn when_splitting_then_complete_lines_and_trailing_fragment_are_tagged() {
        let segments = split_segments(b"# keepalive\r\nA>B:body\r\nPART");
        assert_eq!(
            segments,
            vec![
                Segment::CompleteLine(String::from("# keepalive")),
                Segment::CompleteLine(String::from("A>B:body")),
                Segment::PendingFragment(b"PART".to_vec()),
            ]
        );
    }

    #[test]
    fn when_line_is_split_across_chunks_then_it_is_reassembled() {
        let mut framer = LineFramer::new();

        assert_eq!(framer.push(b"FLRDDA5BA>APRS,qAS,LF"), Vec::<String>::new());
        assert_eq!(framer.pending(), b"FLRDDA5BA>APRS,qAS,LF");

        let lines = framer.push(b"MX:/160829h\r\n# next\r");
        assert_eq!(lines, vec![String::from("FLRDDA5BA>APRS,qAS,LFMX:/160829h")]);
        assert_eq!(framer.pending(), b"# next\r");

        let lines = framer.push(b"\n");
        assert_eq!(lines, vec![String::from("# next")]);
        assert!(framer.pending().is_empty());
    }

    #[test]
    fn when_multibyte_character_is_split_then_it_is_decoded_once_complete() {
        let mut framer = LineFramer::new();
        let text = "# Zürich\n".as_bytes();
        // split inside the two-byte 'ü'
        let lines_a = framer.push(&text[..4]);
        let lines_b = framer.push(&text[4..]);

        assert!(lines_a.is_empty());
        assert_eq!(lines_b, vec![String::from("# Zürich")]);
    }

    #[test]
    fn when_chunk_has_empty_lines_then_they_are_discarded() {
        let mut framer = LineFramer::new();
        let lines = framer.push(b"\n\r\n# one\n\n# two\n");
        assert_eq!(lines, vec![String::from("# one"), String::from("# two")]);
    }

    #[test]
    fn when_fragment_exceeds_limit_then_it_is_flushed() {
        let mut framer = LineFramer::new();
        let oversized = vec![b'x'; MAX_PENDING_BYTES + 1];
        let lines = framer.push(&oversized);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), MAX_PENDING_BYTES + 1);
        assert!(framer.pending().is_empty());
    }
}
