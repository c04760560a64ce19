//! Newline framing for the chunked detection stream.
//!
//! The transport delivers the response body in arbitrary chunk sizes; a
//! logical record is one newline-terminated line carrying the
//! [`EVENT_PREFIX`] marker. [`LineFramer`] buffers partial trailing
//! records across chunk boundaries and yields complete payloads in
//! arrival order.

/// Marker prefix of payload lines; everything else in the body is
/// transport noise (keep-alives, blank lines) and is skipped.
pub const EVENT_PREFIX: &str = "data: ";

/// Incremental line framer over raw body bytes.
///
/// Buffering is byte-level: UTF-8 continuation bytes can never be `\n`,
/// so a multi-byte character split across chunks is reassembled intact
/// once its line completes.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the payloads of every record it
    /// completed, with [`EVENT_PREFIX`] stripped.
    ///
    /// Records are never split or merged regardless of how chunk
    /// boundaries fall; a record is only emitted once its terminating
    /// newline has been seen.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            // Drop the terminator and any CR from CRLF framing.
            let mut line = String::from_utf8_lossy(&line[..line.len() - 1]).into_owned();
            if line.ends_with('\r') {
                line.pop();
            }
            if let Some(payload) = line.strip_prefix(EVENT_PREFIX) {
                records.push(payload.to_string());
            } else if !line.is_empty() {
                tracing::trace!(line = %line, "Skipping non-payload line");
            }
        }
        records
    }

    /// Bytes of unterminated content still buffered.
    ///
    /// Non-zero at stream end means the transport was cut mid-record; the
    /// content is discarded, never emitted.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_split_across_two_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"data: {\"type\":\"fra").is_empty());
        let records = framer.push(b"me\",\"frame_number\":1}\n");
        assert_eq!(records, vec![r#"{"type":"frame","frame_number":1}"#]);
    }

    #[test]
    fn multiple_records_in_one_chunk() {
        let mut framer = LineFramer::new();
        let records = framer.push(b"data: {\"a\":1}\ndata: {\"b\":2}\n");
        assert_eq!(records, vec![r#"{"a":1}"#, r#"{"b":2}"#]);
    }

    #[test]
    fn record_split_across_three_chunks() {
        let mut framer = LineFramer::new();
        assert!(framer.push(b"dat").is_empty());
        assert!(framer.push(b"a: {\"x\"").is_empty());
        let records = framer.push(b":true}\n");
        assert_eq!(records, vec![r#"{"x":true}"#]);
    }

    #[test]
    fn non_payload_lines_are_skipped() {
        let mut framer = LineFramer::new();
        let records = framer.push(b": keep-alive\n\ndata: {\"ok\":1}\n");
        assert_eq!(records, vec![r#"{"ok":1}"#]);
    }

    #[test]
    fn crlf_terminator_is_stripped() {
        let mut framer = LineFramer::new();
        let records = framer.push(b"data: {\"ok\":1}\r\n");
        assert_eq!(records, vec![r#"{"ok":1}"#]);
    }

    #[test]
    fn trailing_partial_record_stays_buffered() {
        let mut framer = LineFramer::new();
        let records = framer.push(b"data: {\"a\":1}\ndata: {\"b\"");
        assert_eq!(records, vec![r#"{"a":1}"#]);
        assert_eq!(framer.pending_len(), b"data: {\"b\"".len());
    }

    #[test]
    fn order_is_preserved_across_pushes() {
        let mut framer = LineFramer::new();
        let mut all = framer.push(b"data: 1\nda");
        all.extend(framer.push(b"ta: 2\ndata: 3\n"));
        assert_eq!(all, vec!["1", "2", "3"]);
    }

    #[test]
    fn multibyte_utf8_split_across_chunks() {
        let mut framer = LineFramer::new();
        let line = "data: {\"brand\":\"Nescafé\"}\n".as_bytes();
        // Split inside the two-byte 'é' sequence.
        let split = line.len() - 4;
        assert!(framer.push(&line[..split]).is_empty());
        let records = framer.push(&line[split..]);
        assert_eq!(records, vec!["{\"brand\":\"Nescafé\"}"]);
    }
}
