//! Chunk-to-line framing.
//!
//! Serial reads arrive in arbitrary pieces. [`LineBuffer`] appends each
//! chunk and hands back every line completed so far, keeping the unfinished
//! tail for the next call. Lines end in `\n` or `\r\n`; the terminator is
//! stripped. The split points of the incoming chunks never change the lines
//! produced.

/// Accumulator for text between line endings.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    partial: String,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain all complete lines, in arrival order.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.partial.push_str(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.partial[start..].find('\n') {
            let end = start + offset;
            let line = &self.partial[start..end];
            lines.push(line.strip_suffix('\r').unwrap_or(line).to_owned());
            start = end + 1;
        }
        self.partial.drain(..start);

        lines
    }

    /// Text received since the last line ending.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn is_empty(&self) -> bool {
        self.partial.is_empty()
    }

    /// Drop any partial line (used on disconnect).
    pub fn clear(&mut self) {
        self.partial.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Lines a single pass over the whole input would produce.
    fn reference_lines(input: &str) -> Vec<String> {
        let mut parts: Vec<String> = input
            .split('\n')
            .map(|l| l.strip_suffix('\r').unwrap_or(l).to_owned())
            .collect();
        parts.pop();
        parts
    }

    #[test]
    fn single_chunk_with_two_lines() {
        let mut buf = LineBuffer::new();
        let lines = buf.push("24.50,60.20\n25.1,59\n");
        assert_eq!(lines, vec!["24.50,60.20", "25.1,59"]);
        assert!(buf.is_empty());
    }

    #[test]
    fn partial_line_is_retained() {
        let mut buf = LineBuffer::new();
        assert!(buf.push("24.5").is_empty());
        assert_eq!(buf.partial(), "24.5");
        assert_eq!(buf.push(",60.2\n"), vec!["24.5,60.2"]);
        assert_eq!(buf.partial(), "");
    }

    #[test]
    fn crlf_split_between_chunks() {
        let mut buf = LineBuffer::new();
        assert!(buf.push("24.5,60.2\r").is_empty());
        assert_eq!(buf.push("\n"), vec!["24.5,60.2"]);
    }

    #[test]
    fn empty_lines_are_reported_verbatim() {
        let mut buf = LineBuffer::new();
        assert_eq!(buf.push("\n\r\n  \n"), vec!["", "", "  "]);
    }

    #[test]
    fn clear_drops_partial() {
        let mut buf = LineBuffer::new();
        buf.push("garbage without newline");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.push("1,2\n"), vec!["1,2"]);
    }

    #[test]
    fn chunk_boundaries_do_not_change_lines() {
        let input = "24.50,60.20\r\n25.1,59\n\n  \nabc,1\n24.5,60.2,1\r\n26.0,4";
        let expected = reference_lines(input);

        // Every way of cutting the input into three pieces.
        for i in 0..=input.len() {
            for j in i..=input.len() {
                let mut buf = LineBuffer::new();
                let mut lines = buf.push(&input[..i]);
                lines.extend(buf.push(&input[i..j]));
                lines.extend(buf.push(&input[j..]));
                assert_eq!(lines, expected, "split at {i}/{j}");
                assert_eq!(buf.partial(), "26.0,4");
            }
        }
    }

    #[test]
    fn byte_at_a_time_matches_reference() {
        let input = "21.0,40.0\n22.0,41.0\r\n";
        let mut buf = LineBuffer::new();
        let mut lines = Vec::new();
        for i in 0..input.len() {
            lines.extend(buf.push(&input[i..=i]));
        }
        assert_eq!(lines, reference_lines(input));
    }
}
