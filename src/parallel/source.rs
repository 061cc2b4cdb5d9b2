//! Line source feeding the partitioner
//!
//! Yields the input's lines in file order and stops at end of file. A line
//! that is not valid UTF-8 is warned about and yielded lossily, so the worker
//! rejects it like any other malformed line. An I/O error ends the sequence
//! early; lines already yielded stay valid and the error is kept for the run
//! report.

use std::borrow::Cow;
use std::io::{self, BufRead};

pub struct LineSource<R> {
    reader: R,
    buffer: Vec<u8>,
    lines_read: u64,
    undecodable: u64,
    error: Option<io::Error>,
    done: bool,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::new(),
            lines_read: 0,
            undecodable: 0,
            error: None,
            done: false,
        }
    }

    pub fn lines_read(&self) -> u64 {
        self.lines_read
    }

    /// Lines that were not valid UTF-8
    pub fn undecodable(&self) -> u64 {
        self.undecodable
    }

    /// The read error that ended the sequence, if any
    pub fn error(&self) -> Option<&io::Error> {
        self.error.as_ref()
    }
}

impl<R: BufRead> Iterator for LineSource<R> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.done {
            return None;
        }

        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                self.lines_read += 1;
                let line = match std::str::from_utf8(&self.buffer) {
                    Ok(line) => Cow::Borrowed(line),
                    Err(e) => {
                        log::warn!("line {}: not valid UTF-8: {}", self.lines_read, e);
                        self.undecodable += 1;
                        String::from_utf8_lossy(&self.buffer)
                    }
                };
                Some(line.trim_end_matches(&['\r', '\n'][..]).to_string())
            }
            Err(e) => {
                log::error!(
                    "input read failed after {} lines, stopping early: {}",
                    self.lines_read,
                    e
                );
                self.error = Some(e);
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufReader, Cursor, Read};

    #[test]
    fn test_yields_lines_in_order() {
        let mut source = LineSource::new(Cursor::new("1,2,3\n4,5,6\r\n7,8,9"));
        assert_eq!(source.next().as_deref(), Some("1,2,3"));
        assert_eq!(source.next().as_deref(), Some("4,5,6"));
        assert_eq!(source.next().as_deref(), Some("7,8,9"));
        assert_eq!(source.next(), None);
        assert_eq!(source.next(), None);
        assert_eq!(source.lines_read(), 3);
        assert!(source.error().is_none());
    }

    #[test]
    fn test_keeps_blank_lines() {
        let lines: Vec<String> = LineSource::new(Cursor::new("a\n\nb\n")).collect();
        assert_eq!(lines, vec!["a", "", "b"]);
    }

    #[test]
    fn test_invalid_utf8_line_does_not_stop_source() {
        let input: &[u8] = b"100,1,2\n7,\xff\xfe,3\n200,4,5\n";
        let mut source = LineSource::new(input);
        assert_eq!(source.next().as_deref(), Some("100,1,2"));
        let garbled = source.next().unwrap();
        assert!(garbled.starts_with("7,"));
        assert!(garbled.contains('\u{FFFD}'));
        assert_eq!(source.next().as_deref(), Some("200,4,5"));
        assert_eq!(source.next(), None);
        assert_eq!(source.lines_read(), 3);
        assert_eq!(source.undecodable(), 1);
        assert!(source.error().is_none());
    }

    struct FailingReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk gone"));
            }
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_ends_sequence_early() {
        let reader = BufReader::new(FailingReader {
            data: Cursor::new(b"1,2,3\n4,5".to_vec()),
        });
        let mut source = LineSource::new(reader);
        assert_eq!(source.next().as_deref(), Some("1,2,3"));
        assert_eq!(source.next(), None);
        assert_eq!(source.lines_read(), 1);
        assert_eq!(source.error().map(|e| e.to_string()).as_deref(), Some("disk gone"));
    }
}
