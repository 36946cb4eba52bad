use std::io::{self, BufRead, Write};

/// Yields the lines of a byte stream without their terminators.
///
/// Unlike `BufRead::lines`, invalid UTF-8 is replaced rather than reported,
/// so binary noise in command output never aborts a run.
///
/// A mirrored reader also copies every line, exactly as read, into a second
/// writer before decoding it. A final line without a terminator is mirrored
/// with `\n` appended.
pub struct LineReader<R, M = io::Sink> {
    inner: R,
    buf: Vec<u8>,
    mirror: Option<M>,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        LineReader {
            inner,
            buf: Vec::new(),
            mirror: None,
        }
    }
}

impl<R: BufRead, M: Write> LineReader<R, M> {
    pub fn mirrored(inner: R, mirror: M) -> Self {
        LineReader {
            inner,
            buf: Vec::new(),
            mirror: Some(mirror),
        }
    }

    fn copy_raw(&mut self) -> io::Result<()> {
        if let Some(mirror) = self.mirror.as_mut() {
            mirror.write_all(&self.buf)?;
            if self.buf.last() != Some(&b'\n') {
                mirror.write_all(b"\n")?;
            }
        }
        Ok(())
    }
}

impl<R: BufRead, M: Write> Iterator for LineReader<R, M> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.inner.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if let Err(e) = self.copy_raw() {
                    return Some(Err(e));
                }
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Number of lines `LineReader` would yield for the same input.
pub fn count_lines<R: BufRead>(mut input: R) -> io::Result<usize> {
    let mut count = 0;
    let mut ends_with_newline = true;
    loop {
        let chunk = input.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        count += chunk.iter().filter(|&&b| b == b'\n').count();
        ends_with_newline = chunk.last() == Some(&b'\n');
        let len = chunk.len();
        input.consume(len);
    }
    if !ends_with_newline {
        count += 1;
    }
    Ok(count)
}
