//! Output device backed by any byte writer.

use std::io::{self, Write};

use ls8_core::OutputDevice;

/// Writes `PRN` and `PRA` output to an [`io::Write`] sink.
///
/// The core's output hooks cannot fail, so the first write error is logged,
/// kept, and reported by [`WriterOutput::finish`]. Later writes are dropped.
#[derive(Debug)]
pub struct WriterOutput<W: Write> {
    writer: W,
    error: Option<io::Error>,
}

impl<W: Write> WriterOutput<W> {
    /// Wraps `writer`.
    pub const fn new(writer: W) -> Self {
        Self {
            writer,
            error: None,
        }
    }

    /// Flushes the writer and returns it, or the first write error seen.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while writing or flushing.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(error) = result {
            log::error!("output write failed: {error}");
            self.error = Some(error);
        }
    }
}

impl<W: Write> OutputDevice for WriterOutput<W> {
    fn write_decimal(&mut self, value: u8) {
        if self.error.is_none() {
            let result = writeln!(self.writer, "{value}");
            self.record(result);
        }
    }

    fn write_char(&mut self, value: u8) {
        if self.error.is_none() {
            let result = write!(self.writer, "{}", char::from(value))
                .and_then(|()| self.writer.flush());
            self.record(result);
        }
    }
}
