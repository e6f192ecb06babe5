//! JSON-lines transport: one record per line over any `BufRead`/`Write`
//!
//! Used by the binary for stdin -> stdout operation and by tests over
//! files. Reading a line consumes it, so acknowledgment is a no-op here.

use async_trait::async_trait;
use std::io::{BufRead, Write};
use std::sync::Mutex;

use crate::error::StreamError;
use crate::transport::{RecordSink, RecordSource};

/// Line-oriented record source. Blank lines are skipped; end of input ends
/// the stream.
pub struct JsonLinesSource<R> {
    reader: R,
    batch_size: usize,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R, batch_size: usize) -> Self {
        Self {
            reader,
            batch_size: batch_size.max(1),
        }
    }

    fn read_line(&mut self) -> Result<Option<String>, StreamError> {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }
}

#[async_trait]
impl<R: BufRead + Send> RecordSource for JsonLinesSource<R> {
    async fn next_batch(&mut self) -> Result<Option<Vec<String>>, StreamError> {
        let mut batch = Vec::new();
        while batch.len() < self.batch_size {
            match self.read_line()? {
                Some(line) => batch.push(line),
                None => break,
            }
        }
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    async fn ack(&mut self) -> Result<(), StreamError> {
        // Reading the line already consumed it
        Ok(())
    }
}

/// Line-oriented record sink, one payload per line, flushed per message.
///
/// The routing key is not part of the line format; it only exists for
/// keyed transports.
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Consume the sink and hand back the writer (tests)
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl<W: Write + Send> RecordSink for JsonLinesSink<W> {
    async fn send(&self, _key: &str, payload: &str) -> Result<(), StreamError> {
        // A poisoned lock means a writer panicked mid-line; treat the sink
        // as unusable rather than taking the process down.
        let mut writer = self.writer.lock().map_err(|_| StreamError::SinkClosed)?;
        writeln!(writer, "{payload}")?;
        writer.flush()?;
        Ok(())
    }
}
