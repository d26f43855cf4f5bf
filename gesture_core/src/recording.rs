//! JSON-lines landmark recordings.
//!
//! One object per line: `{"t": <ms>, "hand": [ {x, y, z} × 21 ] | null}`.
//! Blank lines are ignored.  Recordings let a hand stream captured once be
//! replayed through the interpreters without a camera.

use std::io::{BufRead, Write};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::landmark::{HandFrame, Millis};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedFrame {
    pub t:    Millis,
    pub hand: Option<HandFrame>,
}

/// Parse one line.  `line_no` is 1-based and only used for the error.
pub fn parse_line(line_no: usize, line: &str) -> Result<RecordedFrame> {
    serde_json::from_str(line).map_err(|e| Error::Recording { line: line_no, message: e.to_string() })
}

/// Read a whole recording.  Stops at the first malformed line.
pub fn read_recording<R: BufRead>(reader: R) -> Result<Vec<RecordedFrame>> {
    let mut frames = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        frames.push(parse_line(i + 1, &line)?);
    }
    Ok(frames)
}

pub struct RecordingWriter<W: Write> {
    out:     W,
    written: usize,
}

impl<W: Write> RecordingWriter<W> {
    pub fn new(out: W) -> Self {
        RecordingWriter { out, written: 0 }
    }

    pub fn write_frame(&mut self, t: Millis, hand: Option<&HandFrame>) -> Result<()> {
        #[derive(Serialize)]
        struct Line<'a> {
            t:    Millis,
            hand: Option<&'a HandFrame>,
        }
        let json = serde_json::to_string(&Line { t, hand })
            .map_err(|e| Error::Recording { line: self.written + 1, message: e.to_string() })?;
        writeln!(self.out, "{}", json)?;
        self.written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> usize {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
