//! Binary checkpoint records.
//!
//! A checkpoint file is a plain concatenation of bincode-encoded records,
//! each one self-describing:
//!
//! ```text
//! +-------------------------+
//! | magic "MPCK" (4 bytes)  |
//! +-------------------------+
//! | algorithm name (string) |  <- u64 LE length + UTF-8 bytes
//! +-------------------------+
//! | state payload (bytes)   |  <- u64 LE length + raw state
//! +-------------------------+
//! ```
//!
//! Records are written and read strictly in sequence.

use std::io::{self, Read, Write};

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::error::{IoContext, MontePiError, Result};
use crate::rng::{Algorithm, GeneratorState};

const MAGIC: [u8; 4] = *b"MPCK";

// Largest record we accept; guards allocations driven by corrupt lengths.
const MAX_RECORD_BYTES: u64 = 4096;

/// On-disk record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CheckpointRecord {
    magic: [u8; 4],
    algorithm: String,
    payload: Vec<u8>,
}

impl CheckpointRecord {
    fn from_state(state: &GeneratorState) -> Self {
        Self {
            magic: MAGIC,
            algorithm: state.algorithm().name().to_string(),
            payload: state.as_bytes().to_vec(),
        }
    }
}

// Same encoding as `bincode::serialize_into`, with a size limit for reads.
fn record_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .allow_trailing_bytes()
        .with_limit(MAX_RECORD_BYTES)
}

/// Appends checkpoint records to a sink.
pub struct CheckpointWriter<W: Write> {
    sink: W,
    label: String,
    written: u64,
}

impl<W: Write> CheckpointWriter<W> {
    /// `label` names the sink in error messages (usually its path).
    pub fn new(sink: W, label: impl Into<String>) -> Self {
        Self {
            sink,
            label: label.into(),
            written: 0,
        }
    }

    /// Append one record and flush, so the sink always holds whole records.
    pub fn write(&mut self, state: &GeneratorState) -> Result<()> {
        let record = CheckpointRecord::from_state(state);
        bincode::serialize_into(&mut self.sink, &record).map_err(|e| match *e {
            bincode::ErrorKind::Io(io_err) => MontePiError::output(self.label.clone(), io_err),
            other => MontePiError::Serialization(format!("encoding checkpoint: {other}")),
        })?;
        self.sink
            .flush()
            .map_err(|e| MontePiError::output(self.label.clone(), e))?;
        self.written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// Counts bytes pulled from the source, to tell a clean end of file from a
/// record cut short.
struct CountingReader<R> {
    inner: R,
    consumed: u64,
}

impl<R: Read> Read for CountingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        Ok(n)
    }
}

/// Reads checkpoint records back in file order.
pub struct CheckpointReader<R: Read> {
    source: CountingReader<R>,
    index: usize,
}

impl<R: Read> CheckpointReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source: CountingReader {
                inner: source,
                consumed: 0,
            },
            index: 0,
        }
    }

    /// Next record, or `None` on a clean end of file at a record boundary.
    pub fn next_record(&mut self) -> Result<Option<GeneratorState>> {
        let start = self.source.consumed;
        let record: CheckpointRecord = match record_options().deserialize_from(&mut self.source) {
            Ok(record) => record,
            Err(e) => return self.decode_failure(*e, start),
        };

        if record.magic != MAGIC {
            return Err(MontePiError::Serialization(format!(
                "record {}: bad magic {:02x?}",
                self.index, record.magic
            )));
        }
        let algorithm: Algorithm = record.algorithm.parse().map_err(|_| {
            MontePiError::Serialization(format!(
                "record {}: unknown algorithm '{}'",
                self.index, record.algorithm
            ))
        })?;
        if record.payload.len() != algorithm.state_size() {
            return Err(MontePiError::Serialization(format!(
                "record {}: {algorithm} payload is {} bytes, expected {}",
                self.index,
                record.payload.len(),
                algorithm.state_size()
            )));
        }

        let state = GeneratorState::new(algorithm, record.payload)?;
        self.index += 1;
        Ok(Some(state))
    }

    fn decode_failure(
        &self,
        err: bincode::ErrorKind,
        start: u64,
    ) -> Result<Option<GeneratorState>> {
        match err {
            bincode::ErrorKind::Io(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                if self.source.consumed == start {
                    Ok(None)
                } else {
                    Err(MontePiError::Serialization(format!(
                        "record {}: truncated",
                        self.index
                    )))
                }
            }
            bincode::ErrorKind::Io(e) => Err(MontePiError::Io {
                context: IoContext::CheckpointRead,
                source: e,
            }),
            other => Err(MontePiError::Serialization(format!(
                "record {}: {other}",
                self.index
            ))),
        }
    }

    /// Exactly `count` records, or an error naming how many were present.
    pub fn read_exact(&mut self, count: usize) -> Result<Vec<GeneratorState>> {
        let mut states = Vec::with_capacity(count);
        while states.len() < count {
            match self.next_record()? {
                Some(state) => states.push(state),
                None => {
                    return Err(MontePiError::Serialization(format!(
                        "checkpoint source holds {} records, {count} required",
                        states.len()
                    )))
                }
            }
        }
        Ok(states)
    }

    /// Every remaining record.
    pub fn read_all(&mut self) -> Result<Vec<GeneratorState>> {
        let mut states = Vec::new();
        while let Some(state) = self.next_record()? {
            states.push(state);
        }
        Ok(states)
    }
}
