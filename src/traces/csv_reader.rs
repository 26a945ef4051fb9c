//! # Trace header dump reader
//!
//! Lazily read scan over a **per-trace header dump**: a CSV file with one row per trace
//! and one column per header word, columns named after [`HeaderField`](super::HeaderField)
//! (`FieldRecord`, `SourceX`, `GroupX`, ..., `ns`, `dt`).
//!
//! ## Access pattern
//! -----------------
//! * [`CsvHeaderScan::open`] streams the file once. Rows are folded into one [`ShotSummary`]
//!   per shot as they are read, and the position of every run of consecutive rows of a
//!   shot is recorded. No header is kept.
//! * [`TraceScan::read_shot`] seeks to the runs of that shot and parses those rows only.
//!   The returned [`TraceBlock`] holds headers only.
//!
//! ## Expected columns
//! -----------------
//! `FieldRecord`, `ns` and `dt` (microseconds) are required. Every other column is optional
//! and defaults to zero. Surrounding whitespace in fields is ignored.
//!
//! ## Errors
//! -----------------
//! Opening a missing or unreadable file surfaces as [`GeometryError::IoError`]; malformed
//! rows surface as [`GeometryError::CsvError`]. Nothing is retried.
use std::{fs::File, io::BufReader};

use camino::{Utf8Path, Utf8PathBuf};
use csv::{Position, StringRecord};

use super::{FastHashMap, ShotSummary, TraceBlock, TraceHeader, TraceScan};
use crate::geometry_errors::GeometryError;

/// Consecutive rows of one shot: position of the first row and row count.
#[derive(Debug, Clone)]
struct RowRun {
    start: Position,
    rows: usize,
}

#[derive(Debug, Clone)]
pub struct CsvHeaderScan {
    path: Utf8PathBuf,
    summaries: Vec<ShotSummary>,
    runs: Vec<Vec<RowRun>>,
}

impl CsvHeaderScan {
    /// Scan the header dump at `path`.
    ///
    /// Arguments
    /// -----------------
    /// * `path`: CSV file, one row per trace.
    ///
    /// Return
    /// ----------
    /// * A scan holding one summary per shot, shots ordered by first appearance.
    pub fn open(path: &Utf8Path) -> Result<Self, GeometryError> {
        let mut reader = reader(path)?;
        let columns = reader.headers()?.clone();

        let mut slot: FastHashMap<i32, usize> = FastHashMap::default();
        let mut summaries: Vec<ShotSummary> = Vec::new();
        let mut runs: Vec<Vec<RowRun>> = Vec::new();
        let mut previous: Option<usize> = None;
        let mut ntraces = 0usize;

        let mut record = StringRecord::new();
        loop {
            let start = reader.position().clone();
            if !reader.read_record(&mut record)? {
                break;
            }
            let header: TraceHeader = record.deserialize(Some(&columns))?;
            ntraces += 1;

            let shot = match slot.get(&header.field_record) {
                Some(&shot) => {
                    summaries[shot].add(&header);
                    shot
                }
                None => {
                    let shot = summaries.len();
                    slot.insert(header.field_record, shot);
                    summaries.push(ShotSummary::start(&header));
                    runs.push(Vec::new());
                    shot
                }
            };
            let shot_runs = &mut runs[shot];
            match shot_runs.last_mut() {
                Some(run) if previous == Some(shot) => run.rows += 1,
                _ => shot_runs.push(RowRun { start, rows: 1 }),
            }
            previous = Some(shot);
        }
        summaries.iter().for_each(ShotSummary::report);

        tracing::debug!(
            path = %path,
            nshots = summaries.len(),
            ntraces,
            "scanned trace header dump"
        );

        Ok(CsvHeaderScan {
            path: path.to_owned(),
            summaries,
            runs,
        })
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }
}

impl TraceScan for CsvHeaderScan {
    fn summaries(&self) -> &[ShotSummary] {
        &self.summaries
    }

    fn read_shot(&self, shot: usize) -> Result<TraceBlock, GeometryError> {
        let (summary, runs) = self
            .summaries
            .get(shot)
            .zip(self.runs.get(shot))
            .ok_or(GeometryError::ShotIndexOutOfBounds {
                index: shot,
                nsrc: self.summaries.len(),
            })?;

        let mut reader = reader(&self.path)?;
        let columns = reader.headers()?.clone();
        let mut record = StringRecord::new();
        let mut headers = Vec::with_capacity(summary.ntraces);
        for run in runs {
            reader.seek(run.start.clone())?;
            for _ in 0..run.rows {
                if !reader.read_record(&mut record)? {
                    return Err(GeometryError::config(format!(
                        "{} ended inside shot {}",
                        self.path, summary.field_record
                    )));
                }
                headers.push(record.deserialize::<TraceHeader>(Some(&columns))?);
            }
        }
        tracing::trace!(
            shot,
            ntraces = headers.len(),
            runs = runs.len(),
            "read shot from header dump"
        );
        Ok(TraceBlock::headers_only(headers))
    }
}

fn reader(path: &Utf8Path) -> Result<csv::Reader<BufReader<File>>, GeometryError> {
    let file = File::open(path)?;
    Ok(csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file)))
}
