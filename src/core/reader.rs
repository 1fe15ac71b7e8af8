//! Purpose: Single sequential scan of a villager file, one record at a time.
//! Exports: `LinePolicy`, `SkippedLine`, `SkipHandler`, `ScanSummary`, `scan`.
//! Role: The only place that opens the backing file; every query builds on it.
//! Invariants: The file handle never outlives a `scan` call.
//! Invariants: Blank lines carry no record and are neither counted nor reported.
//! Invariants: Line numbers are 1-based and count every physical line.
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use bstr::ByteSlice;

use crate::core::error::Error;
use crate::core::record::{FIELD_DELIMITER, VillagerRecord};

/// What to do with a line that does not hold exactly five fields.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum LinePolicy {
    #[default]
    Stop,
    Skip,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedLine {
    pub line: u64,
    pub fields: usize,
    pub text: String,
}

pub type SkipHandler = Arc<dyn Fn(&SkippedLine) + Send + Sync>;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScanSummary {
    pub lines: u64,
    pub records: u64,
    pub skipped: u64,
}

pub fn scan<F>(
    path: &Path,
    policy: LinePolicy,
    on_skip: Option<&SkipHandler>,
    mut on_record: F,
) -> Result<ScanSummary, Error>
where
    F: FnMut(VillagerRecord),
{
    let file =
        File::open(path).map_err(|err| Error::from_io(err, "failed to open villager file", path))?;
    let reader = BufReader::new(file);
    let mut summary = ScanSummary::default();

    for chunk in reader.split(b'\n') {
        let bytes =
            chunk.map_err(|err| Error::from_io(err, "failed to read villager file", path))?;
        summary.lines += 1;

        let trimmed = bytes.trim_end();
        if trimmed.is_empty() {
            continue;
        }
        let text = trimmed.to_str_lossy();

        match VillagerRecord::from_line(&text) {
            Ok(record) => {
                summary.records += 1;
                on_record(record);
            }
            Err(err) => match policy {
                LinePolicy::Stop => {
                    return Err(err.with_path(path).with_line(summary.lines));
                }
                LinePolicy::Skip => {
                    let skipped = SkippedLine {
                        line: summary.lines,
                        fields: text.split(FIELD_DELIMITER).count(),
                        text: text.into_owned(),
                    };
                    tracing::warn!(
                        path = %path.display(),
                        line = skipped.line,
                        fields = skipped.fields,
                        "skipping malformed villager line"
                    );
                    summary.skipped += 1;
                    if let Some(handler) = on_skip {
                        handler(&skipped);
                    }
                }
            },
        }
    }

    tracing::debug!(
        path = %path.display(),
        lines = summary.lines,
        records = summary.records,
        skipped = summary.skipped,
        "scanned villager file"
    );
    Ok(summary)
}
