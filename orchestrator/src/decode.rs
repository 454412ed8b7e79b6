use core::error::Error;
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use derive_more as dm;
use serde::Deserialize;

use common::{
    answers::{AnswersWriter, AssignmentTree, DecodeError},
    log_debug, log_info, log_warn,
    utils::comma_separated,
};

use crate::args::DecodeArgs;

/// A single answer as dumped by the engine: the name the buffer was marked
/// with and the content found for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerRecord {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, dm::Display)]
pub enum ReportError {
    #[display("I/O failure: {_0}")]
    Io(io::Error),
    #[display("Invalid answer record at line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[display("Failed to decode the answers: {_0}")]
    Decode(DecodeError),
    #[display("Failed to write the assignments: {_0}")]
    Serialize(serde_json::Error),
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse { source, .. } => Some(source),
            Self::Decode(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<io::Error> for ReportError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[derive(Debug, Default)]
pub struct Report {
    pub tree: AssignmentTree,
    /// The (1-based) lines of the answers that were skipped.
    pub skipped: Vec<usize>,
}

/// Reads the answer records, one per line. Blank lines are ignored.
pub fn read_records(
    reader: impl BufRead,
) -> impl Iterator<Item = Result<(usize, AnswerRecord), ReportError>> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
        .map(|(line, content)| {
            let content = content?;
            serde_json::from_str(&content)
                .map(|record| (line, record))
                .map_err(|source| ReportError::Parse { line, source })
        })
}

pub fn build_report(reader: impl BufRead, strict: bool) -> Result<Report, ReportError> {
    if strict {
        let records = read_records(reader).collect::<Result<Vec<_>, _>>()?;
        let mut tree = AssignmentTree::new();
        tree.write(records.into_iter().map(|(_, r)| (r.name, r.bytes)))
            .map_err(ReportError::Decode)?;
        return Ok(Report {
            tree,
            skipped: Vec::new(),
        });
    }

    let mut report = Report::default();
    for record in read_records(reader) {
        let (line, record) = match record {
            Ok(record) => record,
            Err(ReportError::Parse { line, source }) => {
                log_warn!("Skipping line {}: {}", line, source);
                report.skipped.push(line);
                continue;
            }
            Err(err) => return Err(err),
        };

        if let Err(err) = report.tree.decode(&record.name, &record.bytes) {
            log_warn!("Skipping the answer for `{}` at line {}: {}", record.name, line, err);
            report.skipped.push(line);
        }
    }
    Ok(report)
}

pub fn write_tree(tree: &AssignmentTree, output: Option<&Path>) -> Result<(), ReportError> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, tree).map_err(ReportError::Serialize)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

pub fn run(args: &DecodeArgs) -> Result<Report, ReportError> {
    log_debug!("Decoding answers from {}", args.input.display());
    let reader = BufReader::new(File::open(&args.input)?);
    let report = build_report(reader, args.strict)?;

    log_info!("Decoded the answers for {} objects", report.tree.len());
    if !report.skipped.is_empty() {
        log_warn!(
            "Skipped {} malformed answers at lines: {}",
            report.skipped.len(),
            comma_separated(&report.skipped)
        );
    }

    write_tree(&report.tree, args.output.as_deref())?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use common::answers::TypedValue;

    use super::*;

    const ANSWERS: &str = r#"
{"name": "x.i#value", "bytes": [5, 0, 0, 0]}
{"name": "s.s#value", "bytes": [97, 98]}

{"name": "s.l#size", "bytes": [1, 2]}
not a record
{"name": "s.q#value", "bytes": []}
"#;

    #[test]
    fn test_read_records() {
        let records = read_records(r#"{"name": "a", "bytes": [1]}"#.as_bytes())
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(records, vec![(1, AnswerRecord {
            name: "a".to_owned(),
            bytes: vec![1],
        })]);
    }

    #[test]
    fn test_lenient_skips_malformed() {
        let report = build_report(ANSWERS.as_bytes(), false).unwrap();
        assert_eq!(report.skipped, vec![5, 6, 7]);
        assert_eq!(
            report.tree.get("x", "value"),
            Some(&TypedValue::Integer(i32::from_ne_bytes([5, 0, 0, 0])))
        );
        assert_eq!(
            report.tree.get("s", "value"),
            Some(&TypedValue::ByteString(b"ab".to_vec()))
        );
        assert_eq!(report.tree.get("s", "size"), None);
    }

    #[test]
    fn test_strict_fails() {
        assert!(matches!(
            build_report(ANSWERS.as_bytes(), true),
            Err(ReportError::Parse { line: 6, .. })
        ));

        let valid = r#"{"name": "s.l#size", "bytes": [1, 2]}"#;
        assert!(matches!(
            build_report(valid.as_bytes(), true),
            Err(ReportError::Decode(DecodeError::SizeMismatch { .. }))
        ));
    }
}
