//! CSV writer for the public dataset artifact.
//!
//! One header row (`id,prompt,A,B,C,D,E,answer`) followed by one row per
//! question. Fields containing delimiters, quotes, or newlines are quoted
//! with doubled inner quotes.

use quizsmith_domain::{DATASET_COLUMNS, DatasetRow};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write dataset rows as CSV to `path`, creating parent directories.
pub fn write_dataset_csv(path: &Path, rows: &[DatasetRow]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);

    writeln!(writer, "{}", DATASET_COLUMNS.join(","))?;
    for row in rows {
        writeln!(
            writer,
            "{},{},{},{},{},{},{},{}",
            row.id,
            escape(&row.prompt),
            escape(&row.a),
            escape(&row.b),
            escape(&row.c),
            escape(&row.d),
            escape(&row.e),
            row.answer,
        )?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Dataset written");
    Ok(())
}

/// Quote a field when it contains a comma, quote, or line break.
fn escape(field: &str) -> String {
    if field.contains(['"', ',', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: usize, prompt: &str) -> DatasetRow {
        DatasetRow {
            id,
            prompt: prompt.to_string(),
            a: "first".to_string(),
            b: "second".to_string(),
            c: "third".to_string(),
            d: "fourth".to_string(),
            e: "fifth".to_string(),
            answer: 'B',
        }
    }

    #[test]
    fn test_escape_plain_field_is_unchanged() {
        assert_eq!(escape("plain text"), "plain text");
    }

    #[test]
    fn test_escape_quotes_delimiters_and_quotes() {
        assert_eq!(escape("a, b"), "\"a, b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("line\nbreak"), "\"line\nbreak\"");
    }

    #[test]
    fn test_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");

        write_dataset_csv(&path, &[row(0, "What is 2+2?"), row(1, "Largest, planet?")]).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "id,prompt,A,B,C,D,E,answer");
        assert_eq!(lines[1], "0,What is 2+2?,first,second,third,fourth,fifth,B");
        assert_eq!(
            lines[2],
            "1,\"Largest, planet?\",first,second,third,fourth,fifth,B"
        );
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dataset.csv");
        write_dataset_csv(&path, &[]).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "id,prompt,A,B,C,D,E,answer\n"
        );
    }
}
