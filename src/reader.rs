use std::{
    fs::File,
    path::{Path, PathBuf},
};

use tracing::warn;

use crate::{
    error::{AppResult, EtlError},
    models::{RawFields, RawRecord},
};

/// Lazy, restartable view over the source CSV. Each call to [`records`]
/// re-opens the file from the top.
///
/// [`records`]: RowReader::records
pub struct RowReader {
    path: PathBuf,
}

impl RowReader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> AppResult<RecordIter> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|source| EtlError::Source { path: self.path.clone(), source })?;

        let headers = reader
            .byte_headers()
            .map_err(|source| EtlError::Source { path: self.path.clone(), source })?
            .iter()
            .map(|h| normalize_header(&String::from_utf8_lossy(h)))
            .collect();

        Ok(RecordIter { reader, headers, line: 1, skipped: 0 })
    }
}

pub struct RecordIter {
    reader: csv::Reader<File>,
    headers: Vec<String>,
    line: u64,
    skipped: u64,
}

impl RecordIter {
    /// Rows dropped so far because they could not be decoded.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl Iterator for RecordIter {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let mut row = csv::ByteRecord::new();
        loop {
            match self.reader.read_byte_record(&mut row) {
                Ok(true) => {}
                Ok(false) => return None,
                Err(err) => {
                    self.line += 1;
                    self.skipped += 1;
                    warn!(line = self.line, error = %err, "skipping unreadable row");
                    continue;
                }
            }
            self.line += 1;

            match decode_row(&self.headers, &row) {
                Some(fields) => return Some(RawRecord { line: self.line, fields }),
                None => {
                    self.skipped += 1;
                    warn!(line = self.line, "skipping undecodable row");
                }
            }
        }
    }
}

fn decode_row(headers: &[String], row: &csv::ByteRecord) -> Option<RawFields> {
    let mut fields = RawFields::new();
    for (header, value) in headers.iter().zip(row.iter()) {
        let text = std::str::from_utf8(value).ok()?;
        fields.insert(header.clone(), repair_mojibake(text.trim()));
    }
    Some(fields)
}

fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Undo one round of UTF-8 text mis-decoded through Windows-1252 (the
/// classic `â€“` artifact for `–`). The text is mapped back to the byte
/// sequence it was decoded from; if those bytes form valid UTF-8 that
/// differs from the input, the re-decoded form is the original text.
/// Anything that does not survive the roundtrip is left untouched.
pub fn repair_mojibake(text: &str) -> String {
    if text.is_ascii() {
        return text.to_string();
    }
    let Some(bytes) = windows_1252_bytes(text) else {
        return text.to_string();
    };
    match String::from_utf8(bytes) {
        Ok(fixed) if fixed != text => fixed,
        _ => text.to_string(),
    }
}

fn windows_1252_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(windows_1252_byte).collect()
}

fn windows_1252_byte(c: char) -> Option<u8> {
    let cp = c as u32;
    if cp < 0x100 {
        return Some(cp as u8);
    }
    // The 0x80..0x9F block, where Windows-1252 departs from Latin-1.
    Some(match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn temp_csv(name: &str, bytes: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("movies-etl-{}-{}.csv", std::process::id(), name));
        let mut file = File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn repairs_en_dash_mojibake() {
        assert_eq!(repair_mojibake("(2010\u{E2}\u{20AC}\u{201C}2022)"), "(2010\u{2013}2022)");
    }

    #[test]
    fn leaves_genuine_unicode_alone() {
        assert_eq!(repair_mojibake("Amélie"), "Amélie");
        assert_eq!(repair_mojibake("naïve"), "naïve");
    }

    #[test]
    fn normalizes_headers_and_trims_fields() {
        let path = temp_csv("headers", b"MOVIES,Run Time\n  The Father  ,97 min\n");
        let reader = RowReader::new(&path);
        let records: Vec<_> = reader.records().unwrap().collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["movies"], "The Father");
        assert_eq!(records[0].fields["run_time"], "97 min");
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn skips_rows_that_do_not_decode() {
        let mut bytes = b"movies,year\nGood Row,2010\n".to_vec();
        bytes.extend_from_slice(b"Bad\xC3Row\xFF,2011\n");
        bytes.extend_from_slice(b"Another Good Row,2012\n");
        let path = temp_csv("decode", &bytes);

        let reader = RowReader::new(&path);
        let mut iter = reader.records().unwrap();
        let titles: Vec<_> = iter.by_ref().map(|r| r.fields["movies"].clone()).collect();
        assert_eq!(titles, vec!["Good Row", "Another Good Row"]);
        assert_eq!(iter.skipped(), 1);
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn records_is_restartable() {
        let path = temp_csv("restart", b"movies,year\nA,2001\nB,2002\n");
        let reader = RowReader::new(&path);
        assert_eq!(reader.records().unwrap().count(), 2);
        assert_eq!(reader.records().unwrap().count(), 2);
        std::fs::remove_file(path).ok();
    }
}
