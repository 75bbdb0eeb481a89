//! CSV/TSV reader

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::config::Config;
use crate::error::{Result, TableError};
use crate::model::Row;

use super::RowStream;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Pick the input delimiter: an explicit setting wins, then the extension
pub fn delimiter_for_path(path: Option<&Path>, config: &Config) -> u8 {
    if let Some(delimiter) = config.delimiter {
        return delimiter;
    }
    let ext = path
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "tsv" | "tab" => b'\t',
        _ => b',',
    }
}

/// Decoder for delimited text sources
pub struct CsvSource;

impl CsvSource {
    /// Open a file, or stdin when `path` is `None` or `-`
    pub fn open(path: Option<&Path>, config: &Config) -> Result<RowStream<'static>> {
        let path = path.filter(|p| p.as_os_str() != "-");
        let delimiter = delimiter_for_path(path, config);
        match path {
            Some(p) => {
                debug!(path = %p.display(), "opening input");
                let file = File::open(p)?;
                Self::from_reader(file, delimiter)
            }
            None => {
                debug!("reading stdin");
                Self::from_reader(io::stdin(), delimiter)
            }
        }
    }

    /// Decode any byte reader. A leading UTF-8 byte-order mark is stripped and
    /// recorded on the stream.
    pub fn from_reader<R: Read + 'static>(reader: R, delimiter: u8) -> Result<RowStream<'static>> {
        let mut buffered = BufReader::new(reader);
        let has_bom = buffered.fill_buf()?.starts_with(UTF8_BOM);
        if has_bom {
            buffered.consume(UTF8_BOM.len());
        }

        let csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .from_reader(buffered);
        let mut records = csv_reader.into_records();

        let header = match records.next() {
            Some(record) => record_to_row(&record?),
            None => return Err(TableError::EmptyInput),
        };

        let rows = records.map(|record| {
            record
                .map(|r| record_to_row(&r))
                .map_err(TableError::from)
        });

        Ok(RowStream::new(header, rows).with_bom(has_bom))
    }
}

fn record_to_row(record: &csv::StringRecord) -> Row {
    record.iter().map(String::from).collect()
}
