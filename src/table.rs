use std::{
    collections::HashMap,
    fs::File,
    path::{Path, PathBuf},
};

use csv::{ByteRecord, StringRecord};
use itertools::Itertools;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::error::TableError;

/// Outcome of looking up a single value in a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    /// The schema is fine but no row carried the value.
    Absent,
    /// The table has no column of that name.
    UnknownColumn(String),
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Absent => Lookup::Absent,
            Lookup::UnknownColumn(column) => Lookup::UnknownColumn(column),
        }
    }

    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent | Lookup::UnknownColumn(_) => None,
        }
    }
}

fn is_identifier(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Column name -> index, in header order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Columns {
    names: StringRecord,
    index: HashMap<String, usize>,
}

impl Columns {
    /// Builds the mapping from a raw header, dropping any leading bytes that
    /// cannot start an identifier (byte-order marks and similar debris).
    pub fn from_header(header: &ByteRecord) -> Option<Self> {
        let mut names = StringRecord::new();
        for (position, cell) in header.iter().enumerate() {
            let cell = String::from_utf8_lossy(cell);
            if position == 0 {
                names.push_field(cell.trim_start_matches(|c: char| !is_identifier(c)));
            } else {
                names.push_field(&cell);
            }
        }

        if names.iter().all(str::is_empty) {
            return None;
        }

        let mut index = HashMap::new();
        for (position, name) in names.iter().enumerate() {
            index.entry(name.to_owned()).or_insert(position);
        }

        Some(Self { names, index })
    }

    pub fn get(&self, column: &str) -> Option<usize> {
        self.index.get(column).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}

/// One data line of a table. Only meaningful against the [`Columns`] of the
/// table it was read from.
#[derive(Debug, Clone)]
pub struct Row(StringRecord);

/// A header-mapped, forward-only reader over one delimited GTFS file.
///
/// The file handle is released when the table is dropped.
#[derive(Debug)]
pub struct Table {
    path: PathBuf,
    reader: csv::Reader<File>,
    columns: Columns,
    skipped_rows: usize,
}

impl Table {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref().to_path_buf();

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&path)
            .map_err(|source| TableError::Open {
                path: path.clone(),
                source,
            })?;

        let header = reader.byte_headers().map_err(|source| TableError::Open {
            path: path.clone(),
            source,
        })?;
        let columns = Columns::from_header(header)
            .ok_or_else(|| TableError::EmptyHeader { path: path.clone() })?;

        debug!(
            path = %path.display(),
            columns = %columns.names().join(","),
            "opened table"
        );

        Ok(Self {
            path,
            reader,
            columns,
            skipped_rows: 0,
        })
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    /// Rows dropped so far because they were short or unreadable.
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    /// Fails with [`TableError::MissingColumn`] on the first absent column.
    pub fn require(&self, columns: &[&str]) -> Result<(), TableError> {
        match columns.iter().find(|column| self.columns.get(column).is_none()) {
            Some(column) => Err(TableError::MissingColumn {
                column: (*column).to_owned(),
                path: self.path.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Next row holding at least one cell per column.
    ///
    /// Short or non-UTF-8 rows are skipped with a warning. An I/O error ends
    /// the table early.
    pub fn next_row(&mut self) -> Option<Row> {
        let mut record = StringRecord::new();
        loop {
            match self.reader.read_record(&mut record) {
                Ok(false) => return None,
                Ok(true) if record.len() < self.columns.len() => {
                    self.skip(&format!(
                        "expected {} cells, found {}",
                        self.columns.len(),
                        record.len()
                    ));
                }
                Ok(true) => return Some(Row(record)),
                Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => {
                    error!(path = %self.path.display(), %err, "stopped reading table");
                    return None;
                }
                Err(err) => self.skip(&err.to_string()),
            }
        }
    }

    /// Value of `column` in `row`.
    pub fn cell<'r>(&self, row: &'r Row, column: &str) -> Lookup<&'r str> {
        match self.columns.get(column) {
            Some(position) => match row.0.get(position) {
                Some(value) => Lookup::Found(value),
                None => Lookup::Absent,
            },
            None => Lookup::UnknownColumn(column.to_owned()),
        }
    }

    /// Remaining rows deserialized by column name. Rows that do not fit `T`
    /// are skipped with a warning.
    pub fn records<'a, T>(&'a mut self) -> impl Iterator<Item = T> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        std::iter::from_fn(move || loop {
            let row = self.next_row()?;
            match row.0.deserialize::<T>(Some(&self.columns.names)) {
                Ok(record) => return Some(record),
                Err(err) => self.skip(&err.to_string()),
            }
        })
    }

    fn skip(&mut self, reason: &str) {
        self.skipped_rows += 1;
        warn!(path = %self.path.display(), reason, "skipping malformed row");
    }
}

impl Drop for Table {
    fn drop(&mut self) {
        debug!(
            path = %self.path.display(),
            skipped_rows = self.skipped_rows,
            "closed table"
        );
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::test_util::write_file;

    fn columns(header: &[u8]) -> Vec<(String, usize)> {
        let record = ByteRecord::from(header.split(|&b| b == b',').collect::<Vec<_>>());
        let columns = Columns::from_header(&record).unwrap();
        columns
            .names()
            .map(|name| (name.to_owned(), columns.get(name).unwrap()))
            .collect()
    }

    #[test]
    fn strips_leading_non_identifier_bytes_from_header() {
        let clean = columns(b"stop_id,stop_name");
        assert_eq!(clean, [("stop_id".to_owned(), 0), ("stop_name".to_owned(), 1)]);

        assert_eq!(columns(b"\xEF\xBB\xBFstop_id,stop_name"), clean);
        assert_eq!(columns(b"\xFFstop_id,stop_name"), clean);
        assert_eq!(columns(b"#@ stop_id,stop_name"), clean);
        assert_eq!(columns(b"_stop,x"), [("_stop".to_owned(), 0), ("x".to_owned(), 1)]);
    }

    #[test]
    fn opening_strips_byte_order_mark() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "stops.txt", "\u{feff}stop_id,stop_name\nS1,Main St\n");

        let mut table = Table::open(&path).unwrap();
        assert_eq!(table.columns().get("stop_id"), Some(0));

        let row = table.next_row().unwrap();
        assert_eq!(table.cell(&row, "stop_id"), Lookup::Found("S1"));
        assert_eq!(table.cell(&row, "stop_name"), Lookup::Found("Main St"));
        assert_eq!(
            table.cell(&row, "stop_desc"),
            Lookup::UnknownColumn("stop_desc".to_owned())
        );
        assert!(table.next_row().is_none());
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Table::open(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, TableError::Open { .. }));
    }

    #[test]
    fn empty_file_has_no_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "trips.txt", "");
        let err = Table::open(&path).unwrap_err();
        assert!(matches!(err, TableError::EmptyHeader { .. }));
    }

    #[test]
    fn short_rows_are_skipped_and_counted() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "trips.txt",
            "route_id,trip_id,service_id\nR1,T1,WK\nR2\nR3,T3,WK,extra\n",
        );

        let mut table = Table::open(&path).unwrap();
        let first = table.next_row().unwrap();
        assert_eq!(table.cell(&first, "trip_id"), Lookup::Found("T1"));
        let second = table.next_row().unwrap();
        assert_eq!(table.cell(&second, "route_id"), Lookup::Found("R3"));
        assert!(table.next_row().is_none());
        assert_eq!(table.skipped_rows(), 1);
    }

    #[test]
    fn require_names_the_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "trips.txt", "trip_id\nT1\n");
        let table = Table::open(&path).unwrap();

        assert!(table.require(&["trip_id"]).is_ok());
        match table.require(&["trip_id", "route_id"]) {
            Err(TableError::MissingColumn { column, .. }) => assert_eq!(column, "route_id"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn records_deserialize_by_column_name() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Record {
            trip_id: String,
            route_id: String,
        }

        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "trips.txt",
            "\u{feff}route_id,service_id,trip_id\nR1,WK,T1\nR1\nR2,WK,T2\n",
        );
        let mut table = Table::open(&path).unwrap();
        let records: Vec<Record> = table.records().collect();

        assert_eq!(
            records,
            [
                Record {
                    trip_id: "T1".to_owned(),
                    route_id: "R1".to_owned()
                },
                Record {
                    trip_id: "T2".to_owned(),
                    route_id: "R2".to_owned()
                },
            ]
        );
        assert_eq!(table.skipped_rows(), 1);
    }
}
