//! Input and output tables, and their CSV form.

use crate::error::{GroupingError, Result};
use crate::grouping::Group;
use crate::record::Record;
use chrono::NaiveDateTime;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const EXPECTED_HEADER: [&str; 2] = ["Name", "Address"];
pub const GROUPED_NAMES_COLUMN: &str = "GroupedNames";

/// Fail unless the header is exactly `Name, Address`.
pub fn validate_header<S: AsRef<str>>(header: &[S]) -> Result<()> {
    let found: Vec<&str> = header.iter().map(AsRef::as_ref).collect();
    if found != EXPECTED_HEADER {
        return Err(GroupingError::HeaderInvalid {
            expected: EXPECTED_HEADER.iter().map(|s| s.to_string()).collect(),
            found: found.iter().map(|s| s.to_string()).collect(),
        });
    }
    Ok(())
}

/// Validated `(Name, Address)` rows.
#[derive(Debug, Clone, Default)]
pub struct InputTable {
    pub records: Vec<Record>,
}

impl InputTable {
    pub fn from_rows<S, I, N, A>(header: &[S], rows: I) -> Result<Self>
    where
        S: AsRef<str>,
        I: IntoIterator<Item = (N, A)>,
        N: Into<String>,
        A: Into<String>,
    {
        validate_header(header)?;
        let records = rows
            .into_iter()
            .enumerate()
            .map(|(i, (name, address))| Record::new(i, name, address))
            .collect();
        Ok(Self { records })
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        validate_header(&header)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            records.push(Record::new(
                i,
                row.get(0).unwrap_or_default(),
                row.get(1).unwrap_or_default(),
            ));
        }
        tracing::debug!(rows = records.len(), "input table loaded");
        Ok(Self { records })
    }

    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| GroupingError::InputUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_csv_reader(file)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Single-column result table, sorted ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTable {
    pub rows: Vec<String>,
}

impl GroupedTable {
    pub fn from_groups(groups: &[Group]) -> Self {
        let mut rows: Vec<String> = groups.iter().map(|g| g.names.clone()).collect();
        rows.sort();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([GROUPED_NAMES_COLUMN])?;
        for row in &self.rows {
            wtr.write_record([row])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write into `dir` under a timestamped name and return the full path.
    pub fn write_to_dir(&self, dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
        let path = dir.join(output_file_name(now));
        self.write_csv(File::create(&path)?)?;
        Ok(path)
    }
}

/// `file_<dd>_<mm>_<YYYY>__<HH>_<MM>_<SS>.csv`
pub fn output_file_name(now: NaiveDateTime) -> String {
    format!("file_{}.csv", now.format("%d_%m_%Y__%H_%M_%S"))
}

/// The input must be an existing `.csv` file.
pub fn validate_input_path(path: &Path) -> Result<()> {
    let unreadable = |reason: &str| GroupingError::InputUnreadable {
        path: path.display().to_string(),
        reason: reason.to_string(),
    };
    if !path.is_file() {
        return Err(unreadable("input file path is not valid"));
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(()),
        _ => Err(unreadable("wrong file format, expected a .csv file")),
    }
}

/// Create the output directory tree if it does not exist.
pub fn prepare_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
        tracing::debug!(dir = %dir.display(), "output directory created");
    }
    Ok(())
}
