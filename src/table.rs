// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::phase::PhaseSet;

use csv::StringRecord;
use logger::*;
use strum_macros::{Display, EnumIter, IntoStaticStr};

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Column holding the benchmarked file name.
pub const ID_COLUMN: &str = "FILE";
/// Column holding the input size in pixels.
pub const SIZE_COLUMN: &str = "SIZE";
/// Column holding the end to end time in microseconds.
pub const TOTAL_COLUMN: &str = "TOTAL";

/// Execution backend that produced a result table.
#[derive(
    Clone, Copy, Debug, Display, EnumIter, Eq, Hash, IntoStaticStr, Ord, PartialEq, PartialOrd,
)]
pub enum Architecture {
    #[strum(serialize = "CPU")]
    Cpu,
    #[strum(serialize = "GPU")]
    Gpu,
}

/// One benchmarked input file. Phase times are stored in `PhaseSet` order.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurement {
    id: String,
    size: i64,
    total: f64,
    phases: Vec<f64>,
}

impl Measurement {
    pub fn new(id: impl Into<String>, size: i64, total: f64, phases: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            size,
            total,
            phases,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn size(&self) -> i64 {
        self.size
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn phase(&self, index: usize) -> Option<f64> {
        self.phases.get(index).copied()
    }

    pub fn phases(&self) -> &[f64] {
        &self.phases
    }
}

/// All rows of one result file, in file order.
#[derive(Clone, Debug)]
pub struct Table {
    arch: Architecture,
    source: String,
    rows: Vec<Measurement>,
}

impl Table {
    /// Build a table from rows that were produced in code. No identifier
    /// uniqueness check is done here; `find` returns the first match.
    pub fn new(arch: Architecture, source: impl Into<String>, rows: Vec<Measurement>) -> Self {
        Self {
            arch,
            source: source.into(),
            rows,
        }
    }

    /// Load a result file, validating the header against `phases`.
    pub fn load<P: AsRef<Path>>(path: P, arch: Architecture, phases: &PhaseSet) -> Result<Self> {
        let source = path.as_ref().display().to_string();
        let file = File::open(path.as_ref())
            .map_err(|e| Error::data_format(&source, format!("cannot open file: {}", e)))?;
        let table = Self::from_reader(file, arch, source, phases)?;
        info!(
            "loaded {} table: {} rows from {}",
            table.arch,
            table.len(),
            table.source
        );
        Ok(table)
    }

    /// Parse CSV data from any reader. `source` is only used in messages.
    pub fn from_reader<R: Read>(
        reader: R,
        arch: Architecture,
        source: impl Into<String>,
        phases: &PhaseSet,
    ) -> Result<Self> {
        let source = source.into();
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| Error::data_format(&source, format!("cannot read header: {}", e)))?
            .clone();
        let columns = Columns::resolve(&headers, phases)
            .map_err(|reason| Error::data_format(&source, reason))?;

        let mut rows = Vec::new();
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (index, record) in rdr.records().enumerate() {
            let row = index + 1;
            let record = record
                .map_err(|e| Error::data_format(&source, format!("row {}: {}", row, e)))?;
            let measurement = columns
                .parse(&record, phases)
                .map_err(|reason| Error::data_format(&source, format!("row {}: {}", row, reason)))?;

            if let Some(first) = seen.insert(measurement.id.clone(), row) {
                return Err(Error::data_format(
                    &source,
                    format!(
                        "row {}: duplicate {} {:?} (first seen in row {})",
                        row, ID_COLUMN, measurement.id, first
                    ),
                ));
            }
            trace!("{} row {}: {:?}", arch, row, measurement);
            rows.push(measurement);
        }

        Ok(Self { arch, source, rows })
    }

    pub fn arch(&self) -> Architecture {
        self.arch
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(Measurement::id)
    }

    /// First row whose identifier equals `id`.
    pub fn find(&self, id: &str) -> Option<&Measurement> {
        self.rows.iter().find(|row| row.id == id)
    }
}

/// Load the CPU and GPU result files.
pub fn load_tables<P: AsRef<Path>, Q: AsRef<Path>>(
    cpu: P,
    gpu: Q,
    phases: &PhaseSet,
) -> Result<(Table, Table)> {
    let cpu = Table::load(cpu, Architecture::Cpu, phases)?;
    let gpu = Table::load(gpu, Architecture::Gpu, phases)?;
    Ok((cpu, gpu))
}

/// Header positions of every required column.
struct Columns {
    id: usize,
    size: usize,
    total: usize,
    phases: Vec<usize>,
}

impl Columns {
    fn resolve(headers: &StringRecord, phases: &PhaseSet) -> std::result::Result<Self, String> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut missing = Vec::new();
        let mut lookup = |name: &str| {
            let found = position(name);
            if found.is_none() {
                missing.push(name.to_owned());
            }
            found.unwrap_or(0)
        };

        let id = lookup(ID_COLUMN);
        let size = lookup(SIZE_COLUMN);
        let total = lookup(TOTAL_COLUMN);
        let phase_columns: Vec<usize> = phases.columns().map(|c| lookup(c)).collect();

        if !missing.is_empty() {
            return Err(format!("missing column(s): {}", missing.join(", ")));
        }

        Ok(Self {
            id,
            size,
            total,
            phases: phase_columns,
        })
    }

    fn parse(
        &self,
        record: &StringRecord,
        phases: &PhaseSet,
    ) -> std::result::Result<Measurement, String> {
        let id = field(record, self.id, ID_COLUMN)?;
        if id.is_empty() {
            return Err(format!("empty {}", ID_COLUMN));
        }

        let size = field(record, self.size, SIZE_COLUMN)?;
        let size = size
            .parse::<i64>()
            .map_err(|_| format!("{} {:?} is not a whole number", SIZE_COLUMN, size))?;

        let total = number(record, self.total, TOTAL_COLUMN)?;

        let times = self
            .phases
            .iter()
            .zip(phases.columns())
            .map(|(&index, name)| number(record, index, name))
            .collect::<std::result::Result<Vec<f64>, String>>()?;

        Ok(Measurement::new(id, size, total, times))
    }
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &str,
) -> std::result::Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing value for {}", name))
}

fn number(record: &StringRecord, index: usize, name: &str) -> std::result::Result<f64, String> {
    let value = field(record, index, name)?;
    value
        .parse::<f64>()
        .map_err(|_| format!("{} {:?} is not a number", name, value))
}
