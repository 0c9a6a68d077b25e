// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::table::{Architecture, Table};

/// A (size, total time) point tagged with the backend that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombinedRow {
    pub arch: Architecture,
    pub size: i64,
    pub total: f64,
}

/// Both tables concatenated and projected down to what the scatter plot
/// needs. CPU rows come first, each table keeps its file order.
#[derive(Clone, Debug, Default)]
pub struct CombinedTable {
    rows: Vec<CombinedRow>,
}

impl CombinedTable {
    pub fn new(cpu: &Table, gpu: &Table) -> Self {
        let rows = tagged(cpu).chain(tagged(gpu)).collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[CombinedRow] {
        &self.rows
    }

    pub fn by_arch(&self, arch: Architecture) -> impl Iterator<Item = &CombinedRow> {
        self.rows.iter().filter(move |row| row.arch == arch)
    }
}

fn tagged(table: &Table) -> impl Iterator<Item = CombinedRow> + '_ {
    let arch = table.arch();
    table.rows().iter().map(move |row| CombinedRow {
        arch,
        size: row.size(),
        total: row.total(),
    })
}
