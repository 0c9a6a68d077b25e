// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};

use serde_derive::*;

use std::collections::HashSet;

/// One pipeline stage: the CSV column holding its time and the axis label.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Phase {
    column: String,
    label: String,
}

impl Phase {
    pub fn new(column: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            label: label.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Ordered list of phases. Order drives both the row layout of loaded tables
/// and the x axis of the bar chart.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PhaseSet {
    phases: Vec<Phase>,
}

impl Default for PhaseSet {
    fn default() -> Self {
        Self {
            phases: vec![
                Phase::new("GStime", "Grayscale"),
                Phase::new("GBtime", "Gaussian Blur"),
                Phase::new("STtime", "Sobel Filter"),
                Phase::new("NMS", "Non-Max Suppression"),
                Phase::new("DTtime", "Double Threshold"),
                Phase::new("Hystime", "Hysteresis"),
            ],
        }
    }
}

impl PhaseSet {
    /// Build a phase set, rejecting empty lists and repeated columns.
    pub fn new(phases: Vec<Phase>) -> Result<Self> {
        if phases.is_empty() {
            return Err(Error::Config("at least one phase is required".to_owned()));
        }
        let mut seen = HashSet::new();
        for phase in &phases {
            if !seen.insert(phase.column()) {
                return Err(Error::Config(format!(
                    "phase column {:?} is listed more than once",
                    phase.column()
                )));
            }
        }
        Ok(Self { phases })
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Phase> {
        self.phases.iter()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.phases.iter().map(Phase::column)
    }
}

impl<'a> IntoIterator for &'a PhaseSet {
    type Item = &'a Phase;
    type IntoIter = std::slice::Iter<'a, Phase>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
