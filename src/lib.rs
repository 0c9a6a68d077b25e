// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Compare CPU and GPU timings of a Canny edge detector.
//!
//! Two CSV result tables are loaded, one input file present in both is picked
//! for a per-phase grouped bar chart, and every row of both tables goes into a
//! log-log scatter of total time against image size.

pub mod chart;
pub mod combined;
pub mod config;
pub mod error;
pub mod phase;
pub mod select;
pub mod table;

pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::phase::{Phase, PhaseSet};
pub use crate::select::Selection;
pub use crate::table::{Architecture, Measurement, Table};

use crate::chart::{write_all_atomic, BarChart, BarLayout, ScatterChart, ScatterLayout};

use logger::*;
use rand::Rng;

use std::path::PathBuf;

pub use crate::config::VERSION;

/// What a successful run produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub sample: String,
    pub bar_output: PathBuf,
    pub scatter_output: PathBuf,
}

/// Loaded inputs plus the settings needed to turn them into charts.
pub struct Report {
    config: Config,
    phases: PhaseSet,
    cpu: Table,
    gpu: Table,
}

impl Report {
    /// Read both result tables named by `config`.
    pub fn load(config: Config) -> Result<Self> {
        let phases = config.phases()?;
        let (cpu, gpu) = table::load_tables(config.cpu_input(), config.gpu_input(), &phases)?;
        Ok(Self::new(config, phases, cpu, gpu))
    }

    pub fn new(config: Config, phases: PhaseSet, cpu: Table, gpu: Table) -> Self {
        Self {
            config,
            phases,
            cpu,
            gpu,
        }
    }

    pub fn cpu(&self) -> &Table {
        &self.cpu
    }

    pub fn gpu(&self) -> &Table {
        &self.gpu
    }

    /// The configured sample if there is one, otherwise a random common
    /// identifier drawn from `rng`.
    pub fn select<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Selection<'_>> {
        match self.config.sample() {
            Some(id) => select::select_by_id(&self.cpu, &self.gpu, id),
            None => select::select(&self.cpu, &self.gpu, rng),
        }
    }

    /// Render both charts with the configured seed.
    pub fn run(&self) -> Result<Outcome> {
        self.run_with(&mut select::rng(self.config.seed()))
    }

    /// Validate, render and stage both charts before renaming either into
    /// place, so any failure leaves existing outputs untouched.
    pub fn run_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Outcome> {
        let selection = self.select(rng)?;
        info!("selected sample: {}", selection.id());

        let bar = BarLayout::new(&selection, &self.phases)?;
        let scatter = ScatterLayout::new(&self.cpu, &self.gpu)?;
        self.summarize(&bar);

        let bar_svg = BarChart::new(self.config.bar_size()).render(&bar)?;
        let scatter_svg = ScatterChart::new(self.config.scatter_size()).render(&scatter)?;

        write_all_atomic(&[
            (self.config.bar_output(), bar_svg.as_bytes()),
            (self.config.scatter_output(), scatter_svg.as_bytes()),
        ])?;
        info!("bar chart written to {}", self.config.bar_output());
        info!(
            "scatter plot of {} rows written to {}",
            scatter.len(),
            self.config.scatter_output()
        );

        Ok(Outcome {
            sample: selection.id().to_owned(),
            bar_output: PathBuf::from(self.config.bar_output()),
            scatter_output: PathBuf::from(self.config.scatter_output()),
        })
    }

    fn summarize(&self, bar: &BarLayout) {
        for (phase, (pair, speedup)) in self
            .phases
            .iter()
            .zip(bar.bars().chunks(2).zip(bar.speedups()))
        {
            info!(
                "{:<20} CPU: {:>12.3} us GPU: {:>12.3} us Speedup: {:.2}x",
                phase.label(),
                pair[0].value,
                pair[1].value,
                speedup
            );
        }
    }
}

/// Load, select and render as configured.
pub fn run(config: Config) -> Result<Outcome> {
    Report::load(config)?.run()
}
