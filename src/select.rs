// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use crate::error::{Error, Result};
use crate::table::{Architecture, Measurement, Table};

use logger::*;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

use std::collections::BTreeSet;

/// The sample shown in the bar chart: one identifier and its row from each
/// table.
#[derive(Clone, Copy, Debug)]
pub struct Selection<'a> {
    id: &'a str,
    cpu: &'a Measurement,
    gpu: &'a Measurement,
}

impl<'a> Selection<'a> {
    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn cpu(&self) -> &'a Measurement {
        self.cpu
    }

    pub fn gpu(&self) -> &'a Measurement {
        self.gpu
    }

    pub fn row(&self, arch: Architecture) -> &'a Measurement {
        match arch {
            Architecture::Cpu => self.cpu,
            Architecture::Gpu => self.gpu,
        }
    }
}

/// Identifiers present in both tables. Ordered, so that a seeded choice does
/// not depend on hashing.
pub fn common_identifiers<'a>(cpu: &'a Table, gpu: &'a Table) -> BTreeSet<&'a str> {
    let gpu_ids: BTreeSet<&str> = gpu.ids().collect();
    cpu.ids().filter(|id| gpu_ids.contains(id)).collect()
}

/// Choose one common identifier uniformly at random.
pub fn select<'a, R: Rng + ?Sized>(
    cpu: &'a Table,
    gpu: &'a Table,
    rng: &mut R,
) -> Result<Selection<'a>> {
    let common: Vec<&str> = common_identifiers(cpu, gpu).into_iter().collect();
    debug!("{} identifiers are present in both tables", common.len());

    let id = *common.choose(rng).ok_or_else(|| Error::NoCommonSample {
        cpu: cpu.source().to_owned(),
        gpu: gpu.source().to_owned(),
    })?;
    select_by_id(cpu, gpu, id)
}

/// Select a caller-chosen identifier instead of drawing one.
pub fn select_by_id<'a>(cpu: &'a Table, gpu: &'a Table, id: &str) -> Result<Selection<'a>> {
    match (cpu.find(id), gpu.find(id)) {
        (Some(cpu), Some(gpu)) => Ok(Selection {
            id: cpu.id(),
            cpu,
            gpu,
        }),
        _ if common_identifiers(cpu, gpu).is_empty() => Err(Error::NoCommonSample {
            cpu: cpu.source().to_owned(),
            gpu: gpu.source().to_owned(),
        }),
        _ => Err(Error::UnknownSample { id: id.to_owned() }),
    }
}

/// Sampling RNG: reproducible when seeded, entropy-seeded otherwise.
pub fn rng(seed: Option<u64>) -> Xoshiro256PlusPlus {
    match seed {
        Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
        None => Xoshiro256PlusPlus::from_entropy(),
    }
}
