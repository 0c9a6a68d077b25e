// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use plotters::coord::ranged1d::{DefaultFormatting, KeyPointHint, Ranged};
use plotters::coord::types::RangedCoordf64;

use std::ops::Range;

/// Categorical axis with one slot per phase. Slot `i` is centred on `i` and
/// spans `[i - 0.5, i + 0.5]`, so offset bars can be placed with plain f64
/// coordinates while the tick marks land on the slot centres.
pub struct PhaseCoord {
    count: usize,
    inner: RangedCoordf64,
}

impl PhaseCoord {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            inner: (-0.5..count as f64 - 0.5).into(),
        }
    }

    /// Slot index for a tick value, if it is one of ours.
    pub fn index(&self, value: f64) -> Option<usize> {
        let rounded = value.round();
        if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= self.count as f64 {
            None
        } else {
            Some(rounded as usize)
        }
    }
}

impl Ranged for PhaseCoord {
    type FormatOption = DefaultFormatting;
    type ValueType = f64;

    fn map(&self, value: &f64, limit: (i32, i32)) -> i32 {
        self.inner.map(value, limit)
    }

    fn key_points<Hint: KeyPointHint>(&self, _hint: Hint) -> Vec<f64> {
        (0..self.count).map(|i| i as f64).collect()
    }

    fn range(&self) -> Range<f64> {
        self.inner.range()
    }
}

/// Axis bounds for strictly positive data on a log axis, widened by the
/// factors `below` (< 1) and `above` (> 1). `None` when there is no data.
/// Both ends stay finite and positive even for values near the limits of
/// `f64`.
pub fn log_bounds<I>(values: I, below: f64, above: f64) -> Option<Range<f64>>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;
    Some((min * below).max(f64::MIN_POSITIVE)..(max * above).min(f64::MAX))
}
