// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::scales::log_bounds;
use super::colour;
use crate::combined::CombinedTable;
use crate::error::{Error, Result};
use crate::table::{Architecture, Table, SIZE_COLUMN, TOTAL_COLUMN};

use plotters::prelude::*;
use strum::IntoEnumIterator;

use std::ops::Range;

const TITLE: &str = "Execution time vs. image size (log-log)";

/// Validated data and bounds for the size against total time plot.
#[derive(Clone, Debug)]
pub struct ScatterLayout {
    combined: CombinedTable,
    x: Range<f64>,
    y: Range<f64>,
}

impl ScatterLayout {
    /// Both axes are logarithmic, so every size and total time must be
    /// strictly positive.
    pub fn new(cpu: &Table, gpu: &Table) -> Result<Self> {
        for table in &[cpu, gpu] {
            for row in table.rows() {
                let (column, value) = if row.size() <= 0 {
                    (SIZE_COLUMN, row.size() as f64)
                } else if !(row.total().is_finite() && row.total() > 0.0) {
                    (TOTAL_COLUMN, row.total())
                } else {
                    continue;
                };
                return Err(Error::InvalidMeasurement {
                    arch: table.arch(),
                    id: row.id().to_owned(),
                    column: column.to_owned(),
                    value,
                });
            }
        }

        let combined = CombinedTable::new(cpu, gpu);
        let no_rows = || {
            Error::data_format(
                format!("{} and {}", cpu.source(), gpu.source()),
                "no rows to plot",
            )
        };
        let x = log_bounds(combined.rows().iter().map(|row| row.size as f64), 0.8, 1.5)
            .ok_or_else(no_rows)?;
        let y = log_bounds(combined.rows().iter().map(|row| row.total), 0.8, 1.5)
            .ok_or_else(no_rows)?;

        Ok(Self { combined, x, y })
    }

    pub fn combined(&self) -> &CombinedTable {
        &self.combined
    }

    pub fn len(&self) -> usize {
        self.combined.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combined.is_empty()
    }

    pub fn x_range(&self) -> Range<f64> {
        self.x.clone()
    }

    pub fn y_range(&self) -> Range<f64> {
        self.y.clone()
    }
}

/// Renders a `ScatterLayout` to SVG.
#[derive(Clone, Copy, Debug)]
pub struct ScatterChart {
    size: (u32, u32),
}

impl ScatterChart {
    pub fn new(size: (u32, u32)) -> Self {
        Self { size }
    }

    pub fn render(&self, layout: &ScatterLayout) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            root.fill(&WHITE)?;

            let mut chart = ChartBuilder::on(&root)
                .caption(TITLE, ("sans-serif", 24))
                .margin(20)
                .set_label_area_size(LabelAreaPosition::Left, 80)
                .set_label_area_size(LabelAreaPosition::Bottom, 60)
                .build_cartesian_2d(layout.x_range().log_scale(), layout.y_range().log_scale())?;

            chart
                .configure_mesh()
                .x_desc("Image size [pixels]")
                .y_desc("Total time [μs]")
                .draw()?;

            for arch in Architecture::iter() {
                let colour = colour(arch);
                chart
                    .draw_series(
                        layout.combined.by_arch(arch).map(|row| {
                            Circle::new((row.size as f64, row.total), 4, colour.mix(0.7).filled())
                        }),
                    )?
                    .label(arch.to_string())
                    .legend(move |(x, y)| Circle::new((x + 7, y), 4, colour.mix(0.7).filled()));
            }

            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8).filled())
                .border_style(BLACK.stroke_width(1))
                .draw()?;

            root.present()?;
        }
        Ok(svg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Measurement;

    fn table(arch: Architecture, rows: &[(&str, i64, f64)]) -> Table {
        let rows = rows
            .iter()
            .map(|(id, size, total)| Measurement::new(*id, *size, *total, vec![1.0; 6]))
            .collect();
        Table::new(arch, format!("{}.csv", arch), rows)
    }

    #[test]
    fn bounds_cover_every_point() {
        let cpu = table(Architecture::Cpu, &[("a", 100, 50.0), ("b", 10_000, 900.0)]);
        let gpu = table(Architecture::Gpu, &[("a", 100, 20.0), ("c", 40_000, 60.0)]);
        let layout = ScatterLayout::new(&cpu, &gpu).unwrap();

        assert_eq!(layout.len(), 4);
        let (x, y) = (layout.x_range(), layout.y_range());
        for row in layout.combined().rows() {
            assert!(x.start < row.size as f64 && (row.size as f64) < x.end);
            assert!(y.start < row.total && row.total < y.end);
        }
        assert!(x.start > 0.0 && y.start > 0.0);
    }

    #[test]
    fn zero_size_is_rejected() {
        let cpu = table(Architecture::Cpu, &[("a", 100, 50.0)]);
        let gpu = table(Architecture::Gpu, &[("a", 0, 20.0)]);
        match ScatterLayout::new(&cpu, &gpu) {
            Err(Error::InvalidMeasurement { arch, id, column, .. }) => {
                assert_eq!(arch, Architecture::Gpu);
                assert_eq!(id, "a");
                assert_eq!(column, SIZE_COLUMN);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn negative_size_is_rejected() {
        let cpu = table(Architecture::Cpu, &[("a", 100, 50.0), ("b", -5, 50.0)]);
        let gpu = table(Architecture::Gpu, &[("a", 100, 20.0)]);
        match ScatterLayout::new(&cpu, &gpu) {
            Err(Error::InvalidMeasurement { arch, id, column, value }) => {
                assert_eq!(arch, Architecture::Cpu);
                assert_eq!(id, "b");
                assert_eq!(column, SIZE_COLUMN);
                assert_eq!(value, -5.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn non_positive_total_is_rejected() {
        let cpu = table(Architecture::Cpu, &[("a", 100, -3.0)]);
        let gpu = table(Architecture::Gpu, &[("a", 100, 20.0)]);
        assert!(matches!(
            ScatterLayout::new(&cpu, &gpu),
            Err(Error::InvalidMeasurement { arch: Architecture::Cpu, .. })
        ));
    }

    #[test]
    fn nothing_to_plot() {
        let cpu = table(Architecture::Cpu, &[]);
        let gpu = table(Architecture::Gpu, &[]);
        assert!(matches!(
            ScatterLayout::new(&cpu, &gpu),
            Err(Error::DataFormat { .. })
        ));
    }

    #[test]
    fn render_is_deterministic_svg() {
        let cpu = table(Architecture::Cpu, &[("a", 100, 50.0), ("b", 400, 120.0)]);
        let gpu = table(Architecture::Gpu, &[("a", 100, 20.0)]);
        let layout = ScatterLayout::new(&cpu, &gpu).unwrap();
        let chart = ScatterChart::new((800, 600));

        let first = chart.render(&layout).unwrap();
        assert!(first.contains("<svg"));
        assert!(first.contains("log-log"));
        assert_eq!(first, chart.render(&layout).unwrap());
    }
}
