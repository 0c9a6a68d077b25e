// Copyright 2021 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use super::scales::{log_bounds, PhaseCoord};
use super::colour;
use crate::error::{Error, Result};
use crate::phase::PhaseSet;
use crate::select::Selection;
use crate::table::Architecture;

use plotters::prelude::*;
use plotters::style::FontTransform;
use strum::IntoEnumIterator;

use std::ops::Range;

/// Width of one bar as a fraction of a phase slot.
pub const BAR_WIDTH: f64 = 0.35;

/// One rectangle of the grouped bar chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bar {
    pub phase: usize,
    pub arch: Architecture,
    pub left: f64,
    pub right: f64,
    pub value: f64,
}

/// Validated geometry of the per-phase comparison for one sample.
#[derive(Clone, Debug)]
pub struct BarLayout<'a> {
    id: &'a str,
    phases: &'a PhaseSet,
    bars: Vec<Bar>,
    y: Range<f64>,
}

impl<'a> BarLayout<'a> {
    /// Lay out one CPU and one GPU bar per phase. Every phase time must be a
    /// finite positive number because the y axis is logarithmic.
    pub fn new(selection: &Selection<'a>, phases: &'a PhaseSet) -> Result<Self> {
        let mut bars = Vec::with_capacity(2 * phases.len());

        for (index, phase) in phases.iter().enumerate() {
            for arch in Architecture::iter() {
                let row = selection.row(arch);
                let value = row.phase(index).ok_or_else(|| {
                    Error::data_format(
                        format!("{} row {:?}", arch, row.id()),
                        format!("no value for {}", phase.column()),
                    )
                })?;
                if !(value.is_finite() && value > 0.0) {
                    return Err(Error::InvalidMeasurement {
                        arch,
                        id: row.id().to_owned(),
                        column: phase.column().to_owned(),
                        value,
                    });
                }

                // CPU sits left of the slot centre, GPU right of it.
                let left = match arch {
                    Architecture::Cpu => index as f64 - BAR_WIDTH,
                    Architecture::Gpu => index as f64,
                };
                bars.push(Bar {
                    phase: index,
                    arch,
                    left,
                    right: left + BAR_WIDTH,
                    value,
                });
            }
        }

        let y = log_bounds(bars.iter().map(|bar| bar.value), 0.5, 2.0).ok_or_else(|| {
            Error::Config("at least one phase is required".to_owned())
        })?;

        Ok(Self {
            id: selection.id(),
            phases,
            bars,
            y,
        })
    }

    pub fn id(&self) -> &'a str {
        self.id
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Log axis range. Bars are drawn up from its lower end.
    pub fn y_range(&self) -> Range<f64> {
        self.y.clone()
    }

    pub fn caption(&self) -> String {
        format!("Execution time per phase (CPU vs. GPU), file: {}", self.id)
    }

    /// CPU time over GPU time for each phase, in phase order.
    pub fn speedups(&self) -> Vec<f64> {
        self.bars
            .chunks(2)
            .map(|pair| pair[0].value / pair[1].value)
            .collect()
    }
}

/// Renders a `BarLayout` to SVG.
#[derive(Clone, Copy, Debug)]
pub struct BarChart {
    size: (u32, u32),
}

impl BarChart {
    pub fn new(size: (u32, u32)) -> Self {
        Self { size }
    }

    /// Render to an in-memory SVG document.
    pub fn render(&self, layout: &BarLayout) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, self.size).into_drawing_area();
            root.fill(&WHITE)?;

            let floor = layout.y.start;
            let coord = PhaseCoord::new(layout.phases.len());
            let labels = |value: &f64| {
                coord
                    .index(*value)
                    .and_then(|index| layout.phases.get(index))
                    .map(|phase| phase.label().to_owned())
                    .unwrap_or_default()
            };

            let mut chart = ChartBuilder::on(&root)
                .caption(layout.caption(), ("sans-serif", 24))
                .margin(20)
                .set_label_area_size(LabelAreaPosition::Left, 80)
                .set_label_area_size(LabelAreaPosition::Bottom, 170)
                .build_cartesian_2d(
                    PhaseCoord::new(layout.phases.len()),
                    layout.y_range().log_scale(),
                )?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_labels(layout.phases.len())
                .x_label_formatter(&labels)
                .x_label_style(
                    ("sans-serif", 16)
                        .into_font()
                        .transform(FontTransform::Rotate90),
                )
                .y_desc("Time [μs] (log scale)")
                .draw()?;

            for arch in Architecture::iter() {
                let colour = colour(arch);
                chart
                    .draw_series(
                        layout
                            .bars
                            .iter()
                            .filter(|bar| bar.arch == arch)
                            .map(|bar| {
                                Rectangle::new(
                                    [(bar.left, floor), (bar.right, bar.value)],
                                    colour.filled(),
                                )
                            }),
                    )?
                    .label(arch.to_string())
                    .legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 15, y + 5)], colour.filled())
                    });
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
    use crate::phase::Phase;
    use crate::select::select_by_id;
    use crate::table::{Measurement, Table};

    fn tables(cpu_phases: Vec<f64>, gpu_phases: Vec<f64>) -> (Table, Table) {
        let cpu = Table::new(
            Architecture::Cpu,
            "cpu",
            vec![Measurement::new("a", 100, 50.0, cpu_phases)],
        );
        let gpu = Table::new(
            Architecture::Gpu,
            "gpu",
            vec![Measurement::new("a", 100, 20.0, gpu_phases)],
        );
        (cpu, gpu)
    }

    #[test]
    fn two_bars_per_phase() {
        let phases = PhaseSet::default();
        let (cpu, gpu) = tables(
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            vec![0.5, 1.0, 1.5, 2.0, 2.5, 3.0],
        );
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        let layout = BarLayout::new(&selection, &phases).unwrap();

        assert_eq!(layout.len(), 2 * phases.len());
        for (index, pair) in layout.bars().chunks(2).enumerate() {
            assert_eq!(pair[0].arch, Architecture::Cpu);
            assert_eq!(pair[1].arch, Architecture::Gpu);
            assert_eq!(pair[0].phase, index);
            assert_eq!(pair[1].phase, index);
            // side by side, not overlapping, straddling the slot centre
            assert!(pair[0].right <= pair[1].left);
            assert!((pair[0].right - index as f64).abs() < 1e-9);
            assert!((pair[1].right - pair[1].left - BAR_WIDTH).abs() < 1e-9);
        }
        assert_eq!(layout.speedups(), vec![2.0; 6]);

        let y = layout.y_range();
        assert!(y.start > 0.0);
        assert!(y.start < 0.5 && y.end > 6.0);
    }

    #[test]
    fn caption_names_the_sample() {
        let phases = PhaseSet::default();
        let (cpu, gpu) = tables(vec![1.0; 6], vec![0.5; 6]);
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        let layout = BarLayout::new(&selection, &phases).unwrap();
        assert!(layout.caption().ends_with("file: a"));
    }

    #[test]
    fn zero_phase_time_is_rejected() {
        let phases = PhaseSet::default();
        let (cpu, gpu) = tables(vec![1.0; 6], vec![0.5, 0.5, 0.5, 0.0, 0.5, 0.5]);
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        match BarLayout::new(&selection, &phases) {
            Err(Error::InvalidMeasurement {
                arch, column, value, ..
            }) => {
                assert_eq!(arch, Architecture::Gpu);
                assert_eq!(column, "NMS");
                assert_eq!(value, 0.0);
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn negative_and_nan_are_rejected() {
        let phases = PhaseSet::default();
        for bad in &[-1.0, f64::NAN, f64::INFINITY] {
            let (cpu, gpu) = tables(vec![*bad, 1.0, 1.0, 1.0, 1.0, 1.0], vec![1.0; 6]);
            let selection = select_by_id(&cpu, &gpu, "a").unwrap();
            assert!(matches!(
                BarLayout::new(&selection, &phases),
                Err(Error::InvalidMeasurement { .. })
            ));
        }
    }

    #[test]
    fn short_rows_are_reported() {
        let phases = PhaseSet::default();
        let (cpu, gpu) = tables(vec![1.0; 3], vec![1.0; 6]);
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        assert!(matches!(
            BarLayout::new(&selection, &phases),
            Err(Error::DataFormat { .. })
        ));
    }

    #[test]
    fn custom_phase_list() {
        let phases =
            PhaseSet::new(vec![Phase::new("GStime", "Gray"), Phase::new("NMS", "NMS")]).unwrap();
        let (cpu, gpu) = tables(vec![4.0, 8.0], vec![2.0, 2.0]);
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        let layout = BarLayout::new(&selection, &phases).unwrap();
        assert_eq!(layout.len(), 4);
        assert_eq!(layout.speedups(), vec![2.0, 4.0]);
    }

    fn filled_rects(svg: &str, fill: &str) -> usize {
        let attr = format!("fill=\"{}\"", fill);
        svg.split('<')
            .filter(|element| element.starts_with("rect") && element.contains(&attr))
            .count()
    }

    #[test]
    fn rendered_svg_has_one_bar_per_phase_and_backend() {
        let chart = BarChart::new((1000, 600));
        let custom =
            PhaseSet::new(vec![Phase::new("GStime", "Gray"), Phase::new("NMS", "NMS")]).unwrap();

        for phases in &[PhaseSet::default(), custom] {
            let (cpu, gpu) = tables(vec![10.0; phases.len()], vec![1.0; phases.len()]);
            let selection = select_by_id(&cpu, &gpu, "a").unwrap();
            let layout = BarLayout::new(&selection, phases).unwrap();
            let svg = chart.render(&layout).unwrap();

            // each series also draws one legend swatch
            assert_eq!(filled_rects(&svg, "#AA0000"), phases.len() + 1);
            assert_eq!(filled_rects(&svg, "#0000FF"), phases.len() + 1);
        }
    }

    #[test]
    fn render_is_deterministic_svg() {
        let phases = PhaseSet::default();
        let (cpu, gpu) = tables(vec![10.0; 6], vec![1.0; 6]);
        let selection = select_by_id(&cpu, &gpu, "a").unwrap();
        let layout = BarLayout::new(&selection, &phases).unwrap();
        let chart = BarChart::new((1000, 600));

        let first = chart.render(&layout).unwrap();
        let second = chart.render(&layout).unwrap();
        assert!(first.contains("<svg"));
        assert!(first.contains("Gaussian Blur"));
        assert_eq!(first, second);
    }
}
