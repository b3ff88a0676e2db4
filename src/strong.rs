use std::ops::Range;

use log::{debug, warn};
use plotters::{
    coord::{cartesian::Cartesian2d, types::RangedCoordf64, Shift},
    prelude::*,
};
use rgb::RGB8;

use crate::{
    aggregate::{trend_lines, TrendLine},
    palette::{CategoryColors, TAB10},
    render::{finite, pt, px, render_err, rgb_color, Chart, FONT, GRID},
    Dataset, PlotError, Result, StrongRow,
};

pub const TITLE: &str = "Batch size vs execution time (colored by workers)";
pub const X_LABEL: &str = "Batch size";
pub const Y_LABEL: &str = "Execution time (s)";
pub const LEGEND_TITLE: &str = "workers";

// marker area of 80pt^2
const MARKER_RADIUS_PT: f64 = 5.05;
const MARKER_ALPHA: f64 = 0.9;
const TREND_ALPHA: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marker {
    pub batch_size: u32,
    pub execution_time: f64,
    pub worker_count: u32,
    pub color: RGB8,
}

/// Scatter of every run plus the per worker count mean trend.
#[derive(Debug, Clone, PartialEq)]
pub struct StrongScalabilityChart {
    markers: Vec<Marker>,
    trend: Option<Vec<TrendLine>>,
    colors: CategoryColors,
    x_range: Range<f64>,
    y_range: Range<f64>,
}

impl StrongScalabilityChart {
    /// Fails with `Unplottable` when the padded axes overflow.
    pub fn new(dataset: &Dataset<StrongRow>) -> Result<Self> {
        let rows = dataset.rows();
        let colors = CategoryColors::new(rows.iter().map(|row| row.worker_count));

        let markers: Vec<Marker> = rows
            .iter()
            .map(|row| Marker {
                batch_size: row.batch_size,
                execution_time: row.execution_time,
                worker_count: row.worker_count,
                color: colors
                    .color_of(row.worker_count)
                    .unwrap_or(TAB10[0]),
            })
            .collect();

        let x_range = padded(markers.iter().map(|m| m.batch_size as f64));
        let y_range = padded(markers.iter().map(|m| m.execution_time));
        finite("padded y axis upper bound", y_range.end)?;
        finite("padded y axis lower bound", y_range.start)?;

        let trend = match trend_lines(rows) {
            Ok(lines) => Some(lines),
            Err(err) => {
                warn!("{err}");
                None
            }
        };

        debug!(
            "strong chart: {} markers, {} worker categories",
            rows.len(),
            colors.categories().len()
        );
        Ok(Self {
            markers,
            trend,
            colors,
            x_range,
            y_range,
        })
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// `None` when the trend layer could not be computed.
    pub fn trend_lines(&self) -> Option<&[TrendLine]> {
        self.trend.as_deref()
    }

    pub fn colors(&self) -> &CategoryColors {
        &self.colors
    }

    pub fn x_range(&self) -> Range<f64> {
        self.x_range.clone()
    }

    pub fn y_range(&self) -> Range<f64> {
        self.y_range.clone()
    }

    fn draw_trend<DB: DrawingBackend>(
        &self,
        chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    ) -> Result<()> {
        let Some(lines) = &self.trend else {
            return Ok(());
        };
        for line in lines {
            let color = self
                .colors
                .color_of(line.worker_count)
                .map(rgb_color)
                .unwrap_or(BLACK);
            chart
                .draw_series(LineSeries::new(
                    line.points
                        .iter()
                        .map(|p| (p.batch_size as f64, p.mean_execution_time)),
                    color.mix(TREND_ALPHA).stroke_width(px(1.0)),
                ))
                .map_err(|err| PlotError::TrendLayer(err.to_string()))?;
        }
        Ok(())
    }

    fn draw_legend<DB: DrawingBackend>(&self, area: &DrawingArea<DB, Shift>) -> Result<()> {
        let (width, _) = area.dim_in_pixel();
        let font = pt(9.0);
        let row_height = (font * 1.4).round() as i32;
        let radius = px(3.5);
        let box_width = px(60.0) as i32;
        let box_height = row_height * (self.colors.categories().len() as i32 + 1) + px(6.0) as i32;
        let left = width as i32 - box_width - px(6.0) as i32;
        let top = px(6.0) as i32;

        area.draw(&Rectangle::new(
            [(left, top), (left + box_width, top + box_height)],
            WHITE.mix(0.8).filled(),
        ))
        .map_err(render_err)?;
        area.draw(&Rectangle::new(
            [(left, top), (left + box_width, top + box_height)],
            RGBColor(0xcc, 0xcc, 0xcc).stroke_width(1),
        ))
        .map_err(render_err)?;

        let pad = px(4.0) as i32;
        area.draw(&Text::new(
            LEGEND_TITLE,
            (left + pad, top + pad),
            (FONT, font).into_font().color(&BLACK),
        ))
        .map_err(render_err)?;

        for (idx, (workers, color)) in self.colors.legend().enumerate() {
            let y = top + pad + row_height * (idx as i32 + 1);
            let center = (left + pad + radius as i32, y + row_height / 2 - pad / 2);
            area.draw(&Circle::new(
                center,
                radius,
                rgb_color(color).mix(MARKER_ALPHA).filled(),
            ))
            .map_err(render_err)?;
            area.draw(&Text::new(
                workers.to_string(),
                (center.0 + radius as i32 + pad, y),
                (FONT, font).into_font().color(&BLACK),
            ))
            .map_err(render_err)?;
        }
        Ok(())
    }
}

impl Chart for StrongScalabilityChart {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, (FONT, pt(12.0)).into_font())
            .margin(px(8.0))
            .x_label_area_size(px(30.0))
            .y_label_area_size(px(40.0))
            .build_cartesian_2d(self.x_range(), self.y_range())
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(WHITE)
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .axis_desc_style((FONT, pt(10.0)).into_font())
            .label_style((FONT, pt(9.0)).into_font())
            .x_label_formatter(&|x| format!("{x:.0}"))
            .y_label_formatter(&|y| format!("{y:.1}"))
            .draw()
            .map_err(render_err)?;

        let radius = px(MARKER_RADIUS_PT);
        chart
            .draw_series(self.markers.iter().map(|m| {
                EmptyElement::at((m.batch_size as f64, m.execution_time))
                    + Circle::new((0, 0), radius, rgb_color(m.color).mix(MARKER_ALPHA).filled())
                    + Circle::new((0, 0), radius, WHITE.stroke_width(px(0.75)))
            }))
            .map_err(render_err)?;

        // the scatter is the deliverable, the trend overlay is best effort
        if let Err(err) = self.draw_trend(&mut chart) {
            warn!("{err}");
        }

        self.draw_legend(&chart.plotting_area().strip_coord_spec())
    }
}

/// Data range widened by 5% on each side; never empty.
fn padded(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return 0.0..1.0;
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * 0.05
    } else if max != 0.0 {
        max.abs() * 0.05
    } else {
        1.0
    };
    (min - pad)..(max + pad)
}
