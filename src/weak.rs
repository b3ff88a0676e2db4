use std::ops::Range;

use log::{debug, warn};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use rgb::RGB8;

use crate::{
    aggregate::{aggregate_by_workers, AggregatedGroup},
    palette::blues,
    render::{finite, pt, px, render_err, rgb_color, Chart, FONT, GRID},
    Dataset, PlotError, Result, WeakRow,
};

pub const TITLE: &str = "Weak scalability: workers (categorical) vs execution time";
pub const X_LABEL: &str = "Workers";
pub const Y_LABEL: &str = "Execution time (s)";

/// Annotation offset above a bar, as a fraction of the reference scale.
pub const ANNOTATION_OFFSET: f64 = 0.02;
const HEADROOM: f64 = 1.15;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Slot on the categorical axis, 0 for the smallest worker count.
    pub position: usize,
    pub group: AggregatedGroup,
    pub color: RGB8,
}

impl Bar {
    pub fn height(&self) -> f64 {
        self.group.mean_execution_time
    }

    /// Absolute workload over its share of the largest workload.
    pub fn annotation(&self) -> [String; 2] {
        [
            format!("{} imgs", self.group.max_images_tested),
            format!("({:.0}%)", self.group.images_pct),
        ]
    }
}

/// Y axis range; `Clamped` when an explicit upper bound was applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YAxis {
    Auto(f64),
    Clamped(f64),
}

impl YAxis {
    pub fn upper(&self) -> f64 {
        match *self {
            YAxis::Auto(upper) | YAxis::Clamped(upper) => upper,
        }
    }
}

/// One bar per worker count, evenly spaced in ascending worker order.
#[derive(Debug, Clone, PartialEq)]
pub struct WeakScalabilityChart {
    bars: Vec<Bar>,
    reference: f64,
    y_axis: YAxis,
}

impl WeakScalabilityChart {
    /// Fails with `Unplottable` when the bars and their annotations do not fit
    /// on a finite axis.
    pub fn new(dataset: &Dataset<WeakRow>, ymax_seconds: Option<f64>) -> Result<Self> {
        let groups = aggregate_by_workers(dataset.rows());
        let colors = blues(groups.len());
        let bars: Vec<Bar> = groups
            .into_iter()
            .zip(colors)
            .enumerate()
            .map(|(position, (group, color))| Bar {
                position,
                group,
                color,
            })
            .collect();

        let bound = ymax_seconds.and_then(|bound| match clamp_bound(bound) {
            Ok(bound) => Some(bound),
            Err(err) => {
                warn!("{err}; falling back to an auto-scaled axis");
                None
            }
        });

        let tallest = bars.iter().map(Bar::height).fold(0.0, f64::max);
        let reference = bound.unwrap_or(tallest);
        let top = bars
            .iter()
            .map(|bar| bar.height() + ANNOTATION_OFFSET * reference)
            .fold(0.0, f64::max);
        finite("top annotation height", top)?;
        let y_axis = match bound {
            Some(bound) => YAxis::Clamped(bound),
            None => YAxis::Auto(finite("auto-scaled y axis upper bound", auto_upper(top))?),
        };

        debug!("weak chart: {} bars, y axis {:?}", bars.len(), y_axis);
        Ok(Self {
            bars,
            reference,
            y_axis,
        })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn y_axis(&self) -> YAxis {
        self.y_axis
    }

    pub fn y_range(&self) -> Range<f64> {
        0.0..self.y_axis.upper()
    }

    pub fn annotation_offset(&self) -> f64 {
        ANNOTATION_OFFSET * self.reference
    }
}

/// Validates an explicit Y axis upper bound in seconds.
pub fn clamp_bound(bound: f64) -> Result<f64> {
    if !bound.is_finite() {
        return Err(PlotError::AxisClamp {
            bound,
            reason: "bound must be a finite number",
        });
    }
    if bound <= 0.0 {
        return Err(PlotError::AxisClamp {
            bound,
            reason: "bound must be greater than zero",
        });
    }
    Ok(bound)
}

fn auto_upper(top: f64) -> f64 {
    if top > 0.0 {
        top * HEADROOM
    } else {
        1.0
    }
}

impl Chart for WeakScalabilityChart {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
        root.fill(&WHITE).map_err(render_err)?;

        let slots = self.bars.len() as u32;
        let labels: Vec<String> = self
            .bars
            .iter()
            .map(|bar| bar.group.worker_count.to_string())
            .collect();

        let mut chart = ChartBuilder::on(root)
            .caption(TITLE, (FONT, pt(12.0)).into_font())
            .margin(px(8.0))
            .x_label_area_size(px(30.0))
            .y_label_area_size(px(40.0))
            .build_cartesian_2d((0u32..slots).into_segmented(), self.y_range())
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .bold_line_style(GRID.stroke_width(1))
            .light_line_style(WHITE)
            .x_labels(labels.len() + 1)
            .x_desc(X_LABEL)
            .y_desc(Y_LABEL)
            .axis_desc_style((FONT, pt(10.0)).into_font())
            .label_style((FONT, pt(9.0)).into_font())
            .x_label_formatter(&|slot| match slot {
                SegmentValue::CenterOf(idx) => labels.get(*idx as usize).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .y_label_formatter(&|y| format!("{y:.1}"))
            .draw()
            .map_err(render_err)?;

        let margin = px(8.0);
        chart
            .draw_series(self.bars.iter().map(|bar| {
                let slot = bar.position as u32;
                let mut rect = Rectangle::new(
                    [
                        (SegmentValue::Exact(slot), 0.0),
                        (SegmentValue::Exact(slot + 1), bar.height()),
                    ],
                    rgb_color(bar.color).filled(),
                );
                rect.set_margin(0, 0, margin, margin);
                rect
            }))
            .map_err(render_err)?;

        let font = pt(9.0);
        let line_height = (font * 1.2).round() as i32;
        let style = (FONT, font)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        let offset = self.annotation_offset();
        chart
            .draw_series(self.bars.iter().map(|bar| {
                let [count, pct] = bar.annotation();
                EmptyElement::at((
                    SegmentValue::CenterOf(bar.position as u32),
                    bar.height() + offset,
                )) + Text::new(count, (0, -line_height), style.clone())
                    + Text::new(pct, (0, 0), style.clone())
            }))
            .map_err(render_err)?;

        Ok(())
    }
}
