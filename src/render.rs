use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

use log::{info, warn};
use plotters::{coord::Shift, drawing::DrawingAreaErrorKind, prelude::*};
use rgb::RGB8;

use crate::{PlotError, Result};

pub const DPI: f64 = 200.0;
pub const FIGURE_INCHES: (f64, f64) = (8.0, 5.0);

pub const FONT: &str = "sans-serif";
pub const GRID: RGBColor = RGBColor(0xea, 0xea, 0xf2);

pub fn canvas_size() -> (u32, u32) {
    (
        (FIGURE_INCHES.0 * DPI).round() as u32,
        (FIGURE_INCHES.1 * DPI).round() as u32,
    )
}

/// Typographic points to pixels on the canvas.
pub fn pt(points: f64) -> f64 {
    points * DPI / 72.0
}

pub fn px(points: f64) -> u32 {
    pt(points).round() as u32
}

pub fn rgb_color(color: RGB8) -> RGBColor {
    RGBColor(color.r, color.g, color.b)
}

pub(crate) fn render_err<E>(err: DrawingAreaErrorKind<E>) -> PlotError
where
    E: std::error::Error + Send + Sync,
{
    PlotError::Render(err.to_string())
}

/// Plotters cannot lay out an axis or element at a non-finite coordinate.
pub(crate) fn finite(what: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PlotError::Unplottable(format!("{what} is {value}")))
    }
}

/// A fully computed chart that can be drawn on any plotters backend.
pub trait Chart {
    fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub out: PathBuf,
    pub show: bool,
}

/// Writes the chart to `path`, SVG for `.svg` and a raster image otherwise.
///
/// The image is drawn into a hidden sibling file which replaces `path` only
/// once drawing succeeded, so a failed render leaves nothing at `path`.
pub fn save<C: Chart>(chart: &C, path: &Path) -> Result<()> {
    let partial = partial_path(path);
    let drawn = draw_to(chart, &partial, is_svg(path))
        .and_then(|()| fs::rename(&partial, path).map_err(PlotError::io(path)));
    if drawn.is_err() {
        // backends flush on drop, so the partial file may exist even after an error
        let _ = fs::remove_file(&partial);
    }
    drawn
}

fn draw_to<C: Chart>(chart: &C, target: &Path, svg: bool) -> Result<()> {
    let size = canvas_size();
    if svg {
        let root = SVGBackend::new(target, size).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(render_err)
    } else {
        let root = BitMapBackend::new(target, size).into_drawing_area();
        chart.draw(&root)?;
        root.present().map_err(render_err)
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}

/// `out/plot.png` -> `out/.partial-plot.png`; keeps the extension that picks the encoder.
fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "chart".to_string());
    path.with_file_name(format!(".partial-{name}"))
}

/// Opens the image with the platform viewer and waits for the launcher to exit.
pub fn show(path: &Path) -> Result<()> {
    let status = viewer(path).status().map_err(PlotError::Display)?;
    if !status.success() {
        return Err(PlotError::Display(std::io::Error::other(format!(
            "viewer exited with {status}"
        ))));
    }
    Ok(())
}

#[cfg(target_os = "macos")]
fn viewer(path: &Path) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(path);
    cmd
}

#[cfg(target_os = "windows")]
fn viewer(path: &Path) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.args(["/C", "start", ""]).arg(path);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn viewer(path: &Path) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(path);
    cmd
}

/// Saves the chart, then optionally shows it. Nothing is written unless the
/// chart was fully computed beforehand.
pub fn publish<C: Chart>(chart: &C, options: &RenderOptions) -> Result<()> {
    save(chart, &options.out)?;
    info!("chart written to {}", options.out.display());
    println!("Saved plot to {}", options.out.display());

    if options.show {
        if let Err(err) = show(&options.out) {
            warn!("{err}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use std::{fs, path::PathBuf};

    use plotters::{coord::Shift, prelude::*};

    use super::{canvas_size, partial_path, pt, px, render_err, save, Chart};
    use crate::{PlotError, Result};

    struct Blank;

    impl Chart for Blank {
        fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
            root.fill(&WHITE).map_err(render_err)
        }
    }

    /// Paints part of the canvas, then gives up.
    struct HalfDrawn;

    impl Chart for HalfDrawn {
        fn draw<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> Result<()> {
            root.fill(&WHITE).map_err(render_err)?;
            Err(PlotError::Render("font unavailable".into()))
        }
    }

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("yolo-scaling-plots-{}", std::process::id()));
        fs::create_dir_all(&dir).expect("can't create scratch dir");
        dir.join(name)
    }

    #[test]
    fn failed_draw_leaves_no_file() {
        for name in ["half_drawn.png", "half_drawn.svg"] {
            let path = scratch(name);
            let err = save(&HalfDrawn, &path).unwrap_err();
            assert!(matches!(err, PlotError::Render(_)));
            assert!(!path.exists(), "{name} was written");
            assert!(!partial_path(&path).exists(), "{name} left a partial file");
        }
    }

    #[test]
    fn failed_draw_keeps_previous_image() {
        let path = scratch("previous.png");
        save(&Blank, &path).unwrap();
        let before = fs::read(&path).unwrap();

        assert!(save(&HalfDrawn, &path).is_err());
        assert_eq!(before, fs::read(&path).unwrap());
    }

    #[test]
    fn successful_save_writes_only_the_target() {
        for name in ["blank.png", "blank.svg"] {
            let path = scratch(name);
            save(&Blank, &path).unwrap();
            assert!(path.exists());
            assert!(!partial_path(&path).exists());
        }
        let svg = fs::read_to_string(scratch("blank.svg")).unwrap();
        assert!(svg.contains("<svg"));
    }

    #[test]
    fn partial_file_keeps_the_extension() {
        assert_eq!(
            PathBuf::from("out/.partial-plot.png"),
            partial_path(&PathBuf::from("out/plot.png"))
        );
    }

    #[test]
    fn canvas_is_eight_by_five_inches_at_200_dpi() {
        let (w, h) = canvas_size();
        assert_eq!((1600, 1000), (w, h));
        assert_eq!(8.0 / 5.0, w as f64 / h as f64);
    }

    #[test]
    fn points_scale_with_dpi() {
        assert_eq!(200.0, pt(72.0));
        assert_eq!(28, px(10.0));
    }
}
