//! Static SVG line graphs of monitored quantities

use crate::errors::Result;
use crate::output::plot_path;
use crate::series::{Samples, TimeSeries, VolumeValue};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const LEFT_MARGIN: f64 = 90.0;
const RIGHT_MARGIN: f64 = 30.0;
const TOP_MARGIN: f64 = 40.0;
const BOTTOM_MARGIN: f64 = 60.0;
const TICK_LEN: f64 = 6.0;
const MAX_TICKS: usize = 10;
const LINE_COLOR: &str = "#1f77b4";
const GRID_COLOR: &str = "rgb(120,120,120)";

/// Single-series line graph
#[derive(Debug, Clone)]
pub struct LineGraph {
    pub width: f64,
    pub height: f64,
    pub data_x: Vec<f64>,
    pub data_y: Vec<f64>,
    pub title: String,
    pub x_axis_label: String,
    pub y_axis_label: String,
    pub draw_gridlines: bool,
}

/// Evenly spaced axis ticks on "nice" values (1, 2, 5 times a power of 10)
#[derive(Debug, Clone, PartialEq)]
struct Axis {
    min: f64,
    max: f64,
    spacing: f64,
    decimals: usize,
}

impl Axis {
    fn fit(lo: f64, hi: f64) -> Self {
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) };
        let range = hi - lo;

        let mut spacing = 10f64.powf((range / MAX_TICKS as f64).log10().floor());
        let mut step = 0;
        while (range / spacing).ceil() as usize > MAX_TICKS {
            spacing *= if step % 3 == 1 { 2.5 } else { 2.0 };
            step += 1;
        }

        let min = (lo / spacing).floor() * spacing;
        let max = (hi / spacing).ceil() * spacing;
        let decimals = if spacing >= 1.0 {
            0
        } else {
            (-spacing.log10()).ceil() as usize
        };
        Self {
            min,
            max,
            spacing,
            decimals,
        }
    }

    fn ticks(&self) -> Vec<f64> {
        let count = ((self.max - self.min) / self.spacing).round() as usize;
        (0..=count).map(|k| self.min + k as f64 * self.spacing).collect()
    }

    fn scale(&self, v: f64, length: f64) -> f64 {
        (v - self.min) / (self.max - self.min) * length
    }
}

impl LineGraph {
    /// Graph with default size and grid lines
    pub fn new(
        data_x: Vec<f64>,
        data_y: Vec<f64>,
        title: &str,
        x_label: &str,
        y_label: &str,
    ) -> Self {
        Self {
            width: 700.0,
            height: 500.0,
            data_x,
            data_y,
            title: title.to_string(),
            x_axis_label: x_label.to_string(),
            y_axis_label: y_label.to_string(),
            draw_gridlines: true,
        }
    }

    /// Render as a standalone SVG document
    pub fn get_svg(&self) -> String {
        let plot_w = self.width - LEFT_MARGIN - RIGHT_MARGIN;
        let plot_h = self.height - TOP_MARGIN - BOTTOM_MARGIN;
        let n = self.data_x.len().min(self.data_y.len());

        let (x_lo, x_hi) = bounds(&self.data_x[..n]);
        let (y_lo, y_hi) = bounds(&self.data_y[..n]);
        let x_axis = Axis::fit(x_lo, x_hi);
        let y_axis = Axis::fit(y_lo, y_hi);

        let mut s = String::new();
        let _ = writeln!(
            s,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(
            s,
            r#"<style>text {{ font-family: Sans, Arial; font-size: 12px; }} .axisLabel {{ font-weight: bold; }} .gridLine {{ stroke: {}; stroke-dasharray: 1, 5; stroke-width: 1; }} .tick {{ stroke: black; stroke-width: 1; }}</style>"#,
            GRID_COLOR
        );
        let _ = writeln!(
            s,
            r#"<rect width="{}" height="{}" fill="white"/>"#,
            self.width, self.height
        );
        let _ = writeln!(
            s,
            r#"<text x="{}" y="{}" text-anchor="middle" class="axisLabel">{}</text>"#,
            self.width / 2.0,
            TOP_MARGIN / 2.0,
            escape(&self.title)
        );
        let _ = writeln!(
            s,
            r#"<g transform="translate({},{})">"#,
            LEFT_MARGIN,
            TOP_MARGIN + plot_h
        );

        for t in x_axis.ticks() {
            let x = x_axis.scale(t, plot_w);
            if self.draw_gridlines && x > 0.0 && x < plot_w {
                let _ = writeln!(
                    s,
                    r#"<line x1="{x:.2}" y1="0" x2="{x:.2}" y2="{:.2}" class="gridLine"/>"#,
                    -plot_h
                );
            }
            let _ = writeln!(
                s,
                r#"<line x1="{x:.2}" y1="0" x2="{x:.2}" y2="{}" class="tick"/>"#,
                TICK_LEN
            );
            let _ = writeln!(
                s,
                r#"<text x="{x:.2}" y="{}" text-anchor="middle">{:.*}</text>"#,
                TICK_LEN + 14.0,
                x_axis.decimals,
                t
            );
        }

        for t in y_axis.ticks() {
            let y = -y_axis.scale(t, plot_h);
            if self.draw_gridlines && y < 0.0 && y > -plot_h {
                let _ = writeln!(
                    s,
                    r#"<line x1="0" y1="{y:.2}" x2="{:.2}" y2="{y:.2}" class="gridLine"/>"#,
                    plot_w
                );
            }
            let _ = writeln!(
                s,
                r#"<line x1="0" y1="{y:.2}" x2="{}" y2="{y:.2}" class="tick"/>"#,
                -TICK_LEN
            );
            let _ = writeln!(
                s,
                r#"<text x="{}" y="{y:.2}" text-anchor="end" dominant-baseline="middle">{:.*}</text>"#,
                -TICK_LEN - 4.0,
                y_axis.decimals,
                t
            );
        }

        let _ = writeln!(
            s,
            r#"<rect x="0" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="black"/>"#,
            -plot_h,
            plot_w,
            plot_h
        );

        if n > 0 {
            let mut points = String::with_capacity(n * 16);
            for i in 0..n {
                let _ = write!(
                    points,
                    "{:.2},{:.2} ",
                    x_axis.scale(self.data_x[i], plot_w),
                    -y_axis.scale(self.data_y[i], plot_h)
                );
            }
            let _ = writeln!(
                s,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="1"/>"#,
                points.trim_end(),
                LINE_COLOR
            );
        }

        let _ = writeln!(
            s,
            r#"<text x="{:.2}" y="{}" text-anchor="middle" class="axisLabel">{}</text>"#,
            plot_w / 2.0,
            TICK_LEN + 38.0,
            escape(&self.x_axis_label)
        );
        let _ = writeln!(
            s,
            r#"<text transform="translate({},{:.2}) rotate(270)" text-anchor="middle" class="axisLabel">{}</text>"#,
            -LEFT_MARGIN + 18.0,
            -plot_h / 2.0,
            escape(&self.y_axis_label)
        );
        s.push_str("</g>\n</svg>\n");
        s
    }
}

/// Write one graph per column of the series next to the log
///
/// Volume samples are decoded before plotting.
pub fn plot_series(
    series: &TimeSeries,
    hpc_log: &Path,
    width: f64,
    height: f64,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for column in series.columns() {
        let y: Vec<f64> = match &column.samples {
            Samples::Numeric(v) => v.clone(),
            Samples::Abbreviated(text) => text
                .iter()
                .map(|t| VolumeValue::decode(t).map(|v| v as f64))
                .collect::<Result<_>>()?,
        };

        let y_label = column.category.axis_label();
        let mut graph = LineGraph::new(
            series.time().to_vec(),
            y,
            &column.name,
            "Time (hrs)",
            y_label,
        );
        graph.width = width;
        graph.height = height;

        let path = plot_path(hpc_log, &column.name);
        fs::write(&path, graph.get_svg())?;
        written.push(path);
    }
    Ok(written)
}

fn bounds(values: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if lo > hi {
        (0.0, 1.0)
    } else {
        (lo, hi)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_axis_fit_nice_spacing() {
        let axis = Axis::fit(0.0, 48.0);
        assert_eq!(axis.spacing, 5.0);
        assert_eq!(axis.min, 0.0);
        assert_eq!(axis.max, 50.0);
        assert_eq!(axis.ticks().len(), 11);
        assert_eq!(axis.decimals, 0);
    }

    #[test]
    fn test_axis_fit_flat_data() {
        let axis = Axis::fit(42.0, 42.0);
        assert!(axis.min < 42.0 && axis.max > 42.0);
    }

    #[test]
    fn test_axis_fit_small_range() {
        let axis = Axis::fit(0.0, 0.35);
        assert!(axis.spacing < 0.1);
        assert!(axis.decimals >= 2);
    }

    #[test]
    fn test_svg_contents() {
        let graph = LineGraph::new(
            vec![0.0, 1.0, 2.0],
            vec![10.0, 20.0, 15.0],
            "nWet",
            "Time (hrs)",
            "Number of Wetted Cells",
        );
        let svg = graph.get_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("Number of Wetted Cells"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_plot_series_writes_one_file_per_column() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("Q100.hpc.tlf");
        let series = TimeSeries::new(vec![0.0, 0.5, 1.0])
            .unwrap()
            .with_column("nWet", Samples::Numeric(vec![1.0, 2.0, 2.0]))
            .unwrap()
            .with_column(
                "vol",
                Samples::Abbreviated(vec!["1'".into(), "2'".into(), "2'".into()]),
            )
            .unwrap();

        let written = plot_series(&series, &log, 400.0, 300.0).unwrap();
        assert_eq!(written.len(), 2);
        assert!(temp_dir.path().join("Q100_nWet.svg").exists());
        let vol_svg = std::fs::read_to_string(temp_dir.path().join("Q100_vol.svg")).unwrap();
        assert!(vol_svg.contains("Volume (cu.ft.)"));
    }
}
