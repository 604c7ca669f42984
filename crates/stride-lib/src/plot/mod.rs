use serde::{Deserialize, Serialize};

use crate::detectors::gait::GaitDetection;
use crate::signal::Leg;
use crate::stride::CanonicalStride;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Axis {
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Style {
    pub width: f32,
    pub markers: bool,
    pub color: Color,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineSeries {
    pub name: String,
    pub points: Vec<[f64; 2]>,
    pub style: Style,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
}

impl Series {
    pub fn points(&self) -> &[[f64; 2]] {
        match self {
            Series::Line(line) => &line.points,
        }
    }
}

/// Backend-neutral chart description handed to the plotting collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub x: Axis,
    pub y: Axis,
    pub series: Vec<Series>,
}

impl Figure {
    pub fn new(title: impl Into<Option<String>>) -> Self {
        Self {
            title: title.into(),
            x: Axis { label: None },
            y: Axis { label: None },
            series: Vec::new(),
        }
    }

    pub fn with_labels(mut self, x: &str, y: &str) -> Self {
        self.x.label = Some(x.into());
        self.y.label = Some(y.into());
        self
    }

    pub fn add_series(&mut self, series: Series) {
        self.series.push(series);
    }

    /// `(x_min, x_max, y_min, y_max)` over every series, `None` when empty.
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut points = self.series.iter().flat_map(|s| s.points().iter());
        let first = points.next()?;
        let init = (first[0], first[0], first[1], first[1]);
        Some(points.fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p[0]), x1.max(p[0]), y0.min(p[1]), y1.max(p[1]))
        }))
    }
}

pub trait PlotBackend {
    fn draw(&mut self, fig: &Figure) -> anyhow::Result<()>;
}

const LEFT_COLOR: u32 = 0x00FFFF;
const RIGHT_COLOR: u32 = 0x800080;

/// Cadence over the run: one point per valid gait event.
pub fn figure_from_cadence(detection: &GaitDetection) -> Figure {
    let mut fig = Figure::new(Some("Cadence Over Your Run".into()))
        .with_labels("Time (s)", "Strides per minute");
    fig.add_series(Series::Line(LineSeries {
        name: "Cadence".into(),
        points: detection.cadence_series(),
        style: Style {
            width: 2.0,
            markers: true,
            color: Color(0xFF0077),
        },
    }));
    fig
}

/// Median stride overlay, one curve per leg.
pub fn figure_from_stride(stride: &CanonicalStride) -> Figure {
    let mut fig =
        Figure::new(Some("Median Stride".into())).with_labels("Time (s)", "Degrees");
    for curve in &stride.legs {
        let color = match curve.leg {
            Leg::Left => LEFT_COLOR,
            Leg::Right => RIGHT_COLOR,
        };
        fig.add_series(Series::Line(LineSeries {
            name: curve.leg.name().into(),
            points: stride
                .time_s
                .iter()
                .zip(&curve.degrees)
                .map(|(t, d)| [*t, *d])
                .collect(),
            style: Style {
                width: 1.4,
                markers: true,
                color: Color(color),
            },
        }));
    }
    fig
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detectors::gait::GaitEvent;
    use crate::stride::{LegCurve, StrideCandidate};

    #[test]
    fn cadence_figure_uses_event_times() {
        let detection = GaitDetection {
            crossings: vec![14, 29, 44],
            events: vec![
                GaitEvent {
                    index: 29,
                    time_s: 29.0 / 30.0,
                    cadence_spm: 240.0,
                    span: 15,
                },
                GaitEvent {
                    index: 44,
                    time_s: 44.0 / 30.0,
                    cadence_spm: 180.0,
                    span: 15,
                },
            ],
        };
        let fig = figure_from_cadence(&detection);
        assert_eq!(fig.y.label.as_deref(), Some("Strides per minute"));
        assert_eq!(fig.series[0].points()[1], [44.0 / 30.0, 180.0]);
        let (_, x_max, y_min, y_max) = fig.bounds().expect("bounds");
        assert_eq!((x_max, y_min, y_max), (44.0 / 30.0, 180.0, 240.0));
    }

    #[test]
    fn stride_figure_has_one_series_per_leg() {
        let stride = CanonicalStride {
            source: StrideCandidate {
                boundary: 30,
                span: 15,
                cadence_spm: 120.0,
            },
            time_s: vec![0.0, 0.25, 0.5],
            legs: vec![
                LegCurve {
                    leg: Leg::Left,
                    degrees: vec![1.0, 2.0, 3.0],
                },
                LegCurve {
                    leg: Leg::Right,
                    degrees: vec![-1.0, -2.0, -3.0],
                },
            ],
        };
        let fig = figure_from_stride(&stride);
        assert_eq!(fig.series.len(), 2);
        match &fig.series[1] {
            Series::Line(line) => {
                assert_eq!(line.name, "Right");
                assert_eq!(line.points[2], [0.5, -3.0]);
            }
        }
    }

    #[test]
    fn empty_figure_has_no_bounds() {
        assert!(Figure::new(None::<String>).bounds().is_none());
    }
}
