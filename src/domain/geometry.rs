// Path geometry - renderer-facing output of one recomputation
use serde::Serialize;
use std::fmt::Write as _;

/// A point in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaledPoint {
    pub x: f64,
    pub y: f64,
}

impl ScaledPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Draw command a renderer replays to stroke the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum PathCommand {
    MoveTo(ScaledPoint),
    LineTo(ScaledPoint),
    /// Cubic Bézier segment from the current point.
    CurveTo {
        c1: ScaledPoint,
        c2: ScaledPoint,
        to: ScaledPoint,
    },
}

/// Geometry of one chart at one tick. Replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathGeometry {
    pub curve: Vec<PathCommand>,
    pub grid_positions: Vec<f64>,
}

impl PathGeometry {
    pub fn new(curve: Vec<PathCommand>, grid_positions: Vec<f64>) -> Self {
        Self {
            curve,
            grid_positions,
        }
    }

    /// Placeholder published before the first computation.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.curve.is_empty()
    }

    /// Render the curve as an SVG path `d` attribute.
    pub fn to_svg_path(&self) -> String {
        let mut d = String::with_capacity(self.curve.len() * 48);
        for command in &self.curve {
            // Writing into a String cannot fail.
            let _ = match command {
                PathCommand::MoveTo(p) => write!(d, "M{},{}", p.x, p.y),
                PathCommand::LineTo(p) => write!(d, "L{},{}", p.x, p.y),
                PathCommand::CurveTo { c1, c2, to } => write!(
                    d,
                    "C{},{},{},{},{},{}",
                    c1.x, c1.y, c2.x, c2.y, to.x, to.y
                ),
            };
        }
        d
    }
}
