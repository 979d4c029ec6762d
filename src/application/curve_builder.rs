// Curve builder - uniform cubic B-spline through the scaled window
use crate::application::scale_mapper::ScaleMapper;
use crate::domain::geometry::{PathCommand, PathGeometry, ScaledPoint};
use crate::domain::window::Window;

/// Turns a window into stroke-ready geometry.
///
/// Stateless: the output depends only on the window and the mapper, so equal
/// inputs always yield equal geometry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurveBuilder;

impl CurveBuilder {
    pub fn build(window: &Window, mapper: &ScaleMapper) -> PathGeometry {
        let points: Vec<ScaledPoint> = window
            .iter()
            .map(|observation| mapper.map_observation(observation))
            .collect();

        PathGeometry::new(Self::basis(&points), mapper.grid_positions())
    }

    /// Basis spline through `points`. Every interior point pulls on its local
    /// neighbourhood instead of being hit exactly; the endpoints are hit.
    ///
    /// # Panics
    /// Panics if fewer than two points are supplied.
    pub fn basis(points: &[ScaledPoint]) -> Vec<PathCommand> {
        assert!(
            points.len() >= 2,
            "basis curve needs at least 2 points, got {}",
            points.len()
        );

        let n = points.len();
        let first = points[0];
        let last = points[n - 1];
        let mut commands = Vec::with_capacity(n + 2);
        commands.push(PathCommand::MoveTo(first));

        if n == 2 {
            commands.push(PathCommand::LineTo(last));
            return commands;
        }

        commands.push(PathCommand::LineTo(ScaledPoint::new(
            (5.0 * first.x + points[1].x) / 6.0,
            (5.0 * first.y + points[1].y) / 6.0,
        )));
        for triple in points.windows(3) {
            commands.push(bezier(triple[0], triple[1], triple[2]));
        }
        commands.push(bezier(points[n - 2], last, last));
        commands.push(PathCommand::LineTo(last));
        commands
    }
}

fn bezier(a: ScaledPoint, b: ScaledPoint, c: ScaledPoint) -> PathCommand {
    PathCommand::CurveTo {
        c1: ScaledPoint::new((2.0 * a.x + b.x) / 3.0, (2.0 * a.y + b.y) / 3.0),
        c2: ScaledPoint::new((a.x + 2.0 * b.x) / 3.0, (a.y + 2.0 * b.y) / 3.0),
        to: ScaledPoint::new((a.x + 4.0 * b.x + c.x) / 6.0, (a.y + 4.0 * b.y + c.y) / 6.0),
    }
}
