//! Decorative geometry riveted to a planet's surface.

use euclid::default::{Point2D, Vector2D};

/// A rigid polygon attached to a planet's surface at a fixed angle.
/// The point list is in planet-local coordinates with y measured outward
/// from the surface; the geometry never changes after construction.
#[derive(Clone, Debug)]
pub struct SurfaceFeature {
    /// Id of the owning planet. A back-reference only; the planet's
    /// `Body` owns the feature.
    pub planet: usize,
    /// Angular placement along the surface, in radians.
    pub theta: f64,
    /// Color is stored as 0xRRGGBB
    pub color: u32,
    pub points: Vec<Vector2D<f64>>,
}

impl SurfaceFeature {
    pub fn new(planet: usize, theta: f64, color: u32, points: Vec<Vector2D<f64>>) -> Self {
        Self {
            planet,
            theta,
            color,
            points,
        }
    }

    /// A triangular mountain profile. The base is sunk 100 m below the
    /// surface so no gap shows at the foot. `middle_width` controls how
    /// steep the peak is and defaults to half the base width.
    pub fn mountain(
        planet: usize,
        height: f64,
        width: f64,
        middle_width: Option<f64>,
        theta: f64,
    ) -> Self {
        let middle_width = middle_width.unwrap_or(width / 2.0);
        let points = vec![
            Vector2D::new(-width / 2.0, -100.0),
            Vector2D::new(-middle_width / 2.0, height / 2.0),
            Vector2D::new(0.0, height),
            Vector2D::new(middle_width / 2.0, height / 2.0),
            Vector2D::new(width / 2.0, -100.0),
        ];
        Self::new(planet, theta, 0x505050, points)
    }

    /// Transform the local points into world space: lift each point out to
    /// the surface, spin with the planet, translate to the planet's
    /// position. Returns an empty list for an empty feature.
    pub fn world_points(
        &self,
        planet_pos: Point2D<f64>,
        planet_alpha: f64,
        planet_radius: f64,
    ) -> Vec<Point2D<f64>> {
        let angle = planet_alpha + self.theta;
        let (sin, cos) = angle.sin_cos();
        self.points
            .iter()
            .map(|p| {
                let lifted_y = p.y + planet_radius;
                Point2D::new(
                    p.x * cos - lifted_y * sin + planet_pos.x,
                    p.x * sin + lifted_y * cos + planet_pos.y,
                )
            })
            .collect()
    }
}
