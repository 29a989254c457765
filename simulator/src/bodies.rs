//! Handles bodies and the state that moves them around.

use crate::features::SurfaceFeature;
use crate::propulsion::Propulsion;
use euclid::default::{Point2D, Vector2D};

/// The representation of a body, like a planet, moon, or spacecraft hull.
/// Doesn't store its position or velocity.
#[derive(Clone, Debug)]
pub struct Body {
    pub mass: f64,
    /// Physical radius in meters.
    pub radius: f64,
    /// Color is stored as 0xRRGGBB
    pub color: u32,
    /// Color is stored as 0xRRGGBB
    pub outline: u32,
    pub name: String,
    /// Screen pixels per meter. Only consulted while this body is the
    /// camera reference.
    pub scale_factor: f64,
    /// Decorations riveted to the surface. They spin with `alpha`.
    pub features: Vec<SurfaceFeature>,
}

/// A Kinemat holds all the kinematic information about something.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Kinemat {
    pub pos: Point2D<f64>,
    pub vel: Vector2D<f64>,
    /// Orientation in radians.
    pub alpha: f64,
    /// Angular velocity in radians per second.
    pub omega: f64,
}

impl Kinemat {
    pub fn new(pos: Point2D<f64>, vel: Vector2D<f64>) -> Self {
        Self {
            pos,
            vel,
            alpha: 0.0,
            omega: 0.0,
        }
    }

    pub fn with_spin(pos: Point2D<f64>, vel: Vector2D<f64>, alpha: f64, omega: f64) -> Self {
        Self {
            pos,
            vel,
            alpha,
            omega,
        }
    }

    pub fn zero() -> Self {
        Self {
            pos: Point2D::zero(),
            vel: Vector2D::zero(),
            alpha: 0.0,
            omega: 0.0,
        }
    }

    /// Advance this state by `dt` under the acceleration `acc`.
    /// The position moves by the average of the old and new velocity,
    /// which behaves much better over long orbits than plain Euler.
    pub fn integrate(&mut self, dt: f64, acc: Vector2D<f64>) {
        let old_vel = self.vel;
        self.vel += acc * dt;
        self.pos += (old_vel + self.vel) * 0.5 * dt;
        self.alpha += self.omega * dt;
    }
}

/// An Orbiter is a Body, where it is, and (maybe) how it flies itself.
/// The simulation only ever integrates the first two; propulsion is a
/// separate capability that most bodies don't have.
#[derive(Clone)]
pub struct Orbiter(pub Body, pub Kinemat, pub Option<Propulsion>);
