//! Thrust and rotation control for bodies that fly themselves.

use euclid::default::Vector2D;

/// How the pilot commands thrust. Two control schemes exist in the wild
/// and both are kept: a continuous throttle and an all-or-nothing burn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ThrustControl {
    /// Throttle fraction, clamped to [0, 1].
    Throttle(f64),
    /// Full thrust, on or off.
    Binary(bool),
}

impl ThrustControl {
    /// Fraction of max thrust currently commanded, in [0, 1].
    pub fn fraction(&self) -> f64 {
        match self {
            ThrustControl::Throttle(t) => *t,
            ThrustControl::Binary(on) => {
                if *on {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    /// Nudge the commanded thrust. A throttle clamps to [0, 1]; a binary
    /// control switches with the sign of `delta`.
    pub fn adjust(&mut self, delta: f64) {
        match self {
            ThrustControl::Throttle(t) => *t = (*t + delta).max(0.0).min(1.0),
            ThrustControl::Binary(on) => *on = delta > 0.0,
        }
    }

    /// Directly set a binary control. Does nothing to a throttle.
    pub fn set_binary(&mut self, on: bool) {
        if let ThrustControl::Binary(b) = self {
            *b = on;
        }
    }
}

/// The propulsion capability of a body. The integrator never looks inside;
/// it only consumes the world-frame force this produces.
#[derive(Copy, Clone, Debug)]
pub struct Propulsion {
    pub control: ThrustControl,
    /// Newtons at full throttle.
    pub max_thrust: f64,
    /// Live rotation input: -1, 0, or +1.
    pub rotate_dir: i8,
    /// Commanded rotation speed in radians per second.
    pub turn_rate: f64,
}

impl Propulsion {
    /// Thrust rotated from the body frame into the world frame.
    /// The nose points along +y at `alpha` = 0.
    pub fn world_force(&self, alpha: f64) -> Vector2D<f64> {
        let thrust = self.max_thrust * self.control.fraction();
        Vector2D::new(thrust * alpha.sin(), thrust * alpha.cos())
    }
}
