//! Maps world coordinates into a screen frame anchored to a reference body.

use euclid::default::Point2D;

/// The drawable area, in pixels.
#[derive(Copy, Clone, Debug)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2D<f64> {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Which bodies anchor the view.
///
/// The reference supplies the screen's "up" direction and the scale factor,
/// so the view can stay surface-stabilized around the body being orbited.
/// The camera target is what the screen is centered on; usually they're the
/// same body, but the camera can pan to another body while keeping the
/// reference's surface horizontal.
#[derive(Copy, Clone, Debug)]
pub struct Frame {
    pub reference: usize,
    pub camera_target: Option<usize>,
}

impl Frame {
    pub fn new(reference: usize) -> Self {
        Self {
            reference,
            camera_target: None,
        }
    }
}

/// Map a world point to screen space: translate relative to the camera
/// origin, rotate by the negative of the reference orientation, scale from
/// meters to pixels, and offset to the viewport center.
pub fn world_to_screen(
    world: Point2D<f64>,
    origin: Point2D<f64>,
    ref_alpha: f64,
    scale: f64,
    viewport: Viewport,
) -> Point2D<f64> {
    let dx = world.x - origin.x;
    let dy = world.y - origin.y;
    let (sin, cos) = (-ref_alpha).sin_cos();
    let rx = dx * cos - dy * sin;
    let ry = dx * sin + dy * cos;
    let center = viewport.center();
    Point2D::new(center.x + rx * scale, center.y + ry * scale)
}

/// Scale factor clamps. Outside this range the screen-space math starts
/// to underflow or overflow.
pub const MIN_SCALE: f64 = 1e-7;
pub const MAX_SCALE: f64 = 1.0;
