//! Prefabricated bodies, craft, and whole scenes.

pub mod bodies {
    use simulator::bodies::Body;

    /// Returns our Moon, the default landing target.
    pub fn luna() -> Body {
        Body {
            mass: 7.34767309e22,
            radius: 1_737_400f64,
            name: "Luna".to_string(),
            color: 0x3c3a38,   // dark gray,
            outline: 0xadaca9, // light gray,
            scale_factor: DEFAULT_SCALE,
            features: Vec::new(),
        }
    }

    /// Returns the Earth, for when the Moon feels too easy.
    pub fn terra() -> Body {
        Body {
            mass: 5.97237e24,
            radius: 6_371_000f64,
            name: "Terra".to_string(),
            color: 0x3669FF,   // blue
            outline: 0x56FF2D, // green
            scale_factor: DEFAULT_SCALE,
            features: Vec::new(),
        }
    }

    /// Returns Mars.
    pub fn mars() -> Body {
        Body {
            mass: 6.4171e23,
            radius: 3_398_500f64,
            name: "Mars".to_string(),
            color: 0xff5c26,   // red-orange
            outline: 0xc9af9e, // gray
            scale_factor: DEFAULT_SCALE,
            features: Vec::new(),
        }
    }

    // The viewer recomputes this from the canvas size on startup anyway.
    const DEFAULT_SCALE: f64 = 1e-4;
}

pub mod craft {
    use simulator::bodies::Body;
    use simulator::propulsion::{Propulsion, ThrustControl};

    /// The standard lander: 15 tonnes, 45 kN, continuous throttle.
    pub fn lander() -> (Body, Propulsion) {
        (
            hull("Lander"),
            Propulsion {
                control: ThrustControl::Throttle(0.0),
                max_thrust: 45_000f64,
                rotate_dir: 0,
                turn_rate: std::f64::consts::FRAC_PI_2,
            },
        )
    }

    /// The trainer variant: same hull, all-or-nothing thrust.
    pub fn trainer() -> (Body, Propulsion) {
        (
            hull("Trainer"),
            Propulsion {
                control: ThrustControl::Binary(false),
                max_thrust: 45_000f64,
                rotate_dir: 0,
                turn_rate: std::f64::consts::FRAC_PI_2,
            },
        )
    }

    fn hull(name: &str) -> Body {
        Body {
            mass: 15_000f64,
            radius: 10f64,
            name: name.to_string(),
            color: 0xffffff,   // white
            outline: 0xcccccc, // light gray
            scale_factor: 1e-4,
            features: Vec::new(),
        }
    }
}

pub mod scenes {
    use crate::builder::{Scene, SceneBuilder};
    use crate::prefabs::{bodies, craft};
    use simulator::bodies::Kinemat;

    /// Level 1: a quiet 300 km lunar orbit over a featureless Moon.
    pub fn low_lunar_orbit() -> Scene {
        let mut builder = SceneBuilder::new();
        builder.add_planet(bodies::luna(), Kinemat::zero());
        let (body, propulsion) = craft::lander();
        builder.add_craft_in_orbit(body, propulsion, 300_000.0);
        builder.construct()
    }

    /// Level 2: the same orbit, but the terrain below bites back.
    pub fn mare_montes() -> Scene {
        let mut builder = SceneBuilder::new();
        let luna = builder.add_planet(bodies::luna(), Kinemat::zero());
        let (body, propulsion) = craft::lander();
        builder.add_craft_in_orbit(body, propulsion, 300_000.0);
        builder
            .add_mountain(luna, 5_000.0, 30_000.0, None, 0.0)
            .add_random_mountains(luna, 12, 0x5EED);
        builder.construct()
    }

    /// Level 3: binary thrust from a lower orbit. No feathering the burn.
    pub fn trainer() -> Scene {
        let mut builder = SceneBuilder::new();
        builder.add_planet(bodies::luna(), Kinemat::zero());
        let (body, propulsion) = craft::trainer();
        builder.add_craft_in_orbit(body, propulsion, 150_000.0);
        builder.construct()
    }
}
