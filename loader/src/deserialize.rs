//! Lets you load a Scene from a level file.

use serde::Deserialize;

/// A Vector2D or Point2D.
#[derive(Deserialize)]
struct Vec2D(f64, f64);

/// A whole level file.
#[derive(Deserialize)]
struct RawScene {
    #[serde(default = "default_sim_dt")]
    sim_dt: f64,
    planets: Vec<RawPlanet>,
    craft: RawCraft,
}

/// Serde needs a function for defaults...
fn default_sim_dt() -> f64 {
    0.1
}

/// A planet entry in a level file.
#[derive(Deserialize)]
struct RawPlanet {
    body: RawBody,
    #[serde(default)]
    pos: Option<Vec2D>,
    #[serde(default)]
    vel: Option<Vec2D>,
    /// Surface rotation rate, rad/s.
    #[serde(default)]
    omega: f64,
    #[serde(default)]
    features: Vec<RawFeature>,
}

/// A Body in a level file.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawBody {
    Prefab(String), // A pre-made pre-defined Body
    Custom {
        mass: f64,
        radius: f64,
        name: String,
        color: u32,
        outline: u32,
    },
}

/// Terrain in a level file: one placed mountain, or a seeded scatter.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawFeature {
    Mountain {
        height: f64,
        width: f64,
        #[serde(default)]
        middle_width: Option<f64>,
        #[serde(default)]
        theta: f64,
    },
    Scatter {
        count: usize,
        #[serde(default)]
        seed: u64,
    },
}

/// The player's craft. Starts from a named prefab and overrides fields.
#[derive(Deserialize)]
struct RawCraft {
    #[serde(default)]
    prefab: Option<String>,
    #[serde(default)]
    mass: Option<f64>,
    #[serde(default)]
    max_thrust: Option<f64>,
    #[serde(default)]
    turn_rate: Option<f64>,
    /// "throttle" or "binary"
    #[serde(default)]
    control: Option<String>,
    start: RawStart,
}

/// Either a circular-orbit altitude or an explicit state.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStart {
    Orbit { altitude: f64 },
    State { pos: Vec2D, vel: Vec2D },
}

use crate::builder::{Scene, SceneBuilder};
use crate::prefabs;
use euclid::default::{Point2D, Vector2D};
use simulator::bodies::{Body, Kinemat};
use simulator::propulsion::{Propulsion, ThrustControl};

/// Loads a level file's contents and returns the ingredients for a session.
pub fn load(contents: String) -> Result<Scene, json5::Error> {
    let raw: RawScene = json5::from_str(&contents)?;
    let builder = &mut SceneBuilder::new();
    builder.sim_dt(raw.sim_dt);

    for planet in raw.planets {
        let body = match planet.body {
            RawBody::Prefab(id) => get_body_from_id(id),
            RawBody::Custom {
                mass,
                radius,
                name,
                color,
                outline,
            } => Body {
                mass,
                radius,
                name,
                color,
                outline,
                scale_factor: 1e-4,
                features: Vec::new(),
            },
        };
        let kinemat = Kinemat::with_spin(
            planet
                .pos
                .map_or(Point2D::zero(), |p| Point2D::new(p.0, p.1)),
            planet
                .vel
                .map_or(Vector2D::zero(), |v| Vector2D::new(v.0, v.1)),
            0.0,
            planet.omega,
        );
        let id = builder.add_planet(body, kinemat);
        for feature in planet.features {
            match feature {
                RawFeature::Mountain {
                    height,
                    width,
                    middle_width,
                    theta,
                } => {
                    builder.add_mountain(id, height, width, middle_width, theta);
                }
                RawFeature::Scatter { count, seed } => {
                    builder.add_random_mountains(id, count, seed);
                }
            }
        }
    }

    let (mut body, mut propulsion) = match raw.craft.prefab {
        Some(id) => get_craft_from_id(id),
        None => prefabs::craft::lander(),
    };
    if let Some(mass) = raw.craft.mass {
        body.mass = mass;
    }
    if let Some(max_thrust) = raw.craft.max_thrust {
        propulsion.max_thrust = max_thrust;
    }
    if let Some(turn_rate) = raw.craft.turn_rate {
        propulsion.turn_rate = turn_rate;
    }
    if let Some(control) = raw.craft.control {
        propulsion.control = match &*control {
            "binary" => ThrustControl::Binary(false),
            _ => ThrustControl::Throttle(0.0),
        };
    }
    match raw.craft.start {
        RawStart::Orbit { altitude } => {
            builder.add_craft_in_orbit(body, propulsion, altitude);
        }
        RawStart::State { pos, vel } => {
            builder.add_craft(
                body,
                propulsion,
                Kinemat::new(Point2D::new(pos.0, pos.1), Vector2D::new(vel.0, vel.1)),
            );
        }
    }

    Ok(builder.construct())
}

/// Gets a premade Body from a string
fn get_body_from_id(id: String) -> Body {
    use std::collections::HashMap;

    macro_rules! maker {
        (
            $($name:ident),*
        ) => {
            {
                let mut h: HashMap<String, fn() -> Body> = HashMap::new();
                $( h.insert(stringify!($name).to_string(), prefabs::bodies::$name); )*
                h
            }
        };
    }

    lazy_static! {
        static ref BODIES: HashMap<String, fn() -> Body> = maker![luna, terra, mars];
    }

    BODIES
        .get(&id)
        .unwrap_or_else(|| panic!("No prefab body named {}", id))()
}

/// Gets a premade craft from a string
fn get_craft_from_id(id: String) -> (Body, Propulsion) {
    use std::collections::HashMap;

    macro_rules! maker {
        (
            $($name:ident),*
        ) => {
            {
                let mut h: HashMap<String, fn() -> (Body, Propulsion)> = HashMap::new();
                $( h.insert(stringify!($name).to_string(), prefabs::craft::$name); )*
                h
            }
        };
    }

    lazy_static! {
        static ref CRAFT: HashMap<String, fn() -> (Body, Propulsion)> = maker![lander, trainer];
    }

    CRAFT
        .get(&id)
        .unwrap_or_else(|| panic!("No prefab craft named {}", id))()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVEL: &str = r#"
    {
        sim_dt: 0.1,
        planets: [
            {
                body: "luna",
                omega: 0.001,
                features: [
                    { height: 4000, width: 25000, theta: 0.5 },
                    { count: 3, seed: 7 },
                ],
            },
        ],
        craft: {
            prefab: "lander",
            control: "binary",
            start: { altitude: 200000 },
        },
    }
    "#;

    #[test]
    fn loads_a_level_file() {
        let scene = load(LEVEL.to_string()).unwrap();
        assert_eq!(scene.orbiters.len(), 2);
        assert_eq!(scene.sim_dt, 0.1);

        let planet = &scene.orbiters[scene.planet];
        assert_eq!(planet.0.name, "Luna");
        assert_eq!(planet.1.omega, 0.001);
        // One placed mountain plus three scattered ones
        assert_eq!(planet.0.features.len(), 4);
        assert_eq!(planet.0.features[0].theta, 0.5);

        let craft = &scene.orbiters[scene.craft];
        let propulsion = craft.2.as_ref().unwrap();
        assert_eq!(propulsion.control, ThrustControl::Binary(false));
        // 200 km up
        assert_eq!(craft.1.pos.y, 1_737_400.0 + 200_000.0);
    }

    #[test]
    fn custom_bodies_and_explicit_starts_work() {
        let level = r#"
        {
            planets: [
                {
                    body: { mass: 1e22, radius: 5e5, name: "Pebble", color: 0x888888, outline: 0xffffff },
                },
            ],
            craft: {
                max_thrust: 60000,
                start: { pos: [0, 600000], vel: [1000, 0] },
            },
        }
        "#;
        let scene = load(level.to_string()).unwrap();
        assert_eq!(scene.orbiters[scene.planet].0.name, "Pebble");
        let craft = &scene.orbiters[scene.craft];
        assert_eq!(craft.2.as_ref().unwrap().max_thrust, 60_000.0);
        assert_eq!(craft.1.vel.x, 1_000.0);
        // Default sim_dt fills in
        assert_eq!(scene.sim_dt, 0.1);
    }
}
