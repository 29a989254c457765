//! Lets you assemble lander scenes without doing the orbit math by hand.

use euclid::default::Vector2D;
use simulator::bodies::{Body, Kinemat, Orbiter};
use simulator::features::SurfaceFeature;
use simulator::propulsion::Propulsion;
use simulator::{Simulation, GRAV_CONSTANT};

/// Everything needed to start a session: the bodies, and which ids play
/// which role.
pub struct Scene {
    pub orbiters: Vec<Orbiter>,
    /// Id of the body anchoring the camera.
    pub reference: usize,
    /// Id of the player's craft.
    pub craft: usize,
    /// Id of the body the crash check runs against.
    pub planet: usize,
    /// Fixed physics step in seconds.
    pub sim_dt: f64,
}

impl Scene {
    /// Hand everything over to the simulator. The role ids are plain
    /// copies, so grab them before calling this.
    pub fn into_simulation(self) -> Simulation {
        let reference = self.reference;
        let mut sim = Simulation::new(self.orbiters, self.sim_dt);
        sim.set_reference(reference);
        sim
    }
}

/// Use this struct to put a lander scene together easily.
pub struct SceneBuilder {
    orbiters: Vec<Orbiter>,
    reference: Option<usize>,
    craft: Option<usize>,
    planet: Option<usize>,
    sim_dt: f64,
    /// This is set to true after .construct() is called.
    /// Trying to do operations after .construct() is called will panic.
    used_up: bool,
}

impl SceneBuilder {
    pub fn new() -> Self {
        SceneBuilder {
            orbiters: Vec::new(),
            reference: None,
            craft: None,
            planet: None,
            sim_dt: DEFAULT_SIM_DT,
            used_up: false,
        }
    }

    pub fn sim_dt(&mut self, sim_dt: f64) -> &mut Self {
        self.sim_dt = sim_dt;
        self
    }

    /// Add a planet. The first one becomes the camera reference and the
    /// crash-check target.
    pub fn add_planet(&mut self, body: Body, kinemat: Kinemat) -> usize {
        self.check_used_up();
        let id = self.orbiters.len();
        self.orbiters.push(Orbiter(body, kinemat, None));
        if self.planet.is_none() {
            self.planet = Some(id);
            self.reference = Some(id);
        }
        id
    }

    /// Add a craft at an explicit kinematic state. The first craft becomes
    /// the player's.
    pub fn add_craft(&mut self, body: Body, propulsion: Propulsion, kinemat: Kinemat) -> usize {
        self.check_used_up();
        let id = self.orbiters.len();
        self.orbiters.push(Orbiter(body, kinemat, Some(propulsion)));
        if self.craft.is_none() {
            self.craft = Some(id);
        }
        id
    }

    /// Put a craft in a circular orbit at `altitude` above the scene's
    /// planet, starting at the top of the orbit and moving along +x.
    pub fn add_craft_in_orbit(
        &mut self,
        body: Body,
        propulsion: Propulsion,
        altitude: f64,
    ) -> usize {
        let planet = self
            .planet
            .expect("Tried to put a craft in orbit around a scene with no planet!");
        let Orbiter(planet_body, planet_kmat, _) = &self.orbiters[planet];
        let orbit_radius = planet_body.radius + altitude;
        // Do some math for a circular orbit
        let speed = (GRAV_CONSTANT * planet_body.mass / orbit_radius).sqrt();
        let kinemat = Kinemat::new(
            planet_kmat.pos + Vector2D::new(0.0, orbit_radius),
            planet_kmat.vel + Vector2D::new(speed, 0.0),
        );
        self.add_craft(body, propulsion, kinemat)
    }

    /// Rivet one mountain onto a planet's surface.
    pub fn add_mountain(
        &mut self,
        planet: usize,
        height: f64,
        width: f64,
        middle_width: Option<f64>,
        theta: f64,
    ) -> &mut Self {
        self.check_used_up();
        let feature = SurfaceFeature::mountain(planet, height, width, middle_width, theta);
        self.orbiters[planet].0.features.push(feature);
        self
    }

    /// Scatter mountains all around a planet. Same seed, same terrain.
    pub fn add_random_mountains(&mut self, planet: usize, count: usize, seed: u64) -> &mut Self {
        use rand::{rngs::SmallRng, Rng, SeedableRng};

        // Hash the parameters in so two scatters with one seed differ
        let seed = seed.wrapping_add(count as u64).wrapping_add(planet as u64);
        let mut rand = SmallRng::seed_from_u64(seed);
        for _ in 0..count {
            let theta = rand.gen_range(0f64, 2.0 * std::f64::consts::PI);
            let height = rand.gen_range(2_000f64, 8_000f64);
            let width = rand.gen_range(10_000f64, 40_000f64);
            self.add_mountain(planet, height, width, None, theta);
        }
        self
    }

    /// Finish the scene. Do not try to call anything on this instance
    /// afterwards; it will panic.
    pub fn construct(&mut self) -> Scene {
        self.check_used_up();
        self.used_up = true;
        Scene {
            orbiters: self.orbiters.drain(0..).collect(),
            reference: self
                .reference
                .expect("Tried to construct a scene with no planet in it!"),
            craft: self
                .craft
                .expect("Tried to construct a scene with no craft in it!"),
            planet: self.planet.unwrap(),
            sim_dt: self.sim_dt,
        }
    }

    fn check_used_up(&self) {
        if self.used_up {
            panic!("Tried to use a SceneBuilder after it was constructed!")
        }
    }
}

const DEFAULT_SIM_DT: f64 = 0.1;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefabs::{bodies, craft};
    use approx::assert_relative_eq;

    #[test]
    fn orbit_insertion_is_circular() {
        let mut builder = SceneBuilder::new();
        builder.add_planet(bodies::luna(), Kinemat::zero());
        let (body, propulsion) = craft::lander();
        builder.add_craft_in_orbit(body, propulsion, 300_000.0);
        let scene = builder.construct();

        let Orbiter(planet_body, _, _) = &scene.orbiters[scene.planet];
        let Orbiter(_, craft_kmat, _) = &scene.orbiters[scene.craft];
        let orbit_radius = planet_body.radius + 300_000.0;
        assert_relative_eq!(craft_kmat.pos.y, orbit_radius);
        assert_relative_eq!(
            craft_kmat.vel.x,
            (GRAV_CONSTANT * planet_body.mass / orbit_radius).sqrt()
        );
        assert_eq!(craft_kmat.vel.y, 0.0);
    }

    #[test]
    fn mountains_scatter_deterministically() {
        let terrain = |seed| {
            let mut builder = SceneBuilder::new();
            let luna = builder.add_planet(bodies::luna(), Kinemat::zero());
            let (body, propulsion) = craft::lander();
            builder.add_craft_in_orbit(body, propulsion, 300_000.0);
            builder.add_random_mountains(luna, 6, seed);
            let scene = builder.construct();
            scene.orbiters[scene.planet]
                .0
                .features
                .iter()
                .map(|f| f.theta)
                .collect::<Vec<f64>>()
        };
        assert_eq!(terrain(42).len(), 6);
        assert_eq!(terrain(42), terrain(42));
        assert_ne!(terrain(42), terrain(43));
    }

    #[test]
    #[should_panic]
    fn orbit_with_no_planet_panics() {
        let mut builder = SceneBuilder::new();
        let (body, propulsion) = craft::lander();
        builder.add_craft_in_orbit(body, propulsion, 300_000.0);
    }
}
