//! Handles the state for the lander game.

use loader::Scene;
use simulator::frame::Viewport;
use simulator::propulsion::ThrustControl;
use simulator::Simulation;

use ggez::event::{EventHandler, KeyCode};
use ggez::input::keyboard::{self, KeyMods};
use ggez::nalgebra::Point2;
use ggez::{
    graphics::{self, DrawMode, DrawParam, MeshBuilder, Scale, Text, TextFragment},
    timer, Context, GameResult,
};

use graphics::Color;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::collections::HashSet;

/// Where the current level came from, so a crashed run can be restarted.
pub enum LevelSource {
    /// A built-in level number (1-3).
    Level(u32),
    /// A json5 level file on disk.
    File(String),
}

/// The state of the whole game.
pub struct State {
    sim: Simulation,
    /// Id of the player's craft.
    craft: usize,
    /// Id of the crash-check planet.
    planet: usize,
    source: LevelSource,
    mode: Mode,
    /// All the keypresses last frame
    prev_keys: HashSet<KeyCode>,
    stars: Vec<Star>,
}

/// What the game is up to.
enum Mode {
    Flying,
    /// The help page. The simulation is paused underneath.
    Tutorial,
    /// The terminal state; waiting for a restart or a quit.
    Crashed,
}

/// One background star.
struct Star {
    pos: Point2<f32>,
    alpha: f32,
    speed: f32,
}

impl State {
    pub fn new(ctx: &mut Context, source: LevelSource) -> Self {
        let scene = load_scene(&source);
        let (scr_w, scr_h) = graphics::drawable_size(ctx);
        let mut state = State {
            sim: Simulation::new(Vec::new(), 0.1), // replaced by reset just below
            craft: 0,
            planet: 0,
            source,
            mode: Mode::Flying,
            prev_keys: HashSet::new(),
            stars: make_stars(scr_w, scr_h),
        };
        state.reset(scene, scr_w, scr_h);
        state
    }

    /// Install a freshly built scene, sizing the view to the window.
    fn reset(&mut self, scene: Scene, scr_w: f32, scr_h: f32) {
        self.craft = scene.craft;
        self.planet = scene.planet;
        let mut sim = scene.into_simulation();
        let planet_radius = sim.body(self.planet).radius;
        sim.set_scale_factor(0.25 * f64::from(scr_w.min(scr_h)) / planet_radius);
        self.sim = sim;
        self.mode = Mode::Flying;
    }

    /// Fix the screen space to always have (0, 0) in the corner and (w, h) in the other.
    fn fix_coordinates(&mut self, ctx: &mut Context, width: f32, height: f32) -> GameResult<()> {
        let rect = graphics::Rect::new(0.0, 0.0, width, height);
        graphics::set_screen_coordinates(ctx, rect)
    }

    /// Was this key pressed this frame but not the last?
    fn key_hit(&self, ctx: &Context, key: KeyCode) -> bool {
        keyboard::is_key_pressed(ctx, key) && !self.prev_keys.contains(&key)
    }

    fn handle_flight_keys(&mut self, ctx: &mut Context) {
        let shift = keyboard::is_mod_active(ctx, KeyMods::SHIFT);

        // Rotation is live state, not an event
        let rotate_dir = if keyboard::is_key_pressed(ctx, KeyCode::Left) {
            -1
        } else if keyboard::is_key_pressed(ctx, KeyCode::Right) {
            1
        } else {
            0
        };
        let up = keyboard::is_key_pressed(ctx, KeyCode::Up);
        let down = keyboard::is_key_pressed(ctx, KeyCode::Down);

        if let Some(propulsion) = self.sim.propulsion_mut(self.craft) {
            propulsion.rotate_dir = rotate_dir;
            match propulsion.control {
                ThrustControl::Throttle(_) => {
                    let delta = if shift { 0.1 } else { 0.01 };
                    if up {
                        propulsion.control.adjust(delta);
                    }
                    if down {
                        propulsion.control.adjust(-delta);
                    }
                }
                ThrustControl::Binary(_) => {
                    // Burn exactly while the key is held
                    propulsion.control.set_binary(up);
                }
            }
        }

        // Zoom, or simulation speed with Shift held
        let zoom_in = keyboard::is_key_pressed(ctx, KeyCode::Equals)
            || keyboard::is_key_pressed(ctx, KeyCode::Add);
        let zoom_out = keyboard::is_key_pressed(ctx, KeyCode::Minus)
            || keyboard::is_key_pressed(ctx, KeyCode::Subtract);
        if zoom_in {
            if shift {
                self.sim.clock_mut().scale_time_factor(ZOOM_SPEED);
            } else {
                self.sim.zoom(ZOOM_SPEED);
            }
        }
        if zoom_out {
            if shift {
                self.sim.clock_mut().scale_time_factor(ZOOM_SPEED.recip());
            } else {
                self.sim.zoom(ZOOM_SPEED.recip());
            }
        }

        // Space pans the camera between the planet and the craft
        if self.key_hit(ctx, KeyCode::Space) {
            let target = match self.sim.camera_target() {
                Some(_) => None,
                None => Some(self.craft),
            };
            self.sim.set_camera_target(target);
        }

        if self.key_hit(ctx, KeyCode::P) {
            let clock = self.sim.clock_mut();
            clock.paused = !clock.paused;
        }

        if self.key_hit(ctx, KeyCode::T) {
            self.sim.clock_mut().paused = true;
            self.mode = Mode::Tutorial;
        }

        if self.key_hit(ctx, KeyCode::Escape) {
            ggez::event::quit(ctx);
        }
    }

    fn draw_bodies(&self, ctx: &mut Context, viewport: Viewport) -> GameResult<()> {
        let scale = self.sim.scale_factor();
        for id in 0..self.sim.len() {
            // The craft gets drawn as a triangle afterwards
            if id != self.craft {
                let body = self.sim.body(id);
                let pos = self.sim.screen_position(id, viewport);
                let draw_pos = Point2::new(pos.x as f32, pos.y as f32);
                let draw_radius = ((body.radius * scale) as f32).max(0.5);
                let mesh = MeshBuilder::new()
                    .circle(
                        DrawMode::fill(),
                        draw_pos,
                        draw_radius,
                        0.1,
                        Color::from_rgb_u32(body.color),
                    )
                    .circle(
                        DrawMode::stroke((draw_radius / 10.0).min(3.0).max(0.5)),
                        draw_pos,
                        draw_radius,
                        0.1,
                        Color::from_rgb_u32(body.outline),
                    )
                    .build(ctx)?;
                graphics::draw(ctx, &mesh, DrawParam::default())?;
            }

            for feature in &self.sim.body(id).features {
                let points = self.sim.feature_screen_polygon(feature, viewport);
                if points.is_empty() {
                    continue;
                }
                let points: Vec<Point2<f32>> = points
                    .iter()
                    .map(|p| Point2::new(p.x as f32, p.y as f32))
                    .collect();
                let mesh = MeshBuilder::new()
                    .polygon(
                        DrawMode::fill(),
                        &points,
                        Color::from_rgb_u32(feature.color),
                    )?
                    .build(ctx)?;
                graphics::draw(ctx, &mesh, DrawParam::default())?;
            }
        }
        Ok(())
    }

    fn draw_craft(&self, ctx: &mut Context, viewport: Viewport) -> GameResult<()> {
        let pos = self.sim.screen_position(self.craft, viewport);
        let rot = self.sim.relative_alpha(self.craft) as f32;
        let (sin, cos) = rot.sin_cos();
        let place = |px: f32, py: f32| {
            Point2::new(
                pos.x as f32 + px * cos - py * sin,
                pos.y as f32 + px * sin + py * cos,
            )
        };

        // Nose along local +y, the direction thrust pushes
        let hull: Vec<Point2<f32>> = CRAFT_SHAPE.iter().map(|&(px, py)| place(px, py)).collect();
        let mut builder = MeshBuilder::new();
        builder.polygon(
            DrawMode::fill(),
            &hull,
            Color::from_rgb_u32(self.sim.body(self.craft).color),
        )?;

        if let Some(propulsion) = self.sim.propulsion(self.craft) {
            let burn = propulsion.control.fraction() as f32;
            if burn > 0.0 {
                let flame = [
                    place(3.0, -8.0),
                    place(0.0, -8.0 - 12.0 * burn),
                    place(-3.0, -8.0),
                ];
                builder.polygon(DrawMode::fill(), &flame, Color::from_rgb_u32(0xff9933))?;
            }
        }

        let mesh = builder.build(ctx)?;
        graphics::draw(ctx, &mesh, DrawParam::default())
    }

    fn draw_hud(&self, ctx: &mut Context, scr_w: f32, scr_h: f32) -> GameResult<()> {
        let clock = self.sim.clock();
        let mut lines = vec![
            format!("Scale: {:.2e}", self.sim.scale_factor()),
            format!("Time Factor: {:.2}", clock.time_factor),
            format!("Time: {:.2}s", clock.sim_time),
            format!("Reference: {}", self.sim.reference_name()),
        ];
        if let Some(propulsion) = self.sim.propulsion(self.craft) {
            lines.push(match propulsion.control {
                ThrustControl::Throttle(throttle) => {
                    format!("Thrust: {:.1}%", throttle * 100.0)
                }
                ThrustControl::Binary(on) => {
                    format!("Thrust: {}", if on { "BURN" } else { "off" })
                }
            });
        }

        let mut y = 30.0;
        for line in lines {
            let text = Text::new(line);
            graphics::draw(
                ctx,
                &text,
                (Point2::new(scr_w - 200.0, y), Color::from_rgb_u32(0x888888)),
            )?;
            y += 20.0;
        }

        let help = Text::new("Arrows to fly. +/- zoom, Shift+/- speed. Space camera, T help");
        graphics::draw(ctx, &help, (Point2::new(10.0, scr_h - 26.0), graphics::WHITE))
    }

    fn draw_centered(
        &self,
        ctx: &mut Context,
        text: &Text,
        scr_w: f32,
        y: f32,
        color: Color,
    ) -> GameResult<()> {
        let x = (scr_w - text.width(ctx) as f32) / 2.0;
        graphics::draw(ctx, text, (Point2::new(x, y), color))
    }

    fn draw_tutorial(&self, ctx: &mut Context, scr_w: f32) -> GameResult<()> {
        let title = Text::new(TextFragment::new("Lander Challenge").scale(Scale::uniform(28.0)));
        self.draw_centered(ctx, &title, scr_w, 60.0, Color::from_rgb_u32(0xffff00))?;

        let mut y = 120.0;
        for line in TUTORIAL_LINES {
            let heading = line.starts_with("##");
            let text = Text::new(line.trim_start_matches("## "));
            let color = if heading {
                Color::from_rgb_u32(0xffff00)
            } else {
                graphics::WHITE
            };
            self.draw_centered(ctx, &text, scr_w, y, color)?;
            y += 24.0;
        }
        Ok(())
    }

    fn draw_crashed(&self, ctx: &mut Context, scr_w: f32, scr_h: f32) -> GameResult<()> {
        let banner = Text::new(TextFragment::new("CRASHED!").scale(Scale::uniform(48.0)));
        self.draw_centered(
            ctx,
            &banner,
            scr_w,
            scr_h / 2.0 - 48.0,
            Color::from_rgb_u32(0xff2222),
        )?;
        let hint = Text::new("ENTER to retry, ESC to quit");
        self.draw_centered(ctx, &hint, scr_w, scr_h / 2.0 + 16.0, graphics::WHITE)
    }
}

impl EventHandler for State {
    fn update(&mut self, ctx: &mut Context) -> GameResult<()> {
        const DESIRED_FPS: u32 = 60;
        while timer::check_update_time(ctx, DESIRED_FPS) {
            let frame_dt = 1.0 / f64::from(DESIRED_FPS);

            // Stars twinkle whatever else is going on
            for star in self.stars.iter_mut() {
                star.alpha += star.speed;
                if star.alpha > 1.0 || star.alpha < 0.0 {
                    star.speed = -star.speed;
                    star.alpha = star.alpha.max(0.0).min(1.0);
                }
            }

            match self.mode {
                Mode::Flying => {
                    self.handle_flight_keys(ctx);
                    self.sim.update(frame_dt);
                    if self.sim.crashed(self.craft, self.planet) {
                        self.sim.clock_mut().paused = true;
                        self.mode = Mode::Crashed;
                    }
                }
                Mode::Tutorial => {
                    if self.key_hit(ctx, KeyCode::Escape) || self.key_hit(ctx, KeyCode::T) {
                        self.sim.clock_mut().paused = false;
                        self.mode = Mode::Flying;
                    }
                }
                Mode::Crashed => {
                    if self.key_hit(ctx, KeyCode::Return) {
                        let scene = load_scene(&self.source);
                        let (scr_w, scr_h) = graphics::drawable_size(ctx);
                        self.reset(scene, scr_w, scr_h);
                    } else if self.key_hit(ctx, KeyCode::Escape) {
                        ggez::event::quit(ctx);
                    }
                }
            }

            // Update previous keys
            self.prev_keys = keyboard::pressed_keys(ctx).to_owned();
        }
        Ok(())
    }

    fn draw(&mut self, ctx: &mut Context) -> GameResult<()> {
        graphics::clear(ctx, graphics::BLACK);

        let (scr_w, scr_h) = graphics::drawable_size(ctx);
        let viewport = Viewport::new(f64::from(scr_w), f64::from(scr_h));

        let mut star_mesh = MeshBuilder::new();
        for star in &self.stars {
            star_mesh.circle(
                DrawMode::fill(),
                star.pos,
                1.5,
                0.1,
                Color::new(1.0, 1.0, 1.0, star.alpha),
            );
        }
        let star_mesh = star_mesh.build(ctx)?;
        graphics::draw(ctx, &star_mesh, DrawParam::default())?;

        self.draw_bodies(ctx, viewport)?;
        self.draw_craft(ctx, viewport)?;
        self.draw_hud(ctx, scr_w, scr_h)?;

        match self.mode {
            Mode::Flying => {}
            Mode::Tutorial => self.draw_tutorial(ctx, scr_w)?,
            Mode::Crashed => self.draw_crashed(ctx, scr_w, scr_h)?,
        }

        graphics::present(ctx)
    }

    fn resize_event(&mut self, ctx: &mut Context, width: f32, height: f32) {
        self.fix_coordinates(ctx, width, height).unwrap(); // GGEZ official examples say to unwrap this... idk
    }
}

fn load_scene(source: &LevelSource) -> Scene {
    match source {
        LevelSource::Level(2) => loader::prefabs::scenes::mare_montes(),
        LevelSource::Level(3) => loader::prefabs::scenes::trainer(),
        LevelSource::Level(_) => loader::prefabs::scenes::low_lunar_orbit(),
        LevelSource::File(path) => {
            let contents = std::fs::read_to_string(path).unwrap();
            loader::load(contents).unwrap()
        }
    }
}

fn make_stars(scr_w: f32, scr_h: f32) -> Vec<Star> {
    let mut rand = SmallRng::from_entropy();
    (0..STAR_COUNT)
        .map(|_| Star {
            pos: Point2::new(rand.gen_range(0.0, scr_w), rand.gen_range(0.0, scr_h)),
            alpha: rand.gen_range(0.0, 1.0),
            speed: rand.gen_range(0.005, 0.015),
        })
        .collect()
}

// Nose first, then around the base, in local pixels
const CRAFT_SHAPE: [(f32, f32); 4] = [(0.0, 12.0), (7.0, -8.0), (0.0, -4.0), (-7.0, -8.0)];

const STAR_COUNT: usize = 100;
const ZOOM_SPEED: f64 = 1.1;

const TUTORIAL_LINES: &[&str] = &[
    "Goal: land the spacecraft gently on the Moon.",
    "",
    "## Arrow Keys",
    "LEFT/RIGHT: rotate craft",
    "UP: increase thrust (Shift for +10%)",
    "DOWN: decrease thrust (Shift for -10%)",
    "On the trainer, UP burns at full thrust while held",
    "",
    "## Zoom & View",
    "+/-: zoom in/out",
    "Shift +/-: simulation speed up/down",
    "SPACE: pan camera between Moon and craft",
    "",
    "## Other",
    "P: pause",
    "T: this help",
    "ESC: back",
];
