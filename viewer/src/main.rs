mod state;
use state::{LevelSource, State};

use ggez::{
    conf::{Conf, WindowMode, WindowSetup},
    event, ContextBuilder,
};

pub fn main() {
    let c = Conf::new();
    let (ref mut ctx, ref mut event_loop) = ContextBuilder::new("lander_challenge", "me")
        .conf(c)
        .window_setup(WindowSetup {
            title: "Lander Challenge".to_owned(),
            ..Default::default()
        })
        .window_mode(WindowMode {
            resizable: true,
            ..Default::default()
        })
        .build()
        .unwrap();

    // Either a level number (1-3), a path to a json5 level file, or nothing
    // for level 1.
    let source = {
        let args: Vec<String> = std::env::args().collect();
        if args.len() == 2 {
            match args[1].parse::<u32>() {
                Ok(level) => LevelSource::Level(level),
                Err(_) => LevelSource::File(args[1].clone()),
            }
        } else {
            LevelSource::Level(1)
        }
    };

    let state = &mut State::new(ctx, source);

    event::run(ctx, event_loop, state).unwrap();
}
