// SPDX-License-Identifier: GPL-3.0-only

//! Fastboard script driver
//!
//! Replays a touch script read from stdin against the keyboard and prints
//! what reached the focused field. Key events go through the system XKB
//! keymap when one is available, otherwise into an in-memory text field.
//!
//! # Usage
//!
//! ```bash
//! printf 'session text\ntap h\ntap i\n' | fastboard [settings.json]
//! ```

use fastboard::app::KeyboardApp;
use fastboard::config::Config;
use fastboard::haptics::{Haptics, TracingHaptics};
use fastboard::input::{TextBuffer, VirtualKeyboard};
use fastboard::script::{self, Player, ScriptCommand, ScriptSurface};
use std::cell::RefCell;
use std::error::Error;
use std::rc::Rc;

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "fastboard=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load_or_default(path),
        None => Config::default(),
    };

    let source = std::io::read_to_string(std::io::stdin())?;
    let commands = script::parse_script(&source)?;
    tracing::info!("Loaded script with {} command(s)", commands.len());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let mut keyboard = VirtualKeyboard::new();
    let report = match keyboard.initialize() {
        Ok(()) => runtime.block_on(drive(keyboard, config, commands))?,
        Err(e) => {
            tracing::warn!("{}", e);
            tracing::warn!("Falling back to an in-memory text field");
            runtime.block_on(drive(TextBuffer::new(), config, commands))?
        }
    };

    for line in report {
        println!("{}", line);
    }
    Ok(())
}

/// Runs the keyboard loop and the script player side by side.
async fn drive<S: ScriptSurface + 'static>(
    surface: S,
    config: Config,
    commands: Vec<ScriptCommand>,
) -> Result<Vec<String>, script::ScriptError> {
    let surface = Rc::new(RefCell::new(surface));
    let haptics = Haptics::new(Box::new(TracingHaptics::default()), &config);

    let mut app = KeyboardApp::new(config.clone(), haptics);
    app.attach_surface(Box::new(Rc::clone(&surface)));

    let (tx, rx) = KeyboardApp::channel();
    let player = Player::new(tx, Rc::clone(&surface), config);

    let (mut app, played) = tokio::join!(app.run(rx), player.play(commands));
    played?;

    tracing::info!(
        "Script finished in {} with {} side effect(s)",
        app.session().state(),
        app.take_effects().len()
    );
    let report = surface.borrow_mut().report();
    Ok(report)
}
