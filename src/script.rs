// SPDX-License-Identifier: GPL-3.0-only

//! Touch scripts for driving the keyboard without a display.
//!
//! A script is a list of commands, one per line. Blank lines and lines
//! starting with `#` are skipped.
//!
//! ```text
//! session text
//! tap h
//! tap shift
//! tap i
//! hold backspace 600
//! text 👋
//! cursor left
//! clear
//! action send
//! tap enter
//! ```
//!
//! Keys are written as their row token (`⇧`, `⌫`, `SPACE`, `123`, ...), a
//! single character, or one of the names `shift`, `backspace`, `enter`,
//! `space`, `letters`, `numbers`, `symbols`.

use crate::api::ApiCommand;
use crate::app::Message;
use crate::config::Config;
use crate::input::{
    CursorDirection, EditorAction, FieldClass, HostTextSurface, KeyEvent, KeyState, TextBuffer,
    VirtualKeyboard,
};
use crate::layout::KeyId;
use futures::channel::mpsc;
use futures::SinkExt;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

/// One script line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptCommand {
    /// Start a session on a field of this class.
    Session(FieldClass),
    /// Press and release a key.
    Tap(KeyId),
    /// Press a key and keep holding it.
    Down(KeyId),
    /// Release the held key.
    Up,
    /// Press a key, hold it for the given milliseconds, release.
    Hold(KeyId, u64),
    /// Sleep for the given milliseconds.
    Wait(u64),
    /// Inject text through the side channel.
    Text(String),
    /// Move the cursor through the side channel.
    Cursor(CursorDirection),
    /// Clear the field through the side channel.
    Clear,
    /// Change the action the field requests for Enter.
    Action(EditorAction),
    /// Apply a theme preset.
    Theme(String),
}

/// A script line that could not be parsed or executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptError {
    /// 1-based line number.
    pub line_number: usize,
    /// The offending line, trimmed.
    pub line: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ScriptError {
    fn new(line_number: usize, line: &str, message: impl Into<String>) -> Self {
        Self {
            line_number,
            line: line.to_string(),
            message: message.into(),
            suggestion: None,
        }
    }

    fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script line {}: {} ('{}')", self.line_number, self.message, self.line)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, "\n  Suggestion: {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ScriptError {}

/// Parses a key written in a script.
pub fn parse_key(token: &str) -> Option<KeyId> {
    match token.to_ascii_lowercase().as_str() {
        "shift" => Some(KeyId::Shift),
        "backspace" | "bksp" => Some(KeyId::Backspace),
        "enter" | "return" => Some(KeyId::Enter),
        "space" => Some(KeyId::Space),
        "letters" | "abc" => Some(KeyId::ModeLetters),
        "numbers" => Some(KeyId::ModeNumbers),
        "symbols" => Some(KeyId::ModeSymbols),
        _ => KeyId::from_token(token),
    }
}

/// Parses a whole script.
///
/// # Errors
///
/// The first line that is not a valid command.
pub fn parse_script(source: &str) -> Result<Vec<ScriptCommand>, ScriptError> {
    let mut commands = Vec::new();
    for (idx, raw) in source.lines().enumerate() {
        if let Some(command) = parse_line(idx + 1, raw)? {
            commands.push(command);
        }
    }
    Ok(commands)
}

/// Parses one line. Blank lines and comments yield `None`.
pub fn parse_line(line_number: usize, raw: &str) -> Result<Option<ScriptCommand>, ScriptError> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let err = |message: String| ScriptError::new(line_number, line, message);

    let key = |token: &str| {
        parse_key(token).ok_or_else(|| {
            err(format!("unknown key '{}'", token)).with_suggestion(
                "Use a character or shift, backspace, enter, space, letters, numbers, symbols",
            )
        })
    };
    let millis = |token: &str| {
        token
            .parse::<u64>()
            .map_err(|_| err(format!("'{}' is not a duration in milliseconds", token)))
    };

    let command = match verb.to_ascii_lowercase().as_str() {
        "session" => ScriptCommand::Session(rest.parse().map_err(err)?),
        "tap" => ScriptCommand::Tap(key(rest)?),
        "down" => ScriptCommand::Down(key(rest)?),
        "up" => ScriptCommand::Up,
        "hold" => {
            let (token, ms) = rest
                .rsplit_once(char::is_whitespace)
                .ok_or_else(|| err("hold needs a key and a duration".into()))?;
            ScriptCommand::Hold(key(token.trim())?, millis(ms)?)
        }
        "wait" => ScriptCommand::Wait(millis(rest)?),
        "text" => {
            // Everything after the first separator, including inner spaces.
            let text = raw
                .trim_start()
                .split_once(char::is_whitespace)
                .map_or("", |(_, text)| text);
            ScriptCommand::Text(text.to_string())
        }
        "cursor" => match rest.to_ascii_lowercase().as_str() {
            "left" => ScriptCommand::Cursor(CursorDirection::Left),
            "right" => ScriptCommand::Cursor(CursorDirection::Right),
            _ => {
                return Err(err(format!("unknown cursor direction '{}'", rest))
                    .with_suggestion("Use cursor left or cursor right"));
            }
        },
        "clear" => ScriptCommand::Clear,
        "action" => ScriptCommand::Action(rest.parse().map_err(err)?),
        "theme" => ScriptCommand::Theme(rest.to_string()),
        other => {
            return Err(err(format!("unknown command '{}'", other)).with_suggestion(
                "Commands: session, tap, down, up, hold, wait, text, cursor, clear, action, theme",
            ));
        }
    };
    Ok(Some(command))
}

// ============================================================================
// Surfaces
// ============================================================================

/// A surface the script player can reconfigure and report on.
pub trait ScriptSurface: HostTextSurface {
    /// Changes the action requested for Enter.
    fn set_requested_action(&mut self, action: EditorAction);

    /// Human-readable lines describing what reached the surface.
    fn report(&mut self) -> Vec<String>;
}

impl ScriptSurface for TextBuffer {
    fn set_requested_action(&mut self, action: EditorAction) {
        TextBuffer::set_requested_action(self, action);
    }

    fn report(&mut self) -> Vec<String> {
        let mut lines = vec![format!("text: {:?}", self.text())];
        if !self.performed_actions().is_empty() {
            let actions: Vec<String> =
                self.performed_actions().iter().map(|a| a.to_string()).collect();
            lines.push(format!("actions: {}", actions.join(", ")));
        }
        lines
    }
}

impl ScriptSurface for VirtualKeyboard {
    fn set_requested_action(&mut self, action: EditorAction) {
        VirtualKeyboard::set_requested_action(self, action);
    }

    fn report(&mut self) -> Vec<String> {
        self.take_pending_events().iter().map(describe_event).collect()
    }
}

fn describe_event(event: &KeyEvent) -> String {
    let state = match event.state {
        KeyState::Pressed => "press",
        KeyState::Released => "release",
    };
    format!("{} {}", state, event.keycode)
}

// ============================================================================
// Player
// ============================================================================

/// Feeds script commands into the keyboard loop.
pub struct Player<S: ScriptSurface> {
    tx: mpsc::Sender<Message>,
    surface: Rc<RefCell<S>>,
    config: Config,
}

impl<S: ScriptSurface> Player<S> {
    pub fn new(tx: mpsc::Sender<Message>, surface: Rc<RefCell<S>>, config: Config) -> Self {
        Self { tx, surface, config }
    }

    /// Plays every command, then asks the loop to shut down.
    ///
    /// # Errors
    ///
    /// A [`ScriptError`] if the loop stops reading or a theme is unknown.
    pub async fn play(mut self, commands: Vec<ScriptCommand>) -> Result<(), ScriptError> {
        for (idx, command) in commands.into_iter().enumerate() {
            tracing::debug!("Script step {}: {:?}", idx + 1, command);
            self.step(idx + 1, command).await?;
        }
        self.send(0, Message::Shutdown).await
    }

    async fn step(&mut self, step: usize, command: ScriptCommand) -> Result<(), ScriptError> {
        match command {
            ScriptCommand::Session(field) => self.send(step, Message::SessionStarted(field)).await,
            ScriptCommand::Tap(key) => {
                self.send(step, Message::KeyDown(key)).await?;
                self.send(step, Message::KeyUp).await
            }
            ScriptCommand::Down(key) => self.send(step, Message::KeyDown(key)).await,
            ScriptCommand::Up => self.send(step, Message::KeyUp).await,
            ScriptCommand::Hold(key, ms) => {
                self.send(step, Message::KeyDown(key)).await?;
                tokio::time::sleep(Duration::from_millis(ms)).await;
                self.send(step, Message::KeyUp).await
            }
            ScriptCommand::Wait(ms) => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(())
            }
            ScriptCommand::Text(text) => {
                self.send(step, Message::Api(ApiCommand::TypeText(text))).await
            }
            ScriptCommand::Cursor(direction) => {
                let command = match direction {
                    CursorDirection::Left => ApiCommand::CursorLeft,
                    CursorDirection::Right => ApiCommand::CursorRight,
                };
                self.send(step, Message::Api(command)).await
            }
            ScriptCommand::Clear => self.send(step, Message::Api(ApiCommand::ClearAll)).await,
            ScriptCommand::Action(action) => {
                self.surface.borrow_mut().set_requested_action(action);
                Ok(())
            }
            ScriptCommand::Theme(name) => {
                self.config
                    .apply_theme(&name)
                    .map_err(|e| ScriptError::new(step, &name, e.to_string()))?;
                self.send(step, Message::SettingsChanged(self.config.clone())).await
            }
        }
    }

    async fn send(&mut self, step: usize, message: Message) -> Result<(), ScriptError> {
        self.tx
            .send(message)
            .await
            .map_err(|_| ScriptError::new(step, "", "keyboard loop stopped"))
    }
}
