// SPDX-License-Identifier: GPL-3.0-only

//! Text-injection side channel.
//!
//! Tool panels (emoji picker, clipboard history) run outside the key grid
//! but still need to edit the focused field. They send [`ApiCommand`]s
//! through an [`InjectionHandle`], which forwards them into the keyboard
//! loop as [`Message::Api`]. Injected text bypasses key classification and
//! mode state entirely.
//!
//! # Commands
//!
//! | Name           | Data         | Effect                                |
//! |----------------|--------------|---------------------------------------|
//! | `TYPE_TEXT`    | text         | Commit the text verbatim              |
//! | `BACKSPACE`    | (count)      | Delete `count` characters             |
//! | `ENTER`        |              | Run the Enter policy                  |
//! | `CURSOR_LEFT`  |              | Move the cursor one character left    |
//! | `CURSOR_RIGHT` |              | Move the cursor one character right   |
//! | `CLEAR_ALL`    |              | Remove all text from the field        |
//! | `VIBRATE`      | milliseconds | Pulse the haptic sink (default 50 ms) |

use crate::app::Message;
use futures::channel::mpsc;
use futures::SinkExt;
use std::fmt;

/// Pulse length used when `VIBRATE` carries no duration.
pub const DEFAULT_VIBRATE_MS: u64 = 50;

/// Commands external panels can send to the keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCommand {
    /// Commit text verbatim.
    TypeText(String),
    /// Delete characters before the cursor.
    Backspace { count: usize },
    /// Press Enter on behalf of the user.
    Enter,
    /// Move the cursor one character left.
    CursorLeft,
    /// Move the cursor one character right.
    CursorRight,
    /// Remove all text from the field.
    ClearAll,
    /// Pulse the haptic sink.
    Vibrate { ms: u64 },
}

impl ApiCommand {
    /// Parses a `(command, data, count)` triple.
    ///
    /// `data` is the text for `TYPE_TEXT` and the duration for `VIBRATE`.
    /// `count` only applies to `BACKSPACE`.
    ///
    /// # Errors
    ///
    /// [`ApiError::UnknownCommand`] for unrecognised names and
    /// [`ApiError::InvalidArgument`] for a zero backspace count or a
    /// non-numeric vibrate duration.
    pub fn parse(command: &str, data: &str, count: usize) -> Result<Self, ApiError> {
        match command {
            "TYPE_TEXT" => Ok(ApiCommand::TypeText(data.to_string())),
            "BACKSPACE" => {
                if count == 0 {
                    return Err(ApiError::InvalidArgument {
                        command: command.into(),
                        message: "count must be at least 1".into(),
                    });
                }
                Ok(ApiCommand::Backspace { count })
            }
            "ENTER" => Ok(ApiCommand::Enter),
            "CURSOR_LEFT" => Ok(ApiCommand::CursorLeft),
            "CURSOR_RIGHT" => Ok(ApiCommand::CursorRight),
            "CLEAR_ALL" => Ok(ApiCommand::ClearAll),
            "VIBRATE" => {
                let data = data.trim();
                if data.is_empty() {
                    return Ok(ApiCommand::Vibrate {
                        ms: DEFAULT_VIBRATE_MS,
                    });
                }
                data.parse::<u64>()
                    .map(|ms| ApiCommand::Vibrate { ms })
                    .map_err(|_| ApiError::InvalidArgument {
                        command: command.into(),
                        message: format!("'{}' is not a duration in milliseconds", data),
                    })
            }
            other => Err(ApiError::UnknownCommand(other.to_string())),
        }
    }

    /// The wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            ApiCommand::TypeText(_) => "TYPE_TEXT",
            ApiCommand::Backspace { .. } => "BACKSPACE",
            ApiCommand::Enter => "ENTER",
            ApiCommand::CursorLeft => "CURSOR_LEFT",
            ApiCommand::CursorRight => "CURSOR_RIGHT",
            ApiCommand::ClearAll => "CLEAR_ALL",
            ApiCommand::Vibrate { .. } => "VIBRATE",
        }
    }
}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur when sending API commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The command name is not recognised.
    UnknownCommand(String),
    /// The command's arguments are unusable.
    InvalidArgument { command: String, message: String },
    /// The keyboard loop is not keeping up.
    ChannelFull,
    /// The keyboard loop has shut down.
    ChannelClosed,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::UnknownCommand(name) => write!(f, "Unknown API command '{}'", name),
            ApiError::InvalidArgument { command, message } => {
                write!(f, "Invalid argument for {}: {}", command, message)
            }
            ApiError::ChannelFull => write!(f, "Keyboard message queue is full"),
            ApiError::ChannelClosed => write!(f, "Keyboard is not running"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Sending half of the side channel, handed to tool panels.
#[derive(Debug, Clone)]
pub struct InjectionHandle {
    tx: mpsc::Sender<Message>,
}

impl InjectionHandle {
    /// Wraps the keyboard loop's message sender.
    pub fn new(tx: mpsc::Sender<Message>) -> Self {
        Self { tx }
    }

    /// Sends a command, waiting for channel capacity.
    pub async fn send(&mut self, command: ApiCommand) -> ApiResult<()> {
        tracing::debug!("API: {} sent", command.name());
        self.tx
            .send(Message::Api(command))
            .await
            .map_err(|_| ApiError::ChannelClosed)
    }

    /// Sends a command without waiting. Fails if the channel is full or closed.
    pub fn try_send(&mut self, command: ApiCommand) -> ApiResult<()> {
        self.tx.try_send(Message::Api(command)).map_err(|e| {
            if e.is_disconnected() {
                ApiError::ChannelClosed
            } else {
                tracing::warn!("API channel full, dropping command");
                ApiError::ChannelFull
            }
        })
    }

    /// Parses and sends a raw `(command, data, count)` triple.
    pub async fn send_raw(&mut self, command: &str, data: &str, count: usize) -> ApiResult<()> {
        let command = ApiCommand::parse(command, data, count)?;
        self.send(command).await
    }

    /// Convenience for committing text.
    pub async fn type_text(&mut self, text: impl Into<String>) -> ApiResult<()> {
        self.send(ApiCommand::TypeText(text.into())).await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    /// Test 1: Known commands parse with their arguments
    #[test]
    fn test_parse_commands() {
        assert_eq!(
            ApiCommand::parse("TYPE_TEXT", "héllo", 1),
            Ok(ApiCommand::TypeText("héllo".into()))
        );
        assert_eq!(
            ApiCommand::parse("BACKSPACE", "", 3),
            Ok(ApiCommand::Backspace { count: 3 })
        );
        assert_eq!(ApiCommand::parse("ENTER", "", 1), Ok(ApiCommand::Enter));
        assert_eq!(ApiCommand::parse("CURSOR_LEFT", "", 1), Ok(ApiCommand::CursorLeft));
        assert_eq!(ApiCommand::parse("CURSOR_RIGHT", "", 1), Ok(ApiCommand::CursorRight));
        assert_eq!(ApiCommand::parse("CLEAR_ALL", "", 1), Ok(ApiCommand::ClearAll));
        assert_eq!(
            ApiCommand::parse("VIBRATE", "120", 1),
            Ok(ApiCommand::Vibrate { ms: 120 })
        );
        assert_eq!(
            ApiCommand::parse("VIBRATE", "", 1),
            Ok(ApiCommand::Vibrate { ms: DEFAULT_VIBRATE_MS })
        );
    }

    /// Test 2: Bad input is reported, not guessed
    #[test]
    fn test_parse_errors() {
        assert_eq!(
            ApiCommand::parse("HIDE_KEYBOARD", "", 1),
            Err(ApiError::UnknownCommand("HIDE_KEYBOARD".into()))
        );
        assert!(matches!(
            ApiCommand::parse("BACKSPACE", "", 0),
            Err(ApiError::InvalidArgument { .. })
        ));
        assert!(matches!(
            ApiCommand::parse("VIBRATE", "long", 1),
            Err(ApiError::InvalidArgument { .. })
        ));
    }

    /// Test 3: Commands travel through the channel as messages
    #[tokio::test]
    async fn test_handle_forwards_messages() {
        let (tx, mut rx) = mpsc::channel::<Message>(4);
        let mut handle = InjectionHandle::new(tx);

        handle.type_text("👍").await.expect("channel open");
        handle.send_raw("BACKSPACE", "", 2).await.expect("channel open");

        assert_eq!(
            rx.next().await,
            Some(Message::Api(ApiCommand::TypeText("👍".into())))
        );
        assert_eq!(
            rx.next().await,
            Some(Message::Api(ApiCommand::Backspace { count: 2 }))
        );
    }

    /// Test 4: Sending after the loop is gone reports ChannelClosed
    #[tokio::test]
    async fn test_closed_channel() {
        let (tx, rx) = mpsc::channel::<Message>(1);
        drop(rx);
        let mut handle = InjectionHandle::new(tx);
        assert_eq!(handle.send(ApiCommand::Enter).await, Err(ApiError::ChannelClosed));
        assert_eq!(handle.try_send(ApiCommand::Enter), Err(ApiError::ChannelClosed));
    }
}
