// src/error.rs

//! Error types for driving the renderer engine.

use std::fmt;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Everything that can go wrong while talking to a renderer engine.
#[derive(Debug)]
pub enum RenderError {
    /// Logical window bounds are empty or inverted. Raised before any bytes
    /// are sent.
    InvalidWindow {
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
    },
    /// The window is valid but its derived pixel canvas cannot be described
    /// by a START record (non-finite scale, or a height outside `i32`).
    InvalidCanvas(String),
    /// A save target that cannot be framed as a DRAW record (non-ASCII, or it
    /// contains the newline terminator).
    InvalidFilename(String),
    /// Spawning the engine or writing to its pipe failed. Fatal for the
    /// session that observed it.
    Io(std::io::Error),
    /// Caller-supplied drawing logic failed.
    Callback(anyhow::Error),
}

impl RenderError {
    /// Classifies an error returned by a drawing callback. A bare
    /// `RenderError` (typically an `Io` raised by a drawing call and passed up
    /// with `?`) keeps its kind; one the callback wrapped with context stays a
    /// `Callback` so the context is not lost.
    pub fn from_callback(err: anyhow::Error) -> Self {
        if err.chain().count() > 1 {
            return RenderError::Callback(err);
        }
        match err.downcast::<RenderError>() {
            Ok(render_err) => render_err,
            Err(other) => RenderError::Callback(other),
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::InvalidWindow {
                left,
                bottom,
                right,
                top,
            } => {
                if right <= left {
                    write!(
                        f,
                        "invalid window: left ({}) must be smaller than right ({})",
                        left, right
                    )
                } else {
                    write!(
                        f,
                        "invalid window: bottom ({}) must be smaller than top ({})",
                        bottom, top
                    )
                }
            }
            RenderError::InvalidCanvas(reason) => write!(f, "invalid canvas: {}", reason),
            RenderError::InvalidFilename(name) => {
                write!(f, "invalid filename {:?}: must be ASCII without newlines", name)
            }
            RenderError::Io(err) => write!(f, "engine i/o failure: {}", err),
            RenderError::Callback(err) => write!(f, "drawing callback failed: {:#}", err),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Io(err) => Some(err),
            RenderError::Callback(err) => Some(&**err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RenderError {
    fn from(err: std::io::Error) -> Self {
        RenderError::Io(err)
    }
}

/// Errors raised while decoding a captured command stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The stream ended inside a payload.
    UnexpectedEnd,
    /// Byte does not name any opcode.
    InvalidOpcode(u8),
    /// DRAW payload is not ASCII.
    InvalidFilename,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEnd => write!(f, "unexpected end of command stream"),
            DecodeError::InvalidOpcode(byte) => write!(f, "invalid opcode byte: {}", byte),
            DecodeError::InvalidFilename => write!(f, "DRAW filename is not ASCII"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn callback_render_errors_keep_their_kind() {
        let io_err = RenderError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        let classified = RenderError::from_callback(anyhow::Error::new(io_err));
        assert!(matches!(classified, RenderError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn context_on_a_render_error_is_kept() {
        use anyhow::Context;
        let raised: anyhow::Result<()> =
            Err(RenderError::InvalidFilename("caf\u{e9}.png".to_string())).context("saving roads");
        let classified = RenderError::from_callback(raised.unwrap_err());
        match classified {
            RenderError::Callback(err) => {
                assert_eq!(err.to_string(), "saving roads");
                assert!(err.downcast_ref::<RenderError>().is_some());
            }
            other => panic!("expected Callback, got {:?}", other),
        }
    }

    #[test]
    fn foreign_callback_errors_are_wrapped() {
        let classified = RenderError::from_callback(anyhow::anyhow!("no data"));
        match classified {
            RenderError::Callback(err) => assert_eq!(err.to_string(), "no data"),
            other => panic!("expected Callback, got {:?}", other),
        }
    }

    #[test]
    fn invalid_window_message_names_the_failing_axis() {
        let horizontal = RenderError::InvalidWindow {
            left: 0.0,
            bottom: 0.0,
            right: -1.0,
            top: 1.0,
        };
        assert!(horizontal.to_string().contains("right"));

        let vertical = RenderError::InvalidWindow {
            left: 0.0,
            bottom: 1.0,
            right: 1.0,
            top: 0.0,
        };
        assert!(vertical.to_string().contains("top"));
    }
}
