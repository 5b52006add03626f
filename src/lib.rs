// src/lib.rs

//! # prender
//!
//! Drives an external renderer engine by streaming a compact binary command
//! protocol into its stdin. The engine does the rasterisation and writes
//! image files; this crate only decides which bytes to send.
//!
//! - [`protocol`]: the opcode table and fixed-layout command records.
//! - [`Encoder`]: writes drawing operations to any byte sink, in pixel units.
//! - [`MapCanvas`]: the same operations in logical window units (Y-up),
//!   rescaled and flipped onto the pixel canvas.
//! - [`Session`], [`Renderer`], [`MapRenderer`]: spawn an engine per session
//!   and guarantee START/STOP framing even when drawing fails.
//!
//! ```no_run
//! use prender::{Canvas, MapRenderer};
//!
//! # fn main() -> prender::Result<()> {
//! MapRenderer::default().execute(-500.0, -500.0, 500.0, 500.0, 500, |canvas| {
//!     canvas.smooth()?;
//!     canvas.background(255, 255, 255)?;
//!     canvas.line(-500.0, -500.0, 500.0, 500.0)?;
//!     canvas.save_local("map.png")?;
//!     Ok(())
//! })
//! # }
//! ```

pub mod color;
pub mod config;
pub mod encoder;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod session;
pub mod transform;

pub use color::Color;
pub use config::{Config, EngineConfig, CONFIG};
pub use encoder::{Canvas, Encoder};
pub use engine::EngineProcess;
pub use error::{DecodeError, RenderError, Result};
pub use protocol::{Command, Opcode};
pub use session::{MapRenderer, MapSession, PixelSession, Renderer, Session, SessionCanvas};
pub use transform::{MapCanvas, Window, WindowFrame};
