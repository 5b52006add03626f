// src/encoder.rs

//! The drawing-operation surface and the encoder that serialises it.

use crate::color::Color;
use crate::error::{RenderError, Result};
use crate::protocol::{is_valid_filename, Command};
use log::trace;
use std::io::Write;
use std::path::Path;

/// Drawing operations shared by every canvas flavour.
///
/// Only [`Canvas::send`] is required; the provided methods build the matching
/// [`Command`] and send it. Coordinates are taken as `f64` and narrowed to the
/// wire's `f32` only when the command is built, so canvases that reinterpret
/// coordinates (and override the positional operations) work at full
/// precision.
pub trait Canvas {
    /// Writes one command to the underlying sink, synchronously.
    fn send(&mut self, command: Command) -> Result<()>;

    fn smooth(&mut self) -> Result<()> {
        self.send(Command::Smooth)
    }

    /// Clears the canvas with an opaque color.
    fn background(&mut self, r: u8, g: u8, b: u8) -> Result<()> {
        self.send(Command::Background(Color::rgb(r, g, b)))
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.send(Command::Line {
            x1: x1 as f32,
            y1: y1 as f32,
            x2: x2 as f32,
            y2: y2 as f32,
        })
    }

    fn point(&mut self, x: f64, y: f64) -> Result<()> {
        self.send(Command::Point {
            x: x as f32,
            y: y as f32,
        })
    }

    fn ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        self.send(Command::Ellipse {
            x: x as f32,
            y: y as f32,
            width: width as f32,
            height: height as f32,
        })
    }

    /// Asks the engine to write the accumulated image to `filename`.
    ///
    /// Fails with [`RenderError::InvalidFilename`] before writing anything if
    /// the name is not ASCII or contains a newline.
    fn save(&mut self, filename: &str) -> Result<()> {
        if !is_valid_filename(filename) {
            return Err(RenderError::InvalidFilename(filename.to_string()));
        }
        self.send(Command::Draw(filename.to_string()))
    }

    /// Saves relative to the current working directory.
    fn save_local(&mut self, filename: &str) -> Result<()> {
        let path = std::env::current_dir()?.join(filename);
        let path = path_to_string(&path)?;
        self.save(&path)
    }

    fn stroke_weight(&mut self, weight: f64) -> Result<()> {
        self.send(Command::StrokeWeight(weight as f32))
    }

    fn stroke(&mut self, color: Color) -> Result<()> {
        self.send(Command::Stroke(color))
    }

    fn fill(&mut self, color: Color) -> Result<()> {
        self.send(Command::Fill(color))
    }

    fn no_fill(&mut self) -> Result<()> {
        self.send(Command::NoFill)
    }

    fn scale(&mut self, x: f64, y: f64) -> Result<()> {
        self.send(Command::Scale {
            x: x as f32,
            y: y as f32,
        })
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.send(Command::Translate {
            x: x as f32,
            y: y as f32,
        })
    }

    /// Sends the fixed diagnostic probe.
    fn test(&mut self) -> Result<()> {
        self.send(Command::Test)
    }
}

fn path_to_string(path: &Path) -> Result<String> {
    path.to_str()
        .map(str::to_string)
        .ok_or_else(|| RenderError::InvalidFilename(path.display().to_string()))
}

/// Serialises commands into a byte sink in call order.
///
/// Each command is assembled in full and handed to the sink with a single
/// `write_all`; nothing is buffered across commands.
#[derive(Debug)]
pub struct Encoder<W: Write> {
    sink: W,
    scratch: Vec<u8>,
}

impl<W: Write> Encoder<W> {
    pub fn new(sink: W) -> Self {
        Encoder {
            sink,
            scratch: Vec::with_capacity(32),
        }
    }

    /// Emits START with the canvas size in pixels.
    pub fn start(&mut self, width: i32, height: i32) -> Result<()> {
        self.send(Command::Start { width, height })
    }

    /// Emits STOP, ending the engine's drawing session.
    pub fn stop(&mut self) -> Result<()> {
        self.send(Command::Stop)
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl<W: Write> Canvas for Encoder<W> {
    fn send(&mut self, command: Command) -> Result<()> {
        trace!("Encoder: sending {:?}", command);
        self.scratch.clear();
        command.encode_into(&mut self.scratch);
        self.sink.write_all(&self.scratch)?;
        Ok(())
    }
}
