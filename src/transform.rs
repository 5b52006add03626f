// src/transform.rs

//! Maps a logical (Y-up) window onto the engine's pixel (Y-down) canvas.
//!
//! Every window is first normalised to a nominal surface 1000 units wide (the
//! factor is the *scale helper*); the engine draws small shapes badly on tiny
//! surfaces. The engine is then told to scale by the pixel resolution and
//! translate so the window's top-left corner is the pixel origin. After that,
//! drawing only has to multiply by the scale helper and negate Y.

use crate::encoder::{Canvas, Encoder};
use crate::error::{RenderError, Result};
use crate::protocol::Command;
use log::debug;
use std::io::Write;

/// Width, in normalised units, every window is rescaled to.
pub const NOMINAL_WIDTH: f64 = 1000.0;

/// A validated logical window, `left < right` and `bottom < top`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    left: f64,
    bottom: f64,
    right: f64,
    top: f64,
}

impl Window {
    pub fn new(left: f64, bottom: f64, right: f64, top: f64) -> Result<Self> {
        // Written as negations so NaN bounds are rejected too.
        if !(right > left) || !(top > bottom) {
            return Err(RenderError::InvalidWindow {
                left,
                bottom,
                right,
                top,
            });
        }
        Ok(Window {
            left,
            bottom,
            right,
            top,
        })
    }

    pub fn left(&self) -> f64 {
        self.left
    }

    pub fn bottom(&self) -> f64 {
        self.bottom
    }

    pub fn right(&self) -> f64 {
        self.right
    }

    pub fn top(&self) -> f64 {
        self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// Values derived once from a window and a target pixel width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowFrame {
    scale_helper: f64,
    resolution: f64,
    pixel_width: i32,
    pixel_height: i32,
    // Window corner in normalised units.
    left: f64,
    top: f64,
}

impl WindowFrame {
    /// Derives the frame for `window` drawn `pixel_width` pixels wide.
    ///
    /// Fails with [`RenderError::InvalidCanvas`] when the derived values can't
    /// be put on the wire: a non-positive width, a scale that overflows or
    /// turns NaN, or a pixel height outside `0..=i32::MAX`.
    pub fn new(window: &Window, pixel_width: i32) -> Result<Self> {
        if pixel_width <= 0 {
            return Err(RenderError::InvalidCanvas(format!(
                "pixel width {} is not positive",
                pixel_width
            )));
        }

        let scale_helper = NOMINAL_WIDTH / window.width();
        if !scale_helper.is_finite() {
            return Err(RenderError::InvalidCanvas(format!(
                "window width {} cannot be rescaled to {} units",
                window.width(),
                NOMINAL_WIDTH
            )));
        }
        let left = window.left * scale_helper;
        let bottom = window.bottom * scale_helper;
        let right = window.right * scale_helper;
        let top = window.top * scale_helper;

        // pixels per normalised unit
        let resolution = f64::from(pixel_width) / (right - left);
        if !resolution.is_finite() {
            return Err(RenderError::InvalidCanvas(format!(
                "resolution for window {:?} is {}",
                window, resolution
            )));
        }

        let height = (top - bottom) * resolution;
        if !(0.0..=f64::from(i32::MAX)).contains(&height) {
            return Err(RenderError::InvalidCanvas(format!(
                "pixel height {} does not fit the START record",
                height
            )));
        }
        let pixel_height = height as i32;

        Ok(WindowFrame {
            scale_helper,
            resolution,
            pixel_width,
            pixel_height,
            left,
            top,
        })
    }

    pub fn scale_helper(&self) -> f64 {
        self.scale_helper
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn pixel_width(&self) -> i32 {
        self.pixel_width
    }

    pub fn pixel_height(&self) -> i32 {
        self.pixel_height
    }

    /// START, SCALE and TRANSLATE, in the order that establishes the frame
    /// on the engine.
    pub fn setup_commands(&self) -> [Command; 3] {
        let resolution = self.resolution as f32;
        [
            Command::Start {
                width: self.pixel_width,
                height: self.pixel_height,
            },
            Command::Scale {
                x: resolution,
                y: resolution,
            },
            Command::Translate {
                x: -self.left as f32,
                y: self.top as f32,
            },
        ]
    }

    /// Converts a logical length or X coordinate into normalised units.
    pub fn normalize(&self, value: f64) -> f64 {
        value * self.scale_helper
    }

    /// Converts a logical Y coordinate, flipping the axis.
    pub fn normalize_y(&self, value: f64) -> f64 {
        -self.normalize(value)
    }
}

/// A canvas that takes coordinates in logical window units.
///
/// Positions and sizes for `line`, `point`, `ellipse` and `stroke_weight` are
/// rescaled (and Y positions flipped) before reaching the wrapped encoder;
/// everything else passes through unchanged.
#[derive(Debug)]
pub struct MapCanvas<W: Write> {
    encoder: Encoder<W>,
    frame: WindowFrame,
}

impl<W: Write> MapCanvas<W> {
    /// Emits START sized for `window` at `pixel_width`, then the SCALE and
    /// TRANSLATE that set up the pixel-space origin. Nothing is written if the
    /// frame cannot be derived.
    pub fn start(sink: W, window: &Window, pixel_width: i32) -> Result<Self> {
        let frame = WindowFrame::new(window, pixel_width)?;
        debug!("MapCanvas: window {:?}", window);
        MapCanvas::with_frame(sink, frame)
    }

    /// Like [`MapCanvas::start`], for a frame derived up front.
    pub fn with_frame(sink: W, frame: WindowFrame) -> Result<Self> {
        debug!(
            "MapCanvas: {}x{} px (scale helper {}, resolution {})",
            frame.pixel_width, frame.pixel_height, frame.scale_helper, frame.resolution
        );
        let mut encoder = Encoder::new(sink);
        for command in frame.setup_commands() {
            encoder.send(command)?;
        }
        Ok(MapCanvas { encoder, frame })
    }

    pub fn frame(&self) -> &WindowFrame {
        &self.frame
    }

    pub fn stop(&mut self) -> Result<()> {
        self.encoder.stop()
    }

    pub fn get_ref(&self) -> &W {
        self.encoder.get_ref()
    }

    pub fn into_inner(self) -> W {
        self.encoder.into_inner()
    }
}

impl<W: Write> Canvas for MapCanvas<W> {
    fn send(&mut self, command: Command) -> Result<()> {
        self.encoder.send(command)
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let f = self.frame;
        self.encoder.line(
            f.normalize(x1),
            f.normalize_y(y1),
            f.normalize(x2),
            f.normalize_y(y2),
        )
    }

    fn point(&mut self, x: f64, y: f64) -> Result<()> {
        let f = self.frame;
        self.encoder.point(f.normalize(x), f.normalize_y(y))
    }

    fn ellipse(&mut self, x: f64, y: f64, width: f64, height: f64) -> Result<()> {
        let f = self.frame;
        self.encoder.ellipse(
            f.normalize(x),
            f.normalize_y(y),
            f.normalize(width),
            f.normalize(height),
        )
    }

    fn stroke_weight(&mut self, weight: f64) -> Result<()> {
        let weight = self.frame.normalize(weight);
        self.encoder.stroke_weight(weight)
    }
}
