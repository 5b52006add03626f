// src/session/mod.rs

//! Drawing sessions: one engine process, framed by START and STOP.
//!
//! A [`Session`] exists only after START has been written, and STOP is written
//! exactly once however the session ends: [`Session::stop`],
//! [`Session::execute`], or drop (including unwinding from a panic). The
//! engine is released after STOP, so it always sees a complete stream.

use crate::config::{EngineConfig, CONFIG};
use crate::encoder::{Canvas, Encoder};
use crate::engine::EngineProcess;
use crate::error::{RenderError, Result};
use crate::transform::{MapCanvas, Window, WindowFrame};
use log::{debug, warn};
use std::io::Write;
use std::ops::{Deref, DerefMut};

/// A canvas that can end the engine's drawing session.
pub trait SessionCanvas: Canvas {
    fn stop(&mut self) -> Result<()>;
}

impl<W: Write> SessionCanvas for Encoder<W> {
    fn stop(&mut self) -> Result<()> {
        Encoder::stop(self)
    }
}

impl<W: Write> SessionCanvas for MapCanvas<W> {
    fn stop(&mut self) -> Result<()> {
        MapCanvas::stop(self)
    }
}

/// A started drawing session. Dereferences to its canvas.
#[derive(Debug)]
pub struct Session<C: SessionCanvas> {
    canvas: C,
    stopped: bool,
}

/// Pixel-space session driving a spawned engine.
pub type PixelSession = Session<Encoder<EngineProcess>>;
/// Window-space session driving a spawned engine.
pub type MapSession = Session<MapCanvas<EngineProcess>>;

impl<W: Write> Session<Encoder<W>> {
    /// Writes START for a `width` x `height` pixel canvas to `sink`.
    pub fn start(sink: W, width: i32, height: i32) -> Result<Self> {
        let mut encoder = Encoder::new(sink);
        encoder.start(width, height)?;
        debug!("Session: started {}x{} pixel canvas", width, height);
        Ok(Session::started(encoder))
    }
}

impl<W: Write> Session<MapCanvas<W>> {
    /// Writes START, SCALE and TRANSLATE for `window` rendered `pixel_width`
    /// pixels wide.
    pub fn start_window(sink: W, window: &Window, pixel_width: i32) -> Result<Self> {
        let frame = WindowFrame::new(window, pixel_width)?;
        Session::start_frame(sink, frame)
    }

    /// Writes the setup commands of an already derived `frame`.
    pub fn start_frame(sink: W, frame: WindowFrame) -> Result<Self> {
        let canvas = MapCanvas::with_frame(sink, frame)?;
        debug!(
            "Session: started {}x{} window canvas",
            canvas.frame().pixel_width(),
            canvas.frame().pixel_height()
        );
        Ok(Session::started(canvas))
    }
}

impl<C: SessionCanvas> Session<C> {
    fn started(canvas: C) -> Self {
        Session {
            canvas,
            stopped: false,
        }
    }

    pub fn canvas(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// Writes STOP and releases the canvas (and its engine).
    pub fn stop(mut self) -> Result<()> {
        self.stop_once()
    }

    /// Runs `draw` against the canvas, then stops the session.
    ///
    /// STOP is written whether or not `draw` succeeds. A failure from `draw`
    /// takes precedence over a failure to write STOP.
    pub fn execute<T, F>(mut self, draw: F) -> Result<T>
    where
        F: FnOnce(&mut C) -> anyhow::Result<T>,
    {
        let outcome = draw(&mut self.canvas);
        let stopped = self.stop_once();
        drop(self);
        match outcome {
            Ok(value) => stopped.map(|()| value),
            Err(err) => {
                if let Err(stop_err) = stopped {
                    warn!("Session: failed to stop after drawing error: {}", stop_err);
                }
                Err(RenderError::from_callback(err))
            }
        }
    }

    fn stop_once(&mut self) -> Result<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        let result = self.canvas.stop();
        debug!("Session: stopped");
        result
    }
}

impl<C: SessionCanvas> Deref for Session<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.canvas
    }
}

impl<C: SessionCanvas> DerefMut for Session<C> {
    fn deref_mut(&mut self) -> &mut C {
        &mut self.canvas
    }
}

impl<C: SessionCanvas> Drop for Session<C> {
    fn drop(&mut self) {
        if let Err(e) = self.stop_once() {
            warn!("Session: failed to write STOP on drop: {}", e);
        }
    }
}

/// Starts pixel-space sessions, each on a freshly spawned engine.
#[derive(Debug, Clone)]
pub struct Renderer {
    engine: EngineConfig,
}

impl Renderer {
    pub fn new(engine: EngineConfig) -> Self {
        Renderer { engine }
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    pub fn start(&self, width: i32, height: i32) -> Result<PixelSession> {
        let process = EngineProcess::spawn(&self.engine)?;
        Session::start(process, width, height)
    }

    /// Starts a session, runs `draw`, and stops the session.
    pub fn execute<T, F>(&self, width: i32, height: i32, draw: F) -> Result<T>
    where
        F: FnOnce(&mut Encoder<EngineProcess>) -> anyhow::Result<T>,
    {
        self.start(width, height)?.execute(draw)
    }
}

impl Default for Renderer {
    /// Uses the engine from the process-wide configuration.
    fn default() -> Self {
        Renderer::new(CONFIG.engine.clone())
    }
}

/// Starts window-space sessions, each on a freshly spawned engine.
#[derive(Debug, Clone)]
pub struct MapRenderer {
    engine: EngineConfig,
}

impl MapRenderer {
    pub fn new(engine: EngineConfig) -> Self {
        MapRenderer { engine }
    }

    pub fn engine(&self) -> &EngineConfig {
        &self.engine
    }

    /// Starts a session mapping (`left`, `bottom`)-(`right`, `top`) onto a
    /// canvas `pixel_width` pixels wide.
    ///
    /// The window and the pixel frame derived from it are validated before the
    /// engine is spawned.
    pub fn start(
        &self,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
        pixel_width: i32,
    ) -> Result<MapSession> {
        let window = Window::new(left, bottom, right, top)?;
        let frame = WindowFrame::new(&window, pixel_width)?;
        let process = EngineProcess::spawn(&self.engine)?;
        Session::start_frame(process, frame)
    }

    pub fn execute<T, F>(
        &self,
        left: f64,
        bottom: f64,
        right: f64,
        top: f64,
        pixel_width: i32,
        draw: F,
    ) -> Result<T>
    where
        F: FnOnce(&mut MapCanvas<EngineProcess>) -> anyhow::Result<T>,
    {
        self.start(left, bottom, right, top, pixel_width)?
            .execute(draw)
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        MapRenderer::new(CONFIG.engine.clone())
    }
}

#[cfg(test)]
mod tests;
