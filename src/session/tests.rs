// src/session/tests.rs

use super::*;
use crate::color::Color;
use crate::config::EngineConfig;
use crate::protocol::{decode_stream, Command, Opcode};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

fn decoded(bytes: &[u8]) -> Vec<Command> {
    decode_stream(bytes).expect("stream decodes")
}

fn count(commands: &[Command], opcode: Opcode) -> usize {
    commands.iter().filter(|c| c.opcode() == opcode).count()
}

/// Accepts `budget` bytes, then behaves like a pipe whose reader has exited.
struct FailingPipe {
    written: Vec<u8>,
    budget: usize,
}

impl FailingPipe {
    fn new(budget: usize) -> Self {
        FailingPipe {
            written: Vec::new(),
            budget,
        }
    }
}

impl Write for FailingPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written.len() + buf.len() > self.budget {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "engine exited"));
        }
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test_log::test]
fn execute_frames_drawing_with_one_start_and_one_stop() {
    let mut sink = Vec::new();
    let value = Session::start(&mut sink, 200, 200)
        .unwrap()
        .execute(|canvas| {
            canvas.smooth()?;
            canvas.background(255, 255, 255)?;
            canvas.line(0.0, 0.0, 100.0, 100.0)?;
            canvas.stroke(Color::rgb(255, 0, 0))?;
            Ok(7)
        })
        .unwrap();
    assert_eq!(value, 7);

    let commands = decoded(&sink);
    assert_eq!(
        commands.first(),
        Some(&Command::Start {
            width: 200,
            height: 200
        })
    );
    assert_eq!(commands.last(), Some(&Command::Stop));
    assert_eq!(count(&commands, Opcode::Start), 1);
    assert_eq!(count(&commands, Opcode::Stop), 1);
    assert_eq!(commands.len(), 6);
}

#[test_log::test]
fn failing_callback_still_stops_and_propagates() {
    let mut sink = Vec::new();
    let err = Session::start(&mut sink, 10, 10)
        .unwrap()
        .execute(|canvas| -> anyhow::Result<()> {
            canvas.point(1.0, 1.0)?;
            anyhow::bail!("out of data")
        })
        .unwrap_err();
    match err {
        RenderError::Callback(e) => assert_eq!(e.to_string(), "out of data"),
        other => panic!("expected Callback, got {:?}", other),
    }

    let commands = decoded(&sink);
    assert_eq!(count(&commands, Opcode::Start), 1);
    assert_eq!(count(&commands, Opcode::Stop), 1);
    assert_eq!(commands.last(), Some(&Command::Stop));
}

#[test]
fn render_errors_from_the_callback_keep_their_kind() {
    let mut sink = Vec::new();
    let err = Session::start(&mut sink, 10, 10)
        .unwrap()
        .execute(|canvas| {
            canvas.save("r\u{e9}sum\u{e9}.png")?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, RenderError::InvalidFilename(_)));
    assert_eq!(decoded(&sink).last(), Some(&Command::Stop));
}

#[test]
fn context_added_by_the_callback_is_kept() {
    use anyhow::Context;
    let mut sink = Vec::new();
    let err = Session::start(&mut sink, 10, 10)
        .unwrap()
        .execute(|canvas| {
            canvas
                .save("caf\u{e9}.png")
                .context("saving the roads layer")?;
            Ok(())
        })
        .unwrap_err();
    match err {
        RenderError::Callback(e) => {
            let message = format!("{:#}", e);
            assert!(message.contains("saving the roads layer"));
            assert!(message.contains("invalid filename"));
        }
        other => panic!("expected Callback, got {:?}", other),
    }
    assert_eq!(decoded(&sink).last(), Some(&Command::Stop));
}

#[test]
fn stop_is_written_exactly_once() {
    let mut sink = Vec::new();
    let session = Session::start(&mut sink, 10, 10).unwrap();
    session.stop().unwrap();
    assert_eq!(decoded(&sink), vec![Command::Start { width: 10, height: 10 }, Command::Stop]);
}

#[test]
fn dropping_a_session_stops_it() {
    let mut sink = Vec::new();
    {
        let mut session = Session::start(&mut sink, 10, 10).unwrap();
        session.no_fill().unwrap();
        session.canvas().no_fill().unwrap();
    }
    assert_eq!(
        decoded(&sink),
        vec![
            Command::Start { width: 10, height: 10 },
            Command::NoFill,
            Command::NoFill,
            Command::Stop
        ]
    );
}

#[test]
fn panicking_callback_still_stops() {
    let mut sink = Vec::new();
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let _ = Session::start(&mut sink, 10, 10)
            .unwrap()
            .execute(|canvas| -> anyhow::Result<()> {
                canvas.fill(Color::GREEN)?;
                panic!("drawing logic bug");
            });
    }));
    assert!(outcome.is_err());
    let commands = decoded(&sink);
    assert_eq!(commands.last(), Some(&Command::Stop));
    assert_eq!(count(&commands, Opcode::Stop), 1);
}

#[test]
fn broken_pipe_on_stop_is_reported_when_drawing_succeeded() {
    // Room for START (9 bytes) and one NOFILL, not for STOP.
    let mut pipe = FailingPipe::new(10);
    let err = Session::start(&mut pipe, 10, 10)
        .unwrap()
        .execute(|canvas| {
            canvas.no_fill()?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, RenderError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
}

#[test_log::test]
fn drawing_error_wins_over_stop_error() {
    let mut pipe = FailingPipe::new(9);
    let err = Session::start(&mut pipe, 10, 10)
        .unwrap()
        .execute(|_canvas| -> anyhow::Result<()> { anyhow::bail!("bad input") })
        .unwrap_err();
    assert!(matches!(err, RenderError::Callback(_)));
}

#[test]
fn broken_pipe_mid_drawing_surfaces_as_io() {
    let mut pipe = FailingPipe::new(9);
    let err = Session::start(&mut pipe, 10, 10)
        .unwrap()
        .execute(|canvas| {
            canvas.line(0.0, 0.0, 1.0, 1.0)?;
            Ok(())
        })
        .unwrap_err();
    assert!(matches!(err, RenderError::Io(_)));
}

#[test]
fn window_session_sets_up_frame_before_drawing() {
    let window = Window::new(-500.0, -500.0, 500.0, 500.0).unwrap();
    let mut sink = Vec::new();
    Session::start_window(&mut sink, &window, 500)
        .unwrap()
        .execute(|canvas| {
            canvas.smooth()?;
            canvas.background(255, 255, 255)?;
            canvas.line(-500.0, -500.0, 500.0, 500.0)?;
            Ok(())
        })
        .unwrap();
    assert_eq!(
        decoded(&sink),
        vec![
            Command::Start {
                width: 500,
                height: 500
            },
            Command::Scale { x: 0.5, y: 0.5 },
            Command::Translate { x: 500.0, y: 500.0 },
            Command::Smooth,
            Command::Background(Color::WHITE),
            Command::Line {
                x1: -500.0,
                y1: 500.0,
                x2: 500.0,
                y2: -500.0
            },
            Command::Stop,
        ]
    );
}

#[test]
fn invalid_window_is_rejected_before_spawning() {
    let renderer = MapRenderer::new(EngineConfig::with_program("/nonexistent/prender/renderer"));
    assert!(matches!(
        renderer.start(0.0, 0.0, -1.0, 1.0, 100),
        Err(RenderError::InvalidWindow { .. })
    ));
    assert!(matches!(
        renderer.execute(0.0, 1.0, 1.0, 0.0, 100, |_| Ok(())),
        Err(RenderError::InvalidWindow { .. })
    ));
}

#[test]
fn unrepresentable_frame_is_rejected_before_spawning() {
    // The engine path does not exist, so reaching the spawn would yield Io.
    let renderer = MapRenderer::new(EngineConfig::with_program("/nonexistent/prender/renderer"));
    assert!(matches!(
        renderer.start(0.0, 0.0, 1.0, 1e10, 1000),
        Err(RenderError::InvalidCanvas(_))
    ));
    assert!(matches!(
        renderer.start(0.0, 0.0, 5e-324, 1.0, 1000),
        Err(RenderError::InvalidCanvas(_))
    ));
}

#[test]
fn window_session_with_unrepresentable_frame_writes_nothing() {
    let window = Window::new(0.0, 0.0, 1.0, 1e10).unwrap();
    let mut sink = Vec::new();
    assert!(matches!(
        Session::start_window(&mut sink, &window, 1000),
        Err(RenderError::InvalidCanvas(_))
    ));
    assert!(sink.is_empty());
}

#[test]
fn missing_engine_fails_pixel_start_with_io() {
    let renderer = Renderer::new(EngineConfig::with_program("/nonexistent/prender/renderer"));
    assert!(matches!(renderer.start(10, 10), Err(RenderError::Io(_))));
}

#[test]
fn renderers_keep_their_engine_config() {
    let engine = EngineConfig::with_program("/opt/engine/render");
    assert_eq!(
        Renderer::new(engine.clone()).engine().program,
        PathBuf::from("/opt/engine/render")
    );
    assert_eq!(
        MapRenderer::new(engine).engine().program,
        PathBuf::from("/opt/engine/render")
    );
}
