// src/main.rs

use prender::protocol::decode_stream;
use prender::{Canvas, Color, MapRenderer, Renderer, CONFIG};

// Logging
use anyhow::Context;
use log::{error, info};

const USAGE: &str = "usage: prender [selftest | dump <stream-file>]";

/// Main entry point for the `prender` driver.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
        [] | ["selftest"] => selftest(),
        ["dump", path] => dump(path),
        _ => {
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };
    if let Err(e) = &result {
        error!("prender failed: {:#}", e);
    }
    result
}

/// Drives the engine through every command kind, writing images to the
/// working directory.
fn selftest() -> anyhow::Result<()> {
    info!("Using engine {}", CONFIG.engine.program.display());
    let renderer = Renderer::default();

    renderer
        .execute(200, 200, |pp| {
            pp.smooth()?;
            pp.background(255, 255, 255)?;
            pp.scale(0.5, 0.5)?;
            pp.translate(10.0, 10.0)?;
            pp.line(0.0, 0.0, 100.0, 100.0)?;
            pp.line(0.0, 50.0, 100.0, 50.0)?;
            pp.stroke(Color::RED)?;
            pp.line(100.0, 0.0, 0.0, 100.0)?;
            pp.save_local("thick.png")?;
            pp.background(255, 255, 255)?;
            pp.stroke_weight(0.25)?;
            pp.line(0.0, 0.0, 100.0, 100.0)?;
            pp.save_local("thin.png")?;
            pp.test()?;
            Ok(())
        })
        .context("Pixel session with lines failed")?;

    renderer
        .execute(100, 100, |pp| {
            pp.background(128, 128, 128)?;
            pp.save_local("gray.png")?;
            Ok(())
        })
        .context("Gray background session failed")?;

    renderer
        .execute(100, 100, |pp| {
            pp.background(255, 255, 255)?;
            pp.stroke_weight(2.0)?;
            pp.fill(Color::BLUE.with_alpha(128))?;
            pp.ellipse(50.0, 50.0, 10.0, 10.0)?;
            pp.no_fill()?;
            pp.point(50.0, 50.0)?;
            pp.save_local("point.png")?;
            Ok(())
        })
        .context("Ellipse and point session failed")?;

    MapRenderer::default()
        .execute(-500.0, -500.0, 500.0, 500.0, 500, |mr| {
            mr.smooth()?;
            mr.background(255, 255, 255)?;
            mr.line(-500.0, -500.0, 500.0, 500.0)?;
            mr.save_local("map.png")?;
            Ok(())
        })
        .context("Map session failed")?;

    info!("Self-test complete.");
    Ok(())
}

/// Prints a captured command stream, one command per line.
fn dump(path: &str) -> anyhow::Result<()> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path))?;
    let commands =
        decode_stream(&bytes).with_context(|| format!("Failed to decode stream in {}", path))?;
    for command in &commands {
        println!("{:<12} {:?}", command.opcode().name(), command);
    }
    info!("{} commands, {} bytes", commands.len(), bytes.len());
    Ok(())
}
