// src/protocol/command.rs

//! Fixed-layout serialisation of individual drawing commands.
//!
//! Every record is an opcode byte followed by a payload whose layout is fixed
//! by the opcode. Multi-byte numbers are big-endian. The only variable-length
//! record is DRAW, whose payload is an ASCII filename terminated by `\n`.

use super::opcode::Opcode;
use crate::color::Color;
use crate::error::DecodeError;

/// Integer half of the TEST diagnostic probe.
pub const TEST_PROBE_INT: i32 = 42;
/// Floating-point half of the TEST diagnostic probe.
#[allow(clippy::approx_constant)]
pub const TEST_PROBE_FLOAT: f64 = 3.14159265358;

const DRAW_TERMINATOR: u8 = b'\n';

/// One drawing command, ready to be serialised.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Start { width: i32, height: i32 },
    Smooth,
    /// Alpha is not transmitted.
    Background(Color),
    Line { x1: f32, y1: f32, x2: f32, y2: f32 },
    Point { x: f32, y: f32 },
    Ellipse { x: f32, y: f32, width: f32, height: f32 },
    /// Ask the engine to write the current image to this path.
    Draw(String),
    StrokeWeight(f32),
    Stroke(Color),
    Fill(Color),
    NoFill,
    Scale { x: f32, y: f32 },
    Translate { x: f32, y: f32 },
    Test,
    Stop,
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Start { .. } => Opcode::Start,
            Command::Smooth => Opcode::Smooth,
            Command::Background(_) => Opcode::Background,
            Command::Line { .. } => Opcode::Line,
            Command::Point { .. } => Opcode::Point,
            Command::Ellipse { .. } => Opcode::Ellipse,
            Command::Draw(_) => Opcode::Draw,
            Command::StrokeWeight(_) => Opcode::StrokeWeight,
            Command::Stroke(_) => Opcode::Stroke,
            Command::Fill(_) => Opcode::Fill,
            Command::NoFill => Opcode::NoFill,
            Command::Scale { .. } => Opcode::Scale,
            Command::Translate { .. } => Opcode::Translate,
            Command::Test => Opcode::Test,
            Command::Stop => Opcode::Stop,
        }
    }

    /// Total record size in bytes, opcode included.
    pub fn encoded_len(&self) -> usize {
        match (self, self.opcode().payload_len()) {
            (_, Some(len)) => 1 + len,
            (Command::Draw(name), None) => 1 + name.len() + 1,
            (_, None) => unreachable!("only DRAW has a variable payload"),
        }
    }

    /// Appends the wire form of this command to `buf`.
    ///
    /// DRAW filenames are written verbatim; callers are expected to have
    /// checked them with [`is_valid_filename`].
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.encoded_len());
        buf.push(self.opcode().byte());
        match self {
            Command::Start { width, height } => {
                buf.extend_from_slice(&width.to_be_bytes());
                buf.extend_from_slice(&height.to_be_bytes());
            }
            Command::Smooth | Command::NoFill | Command::Stop => {}
            Command::Background(color) => buf.extend_from_slice(&color.to_rgb_bytes()),
            Command::Line { x1, y1, x2, y2 } => put_f32s(buf, &[*x1, *y1, *x2, *y2]),
            Command::Point { x, y } | Command::Scale { x, y } | Command::Translate { x, y } => {
                put_f32s(buf, &[*x, *y])
            }
            Command::Ellipse {
                x,
                y,
                width,
                height,
            } => put_f32s(buf, &[*x, *y, *width, *height]),
            Command::Draw(name) => {
                buf.extend_from_slice(name.as_bytes());
                buf.push(DRAW_TERMINATOR);
            }
            Command::StrokeWeight(weight) => put_f32s(buf, &[*weight]),
            Command::Stroke(color) | Command::Fill(color) => {
                buf.extend_from_slice(&color.to_rgba_bytes())
            }
            Command::Test => {
                buf.extend_from_slice(&TEST_PROBE_INT.to_be_bytes());
                buf.extend_from_slice(&TEST_PROBE_FLOAT.to_be_bytes());
            }
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Parses one record from the front of `bytes`.
    ///
    /// Returns the command and the number of bytes consumed.
    pub fn decode(bytes: &[u8]) -> Result<(Command, usize), DecodeError> {
        let mut reader = Reader { bytes, pos: 0 };
        let [tag] = reader.take::<1>()?;
        let opcode = Opcode::from_byte(tag).ok_or(DecodeError::InvalidOpcode(tag))?;
        let command = match opcode {
            Opcode::Start => Command::Start {
                width: reader.i32()?,
                height: reader.i32()?,
            },
            Opcode::Smooth => Command::Smooth,
            Opcode::Background => {
                let [r, g, b] = reader.take::<3>()?;
                Command::Background(Color::rgb(r, g, b))
            }
            Opcode::Line => Command::Line {
                x1: reader.f32()?,
                y1: reader.f32()?,
                x2: reader.f32()?,
                y2: reader.f32()?,
            },
            Opcode::Point => Command::Point {
                x: reader.f32()?,
                y: reader.f32()?,
            },
            Opcode::Ellipse => Command::Ellipse {
                x: reader.f32()?,
                y: reader.f32()?,
                width: reader.f32()?,
                height: reader.f32()?,
            },
            Opcode::Draw => Command::Draw(reader.line()?),
            Opcode::StrokeWeight => Command::StrokeWeight(reader.f32()?),
            Opcode::Stroke => Command::Stroke(reader.color()?),
            Opcode::Fill => Command::Fill(reader.color()?),
            Opcode::NoFill => Command::NoFill,
            Opcode::Scale => Command::Scale {
                x: reader.f32()?,
                y: reader.f32()?,
            },
            Opcode::Translate => Command::Translate {
                x: reader.f32()?,
                y: reader.f32()?,
            },
            Opcode::Test => {
                reader.take::<12>()?;
                Command::Test
            }
            Opcode::Stop => Command::Stop,
        };
        Ok((command, reader.pos))
    }
}

/// A filename can be carried by DRAW if it is ASCII and does not contain the
/// record terminator.
pub fn is_valid_filename(name: &str) -> bool {
    name.is_ascii() && !name.bytes().any(|b| b == DRAW_TERMINATOR)
}

/// Decodes a whole captured stream into commands.
pub fn decode_stream(mut bytes: &[u8]) -> Result<Vec<Command>, DecodeError> {
    let mut commands = Vec::new();
    while !bytes.is_empty() {
        let (command, consumed) = Command::decode(bytes)?;
        commands.push(command);
        bytes = &bytes[consumed..];
    }
    Ok(commands)
}

fn put_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for v in values {
        buf.extend_from_slice(&v.to_be_bytes());
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Reader<'_> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let end = self.pos + N;
        let chunk = self
            .bytes
            .get(self.pos..end)
            .ok_or(DecodeError::UnexpectedEnd)?;
        self.pos = end;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    fn i32(&mut self) -> Result<i32, DecodeError> {
        self.take::<4>().map(i32::from_be_bytes)
    }

    fn f32(&mut self) -> Result<f32, DecodeError> {
        self.take::<4>().map(f32::from_be_bytes)
    }

    fn color(&mut self) -> Result<Color, DecodeError> {
        let [r, g, b, a] = self.take::<4>()?;
        Ok(Color::rgba(r, g, b, a))
    }

    fn line(&mut self) -> Result<String, DecodeError> {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|&b| b == DRAW_TERMINATOR)
            .ok_or(DecodeError::UnexpectedEnd)?;
        let name = &rest[..len];
        if !name.is_ascii() {
            return Err(DecodeError::InvalidFilename);
        }
        self.pos += len + 1;
        // ASCII is valid UTF-8.
        Ok(String::from_utf8_lossy(name).into_owned())
    }
}
