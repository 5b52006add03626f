// src/protocol/opcode.rs

//! The opcode table shared with the renderer engine.

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Single-byte command tags understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Line = 0,
    Draw = 1,
    Background = 2,
    Smooth = 3,
    Stop = 4,
    StrokeWeight = 5,
    Test = 6,
    Start = 7,
    Stroke = 8,
    Scale = 9,
    Translate = 10,
    Point = 11,
    Ellipse = 12,
    NoFill = 13,
    Fill = 14,
}

/// Wire names in opcode order. Index `i` holds the opcode whose byte is `i`.
pub const OPCODE_TABLE: [(&str, Opcode); 15] = [
    ("LINE", Opcode::Line),
    ("DRAW", Opcode::Draw),
    ("BACKGROUND", Opcode::Background),
    ("SMOOTH", Opcode::Smooth),
    ("STOP", Opcode::Stop),
    ("STROKEWEIGHT", Opcode::StrokeWeight),
    ("TEST", Opcode::Test),
    ("START", Opcode::Start),
    ("STROKE", Opcode::Stroke),
    ("SCALE", Opcode::Scale),
    ("TRANSLATE", Opcode::Translate),
    ("POINT", Opcode::Point),
    ("ELLIPSE", Opcode::Ellipse),
    ("NOFILL", Opcode::NoFill),
    ("FILL", Opcode::Fill),
];

static BY_NAME: Lazy<HashMap<&'static str, Opcode>> =
    Lazy::new(|| OPCODE_TABLE.iter().copied().collect());

impl Opcode {
    /// Maps a wire byte back to its opcode.
    pub fn from_byte(byte: u8) -> Option<Self> {
        OPCODE_TABLE.get(byte as usize).map(|&(_, op)| op)
    }

    /// Looks up an opcode by its wire name (`"NOFILL"`, `"STROKEWEIGHT"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        BY_NAME.get(name).copied()
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        OPCODE_TABLE[self as usize].0
    }

    /// Width of the payload following this opcode, or `None` for DRAW whose
    /// payload runs to a newline.
    pub fn payload_len(self) -> Option<usize> {
        match self {
            Opcode::Smooth | Opcode::Stop | Opcode::NoFill => Some(0),
            Opcode::Background => Some(3),
            Opcode::Stroke | Opcode::Fill | Opcode::StrokeWeight => Some(4),
            Opcode::Start | Opcode::Point | Opcode::Scale | Opcode::Translate => Some(8),
            Opcode::Test => Some(12),
            Opcode::Line | Opcode::Ellipse => Some(16),
            Opcode::Draw => None,
        }
    }
}
