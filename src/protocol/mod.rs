// src/protocol/mod.rs

//! Binary command protocol spoken to the renderer engine.
//!
//! The stream is a sequence of opcode-tagged records with no framing, no
//! length prefixes and no version negotiation. Both ends must agree on the
//! opcode table and on each opcode's payload layout byte for byte:
//!
//! | Command      | Byte | Payload                                   |
//! |--------------|------|-------------------------------------------|
//! | LINE         | 0    | x1, y1, x2, y2: f32                       |
//! | DRAW         | 1    | ASCII filename, `\n`                      |
//! | BACKGROUND   | 2    | r, g, b: u8                               |
//! | SMOOTH       | 3    | -                                         |
//! | STOP         | 4    | -                                         |
//! | STROKEWEIGHT | 5    | weight: f32                               |
//! | TEST         | 6    | 42: i32, 3.14159265358: f64               |
//! | START        | 7    | width, height: i32                        |
//! | STROKE       | 8    | r, g, b, a: u8                            |
//! | SCALE        | 9    | x, y: f32                                 |
//! | TRANSLATE    | 10   | x, y: f32                                 |
//! | POINT        | 11   | x, y: f32                                 |
//! | ELLIPSE      | 12   | x, y, w, h: f32                           |
//! | NOFILL       | 13   | -                                         |
//! | FILL         | 14   | r, g, b, a: u8                            |
//!
//! Multi-byte fields are big-endian.

pub mod command;
pub mod opcode;

pub use command::{decode_stream, is_valid_filename, Command, TEST_PROBE_FLOAT, TEST_PROBE_INT};
pub use opcode::{Opcode, OPCODE_TABLE};
