use serde::{Deserialize, Serialize};

/// A 1-based source position. Line 0 is reserved for diagnostics that have
/// no expression to anchor to (e.g. a bare `return` missing its value).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pos {
    pub line: u32,
    pub col: u32,
}

impl Pos {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    pub fn none() -> Self {
        Self { line: 0, col: 0 }
    }
}
