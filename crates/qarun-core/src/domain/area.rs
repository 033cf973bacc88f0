//! Quality-risk areas A–I.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::status::{Risk, Status};

/// Code of one of the nine fixed quality areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AreaCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
}

impl AreaCode {
    pub const ALL: [AreaCode; 9] = [
        AreaCode::A,
        AreaCode::B,
        AreaCode::C,
        AreaCode::D,
        AreaCode::E,
        AreaCode::F,
        AreaCode::G,
        AreaCode::H,
        AreaCode::I,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AreaCode::A => "A",
            AreaCode::B => "B",
            AreaCode::C => "C",
            AreaCode::D => "D",
            AreaCode::E => "E",
            AreaCode::F => "F",
            AreaCode::G => "G",
            AreaCode::H => "H",
            AreaCode::I => "I",
        }
    }
}

impl fmt::Display for AreaCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the A–I summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaResult {
    pub code: AreaCode,
    pub title: String,
    pub status: Status,
    /// Single clipped line justifying the status.
    pub evidence: String,
    pub risk: Risk,
    pub fix: String,
}

impl AreaResult {
    /// `"<code>. <title>"` as shown in the report.
    pub fn label(&self) -> String {
        format!("{}. {}", self.code, self.title)
    }
}
