//! Risk-bucketed fix backlog built from failing areas.

use serde::{Deserialize, Serialize};

use crate::domain::{AreaResult, Risk, Status};

/// A failing area placed in a risk bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BacklogEntry {
    /// Bucket-scoped ID such as `H-001`.
    pub id: String,
    pub area: AreaResult,
}

impl BacklogEntry {
    /// Short issue text for the backlog table.
    pub fn issue(&self) -> String {
        format!("{} failed", self.area.code)
    }
}

/// Failing areas grouped by risk, in A→I encounter order within each bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backlog {
    pub high: Vec<BacklogEntry>,
    pub medium: Vec<BacklogEntry>,
    pub low: Vec<BacklogEntry>,
}

/// Heading, ID prefix and risk of each bucket, in render order.
pub const BUCKETS: [(Risk, &str, char); 3] = [
    (Risk::High, "High", 'H'),
    (Risk::Med, "Medium", 'M'),
    (Risk::Low, "Low", 'L'),
];

impl Backlog {
    pub fn bucket(&self, risk: Risk) -> &[BacklogEntry] {
        match risk {
            Risk::High => &self.high,
            Risk::Med => &self.medium,
            Risk::Low => &self.low,
        }
    }

    fn bucket_mut(&mut self, risk: Risk) -> &mut Vec<BacklogEntry> {
        match risk {
            Risk::High => &mut self.high,
            Risk::Med => &mut self.medium,
            Risk::Low => &mut self.low,
        }
    }

    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn prefix_for(risk: Risk) -> char {
    match risk {
        Risk::High => 'H',
        Risk::Med => 'M',
        Risk::Low => 'L',
    }
}

/// Route every FAIL area into its risk bucket and number it.
pub fn build_backlog(areas: &[AreaResult]) -> Backlog {
    let mut backlog = Backlog::default();
    for area in areas.iter().filter(|a| a.status == Status::Fail) {
        let bucket = backlog.bucket_mut(area.risk);
        let id = format!("{}-{:03}", prefix_for(area.risk), bucket.len() + 1);
        bucket.push(BacklogEntry {
            id,
            area: area.clone(),
        });
    }
    backlog
}
