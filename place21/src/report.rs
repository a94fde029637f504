//!
//! # Placement Reports
//!

// Std-Lib
use std::fmt;

// Local Imports
use crate::circuit::CircuitData;

/// Listing of all block (and movable terminal) positions, one per line
pub struct PlacementReport<'a>(pub &'a CircuitData);

impl fmt::Display for PlacementReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Placement Solution:")?;
        for blk in self.0.blocks() {
            writeln!(f, "Block {} at ({}, {})", blk.name, blk.position.x, blk.position.y)?;
        }
        for term in self.0.terminals().iter().filter(|t| t.is_movable()) {
            writeln!(
                f,
                "Terminal {} at ({}, {})",
                term.name, term.position.x, term.position.y
            )?;
        }
        Ok(())
    }
}

/// Log the placement of `circuit`, one `info` record per line
pub fn log_solution(circuit: &CircuitData) {
    for line in PlacementReport(circuit).to_string().lines() {
        log::info!("{}", line);
    }
}
