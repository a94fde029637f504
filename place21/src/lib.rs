//!
//! # Place21 MILP Block Placement
//!
//! Places rectangular circuit blocks on an integer grid by formulating placement as a
//! mixed-integer linear program: minimize total half-perimeter wirelength (HPWL),
//! subject to every block lying within the layout and no two blocks overlapping.
//!
//! The pipeline, run once per [IlpPlacer::place] call:
//! * [VarMap] allocates solver columns for block positions, pairwise separation binaries, and net spans.
//! * [ConstraintGen] emits boundary, big-M non-overlap, and HPWL-linearization rows.
//! * [Objective] sets column costs to realize total HPWL.
//! * A [Solver] solves the resulting [MilpModel].
//! * [SolutionWriter] writes rounded positions back into the [CircuitData].
//!
//! Pairwise separation columns grow quadratically with the number of blocks,
//! which bounds practical problem sizes to some small number of hundreds of blocks.
//!

// Internal modules & re-exports
pub use place21utils as utils;

pub mod circuit;
pub use circuit::*;
pub mod config;
pub use config::{IlpConfig, ResolvedConfig};
pub mod constraints;
pub use constraints::{ConstraintGen, RowCounts};
pub mod error;
pub use error::{PlaceError, PlaceResult};
pub mod load;
pub use load::CircuitSpec;
pub mod model;
pub use model::{Col, MilpModel, Row};
pub mod objective;
pub use objective::Objective;
pub mod placer;
pub use placer::{Formulation, IlpPlacer, PlaceOutcome};
pub mod report;
pub mod samples;
pub mod solver;
pub use solver::{SolveResult, SolveStatus, Solver, SolverOptions};
#[cfg(feature = "microlp")]
pub use solver::MicroLpSolver;
pub mod vars;
pub use vars::VarMap;
pub mod verify;
pub mod writer;
pub use writer::SolutionWriter;

#[cfg(test)]
mod tests;
