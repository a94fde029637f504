//!
//! # MILP Placer
//!
//! Runs the placement pipeline:
//! allocate columns, emit constraints, set the objective, solve, and write positions back.
//! Each call to [IlpPlacer::place] formulates from scratch; nothing carries over between runs
//! other than the recorded [PlaceOutcome].
//!

// Local Imports
use crate::circuit::CircuitData;
use crate::config::{IlpConfig, ResolvedConfig};
use crate::constraints::{ConstraintGen, RowCounts};
use crate::error::{PlaceError, PlaceResult};
use crate::model::MilpModel;
use crate::objective::Objective;
use crate::solver::{SolveStatus, Solver, SolverOptions};
use crate::vars::VarMap;
use crate::writer::SolutionWriter;

/// Block count past which the quadratic pair formulation gets expensive
pub const LARGE_BLOCK_COUNT: usize = 200;

/// # Placement Formulation
/// A complete, solver-ready model, with the column map and configuration it was built from.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub model: MilpModel,
    pub vars: VarMap,
    pub config: ResolvedConfig,
    pub rows: RowCounts,
}
impl Formulation {
    pub fn num_cols(&self) -> usize {
        self.model.num_cols()
    }
    pub fn num_rows(&self) -> usize {
        self.model.num_rows()
    }
}

/// # Placement Outcome
/// Summary of a placement run, successful or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceOutcome {
    pub status: SolveStatus,
    /// Total HPWL, when `status` is [SolveStatus::Optimal]
    pub objective: f64,
    pub num_cols: usize,
    pub num_rows: usize,
}
impl PlaceOutcome {
    pub fn solved(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// # MILP Placer
#[derive(Debug, Clone, Default)]
pub struct IlpPlacer {
    config: IlpConfig,
    last: Option<PlaceOutcome>,
}
impl IlpPlacer {
    pub fn new(config: IlpConfig) -> Self {
        Self { config, last: None }
    }
    pub fn config(&self) -> &IlpConfig {
        &self.config
    }
    pub fn set_config(&mut self, config: IlpConfig) {
        self.config = config;
    }
    /// Outcome of the most recent call to [IlpPlacer::place], if any
    pub fn last_result(&self) -> Option<&PlaceOutcome> {
        self.last.as_ref()
    }
    ///
    /// Build the complete placement model for `circuit`, without solving it.
    ///
    /// Fails only on invalid configuration.
    /// Geometry which cannot be placed still formulates, into an infeasible model.
    ///
    pub fn formulate(&self, circuit: &CircuitData) -> PlaceResult<Formulation> {
        let config = self.config.resolve(circuit)?;
        let n = circuit.num_blocks();
        if n > LARGE_BLOCK_COUNT {
            log::warn!(
                "Placing {} blocks: {} pairwise separation columns may make solving slow",
                n,
                n * (n - 1) / 2 * if config.four_way { 4 } else { 2 }
            );
        }
        let mut model = MilpModel::new();
        let vars = VarMap::allocate(&mut model, circuit, &config);
        let rows = ConstraintGen::emit(&mut model, &vars, circuit, &config);
        Objective::apply(&mut model, &vars);
        log::info!(
            "Formulated {}x{} placement of {} blocks: {} columns, {} rows, {} nonzeros",
            config.layout_w,
            config.layout_h,
            n,
            model.num_cols(),
            model.num_rows(),
            model.num_nonzeros()
        );
        Ok(Formulation {
            model,
            vars,
            config,
            rows,
        })
    }
    ///
    /// Place `circuit` using `solver`, updating block and movable terminal positions in place.
    ///
    /// If the solver does not find an optimal solution, no positions change,
    /// the outcome is still recorded in [IlpPlacer::last_result],
    /// and [PlaceError::Solver] is returned.
    /// An optimal solution which fails write-back checks is recorded with status
    /// [SolveStatus::Error], and the writer's error is returned.
    ///
    pub fn place<S: Solver + ?Sized>(
        &mut self,
        circuit: &mut CircuitData,
        solver: &mut S,
    ) -> PlaceResult<PlaceOutcome> {
        log::info!("Running MILP placer on {} blocks", circuit.num_blocks());
        let form = self.formulate(circuit)?;
        let opts = SolverOptions {
            verbose: form.config.verbose_solver,
        };
        let result = solver.solve(&form.model, &opts);
        let mut outcome = PlaceOutcome {
            status: result.status,
            objective: result.objective,
            num_cols: form.num_cols(),
            num_rows: form.num_rows(),
        };
        match result.status {
            SolveStatus::Optimal => {
                if let Err(e) = SolutionWriter::write(circuit, &form.vars, &result) {
                    log::warn!("Placement failed: solution rejected: {}", e);
                    outcome.status = SolveStatus::Error;
                    self.last = Some(outcome);
                    return Err(e);
                }
                self.last = Some(outcome);
                log::info!("Placement finished, total HPWL {}", result.objective);
                Ok(outcome)
            }
            status => {
                self.last = Some(outcome);
                log::warn!(
                    "Placement failed: solver status {} {}",
                    status,
                    result.message.as_deref().unwrap_or("")
                );
                Err(PlaceError::Solver(status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::GridPoint;
    use crate::samples;
    use crate::solver::SolveResult;

    /// Solver which always reports the same status, without solving
    struct Stub(SolveStatus);
    impl Solver for Stub {
        fn solve(&mut self, _model: &MilpModel, _opts: &SolverOptions) -> SolveResult {
            SolveResult::failed(self.0, "stub")
        }
    }
    /// Solver which claims optimality, with a solution one value short
    struct Truncated;
    impl Solver for Truncated {
        fn solve(&mut self, model: &MilpModel, _opts: &SolverOptions) -> SolveResult {
            SolveResult::optimal(1.0, vec![0.0; model.num_cols() - 1])
        }
    }

    #[test]
    fn test_formulate_counts() -> PlaceResult<()> {
        let c = samples::grid(3, 3)?;
        let form = IlpPlacer::new(IlpConfig::with_layout(3, 3)).formulate(&c)?;
        assert_eq!(form.num_cols(), form.vars.num_cols());
        assert_eq!(form.num_rows(), form.rows.total());
        assert_eq!(form.config.big_m, 3.0);
        Ok(())
    }
    #[test]
    fn test_failed_solve_preserves_positions() -> PlaceResult<()> {
        let mut c = samples::two_blocks()?;
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(4, 1));
        assert!(placer.last_result().is_none());
        let r = placer.place(&mut c, &mut Stub(SolveStatus::Error));
        assert!(matches!(r, Err(PlaceError::Solver(SolveStatus::Error))));
        let last = placer.last_result().unwrap();
        assert!(!last.solved());
        assert!(last.num_cols > 0);
        assert!(c.blocks().iter().all(|b| b.position == GridPoint::new(0, 0)));
        Ok(())
    }
    #[test]
    fn test_rejected_solution_not_recorded_as_solved() -> PlaceResult<()> {
        let mut c = samples::two_blocks()?;
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(4, 1));
        let r = placer.place(&mut c, &mut Truncated);
        assert!(matches!(r, Err(PlaceError::Validation(_))));
        let last = placer.last_result().unwrap();
        assert_eq!(last.status, SolveStatus::Error);
        assert!(!last.solved());
        assert!(c.blocks().iter().all(|b| b.position == GridPoint::new(0, 0)));
        Ok(())
    }
    #[test]
    fn test_bad_config_fails_early() -> PlaceResult<()> {
        let mut c = samples::two_blocks()?;
        let cfg = IlpConfig {
            big_m: Some(1.0),
            ..IlpConfig::with_layout(4, 1)
        };
        let mut placer = IlpPlacer::new(cfg);
        let r = placer.place(&mut c, &mut Stub(SolveStatus::Error));
        assert!(matches!(r, Err(PlaceError::Config(_))));
        assert!(placer.last_result().is_none());
        Ok(())
    }
}
