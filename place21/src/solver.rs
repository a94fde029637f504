//!
//! # Solver Adapter
//!
//! The [Solver] trait is the single seam between placement formulation and MILP solving.
//! Solvers consume a [MilpModel] and report a [SolveResult];
//! their internal search is never inspected.
//!
//! With the (default) `microlp` feature enabled, [MicroLpSolver] solves models
//! with the pure-Rust `microlp` branch-and-bound solver.
//!

// Local Imports
use crate::model::MilpModel;
use crate::utils::enumstr;

enumstr!(
    /// # Solve Status
    SolveStatus {
        Optimal: "OPTIMAL",
        Infeasible: "INFEASIBLE",
        Error: "ERROR",
    }
);

/// # Solve Result
#[derive(Debug, Clone, PartialEq)]
pub struct SolveResult {
    pub status: SolveStatus,
    /// Objective value. Meaningful only when `status` is [SolveStatus::Optimal].
    pub objective: f64,
    /// One value per model column. Empty unless `status` is [SolveStatus::Optimal].
    pub values: Vec<f64>,
    /// Solver-provided failure detail, if any
    pub message: Option<String>,
}
impl SolveResult {
    pub fn optimal(objective: f64, values: Vec<f64>) -> Self {
        Self {
            status: SolveStatus::Optimal,
            objective,
            values,
            message: None,
        }
    }
    /// Create a non-optimal result, with no solution values
    pub fn failed(status: SolveStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            objective: 0.0,
            values: Vec::new(),
            message: Some(message.into()),
        }
    }
    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

/// # Solver Options
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SolverOptions {
    /// Log solver progress at `info` level, rather than `debug`
    pub verbose: bool,
}

/// # Solver Trait
pub trait Solver {
    /// Solve `model`, minimizing its objective
    fn solve(&mut self, model: &MilpModel, opts: &SolverOptions) -> SolveResult;
}

#[cfg(feature = "microlp")]
pub use self::micro::MicroLpSolver;

#[cfg(feature = "microlp")]
mod micro {
    use super::*;
    use crate::model::{Row, INF};
    use microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem, Variable};

    /// Tolerance for checking constant-only rows
    const TOL: f64 = 1e-9;

    /// Log at `info` when verbose, else `debug`
    macro_rules! solver_log {
        ($opts: expr, $($arg: tt)+) => {
            match $opts.verbose {
                true => log::info!($($arg)+),
                false => log::debug!($($arg)+),
            }
        };
    }

    ///
    /// # MicroLP Solver
    ///
    /// Translates the row-wise model into a [microlp::Problem].
    /// Ranged rows become a pair of one-sided constraints, equal-bound rows a single equality.
    /// Rows with no nonzero coefficients are checked directly and never reach `microlp`.
    ///
    #[derive(Debug, Default)]
    pub struct MicroLpSolver;

    impl MicroLpSolver {
        pub fn new() -> Self {
            Self
        }
        /// Convert `model` into a [Problem].
        /// Fails if a constant-only row cannot be satisfied.
        fn problem(model: &MilpModel) -> Result<(Problem, Vec<Variable>), String> {
            let mut problem = Problem::new(OptimizationDirection::Minimize);
            let mut vars = Vec::with_capacity(model.num_cols());
            let mut integer = vec![false; model.num_cols()];
            for &c in model.integrality.iter() {
                integer[c] = true;
            }
            for c in 0..model.num_cols() {
                let (lo, hi, cost) = (model.col_lower[c], model.col_upper[c], model.col_cost[c]);
                let var = match integer[c] {
                    true if lo == 0.0 && hi == 1.0 => problem.add_binary_var(cost),
                    true => problem.add_integer_var(cost, (int_bound(lo), int_bound(hi))),
                    false => problem.add_var(cost, (lo, hi)),
                };
                vars.push(var);
            }
            for r in 0..model.num_rows() {
                let (lo, hi) = (model.row_lower[r], model.row_upper[r]);
                let (idx, val) = model.row_entries(Row(r));
                if idx.is_empty() {
                    if lo > TOL || hi < -TOL {
                        return Err(format!("constant row {} requires {} <= 0 <= {}", r, lo, hi));
                    }
                    continue;
                }
                let expr = || {
                    let mut expr = LinearExpr::empty();
                    for (c, v) in idx.iter().zip(val.iter()) {
                        expr.add(vars[*c], *v);
                    }
                    expr
                };
                if lo == hi {
                    problem.add_constraint(expr(), ComparisonOp::Eq, lo);
                    continue;
                }
                if lo > -INF {
                    problem.add_constraint(expr(), ComparisonOp::Ge, lo);
                }
                if hi < INF {
                    problem.add_constraint(expr(), ComparisonOp::Le, hi);
                }
            }
            Ok((problem, vars))
        }
    }
    /// Clamp an integer column bound into `microlp`'s `i32` range
    fn int_bound(b: f64) -> i32 {
        b.max(i32::MIN as f64).min(i32::MAX as f64).round() as i32
    }

    impl Solver for MicroLpSolver {
        fn solve(&mut self, model: &MilpModel, opts: &SolverOptions) -> SolveResult {
            solver_log!(
                opts,
                "microlp: solving {} columns ({} integer), {} rows, {} nonzeros",
                model.num_cols(),
                model.integrality.len(),
                model.num_rows(),
                model.num_nonzeros()
            );
            let (problem, vars) = match Self::problem(model) {
                Ok(p) => p,
                Err(msg) => {
                    solver_log!(opts, "microlp: infeasible before solving: {}", msg);
                    return SolveResult::failed(SolveStatus::Infeasible, msg);
                }
            };
            match problem.solve() {
                Ok(solution) => {
                    let values: Vec<f64> = vars.iter().map(|v| solution[*v]).collect();
                    solver_log!(opts, "microlp: optimal, objective {}", solution.objective());
                    SolveResult::optimal(solution.objective(), values)
                }
                Err(microlp::Error::Infeasible) => {
                    solver_log!(opts, "microlp: infeasible");
                    SolveResult::failed(SolveStatus::Infeasible, "infeasible")
                }
                Err(e) => {
                    log::warn!("microlp: solve failed: {}", e);
                    SolveResult::failed(SolveStatus::Error, e.to_string())
                }
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_small_milp() {
            // min x + y, s.t. x + y >= 1.5, x integer
            let mut m = MilpModel::new();
            let x = m.add_col(0.0, 3.0, 1.0);
            let y = m.add_col(0.0, 3.0, 1.0);
            m.set_integer(x);
            m.add_row(1.5, INF, &[(x, 1.0), (y, 1.0)]);
            let res = MicroLpSolver::new().solve(&m, &SolverOptions::default());
            assert!(res.is_optimal());
            assert!((res.objective - 1.5).abs() < 1e-6);
            assert_eq!(res.values.len(), 2);
            assert!(m.is_feasible(&res.values, 1e-6));
        }
        #[test]
        fn test_ranged_and_equality_rows() {
            let mut m = MilpModel::new();
            let x = m.add_col(-INF, INF, -1.0);
            let y = m.add_col(0.0, INF, 0.0);
            m.add_row(1.0, 4.0, &[(x, 1.0)]);
            m.add_row(2.0, 2.0, &[(y, 1.0), (x, -1.0)]);
            let res = MicroLpSolver::new().solve(&m, &SolverOptions::default());
            assert!(res.is_optimal());
            assert!((res.values[0] - 4.0).abs() < 1e-6);
            assert!((res.values[1] - 6.0).abs() < 1e-6);
        }
        #[test]
        fn test_infeasible() {
            let mut m = MilpModel::new();
            let b = m.add_binary();
            m.add_row(2.0, INF, &[(b, 1.0)]);
            let res = MicroLpSolver::new().solve(&m, &SolverOptions::default());
            assert_eq!(res.status, SolveStatus::Infeasible);
            assert!(res.values.is_empty());

            // Constant-only row which cannot hold
            let mut m = MilpModel::new();
            m.add_col(0.0, 1.0, 0.0);
            m.add_row(1.0, INF, &[]);
            let res = MicroLpSolver::new().solve(&m, &SolverOptions { verbose: true });
            assert_eq!(res.status, SolveStatus::Infeasible);
            assert!(res.message.is_some());
        }
    }
}
