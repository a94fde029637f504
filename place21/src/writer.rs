//!
//! # Solution Writer
//!
//! Maps solver column values back onto block and terminal positions.
//!

// Local Imports
use crate::circuit::{BlockId, CircuitData, GridPoint, Int, TerminalId};
use crate::error::{PlaceError, PlaceResult};
use crate::solver::SolveResult;
use crate::vars::VarMap;

/// # Solution Writer
pub struct SolutionWriter;
impl SolutionWriter {
    ///
    /// Write the positions in `result` into `circuit`.
    ///
    /// Block coordinates are rounded to the nearest grid point.
    /// Movable terminals take their column values unrounded.
    /// Separation and span columns are discarded.
    ///
    /// Nothing is written unless `result` is optimal and carries one finite value per column;
    /// otherwise all positions are left as they were, and an error is returned.
    ///
    pub fn write(
        circuit: &mut CircuitData,
        vars: &VarMap,
        result: &SolveResult,
    ) -> PlaceResult<()> {
        if !result.is_optimal() {
            log::warn!("Not writing placement: solver status {}", result.status);
            return Err(PlaceError::Solver(result.status));
        }
        let values = &result.values;
        if values.len() != vars.col_range().end {
            return Err(PlaceError::Validation(format!(
                "solution has {} values, model has {} columns",
                values.len(),
                vars.col_range().end
            )));
        }
        if let Some(bad) = values.iter().position(|v| !v.is_finite()) {
            return Err(PlaceError::Validation(format!(
                "solution value for column {} is not finite",
                bad
            )));
        }

        // Compute everything before mutating anything
        let blocks: Vec<GridPoint> = vars
            .blocks
            .iter()
            .enumerate()
            .map(|(idx, cols)| {
                let current = circuit.block(BlockId(idx)).position;
                GridPoint::new(
                    values[cols.x.0].round() as Int,
                    cols.y.map_or(current.y, |y| values[y.0].round() as Int),
                )
            })
            .collect();
        for (idx, pos) in blocks.into_iter().enumerate() {
            circuit.block_mut(BlockId(idx)).position = pos;
        }
        for (idx, cols) in vars.terminals.iter().enumerate() {
            let term = circuit.terminal_mut(TerminalId(idx));
            if let Some(x) = cols.x {
                term.position.x = values[x.0];
            }
            if let Some(y) = cols.y {
                term.position.y = values[y.0];
            }
        }
        log::debug!(
            "Wrote {} block and {} terminal positions",
            vars.blocks.len(),
            vars.terminals.iter().filter(|t| t.x.is_some() || t.y.is_some()).count()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IlpConfig;
    use crate::model::MilpModel;
    use crate::samples;
    use crate::solver::SolveStatus;

    fn setup() -> PlaceResult<(CircuitData, MilpModel, VarMap)> {
        let c = samples::grid(1, 2)?;
        let cfg = IlpConfig::with_layout(4, 1).resolve(&c)?;
        let mut m = MilpModel::new();
        let vars = VarMap::allocate(&mut m, &c, &cfg);
        Ok((c, m, vars))
    }

    #[test]
    fn test_write_rounds() -> PlaceResult<()> {
        let (mut c, m, vars) = setup()?;
        let mut values = vec![0.0; m.num_cols()];
        values[vars.blocks[0].x.0] = 2.4999;
        values[vars.blocks[1].x.0] = 0.5001;
        SolutionWriter::write(&mut c, &vars, &SolveResult::optimal(0.0, values))?;
        assert_eq!(c.block(BlockId(0)).position, GridPoint::new(2, 0));
        assert_eq!(c.block(BlockId(1)).position, GridPoint::new(1, 0));
        Ok(())
    }
    #[test]
    fn test_non_optimal_preserves() -> PlaceResult<()> {
        let (mut c, m, vars) = setup()?;
        let before: Vec<GridPoint> = c.blocks().iter().map(|b| b.position).collect();
        let res = SolveResult::failed(SolveStatus::Infeasible, "nope");
        let err = SolutionWriter::write(&mut c, &vars, &res);
        assert!(matches!(err, Err(PlaceError::Solver(SolveStatus::Infeasible))));

        // Optimal, but short
        let res = SolveResult::optimal(0.0, vec![3.0; m.num_cols() - 1]);
        assert!(SolutionWriter::write(&mut c, &vars, &res).is_err());
        // Optimal, but not finite
        let mut values = vec![3.0; m.num_cols()];
        values[m.num_cols() - 1] = f64::NAN;
        let res = SolveResult::optimal(0.0, values);
        assert!(SolutionWriter::write(&mut c, &vars, &res).is_err());

        let after: Vec<GridPoint> = c.blocks().iter().map(|b| b.position).collect();
        assert_eq!(before, after);
        Ok(())
    }
}
