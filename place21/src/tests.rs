//!
//! # place21 scenario tests
//!

use super::*;
use crate::verify::{self, PlacementValidator};

/// Check that `a` and `b` are equal, to within solver tolerance
fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_grid3x3_formulation() -> PlaceResult<()> {
    let c = samples::grid(3, 3)?;
    let placer = IlpPlacer::new(IlpConfig::with_layout(3, 3));
    let form = placer.formulate(&c)?;

    let npairs = 36;
    let nnets = 14;
    assert_eq!(form.vars.pairs.len(), npairs);
    assert_eq!(form.num_cols(), 9 * 2 + npairs * 4 + nnets * 4);
    assert_eq!(form.model.integrality.len(), npairs * 4);
    assert_eq!(form.rows.separation, npairs * 5);

    // The initial grid placement is legal, and encodes to a feasible point at the optimal HPWL
    PlacementValidator::validate_with(&form.config, &c)?;
    let values = form.vars.assignment(&form.model, &c);
    assert_eq!(form.model.violation(&values, 1e-9), None);
    assert!(close(form.model.objective_value(&values), 5.0));
    assert!(close(verify::hpwl(&c, true), 5.0));
    Ok(())
}
#[test]
fn test_grid3x3_overlap_infeasible() -> PlaceResult<()> {
    // Stack three blocks in one cell. No setting of their separation binaries is feasible.
    let mut c = samples::grid(3, 3)?;
    for idx in [1, 2] {
        c.block_mut(BlockId(idx)).position = GridPoint::new(0, 0);
    }
    let form = IlpPlacer::new(IlpConfig::with_layout(3, 3)).formulate(&c)?;
    let mut values = form.vars.assignment(&form.model, &c);
    for pair in form.vars.pairs.iter().filter(|p| p.j.0 <= 2) {
        for bits in 0..16u32 {
            for (k, col) in pair.cols().iter().enumerate() {
                values[col.0] = ((bits >> k) & 1) as f64;
            }
            assert!(!form.model.is_feasible(&values, 1e-9));
        }
    }
    Ok(())
}
#[test]
fn test_determinism() -> PlaceResult<()> {
    let c = samples::grid(3, 3)?;
    let placer = IlpPlacer::new(IlpConfig::with_layout(3, 3));
    let f1 = placer.formulate(&c)?;
    let f2 = placer.formulate(&c)?;
    assert_eq!(f1.model, f2.model);
    assert_eq!(f1.vars, f2.vars);
    assert_eq!(f1.rows, f2.rows);
    Ok(())
}
#[test]
fn test_oversized_block_formulates() -> PlaceResult<()> {
    // Formulation succeeds; the model simply admits no solution
    let mut c = CircuitData::new();
    c.add_primitive(Primitive::new("BIG", (5, 1), vec![]));
    c.add_block("big", "BIG", (0, 0))?;
    let form = IlpPlacer::new(IlpConfig::with_layout(4, 4)).formulate(&c)?;
    assert_eq!(form.model.row_upper[0], -1.0);
    let values = form.vars.assignment(&form.model, &c);
    assert!(!form.model.is_feasible(&values, 1e-9));
    Ok(())
}
#[test]
fn test_json_config() -> PlaceResult<()> {
    let cfg: IlpConfig = utils::SerializationFormat::Json.from_str(
        r#"{ "layout_w": 4, "layout_h": 1, "big_m": 16.0, "verbose_solver": false }"#,
    )?;
    let c = samples::two_blocks()?;
    let form = IlpPlacer::new(cfg).formulate(&c)?;
    assert_eq!(form.config.big_m, 16.0);
    assert!(!form.config.verbose_solver);
    assert!(form.config.four_way);
    Ok(())
}

#[cfg(feature = "microlp")]
mod solved {
    use super::*;

    #[test]
    fn test_two_blocks() -> PlaceResult<()> {
        let mut c = samples::two_blocks()?;
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(4, 1));
        let outcome = placer.place(&mut c, &mut MicroLpSolver::new())?;
        assert!(outcome.solved());
        assert!(close(outcome.objective, 1.0));
        assert_eq!(placer.last_result(), Some(&outcome));

        PlacementValidator::new(4, 1).validate(&c)?;
        assert!(close(verify::hpwl(&c, true), outcome.objective));
        let (a, b) = (c.block(BlockId(0)).position, c.block(BlockId(1)).position);
        assert_eq!((a.x - b.x).abs(), 1);
        assert_eq!((a.y, b.y), (0, 0));
        report::log_solution(&c);
        Ok(())
    }
    #[test]
    fn test_two_blocks_x_only() -> PlaceResult<()> {
        let mut c = samples::two_blocks()?;
        let cfg = IlpConfig {
            use_2d: false,
            ..IlpConfig::with_layout(4, 1)
        };
        let outcome = IlpPlacer::new(cfg).place(&mut c, &mut MicroLpSolver::new())?;
        assert!(close(outcome.objective, 1.0));
        assert!(close(verify::hpwl(&c, false), 1.0));
        PlacementValidator::new(4, 1).validate(&c)?;
        Ok(())
    }
    #[test]
    fn test_grid2x2() -> PlaceResult<()> {
        let mut c = samples::grid(2, 2)?;
        // Scramble the initial placement; it has no bearing on the result
        c.block_mut(BlockId(0)).position = GridPoint::new(1, 1);
        c.block_mut(BlockId(3)).position = GridPoint::new(0, 0);
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(2, 2));
        let outcome = placer.place(&mut c, &mut MicroLpSolver::new())?;
        assert!(close(outcome.objective, 3.0));
        PlacementValidator::new(2, 2).validate(&c)?;
        assert!(close(verify::hpwl(&c, true), outcome.objective));

        // Solving again from the result reaches the same objective
        let again = placer.place(&mut c, &mut MicroLpSolver::new())?;
        assert!(close(again.objective, outcome.objective));
        assert_eq!((again.num_cols, again.num_rows), (outcome.num_cols, outcome.num_rows));
        Ok(())
    }
    #[test]
    fn test_infeasible_preserves_positions() -> PlaceResult<()> {
        let mut c = CircuitData::new();
        c.add_primitive(Primitive::new("BIG", (5, 1), vec![]));
        c.add_block("big", "BIG", (3, 2))?;
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(4, 4));
        let r = placer.place(&mut c, &mut MicroLpSolver::new());
        assert!(matches!(r, Err(PlaceError::Solver(SolveStatus::Infeasible))));
        assert_eq!(c.block(BlockId(0)).position, GridPoint::new(3, 2));
        assert_eq!(placer.last_result().map(|r| r.status), Some(SolveStatus::Infeasible));
        Ok(())
    }
    #[test]
    fn test_sliding_block_keeps_row() -> PlaceResult<()> {
        let mut c = CircuitData::new();
        c.add_primitive(Primitive::new(
            "UNIT",
            (1, 1),
            vec![PinTemplate::new("C", (0.5, 0.5))],
        ));
        let a = c.add_block("A", "UNIT", (0, 0))?;
        let s = c.add_block("S", "UNIT", (2, 1))?;
        c.block_mut(s).fix = FixMode::SlideEdge;
        let pins = vec![c.block_pin(a, "C")?, c.block_pin(s, "C")?];
        c.add_net("N", pins)?;

        let mut placer = IlpPlacer::new(IlpConfig::with_layout(3, 2));
        let outcome = placer.place(&mut c, &mut MicroLpSolver::new())?;
        assert!(close(outcome.objective, 1.0));
        assert_eq!(c.block(s).position.y, 1);
        PlacementValidator::new(3, 2).validate(&c)?;
        assert!(close(verify::hpwl(&c, true), 1.0));
        Ok(())
    }
    /// Slow: roughly two minutes in release mode
    #[test]
    #[ignore]
    fn test_grid3x3_solved() -> PlaceResult<()> {
        let mut c = samples::grid(3, 3)?;
        let mut placer = IlpPlacer::new(IlpConfig::with_layout(3, 3));
        let outcome = placer.place(&mut c, &mut MicroLpSolver::new())?;
        assert!(close(outcome.objective, 5.0));
        assert!(close(verify::hpwl(&c, true), 5.0));
        PlacementValidator::new(3, 3).validate(&c)?;
        Ok(())
    }
    #[test]
    fn test_sliding_terminal() -> PlaceResult<()> {
        let mut c = CircuitData::new();
        c.add_primitive(Primitive::new(
            "UNIT",
            (1, 1),
            vec![PinTemplate::new("C", (0.5, 0.5))],
        ));
        let pad_pins = vec![PinTemplate::new("P", (0.0, 0.0))];
        c.add_terminal_template(
            TerminalTemplate::new("PAD", (1, 1), pad_pins, Edge::Top).with_fix(FixMode::SlideEdge),
        );
        let a = c.add_block("A", "UNIT", (2, 0))?;
        c.block_mut(a).fix = FixMode::FixedXY;
        let slide = Some(SlideRange::new(0.0, 4.0));
        let t = c.add_terminal("T", "PAD", (0.0, 1.0), None, slide)?;
        let pins = vec![c.block_pin(a, "C")?, c.terminal_pin(t, "P")?];
        c.add_net("N", pins)?;

        let mut placer = IlpPlacer::new(IlpConfig::with_layout(4, 1));
        let outcome = placer.place(&mut c, &mut MicroLpSolver::new())?;
        // Only the vertical half-unit remains
        assert!(close(outcome.objective, 0.5));
        assert_eq!(c.block(a).position, GridPoint::new(2, 0));
        let pos = c.terminal(t).position;
        assert!(close(pos.x, 2.5));
        assert_eq!(pos.y, 1.0);
        Ok(())
    }
}
