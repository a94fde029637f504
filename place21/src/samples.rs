//!
//! # Sample Circuits
//!
//! Small, fully-specified placement problems, with known optimal wirelength.
//!

// Local Imports
use crate::circuit::{CircuitData, Edge, Int, PinTemplate, Primitive, TerminalTemplate};
use crate::error::PlaceResult;

/// Name of the unit-square grid primitive
pub const UNIT_CELL: &str = "PRIM_X1";

/// The unit-square [Primitive] used by [grid], with a pin on each side
fn unit_cell() -> Primitive {
    Primitive::new(
        UNIT_CELL,
        (1, 1),
        vec![
            PinTemplate::new("P_LEFT", (0.0, 0.0)),
            PinTemplate::new("P_RIGHT", (1.0, 0.0)),
            PinTemplate::new("P_TOP", (0.0, 1.0)),
            PinTemplate::new("P_BOTTOM", (0.0, 0.0)),
        ],
    )
}

///
/// # Grid Sample
///
/// A `rows` by `cols` grid of unit cells named `U1`, `U2`, ..., in row-major order from the origin,
/// each initially placed at its grid location.
///
/// Nets:
/// * One per horizontally adjacent pair, from the left cell's `P_RIGHT` to the right cell's `P_LEFT`.
/// * One per vertically adjacent pair, from the lower cell's `P_TOP` to the upper cell's `P_BOTTOM`.
/// * `N_VDD`, joining the top row's `P_TOP` pins to a fixed pad centered just above the grid.
/// * `N_GND`, joining the bottom row's `P_BOTTOM` pins to a fixed pad centered just below the grid.
///
/// Placed in its own `cols` by `rows` footprint, the initial placement is optimal,
/// with every adjacency net at zero length.
///
pub fn grid(rows: usize, cols: usize) -> PlaceResult<CircuitData> {
    let mut c = CircuitData::new();
    c.add_primitive(unit_cell());
    c.add_terminal_template(TerminalTemplate::new(
        "VDD_TOP",
        (1, 1),
        vec![PinTemplate::new("PAD", (0.0, 0.0))],
        Edge::Top,
    ));
    c.add_terminal_template(TerminalTemplate::new(
        "GND_BOTTOM",
        (1, 1),
        vec![PinTemplate::new("PAD", (0.0, 0.0))],
        Edge::Bottom,
    ));

    let mut ids = Vec::with_capacity(rows * cols);
    for r in 0..rows {
        for col in 0..cols {
            let name = format!("U{}", r * cols + col + 1);
            ids.push(c.add_block(name, UNIT_CELL, (col as Int, r as Int))?);
        }
    }
    let at = |r: usize, col: usize| ids[r * cols + col];

    let mid = (cols / 2) as f64;
    let vdd = c.add_terminal("T_VDD", "VDD_TOP", (mid, rows as f64), None, None)?;
    let gnd = c.add_terminal("T_GND", "GND_BOTTOM", (mid, -1.0), None, None)?;

    for r in 0..rows {
        for col in 0..cols.saturating_sub(1) {
            let pins = vec![
                c.block_pin(at(r, col), "P_RIGHT")?,
                c.block_pin(at(r, col + 1), "P_LEFT")?,
            ];
            c.add_net(format!("N_H_{}_{}", r, col), pins)?;
        }
    }
    for r in 0..rows.saturating_sub(1) {
        for col in 0..cols {
            let pins = vec![
                c.block_pin(at(r, col), "P_TOP")?,
                c.block_pin(at(r + 1, col), "P_BOTTOM")?,
            ];
            c.add_net(format!("N_V_{}_{}", r, col), pins)?;
        }
    }
    if rows > 0 {
        let mut pins = vec![c.terminal_pin(vdd, "PAD")?];
        for col in 0..cols {
            pins.push(c.block_pin(at(rows - 1, col), "P_TOP")?);
        }
        c.add_net("N_VDD", pins)?;

        let mut pins = vec![c.terminal_pin(gnd, "PAD")?];
        for col in 0..cols {
            pins.push(c.block_pin(at(0, col), "P_BOTTOM")?);
        }
        c.add_net("N_GND", pins)?;
    }
    Ok(c)
}

///
/// # Two-Block Sample
///
/// Two unit-width blocks, both at the origin, joined by a single net between their centers.
/// Legal placements must separate them; at the closest legal placement the net has length one.
///
pub fn two_blocks() -> PlaceResult<CircuitData> {
    let mut c = CircuitData::new();
    c.add_primitive(Primitive::new(
        "UNIT",
        (1, 1),
        vec![PinTemplate::new("C", (0.5, 0.5))],
    ));
    let a = c.add_block("A", "UNIT", (0, 0))?;
    let b = c.add_block("B", "UNIT", (0, 0))?;
    let pins = vec![c.block_pin(a, "C")?, c.block_pin(b, "C")?];
    c.add_net("N_AB", pins)?;
    Ok(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{BlockId, GridPoint, Point};

    #[test]
    fn test_grid_sample() -> PlaceResult<()> {
        let c = grid(3, 3)?;
        assert_eq!(c.num_blocks(), 9);
        assert_eq!(c.terminals().len(), 2);
        assert_eq!(c.nets().len(), 14);
        assert_eq!(c.block(BlockId(5)).name, "U6");
        assert_eq!(c.block(BlockId(5)).position, GridPoint::new(2, 1));
        let vdd = c.terminal_named("T_VDD").unwrap();
        assert_eq!(c.terminal(vdd).position, Point::new(1.0, 3.0));
        assert!(!c.terminal(vdd).is_movable());
        let vdd_net = c.nets().iter().find(|n| n.name == "N_VDD").unwrap();
        assert_eq!(vdd_net.pins().len(), 4);
        Ok(())
    }
    #[test]
    fn test_two_blocks_sample() -> PlaceResult<()> {
        let c = two_blocks()?;
        assert_eq!(c.num_blocks(), 2);
        assert_eq!(c.nets().len(), 1);
        assert!(c.terminals().is_empty());
        Ok(())
    }
}
