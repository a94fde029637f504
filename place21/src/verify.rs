//! # Placement Validators
//! Legality checks and wirelength measurement for placed circuits,
//! computed from final positions alone, independent of any solver model.
//!

// Local Imports
use crate::circuit::{BlockId, CircuitData, Dir, Int, Net};
use crate::config::ResolvedConfig;
use crate::error::{PlaceError, PlaceResult};

/// Helper-function for asserting a boolean condition, returning [PlaceError::Validation] with message `msg` if false.
pub fn assert(b: bool, msg: impl FnOnce() -> String) -> PlaceResult<()> {
    match b {
        true => Ok(()),
        false => Err(PlaceError::Validation(msg())),
    }
}

/// Relations between two placed blocks `i` and `j`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Separation {
    /// `i` is left of `j`
    pub left: bool,
    /// `i` is right of `j`
    pub right: bool,
    /// `i` is below `j`
    pub below: bool,
    /// `i` is above `j`
    pub above: bool,
}
impl Separation {
    /// Boolean indication of whether any relation holds, i.e. the two blocks do not overlap
    pub fn any(&self) -> bool {
        self.left || self.right || self.below || self.above
    }
}

/// Reconstruct the separation relations of blocks `i` and `j` from their positions
pub fn separation(circuit: &CircuitData, i: BlockId, j: BlockId) -> Separation {
    let (pi, pj) = (circuit.block(i).position, circuit.block(j).position);
    let (si, sj) = (circuit.block_size(i), circuit.block_size(j));
    Separation {
        left: pi.x + si.width <= pj.x,
        right: pj.x + sj.width <= pi.x,
        below: pi.y + si.height <= pj.y,
        above: pj.y + sj.height <= pi.y,
    }
}

/// Half-perimeter wirelength of `net`. Nets with fewer than two pins have zero wirelength.
pub fn net_hpwl(circuit: &CircuitData, net: &Net, use_2d: bool) -> f64 {
    if net.pins().len() < 2 {
        return 0.0;
    }
    let span = |dir: Dir| {
        let coords = net.pins().iter().map(|p| circuit.pin_position(p).coord(dir));
        let (lo, hi) = coords.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            (lo.min(c), hi.max(c))
        });
        hi - lo
    };
    match use_2d {
        true => span(Dir::Horiz) + span(Dir::Vert),
        false => span(Dir::Horiz),
    }
}

/// Total half-perimeter wirelength over all nets
pub fn hpwl(circuit: &CircuitData, use_2d: bool) -> f64 {
    circuit.nets().iter().map(|n| net_hpwl(circuit, n, use_2d)).sum()
}

///
/// # Placement Validator
///
/// Checks that a placement is legal: every block lies within the layout,
/// and no two blocks overlap.
///
#[derive(Debug, Clone, Copy)]
pub struct PlacementValidator {
    pub layout_w: Int,
    pub layout_h: Int,
}
impl PlacementValidator {
    pub fn new(layout_w: Int, layout_h: Int) -> Self {
        Self { layout_w, layout_h }
    }
    /// Validate with the layout dimensions of `cfg`
    pub fn validate_with(cfg: &ResolvedConfig, circuit: &CircuitData) -> PlaceResult<()> {
        Self::new(cfg.layout_w, cfg.layout_h).validate(circuit)
    }
    /// Run all checks, failing on the first illegality found
    pub fn validate(&self, circuit: &CircuitData) -> PlaceResult<()> {
        let oob = self.out_of_bounds(circuit);
        assert(oob.is_empty(), || {
            let blk = circuit.block(oob[0]);
            format!(
                "block {} at ({}, {}) outside {}x{} layout",
                blk.name, blk.position.x, blk.position.y, self.layout_w, self.layout_h
            )
        })?;
        let overlaps = self.overlaps(circuit);
        assert(overlaps.is_empty(), || {
            let (i, j) = overlaps[0];
            format!(
                "blocks {} and {} overlap",
                circuit.block(i).name,
                circuit.block(j).name
            )
        })?;
        Ok(())
    }
    /// Blocks not entirely inside the layout rectangle
    pub fn out_of_bounds(&self, circuit: &CircuitData) -> Vec<BlockId> {
        circuit
            .blocks()
            .iter()
            .filter(|blk| {
                let size = circuit.block_size(blk.index());
                let p = blk.position;
                p.x < 0
                    || p.y < 0
                    || p.x + size.width > self.layout_w
                    || p.y + size.height > self.layout_h
            })
            .map(|blk| blk.index())
            .collect()
    }
    /// All overlapping block pairs `(i, j)`, `i < j`
    pub fn overlaps(&self, circuit: &CircuitData) -> Vec<(BlockId, BlockId)> {
        let n = circuit.num_blocks();
        let mut rv = Vec::new();
        for i in 0..n {
            for j in (i + 1)..n {
                if !separation(circuit, BlockId(i), BlockId(j)).any() {
                    rv.push((BlockId(i), BlockId(j)));
                }
            }
        }
        rv
    }
}
