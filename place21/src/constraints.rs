//!
//! # Constraint Generator
//!
//! Emits the boundary, non-overlap, and HPWL-linearization rows of the placement model,
//! against columns previously allocated in a [VarMap].
//!
//! Nothing here fails. Geometry which cannot be legalized, e.g. a block wider than the layout,
//! produces an infeasible model, which the solver reports.
//!

// Local Imports
use crate::circuit::{BlockId, CircuitData, Dir, Int};
use crate::config::ResolvedConfig;
use crate::model::{Col, MilpModel, INF};
use crate::vars::{Affine, SepPair, VarMap};

/// Number of rows emitted, per constraint family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub boundary: usize,
    pub separation: usize,
    pub hpwl: usize,
}
impl RowCounts {
    pub fn total(&self) -> usize {
        self.boundary + self.separation + self.hpwl
    }
}

/// # Constraint Generator
pub struct ConstraintGen<'a> {
    model: &'a mut MilpModel,
    vars: &'a VarMap,
    circuit: &'a CircuitData,
    cfg: &'a ResolvedConfig,
    counts: RowCounts,
}
impl<'a> ConstraintGen<'a> {
    /// Emit all constraint rows into `model`. Returns the number of rows per family.
    pub fn emit(
        model: &'a mut MilpModel,
        vars: &'a VarMap,
        circuit: &'a CircuitData,
        cfg: &'a ResolvedConfig,
    ) -> RowCounts {
        let mut this = Self {
            model,
            vars,
            circuit,
            cfg,
            counts: RowCounts::default(),
        };
        this.boundary();
        this.separation();
        this.hpwl();
        log::debug!(
            "Emitted {} rows: {} boundary, {} separation, {} hpwl",
            this.counts.total(),
            this.counts.boundary,
            this.counts.separation,
            this.counts.hpwl
        );
        this.counts
    }
    /// Keep each block's footprint inside the layout: `0 ≤ x ≤ W - width`, and likewise in y
    fn boundary(&mut self) {
        let (w, h) = (self.cfg.layout_w, self.cfg.layout_h);
        for (idx, cols) in self.vars.blocks.iter().enumerate() {
            let size = self.circuit.block_size(BlockId(idx));
            self.model.add_row(0.0, (w - size.width) as f64, &[(cols.x, 1.0)]);
            self.counts.boundary += 1;
            if let Some(y) = cols.y {
                self.model.add_row(0.0, (h - size.height) as f64, &[(y, 1.0)]);
                self.counts.boundary += 1;
            }
        }
    }
    /// Big-M disjunctive non-overlap rows, for every block pair
    fn separation(&mut self) {
        for pair in self.vars.pairs.iter() {
            self.separate(pair);
        }
    }
    fn separate(&mut self, pair: &SepPair) {
        let m = self.cfg.big_m;
        let (ci, cj) = (self.vars.block(pair.i), self.vars.block(pair.j));
        let (si, sj) = (self.circuit.block_size(pair.i), self.circuit.block_size(pair.j));

        // At least one separating relation holds
        let terms: Vec<(Col, f64)> = pair.cols().into_iter().map(|c| (c, 1.0)).collect();
        let rhs = match pair.below.is_none() && self.fixed_rows_disjoint(pair.i, pair.j) {
            true => 0.0,
            false => 1.0,
        };
        self.model.add_row(rhs, INF, &terms);

        // Left: x_i - x_j + M*L <= M - w_i
        self.model.add_row(
            -INF,
            m - si.width as f64,
            &[(ci.x, 1.0), (cj.x, -1.0), (pair.left, m)],
        );
        // Right: x_j - x_i + M*R <= M - w_j
        self.model.add_row(
            -INF,
            m - sj.width as f64,
            &[(cj.x, 1.0), (ci.x, -1.0), (pair.right, m)],
        );
        self.counts.separation += 3;

        let four = (pair.below, pair.above, ci.y, cj.y);
        if let (Some(below), Some(above), Some(yi), Some(yj)) = four {
            // Below: y_i - y_j + M*B <= M - h_i
            self.model.add_row(
                -INF,
                m - si.height as f64,
                &[(yi, 1.0), (yj, -1.0), (below, m)],
            );
            // Above: y_j - y_i + M*T <= M - h_j
            self.model.add_row(
                -INF,
                m - sj.height as f64,
                &[(yj, 1.0), (yi, -1.0), (above, m)],
            );
            self.counts.separation += 2;
        }
    }
    /// The y-coordinate of block `id`, if the model cannot move it vertically
    fn fixed_y(&self, id: BlockId) -> Option<Int> {
        match self.vars.block(id).y {
            None => Some(self.circuit.block(id).position.y),
            Some(y) if self.model.col_lower[y.0] == self.model.col_upper[y.0] => {
                Some(self.model.col_lower[y.0] as Int)
            }
            Some(_) => None,
        }
    }
    /// Boolean indication of whether blocks `i` and `j` are both fixed in y, in disjoint rows
    fn fixed_rows_disjoint(&self, i: BlockId, j: BlockId) -> bool {
        match (self.fixed_y(i), self.fixed_y(j)) {
            (Some(yi), Some(yj)) => {
                let (hi, hj) = (
                    self.circuit.block_size(i).height,
                    self.circuit.block_size(j).height,
                );
                yi + hi <= yj || yj + hj <= yi
            }
            _ => false,
        }
    }
    /// Net bounding-box rows: `min ≤ max`, and every pin coordinate within `[min, max]`
    fn hpwl(&mut self) {
        for (net, span) in self.circuit.nets().iter().zip(self.vars.nets.iter()) {
            for dir in [Dir::Horiz, Dir::Vert] {
                let (cmin, cmax) = match span.get(dir) {
                    Some(cols) => cols,
                    None => continue,
                };
                self.model.add_row(-INF, 0.0, &[(cmin, 1.0), (cmax, -1.0)]);
                self.counts.hpwl += 1;
                for pin in net.pins() {
                    let coord = self.vars.pin_coord(self.circuit, pin, dir);
                    self.pin_within(coord, cmin, cmax);
                }
            }
        }
    }
    /// Constrain `cmin ≤ coord ≤ cmax`, as `cmin - var ≤ c` and `var - cmax ≤ -c`
    fn pin_within(&mut self, coord: Affine, cmin: Col, cmax: Col) {
        let c = coord.constant;
        match coord.var {
            Some(var) => {
                self.model.add_row(-INF, c, &[(cmin, 1.0), (var, -1.0)]);
                self.model.add_row(-INF, -c, &[(var, 1.0), (cmax, -1.0)]);
            }
            None => {
                self.model.add_row(-INF, c, &[(cmin, 1.0)]);
                self.model.add_row(-INF, -c, &[(cmax, -1.0)]);
            }
        }
        self.counts.hpwl += 2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{FixMode, Primitive};
    use crate::config::IlpConfig;
    use crate::model::Row;
    use crate::samples;
    use crate::PlaceResult;

    fn formulate(c: &CircuitData, cfg: &IlpConfig) -> PlaceResult<(MilpModel, VarMap, RowCounts)> {
        let cfg = cfg.resolve(c)?;
        let mut m = MilpModel::new();
        let vars = VarMap::allocate(&mut m, c, &cfg);
        let counts = ConstraintGen::emit(&mut m, &vars, c, &cfg);
        Ok((m, vars, counts))
    }

    #[test]
    fn test_row_counts() -> PlaceResult<()> {
        let c = samples::grid(3, 3)?;
        let (m, _vars, counts) = formulate(&c, &IlpConfig::with_layout(3, 3))?;
        assert_eq!(counts.boundary, 18);
        assert_eq!(counts.separation, 36 * 5);
        // Twelve 2-pin adjacency nets, plus VDD and GND with four pins each
        let pins = 12 * 2 + 2 * 4;
        assert_eq!(counts.hpwl, 14 * 2 + 2 * 2 * pins);
        assert_eq!(m.num_rows(), counts.total());
        Ok(())
    }
    #[test]
    fn test_separation_rows() -> PlaceResult<()> {
        let c = samples::grid(1, 2)?;
        let (m, vars, _) = formulate(&c, &IlpConfig::with_layout(2, 1))?;
        let p = vars.pairs[0];
        let (x0, x1) = (vars.blocks[0].x, vars.blocks[1].x);
        // Boundary rows come first, two per block
        let disj = Row(4);
        assert_eq!((m.row_lower[disj.0], m.row_upper[disj.0]), (1.0, INF));
        assert_eq!(m.row_entries(disj).0.len(), 4);

        // M = max(2, 1) = 2; unit-width blocks
        let left = Row(5);
        assert_eq!(m.row_upper[left.0], 1.0);
        let (idx, val) = m.row_entries(left);
        assert_eq!(idx, &[x0.0, x1.0, p.left.0][..]);
        assert_eq!(val, &[1.0, -1.0, 2.0][..]);
        let right = Row(6);
        let (idx, val) = m.row_entries(right);
        assert_eq!(idx, &[x1.0, x0.0, p.right.0][..]);
        assert_eq!(val, &[1.0, -1.0, 2.0][..]);
        Ok(())
    }
    #[test]
    fn test_boundary_rows() -> PlaceResult<()> {
        let mut c = CircuitData::new();
        c.add_primitive(Primitive::new("WIDE", (3, 2), vec![]));
        c.add_block("w", "WIDE", (0, 0))?;
        let (m, _, counts) = formulate(&c, &IlpConfig::with_layout(5, 4))?;
        assert_eq!(counts.boundary, 2);
        assert_eq!((m.row_lower[0], m.row_upper[0]), (0.0, 2.0));
        assert_eq!((m.row_lower[1], m.row_upper[1]), (0.0, 2.0));
        Ok(())
    }
    #[test]
    fn test_fixed_terminal_pins_are_constant() -> PlaceResult<()> {
        let c = samples::grid(3, 3)?;
        let (m, vars, _) = formulate(&c, &IlpConfig::with_layout(3, 3))?;
        assert!(vars.terminals.iter().all(|t| t.x.is_none() && t.y.is_none()));

        let gnd = c.nets().iter().position(|n| n.name == "N_GND").unwrap();
        let (ymin, ymax) = vars.nets[gnd].get(Dir::Vert).unwrap();
        // Single-column rows over a span column carry the terminal's constant coordinate
        let singles: Vec<(usize, f64, f64)> = (0..m.num_rows())
            .map(Row)
            .filter_map(|r| {
                let (idx, val) = m.row_entries(r);
                match idx.len() {
                    1 => Some((idx[0], val[0], m.row_upper[r.0])),
                    _ => None,
                }
            })
            .collect();
        assert!(singles.contains(&(ymin.0, 1.0, -1.0)));
        assert!(singles.contains(&(ymax.0, -1.0, 1.0)));
        Ok(())
    }
    #[test]
    fn test_x_only_disjoint_rows() -> PlaceResult<()> {
        let c = samples::grid(2, 2)?;
        let cfg = IlpConfig {
            use_2d: false,
            ..IlpConfig::with_layout(2, 2)
        };
        let (m, vars, counts) = formulate(&c, &cfg)?;
        assert_eq!(counts.boundary, 4);
        assert_eq!(counts.separation, 6 * 3);
        // Pair (0, 1) shares row zero; pair (0, 2) does not
        let rhs = |pair: &SepPair| {
            (0..m.num_rows())
                .find(|&r| m.row_entries(Row(r)).0 == [pair.left.0, pair.right.0])
                .map(|r| m.row_lower[r])
        };
        assert_eq!(rhs(&vars.pairs[0]), Some(1.0));
        assert_eq!(rhs(&vars.pairs[1]), Some(0.0));
        Ok(())
    }
    #[test]
    fn test_two_way_2d() -> PlaceResult<()> {
        let mut c = samples::grid(2, 2)?;
        let cfg = IlpConfig {
            four_way_no_overlap: false,
            ..IlpConfig::with_layout(2, 2)
        };
        let rhs = |m: &MilpModel, pair: &SepPair| {
            (0..m.num_rows())
                .find(|&r| m.row_entries(Row(r)).0 == [pair.left.0, pair.right.0])
                .map(|r| m.row_lower[r])
        };

        // Free blocks may change rows, so every pair must separate
        let (m, vars, counts) = formulate(&c, &cfg)?;
        assert!(vars.pairs.iter().all(|p| p.cols().len() == 2));
        assert_eq!(vars.binaries().count(), 6 * 2);
        assert_eq!(counts.boundary, 8);
        assert_eq!(counts.separation, 6 * 3);
        assert!(vars.pairs.iter().all(|p| rhs(&m, p) == Some(1.0)));

        // Sliding blocks keep their rows; pair (0, 1) shares one, pair (0, 2) does not
        for blk in 0..4 {
            c.block_mut(BlockId(blk)).fix = FixMode::SlideEdge;
        }
        let (m, vars, counts) = formulate(&c, &cfg)?;
        assert_eq!(counts.separation, 6 * 3);
        assert_eq!((vars.pairs[0].i.0, vars.pairs[0].j.0), (0, 1));
        assert_eq!((vars.pairs[1].i.0, vars.pairs[1].j.0), (0, 2));
        assert_eq!(rhs(&m, &vars.pairs[0]), Some(1.0));
        assert_eq!(rhs(&m, &vars.pairs[1]), Some(0.0));
        Ok(())
    }
    #[test]
    fn test_identity_placement_feasible() -> PlaceResult<()> {
        let mut c = samples::grid(2, 2)?;
        c.block_mut(BlockId(3)).fix = FixMode::FixedXY;
        let (m, vars, _) = formulate(&c, &IlpConfig::with_layout(2, 2))?;
        let values = vars.assignment(&m, &c);
        assert_eq!(m.violation(&values, 1e-9), None);

        // Moving a block onto its neighbor violates some separation row
        let mut values = values;
        values[vars.blocks[1].x.0] = 0.0;
        assert!(!m.is_feasible(&values, 1e-9));
        Ok(())
    }
}
