//!
//! # Variable Allocator
//!
//! Maps circuit entities to solver columns:
//! * Each block gets an `x` column, plus `y` in 2-D mode.
//! * Each movable terminal gets a column along each axis it may move in.
//! * Each unordered block pair `(i, j)`, `i < j`, gets binary separation columns
//!   `left`, `right`, and in four-way mode `below`, `above`.
//! * Each net gets bounding-span columns `xmin`, `xmax`, plus `ymin`, `ymax` in 2-D mode.
//!
//! The pair columns grow quadratically with the number of blocks,
//! and dominate model size past a few dozen blocks.
//!
//! Every later stage reads its column indices from the [VarMap];
//! none recompute them.
//!

// Local Imports
use crate::circuit::{BlockId, CircuitData, Dir, FixMode, Net, PinInst, PinOwner};
use crate::config::ResolvedConfig;
use crate::model::{Col, MilpModel, INF};

/// Position columns of a [crate::circuit::Block]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockCols {
    pub x: Col,
    /// Present in 2-D mode only
    pub y: Option<Col>,
}
impl BlockCols {
    pub fn get(&self, dir: Dir) -> Option<Col> {
        match dir {
            Dir::Horiz => Some(self.x),
            Dir::Vert => self.y,
        }
    }
}

/// Position columns of a [crate::circuit::Terminal], along the axes it may move in
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TerminalCols {
    pub x: Option<Col>,
    pub y: Option<Col>,
}
impl TerminalCols {
    pub fn get(&self, dir: Dir) -> Option<Col> {
        match dir {
            Dir::Horiz => self.x,
            Dir::Vert => self.y,
        }
    }
}

/// # Separation Columns for Block Pair `(i, j)`, `i < j`
/// Each binary asserts one relation of block `i` to block `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SepPair {
    pub i: BlockId,
    pub j: BlockId,
    /// `i` is left of `j`
    pub left: Col,
    /// `i` is right of `j`
    pub right: Col,
    /// `i` is below `j`. Four-way mode only.
    pub below: Option<Col>,
    /// `i` is above `j`. Four-way mode only.
    pub above: Option<Col>,
}
impl SepPair {
    /// All present separation columns, in (left, right, below, above) order
    pub fn cols(&self) -> Vec<Col> {
        let mut cols = vec![self.left, self.right];
        cols.extend(self.below);
        cols.extend(self.above);
        cols
    }
}

/// Bounding-span columns of a [Net]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetSpan {
    pub xmin: Col,
    pub xmax: Col,
    pub ymin: Option<Col>,
    pub ymax: Option<Col>,
}
impl NetSpan {
    /// The (min, max) columns along `dir`, if present
    pub fn get(&self, dir: Dir) -> Option<(Col, Col)> {
        match dir {
            Dir::Horiz => Some((self.xmin, self.xmax)),
            Dir::Vert => self.ymin.zip(self.ymax),
        }
    }
}

/// # Affine Pin Coordinate
/// `var + constant`, or just `constant` for pins which cannot move along an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub var: Option<Col>,
    pub constant: f64,
}
impl Affine {
    pub fn constant(constant: f64) -> Self {
        Self {
            var: None,
            constant,
        }
    }
    pub fn var(col: Col, constant: f64) -> Self {
        Self {
            var: Some(col),
            constant,
        }
    }
    pub fn is_constant(&self) -> bool {
        self.var.is_none()
    }
    /// Evaluate under column assignment `values`
    pub fn eval(&self, values: &[f64]) -> f64 {
        self.var.map_or(0.0, |c| values[c.0]) + self.constant
    }
    /// Smallest value permitted by the model's column bounds
    fn lower(&self, model: &MilpModel) -> f64 {
        self.var.map_or(0.0, |c| model.col_lower[c.0]) + self.constant
    }
}

///
/// # Variable Map
///
/// Record of every column allocated for a circuit, indexed by block, terminal, pair, and net.
///
#[derive(Debug, Clone, PartialEq)]
pub struct VarMap {
    /// Indexed by [BlockId]
    pub blocks: Vec<BlockCols>,
    /// Indexed by [crate::circuit::TerminalId]
    pub terminals: Vec<TerminalCols>,
    /// One per unordered block pair, in (0,1), (0,2), ..., (1,2), ... order
    pub pairs: Vec<SepPair>,
    /// Indexed by [crate::circuit::NetId]
    pub nets: Vec<NetSpan>,
    start: usize,
    num_cols: usize,
}
impl VarMap {
    ///
    /// Allocate all columns for `circuit` into `model`.
    ///
    /// All columns are created with zero cost.
    ///
    pub fn allocate(model: &mut MilpModel, circuit: &CircuitData, cfg: &ResolvedConfig) -> Self {
        let start = model.num_cols();
        let n = circuit.num_blocks();
        let mut this = Self {
            blocks: Vec::with_capacity(n),
            terminals: Vec::with_capacity(circuit.terminals().len()),
            pairs: Vec::with_capacity(n * n.saturating_sub(1) / 2),
            nets: Vec::with_capacity(circuit.nets().len()),
            start,
            num_cols: 0,
        };
        this.alloc_blocks(model, circuit, cfg);
        this.alloc_terminals(model, circuit, cfg);
        this.alloc_pairs(model, n, cfg);
        this.alloc_nets(model, circuit, cfg);
        this.num_cols = model.num_cols() - start;
        log::debug!(
            "Allocated {} columns: {} blocks, {} terminals, {} pairs, {} nets",
            this.num_cols,
            this.blocks.len(),
            this.terminals.len(),
            this.pairs.len(),
            this.nets.len()
        );
        this
    }
    /// Block position columns. Fixed blocks are pinned in place by their bounds.
    fn alloc_blocks(&mut self, model: &mut MilpModel, circuit: &CircuitData, cfg: &ResolvedConfig) {
        let (w, h) = (cfg.layout_w as f64, cfg.layout_h as f64);
        for blk in circuit.blocks() {
            let (px, py) = (blk.position.x as f64, blk.position.y as f64);
            let x = match blk.fix {
                FixMode::FixedXY => model.add_col(px, px, 0.0),
                FixMode::Free | FixMode::SlideEdge => model.add_col(0.0, w, 0.0),
            };
            let y = match (cfg.use_2d, blk.fix) {
                (false, _) => None,
                (true, FixMode::Free) => Some(model.add_col(0.0, h, 0.0)),
                // Sliding blocks keep their row
                (true, FixMode::FixedXY | FixMode::SlideEdge) => Some(model.add_col(py, py, 0.0)),
            };
            self.blocks.push(BlockCols { x, y });
        }
    }
    /// Terminal position columns, for movable terminals only
    fn alloc_terminals(
        &mut self,
        model: &mut MilpModel,
        circuit: &CircuitData,
        cfg: &ResolvedConfig,
    ) {
        let (w, h) = (cfg.layout_w as f64, cfg.layout_h as f64);
        for term in circuit.terminals() {
            let cols = match term.fix {
                FixMode::FixedXY => TerminalCols::default(),
                FixMode::Free => TerminalCols {
                    x: Some(model.add_col(0.0, w, 0.0)),
                    y: match cfg.use_2d {
                        true => Some(model.add_col(0.0, h, 0.0)),
                        false => None,
                    },
                },
                FixMode::SlideEdge => {
                    let dir = term.edge.slide_dir();
                    let extent = match dir {
                        Dir::Horiz => w,
                        Dir::Vert => h,
                    };
                    let (lo, hi) = match term.slide.is_unset() {
                        true => (0.0, extent),
                        false => (term.slide.min, term.slide.max),
                    };
                    match dir {
                        Dir::Horiz => TerminalCols {
                            x: Some(model.add_col(lo, hi, 0.0)),
                            y: None,
                        },
                        Dir::Vert if cfg.use_2d => TerminalCols {
                            x: None,
                            y: Some(model.add_col(lo, hi, 0.0)),
                        },
                        // No y-placement in x-only mode
                        Dir::Vert => TerminalCols::default(),
                    }
                }
            };
            self.terminals.push(cols);
        }
    }
    /// Binary separation columns for each pair `i < j`
    fn alloc_pairs(&mut self, model: &mut MilpModel, n: usize, cfg: &ResolvedConfig) {
        for i in 0..n {
            for j in (i + 1)..n {
                let left = model.add_binary();
                let right = model.add_binary();
                let (below, above) = match cfg.four_way {
                    true => (Some(model.add_binary()), Some(model.add_binary())),
                    false => (None, None),
                };
                self.pairs.push(SepPair {
                    i: BlockId(i),
                    j: BlockId(j),
                    left,
                    right,
                    below,
                    above,
                });
            }
        }
    }
    /// Net span columns.
    /// Lower bounds are zero, relaxed to admit any pin which may sit below zero.
    fn alloc_nets(&mut self, model: &mut MilpModel, circuit: &CircuitData, cfg: &ResolvedConfig) {
        for net in circuit.nets() {
            let lo = self.span_lower(model, circuit, net, Dir::Horiz);
            let xmin = model.add_col(lo, INF, 0.0);
            let xmax = model.add_col(lo, INF, 0.0);
            let (ymin, ymax) = match cfg.use_2d {
                true => {
                    let lo = self.span_lower(model, circuit, net, Dir::Vert);
                    (Some(model.add_col(lo, INF, 0.0)), Some(model.add_col(lo, INF, 0.0)))
                }
                false => (None, None),
            };
            self.nets.push(NetSpan {
                xmin,
                xmax,
                ymin,
                ymax,
            });
        }
    }
    fn span_lower(&self, model: &MilpModel, circuit: &CircuitData, net: &Net, dir: Dir) -> f64 {
        net.pins()
            .iter()
            .map(|pin| self.pin_coord(circuit, pin, dir).lower(model))
            .fold(0.0, f64::min)
    }

    /// Number of columns allocated
    pub fn num_cols(&self) -> usize {
        self.num_cols
    }
    /// Range of model column indices allocated
    pub fn col_range(&self) -> std::ops::Range<usize> {
        self.start..self.start + self.num_cols
    }
    pub fn block(&self, id: BlockId) -> &BlockCols {
        &self.blocks[id.index()]
    }
    /// All binary separation columns
    pub fn binaries(&self) -> impl Iterator<Item = Col> + '_ {
        self.pairs.iter().flat_map(|p| p.cols())
    }
    ///
    /// Affine coordinate of `pin` along `dir`.
    ///
    /// Pins of instances with a column along `dir` are `column + offset`.
    /// All others are the constant `position + offset`.
    ///
    pub fn pin_coord(&self, circuit: &CircuitData, pin: &PinInst, dir: Dir) -> Affine {
        let offset = circuit.pin_template(pin).offset.coord(dir);
        match pin.owner() {
            PinOwner::Block(b) => match self.blocks[b.index()].get(dir) {
                Some(col) => Affine::var(col, offset),
                None => Affine::constant(circuit.block(b).position.coord(dir) as f64 + offset),
            },
            PinOwner::Terminal(t) => match self.terminals[t.index()].get(dir) {
                Some(col) => Affine::var(col, offset),
                None => Affine::constant(circuit.terminal(t).position.coord(dir) + offset),
            },
        }
    }
    ///
    /// Encode the current placement of `circuit` as a column assignment.
    ///
    /// Separation binaries are set for every relation that holds,
    /// and net spans to the extremes of their pin coordinates.
    /// A legal placement encodes to a feasible assignment whose objective is its HPWL.
    ///
    pub fn assignment(&self, model: &MilpModel, circuit: &CircuitData) -> Vec<f64> {
        let mut values = vec![0.0; model.num_cols()];
        for (blk, cols) in circuit.blocks().iter().zip(self.blocks.iter()) {
            values[cols.x.0] = blk.position.x as f64;
            if let Some(y) = cols.y {
                values[y.0] = blk.position.y as f64;
            }
        }
        for (term, cols) in circuit.terminals().iter().zip(self.terminals.iter()) {
            if let Some(x) = cols.x {
                values[x.0] = term.position.x;
            }
            if let Some(y) = cols.y {
                values[y.0] = term.position.y;
            }
        }
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        for pair in self.pairs.iter() {
            let (bi, bj) = (circuit.block(pair.i), circuit.block(pair.j));
            let (si, sj) = (circuit.block_size(pair.i), circuit.block_size(pair.j));
            values[pair.left.0] = flag(bi.position.x + si.width <= bj.position.x);
            values[pair.right.0] = flag(bj.position.x + sj.width <= bi.position.x);
            if let Some(below) = pair.below {
                values[below.0] = flag(bi.position.y + si.height <= bj.position.y);
            }
            if let Some(above) = pair.above {
                values[above.0] = flag(bj.position.y + sj.height <= bi.position.y);
            }
        }
        for (net, span) in circuit.nets().iter().zip(self.nets.iter()) {
            for dir in [Dir::Horiz, Dir::Vert] {
                if let Some((cmin, cmax)) = span.get(dir) {
                    let coords: Vec<f64> = net
                        .pins()
                        .iter()
                        .map(|pin| self.pin_coord(circuit, pin, dir).eval(&values))
                        .collect();
                    let lo = coords.iter().copied().fold(INF, f64::min);
                    let hi = coords.iter().copied().fold(-INF, f64::max);
                    match coords.is_empty() {
                        true => {
                            values[cmin.0] = model.col_lower[cmin.0];
                            values[cmax.0] = model.col_lower[cmax.0];
                        }
                        false => {
                            values[cmin.0] = lo;
                            values[cmax.0] = hi;
                        }
                    }
                }
            }
        }
        values
    }
}
