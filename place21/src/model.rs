//!
//! # Sparse MILP Model
//!
//! The solver-facing linear model: per-column bounds and costs,
//! per-row bounds, and a row-wise compressed sparse coefficient matrix.
//! One-sided rows and unbounded columns use [f64::INFINITY] and its negation.
//!

/// Positive infinity, for one-sided rows and unbounded columns
pub const INF: f64 = f64::INFINITY;

/// Column (variable) index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Col(pub usize);

/// Row (constraint) index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Row(pub usize);

///
/// # Mixed-Integer Linear Program
///
/// Minimizes `col_cost · x` subject to
/// `col_lower ≤ x ≤ col_upper`, `row_lower ≤ A x ≤ row_upper`,
/// and integrality of the columns listed in `integrality`.
///
/// Row `r` of `A` has nonzeros at `a_index[a_start[r]..a_start[r + 1]]`,
/// with values `a_value` over the same range.
///
#[derive(Debug, Clone, PartialEq)]
pub struct MilpModel {
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub col_cost: Vec<f64>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,
    pub a_start: Vec<usize>,
    pub a_index: Vec<usize>,
    pub a_value: Vec<f64>,
    pub integrality: Vec<usize>,
}
impl Default for MilpModel {
    fn default() -> Self {
        Self::new()
    }
}
impl MilpModel {
    /// Create a new, empty model
    pub fn new() -> Self {
        Self {
            col_lower: Vec::new(),
            col_upper: Vec::new(),
            col_cost: Vec::new(),
            row_lower: Vec::new(),
            row_upper: Vec::new(),
            a_start: vec![0],
            a_index: Vec::new(),
            a_value: Vec::new(),
            integrality: Vec::new(),
        }
    }
    pub fn num_cols(&self) -> usize {
        self.col_cost.len()
    }
    pub fn num_rows(&self) -> usize {
        self.row_lower.len()
    }
    pub fn num_nonzeros(&self) -> usize {
        self.a_index.len()
    }
    /// Add a continuous column with bounds `[lower, upper]` and objective coefficient `cost`
    pub fn add_col(&mut self, lower: f64, upper: f64, cost: f64) -> Col {
        self.col_lower.push(lower);
        self.col_upper.push(upper);
        self.col_cost.push(cost);
        Col(self.col_cost.len() - 1)
    }
    /// Add a binary column: bounds `[0, 1]`, zero cost, marked integer
    pub fn add_binary(&mut self) -> Col {
        let col = self.add_col(0.0, 1.0, 0.0);
        self.integrality.push(col.0);
        col
    }
    /// Mark `col` as integer-valued
    pub fn set_integer(&mut self, col: Col) {
        if !self.integrality.contains(&col.0) {
            self.integrality.push(col.0);
        }
    }
    pub fn is_integer(&self, col: Col) -> bool {
        self.integrality.contains(&col.0)
    }
    ///
    /// Add the row `lower ≤ Σ coef · col ≤ upper` over `terms`.
    ///
    /// Zero coefficients are dropped. A row with no remaining terms is kept,
    /// as a constant-only feasibility condition `lower ≤ 0 ≤ upper`.
    ///
    pub fn add_row(&mut self, lower: f64, upper: f64, terms: &[(Col, f64)]) -> Row {
        for &(col, coef) in terms.iter() {
            if coef != 0.0 {
                self.a_index.push(col.0);
                self.a_value.push(coef);
            }
        }
        self.a_start.push(self.a_index.len());
        self.row_lower.push(lower);
        self.row_upper.push(upper);
        Row(self.row_lower.len() - 1)
    }
    /// Get the (column-indices, values) nonzeros of `row`
    pub fn row_entries(&self, row: Row) -> (&[usize], &[f64]) {
        let (start, end) = (self.a_start[row.0], self.a_start[row.0 + 1]);
        (&self.a_index[start..end], &self.a_value[start..end])
    }
    pub fn set_cost(&mut self, col: Col, cost: f64) {
        self.col_cost[col.0] = cost;
    }
    /// Reset every column's objective coefficient to zero
    pub fn reset_costs(&mut self) {
        for c in self.col_cost.iter_mut() {
            *c = 0.0;
        }
    }
    /// Objective value of the column assignment `values`
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.col_cost.iter().zip(values).map(|(c, v)| c * v).sum()
    }
    /// Activity `A x` of `row` under `values`
    pub fn row_activity(&self, row: Row, values: &[f64]) -> f64 {
        let (idx, val) = self.row_entries(row);
        idx.iter().zip(val).map(|(c, v)| v * values[*c]).sum()
    }
    ///
    /// Check whether `values` satisfies every bound, row, and integrality requirement,
    /// each within tolerance `tol`. Returns a description of the first violation found.
    ///
    pub fn violation(&self, values: &[f64], tol: f64) -> Option<String> {
        if values.len() != self.num_cols() {
            return Some(format!(
                "expected {} column values, got {}",
                self.num_cols(),
                values.len()
            ));
        }
        for (c, &v) in values.iter().enumerate() {
            if v < self.col_lower[c] - tol || v > self.col_upper[c] + tol {
                return Some(format!(
                    "column {} value {} outside [{}, {}]",
                    c, v, self.col_lower[c], self.col_upper[c]
                ));
            }
        }
        for &c in self.integrality.iter() {
            if (values[c] - values[c].round()).abs() > tol {
                return Some(format!("integer column {} has value {}", c, values[c]));
            }
        }
        for r in 0..self.num_rows() {
            let act = self.row_activity(Row(r), values);
            if act < self.row_lower[r] - tol || act > self.row_upper[r] + tol {
                return Some(format!(
                    "row {} activity {} outside [{}, {}]",
                    r, act, self.row_lower[r], self.row_upper[r]
                ));
            }
        }
        None
    }
    /// Boolean indication of whether `values` is feasible within `tol`
    pub fn is_feasible(&self, values: &[f64], tol: f64) -> bool {
        self.violation(values, tol).is_none()
    }
}
