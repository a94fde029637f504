//!
//! # Objective Builder
//!
//! Sets column costs such that the model's objective is total half-perimeter wirelength:
//! the sum over nets of `(xmax - xmin) + (ymax - ymin)`, without the y-term in x-only mode.
//!

// Local Imports
use crate::model::MilpModel;
use crate::vars::VarMap;

/// # HPWL Objective
pub struct Objective;
impl Objective {
    /// Reset all costs to zero, then cost +1 on each net's max columns and -1 on its min columns.
    pub fn apply(model: &mut MilpModel, vars: &VarMap) {
        model.reset_costs();
        for span in vars.nets.iter() {
            model.set_cost(span.xmax, 1.0);
            model.set_cost(span.xmin, -1.0);
            if let (Some(ymin), Some(ymax)) = (span.ymin, span.ymax) {
                model.set_cost(ymax, 1.0);
                model.set_cost(ymin, -1.0);
            }
        }
    }
}
