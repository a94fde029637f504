//!
//! # Placement Configuration
//!
//! [IlpConfig] is the user-facing, serde-loadable configuration.
//! Each formulation resolves it against a circuit into an immutable [ResolvedConfig],
//! filling in auto-derived layout dimensions and big-M.
//!

// Crates.io
use serde::{Deserialize, Serialize};

// Local Imports
use crate::circuit::{CircuitData, Int};
use crate::error::{PlaceError, PlaceResult};
use crate::utils::SerdeFile;

/// # MILP Placement Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IlpConfig {
    /// Layout width, in grid units. Auto-derived from block widths if not positive.
    pub layout_w: Int,
    /// Layout height, in grid units. Auto-derived from block heights if not positive.
    pub layout_h: Int,
    /// Place in both x and y. If false, only x is solved and blocks keep their y.
    pub use_2d: bool,
    /// Non-overlap via four-way (left/right/below/above) disjunction.
    /// If false, or in x-only mode, blocks are separated horizontally only.
    pub four_way_no_overlap: bool,
    /// Big-M override. Derived from the layout size if [None] or not positive.
    pub big_m: Option<f64>,
    /// Solver log output
    pub verbose_solver: bool,
}
impl Default for IlpConfig {
    fn default() -> Self {
        Self {
            layout_w: 0,
            layout_h: 0,
            use_2d: true,
            four_way_no_overlap: true,
            big_m: None,
            verbose_solver: true,
        }
    }
}
impl SerdeFile for IlpConfig {}

impl IlpConfig {
    /// Create a configuration for a `w` by `h` layout, with all other settings at defaults
    pub fn with_layout(w: Int, h: Int) -> Self {
        Self {
            layout_w: w,
            layout_h: h,
            ..Default::default()
        }
    }
    ///
    /// Resolve against `circuit`.
    ///
    /// Non-positive layout dimensions are replaced by the sum of block widths (heights).
    /// Fails if a big-M override is smaller than the largest coordinate difference
    /// a separation constraint must be able to relax.
    ///
    pub fn resolve(&self, circuit: &CircuitData) -> PlaceResult<ResolvedConfig> {
        let mut layout_w = self.layout_w;
        let mut layout_h = self.layout_h;
        if layout_w <= 0 || layout_h <= 0 {
            let (sum_w, sum_h) = (0..circuit.num_blocks())
                .map(|i| circuit.block_size(i.into()))
                .fold((0, 0), |(w, h), s| (w + s.width, h + s.height));
            if layout_w <= 0 {
                log::warn!(
                    "Layout width {} not positive, using summed block widths {}",
                    layout_w,
                    sum_w
                );
                layout_w = sum_w;
            }
            if layout_h <= 0 {
                log::warn!(
                    "Layout height {} not positive, using summed block heights {}",
                    layout_h,
                    sum_h
                );
                layout_h = sum_h;
            }
        }
        let four_way = self.four_way_no_overlap && self.use_2d;
        // Largest coordinate difference a relaxed separation row must admit
        let required = match four_way {
            true => layout_w.max(layout_h) as f64,
            false => layout_w as f64,
        };
        let big_m = match self.big_m {
            Some(m) if m > 0.0 => {
                if m < required {
                    return Err(PlaceError::Config(format!(
                        "big-M {} is smaller than the required {} for a {}x{} layout",
                        m, required, layout_w, layout_h
                    )));
                }
                m
            }
            _ => layout_w.max(layout_h) as f64,
        };
        Ok(ResolvedConfig {
            layout_w,
            layout_h,
            use_2d: self.use_2d,
            four_way,
            big_m,
            verbose_solver: self.verbose_solver,
        })
    }
}

/// # Resolved Configuration
/// Fixed for the duration of a single formulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedConfig {
    pub layout_w: Int,
    pub layout_h: Int,
    pub use_2d: bool,
    /// Four-way non-overlap. Only ever set in 2-D mode.
    pub four_way: bool,
    pub big_m: f64,
    pub verbose_solver: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples;
    use crate::utils::SerializationFormat;

    #[test]
    fn test_auto_layout() -> PlaceResult<()> {
        let c = samples::grid(2, 3)?;
        let r = IlpConfig::default().resolve(&c)?;
        assert_eq!(r.layout_w, 6);
        assert_eq!(r.layout_h, 6);
        assert_eq!(r.big_m, 6.0);

        let r = IlpConfig {
            layout_w: 10,
            layout_h: -1,
            ..Default::default()
        }
        .resolve(&c)?;
        assert_eq!((r.layout_w, r.layout_h), (10, 6));
        assert_eq!(r.big_m, 10.0);
        Ok(())
    }
    #[test]
    fn test_big_m_override() -> PlaceResult<()> {
        let c = samples::grid(2, 2)?;
        let cfg = IlpConfig {
            big_m: Some(100.0),
            ..IlpConfig::with_layout(4, 8)
        };
        assert_eq!(cfg.resolve(&c)?.big_m, 100.0);

        let cfg = IlpConfig {
            big_m: Some(5.0),
            ..IlpConfig::with_layout(4, 8)
        };
        assert!(matches!(cfg.resolve(&c), Err(PlaceError::Config(_))));

        // X-only separation only needs to span the width
        let cfg = IlpConfig {
            big_m: Some(5.0),
            use_2d: false,
            ..IlpConfig::with_layout(4, 8)
        };
        let r = cfg.resolve(&c)?;
        assert!(!r.four_way);
        assert_eq!(r.big_m, 5.0);

        // Non-positive overrides fall back to auto-derivation
        let cfg = IlpConfig {
            big_m: Some(0.0),
            ..IlpConfig::with_layout(4, 8)
        };
        assert_eq!(cfg.resolve(&c)?.big_m, 8.0);
        Ok(())
    }
    #[test]
    fn test_config_toml() -> PlaceResult<()> {
        let cfg: IlpConfig = SerializationFormat::Toml.from_str(
            r#"
            layout_w = 12
            layout_h = 4
            use_2d = false
            "#,
        )?;
        assert_eq!(cfg.layout_w, 12);
        assert!(!cfg.use_2d);
        assert!(cfg.four_way_no_overlap);
        assert_eq!(cfg.big_m, None);
        Ok(())
    }
}
