//!
//! # Error-Helper Utilities
//!
//! ```rust
//! use place21utils::error::{ErrorHelper, Unwrapper};
//!
//! /// Importer which reports the net it was working on upon failure.
//! struct NetImporter {
//!     net: String,
//! }
//! impl ErrorHelper for NetImporter {
//!     type Error = String;
//!     fn err(&self, msg: impl Into<String>) -> Self::Error {
//!         format!("net `{}`: {}", self.net, msg.into())
//!     }
//! }
//! impl NetImporter {
//!     fn pin(&self, pins: &[&str], idx: usize) -> Result<String, String> {
//!         let pin = pins.get(idx).unwrapper(self, "pin index out of range")?;
//!         self.assert(!pin.is_empty(), "empty pin name")?;
//!         Ok(pin.to_string())
//!     }
//! }
//! let imp = NetImporter { net: "vdd".into() };
//! assert_eq!(imp.pin(&["U1/P"], 0), Ok("U1/P".to_string()));
//! assert_eq!(imp.pin(&["U1/P"], 3), Err("net `vdd`: pin index out of range".to_string()));
//! ```
//!

///
/// # ErrorHelper
///
/// Shared failure plumbing for circuit importers and validators.
/// Implementers hold whatever state is worth reporting, typically a stack of
/// [crate::ErrorContext]s, and fold it into their error type in `err`.
///
pub trait ErrorHelper {
    type Error;

    /// Create a [Self::Error] carrying message `msg`
    fn err(&self, msg: impl Into<String>) -> Self::Error;
    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }
    /// Fail with `msg` unless `b` holds
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        if b {
            Ok(())
        } else {
            self.fail(msg)
        }
    }
}

///
/// # Unwrapper
///
/// Converts [None]s and [Err]s into an [ErrorHelper]'s error, post-fix:
///
/// ```text
/// let owner = self.instances.get(name).unwrapper(self, "unknown instance")?;
/// ```
///
/// For [Result]s the underlying error's message is appended, as `msg: cause`.
///
pub trait Unwrapper {
    type Ok;
    fn unwrapper<H: ErrorHelper>(
        self,
        helper: &H,
        msg: impl Into<String>,
    ) -> Result<Self::Ok, H::Error>;
}
impl<T> Unwrapper for Option<T> {
    type Ok = T;
    fn unwrapper<H: ErrorHelper>(self, helper: &H, msg: impl Into<String>) -> Result<T, H::Error> {
        self.ok_or_else(|| helper.err(msg))
    }
}
impl<T, E: std::fmt::Display> Unwrapper for Result<T, E> {
    type Ok = T;
    fn unwrapper<H: ErrorHelper>(self, helper: &H, msg: impl Into<String>) -> Result<T, H::Error> {
        self.map_err(|e| helper.err(format!("{}: {}", msg.into(), e)))
    }
}
