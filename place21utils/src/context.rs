//!
//! # Error-Reporting Contexts
//!

/// Enumerated circuit-conversion contexts.
/// Pushed and popped by importers as they walk a circuit description,
/// so that failures can report where they occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Circuit(String),
    Primitive(String),
    TerminalTemplate(String),
    Block(String),
    Terminal(String),
    Net(String),
}
impl std::fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Circuit(s) => write!(f, "circuit `{}`", s),
            Self::Primitive(s) => write!(f, "primitive `{}`", s),
            Self::TerminalTemplate(s) => write!(f, "terminal template `{}`", s),
            Self::Block(s) => write!(f, "block `{}`", s),
            Self::Terminal(s) => write!(f, "terminal `{}`", s),
            Self::Net(s) => write!(f, "net `{}`", s),
        }
    }
}
