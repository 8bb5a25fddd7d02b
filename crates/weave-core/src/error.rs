//! Error types for component instantiation.
//!
//! Instantiation distinguishes two classes of failure:
//!
//! ```text
//! WeaveError (top-level wrapper)
//! ├── FoldError      - user-diagnosable, collected in Diagnostics, compile continues
//! └── InternalFault  - a defect in an earlier phase, aborts the instantiation
//! ```
//!
//! Fold errors are pushed into a [`Diagnostics`] collection and folding
//! carries on across siblings and nested components. Internal faults are
//! returned as `Err` and propagated with `?`; they are never downgraded to
//! diagnostics.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Fold Errors
// ============================================================================

/// Recoverable errors found while folding constants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FoldError {
    /// A component argument did not reduce to a compile-time constant.
    #[error("at {span}: argument for parameter '{parameter}' of component '{component}' is not constant")]
    NonConstantArgument {
        /// The template of the component being instantiated.
        component: String,
        /// The formal parameter the argument was bound to.
        parameter: String,
        /// Where the argument appears.
        span: Span,
    },
}

impl FoldError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            FoldError::NonConstantArgument { span, .. } => *span,
        }
    }
}

// ============================================================================
// Internal Faults
// ============================================================================

/// Internal-consistency violations.
///
/// These indicate malformed input from an earlier phase (for example a
/// front end that produced a broken shadow chain), not a user mistake.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalFault {
    /// A command or event reached declaration cloning without having been
    /// forwarded from the component specification.
    #[error("internal error: command or event '{name}' cannot be cloned")]
    CloneCommandOrEvent {
        /// The declaration name.
        name: String,
    },

    /// A shadow chain ended before reaching the template declaration.
    #[error("internal error: declaration '{name}' has no shadowed declaration at depth {depth}")]
    MissingShadow {
        /// The declaration whose chain was walked.
        name: String,
        /// How many links were required.
        depth: usize,
    },

    /// A component without an `original` link was asked to instantiate.
    #[error("internal error: component '{component}' is not an instance of an abstract component")]
    NotInstantiable {
        /// The component name.
        component: String,
    },

    /// Parameter and argument lists differ in length.
    #[error("internal error: component '{component}' takes {expected} arguments, {found} supplied")]
    ArgumentCountMismatch {
        /// The component name.
        component: String,
        /// Number of formal parameters.
        expected: usize,
        /// Number of arguments supplied.
        found: usize,
    },

    /// Abstract components nest deeper than the configured limit.
    #[error("internal error: abstract component '{component}' nested deeper than {limit} levels")]
    NestingTooDeep {
        /// The component that exceeded the limit.
        component: String,
        /// The configured limit.
        limit: usize,
    },
}

// ============================================================================
// Top-level Error
// ============================================================================

/// Either class of instantiation failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeaveError {
    /// A recoverable fold error.
    #[error(transparent)]
    Fold(#[from] FoldError),
    /// A fatal internal fault.
    #[error(transparent)]
    Internal(#[from] InternalFault),
}

impl WeaveError {
    /// Whether this error aborts compilation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, WeaveError::Internal(_))
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Collection of recoverable errors reported during one instantiation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    errors: Vec<FoldError>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn push(&mut self, error: FoldError) {
        self.errors.push(error);
    }

    /// Whether no errors were reported.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Number of reported errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The reported errors, in report order.
    pub fn errors(&self) -> &[FoldError] {
        &self.errors
    }

    /// Convert to a Result, returning Ok(()) if empty or Err with the first error.
    pub fn into_result(self) -> Result<(), FoldError> {
        match self.errors.into_iter().next() {
            Some(first) => Err(first),
            None => Ok(()),
        }
    }
}

impl IntoIterator for Diagnostics {
    type Item = FoldError;
    type IntoIter = std::vec::IntoIter<FoldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a FoldError;
    type IntoIter = std::slice::Iter<'a, FoldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl std::fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_constant(parameter: &str, line: u32) -> FoldError {
        FoldError::NonConstantArgument {
            component: "TimerC".to_string(),
            parameter: parameter.to_string(),
            span: Span::new(line, 3, 1),
        }
    }

    #[test]
    fn fold_error_display() {
        let err = non_constant("n", 4);
        assert_eq!(
            format!("{err}"),
            "at 4:3: argument for parameter 'n' of component 'TimerC' is not constant"
        );
        assert_eq!(err.span(), Span::new(4, 3, 1));
    }

    #[test]
    fn internal_fault_display() {
        let fault = InternalFault::MissingShadow {
            name: "fired".to_string(),
            depth: 2,
        };
        assert_eq!(
            format!("{fault}"),
            "internal error: declaration 'fired' has no shadowed declaration at depth 2"
        );
    }

    #[test]
    fn weave_error_fatality() {
        let fold: WeaveError = non_constant("n", 1).into();
        assert!(!fold.is_fatal());

        let fault: WeaveError = InternalFault::NotInstantiable {
            component: "Main".to_string(),
        }
        .into();
        assert!(fault.is_fatal());
    }

    #[test]
    fn diagnostics_collection() {
        let mut diagnostics = Diagnostics::new();
        assert!(diagnostics.is_empty());
        assert!(diagnostics.clone().into_result().is_ok());

        diagnostics.push(non_constant("a", 1));
        diagnostics.push(non_constant("b", 2));
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics.to_string().lines().count(), 2);

        let first = diagnostics.into_result().unwrap_err();
        assert_eq!(first.span().line, 1);
    }
}
