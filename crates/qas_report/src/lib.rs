// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

//! Severity levels and rendering of frontend diagnostics. The semantic engine records
//! diagnostics as values implementing `ErrorTrait`; this crate maps them onto the
//! severity ladder and formats them against the source text using the external
//! crate `ariadne`.

mod report;

pub use report::{inner_print_compiler_errors, print_compiler_errors, report_error};

// Positions in diagnostics use the same text ranges the parser produces.
pub use rowan::{TextRange, TextSize};

/// Severity of a recorded diagnostic, ordered from least to most severe.
///
/// `Status` and `Info` never affect compilation. `Warning` flags accepted but
/// suspect input. `Error` marks input that cannot be compiled; errors are
/// counted against the session error limit. `InternalCompilerError` means an
/// internal invariant was violated and the frontend cannot continue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Status,
    Info,
    Warning,
    Error,
    InternalCompilerError,
}

impl Severity {
    /// Short tag used when printing diagnostics without source text.
    pub fn tag(&self) -> &'static str {
        match self {
            Severity::Status => "status",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::InternalCompilerError => "internal compiler error",
        }
    }

    /// `true` for severities that prevent successful compilation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Severity::Error | Severity::InternalCompilerError)
    }

    /// `true` if a diagnostic of this severity counts toward the error limit.
    pub fn counts_as_error(&self) -> bool {
        *self == Severity::Error
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

pub trait ErrorTrait {
    /// Return a message describing the error.
    fn message(&self) -> String;

    /// Return the character range in the source associated with the error.
    fn range(&self) -> TextRange;

    /// Return the severity at which the error was recorded.
    fn severity(&self) -> Severity;
}

#[cfg(test)]
mod tests {
    use super::Severity;

    #[test]
    fn test_severity_order() {
        assert!(Severity::Status < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::InternalCompilerError);
    }

    #[test]
    fn test_severity_classes() {
        assert!(!Severity::Warning.is_fatal());
        assert!(Severity::Error.is_fatal());
        assert!(Severity::InternalCompilerError.is_fatal());
        assert!(Severity::Error.counts_as_error());
        assert!(!Severity::InternalCompilerError.counts_as_error());
    }
}
