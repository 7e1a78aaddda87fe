// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

use qas_report::{ErrorTrait, Severity};
use std::fmt;
use std::path::Path;

// re-exported in lib.rs from qas_report
use crate::TextRange;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SemanticErrorKind {
    UndefVarError,
    UndefGateError,
    RedeclarationError(String),
    MutateConstError,
    NotInGlobalScopeError,
    VersionNotFirstError,
    // `kernel` declarations are accepted but deprecated from language version 3 on.
    KernelDeprecationWarning,
    // The remaining kinds are internal consistency failures, recorded just
    // before the session halts. The payload is the detail of the violation.
    ContextStackError(String),
    BranchTrackerError(String),
}

impl SemanticErrorKind {
    /// The severity this kind is reported at.
    pub fn severity(&self) -> Severity {
        use SemanticErrorKind::*;
        match self {
            KernelDeprecationWarning => Severity::Warning,
            ContextStackError(..) | BranchTrackerError(..) => Severity::InternalCompilerError,
            _ => Severity::Error,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SemanticError {
    error_kind: SemanticErrorKind,
    range: TextRange,
}

impl SemanticError {
    pub fn new(error_kind: SemanticErrorKind, range: TextRange) -> Self {
        Self { error_kind, range }
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn kind(&self) -> &SemanticErrorKind {
        &self.error_kind
    }

    pub fn severity(&self) -> Severity {
        self.error_kind.severity()
    }

    pub fn message(&self) -> String {
        format!("{:?}", self.error_kind)
    }
}

impl fmt::Display for SemanticError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {:?}", self.error_kind, self.range)
    }
}

impl ErrorTrait for SemanticError {
    fn message(&self) -> String {
        self.message()
    }

    fn range(&self) -> TextRange {
        self.range()
    }

    fn severity(&self) -> Severity {
        self.severity()
    }
}

/// `SemanticErrorList` stores the diagnostics recorded while resolving one
/// translation unit, in the order they were recorded.
#[derive(Clone, Debug, Default)]
pub struct SemanticErrorList {
    list: Vec<SemanticError>,
}

impl std::ops::Deref for SemanticErrorList {
    type Target = Vec<SemanticError>;

    fn deref(&self) -> &Self::Target {
        &self.list
    }
}

impl SemanticErrorList {
    pub fn new() -> SemanticErrorList {
        SemanticErrorList {
            list: Vec::<SemanticError>::new(),
        }
    }

    pub fn insert(&mut self, error_kind: SemanticErrorKind, range: TextRange) {
        self.list.push(SemanticError::new(error_kind, range));
    }

    pub fn any_semantic_errors(&self) -> bool {
        !self.list.is_empty()
    }

    /// The number of diagnostics recorded at `Error` severity. Warnings and
    /// lower do not count, and neither do internal compiler errors, which halt
    /// the session on their own.
    pub fn num_errors(&self) -> usize {
        self.list
            .iter()
            .filter(|error| error.severity().counts_as_error())
            .count()
    }

    pub fn num_warnings(&self) -> usize {
        self.list
            .iter()
            .filter(|error| error.severity() == Severity::Warning)
            .count()
    }

    /// `true` once at least `limit` diagnostics of `Error` severity have been
    /// recorded. The session polls this to stop accumulating.
    pub fn at_error_limit(&self, limit: usize) -> bool {
        self.num_errors() >= limit
    }

    pub fn clear(&mut self) {
        self.list.clear();
    }

    /// Render every diagnostic against the source read from `file_path`.
    pub fn print_errors(&self, file_path: &Path) {
        // If there is nothing to print, don't try to read the file.
        if !self.list.is_empty() {
            qas_report::print_compiler_errors(self, file_path);
        }
    }

    /// Render diagnostics when the source is not associated with a file, for
    /// example because it came from a literal string.
    pub fn print_errors_no_file(&self, fake_file_path: &Path, source: &str) {
        qas_report::inner_print_compiler_errors(self, fake_file_path, source);
    }
}
