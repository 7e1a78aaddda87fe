// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

use crate::{ErrorTrait, Severity, TextRange};
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::fs;
use std::path::Path;

/// Diagnostics carry a `TextRange` while `ariadne` wants a `Range<usize>`.
/// `ariadne` requires `r2 >= r1`; an empty `TextRange` satisfies this.
pub(crate) fn range_to_span(range: &TextRange) -> std::ops::Range<usize> {
    let r1: usize = range.start().into();
    let r2: usize = range.end().into();
    r1..r2
}

fn report_kind(severity: Severity) -> ReportKind<'static> {
    match severity {
        Severity::Status | Severity::Info => ReportKind::Advice,
        Severity::Warning => ReportKind::Warning,
        Severity::Error => ReportKind::Error,
        Severity::InternalCompilerError => {
            ReportKind::Custom("internal compiler error", Color::Magenta)
        }
    }
}

/// Render one diagnostic against `source` and print it to stderr.
pub fn report_error<T: ErrorTrait>(error: &T, file_path: &Path, source: &str) {
    let file_name = file_path.to_str().unwrap_or("<unknown file>");
    let span = range_to_span(&error.range());
    // The error is propagated as a message in a label on the offending range.
    Report::build(report_kind(error.severity()), (file_name, span.clone()))
        .with_message(error.message())
        .with_label(
            Label::new((file_name, span))
                .with_message(error.message())
                .with_color(Color::Red),
        )
        .finish()
        .eprint((file_name, Source::from(source)))
        .unwrap();
}

/// Print each diagnostic in `errors` against the already-read `source`.
pub fn inner_print_compiler_errors<T: ErrorTrait>(errors: &[T], file_path: &Path, source: &str) {
    for error in errors.iter() {
        report_error(error, file_path, source);
        eprintln!();
    }
}

/// Read the source from `file_path` and print each diagnostic in `errors` against it.
pub fn print_compiler_errors<T: ErrorTrait>(errors: &[T], file_path: &Path) {
    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(err) => panic!(
            "Unable to read source file '{}': {}",
            file_path.display(),
            err
        ),
    };
    inner_print_compiler_errors(errors, file_path, &source);
}
