// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

use clap::{Parser, Subcommand};
use std::path::Path;

use qas_semantics::context::ContextKind;
use qas_semantics::flow::{BranchKind, StmtList, StmtNode};
use qas_semantics::nodes::{ConstValue, Identifier};
use qas_semantics::session::{LanguageVersion, Session};
use qas_semantics::types::{IsConst, Type};
use qas_semantics::with_context;
use qas_semantics::TextRange;

#[derive(Parser)]
#[command(name = "resolverdemo")]
#[command(about = "Demo of the declaration resolver driving a scripted translation unit.")]
#[command(long_about = "
Demo of the declaration resolver driving a scripted translation unit.

Commands are `walk`, `errors`, `dump`.
`walk` resolves a scripted program stage by stage and prints the session after each stage.
`errors` resolves a small faulty program and renders its diagnostics against the source.
`dump` prints a freshly created session, showing the builtin constants and singleton contexts.
")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a scripted program and print the session at each stage
    Walk,

    /// Resolve a faulty program and render the diagnostics
    Errors,

    /// Print a fresh session
    Dump,
}

fn main() {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Walk) => walk(),
        Some(Commands::Errors) => errors(),
        Some(Commands::Dump) => {
            println!("{}", Session::new());
        }
        None => {
            println!("Commands are walk, errors, and dump")
        }
    }
}

fn range() -> TextRange {
    TextRange::empty(0.into())
}

fn ident(name: &str, typ: Type) -> Identifier {
    Identifier::new(name, typ, range())
}

/// Resolve the equivalent of
///
///   OPENQASM 3.1;
///   const int[32] n = 12;
///   qubit[2] qr;
///   gate mygate(theta) p { ... }
///   defcal rx(angle) q { ... }
///   while (...) { if (...) {...} else if (...) {...} else {...} }
///
/// printing the session after each stage.
fn walk() {
    let mut session = Session::new();

    println!("==== global declarations");
    session.set_version(LanguageVersion::new(3, 1), range());
    session
        .declare_const(
            ident("n", Type::Int(Some(32), IsConst::True)),
            ConstValue::int(12),
        )
        .unwrap();
    session.declare(ident("qr", Type::QubitArray(Some(2)))).unwrap();
    println!("{}", session.symbols);

    println!("==== named types");
    session.declare_named_type(ident("mygate", Type::Gate)).unwrap();
    session.declare_named_type(ident("rx", Type::Defcal)).unwrap();
    println!("{}", session.named_types);

    println!("==== gate body");
    let guard = session.open_context("mygate", ContextKind::Gate);
    session
        .declare(ident("theta", Type::Angle(None, IsConst::False)))
        .unwrap();
    // re-classified as a qubit parameter and tracked for body exit
    session.declare(ident("p", Type::Qubit)).unwrap();
    session.declare_alias(ident("a", Type::QubitArray(Some(2))), "qr");
    println!("{}", session.gate_qubits);
    println!("{}", session.symbols);
    session.close_context(guard);

    println!("==== defcal body");
    with_context!(session, "rx", ContextKind::Defcal, {
        session
            .declare(ident("phi", Type::Angle(None, IsConst::False)))
            .unwrap();
        session.declare(ident("q", Type::Qubit)).unwrap();
    });

    println!("==== conditional chain");
    let enclosing = session.open_context("while", ContextKind::Loop);
    let mut list = StmtList::new();
    for (name, context_kind, kind) in [
        ("arm0", ContextKind::If, BranchKind::If),
        ("arm1", ContextKind::ElseIf, BranchKind::ElseIf),
        ("arm2", ContextKind::Else, BranchKind::Else),
    ] {
        let arm_guard = session.open_context(name, context_kind);
        let arm = session.begin_branch(kind);
        session.declare(ident("flag", Type::Bit(IsConst::False))).unwrap();
        session.end_branch(arm);
        session.close_context(arm_guard);
        list.push(StmtNode::Branch(arm));
    }
    let arms: Vec<_> = list
        .statements()
        .iter()
        .filter_map(|node| match node {
            StmtNode::Branch(id) => Some(*id),
            _ => None,
        })
        .collect();
    session.flow.resolve_if_chain(&arms);
    println!("{}", session.flow);
    session.remove_out_of_scope(&list, enclosing.index());
    session.close_context(enclosing);

    println!("==== final session");
    println!("{session}");
}

/// Resolve the equivalent of
///
///   const int[32] n = 12;
///   n = 0;
///   qubit q;
///   qubit q;
///
/// and render the recorded diagnostics against the source text.
fn errors() {
    let source = "const int[32] n = 12;\nn = 0;\nqubit q;\nqubit q;\n";
    let mut session = Session::new();
    let _ = session.declare_const(
        Identifier::new(
            "n",
            Type::Int(Some(32), IsConst::True),
            TextRange::new(14.into(), 15.into()),
        ),
        ConstValue::int(12),
    );
    session.check_mutable("n", TextRange::new(22.into(), 23.into()));
    let _ = session.declare(Identifier::new(
        "q",
        Type::Qubit,
        TextRange::new(35.into(), 36.into()),
    ));
    let _ = session.declare(Identifier::new(
        "q",
        Type::Qubit,
        TextRange::new(44.into(), 45.into()),
    ));
    println!(
        "Found {} errors and {} warnings",
        session.errors.num_errors(),
        session.errors.num_warnings()
    );
    session
        .errors
        .print_errors_no_file(Path::new("demo.qasm"), source);
}
