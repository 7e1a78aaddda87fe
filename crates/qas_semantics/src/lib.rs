// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

//! Declaration contexts, symbol tables, and scope resolution for a quantum
//! assembly frontend. The parser drives one [`session::Session`] per
//! translation unit through semantic actions: open and close declaration
//! contexts, declare identifiers, resolve conditional chains, and track the
//! lifetime of gate-local qubit parameters. Diagnostics accumulate on the
//! session and render through the `qas_report` crate.

pub mod context;
pub mod declarations;
mod display;
pub mod flow;
pub mod gate_qubits;
pub mod mangle;
pub mod nodes;
pub mod semantic_error;
pub mod session;
pub mod symbols;
pub mod types;

pub use qas_report::Severity;
pub use rowan::{TextRange, TextSize};
