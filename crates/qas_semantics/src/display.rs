// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Nested, tagged textual dumps of each structure, for tooling and for the
// snapshot tests. Inner lines are self-closing tags. Map-backed sections are
// emitted in sorted name order so the output is deterministic.

use crate::context::ContextTracker;
use crate::declarations::{DeclarationBuilder, NamedTypeDeclarationBuilder};
use crate::flow::{BranchGraph, BranchKind};
use crate::gate_qubits::GateQubitTracker;
use crate::session::Session;
use crate::symbols::{Symbol, SymbolTable, SymbolType};
use std::fmt;

fn opt<T: fmt::Display>(value: Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<symbol name={:?} type={:?} context={}",
            self.name(),
            self.symbol_type(),
            self.context(),
        )?;
        if let Some(value) = self.value() {
            write!(f, " value={value:?}")?;
        }
        write!(f, "/>")
    }
}

impl fmt::Display for ContextTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<contexts open={} registered={}>",
            self.num_open_contexts(),
            self.num_contexts(),
        )?;
        for context in self.all_contexts() {
            let open = if self.is_open(context.index()) {
                " open"
            } else {
                ""
            };
            writeln!(
                f,
                "  <context index={} kind={} name={:?} parent={}{}/>",
                context.index(),
                context.kind().tag(),
                context.name(),
                opt(context.parent()),
                open,
            )?;
        }
        write!(f, "</contexts>")
    }
}

impl fmt::Display for SymbolTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<symbols total={} global={} local={} aliases={}>",
            self.num_symbols(),
            self.len_global(),
            self.len_local(),
            self.num_aliases(),
        )?;
        for (tag, partition) in [
            ("global", self.global_partition()),
            ("local", self.local_partition()),
        ] {
            if partition.is_empty() {
                writeln!(f, "  <{tag}/>")?;
                continue;
            }
            writeln!(f, "  <{tag}>")?;
            let mut names: Vec<&String> = partition.keys().collect();
            names.sort();
            for name in names {
                for symbol_id in &partition[name] {
                    writeln!(f, "    {}", &self[symbol_id])?;
                }
            }
            writeln!(f, "  </{tag}>")?;
        }
        if self.alias_map().is_empty() {
            writeln!(f, "  <aliases/>")?;
        } else {
            writeln!(f, "  <aliases>")?;
            let mut aliases: Vec<(&String, &String)> = self.alias_map().iter().collect();
            aliases.sort();
            for (name, target) in aliases {
                writeln!(f, "    <alias name={name:?} target={target:?}/>")?;
            }
            writeln!(f, "  </aliases>")?;
        }
        write!(f, "</symbols>")
    }
}

impl fmt::Display for DeclarationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<declarations list=0 consts={}/>", self.num_consts());
        }
        writeln!(
            f,
            "<declarations list={} consts={}>",
            self.len(),
            self.num_consts(),
        )?;
        for decl in self.iter() {
            write!(
                f,
                "  <decl name={:?} type={:?} context={}",
                decl.name(),
                decl.typ(),
                decl.context(),
            )?;
            if decl.identifier().is_redeclaration() {
                write!(f, " redeclaration")?;
            }
            if let Some(value) = decl.const_value() {
                write!(f, " value={value:?}")?;
            }
            writeln!(f, "/>")?;
        }
        write!(f, "</declarations>")
    }
}

impl fmt::Display for NamedTypeDeclarationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<named-types total=0/>");
        }
        writeln!(f, "<named-types total={}>", self.len())?;
        for decl in self.iter() {
            let mangled = match decl.identifier().mangled() {
                Some(mangled) => format!("{mangled:?}"),
                None => "none".to_string(),
            };
            writeln!(
                f,
                "  <decl name={:?} type={:?} mangled={} context={}/>",
                decl.name(),
                decl.typ(),
                mangled,
                decl.context(),
            )?;
        }
        write!(f, "</named-types>")
    }
}

impl fmt::Display for BranchGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts = [
            self.tracker(BranchKind::If).num_registered(),
            self.tracker(BranchKind::ElseIf).num_registered(),
            self.tracker(BranchKind::Else).num_registered(),
        ];
        if self.num_branches() == 0 {
            return write!(
                f,
                "<branches total=0 if={} elseif={} else={}/>",
                counts[0], counts[1], counts[2],
            );
        }
        writeln!(
            f,
            "<branches total={} if={} elseif={} else={}>",
            self.num_branches(),
            counts[0],
            counts[1],
            counts[2],
        )?;
        for (index, node) in self.all_branches().iter().enumerate() {
            writeln!(
                f,
                "  <branch id={} kind={} frame={} parent={} context={} body={}/>",
                index,
                node.kind().tag(),
                opt(node.stack_frame()),
                opt(node.parent_if().map(usize::from)),
                opt(node.context()),
                node.body().len(),
            )?;
        }
        write!(f, "</branches>")
    }
}

impl fmt::Display for GateQubitTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "<gate-qubits tracked=0/>");
        }
        writeln!(f, "<gate-qubits tracked={}>", self.len())?;
        for name in self.tracked() {
            writeln!(f, "  <qubit name={name:?}/>")?;
        }
        write!(f, "</gate-qubits>")
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "<session version={} loose={} errors={}>",
            opt(self.version()),
            self.allow_redeclarations(),
            self.errors.len(),
        )?;
        for block in [
            self.contexts.to_string(),
            self.symbols.to_string(),
            self.declarations.to_string(),
            self.named_types.to_string(),
            self.flow.to_string(),
            self.gate_qubits.to_string(),
        ] {
            for line in block.lines() {
                writeln!(f, "  {line}")?;
            }
        }
        write!(f, "</session>")
    }
}
