// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Tracks the qubit parameters of the gate or defcal body currently being
// resolved. A plain qubit identifier declared in such a body is re-classified
// as a gate qubit parameter; that re-classification is a type-level side
// effect, so closing the body's context is not enough to undo it. The tracker
// remembers which names were re-classified and strips their entries from the
// symbol table when the body is left.

use crate::nodes::Identifier;
use crate::symbols::{SymbolError, SymbolTable, SymbolType};
use crate::types::Type;

#[derive(Clone, Debug, Default)]
pub struct GateQubitTracker {
    tracked: Vec<String>,
}

impl GateQubitTracker {
    pub fn new() -> GateQubitTracker {
        GateQubitTracker::default()
    }

    /// Track `identifier` as a candidate for erasure at body exit. Only
    /// gate-local quantum identifiers are tracked; hardware qubits keep their
    /// process-wide identity and are never tracked. Returns `true` if the
    /// identifier was newly tracked.
    pub fn insert(&mut self, identifier: &Identifier) -> bool {
        if !identifier.is_gate_local() || identifier.is_hardware_qubit() {
            return false;
        }
        if !identifier.typ().is_quantum() {
            return false;
        }
        if self.exists(identifier.name()) {
            return false;
        }
        self.tracked.push(identifier.name().to_string());
        true
    }

    pub fn exists(&self, name: &str) -> bool {
        self.tracked.iter().any(|tracked| tracked == name)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }

    /// The tracked names in insertion order.
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Stop tracking `name` and remove its symbol table entries. Fails only if
    /// `name` was never tracked.
    pub fn erase_one(&mut self, name: &str, symbols: &mut SymbolTable) -> Result<(), SymbolError> {
        let position = match self.tracked.iter().position(|tracked| tracked == name) {
            Some(position) => position,
            None => return Err(SymbolError::MissingBinding),
        };
        Self::release(name, symbols);
        self.tracked.remove(position);
        Ok(())
    }

    /// Remove every tracked name and its symbol table entries. Called once
    /// when the body is left.
    pub fn erase_all(&mut self, symbols: &mut SymbolTable) {
        let tracked = std::mem::take(&mut self.tracked);
        for name in &tracked {
            Self::release(name, symbols);
        }
    }

    // Remove the table entries owned by the body for one tracked name. The
    // typed erase operations refuse entries of the wrong class, which is what
    // leaves referenced qubit registers, gates, and defcals untouched.
    fn release(name: &str, symbols: &mut SymbolTable) {
        match symbols.alias_target(name).map(str::to_string) {
            Some(canonical) => {
                // The alias's canonical target loses both its parameter entry
                // and any local qubit entry, and the alias binding itself is
                // dropped, so neither leaks past body exit.
                let _ = symbols.erase_gate_qubit_param(&canonical, None, &Type::GateQubitParam);
                let _ = symbols.erase_local_qubit(&canonical);
                symbols.remove_alias(name);
            }
            None => {
                let typ = match symbols.lookup_local(name) {
                    Ok(record) => record.symbol_type().clone(),
                    Err(_) => return,
                };
                match typ {
                    Type::GateQubitParam => {
                        let _ =
                            symbols.erase_gate_qubit_param(name, None, &Type::GateQubitParam);
                    }
                    Type::Qubit | Type::HardwareQubit => {
                        let _ = symbols.erase_local_qubit(name);
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.tracked.clear();
    }
}
