// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Data carried by the parser into the resolver: identifiers as they appear at
// declaration and use sites, literal values of compile-time constants, and the
// declaration records built from them.

use crate::context::ContextIndex;
use crate::symbols::{ScopeFlag, SymbolId};
use crate::types::Type;
use crate::TextRange;

/// Names beginning with this sigil refer to physical hardware qubits. They are
/// never tracked as gate-local qubit parameters and are never mangled.
pub const HARDWARE_QUBIT_SIGIL: char = '$';

/// An identifier at its declaration or use site.
///
/// The parser constructs one of these per name it recognizes. The resolver
/// stamps it with a scope, possibly re-classifies its type, marks accepted
/// redeclarations, caches a mangled name, and records the symbol it was bound
/// to. A bound `Identifier` is then wrapped in a [`Declaration`].
#[derive(Clone, Debug, PartialEq)]
pub struct Identifier {
    name: String,
    typ: Type,
    range: TextRange,
    scope: ScopeFlag,
    gate_local: bool,
    redeclaration: bool,
    mangled: Option<String>,
    symbol: Option<SymbolId>,
}

impl Identifier {
    pub fn new<T: ToString>(name: T, typ: Type, range: TextRange) -> Identifier {
        Identifier {
            name: name.to_string(),
            typ,
            range,
            scope: ScopeFlag::Local,
            gate_local: false,
            redeclaration: false,
            mangled: None,
            symbol: None,
        }
    }

    /// An identifier declared inside a gate or defcal body. Quantum parameters
    /// of such bodies are re-classified and tracked on declaration.
    pub fn new_gate_local<T: ToString>(name: T, typ: Type, range: TextRange) -> Identifier {
        let mut identifier = Identifier::new(name, typ, range);
        identifier.gate_local = true;
        identifier
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn typ(&self) -> &Type {
        &self.typ
    }

    pub(crate) fn set_typ(&mut self, typ: Type) {
        self.typ = typ;
    }

    pub fn range(&self) -> TextRange {
        self.range
    }

    pub fn scope(&self) -> ScopeFlag {
        self.scope
    }

    pub(crate) fn set_scope(&mut self, scope: ScopeFlag) {
        self.scope = scope;
    }

    pub fn is_gate_local(&self) -> bool {
        self.gate_local
    }

    pub(crate) fn set_gate_local(&mut self, gate_local: bool) {
        self.gate_local = gate_local;
    }

    /// `true` if the name carries the hardware-qubit sigil.
    pub fn is_hardware_qubit(&self) -> bool {
        self.name.starts_with(HARDWARE_QUBIT_SIGIL)
    }

    /// `true` if this declaration re-declares an existing name and was accepted
    /// by the redeclaration policy.
    pub fn is_redeclaration(&self) -> bool {
        self.redeclaration
    }

    pub(crate) fn mark_redeclaration(&mut self) {
        self.redeclaration = true;
    }

    pub fn mangled(&self) -> Option<&str> {
        self.mangled.as_deref()
    }

    /// Cache the mangled name. The first value stored wins; later calls are
    /// ignored so the mangled name is stable once computed.
    pub fn set_mangled<T: ToString>(&mut self, mangled: T) {
        if self.mangled.is_none() {
            self.mangled = Some(mangled.to_string());
        }
    }

    /// The symbol this identifier was bound to, if resolution has happened.
    pub fn symbol(&self) -> Option<&SymbolId> {
        self.symbol.as_ref()
    }

    pub(crate) fn bind_symbol(&mut self, symbol: SymbolId) {
        self.symbol = Some(symbol);
    }
}

/// Value of a compile-time constant, recorded with the declaration so that
/// later stages can fold it without consulting an evaluator.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ConstValue {
    Bool(bool),
    // The magnitude and sign are stored separately. `sign == true` means non-negative.
    Int { value: u128, sign: bool },
    // Float is stored as the string the parser saw. No rounding happens here.
    Float(String),
}

impl ConstValue {
    pub fn int(value: u128) -> ConstValue {
        ConstValue::Int { value, sign: true }
    }

    pub fn float<T: ToString>(value: T) -> ConstValue {
        ConstValue::Float(value.to_string())
    }
}

/// One accepted declaration: a bound identifier together with the context it
/// was declared in and, for constants, the recorded value.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    identifier: Identifier,
    context: ContextIndex,
    const_value: Option<ConstValue>,
}

impl Declaration {
    pub fn new(identifier: Identifier, context: ContextIndex) -> Declaration {
        Declaration {
            identifier,
            context,
            const_value: None,
        }
    }

    pub fn new_const(
        identifier: Identifier,
        context: ContextIndex,
        value: ConstValue,
    ) -> Declaration {
        Declaration {
            identifier,
            context,
            const_value: Some(value),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    pub fn context(&self) -> ContextIndex {
        self.context
    }

    pub fn const_value(&self) -> Option<&ConstValue> {
        self.const_value.as_ref()
    }

    pub fn name(&self) -> &str {
        self.identifier.name()
    }

    pub fn typ(&self) -> &Type {
        self.identifier.typ()
    }

    pub fn range(&self) -> TextRange {
        self.identifier.range()
    }
}
