// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Defines the data structures representing the types that can be bound to identifiers
// during declaration tracking and symbol resolution.
// This file should include all code that classifies types. In particular the
// redeclaration policy is implemented here. Expression typing and casting are out of
// scope for this crate; only the classes of types matter to the resolver.

// Tuple fields (Option<u32>, IsConst) are (width, is_const).
// width == None means no width specified. The language sometimes says "machine" int, etc.
// For register types the width is the register length rather than a bit width.

use boolenum::BoolEnum;

#[derive(BoolEnum, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IsConst {
    True,
    False,
}

/// Bit width of primitive classical types, length of register types.
pub type Width = Option<u32>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    // Scalar types
    Bit(IsConst),
    Bool(IsConst),
    Int(Width, IsConst),
    UInt(Width, IsConst),
    Float(Width, IsConst),
    Decimal(Width, IsConst),
    Angle(Width, IsConst),

    // Registers
    BitArray(Width, IsConst),
    QubitArray(Width),

    // Quantum scalars
    Qubit,
    HardwareQubit,
    // A qubit parameter of a gate or defcal. Declared as `Qubit`, re-classified on
    // entry to the gate body, and erased again when the body is closed.
    GateQubitParam,

    // Types whose declarations are registered by name rather than by storage.
    Gate,
    Defcal,
    Function,
    Kernel,

    // Undefined means a type that is erroneously non-existent. This is not the same as unknown.
    // The prototypical application is trying to resolve an unbound identifier.
    Undefined,
}

impl Type {
    /// Return true if the type is a classical type and is not a register type.
    pub fn is_scalar(&self) -> bool {
        use Type::*;
        matches!(
            self,
            Bit(..) | Bool(..) | Int(..) | UInt(..) | Float(..) | Decimal(..) | Angle(..)
        )
    }

    /// Return `Some(width)` if the type has a width `width`. Otherwise return `None`.
    /// The width of scalar types that support bit width is the bit width if present.
    /// The width of registers is the length of the register.
    pub fn width(&self) -> Width {
        use Type::*;
        match self {
            Int(w, _) | UInt(w, _) | Float(w, _) | Decimal(w, _) | Angle(w, _) => *w,
            BitArray(w, _) => *w,
            QubitArray(w) => *w,
            _ => None,
        }
    }

    /// Return `true` if the type has the attribute `const`.
    /// Types that can never be rebound, such as qubits and gates, are always `const`.
    pub fn is_const(&self) -> bool {
        use Type::*;
        match self {
            Bit(c)
            | Bool(c)
            | Int(_, c)
            | UInt(_, c)
            | Float(_, c)
            | Decimal(_, c)
            | Angle(_, c)
            | BitArray(_, c) => matches!(*c, IsConst::True),
            _ => true,
        }
    }

    /// Return `true` if the type is a qubit, a qubit register, or a gate-local
    /// qubit parameter.
    pub fn is_quantum(&self) -> bool {
        use Type::*;
        matches!(self, Qubit | QubitArray(..) | HardwareQubit | GateQubitParam)
    }

    /// Return `true` if a declaration of this type may be repeated for the same
    /// name in the same scope. Plain classical storage can be redeclared; types
    /// that confer identity, such as qubits, gates, and routines, cannot.
    pub fn allows_redeclaration(&self) -> bool {
        use Type::*;
        matches!(
            self,
            Bit(..) | Bool(..) | Int(..) | UInt(..) | Float(..) | Decimal(..) | Angle(..)
                | BitArray(..)
        )
    }

    /// Return `true` if declarations of this type are registered by name,
    /// with overloads kept apart by a mangled name.
    pub fn is_named_type(&self) -> bool {
        use Type::*;
        matches!(self, Gate | Defcal | Function | Kernel)
    }
}

#[test]
fn test_type_enum1() {
    let t = Type::Bit(IsConst::False);
    assert!(!t.is_const());
    assert!(t.width().is_none());
    assert!(!t.is_quantum());
    assert!(t.is_scalar());
    assert!(t.allows_redeclaration());
}

#[test]
fn test_type_enum2() {
    let t = Type::Qubit;
    assert!(t.is_const());
    assert!(t.width().is_none());
    assert!(t.is_quantum());
    assert!(!t.is_scalar());
    assert!(!t.allows_redeclaration());
}

#[test]
fn test_type_enum3() {
    let t = Type::Gate;
    assert!(t.is_const());
    assert!(t.is_named_type());
    assert!(!t.allows_redeclaration());
    let t = Type::QubitArray(Some(5));
    assert_eq!(t.width(), Some(5));
    assert!(!t.is_named_type());
}
