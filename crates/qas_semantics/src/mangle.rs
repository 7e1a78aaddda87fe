// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// The name mangler produces a canonical identity string for a declaration once
// its type and shape are final. The string keeps same-named overloads of named
// types apart and shows up in diagnostics and dumps. It is never the lookup
// key; lookups use the identifier's own name.

use crate::nodes::Identifier;
use crate::types::Type;
use std::fmt;

pub trait NameMangler: fmt::Debug {
    /// Produce the canonical identity string for `identifier`. Must be
    /// deterministic in the identifier's name, type, and width.
    fn mangle(&self, identifier: &Identifier) -> String;
}

/// The scheme used when no other mangler is configured: a `_Q` prefix, a short
/// type code, the width if the type carries one, and the length-prefixed name.
/// `gate h` mangles to `_QG_1h`; a `defcal` named `rx` to `_QD_2rx`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultMangler;

impl NameMangler for DefaultMangler {
    fn mangle(&self, identifier: &Identifier) -> String {
        let name = identifier.name();
        let code = type_code(identifier.typ());
        match identifier.typ().width() {
            Some(width) => format!("_Q{}{}_{}{}", code, width, name.len(), name),
            None => format!("_Q{}_{}{}", code, name.len(), name),
        }
    }
}

fn type_code(typ: &Type) -> &'static str {
    use Type::*;
    match typ {
        Bit(..) => "c",
        Bool(..) => "b",
        Int(..) => "i",
        UInt(..) => "u",
        Float(..) => "f",
        Decimal(..) => "d",
        Angle(..) => "a",
        BitArray(..) => "Ac",
        QubitArray(..) => "AQ",
        Qubit => "Q",
        HardwareQubit => "H",
        GateQubitParam => "P",
        Gate => "G",
        Defcal => "D",
        Function => "F",
        Kernel => "K",
        Undefined => "U",
    }
}
