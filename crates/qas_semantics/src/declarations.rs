// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// The declaration registries. `DeclarationBuilder` records every accepted
// declaration in program order and by name. `NamedTypeDeclarationBuilder` does
// the same for gates, defcals, functions, and kernels, whose same-named
// overloads are kept apart by mangled name rather than rejected.

use crate::context::ContextIndex;
use crate::nodes::{ConstValue, Declaration};
use crate::types::Type;
use hashbrown::HashMap;

/// Index of a declaration in a builder's arena. Stays valid for the life of
/// the session; transfers move an id between maps, never invalidate it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DeclId(usize);

impl From<DeclId> for usize {
    fn from(decl_id: DeclId) -> usize {
        decl_id.0
    }
}

/// An aggregate map of declarations by name, the target of transfers out of a
/// closed scope. A function's collected parameters and locals live in one.
pub type DeclarationMap = HashMap<String, Vec<DeclId>>;

/// Records ordinary declarations, first declaration wins.
///
/// Three structures are kept in step: the arena of declarations, the list in
/// program order, and the map from name to declaration ids. The map is
/// multi-valued because an accepted redeclaration adds a second entry for the
/// same name.
#[derive(Clone, Debug, Default)]
pub struct DeclarationBuilder {
    decls: Vec<Declaration>,
    order: Vec<DeclId>,
    by_name: HashMap<String, Vec<DeclId>>,
    /// Names declared compile-time constant, independent of the ordinary
    /// redeclaration bookkeeping.
    consts: HashMap<String, DeclId>,
}

impl DeclarationBuilder {
    pub fn new() -> DeclarationBuilder {
        DeclarationBuilder::default()
    }

    /// Record `decl`. If a declaration for the same name already exists and
    /// `decl`'s identifier is not marked as an accepted redeclaration, nothing
    /// is recorded and `None` is returned.
    pub fn append(&mut self, decl: Declaration) -> Option<DeclId> {
        let name = decl.name().to_string();
        if self.by_name.contains_key(&name) && !decl.identifier().is_redeclaration() {
            return None;
        }
        let decl_id = DeclId(self.decls.len());
        self.decls.push(decl);
        self.order.push(decl_id);
        self.by_name.entry(name).or_default().push(decl_id);
        Some(decl_id)
    }

    /// Map probe used to decide whether a declaration needs the redeclaration
    /// policy applied. With `context` the probe is narrowed to declarations
    /// owned by that context, so shadowing an outer name does not count.
    pub fn decl_already_exists(&self, name: &str, context: Option<ContextIndex>) -> bool {
        match self.by_name.get(name) {
            None => false,
            Some(ids) => match context {
                None => true,
                Some(context) => ids
                    .iter()
                    .any(|decl_id| self.decls[decl_id.0].context() == context),
            },
        }
    }

    /// Register an already-appended declaration in the constant registry. The
    /// registry is keyed by name; the first registration for a name wins.
    pub fn const_append(&mut self, decl_id: DeclId) {
        let name = self.decls[decl_id.0].name().to_string();
        self.consts.entry(name).or_insert(decl_id);
    }

    pub fn is_const_declaration(&self, name: &str) -> bool {
        self.consts.contains_key(name)
    }

    /// The recorded value of the constant `name`, if `name` is one.
    pub fn const_value(&self, name: &str) -> Option<&ConstValue> {
        self.consts
            .get(name)
            .and_then(|decl_id| self.decls[decl_id.0].const_value())
    }

    /// Every declaration recorded under `name`, in declaration order.
    pub fn find_range(&self, name: &str) -> &[DeclId] {
        match self.by_name.get(name) {
            Some(ids) => ids.as_slice(),
            None => &[],
        }
    }

    pub fn get(&self, decl_id: DeclId) -> Option<&Declaration> {
        self.decls.get(decl_id.0)
    }

    /// Move the declarations owned by `context` out of the list and the map
    /// and into the aggregate `into`. The arena keeps the declarations, so
    /// transferred ids stay valid. Returns the number of declarations moved.
    pub fn transfer_context(&mut self, context: ContextIndex, into: &mut DeclarationMap) -> usize {
        let moved: Vec<DeclId> = self
            .order
            .iter()
            .filter(|decl_id| self.decls[decl_id.0].context() == context)
            .copied()
            .collect();
        if moved.is_empty() {
            return 0;
        }
        let decls = &self.decls;
        self.order
            .retain(|decl_id| decls[decl_id.0].context() != context);
        for decl_id in &moved {
            let name = self.decls[decl_id.0].name().to_string();
            if let Some(ids) = self.by_name.get_mut(&name) {
                ids.retain(|other| other != decl_id);
                if ids.is_empty() {
                    self.by_name.remove(&name);
                }
            }
            into.entry(name).or_default().push(*decl_id);
        }
        moved.len()
    }

    /// The recorded declarations in program order. Transferred declarations
    /// are not included.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.order.iter().map(move |decl_id| &self.decls[decl_id.0])
    }

    /// The number of declarations in the list.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn num_consts(&self) -> usize {
        self.consts.len()
    }

    pub fn clear(&mut self) {
        self.decls.clear();
        self.order.clear();
        self.by_name.clear();
        self.consts.clear();
    }
}

use std::ops::Index;
impl Index<DeclId> for DeclarationBuilder {
    type Output = Declaration;

    fn index(&self, decl_id: DeclId) -> &Self::Output {
        &self.decls[decl_id.0]
    }
}

/// Records declarations of named types: gates, defcals, functions, kernels.
///
/// Unlike ordinary declarations, same-named entries are admitted as overloads.
/// Only an exact duplicate, matching in name, type, and mangled name, is
/// refused. Callers mangle the identifier before appending.
#[derive(Clone, Debug, Default)]
pub struct NamedTypeDeclarationBuilder {
    decls: Vec<Declaration>,
    order: Vec<DeclId>,
    by_name: HashMap<String, Vec<DeclId>>,
}

impl NamedTypeDeclarationBuilder {
    pub fn new() -> NamedTypeDeclarationBuilder {
        NamedTypeDeclarationBuilder::default()
    }

    /// Record the declaration of a named type. Declarations whose type is not
    /// a named type, and exact duplicates, are refused with `None`.
    pub fn append(&mut self, decl: Declaration) -> Option<DeclId> {
        if !decl.typ().is_named_type() {
            return None;
        }
        if self.exists_matching(decl.name(), decl.typ(), decl.identifier().mangled()) {
            return None;
        }
        let name = decl.name().to_string();
        let decl_id = DeclId(self.decls.len());
        self.decls.push(decl);
        self.order.push(decl_id);
        self.by_name.entry(name).or_default().push(decl_id);
        Some(decl_id)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// `true` if a declaration under `name` matches `typ` and `mangled`
    /// exactly. This is the duplicate probe; overloads differ in at least the
    /// mangled name.
    pub fn exists_matching(&self, name: &str, typ: &Type, mangled: Option<&str>) -> bool {
        match self.by_name.get(name) {
            None => false,
            Some(ids) => ids.iter().any(|decl_id| {
                let decl = &self.decls[decl_id.0];
                decl.typ() == typ && decl.identifier().mangled() == mangled
            }),
        }
    }

    /// Every overload recorded under `name`, in declaration order.
    pub fn find_range(&self, name: &str) -> &[DeclId] {
        match self.by_name.get(name) {
            Some(ids) => ids.as_slice(),
            None => &[],
        }
    }

    pub fn get(&self, decl_id: DeclId) -> Option<&Declaration> {
        self.decls.get(decl_id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.order.iter().map(move |decl_id| &self.decls[decl_id.0])
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn clear(&mut self) {
        self.decls.clear();
        self.order.clear();
        self.by_name.clear();
    }
}

impl Index<DeclId> for NamedTypeDeclarationBuilder {
    type Output = Declaration;

    fn index(&self, decl_id: DeclId) -> &Self::Output {
        &self.decls[decl_id.0]
    }
}
