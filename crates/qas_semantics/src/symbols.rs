// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Defines data structures and api for symbols, symbol tables, and aliases.

use crate::context::ContextIndex;
use crate::nodes::ConstValue;
use crate::types::{IsConst, Type, Width};
use hashbrown::HashMap;

// * "The lifetime of each identifier begins when it is declared, and ends
//    at the completion of the scope it was declared in."
//
// Global declarations live for the whole translation unit, so the table keeps
// two partitions rather than a stack of scope maps: one for global entries and
// one for local entries. Shadowing is per name. Each name maps to a stack of
// symbol ids whose last element is the innermost live entry.

// This wrapped `usize` serves as
// * A unique label for instances of `Symbol`.
// * An index into `all_symbols: Vec<Symbol>`.
// * The values in the partition maps.
//
// I am assuming that we can clone `SymbolId` willy-nilly
// because it is no more expensive than a reference.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SymbolId(usize);

impl SymbolId {
    pub(crate) fn new(index: usize) -> SymbolId {
        SymbolId(index)
    }
}

// Keeps the wrapped index available to consumers that serialize symbols.
impl From<SymbolId> for usize {
    fn from(symid: SymbolId) -> usize {
        symid.0
    }
}

/// Whether an entry lives in the global partition or the local partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeFlag {
    Global,
    Local,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SymbolError {
    MissingBinding,
    AlreadyBound,
    /// A typed erase found an entry of a different class than requested.
    WrongType,
}

pub type SymbolIdResult = Result<SymbolId, SymbolError>;
pub type SymbolRecordResult<'a> = Result<SymbolRecord<'a>, SymbolError>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: String,
    typ: Type,
    value: Option<ConstValue>,
    scope: ScopeFlag,
    context: ContextIndex,
}

pub trait SymbolType {
    /// Return the `Type` of `symbol`, which is `Type::Undefined` if
    /// `self` is an `Option<T>` with value `None`.
    fn symbol_type(&self) -> &Type;
}

impl Symbol {
    pub fn new<T: ToString>(
        name: T,
        typ: &Type,
        scope: ScopeFlag,
        context: ContextIndex,
    ) -> Symbol {
        Symbol {
            name: name.to_string(),
            typ: typ.clone(),
            value: None,
            scope,
            context,
        }
    }

    pub fn new_const<T: ToString>(
        name: T,
        typ: &Type,
        value: ConstValue,
        scope: ScopeFlag,
        context: ContextIndex,
    ) -> Symbol {
        Symbol {
            name: name.to_string(),
            typ: typ.clone(),
            value: Some(value),
            scope,
            context,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&ConstValue> {
        self.value.as_ref()
    }

    pub fn scope(&self) -> ScopeFlag {
        self.scope
    }

    /// The declaration context that owns this entry.
    pub fn context(&self) -> ContextIndex {
        self.context
    }
}

impl SymbolType for Symbol {
    fn symbol_type(&self) -> &Type {
        &self.typ
    }
}

/// A structure for temporarily collecting information about a symbol.
/// * `Symbol` contains the name, the `Type`, and the owning context.
/// * `symbol_id` wraps a `usize` that serves as
///     * a unique label
///     * the index into the `Vec` of all symbols.
///     * the value in the partition maps: `name` -> `symbol_id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolRecord<'a> {
    symbol: &'a Symbol,
    symbol_id: SymbolId,
}

impl SymbolRecord<'_> {
    pub fn new(symbol: &Symbol, symbol_id: SymbolId) -> SymbolRecord<'_> {
        SymbolRecord { symbol, symbol_id }
    }

    pub fn symbol_id(&self) -> SymbolId {
        self.symbol_id.clone()
    }

    pub fn symbol(&self) -> &Symbol {
        self.symbol
    }

    pub fn name(&self) -> &str {
        self.symbol.name()
    }

    pub fn context(&self) -> ContextIndex {
        self.symbol.context()
    }

    pub fn scope(&self) -> ScopeFlag {
        self.symbol.scope()
    }
}

// This trait is a bit heavy weight for what it does.
pub trait SymbolErrorTrait {
    fn to_symbol_id(&self) -> SymbolIdResult;
    fn as_tuple(&self) -> (SymbolIdResult, Type);
}

impl SymbolErrorTrait for SymbolRecordResult<'_> {
    fn to_symbol_id(&self) -> SymbolIdResult {
        self.clone().map(|record| record.symbol_id)
    }

    fn as_tuple(&self) -> (SymbolIdResult, Type) {
        (self.to_symbol_id(), self.symbol_type().clone())
    }
}

impl SymbolType for Option<SymbolRecord<'_>> {
    fn symbol_type(&self) -> &Type {
        match self {
            Some(symbol_record) => symbol_record.symbol_type(),
            None => &Type::Undefined,
        }
    }
}

impl SymbolType for Result<SymbolRecord<'_>, SymbolError> {
    fn symbol_type(&self) -> &Type {
        match self {
            Ok(symbol_record) => symbol_record.symbol_type(),
            Err(_) => &Type::Undefined,
        }
    }
}

impl SymbolType for SymbolRecord<'_> {
    fn symbol_type(&self) -> &Type {
        self.symbol.symbol_type()
    }
}

/// A `SymbolTable` is a pair of partition maps from `name` to a stack of
/// `SymbolId`s, together with a `Vec` mapping `SymbolId as usize` to `Symbol`s.
/// Erasing removes entries from the partitions only. The `Vec` of all symbols
/// never shrinks, so a stored `SymbolId` stays valid for the whole session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolTable {
    /// A list of all `Symbol`s that ever existed. Indices are `SymbolId as usize`.
    all_symbols: Vec<Symbol>,
    global: HashMap<String, Vec<SymbolId>>,
    local: HashMap<String, Vec<SymbolId>>,
    /// Alias names mapped to the canonical name they resolve to. Targets are
    /// stored fully resolved, so lookup needs a single indirection.
    aliases: HashMap<String, String>,
}

impl SymbolTable {
    /// Create a new `SymbolTable` initialized with the builtin constants.
    pub fn new() -> SymbolTable {
        let mut symbol_table = SymbolTable {
            all_symbols: Vec::<Symbol>::new(),
            global: HashMap::new(),
            local: HashMap::new(),
            aliases: HashMap::new(),
        };
        symbol_table.seed_builtin_consts();
        symbol_table
    }

    // The mathematical constants known to every translation unit, under both
    // ascii and unicode spellings.
    fn seed_builtin_consts(&mut self) {
        use std::f64::consts::{E, PI, TAU};
        let typ = Type::Float(Some(64), IsConst::True);
        for (name, value) in [
            ("pi", PI),
            ("π", PI),
            ("tau", TAU),
            ("τ", TAU),
            ("euler", E),
            ("ℇ", E),
        ] {
            let symbol = Symbol::new_const(
                name,
                &typ,
                ConstValue::Float(value.to_string()),
                ScopeFlag::Global,
                ContextIndex::GLOBAL,
            );
            self.insert(symbol);
        }
    }

    /// Add `symbol` to its partition and return the fresh id. The table admits
    /// duplicate names; the innermost entry of a name shadows the others. The
    /// redeclaration policy is enforced by the caller, not here.
    pub fn insert(&mut self, symbol: Symbol) -> SymbolId {
        let symbol_id = SymbolId::new(self.all_symbols.len());
        let name = symbol.name().to_string();
        let partition = match symbol.scope() {
            ScopeFlag::Global => &mut self.global,
            ScopeFlag::Local => &mut self.local,
        };
        partition.entry(name).or_default().push(symbol_id.clone());
        self.all_symbols.push(symbol);
        symbol_id
    }

    /// Bind `alias` to `target`. If `target` is itself an alias the stored
    /// mapping is flattened to the canonical name.
    pub fn insert_alias<T: ToString>(&mut self, alias: T, target: &str) {
        let alias = alias.to_string();
        let canonical = self.resolve_alias(target).to_string();
        if alias == canonical {
            return;
        }
        self.aliases.insert(alias, canonical);
    }

    /// The canonical name for `name`: the alias target if `name` is an alias,
    /// otherwise `name` itself.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        match self.aliases.get(name) {
            Some(canonical) => canonical.as_str(),
            None => name,
        }
    }

    pub fn is_alias(&self, name: &str) -> bool {
        self.aliases.contains_key(name)
    }

    /// Drop the alias binding for `name`, returning the canonical name it
    /// pointed at. The canonical entry itself is untouched.
    pub fn remove_alias(&mut self, name: &str) -> Option<String> {
        self.aliases.remove(name)
    }

    pub fn alias_target(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(|canonical| canonical.as_str())
    }

    /// Look up `name`, local partition first. Within a partition the innermost
    /// entry wins. Aliases are resolved before the partitions are consulted.
    pub fn lookup(&self, name: &str) -> Result<SymbolRecord<'_>, SymbolError> {
        let name = self.resolve_alias(name);
        for partition in [&self.local, &self.global] {
            if let Some(symbol_id) = partition.get(name).and_then(|ids| ids.last()) {
                let symbol = &self.all_symbols[symbol_id.0];
                return Ok(SymbolRecord::new(symbol, symbol_id.clone()));
            }
        }
        Err(SymbolError::MissingBinding) // `name` not found in either partition.
    }

    /// Look up `name` in the local partition only.
    pub fn lookup_local(&self, name: &str) -> Result<SymbolRecord<'_>, SymbolError> {
        let name = self.resolve_alias(name);
        match self.local.get(name).and_then(|ids| ids.last()) {
            Some(symbol_id) => Ok(SymbolRecord::new(
                &self.all_symbols[symbol_id.0],
                symbol_id.clone(),
            )),
            None => Err(SymbolError::MissingBinding),
        }
    }

    /// Every live entry for `name`: global entries in insertion order, then
    /// local entries in insertion order. The last record is the one `lookup`
    /// would return if any local entry exists.
    pub fn lookup_range(&self, name: &str) -> Vec<SymbolRecord<'_>> {
        let name = self.resolve_alias(name);
        let mut records = Vec::new();
        for partition in [&self.global, &self.local] {
            if let Some(ids) = partition.get(name) {
                for symbol_id in ids {
                    records.push(SymbolRecord::new(
                        &self.all_symbols[symbol_id.0],
                        symbol_id.clone(),
                    ));
                }
            }
        }
        records
    }

    pub fn contains_name(&self, name: &str) -> bool {
        let name = self.resolve_alias(name);
        self.local.contains_key(name) || self.global.contains_key(name)
    }

    /// Remove the innermost local entry for `name`. A same-named global entry,
    /// if present, becomes visible to `lookup` again. The erased id is
    /// returned; the symbol itself stays in `all_symbols`.
    pub fn erase_local_symbol(&mut self, name: &str) -> Result<SymbolId, SymbolError> {
        let name = self.resolve_alias(name).to_string();
        let ids = self
            .local
            .get_mut(&name)
            .ok_or(SymbolError::MissingBinding)?;
        let symbol_id = match ids.pop() {
            Some(symbol_id) => symbol_id,
            None => return Err(SymbolError::MissingBinding),
        };
        if ids.is_empty() {
            self.local.remove(&name);
        }
        self.prune_aliases_for(&name);
        Ok(symbol_id)
    }

    /// Remove the innermost local entry for `name`, which must be of a quantum
    /// class. Classical entries are refused with `WrongType`.
    pub fn erase_local_qubit(&mut self, name: &str) -> Result<SymbolId, SymbolError> {
        let canonical = self.resolve_alias(name).to_string();
        let symbol_id = match self.local.get(&canonical).and_then(|ids| ids.last()) {
            Some(symbol_id) => symbol_id.clone(),
            None => return Err(SymbolError::MissingBinding),
        };
        if !self.all_symbols[symbol_id.0].symbol_type().is_quantum() {
            return Err(SymbolError::WrongType);
        }
        self.erase_local_symbol(&canonical)
    }

    /// Remove the innermost local entry for `name`, which must be a gate-local
    /// qubit parameter of the given width and type. Entries of any other class
    /// are refused, so a qubit register or gate referenced from a gate body
    /// cannot be erased by the end-of-body sweep.
    pub fn erase_gate_qubit_param(
        &mut self,
        name: &str,
        width: Width,
        typ: &Type,
    ) -> Result<SymbolId, SymbolError> {
        if !matches!(typ, Type::GateQubitParam) {
            return Err(SymbolError::WrongType);
        }
        let canonical = self.resolve_alias(name).to_string();
        let symbol_id = match self.local.get(&canonical).and_then(|ids| ids.last()) {
            Some(symbol_id) => symbol_id.clone(),
            None => return Err(SymbolError::MissingBinding),
        };
        let symbol = &self.all_symbols[symbol_id.0];
        if symbol.symbol_type() != typ || symbol.symbol_type().width() != width {
            return Err(SymbolError::WrongType);
        }
        self.erase_local_symbol(&canonical)
    }

    /// Remove every local entry owned by `context`, wherever it sits in a
    /// shadow stack. Returns the number of entries removed.
    pub fn purge_context(&mut self, context: ContextIndex) -> usize {
        let mut removed = 0;
        let all_symbols = &self.all_symbols;
        self.local.retain(|_, ids| {
            ids.retain(|symbol_id| {
                let keep = all_symbols[symbol_id.0].context() != context;
                if !keep {
                    removed += 1;
                }
                keep
            });
            !ids.is_empty()
        });
        if removed > 0 {
            self.prune_dangling_aliases();
        }
        removed
    }

    // An alias stays only while some entry for its canonical name is live.
    fn prune_aliases_for(&mut self, name: &str) {
        if !self.local.contains_key(name) && !self.global.contains_key(name) {
            self.aliases.retain(|_, canonical| canonical != name);
        }
    }

    fn prune_dangling_aliases(&mut self) {
        let local = &self.local;
        let global = &self.global;
        self.aliases
            .retain(|_, canonical| local.contains_key(canonical) || global.contains_key(canonical));
    }

    /// Return the number of live entries in the global partition.
    pub fn len_global(&self) -> usize {
        self.global.values().map(|ids| ids.len()).sum()
    }

    /// Return the number of live entries in the local partition.
    pub fn len_local(&self) -> usize {
        self.local.values().map(|ids| ids.len()).sum()
    }

    /// The number of symbols ever created, live or erased.
    pub fn num_symbols(&self) -> usize {
        self.all_symbols.len()
    }

    pub fn num_aliases(&self) -> usize {
        self.aliases.len()
    }

    /// Reset to the startup state: both partitions empty of user entries, no
    /// aliases, builtin constants re-seeded. Safe to call repeatedly.
    pub fn clear(&mut self) {
        *self = SymbolTable::new();
    }

    pub(crate) fn global_partition(&self) -> &HashMap<String, Vec<SymbolId>> {
        &self.global
    }

    pub(crate) fn local_partition(&self) -> &HashMap<String, Vec<SymbolId>> {
        &self.local
    }

    pub(crate) fn alias_map(&self) -> &HashMap<String, String> {
        &self.aliases
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

use std::ops::Index;
impl Index<&SymbolId> for SymbolTable {
    type Output = Symbol;

    // Interface for retrieving `Symbol`s from `all_symbols`
    fn index(&self, symbol_id: &SymbolId) -> &Self::Output {
        &self.all_symbols[symbol_id.0]
    }
}
