// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

//! One resolution session per translation unit. `Session` owns the context
//! tracker, the symbol table, both declaration builders, the gate-qubit
//! tracker, the branch graph, and the diagnostic list, and coordinates the
//! actions that touch more than one of them. The components are public fields;
//! anything that only reads or writes a single component may go through the
//! field directly, the way the parser's semantic actions do.
//!
//! Internal consistency failures, such as closing a context out of order, are
//! recorded at `InternalCompilerError` severity and then panic. They indicate
//! a defect in the driving parser and are never recovered from.

use crate::context::{
    ContextError, ContextGuard, ContextIndex, ContextKind, ContextTracker, DeclarationContext,
};
use crate::declarations::{DeclarationBuilder, DeclId, NamedTypeDeclarationBuilder};
use crate::flow::{BranchGraph, BranchId, BranchKind, FlowError, StmtList};
use crate::gate_qubits::GateQubitTracker;
use crate::mangle::{DefaultMangler, NameMangler};
use crate::nodes::{ConstValue, Declaration, Identifier};
use crate::semantic_error::{SemanticErrorKind, SemanticErrorList};
use crate::symbols::{
    ScopeFlag, Symbol, SymbolError, SymbolIdResult, SymbolRecordResult, SymbolTable, SymbolType,
};
use crate::types::Type;
use crate::{TextRange, TextSize};
use std::fmt;

/// Errors accumulate up to this many before `at_error_limit` reports true,
/// unless the session is configured with a different ceiling.
pub const DEFAULT_MAX_ERRORS: usize = 32;

/// The language version declared by the translation unit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LanguageVersion {
    major: usize,
    minor: usize,
}

impl LanguageVersion {
    pub fn new(major: usize, minor: usize) -> LanguageVersion {
        LanguageVersion { major, minor }
    }

    pub fn major(&self) -> usize {
        self.major
    }

    pub fn minor(&self) -> usize {
        self.minor
    }
}

impl fmt::Display for LanguageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Clone, Debug)]
pub struct SessionConfig {
    /// Disable the redeclaration check for every type. A loose compilation
    /// mode used when re-resolving code known to be well-formed.
    pub allow_redeclarations: bool,
    /// Ceiling on diagnostics of `Error` severity.
    pub max_errors: usize,
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            allow_redeclarations: false,
            max_errors: DEFAULT_MAX_ERRORS,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    version: Option<LanguageVersion>,
    pub contexts: ContextTracker,
    pub symbols: SymbolTable,
    pub declarations: DeclarationBuilder,
    pub named_types: NamedTypeDeclarationBuilder,
    pub gate_qubits: GateQubitTracker,
    pub flow: BranchGraph,
    pub errors: SemanticErrorList,
    mangler: Box<dyn NameMangler>,
}

impl Session {
    pub fn new() -> Session {
        Session::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Session {
        Session {
            config,
            version: None,
            contexts: ContextTracker::new(),
            symbols: SymbolTable::new(),
            declarations: DeclarationBuilder::new(),
            named_types: NamedTypeDeclarationBuilder::new(),
            gate_qubits: GateQubitTracker::new(),
            flow: BranchGraph::new(),
            errors: SemanticErrorList::new(),
            mangler: Box::new(DefaultMangler),
        }
    }

    /// Replace the mangler used for named-type identity strings.
    pub fn with_mangler(mut self, mangler: Box<dyn NameMangler>) -> Session {
        self.mangler = mangler;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn allow_redeclarations(&self) -> bool {
        self.config.allow_redeclarations
    }

    /// The session-wide policy override disabling the redeclaration check.
    pub fn set_allow_redeclarations(&mut self, allow: bool) {
        self.config.allow_redeclarations = allow;
    }

    pub fn version(&self) -> Option<&LanguageVersion> {
        self.version.as_ref()
    }

    /// Record the declared language version. A second version statement is a
    /// user error; the first version stays in force.
    pub fn set_version(&mut self, version: LanguageVersion, range: TextRange) -> bool {
        if self.version.is_some() {
            self.errors
                .insert(SemanticErrorKind::VersionNotFirstError, range);
            return false;
        }
        self.version = Some(version);
        true
    }

    // ---- contexts ------------------------------------------------------

    /// Open a declaration context and make it current. The returned guard must
    /// be passed back to [`Session::close_context`]; dropping it panics.
    pub fn open_context<T: ToString>(&mut self, name: T, kind: ContextKind) -> ContextGuard {
        match self.contexts.open(name, kind) {
            Ok(index) => ContextGuard::new(index),
            Err(err) => self.ice_context(err),
        }
    }

    /// Close the context the guard was issued for. The closed context's local
    /// symbols are purged; for gate and defcal bodies the tracked qubit
    /// parameters are erased first.
    pub fn close_context(&mut self, guard: ContextGuard) {
        let index = guard.defuse();
        match self.contexts.close(index) {
            Ok(()) => {
                if self.contexts[index].kind().is_gate_body() {
                    self.gate_qubits.erase_all(&mut self.symbols);
                }
                self.symbols.purge_context(index);
            }
            Err(err) => self.ice_context(err),
        }
    }

    pub fn current_context(&self) -> &DeclarationContext {
        self.contexts.current_context()
    }

    // ---- declarations --------------------------------------------------

    /// Declare `identifier` in the current context. Applies the redeclaration
    /// policy, re-classifies gate-local qubits, inserts the symbol, and
    /// records the declaration. Err means a diagnostic was recorded.
    pub fn declare(&mut self, identifier: Identifier) -> SymbolIdResult {
        self.declare_inner(identifier, None)
    }

    /// Declare a compile-time constant with its recorded value. The name also
    /// lands in the constant registry, so `check_mutable` refuses it later.
    pub fn declare_const(&mut self, identifier: Identifier, value: ConstValue) -> SymbolIdResult {
        self.declare_inner(identifier, Some(value))
    }

    fn declare_inner(
        &mut self,
        mut identifier: Identifier,
        value: Option<ConstValue>,
    ) -> SymbolIdResult {
        let context = self.contexts.current();
        let scope = if context == ContextIndex::GLOBAL {
            ScopeFlag::Global
        } else {
            ScopeFlag::Local
        };
        identifier.set_scope(scope);

        // Declarations inside a gate or defcal body are gate-local, and a
        // plain qubit among them is re-classified as a qubit parameter.
        if self.contexts.current_context().kind().is_gate_body() {
            identifier.set_gate_local(true);
        }
        if identifier.is_gate_local()
            && matches!(identifier.typ(), Type::Qubit)
            && !identifier.is_hardware_qubit()
        {
            identifier.set_typ(Type::GateQubitParam);
        }

        let exists_here = self
            .declarations
            .decl_already_exists(identifier.name(), Some(context));
        let named_collision = self.named_types.exists(identifier.name());
        if exists_here || named_collision {
            let policy_allows = !named_collision
                && identifier.typ().allows_redeclaration()
                && self.prior_types_allow(identifier.name(), context);
            if !(self.config.allow_redeclarations || policy_allows) {
                self.errors.insert(
                    SemanticErrorKind::RedeclarationError(identifier.name().to_string()),
                    identifier.range(),
                );
                return Err(SymbolError::AlreadyBound);
            }
            identifier.mark_redeclaration();
        }

        let symbol = match &value {
            Some(value) => Symbol::new_const(
                identifier.name(),
                identifier.typ(),
                value.clone(),
                scope,
                context,
            ),
            None => Symbol::new(identifier.name(), identifier.typ(), scope, context),
        };
        let symbol_id = self.symbols.insert(symbol);
        identifier.bind_symbol(symbol_id.clone());
        self.gate_qubits.insert(&identifier);

        let is_const = value.is_some() && identifier.typ().is_const();
        let decl = match value {
            Some(value) => Declaration::new_const(identifier, context, value),
            None => Declaration::new(identifier, context),
        };
        if let Some(decl_id) = self.declarations.append(decl) {
            if is_const {
                self.declarations.const_append(decl_id);
            }
        }
        Ok(symbol_id)
    }

    // Redeclaration is allowed only if every prior declaration of the name in
    // this context is of a redeclarable type as well.
    fn prior_types_allow(&self, name: &str, context: ContextIndex) -> bool {
        self.declarations.find_range(name).iter().all(|decl_id| {
            let decl = &self.declarations[*decl_id];
            decl.context() != context || decl.typ().allows_redeclaration()
        })
    }

    /// Declare a gate, defcal, function, or kernel. Named types live in the
    /// global scope; overloads are admitted, exact duplicates refused. The
    /// identifier's mangled name is computed here if not already cached.
    pub fn declare_named_type(&mut self, mut identifier: Identifier) -> SymbolIdResult {
        if !identifier.typ().is_named_type() {
            return Err(SymbolError::WrongType);
        }
        if self.contexts.current() != ContextIndex::GLOBAL {
            self.errors.insert(
                SemanticErrorKind::NotInGlobalScopeError,
                identifier.range(),
            );
        }
        if matches!(identifier.typ(), Type::Kernel) {
            if let Some(version) = &self.version {
                if version.major() >= 3 {
                    self.errors.insert(
                        SemanticErrorKind::KernelDeprecationWarning,
                        identifier.range(),
                    );
                }
            }
        }
        // Named types share the global scope with ordinary declarations, so a
        // name already declared there cannot become a gate or defcal.
        if !self.config.allow_redeclarations
            && self
                .declarations
                .decl_already_exists(identifier.name(), Some(ContextIndex::GLOBAL))
        {
            self.errors.insert(
                SemanticErrorKind::RedeclarationError(identifier.name().to_string()),
                identifier.range(),
            );
            return Err(SymbolError::AlreadyBound);
        }
        if identifier.mangled().is_none() {
            let mangled = self.mangler.mangle(&identifier);
            identifier.set_mangled(mangled);
        }
        if !self.config.allow_redeclarations
            && self.named_types.exists_matching(
                identifier.name(),
                identifier.typ(),
                identifier.mangled(),
            )
        {
            self.errors.insert(
                SemanticErrorKind::RedeclarationError(identifier.name().to_string()),
                identifier.range(),
            );
            return Err(SymbolError::AlreadyBound);
        }
        identifier.set_scope(ScopeFlag::Global);
        let symbol = Symbol::new(
            identifier.name(),
            identifier.typ(),
            ScopeFlag::Global,
            ContextIndex::GLOBAL,
        );
        let symbol_id = self.symbols.insert(symbol);
        identifier.bind_symbol(symbol_id.clone());
        let decl = Declaration::new(identifier, ContextIndex::GLOBAL);
        self.named_types.append(decl);
        Ok(symbol_id)
    }

    /// Bind `identifier` as an alias of `target`. Gate-local quantum aliases
    /// are tracked so body exit removes them along with their targets' local
    /// entries.
    pub fn declare_alias(&mut self, mut identifier: Identifier, target: &str) {
        if self.contexts.current_context().kind().is_gate_body() {
            identifier.set_gate_local(true);
        }
        self.symbols.insert_alias(identifier.name(), target);
        self.gate_qubits.insert(&identifier);
    }

    // ---- lookups -------------------------------------------------------

    /// Lookup the symbol, returning a SymbolRecordResult. Possibly log a `UndefVarError`.
    pub fn lookup_symbol(&mut self, name: &str, range: TextRange) -> SymbolRecordResult<'_> {
        let symbol_record = self.symbols.lookup(name);
        if symbol_record.is_err() {
            self.errors.insert(SemanticErrorKind::UndefVarError, range);
        }
        symbol_record
    }

    /// Every overload declared under `name`. Possibly log a `UndefGateError`.
    pub fn lookup_named_type(&mut self, name: &str, range: TextRange) -> &[DeclId] {
        if !self.named_types.exists(name) {
            self.errors.insert(SemanticErrorKind::UndefGateError, range);
        }
        self.named_types.find_range(name)
    }

    /// `true` if assigning to `name` is legal. Logs a `MutateConstError` and
    /// returns `false` for names in the constant registry. The builtin
    /// constants are seeded in the symbol table rather than the registry, so
    /// the visible symbol is consulted as well.
    pub fn check_mutable(&mut self, name: &str, range: TextRange) -> bool {
        let name = self.symbols.resolve_alias(name).to_string();
        let const_symbol = match self.symbols.lookup(&name) {
            Ok(record) => record.symbol().value().is_some() && record.symbol_type().is_const(),
            Err(_) => false,
        };
        if const_symbol || self.declarations.is_const_declaration(&name) {
            self.errors.insert(SemanticErrorKind::MutateConstError, range);
            return false;
        }
        true
    }

    // ---- branches ------------------------------------------------------

    /// Allocate and begin one arm of a conditional chain. Call after opening
    /// the arm's context, so the arm is tied to it.
    pub fn begin_branch(&mut self, kind: BranchKind) -> BranchId {
        let branch_id = self.flow.new_branch(kind);
        let context = self.contexts.current();
        self.flow.set_context(branch_id, context);
        self.flow.begin_branch(branch_id);
        branch_id
    }

    /// End one arm. A mismatch against the per-kind tracker is a defect in
    /// the driving parser and halts the session.
    pub fn end_branch(&mut self, branch_id: BranchId) {
        if let Err(err) = self.flow.end_branch(branch_id) {
            self.ice_flow(err);
        }
    }

    /// Deregister the arms of `list` because `context` is closing, and purge
    /// the symbols declared under those arms' contexts. No-op for Global.
    pub fn remove_out_of_scope(&mut self, list: &StmtList, context: ContextIndex) {
        if self.contexts.get(context).is_none() {
            self.ice_context(ContextError::UnknownContext(context));
        }
        let context_record = &self.contexts[context];
        let purged = self.flow.remove_out_of_scope(list, context_record);
        for branch_context in purged {
            self.symbols.purge_context(branch_context);
        }
    }

    // ---- gate qubits ---------------------------------------------------

    /// Track a gate-local qubit identifier explicitly. Declarations made
    /// through [`Session::declare`] are tracked automatically.
    pub fn track_gate_qubit(&mut self, identifier: &Identifier) -> bool {
        self.gate_qubits.insert(identifier)
    }

    /// Erase one tracked qubit parameter before body exit.
    pub fn release_gate_qubit(&mut self, name: &str) -> Result<(), SymbolError> {
        self.gate_qubits.erase_one(name, &mut self.symbols)
    }

    /// Erase every tracked qubit parameter. Done automatically when a gate or
    /// defcal context closes.
    pub fn release_gate_qubits(&mut self) {
        self.gate_qubits.erase_all(&mut self.symbols);
    }

    // ---- diagnostics ---------------------------------------------------

    pub fn insert_error(&mut self, error_kind: SemanticErrorKind, range: TextRange) {
        self.errors.insert(error_kind, range);
    }

    pub fn any_semantic_errors(&self) -> bool {
        self.errors.any_semantic_errors()
    }

    /// `true` once the configured error ceiling is reached. The driver is
    /// expected to stop feeding the session when this reports true.
    pub fn at_error_limit(&self) -> bool {
        self.errors.at_error_limit(self.config.max_errors)
    }

    /// Reset every component to its startup state for the next translation
    /// unit. Context indices restart and the builtin constants are re-seeded.
    pub fn clear(&mut self) {
        self.contexts.clear();
        self.symbols.clear();
        self.declarations.clear();
        self.named_types.clear();
        self.gate_qubits.clear();
        self.flow.clear();
        self.errors.clear();
        self.version = None;
    }

    fn ice_range() -> TextRange {
        TextRange::empty(TextSize::from(0u32))
    }

    fn ice_context(&mut self, err: ContextError) -> ! {
        let message = err.to_string();
        self.errors.insert(
            SemanticErrorKind::ContextStackError(message.clone()),
            Session::ice_range(),
        );
        panic!("internal compiler error: {message}");
    }

    fn ice_flow(&mut self, err: FlowError) -> ! {
        let message = err.to_string();
        self.errors.insert(
            SemanticErrorKind::BranchTrackerError(message.clone()),
            Session::ice_range(),
        );
        panic!("internal compiler error: {message}");
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Run `$code` inside a context named `$name` of kind `$kind`, closing the
/// context afterwards through its guard.
#[macro_export]
macro_rules! with_context {
    ($session:ident, $name:expr, $kind:path, $($code:stmt);+ $(;)?) => {
        let guard = $session.open_context($name, $kind);
        $($code)+
        $session.close_context(guard);
    };

    ($session:ident, $name:expr, $kind:path, $code:block) => {
        let guard = $session.open_context($name, $kind);
        $code;
        $session.close_context(guard);
    };
}
