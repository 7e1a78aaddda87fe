// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Tracks declaration contexts: the lexical regions that own declarations.
// Contexts form a stack during resolution. Each context also remains registered
// for the life of the session so that indices stored in declarations stay valid
// after the context is closed.

use drop_bomb::DropBomb;
use std::fmt;
use std::ops::Index;

/// Identifies one declaration context for the life of a session.
/// Indices increase monotonically and are never reused while the session lives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextIndex(usize);

impl ContextIndex {
    /// The global context. Created at startup, always the bottom of the stack.
    pub const GLOBAL: ContextIndex = ContextIndex(0);

    /// The default calibration context. Created at startup and registered, but
    /// never pushed on the stack.
    pub const DEFAULT_CALIBRATION: ContextIndex = ContextIndex(1);

    pub(crate) fn new(index: usize) -> ContextIndex {
        ContextIndex(index)
    }
}

impl From<ContextIndex> for usize {
    fn from(index: ContextIndex) -> usize {
        index.0
    }
}

impl fmt::Display for ContextIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The syntactic construct a context belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContextKind {
    Global,
    Gate,
    Defcal,
    Calibration,
    Function,
    Kernel,
    If,
    ElseIf,
    Else,
    Loop,
}

impl ContextKind {
    /// `true` for the arms of a conditional chain.
    pub fn is_branch(&self) -> bool {
        matches!(self, ContextKind::If | ContextKind::ElseIf | ContextKind::Else)
    }

    /// `true` for bodies whose qubit parameters are tracked and erased on exit.
    pub fn is_gate_body(&self) -> bool {
        matches!(self, ContextKind::Gate | ContextKind::Defcal)
    }

    pub fn tag(&self) -> &'static str {
        match self {
            ContextKind::Global => "global",
            ContextKind::Gate => "gate",
            ContextKind::Defcal => "defcal",
            ContextKind::Calibration => "calibration",
            ContextKind::Function => "function",
            ContextKind::Kernel => "kernel",
            ContextKind::If => "if",
            ContextKind::ElseIf => "elseif",
            ContextKind::Else => "else",
            ContextKind::Loop => "loop",
        }
    }
}

/// One registered declaration context.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclarationContext {
    name: String,
    index: ContextIndex,
    kind: ContextKind,
    parent: Option<ContextIndex>,
}

impl DeclarationContext {
    fn new<T: ToString>(
        name: T,
        index: ContextIndex,
        kind: ContextKind,
        parent: Option<ContextIndex>,
    ) -> DeclarationContext {
        DeclarationContext {
            name: name.to_string(),
            index,
            kind,
            parent,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn index(&self) -> ContextIndex {
        self.index
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// The context that was current when this one was opened. `None` only for
    /// the two contexts created at startup.
    pub fn parent(&self) -> Option<ContextIndex> {
        self.parent
    }

    pub fn is_global(&self) -> bool {
        self.index == ContextIndex::GLOBAL
    }
}

/// Violations of the context stack discipline. The session escalates these to
/// internal compiler errors; the tracker itself only reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContextError {
    /// An attempt to open a second global context.
    GlobalReopened,
    /// An attempt to close the global or default calibration context.
    SingletonClosed(ContextIndex),
    /// The closed context was not the innermost open one.
    NotInnermost {
        closed: ContextIndex,
        innermost: ContextIndex,
    },
    /// An index that no registered context carries.
    UnknownContext(ContextIndex),
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::GlobalReopened => write!(f, "the global context cannot be reopened"),
            ContextError::SingletonClosed(index) => {
                write!(f, "context {index} is a singleton and cannot be closed")
            }
            ContextError::NotInnermost { closed, innermost } => write!(
                f,
                "context {closed} closed while context {innermost} is innermost"
            ),
            ContextError::UnknownContext(index) => write!(f, "context {index} is not registered"),
        }
    }
}

/// The stack of declaration contexts plus the registry of every context opened
/// so far. The global context is index 0 and sits at the bottom of the stack
/// for the whole session. The default calibration context is index 1; it is
/// registered at startup but never pushed.
#[derive(Clone, Debug)]
pub struct ContextTracker {
    contexts: Vec<DeclarationContext>,
    stack: Vec<ContextIndex>,
}

impl ContextTracker {
    pub fn new() -> ContextTracker {
        let global = DeclarationContext::new(
            "global",
            ContextIndex::GLOBAL,
            ContextKind::Global,
            None,
        );
        let calibration = DeclarationContext::new(
            "calibration",
            ContextIndex::DEFAULT_CALIBRATION,
            ContextKind::Calibration,
            None,
        );
        ContextTracker {
            contexts: vec![global, calibration],
            stack: vec![ContextIndex::GLOBAL],
        }
    }

    /// Open a context of `kind` and make it current. Returns the fresh index.
    pub fn open<T: ToString>(
        &mut self,
        name: T,
        kind: ContextKind,
    ) -> Result<ContextIndex, ContextError> {
        if kind == ContextKind::Global {
            return Err(ContextError::GlobalReopened);
        }
        let index = ContextIndex::new(self.contexts.len());
        let parent = Some(self.current());
        self.contexts
            .push(DeclarationContext::new(name, index, kind, parent));
        self.stack.push(index);
        Ok(index)
    }

    /// Close `index`, which must be the innermost open context. The context
    /// stays registered; only its place on the stack is released.
    pub fn close(&mut self, index: ContextIndex) -> Result<(), ContextError> {
        if index == ContextIndex::GLOBAL || index == ContextIndex::DEFAULT_CALIBRATION {
            return Err(ContextError::SingletonClosed(index));
        }
        let innermost = self.current();
        if innermost != index {
            return Err(ContextError::NotInnermost {
                closed: index,
                innermost,
            });
        }
        self.stack.pop();
        Ok(())
    }

    /// The index of the innermost open context. The global context is always
    /// open, so this never fails.
    pub fn current(&self) -> ContextIndex {
        *self.stack.last().unwrap()
    }

    pub fn current_context(&self) -> &DeclarationContext {
        &self[self.current()]
    }

    pub fn get(&self, index: ContextIndex) -> Option<&DeclarationContext> {
        self.contexts.get(index.0)
    }

    /// `true` if `index` is on the stack or is one of the startup singletons.
    pub fn is_open(&self, index: ContextIndex) -> bool {
        index == ContextIndex::GLOBAL
            || index == ContextIndex::DEFAULT_CALIBRATION
            || self.stack.contains(&index)
    }

    /// Indices of the open contexts from the outermost to the innermost.
    pub fn open_stack(&self) -> &[ContextIndex] {
        &self.stack
    }

    /// Every context registered so far, open or closed, in creation order.
    pub fn all_contexts(&self) -> &[DeclarationContext] {
        &self.contexts
    }

    pub fn num_open_contexts(&self) -> usize {
        self.stack.len()
    }

    pub fn num_contexts(&self) -> usize {
        self.contexts.len()
    }

    /// The chain of parents from `index` back to the global context, starting
    /// with `index` itself.
    pub fn parent_chain(&self, index: ContextIndex) -> Vec<ContextIndex> {
        let mut chain = Vec::new();
        let mut next = Some(index);
        while let Some(index) = next {
            chain.push(index);
            next = self.get(index).and_then(|context| context.parent());
        }
        chain
    }

    /// Reset to the startup state. Only the two singletons survive, and index
    /// assignment restarts after them.
    pub fn clear(&mut self) {
        *self = ContextTracker::new();
    }
}

impl Default for ContextTracker {
    fn default() -> Self {
        ContextTracker::new()
    }
}

impl Index<ContextIndex> for ContextTracker {
    type Output = DeclarationContext;

    fn index(&self, index: ContextIndex) -> &Self::Output {
        &self.contexts[index.0]
    }
}

/// Receipt for an open context. The session hands one out on `open_context`
/// and takes it back in `close_context`, which keeps open and close calls
/// paired in the source. Dropping an armed guard panics.
#[must_use = "an open context must be closed through its guard"]
#[derive(Debug)]
pub struct ContextGuard {
    index: ContextIndex,
    bomb: DropBomb,
}

impl ContextGuard {
    pub(crate) fn new(index: ContextIndex) -> ContextGuard {
        ContextGuard {
            index,
            bomb: DropBomb::new("ContextGuard dropped without closing the context"),
        }
    }

    pub fn index(&self) -> ContextIndex {
        self.index
    }

    pub(crate) fn defuse(mut self) -> ContextIndex {
        self.bomb.defuse();
        self.index
    }
}
