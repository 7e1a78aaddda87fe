// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

// Bookkeeping for conditional chains. Each `if`/`else if`/`else` arm is a
// branch node in an arena. Chain resolution assigns every arm its stack frame
// and its parent edge. Per-kind trackers mirror the parser's nesting so that a
// mismatched begin/end is caught as a defect in the driver, not tolerated.

use crate::context::{ContextIndex, ContextKind, DeclarationContext};
use crate::declarations::DeclId;
use hashbrown::HashSet;
use std::fmt;
use std::ops::Index;

// Bodies with at most this many statements are not descended into when
// collecting nested chains.
const TRIVIAL_BODY_MAX: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    If,
    ElseIf,
    Else,
}

impl BranchKind {
    pub fn tag(&self) -> &'static str {
        match self {
            BranchKind::If => "if",
            BranchKind::ElseIf => "elseif",
            BranchKind::Else => "else",
        }
    }
}

/// Index of a branch node in the graph arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BranchId(usize);

impl From<BranchId> for usize {
    fn from(branch_id: BranchId) -> usize {
        branch_id.0
    }
}

/// One statement as far as the resolver is concerned. Only branches and
/// declarations are inspected; everything else counts toward list length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StmtNode {
    Branch(BranchId),
    Declaration(DeclId),
    Other,
}

/// A statement list belonging to one body or scope.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct StmtList {
    statements: Vec<StmtNode>,
}

impl StmtList {
    pub fn new() -> StmtList {
        StmtList::default()
    }

    pub fn push(&mut self, statement: StmtNode) {
        self.statements.push(statement);
    }

    pub fn statements(&self) -> &[StmtNode] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl From<Vec<StmtNode>> for StmtList {
    fn from(statements: Vec<StmtNode>) -> StmtList {
        StmtList { statements }
    }
}

/// One arm of a conditional chain.
///
/// `stack_frame` and `parent_if` are unset until the chain the arm belongs to
/// has been resolved. Frame 0 is the outermost arm; frames increase along the
/// chain, and every arm but the outermost points at the arm before it.
#[derive(Clone, Debug, PartialEq)]
pub struct BranchNode {
    kind: BranchKind,
    body: StmtList,
    stack_frame: Option<usize>,
    parent_if: Option<BranchId>,
    context: Option<ContextIndex>,
}

impl BranchNode {
    fn new(kind: BranchKind) -> BranchNode {
        BranchNode {
            kind,
            body: StmtList::new(),
            stack_frame: None,
            parent_if: None,
            context: None,
        }
    }

    pub fn kind(&self) -> BranchKind {
        self.kind
    }

    pub fn body(&self) -> &StmtList {
        &self.body
    }

    pub fn stack_frame(&self) -> Option<usize> {
        self.stack_frame
    }

    pub fn parent_if(&self) -> Option<BranchId> {
        self.parent_if
    }

    /// The declaration context opened for this arm, once the session has tied
    /// the two together.
    pub fn context(&self) -> Option<ContextIndex> {
        self.context
    }
}

/// Corrupted begin/end bookkeeping. Always escalated to an internal compiler
/// error by the session; the parser driving the resolver has a defect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowError {
    PopMismatch {
        kind: BranchKind,
        expected: BranchId,
        found: BranchId,
    },
    PopEmpty {
        kind: BranchKind,
        found: BranchId,
    },
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::PopMismatch {
                kind,
                expected,
                found,
            } => write!(
                f,
                "{} tracker popped branch {} while branch {} is current",
                kind.tag(),
                usize::from(*found),
                usize::from(*expected),
            ),
            FlowError::PopEmpty { kind, found } => write!(
                f,
                "{} tracker popped branch {} while empty",
                kind.tag(),
                usize::from(*found),
            ),
        }
    }
}

/// Begin/end bookkeeping for one branch kind. The stack mirrors the parser's
/// nesting; the registered set holds every arm of this kind still in scope.
#[derive(Clone, Debug, Default)]
pub struct BranchTracker {
    stack: Vec<BranchId>,
    registered: HashSet<BranchId>,
}

impl BranchTracker {
    fn new() -> BranchTracker {
        BranchTracker::default()
    }

    fn push(&mut self, branch_id: BranchId) {
        self.stack.push(branch_id);
        self.registered.insert(branch_id);
    }

    fn pop(&mut self, kind: BranchKind, branch_id: BranchId) -> Result<(), FlowError> {
        match self.stack.last() {
            None => Err(FlowError::PopEmpty {
                kind,
                found: branch_id,
            }),
            Some(&top) if top != branch_id => Err(FlowError::PopMismatch {
                kind,
                expected: top,
                found: branch_id,
            }),
            Some(_) => {
                self.stack.pop();
                Ok(())
            }
        }
    }

    fn deregister(&mut self, branch_id: BranchId) {
        self.registered.remove(&branch_id);
    }

    /// The innermost arm of this kind still being built.
    pub fn current(&self) -> Option<BranchId> {
        self.stack.last().copied()
    }

    pub fn is_registered(&self, branch_id: BranchId) -> bool {
        self.registered.contains(&branch_id)
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn num_registered(&self) -> usize {
        self.registered.len()
    }

    fn clear(&mut self) {
        self.stack.clear();
        self.registered.clear();
    }
}

/// The arena of branch nodes plus the three per-kind trackers.
#[derive(Clone, Debug, Default)]
pub struct BranchGraph {
    nodes: Vec<BranchNode>,
    if_tracker: BranchTracker,
    elseif_tracker: BranchTracker,
    else_tracker: BranchTracker,
}

impl BranchGraph {
    pub fn new() -> BranchGraph {
        BranchGraph {
            nodes: Vec::new(),
            if_tracker: BranchTracker::new(),
            elseif_tracker: BranchTracker::new(),
            else_tracker: BranchTracker::new(),
        }
    }

    /// Allocate a node for one arm. The arm is not yet registered with its
    /// tracker; that happens in `begin_branch`.
    pub fn new_branch(&mut self, kind: BranchKind) -> BranchId {
        let branch_id = BranchId(self.nodes.len());
        self.nodes.push(BranchNode::new(kind));
        branch_id
    }

    pub fn set_body(&mut self, branch_id: BranchId, body: StmtList) {
        self.nodes[branch_id.0].body = body;
    }

    pub fn set_context(&mut self, branch_id: BranchId, context: ContextIndex) {
        self.nodes[branch_id.0].context = Some(context);
    }

    /// Push the arm on its per-kind tracker when the parser enters it.
    pub fn begin_branch(&mut self, branch_id: BranchId) {
        let kind = self.nodes[branch_id.0].kind();
        self.tracker_for_mut(kind).push(branch_id);
    }

    /// Pop the arm from its per-kind tracker when the parser leaves it. The
    /// arm stays registered until its scope closes.
    pub fn end_branch(&mut self, branch_id: BranchId) -> Result<(), FlowError> {
        let kind = self.nodes[branch_id.0].kind();
        self.tracker_for_mut(kind).pop(kind, branch_id)
    }

    pub fn tracker(&self, kind: BranchKind) -> &BranchTracker {
        match kind {
            BranchKind::If => &self.if_tracker,
            BranchKind::ElseIf => &self.elseif_tracker,
            BranchKind::Else => &self.else_tracker,
        }
    }

    fn tracker_for_mut(&mut self, kind: BranchKind) -> &mut BranchTracker {
        match kind {
            BranchKind::If => &mut self.if_tracker,
            BranchKind::ElseIf => &mut self.elseif_tracker,
            BranchKind::Else => &mut self.else_tracker,
        }
    }

    /// Resolve one chain of arms, outermost first in `chain`. Walking from the
    /// last arm to the first, each arm is assigned its frame and its edge to
    /// the arm before it. The outermost arm gets frame 0 and no parent.
    pub fn resolve_if_chain(&mut self, chain: &[BranchId]) {
        for (frame, branch_id) in chain.iter().enumerate().rev() {
            let parent = if frame == 0 {
                None
            } else {
                Some(chain[frame - 1])
            };
            let node = &mut self.nodes[branch_id.0];
            node.stack_frame = Some(frame);
            node.parent_if = parent;
        }
    }

    /// Collect the `if` arms at the top level of `list` into `chain`, then
    /// descend into each collected arm's body and resolve the nested chains
    /// found there. Trivial bodies are not descended into. The accumulated
    /// `chain` itself is left for the caller to resolve.
    pub fn resolve_if_edges(&mut self, list: &StmtList, chain: &mut Vec<BranchId>) {
        let start = chain.len();
        for statement in list.statements() {
            if let StmtNode::Branch(branch_id) = statement {
                if self.nodes[branch_id.0].kind() == BranchKind::If {
                    chain.push(*branch_id);
                }
            }
        }
        let collected: Vec<BranchId> = chain[start..].to_vec();
        for branch_id in collected {
            let body = self.nodes[branch_id.0].body().clone();
            if body.len() > TRIVIAL_BODY_MAX {
                let mut nested = Vec::new();
                self.resolve_if_edges(&body, &mut nested);
                self.resolve_if_chain(&nested);
            }
        }
    }

    /// Deregister every arm in `list` from its per-kind tracker because
    /// `context` is closing. No-op for the global context. Returns the
    /// contexts of the deregistered arms so the caller can purge the symbols
    /// declared under them.
    pub fn remove_out_of_scope(
        &mut self,
        list: &StmtList,
        context: &DeclarationContext,
    ) -> Vec<ContextIndex> {
        if context.kind() == ContextKind::Global {
            return Vec::new();
        }
        let mut purged = Vec::new();
        for statement in list.statements() {
            if let StmtNode::Branch(branch_id) = statement {
                let kind = self.nodes[branch_id.0].kind();
                self.tracker_for_mut(kind).deregister(*branch_id);
                if let Some(branch_context) = self.nodes[branch_id.0].context() {
                    purged.push(branch_context);
                }
            }
        }
        purged
    }

    pub fn num_branches(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, branch_id: BranchId) -> Option<&BranchNode> {
        self.nodes.get(branch_id.0)
    }

    /// Every branch node in creation order.
    pub fn all_branches(&self) -> &[BranchNode] {
        &self.nodes
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.if_tracker.clear();
        self.elseif_tracker.clear();
        self.else_tracker.clear();
    }
}

impl Index<BranchId> for BranchGraph {
    type Output = BranchNode;

    fn index(&self, branch_id: BranchId) -> &Self::Output {
        &self.nodes[branch_id.0]
    }
}
