// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

use qas_semantics::context::{ContextIndex, ContextKind, ContextTracker};
use qas_semantics::flow::{BranchGraph, BranchKind, FlowError, StmtList, StmtNode};
use qas_semantics::session::Session;

//
// Test API of the branch graph, chain resolution, and the per-kind trackers
//

#[test]
fn test_new_branch_defaults() {
    let mut graph = BranchGraph::new();
    let first = graph.new_branch(BranchKind::If);
    let second = graph.new_branch(BranchKind::Else);
    assert_eq!(usize::from(first), 0);
    assert_eq!(usize::from(second), 1);
    assert_eq!(graph.num_branches(), 2);
    assert!(graph.get(first).is_some());
    // nothing is resolved until the chain is
    assert_eq!(graph[first].stack_frame(), None);
    assert_eq!(graph[first].parent_if(), None);
    assert_eq!(graph[first].context(), None);
    assert!(graph[first].body().is_empty());
    assert_eq!(graph[second].kind(), BranchKind::Else);
}

#[test]
fn test_chain_frames_and_parents() {
    let mut graph = BranchGraph::new();
    let b0 = graph.new_branch(BranchKind::If);
    let b1 = graph.new_branch(BranchKind::ElseIf);
    let b2 = graph.new_branch(BranchKind::ElseIf);
    graph.resolve_if_chain(&[b0, b1, b2]);
    assert_eq!(graph[b0].stack_frame(), Some(0));
    assert_eq!(graph[b1].stack_frame(), Some(1));
    assert_eq!(graph[b2].stack_frame(), Some(2));
    assert_eq!(graph[b0].parent_if(), None);
    assert_eq!(graph[b1].parent_if(), Some(b0));
    assert_eq!(graph[b2].parent_if(), Some(b1));
}

#[test]
fn test_chain_with_else_arm() {
    let mut graph = BranchGraph::new();
    let b0 = graph.new_branch(BranchKind::If);
    let b1 = graph.new_branch(BranchKind::ElseIf);
    let b2 = graph.new_branch(BranchKind::Else);
    graph.resolve_if_chain(&[b0, b1, b2]);
    assert_eq!(graph[b2].stack_frame(), Some(2));
    assert_eq!(graph[b2].parent_if(), Some(b1));
    assert_eq!(graph[b2].kind(), BranchKind::Else);
}

#[test]
fn test_single_arm_chain() {
    let mut graph = BranchGraph::new();
    let only = graph.new_branch(BranchKind::If);
    graph.resolve_if_chain(&[only]);
    assert_eq!(graph[only].stack_frame(), Some(0));
    assert_eq!(graph[only].parent_if(), None);
}

#[test]
fn test_resolve_if_edges_collects_if_arms_only() {
    let mut graph = BranchGraph::new();
    let if1 = graph.new_branch(BranchKind::If);
    let else1 = graph.new_branch(BranchKind::Else);
    let if2 = graph.new_branch(BranchKind::If);
    let list = StmtList::from(vec![
        StmtNode::Branch(if1),
        StmtNode::Other,
        StmtNode::Branch(else1),
        StmtNode::Branch(if2),
    ]);
    let mut chain = Vec::new();
    graph.resolve_if_edges(&list, &mut chain);
    assert_eq!(chain, vec![if1, if2]);
    // the accumulated chain is the caller's to resolve
    assert_eq!(graph[if1].stack_frame(), None);
    graph.resolve_if_chain(&chain);
    assert_eq!(graph[if1].stack_frame(), Some(0));
    assert_eq!(graph[if2].stack_frame(), Some(1));
    assert_eq!(graph[if2].parent_if(), Some(if1));
}

#[test]
fn test_resolve_if_edges_descends_nontrivial_bodies() {
    let mut graph = BranchGraph::new();
    let nested = graph.new_branch(BranchKind::If);
    let outer = graph.new_branch(BranchKind::If);
    graph.set_body(
        outer,
        StmtList::from(vec![
            StmtNode::Other,
            StmtNode::Branch(nested),
            StmtNode::Other,
        ]),
    );
    let list = StmtList::from(vec![StmtNode::Branch(outer)]);
    let mut chain = Vec::new();
    graph.resolve_if_edges(&list, &mut chain);
    assert_eq!(chain, vec![outer]);
    // the chain nested in the three-statement body was resolved in place
    assert_eq!(graph[nested].stack_frame(), Some(0));
    assert_eq!(graph[nested].parent_if(), None);
}

#[test]
fn test_resolve_if_edges_skips_trivial_bodies() {
    let mut graph = BranchGraph::new();
    let nested = graph.new_branch(BranchKind::If);
    let outer = graph.new_branch(BranchKind::If);
    graph.set_body(
        outer,
        StmtList::from(vec![StmtNode::Branch(nested), StmtNode::Other]),
    );
    let list = StmtList::from(vec![StmtNode::Branch(outer)]);
    let mut chain = Vec::new();
    graph.resolve_if_edges(&list, &mut chain);
    assert_eq!(chain, vec![outer]);
    // bodies of two statements or fewer are not descended into
    assert_eq!(graph[nested].stack_frame(), None);
}

#[test]
fn test_begin_end_tracking() {
    let mut graph = BranchGraph::new();
    let arm = graph.new_branch(BranchKind::ElseIf);
    graph.begin_branch(arm);
    assert_eq!(graph.tracker(BranchKind::ElseIf).current(), Some(arm));
    assert_eq!(graph.tracker(BranchKind::ElseIf).depth(), 1);
    assert!(graph.tracker(BranchKind::ElseIf).is_registered(arm));
    assert!(graph.end_branch(arm).is_ok());
    assert_eq!(graph.tracker(BranchKind::ElseIf).depth(), 0);
    assert_eq!(graph.tracker(BranchKind::ElseIf).current(), None);
    // ended arms stay registered until their scope closes
    assert!(graph.tracker(BranchKind::ElseIf).is_registered(arm));
    assert_eq!(graph.tracker(BranchKind::ElseIf).num_registered(), 1);
    assert_eq!(graph.tracker(BranchKind::If).num_registered(), 0);
}

#[test]
fn test_end_branch_mismatch() {
    let mut graph = BranchGraph::new();
    let outer = graph.new_branch(BranchKind::If);
    let inner = graph.new_branch(BranchKind::If);
    graph.begin_branch(outer);
    graph.begin_branch(inner);
    assert_eq!(
        graph.end_branch(outer),
        Err(FlowError::PopMismatch {
            kind: BranchKind::If,
            expected: inner,
            found: outer,
        })
    );
    let mut empty = BranchGraph::new();
    let arm = empty.new_branch(BranchKind::Else);
    assert_eq!(
        empty.end_branch(arm),
        Err(FlowError::PopEmpty {
            kind: BranchKind::Else,
            found: arm,
        })
    );
}

#[test]
fn test_remove_out_of_scope() {
    let mut tracker = ContextTracker::new();
    let enclosing = tracker.open("body", ContextKind::Loop).unwrap();
    let arm_context = tracker.open("arm", ContextKind::If).unwrap();
    let mut graph = BranchGraph::new();
    let arm = graph.new_branch(BranchKind::If);
    graph.set_context(arm, arm_context);
    graph.begin_branch(arm);
    assert!(graph.end_branch(arm).is_ok());
    let list = StmtList::from(vec![StmtNode::Branch(arm), StmtNode::Other]);
    // nothing is deregistered while the enclosing context is the global one
    let untouched = graph.remove_out_of_scope(&list, &tracker[ContextIndex::GLOBAL]);
    assert!(untouched.is_empty());
    assert!(graph.tracker(BranchKind::If).is_registered(arm));
    let purged = graph.remove_out_of_scope(&list, &tracker[enclosing]);
    assert_eq!(purged, vec![arm_context]);
    assert!(!graph.tracker(BranchKind::If).is_registered(arm));
}

#[test]
fn test_session_begin_branch_ties_context() {
    let mut session = Session::new();
    let guard = session.open_context("then", ContextKind::If);
    let arm = session.begin_branch(BranchKind::If);
    assert_eq!(session.flow[arm].context(), Some(guard.index()));
    assert_eq!(session.flow[arm].kind(), BranchKind::If);
    assert_eq!(session.flow.tracker(BranchKind::If).current(), Some(arm));
    session.end_branch(arm);
    session.close_context(guard);
    assert!(session.flow.tracker(BranchKind::If).is_registered(arm));
}

#[test]
#[should_panic(expected = "internal compiler error")]
fn test_mismatched_end_branch_halts() {
    let mut session = Session::new();
    let outer_guard = session.open_context("if0", ContextKind::If);
    let outer = session.begin_branch(BranchKind::If);
    let inner_guard = session.open_context("if1", ContextKind::If);
    let _inner = session.begin_branch(BranchKind::If);
    // keep the guards from detonating while the session unwinds
    std::mem::forget(outer_guard);
    std::mem::forget(inner_guard);
    session.end_branch(outer);
}

#[test]
fn test_stmt_list() {
    let mut list = StmtList::new();
    assert!(list.is_empty());
    list.push(StmtNode::Other);
    list.push(StmtNode::Other);
    assert_eq!(list.len(), 2);
    assert_eq!(list.statements(), &[StmtNode::Other, StmtNode::Other]);
}

#[test]
fn test_flow_clear() {
    let mut graph = BranchGraph::new();
    let arm = graph.new_branch(BranchKind::If);
    graph.begin_branch(arm);
    graph.clear();
    assert_eq!(graph.num_branches(), 0);
    assert_eq!(graph.tracker(BranchKind::If).depth(), 0);
    assert_eq!(graph.tracker(BranchKind::If).num_registered(), 0);
    assert!(graph.all_branches().is_empty());
}
