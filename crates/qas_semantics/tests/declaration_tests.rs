// Copyright contributors to the qas_resolver project
// SPDX-License-Identifier: Apache-2.0

use qas_semantics::context::{ContextIndex, ContextKind, ContextTracker};
use qas_semantics::declarations::{
    DeclarationBuilder, DeclarationMap, NamedTypeDeclarationBuilder,
};
use qas_semantics::nodes::{ConstValue, Declaration, Identifier};
use qas_semantics::types::{IsConst, Type};
use qas_semantics::TextRange;

fn range() -> TextRange {
    TextRange::empty(0.into())
}

fn ident(name: &str, typ: Type) -> Identifier {
    Identifier::new(name, typ, range())
}

//
// Test API of the two declaration builders
//

#[test]
fn test_append_first_wins() {
    let mut builder = DeclarationBuilder::new();
    let first = builder.append(Declaration::new(
        ident("x", Type::Int(None, IsConst::False)),
        ContextIndex::GLOBAL,
    ));
    assert!(first.is_some());
    // an unmarked second declaration of the name is not recorded
    let second = builder.append(Declaration::new(
        ident("x", Type::Int(None, IsConst::False)),
        ContextIndex::GLOBAL,
    ));
    assert!(second.is_none());
    assert_eq!(builder.len(), 1);
    assert!(!builder.is_empty());
    let decl_id = first.unwrap();
    assert_eq!(builder[decl_id].name(), "x");
    assert_eq!(builder.get(decl_id).unwrap().context(), ContextIndex::GLOBAL);
}

#[test]
fn test_decl_already_exists() {
    let mut tracker = ContextTracker::new();
    let inner = tracker.open("f", ContextKind::Function).unwrap();
    let mut builder = DeclarationBuilder::new();
    builder.append(Declaration::new(
        ident("x", Type::Bit(IsConst::False)),
        ContextIndex::GLOBAL,
    ));
    assert!(builder.decl_already_exists("x", None));
    assert!(builder.decl_already_exists("x", Some(ContextIndex::GLOBAL)));
    // a declaration in another context does not trip the same-context probe
    assert!(!builder.decl_already_exists("x", Some(inner)));
    assert!(!builder.decl_already_exists("y", None));
}

#[test]
fn test_const_registry() {
    let mut builder = DeclarationBuilder::new();
    let decl = Declaration::new_const(
        ident("n", Type::Int(Some(32), IsConst::True)),
        ContextIndex::GLOBAL,
        ConstValue::int(12),
    );
    let decl_id = builder.append(decl).unwrap();
    builder.const_append(decl_id);
    assert!(builder.is_const_declaration("n"));
    assert!(!builder.is_const_declaration("x"));
    assert_eq!(builder.const_value("n"), Some(&ConstValue::int(12)));
    assert_eq!(builder.const_value("x"), None);
    assert_eq!(builder.num_consts(), 1);
}

#[test]
fn test_find_range_and_iter() {
    let mut builder = DeclarationBuilder::new();
    builder.append(Declaration::new(
        ident("x", Type::Bit(IsConst::False)),
        ContextIndex::GLOBAL,
    ));
    builder.append(Declaration::new(
        ident("y", Type::Bool(IsConst::False)),
        ContextIndex::GLOBAL,
    ));
    assert_eq!(builder.find_range("x").len(), 1);
    assert!(builder.find_range("z").is_empty());
    let names: Vec<&str> = builder.iter().map(|decl| decl.name()).collect();
    assert_eq!(names, vec!["x", "y"]);
    assert_eq!(builder.len(), 2);
}

#[test]
fn test_declaration_keeps_identifier_shape() {
    let site = TextRange::new(3.into(), 9.into());
    let decl = Declaration::new(
        Identifier::new("x", Type::Bit(IsConst::False), site),
        ContextIndex::GLOBAL,
    );
    assert_eq!(decl.range(), site);
    assert_eq!(decl.typ(), &Type::Bit(IsConst::False));
    assert_eq!(decl.name(), "x");
    assert!(decl.const_value().is_none());
    assert!(decl.identifier().symbol().is_none());
}

#[test]
fn test_transfer_context() {
    let mut tracker = ContextTracker::new();
    let body = tracker.open("f", ContextKind::Function).unwrap();
    let mut builder = DeclarationBuilder::new();
    let kept = builder
        .append(Declaration::new(
            ident("g", Type::Bit(IsConst::False)),
            ContextIndex::GLOBAL,
        ))
        .unwrap();
    let moved = builder
        .append(Declaration::new(ident("p", Type::Int(None, IsConst::False)), body))
        .unwrap();
    let mut collected = DeclarationMap::new();
    assert_eq!(builder.transfer_context(body, &mut collected), 1);
    assert_eq!(builder.len(), 1);
    assert!(builder.find_range("p").is_empty());
    assert!(builder.decl_already_exists("g", None));
    assert_eq!(collected["p"], vec![moved]);
    // the arena still owns the moved declaration, so its id stays usable
    assert_eq!(builder[moved].name(), "p");
    assert_eq!(builder[kept].name(), "g");
    // a second transfer finds nothing left
    assert_eq!(builder.transfer_context(body, &mut collected), 0);
}

#[test]
fn test_builder_clear() {
    let mut builder = DeclarationBuilder::new();
    let decl_id = builder
        .append(Declaration::new_const(
            ident("n", Type::Int(None, IsConst::True)),
            ContextIndex::GLOBAL,
            ConstValue::int(1),
        ))
        .unwrap();
    builder.const_append(decl_id);
    builder.clear();
    assert!(builder.is_empty());
    assert_eq!(builder.num_consts(), 0);
    assert!(!builder.decl_already_exists("n", None));
}

#[test]
fn test_named_builder_refuses_ordinary_types() {
    let mut builder = NamedTypeDeclarationBuilder::new();
    let decl = Declaration::new(
        ident("x", Type::Int(None, IsConst::False)),
        ContextIndex::GLOBAL,
    );
    assert!(builder.append(decl).is_none());
    assert!(builder.is_empty());
}

#[test]
fn test_named_builder_overloads() {
    let mut builder = NamedTypeDeclarationBuilder::new();
    let mut gate = ident("rx", Type::Gate);
    gate.set_mangled("_QG_2rx");
    let mut defcal = ident("rx", Type::Defcal);
    defcal.set_mangled("_QD_2rx");
    assert!(builder
        .append(Declaration::new(gate, ContextIndex::GLOBAL))
        .is_some());
    assert!(builder
        .append(Declaration::new(defcal, ContextIndex::GLOBAL))
        .is_some());
    assert!(builder.exists("rx"));
    assert_eq!(builder.find_range("rx").len(), 2);
    assert_eq!(builder.len(), 2);
    let types: Vec<&Type> = builder.iter().map(|decl| decl.typ()).collect();
    assert_eq!(types, vec![&Type::Gate, &Type::Defcal]);
}

#[test]
fn test_named_builder_exact_duplicate_refused() {
    let mut builder = NamedTypeDeclarationBuilder::new();
    let mut first = ident("h", Type::Gate);
    first.set_mangled("_QG_1h");
    let mut second = ident("h", Type::Gate);
    second.set_mangled("_QG_1h");
    assert!(builder
        .append(Declaration::new(first, ContextIndex::GLOBAL))
        .is_some());
    assert!(builder
        .append(Declaration::new(second, ContextIndex::GLOBAL))
        .is_none());
    assert!(builder.exists_matching("h", &Type::Gate, Some("_QG_1h")));
    assert!(!builder.exists_matching("h", &Type::Defcal, Some("_QG_1h")));
    assert!(!builder.exists_matching("h", &Type::Gate, Some("_QG_1h2")));
    assert_eq!(builder.len(), 1);
    let decl_id = builder.find_range("h")[0];
    assert_eq!(builder.get(decl_id).unwrap().name(), "h");
    assert_eq!(builder[decl_id].identifier().mangled(), Some("_QG_1h"));
}

#[test]
fn test_mangled_name_is_sticky() {
    let mut identifier = ident("h", Type::Gate);
    identifier.set_mangled("_QG_1h");
    // the first cached mangled name stays
    identifier.set_mangled("_QX_1h");
    assert_eq!(identifier.mangled(), Some("_QG_1h"));
}

#[test]
fn test_named_builder_clear() {
    let mut builder = NamedTypeDeclarationBuilder::new();
    let mut gate = ident("h", Type::Gate);
    gate.set_mangled("_QG_1h");
    builder.append(Declaration::new(gate, ContextIndex::GLOBAL));
    builder.clear();
    assert!(builder.is_empty());
    assert!(!builder.exists("h"));
    assert!(builder.find_range("h").is_empty());
}
