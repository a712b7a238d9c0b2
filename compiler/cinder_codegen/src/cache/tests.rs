use pretty_assertions::assert_eq;

use super::*;

fn key(raw: u32) -> TypeKey {
    TypeKey::value(QualType::new(TypeId::new(raw)))
}

#[test]
fn lookup_of_unbound_keys_is_none() {
    let cache = EntityCache::new();
    assert_eq!(cache.lookup_type(key(0)), None);
    assert_eq!(cache.lookup_decl(DeclId::new(0)), None);
}

#[test]
fn rebinding_the_same_type_is_a_no_op() {
    let mut cache = EntityCache::new();
    assert_eq!(cache.insert_type(key(1), Type::new(4)), Ok(()));
    assert_eq!(cache.insert_type(key(1), Type::new(4)), Ok(()));
    assert_eq!(cache.lookup_type(key(1)), Some(Type::new(4)));
    assert_eq!(cache.type_count(), 1);
}

#[test]
fn rebinding_a_different_type_fails() {
    let mut cache = EntityCache::new();
    assert_eq!(cache.insert_type(key(1), Type::new(4)), Ok(()));
    let err = cache.insert_type(key(1), Type::new(5));
    assert!(matches!(err, Err(CodegenError::DuplicateEntity { .. })));
    assert_eq!(cache.lookup_type(key(1)), Some(Type::new(4)));
}

#[test]
fn value_and_lvalue_keys_are_distinct() {
    let mut cache = EntityCache::new();
    let qt = QualType::new(TypeId::new(2));
    assert_eq!(cache.insert_type(TypeKey::value(qt), Type::new(0)), Ok(()));
    assert_eq!(cache.insert_type(TypeKey::lvalue(qt), Type::new(1)), Ok(()));
    assert_eq!(cache.lookup_type(TypeKey::lvalue(qt)), Some(Type::new(1)));
}

#[test]
fn qualifiers_are_part_of_the_key() {
    let mut cache = EntityCache::new();
    let plain = QualType::new(TypeId::new(3));
    let konst = QualType::with_quals(TypeId::new(3), Qualifiers::CONST);
    assert_eq!(cache.insert_type(TypeKey::value(plain), Type::new(0)), Ok(()));
    assert_eq!(cache.lookup_type(TypeKey::value(konst)), None);
}

#[test]
fn decl_bindings_are_stable() {
    let mut cache = EntityCache::new();
    let decl = DeclId::new(7);
    assert_eq!(cache.insert_decl(decl, OpId::new(3)), Ok(()));
    assert_eq!(cache.insert_decl(decl, OpId::new(3)), Ok(()));
    assert!(cache.insert_decl(decl, OpId::new(9)).is_err());
    assert_eq!(cache.lookup_decl(decl), Some(OpId::new(3)));
    assert_eq!(cache.decl_count(), 1);
}
