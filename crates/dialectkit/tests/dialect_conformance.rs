//! Contracts every built-in dialect must honour.

use std::sync::Arc;
use std::thread;

use dialectkit::dialect::verify_alias_contract;
use dialectkit::{
    DatabaseType, DecimalSize, Dialect, DialectCatalog, KeywordPriority, KeywordRegistry,
    TypeKind, TypeRequest,
};

fn requests() -> Vec<TypeRequest> {
    vec![
        TypeRequest::string(10),
        TypeRequest::string(10).with_unicode(true),
        TypeRequest::unlimited_string(),
        TypeRequest::unlimited_string().with_unicode(true),
        TypeRequest::new(TypeKind::Bool),
        TypeRequest::new(TypeKind::Byte),
        TypeRequest::new(TypeKind::Int16),
        TypeRequest::new(TypeKind::Int32),
        TypeRequest::new(TypeKind::Int64),
        TypeRequest::decimal(DecimalSize::new(3, 1)),
        TypeRequest::decimal(DecimalSize::new(1, 0)),
        TypeRequest::new(TypeKind::DateTime),
        TypeRequest::new(TypeKind::TimeSpan),
        TypeRequest::new(TypeKind::Guid),
        TypeRequest::byte_array(Some(16)),
        TypeRequest::byte_array(None),
    ]
}

#[test]
fn test_round_trip_through_every_dialect() {
    for db in DatabaseType::ALL {
        let dialect = Dialect::for_type(db);
        let t = dialect.translater();
        for r in requests() {
            let proprietary = t.to_proprietary_type(&r);
            let back = t.to_type_request(&proprietary).unwrap();
            assert_eq!(back, t.normalize(&r), "{} via {} on {}", r, proprietary, db);
        }
    }
}

#[test]
fn test_alias_contract_for_every_dialect() {
    for db in DatabaseType::ALL {
        let dialect = Dialect::for_type(db);
        verify_alias_contract(dialect.syntax())
            .unwrap_or_else(|e| panic!("{} breaks the alias contract: {}", db, e));
    }
}

#[test]
fn test_wrap_rejects_separator_everywhere() {
    for db in DatabaseType::ALL {
        let dialect = Dialect::for_type(db);
        let syntax = dialect.syntax();
        let dotted = format!("a{}b", syntax.separator());
        assert!(syntax.wrap(&dotted).is_err(), "{}", db);
        assert!(syntax.wrap("ab").is_ok(), "{}", db);
    }
}

#[test]
fn test_strategies_agree_on_engine() {
    for db in DatabaseType::ALL {
        let dialect = Dialect::for_type(db);
        assert_eq!(dialect.syntax().database_type(), db);
        assert_eq!(dialect.translater().database_type(), db);
        assert_eq!(dialect.helper().database_type(), db);
    }
}

#[test]
fn test_catalog_resolves_aliases() {
    let catalog = DialectCatalog::with_builtins();
    for (alias, db) in [
        ("sqlserver", DatabaseType::Mssql),
        ("mariadb", DatabaseType::Mysql),
        ("pg", DatabaseType::Postgres),
        ("postgresql", DatabaseType::Postgres),
        ("oracle", DatabaseType::Oracle),
        ("sqlite", DatabaseType::Sqlite),
    ] {
        assert_eq!(catalog.require_dialect(alias).unwrap().database_type(), db);
    }
    assert!(catalog.require_dialect("db2").is_err());
}

#[test]
fn test_keyword_registry_concurrent_adds() {
    let registry = Arc::new(KeywordRegistry::new());
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let priority = if i % 2 == 0 {
                    KeywordPriority::SystemDefaultLow
                } else {
                    KeywordPriority::ObjectOverride
                };
                registry.add(DatabaseType::Mssql, "Pooling", &format!("v{}", i), priority);
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let keywords = registry.keywords(DatabaseType::Mssql);
    assert_eq!(keywords.len(), 1);
    assert_eq!(
        keywords.get("pooling").unwrap().priority,
        KeywordPriority::ObjectOverride
    );
    assert!(registry.keywords(DatabaseType::Oracle).is_empty());
}
