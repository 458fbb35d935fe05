//! Backend failure propagation
//!
//! Storage errors must surface unchanged from every facade operation,
//! with no internal retry or silent fallback.

use std::sync::Arc;

use crate::{composition, editor};
use ragamala::{
    CatalogService, Composition, Error, FaultyTable, MemoryTable, RateLimitConfig, SearchParams,
    Table,
};

fn faulty_service() -> (CatalogService, Arc<FaultyTable>) {
    let faulty = Arc::new(FaultyTable::new(Arc::new(MemoryTable::new())));
    let service = CatalogService::new(
        Arc::clone(&faulty) as Arc<dyn Table>,
        RateLimitConfig::default(),
    );
    (service, faulty)
}

#[test]
fn storage_failure_surfaces_from_reads_and_writes() {
    let (service, faulty) = faulty_service();
    let alice = editor("alice");

    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    faulty.set_failing(true);

    let read: Result<Composition, _> = service.get(&alice, &created.id, None);
    assert!(matches!(read, Err(Error::StorageUnavailable(_))));

    let write = service.create(&alice, composition("other", "telugu", "r1", "t1"));
    assert!(matches!(write, Err(Error::StorageUnavailable(_))));

    let search = service.search_compositions(&alice, &SearchParams::listing());
    assert!(matches!(search, Err(Error::StorageUnavailable(_))));

    let version =
        service.create_version(&alice, &created.id, |_: &mut Composition| {});
    assert!(matches!(version, Err(Error::StorageUnavailable(_))));
}

#[test]
fn recovery_after_fault_clears() {
    let (service, faulty) = faulty_service();
    let alice = editor("alice");

    faulty.set_failing(true);
    assert!(service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .is_err());

    faulty.set_failing(false);
    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();
    let read: Composition = service.get(&alice, &created.id, None).unwrap();
    assert_eq!(read.title, "krithi");
}

#[test]
fn rate_limiter_still_guards_during_outage() {
    // a denial must short-circuit before touching the failing backend
    let faulty = Arc::new(FaultyTable::new(Arc::new(MemoryTable::new())));
    let config = RateLimitConfig {
        write: ragamala::ClassLimit::new(1, std::time::Duration::from_secs(60)),
        ..RateLimitConfig::default()
    };
    let service = CatalogService::new(Arc::clone(&faulty) as Arc<dyn Table>, config);
    let alice = editor("alice");

    service
        .create(&alice, composition("k0", "telugu", "r1", "t1"))
        .unwrap();
    faulty.set_failing(true);

    // budget exhausted: the limiter answers, not the broken table
    let denied = service.create(&alice, composition("k1", "telugu", "r1", "t1"));
    assert!(matches!(denied, Err(Error::RateLimitExceeded { .. })));
}
