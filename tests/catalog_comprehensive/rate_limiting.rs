//! Admission control at the facade boundary

use std::sync::Arc;
use std::time::Duration;

use crate::{composition, editor};
use ragamala::{
    Caller, CatalogService, ClassLimit, Composition, Error, MemoryTable, RateLimitConfig,
    SearchParams, TrustedSources,
};

fn strict_service() -> CatalogService {
    let config = RateLimitConfig {
        write: ClassLimit::new(2, Duration::from_secs(60)),
        search: ClassLimit::new(3, Duration::from_secs(60)),
        anonymous: ClassLimit::new(1, Duration::from_secs(60)),
        trusted: TrustedSources::default().with_service_account("importer"),
        ..RateLimitConfig::default()
    };
    CatalogService::new(Arc::new(MemoryTable::new()), config)
}

#[test]
fn writes_deny_past_the_class_limit() {
    let service = strict_service();
    let alice = editor("alice");

    for i in 0..2 {
        service
            .create(&alice, composition(&format!("k{i}"), "telugu", "r1", "t1"))
            .unwrap();
    }

    let third = service.create(&alice, composition("k2", "telugu", "r1", "t1"));
    match third {
        Err(Error::RateLimitExceeded { retry_after }) => {
            assert!(retry_after > Duration::ZERO);
        }
        other => panic!("expected a rate-limit denial, got {other:?}"),
    }
}

#[test]
fn denial_happens_before_any_storage_write() {
    let service = strict_service();
    let alice = editor("alice");

    service
        .create(&alice, composition("k0", "telugu", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("k1", "telugu", "r1", "t1"))
        .unwrap();
    let denied = service.create(&alice, composition("k2", "telugu", "r1", "t1"));
    assert!(matches!(denied, Err(Error::RateLimitExceeded { .. })));

    // the denied create must not have reached the table
    let page = service
        .search_compositions(&alice, &SearchParams::query("k2"))
        .unwrap();
    assert!(page.items.is_empty());
}

#[test]
fn classes_have_independent_budgets() {
    let service = strict_service();
    let alice = editor("alice");

    // exhaust the write budget
    service
        .create(&alice, composition("k0", "telugu", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("k1", "telugu", "r1", "t1"))
        .unwrap();
    assert!(matches!(
        service.create(&alice, composition("k2", "telugu", "r1", "t1")),
        Err(Error::RateLimitExceeded { .. })
    ));

    // search still has its own budget
    assert!(service
        .search_compositions(&alice, &SearchParams::listing())
        .is_ok());
}

#[test]
fn anonymous_reads_fall_to_the_anonymous_class() {
    let service = strict_service();
    let anon = Caller::anonymous();

    assert!(service
        .search_compositions(&anon, &SearchParams::listing())
        .is_ok());
    // anonymous budget is 1; the search class budget (3) does not apply
    assert!(matches!(
        service.search_compositions(&anon, &SearchParams::listing()),
        Err(Error::RateLimitExceeded { .. })
    ));
}

#[test]
fn trusted_service_account_is_never_limited() {
    let service = strict_service();
    let importer = editor("importer");

    for i in 0..20 {
        service
            .create(&importer, composition(&format!("k{i}"), "telugu", "r1", "t1"))
            .unwrap();
    }
}

#[test]
fn distinct_users_do_not_share_budgets() {
    let service = strict_service();

    for i in 0..2 {
        service
            .create(&editor("alice"), composition(&format!("a{i}"), "telugu", "r1", "t1"))
            .unwrap();
    }
    // alice is exhausted, bob is not
    assert!(matches!(
        service.create(&editor("alice"), composition("a2", "telugu", "r1", "t1")),
        Err(Error::RateLimitExceeded { .. })
    ));
    assert!(service
        .create(&editor("bob"), composition("b0", "telugu", "r1", "t1"))
        .is_ok());
}

#[test]
fn sweep_is_caller_driven_and_reports_removals() {
    let service = strict_service();
    service
        .create(&editor("alice"), composition("k0", "telugu", "r1", "t1"))
        .unwrap();

    assert!(service.limiter().bucket_count() > 0);
    // nothing is idle past the default threshold yet
    assert_eq!(service.sweep_rate_limits(), 0);
}

#[test]
fn decision_headers_surface_at_the_boundary() {
    let service = strict_service();
    let decision = service.limiter().check(
        ragamala::RateLimitClass::Search,
        &Caller::user("observer"),
    );
    let (limit, remaining, reset) = decision.headers();
    assert_eq!(limit, 3);
    assert_eq!(remaining, 2);
    assert!(reset > 0);
}

#[test]
fn bot_view_skips_both_limiter_and_side_effect() {
    let service = strict_service();
    let alice = editor("alice");
    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    let bot = Caller::user("crawler").bot();
    for _ in 0..100 {
        service
            .record_view::<Composition>(&bot, &created.id)
            .unwrap();
    }
    let read: Composition = service.get(&alice, &created.id, None).unwrap();
    assert_eq!(read.revision.view_count, 0);
}
