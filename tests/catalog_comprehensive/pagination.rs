//! Cursor pagination through the facade

use crate::{composition, editor, service};
use ragamala::{Composition, Error, SearchParams};

#[test]
fn fifteen_items_in_pages_of_five() {
    let service = service();
    let alice = editor("alice");
    for i in 0..15 {
        service
            .create(&alice, composition(&format!("krithi {i:02}"), "telugu", "r1", "t1"))
            .unwrap();
    }

    let mut seen: Vec<String> = Vec::new();
    let mut token: Option<String> = None;
    let mut pages = 0;
    loop {
        let page = service
            .search_compositions(
                &alice,
                &SearchParams {
                    limit: Some(5),
                    next_token: token.clone(),
                    ..Default::default()
                },
            )
            .unwrap();
        pages += 1;
        assert_eq!(page.items.len(), 5);
        seen.extend(page.items.iter().map(|c| c.title.clone()));
        if !page.has_more {
            assert!(page.next_token.is_none());
            break;
        }
        token = page.next_token;
        assert!(token.is_some());
    }

    assert_eq!(pages, 3);
    // no overlap, no omission, stable order
    let expected: Vec<String> = (0..15).map(|i| format!("krithi {i:02}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn token_round_trips_verbatim() {
    let service = service();
    let alice = editor("alice");
    for i in 0..8 {
        service
            .create(&alice, composition(&format!("k{i}"), "telugu", "r1", "t1"))
            .unwrap();
    }

    let first = service
        .search_compositions(
            &alice,
            &SearchParams {
                limit: Some(3),
                ..Default::default()
            },
        )
        .unwrap();
    let token = first.next_token.clone().unwrap();

    // the caller passes the opaque token back unchanged
    let second = service
        .search_compositions(
            &alice,
            &SearchParams {
                limit: Some(3),
                next_token: Some(token),
                ..Default::default()
            },
        )
        .unwrap();

    let first_titles: Vec<&str> = first.items.iter().map(|c| c.title.as_str()).collect();
    let second_titles: Vec<&str> = second.items.iter().map(|c| c.title.as_str()).collect();
    assert!(first_titles.iter().all(|t| !second_titles.contains(t)));
}

#[test]
fn forged_token_is_rejected() {
    let service = service();
    let alice = editor("alice");
    service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    let result = service.search_compositions(
        &alice,
        &SearchParams {
            next_token: Some("forged-token".into()),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn token_from_one_partition_rejected_in_another() {
    let service = service();
    let alice = editor("alice");
    for i in 0..4 {
        service
            .create(
                &alice,
                composition(&format!("sanskrit {i}"), "sanskrit", "r1", "t1"),
            )
            .unwrap();
        service
            .create(
                &alice,
                composition(&format!("telugu {i}"), "telugu", "r1", "t1"),
            )
            .unwrap();
    }

    let sanskrit_page = service
        .search_compositions(
            &alice,
            &SearchParams {
                language: Some("sanskrit".into()),
                limit: Some(2),
                ..Default::default()
            },
        )
        .unwrap();
    let token = sanskrit_page.next_token.unwrap();

    // replaying the Sanskrit cursor into the Telugu partition must fail
    let result = service.search_compositions(
        &alice,
        &SearchParams {
            language: Some("telugu".into()),
            limit: Some(2),
            next_token: Some(token),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn limit_bounds_are_enforced_before_storage() {
    let service = service();
    let alice = editor("alice");

    let over: Result<ragamala::Page<Composition>, _> = service.search_compositions(
        &alice,
        &SearchParams {
            limit: Some(101),
            ..Default::default()
        },
    );
    assert!(matches!(over, Err(Error::Validation(_))));

    let zero: Result<ragamala::Page<Composition>, _> = service.search_compositions(
        &alice,
        &SearchParams {
            limit: Some(0),
            ..Default::default()
        },
    );
    assert!(matches!(zero, Err(Error::Validation(_))));
}
