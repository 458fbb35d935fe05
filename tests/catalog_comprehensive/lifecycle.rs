//! Create / read / update / version / delete flows

use crate::{composition, editor, service};
use ragamala::{Composition, EntityId, Error, Raga, UserId};

#[test]
fn create_then_get_returns_latest_with_creator() {
    let service = service();
    let alice = editor("alice");

    let created = service
        .create(&alice, composition("endaro mahanubhavulu", "telugu", "r1", "t1"))
        .unwrap();

    let read: Composition = service.get(&alice, &created.id, None).unwrap();
    assert!(read.revision.is_latest);
    assert_eq!(read.revision.version, 1);
    assert_eq!(read.revision.edited_by, vec![UserId::new("alice")]);
    assert_eq!(read.revision.added_by, UserId::new("alice"));
}

#[test]
fn create_normalizes_title_and_language() {
    let service = service();
    let alice = editor("alice");

    // the scenario from the input contract: trailing space, lowercase language
    let created = service
        .create(&alice, composition("vathapi ganapathim ", "sanskrit", "r1", "t1"))
        .unwrap();

    assert_eq!(created.title, "vathapi ganapathim");
    assert_eq!(created.language, "Sanskrit");
    assert_eq!(created.tradition, "Carnatic");
}

#[test]
fn get_missing_is_not_found() {
    let service = service();
    let result: Result<Composition, _> =
        service.get(&editor("alice"), &EntityId::new("ghost"), None);
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[test]
fn update_merges_without_new_version() {
    let service = service();
    let alice = editor("alice");
    let bob = editor("bob");

    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    let updated: Composition = service
        .update(&bob, &created.id, |c: &mut Composition| {
            c.meaning = Some("in praise of the assembled devotees".into())
        })
        .unwrap();

    assert_eq!(updated.revision.version, 1);
    assert_eq!(
        updated.revision.edited_by,
        vec![UserId::new("alice"), UserId::new("bob")]
    );
    assert_eq!(updated.revision.created_at, created.revision.created_at);
    assert!(updated.revision.updated_at >= created.revision.updated_at);
}

#[test]
fn version_history_grows_and_keeps_one_latest() {
    let service = service();
    let alice = editor("alice");
    let created = service
        .create(&alice, Raga::new("kalyani", "carnatic", "alice".into()))
        .unwrap();

    service
        .create_version(&alice, &created.id, |r: &mut Raga| r.melakarta = Some(65))
        .unwrap();
    service
        .create_version(&editor("bob"), &created.id, |r: &mut Raga| {
            r.arohanam = Some("S R2 G3 M2 P D2 N3 S".into())
        })
        .unwrap();

    let history: Vec<Raga> = service.history(&alice, &created.id).unwrap();
    let versions: Vec<u32> = history.iter().map(|r| r.revision.version).collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(history.iter().filter(|r| r.revision.is_latest).count(), 1);

    // a historical version is readable and immutable
    let v1: Raga = service.get(&alice, &created.id, Some(1)).unwrap();
    assert_eq!(v1.melakarta, None);
    assert!(!v1.revision.is_latest);
}

#[test]
fn delete_removes_history_and_cascades_attributions() {
    let service = service();
    let alice = editor("alice");

    let comp = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();
    service
        .create_version(&alice, &comp.id, |_: &mut Composition| {})
        .unwrap();
    service
        .attribute(
            &alice,
            comp.id.clone(),
            EntityId::new("tyagaraja"),
            ragamala::AttributionType::Primary,
            ragamala::Confidence::High,
        )
        .unwrap();

    service.delete::<Composition>(&alice, &comp.id).unwrap();

    let read: Result<Composition, _> = service.get(&alice, &comp.id, None);
    assert!(matches!(read, Err(Error::NotFound { .. })));
    let v1: Result<Composition, _> = service.get(&alice, &comp.id, Some(1));
    assert!(matches!(v1, Err(Error::NotFound { .. })));

    let attrs = service
        .search_attributions(
            &alice,
            &ragamala::AttributionSearchParams {
                composition_id: Some(comp.id.clone()),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(attrs.items.is_empty());
}

#[test]
fn anonymous_callers_cannot_write() {
    let service = service();
    let result = service.create(
        &ragamala::Caller::anonymous(),
        composition("krithi", "telugu", "r1", "t1"),
    );
    assert!(matches!(result, Err(Error::Validation(_))));
}

#[test]
fn views_and_favorites_move_popularity() {
    let service = service();
    let alice = editor("alice");
    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    service
        .record_view::<Composition>(&alice, &created.id)
        .unwrap();
    service
        .record_view::<Composition>(&alice, &created.id)
        .unwrap();
    service.favorite::<Composition>(&alice, &created.id).unwrap();

    let read: Composition = service.get(&alice, &created.id, None).unwrap();
    assert_eq!(read.revision.view_count, 2);
    assert_eq!(read.revision.favorite_count, 1);
    assert_eq!(read.revision.popularity_score, 12);
    // counters are not edits
    assert_eq!(read.revision.edited_by, vec![UserId::new("alice")]);
}

#[test]
fn bot_views_are_not_applied() {
    let service = service();
    let alice = editor("alice");
    let created = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();

    let bot = ragamala::Caller::user("crawler").bot();
    service.record_view::<Composition>(&bot, &created.id).unwrap();

    let read: Composition = service.get(&alice, &created.id, None).unwrap();
    assert_eq!(read.revision.view_count, 0);
}
