//! Attribution lifecycle through the facade

use crate::{composition, editor, service};
use ragamala::{
    AttributionPatch, AttributionSearchParams, AttributionType, Confidence, EntityId, Error,
    UserId,
};

#[test]
fn attribute_verify_twice_keeps_one_verifier() {
    let service = service();
    let alice = editor("alice");
    let comp = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();
    let artist = EntityId::new("tyagaraja");

    service
        .attribute(
            &alice,
            comp.id.clone(),
            artist.clone(),
            AttributionType::Primary,
            Confidence::High,
        )
        .unwrap();

    let verifier = editor("vidwan");
    service
        .verify_attribution(&verifier, &comp.id, &artist)
        .unwrap();
    let second = service
        .verify_attribution(&verifier, &comp.id, &artist)
        .unwrap();

    assert_eq!(second.verified_by, vec![UserId::new("vidwan")]);
}

#[test]
fn duplicate_attribution_is_conflict() {
    let service = service();
    let alice = editor("alice");
    let comp = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();
    let artist = EntityId::new("tyagaraja");

    service
        .attribute(
            &alice,
            comp.id.clone(),
            artist.clone(),
            AttributionType::Primary,
            Confidence::High,
        )
        .unwrap();
    let again = service.attribute(
        &alice,
        comp.id.clone(),
        artist,
        AttributionType::Alternative,
        Confidence::Low,
    );
    assert!(matches!(again, Err(Error::Conflict(_))));
}

#[test]
fn disputed_search_is_scoped_by_type_alone() {
    let service = service();
    let alice = editor("alice");

    let c1 = service
        .create(&alice, composition("first", "telugu", "r1", "t1"))
        .unwrap();
    let c2 = service
        .create(&alice, composition("second", "telugu", "r1", "t1"))
        .unwrap();

    service
        .attribute(
            &alice,
            c1.id.clone(),
            EntityId::new("a1"),
            AttributionType::Primary,
            Confidence::High,
        )
        .unwrap();
    service
        .attribute(
            &alice,
            c2.id.clone(),
            EntityId::new("a2"),
            AttributionType::Disputed,
            Confidence::Medium,
        )
        .unwrap();

    // no composition or artist filter: the disputed scope alone decides
    let page = service
        .search_attributions(
            &alice,
            &AttributionSearchParams {
                attribution_type: Some(AttributionType::Disputed),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(page.items.len(), 1);
    assert!(page
        .items
        .iter()
        .all(|a| a.attribution_type == AttributionType::Disputed));
}

#[test]
fn reclassifying_updates_the_disputed_scope() {
    let service = service();
    let alice = editor("alice");
    let comp = service
        .create(&alice, composition("krithi", "telugu", "r1", "t1"))
        .unwrap();
    let artist = EntityId::new("a1");

    service
        .attribute(
            &alice,
            comp.id.clone(),
            artist.clone(),
            AttributionType::Primary,
            Confidence::Medium,
        )
        .unwrap();
    service
        .update_attribution(
            &editor("bob"),
            &comp.id,
            &artist,
            AttributionPatch {
                attribution_type: Some(AttributionType::Disputed),
                confidence: None,
            },
        )
        .unwrap();

    let page = service
        .search_attributions(
            &alice,
            &AttributionSearchParams {
                attribution_type: Some(AttributionType::Disputed),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].confidence, Confidence::Medium);
    assert_eq!(
        page.items[0].edited_by,
        vec![UserId::new("alice"), UserId::new("bob")]
    );
}

#[test]
fn artist_fan_out_resolves_compositions_in_relation_order() {
    let service = service();
    let alice = editor("alice");
    let artist = EntityId::new("tyagaraja");

    let mut comp_ids = Vec::new();
    for title in ["alpha", "beta", "gamma"] {
        let comp = service
            .create(&alice, composition(title, "telugu", "r1", "t1"))
            .unwrap();
        service
            .attribute(
                &alice,
                comp.id.clone(),
                artist.clone(),
                AttributionType::Primary,
                Confidence::High,
            )
            .unwrap();
        comp_ids.push(comp.id.clone());
    }

    let page = service
        .attributions_for_artist(&alice, &artist, None, None)
        .unwrap();
    assert_eq!(page.items.len(), 3);
    for (attribution, resolved) in &page.items {
        let resolved = resolved.as_ref().expect("composition should resolve");
        assert_eq!(resolved.id, attribution.composition_id);
    }

    // relation order is by composition id, matching the GSI sort key
    let mut sorted = comp_ids.clone();
    sorted.sort();
    let listed: Vec<EntityId> = page
        .items
        .iter()
        .map(|(a, _)| a.composition_id.clone())
        .collect();
    assert_eq!(listed, sorted);
}
