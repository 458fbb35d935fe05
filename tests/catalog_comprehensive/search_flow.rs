//! Search dispatch through the facade

use crate::{composition, editor, service};
use ragamala::{
    AttributionType, Composition, Confidence, EntityId, Raga, SearchParams,
};

#[test]
fn prefix_search_finds_normalized_titles() {
    let service = service();
    let alice = editor("alice");

    service
        .create(&alice, composition("vathapi ganapathim ", "sanskrit", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("endaro mahanubhavulu", "telugu", "r1", "t1"))
        .unwrap();

    // messy query whitespace is cleaned before dispatch
    let page = service
        .search_compositions(&alice, &SearchParams::query("  vathapi  "))
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "vathapi ganapathim");
}

#[test]
fn letter_search_is_a_one_char_prefix() {
    let service = service();
    let alice = editor("alice");
    for title in ["vathapi ganapathim", "vara leela", "endaro mahanubhavulu"] {
        service
            .create(&alice, composition(title, "telugu", "r1", "t1"))
            .unwrap();
    }

    let page = service
        .search_compositions(&alice, &SearchParams::query("v"))
        .unwrap();
    assert_eq!(page.items.len(), 2);
}

#[test]
fn language_search_canonicalizes_before_dispatch() {
    let service = service();
    let alice = editor("alice");
    service
        .create(&alice, composition("krithi one", "sanskrit", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("krithi two", "telugu", "r1", "t1"))
        .unwrap();

    // stored rows carry "Sanskrit"; the lowercase input must still hit
    let page = service
        .search_compositions(
            &alice,
            &SearchParams {
                language: Some("sanskrit".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].language, "Sanskrit");
}

#[test]
fn tradition_search_spans_kinds_separately() {
    let service = service();
    let alice = editor("alice");
    service
        .create(&alice, Raga::new("kalyani", "carnatic", "alice".into()))
        .unwrap();
    service
        .create(&alice, Raga::new("yaman", "hindustani", "alice".into()))
        .unwrap();

    let page: ragamala::Page<Raga> = service
        .search(
            &alice,
            &SearchParams {
                tradition: Some("hindustani".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].name, "yaman");
}

#[test]
fn raga_and_tala_filters_use_reference_slots() {
    let service = service();
    let alice = editor("alice");
    service
        .create(&alice, composition("in kalyani", "telugu", "kalyani", "adi"))
        .unwrap();
    service
        .create(&alice, composition("in todi", "telugu", "todi", "rupaka"))
        .unwrap();

    let by_raga = service
        .search_compositions(
            &alice,
            &SearchParams {
                raga_id: Some(EntityId::new("kalyani")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(by_raga.items.len(), 1);
    assert_eq!(by_raga.items[0].title, "in kalyani");

    let by_tala = service
        .search_compositions(
            &alice,
            &SearchParams {
                tala_id: Some(EntityId::new("rupaka")),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(by_tala.items.len(), 1);
    assert_eq!(by_tala.items[0].title, "in todi");
}

#[test]
fn artist_filter_fans_out_through_attributions() {
    let service = service();
    let alice = editor("alice");
    let artist = EntityId::new("dikshitar");

    let attributed = service
        .create(&alice, composition("vathapi ganapathim", "sanskrit", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("unrelated", "telugu", "r1", "t1"))
        .unwrap();
    service
        .attribute(
            &alice,
            attributed.id.clone(),
            artist.clone(),
            AttributionType::Primary,
            Confidence::High,
        )
        .unwrap();

    let page = service
        .search_compositions(
            &alice,
            &SearchParams {
                artist_id: Some(artist),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "vathapi ganapathim");
}

#[test]
fn query_outranks_other_filters() {
    let service = service();
    let alice = editor("alice");
    service
        .create(&alice, composition("alpha krithi", "sanskrit", "r1", "t1"))
        .unwrap();
    service
        .create(&alice, composition("beta krithi", "telugu", "r2", "t2"))
        .unwrap();

    // both a query and a language filter: the query branch must win
    let page = service
        .search_compositions(
            &alice,
            &SearchParams {
                query: Some("beta".into()),
                language: Some("sanskrit".into()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].title, "beta krithi");
}

#[test]
fn popularity_ranking_is_best_first() {
    let service = service();
    let alice = editor("alice");

    let _quiet = service
        .create(&alice, composition("quiet", "telugu", "r1", "t1"))
        .unwrap();
    let liked = service
        .create(&alice, composition("liked", "telugu", "r1", "t1"))
        .unwrap();
    let viral = service
        .create(&alice, composition("viral", "telugu", "r1", "t1"))
        .unwrap();

    service.favorite::<Composition>(&alice, &liked.id).unwrap();
    for _ in 0..3 {
        service
            .record_view::<Composition>(&alice, &viral.id)
            .unwrap();
    }
    service.favorite::<Composition>(&alice, &viral.id).unwrap();

    let page: ragamala::Page<Composition> = service.popular(&alice, Some(10), None).unwrap();
    let titles: Vec<&str> = page.items.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["viral", "liked", "quiet"]);
}
