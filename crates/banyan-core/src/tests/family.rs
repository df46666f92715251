use super::{person, sample_family};
use crate::store::{Gender, RelationshipKind, RelationshipRecord, Store};
use crate::Family;
use chrono::NaiveDate;

#[test]
fn dates_format_to_their_precision() {
    let family = sample_family(false);

    let george = family.person(1).unwrap();
    assert_eq!(george.date_of_birth.as_deref(), Some("4 March 1887"));
    assert_eq!(george.dates().as_deref(), Some("4 March 1887 – 1 May 1953"));
    assert_eq!(george.years().as_deref(), Some("1887 – 1953"));
    assert_eq!(george.display_name(), "George Banyan (1887 – 1953)");
    assert_eq!(george.born().as_deref(), Some("4 March 1887 in Leeds"));

    // Year-only birth, death known only as a fact.
    let ada = family.person(2).unwrap();
    assert_eq!(ada.date_of_birth.as_deref(), Some("1890"));
    assert_eq!(ada.years().as_deref(), Some("1890 – ?"));
    assert!(ada.dead);
}

#[test]
fn age_uses_death_date_or_reference_day() {
    let family = sample_family(false);

    let george = family.person(1).unwrap();
    let any_day = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    assert_eq!(george.age_at(any_day).as_deref(), Some("66"));

    // Alive: age against the reference date.
    let peter = family.person(6).unwrap();
    let day = NaiveDate::from_ymd_opt(1990, 9, 8).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("54"));
    let day = NaiveDate::from_ymd_opt(1990, 9, 9).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("55"));

    // Death known only as a fact: no age.
    let ada = family.person(2).unwrap();
    assert_eq!(ada.age_at(any_day), None);
}

#[test]
fn infant_ages_use_small_units() {
    let family = sample_family(false);
    let peter = family.person(6).unwrap(); // born 1935-09-09

    let day = NaiveDate::from_ymd_opt(1935, 9, 12).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("3 days"));
    let day = NaiveDate::from_ymd_opt(1935, 9, 30).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("3 weeks"));
    let day = NaiveDate::from_ymd_opt(1935, 11, 20).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("2 months"));
    let day = NaiveDate::from_ymd_opt(1935, 10, 10).unwrap();
    assert_eq!(peter.age_at(day).as_deref(), Some("1 month"));
}

#[test]
fn parents_read_through_spurious_exclusion() {
    let family = sample_family(true);
    // George's father is a spurious record; with exclusion on he reads as
    // parentless rather than erroring.
    assert!(family.father(1).unwrap().is_none());

    let family = sample_family(false);
    assert_eq!(family.father(1).unwrap().unwrap().id, 7);
}

#[test]
fn navigation_matches_the_records() {
    let family = sample_family(false);

    let children: Vec<u32> = family.children(1).unwrap().iter().map(|p| p.id).collect();
    assert_eq!(children, vec![3, 4]);

    let parents: Vec<u32> = family.parents(3).unwrap().iter().map(|p| p.id).collect();
    assert_eq!(parents, vec![1, 2]);

    let siblings: Vec<u32> = family.siblings(4).unwrap().iter().map(|p| p.id).collect();
    assert_eq!(siblings, vec![3]);

    let row: Vec<u32> = family
        .siblings_and_self(4)
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(row, vec![3, 4]);
}

#[test]
fn relationships_resolve_partner_and_description() {
    let family = sample_family(false);

    let rels = family.relationships_of(1).unwrap();
    assert_eq!(rels.len(), 1);
    let r1 = &rels[0];
    assert_eq!(r1.partner, 2);
    assert_eq!(r1.partner_description(Some(Gender::Female)), "wife");
    assert_eq!(r1.started().as_deref(), Some("4 June 1910 in York"));
    // Open-ended span with a dead party renders a question mark.
    assert_eq!(r1.dates().as_deref(), Some("4 June 1910 – ?"));

    let rels = family.relationships_of(3).unwrap();
    let r2 = &rels[0];
    assert!(r2.is_ex());
    assert_eq!(r2.partner_description(Some(Gender::Female)), "ex-wife");
    assert_eq!(
        r2.dates().as_deref(),
        Some("15 January 1933 – 2 February 1940")
    );
    assert_eq!(r2.ended().as_deref(), Some("2 February 1940, divorce"));

    let shared: Vec<u32> = family
        .relationship_children(r2)
        .unwrap()
        .iter()
        .map(|p| p.id)
        .collect();
    assert_eq!(shared, vec![6]);
}

#[test]
fn unstored_couples_get_a_blank_relationship() {
    let family = sample_family(false);

    // Stored either way round.
    let rel = family.relationship(5, 3).unwrap();
    assert_eq!(rel.id, "2");
    assert_eq!(rel.partner, 3);

    // No record between George and Mary: a blank marriage view.
    let rel = family.relationship(1, 5).unwrap();
    assert_eq!(rel.partner, 5);
    assert_eq!(rel.kind, crate::RelationshipKind::Marriage);
    assert_eq!(rel.dates(), None);
    assert!(!rel.is_ex());
}

#[test]
fn parents_key_prefers_the_relationship_id() {
    let family = sample_family(false);
    assert_eq!(family.parents_key(Some(1), Some(2)).as_deref(), Some("r1"));
    assert_eq!(family.parents_key(Some(1), Some(5)).as_deref(), Some("1_5"));
    assert_eq!(family.parents_key(Some(1), None).as_deref(), Some("1_x"));
    assert_eq!(family.parents_key(None, Some(2)).as_deref(), Some("x_2"));
    assert_eq!(family.parents_key(None, None), None);
}

#[test]
fn lines_and_longest_line() {
    let family = sample_family(true);

    let line = family.line(3).unwrap();
    assert!(line.father.is_some());
    assert!(line.mother.is_some());
    assert_eq!(line.children.len(), 1);
    assert_eq!(line.children[0].person, 6);

    // 1 -> 3 -> 6 beats every other chain.
    assert_eq!(family.longest_line().unwrap(), vec![1, 3, 6]);

    let family = sample_family(false);
    assert_eq!(family.longest_line().unwrap(), vec![7, 1, 3, 6]);
}

#[test]
fn kinship_finds_the_common_ancestor() {
    let family = sample_family(true);

    let k = family.kinship(3, 3).unwrap().unwrap();
    assert_eq!((k.shorter_leg, k.generation_difference), (0, 0));

    // Siblings.
    let k = family.kinship(3, 4).unwrap().unwrap();
    assert_eq!((k.shorter_leg, k.generation_difference), (1, 0));

    // Nephew and aunt: Peter is two generations under George, Edith one.
    let k = family.kinship(6, 4).unwrap().unwrap();
    assert_eq!(k.common_ancestor, 1);
    assert_eq!((k.shorter_leg, k.generation_difference), (1, 1));

    // No blood relation.
    assert!(family.kinship(5, 4).unwrap().is_none());
}

#[test]
fn kinship_terms_follow_the_close_kin_table() {
    let family = sample_family(true);

    assert_eq!(family.kinship_term(4, 3).unwrap().as_deref(), Some("brother"));
    assert_eq!(family.kinship_term(6, 1).unwrap().as_deref(), Some("grandfather"));
    assert_eq!(family.kinship_term(6, 4).unwrap().as_deref(), Some("aunt"));
    assert_eq!(family.kinship_term(4, 6).unwrap().as_deref(), Some("nephew"));
    assert_eq!(family.kinship_term(1, 6).unwrap().as_deref(), Some("grandson"));

    // With the spurious record included there is a fourth generation.
    let family = sample_family(false);
    assert_eq!(
        family.kinship_term(6, 7).unwrap().as_deref(),
        Some("great grandfather")
    );
}

#[test]
fn in_law_terms_follow_marriages() {
    let family = sample_family(true);

    // Mary married into the family (and divorced): in-law terms keep the
    // ex- prefix.
    assert_eq!(
        family.kinship_term(5, 1).unwrap().as_deref(),
        Some("ex-father-in-law")
    );
    assert_eq!(
        family.kinship_term(1, 5).unwrap().as_deref(),
        Some("ex-daughter-in-law")
    );
    assert_eq!(
        family.kinship_term(4, 5).unwrap().as_deref(),
        Some("ex-sister-in-law")
    );
}

#[test]
fn marriage_chains_compose_possessive_terms() {
    // Root's sons Tom and Bob; Tom's daughter Jane married Karl, and Tom
    // remarried Sue.
    let root = person(10, "Root Hale", Some(Gender::Male));
    let mut tom = person(11, "Tom Hale", Some(Gender::Male));
    tom.father_id = Some(10);
    let mut bob = person(12, "Bob Hale", Some(Gender::Male));
    bob.father_id = Some(10);
    let mut jane = person(13, "Jane Keel", Some(Gender::Female));
    jane.father_id = Some(11);
    let karl = person(14, "Karl Keel", Some(Gender::Male));
    let sue = person(15, "Sue Hale", Some(Gender::Female));

    let marriage = |id: &str, a: u32, b: u32| RelationshipRecord {
        relationship_id: id.to_string(),
        relationship_type: RelationshipKind::Marriage,
        person_a_id: a,
        person_b_id: b,
        start_date: None,
        start_date_precision: 3,
        place: None,
        end_date: None,
        end_date_precision: 3,
        end_type: None,
    };
    let family = Family::from_store(Store::from_records(
        vec![root, tom, bob, jane, karl, sue],
        vec![marriage("m1", 13, 14), marriage("m2", 11, 15)],
        false,
    ));

    assert_eq!(family.kinship_term(13, 14).unwrap().as_deref(), Some("husband"));
    assert_eq!(
        family.kinship_term(13, 15).unwrap().as_deref(),
        Some("stepmother")
    );
    // No fixed-table entry: composed through the connecting spouse.
    assert_eq!(
        family.kinship_term(14, 12).unwrap().as_deref(),
        Some("wife\u{2019}s uncle")
    );
    assert_eq!(
        family.kinship_term(12, 14).unwrap().as_deref(),
        Some("niece\u{2019}s husband")
    );
}

#[test]
fn export_writes_resolved_names() {
    let family = sample_family(true);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.json");
    family.save_json(&path).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let people = value.as_array().unwrap();
    assert_eq!(people.len(), 6);
    let harold = people
        .iter()
        .find(|p| p["id"] == 3)
        .unwrap();
    assert_eq!(harold["father_id"], 1);
    assert_eq!(harold["father"], "George Banyan (1887 – 1953)");
    assert_eq!(harold["mother_id"], 2);
    assert_eq!(harold["children"][0]["child_id"], 6);
    assert_eq!(harold["children"][0]["child"], "Peter Banyan (b. 1935)");
}
