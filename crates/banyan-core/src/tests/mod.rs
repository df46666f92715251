mod family;

use crate::store::{
    Gender, PersonRecord, RelationshipEnd, RelationshipKind, RelationshipRecord, Store,
};
use crate::Family;

pub(crate) fn person(id: u32, name: &str, gender: Option<Gender>) -> PersonRecord {
    PersonRecord {
        person_id: id,
        person_name: name.to_string(),
        gender,
        date_of_birth: None,
        date_of_birth_precision: 3,
        place_of_birth: None,
        date_of_death: None,
        date_of_death_precision: 3,
        date_of_death_unknown: false,
        place_of_death: None,
        occupation: None,
        notes: None,
        father_id: None,
        mother_id: None,
        spurious: false,
    }
}

/// Three generations of Banyans:
///
/// ```text
///   7 (spurious)
///   |
///   1 George ══r1══ 2 Ada
///        |               |
///   3 Harold ══r2══ 5 Mary      4 Edith
///        |
///   6 Peter
/// ```
pub(crate) fn sample_records() -> (Vec<PersonRecord>, Vec<RelationshipRecord>) {
    let mut george = person(1, "George Banyan", Some(Gender::Male));
    george.date_of_birth = Some("1887-03-04".into());
    george.date_of_death = Some("1953-05-01".into());
    george.place_of_birth = Some("Leeds".into());
    george.occupation = Some("Joiner".into());
    george.father_id = Some(7);

    let mut ada = person(2, "Ada Banyan", Some(Gender::Female));
    ada.date_of_birth = Some("1890-01-01".into());
    ada.date_of_birth_precision = 1;
    ada.date_of_death_unknown = true;

    let mut harold = person(3, "Harold Banyan", Some(Gender::Male));
    harold.date_of_birth = Some("1912-02-10".into());
    harold.father_id = Some(1);
    harold.mother_id = Some(2);
    harold.notes = Some("Kept bees.\n- won a prize in 1950\n- lost the bees".into());

    let mut edith = person(4, "Edith Moss", Some(Gender::Female));
    edith.date_of_birth = Some("1915-07-22".into());
    edith.father_id = Some(1);
    edith.mother_id = Some(2);

    let mut mary = person(5, "Mary Banyan", Some(Gender::Female));
    mary.date_of_birth = Some("1914-05-05".into());

    let mut peter = person(6, "Peter Banyan", Some(Gender::Male));
    peter.date_of_birth = Some("1935-09-09".into());
    peter.father_id = Some(3);
    peter.mother_id = Some(5);

    let mut old = person(7, "Old Banyan", Some(Gender::Male));
    old.spurious = true;

    let r1 = RelationshipRecord {
        relationship_id: "1".into(),
        relationship_type: RelationshipKind::Marriage,
        person_a_id: 1,
        person_b_id: 2,
        start_date: Some("1910-06-04".into()),
        start_date_precision: 3,
        place: Some("York".into()),
        end_date: None,
        end_date_precision: 3,
        end_type: None,
    };
    let r2 = RelationshipRecord {
        relationship_id: "2".into(),
        relationship_type: RelationshipKind::Marriage,
        person_a_id: 3,
        person_b_id: 5,
        start_date: Some("1933-01-15".into()),
        start_date_precision: 3,
        place: None,
        end_date: Some("1940-02-02".into()),
        end_date_precision: 3,
        end_type: Some(RelationshipEnd::Divorce),
    };

    (
        vec![george, ada, harold, edith, mary, peter, old],
        vec![r1, r2],
    )
}

pub(crate) fn sample_family(exclude_spurious: bool) -> Family {
    let (people, relationships) = sample_records();
    Family::from_store(Store::from_records(people, relationships, exclude_spurious))
}
