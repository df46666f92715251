use banyan_core::{
    Family, Gender, PersonRecord, RelationshipKind, RelationshipRecord, Store,
};

pub fn person(id: u32, name: &str, gender: Option<Gender>) -> PersonRecord {
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

/// George ══ Ada, with children Harold and Edith; Harold's son Peter.
pub fn sample_family() -> Family {
    let mut george = person(1, "George Banyan", Some(Gender::Male));
    george.date_of_birth = Some("1887-03-04".into());
    george.date_of_death = Some("1953-05-01".into());
    george.place_of_birth = Some("Leeds".into());
    george.occupation = Some("Joiner".into());

    let mut ada = person(2, "Ada Banyan", Some(Gender::Female));
    ada.date_of_birth = Some("1890-01-01".into());
    ada.date_of_birth_precision = 1;

    let mut harold = person(3, "Harold Banyan", Some(Gender::Male));
    harold.date_of_birth = Some("1912-02-10".into());
    harold.father_id = Some(1);
    harold.mother_id = Some(2);
    harold.notes = Some("Kept bees & sold honey.".into());

    let mut edith = person(4, "Edith Moss", Some(Gender::Female));
    edith.date_of_birth = Some("1915-07-22".into());
    edith.father_id = Some(1);
    edith.mother_id = Some(2);

    let mut peter = person(6, "Peter Banyan", Some(Gender::Male));
    peter.date_of_birth = Some("1935-09-09".into());
    peter.father_id = Some(3);

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

    Family::from_store(Store::from_records(
        vec![george, ada, harold, edith, peter],
        vec![r1],
        false,
    ))
}
