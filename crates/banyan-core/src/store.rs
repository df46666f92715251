use crate::config::BanyanConfig;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub type PersonId = u32;

/// One row of the people table, as stored on disk.
///
/// Date fields are ISO `YYYY-MM-DD` strings; the matching `*_precision`
/// field says how much of the date is actually known (1 = year only,
/// 2 = year and month, 3 = full date).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub person_id: PersonId,
    pub person_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default = "full_precision")]
    pub date_of_birth_precision: u8,
    #[serde(default)]
    pub place_of_birth: Option<String>,
    #[serde(default)]
    pub date_of_death: Option<String>,
    #[serde(default = "full_precision")]
    pub date_of_death_precision: u8,
    #[serde(default)]
    pub date_of_death_unknown: bool,
    #[serde(default)]
    pub place_of_death: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub father_id: Option<PersonId>,
    #[serde(default)]
    pub mother_id: Option<PersonId>,
    /// Historically dubious records (distant-history guesses) that the site
    /// config can exclude wholesale.
    #[serde(default)]
    pub spurious: bool,
}

fn full_precision() -> u8 {
    3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipKind {
    Marriage,
    Couple,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationshipEnd {
    Marriage,
    Divorce,
    Separation,
    Death,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub relationship_id: String,
    pub relationship_type: RelationshipKind,
    pub person_a_id: PersonId,
    pub person_b_id: PersonId,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default = "full_precision")]
    pub start_date_precision: u8,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default = "full_precision")]
    pub end_date_precision: u8,
    #[serde(default)]
    pub end_type: Option<RelationshipEnd>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    people: Vec<PersonRecord>,
    #[serde(default)]
    relationships: Vec<RelationshipRecord>,
}

/// File-backed record store. All queries honor the `family.excludeSpurious`
/// config switch: excluded people vanish from listings and resolving one by
/// id is reported as a `SpuriousConnection`.
#[derive(Debug, Clone, Default)]
pub struct Store {
    people: IndexMap<PersonId, PersonRecord>,
    relationships: Vec<RelationshipRecord>,
    exclude_spurious: bool,
}

impl Store {
    pub fn open(config: &BanyanConfig) -> Result<Self> {
        let path = config.get_str("store.path").unwrap_or("family_tree.json");
        let exclude_spurious = config.get_bool("family.excludeSpurious").unwrap_or(false);
        Self::open_path(path, exclude_spurious)
    }

    pub fn open_path(path: impl AsRef<Path>, exclude_spurious: bool) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })?;
        let file: StoreFile = serde_json::from_str(&text).map_err(|e| Error::Store {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Ok(Self::from_records(
            file.people,
            file.relationships,
            exclude_spurious,
        ))
    }

    pub fn from_records(
        people: Vec<PersonRecord>,
        relationships: Vec<RelationshipRecord>,
        exclude_spurious: bool,
    ) -> Self {
        let mut map = IndexMap::new();
        for record in people {
            if let Some(old) = map.insert(record.person_id, record) {
                tracing::warn!(id = old.person_id, "duplicate person id, later record wins");
            }
        }
        map.sort_keys();

        // Dangling relationships are dropped rather than erroring every page
        // that later walks them.
        let relationships = relationships
            .into_iter()
            .filter(|r| {
                let ok = map.contains_key(&r.person_a_id) && map.contains_key(&r.person_b_id);
                if !ok {
                    tracing::warn!(id = %r.relationship_id, "relationship references unknown person");
                }
                ok
            })
            .collect();

        Self {
            people: map,
            relationships,
            exclude_spurious,
        }
    }

    pub fn exclude_spurious(&self) -> bool {
        self.exclude_spurious
    }

    fn visible(&self, record: &PersonRecord) -> bool {
        !(self.exclude_spurious && record.spurious)
    }

    /// All visible ids, ascending.
    pub fn ids(&self) -> Vec<PersonId> {
        self.people
            .values()
            .filter(|r| self.visible(r))
            .map(|r| r.person_id)
            .collect()
    }

    pub fn person(&self, id: PersonId) -> Result<&PersonRecord> {
        let record = self
            .people
            .get(&id)
            .ok_or(Error::UnknownPerson { id })?;
        if !self.visible(record) {
            return Err(Error::SpuriousConnection { id });
        }
        Ok(record)
    }

    pub fn people(&self) -> impl Iterator<Item = &PersonRecord> {
        self.people.values().filter(|r| self.visible(r))
    }

    /// Case-insensitive name substring search, ascending by id.
    pub fn people_matching(&self, needle: &str) -> Vec<&PersonRecord> {
        let needle = needle.to_lowercase();
        self.people()
            .filter(|r| r.person_name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Children of `id`, in birth order (unknown birth dates last).
    pub fn children_of(&self, id: PersonId) -> Vec<&PersonRecord> {
        let mut children: Vec<&PersonRecord> = self
            .people()
            .filter(|r| r.father_id == Some(id) || r.mother_id == Some(id))
            .collect();
        children.sort_by(|a, b| birth_order_key(a).cmp(&birth_order_key(b)));
        children
    }

    /// People sharing at least one parent with `id` (excluding `id`).
    pub fn siblings_of(&self, id: PersonId) -> Result<Vec<&PersonRecord>> {
        let subject = self.person(id)?;
        let mut siblings: Vec<&PersonRecord> = self
            .people()
            .filter(|r| r.person_id != id)
            .filter(|r| {
                (r.father_id.is_some() && r.father_id == subject.father_id)
                    || (r.mother_id.is_some() && r.mother_id == subject.mother_id)
            })
            .collect();
        siblings.sort_by(|a, b| birth_order_key(a).cmp(&birth_order_key(b)));
        Ok(siblings)
    }

    /// People sharing both parents with `id`, where an unrecorded parent on
    /// both sides counts as shared. The subject must have at least one
    /// recorded parent.
    pub fn full_siblings_of(&self, id: PersonId) -> Result<Vec<&PersonRecord>> {
        let subject = self.person(id)?;
        Ok(self
            .siblings_of(id)?
            .into_iter()
            .filter(|r| full_sibling_of(r, subject))
            .collect())
    }

    pub fn half_siblings_of(&self, id: PersonId) -> Result<Vec<&PersonRecord>> {
        let subject = self.person(id)?;
        Ok(self
            .siblings_of(id)?
            .into_iter()
            .filter(|r| !full_sibling_of(r, subject))
            .collect())
    }

    /// Relationship records involving `id`, paired with the partner's id.
    pub fn partners_of(&self, id: PersonId) -> Vec<(PersonId, &RelationshipRecord)> {
        self.relationships
            .iter()
            .filter_map(|r| {
                if r.person_a_id == id {
                    Some((r.person_b_id, r))
                } else if r.person_b_id == id {
                    Some((r.person_a_id, r))
                } else {
                    None
                }
            })
            .filter(|(partner, _)| {
                self.people
                    .get(partner)
                    .map(|p| self.visible(p))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// The relationship record between `a` and `b`, in either order.
    pub fn relationship(&self, a: PersonId, b: PersonId) -> Option<&RelationshipRecord> {
        self.relationships.iter().find(|r| {
            (r.person_a_id == a && r.person_b_id == b)
                || (r.person_a_id == b && r.person_b_id == a)
        })
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipRecord> {
        self.relationships.iter()
    }

    /// Parent id -> birth-ordered child ids, over the whole store.
    pub fn parent_child_pairs(&self) -> IndexMap<PersonId, Vec<PersonId>> {
        let mut out: IndexMap<PersonId, Vec<PersonId>> = IndexMap::new();
        for parent in self.ids() {
            let children: Vec<PersonId> = self
                .children_of(parent)
                .into_iter()
                .map(|r| r.person_id)
                .collect();
            if !children.is_empty() {
                out.insert(parent, children);
            }
        }
        out
    }
}

fn full_sibling_of(record: &PersonRecord, subject: &PersonRecord) -> bool {
    (subject.father_id.is_some() || subject.mother_id.is_some())
        && record.father_id == subject.father_id
        && record.mother_id == subject.mother_id
}

/// Spurious records sort after real ones, then unknown birth dates last.
fn birth_order_key(record: &PersonRecord) -> (bool, bool, &str, PersonId) {
    match record.date_of_birth.as_deref() {
        Some(date) => (record.spurious, false, date, record.person_id),
        None => (record.spurious, true, "", record.person_id),
    }
}
