use crate::config::BanyanConfig;
use crate::error::{Error, Result};
use crate::store::{
    Gender, PersonId, PersonRecord, RelationshipEnd, RelationshipKind, RelationshipRecord, Store,
};
use chrono::{Datelike, NaiveDate};
use serde_json::json;
use std::path::Path;

/// The family model: a record store plus view construction for people,
/// relationships, lines and kinship.
///
/// Views (`Person`, `Relationship`) are cheap value types derived from the
/// stored records; navigation between people goes through `Family` methods so
/// the model never holds cyclic references.
#[derive(Debug, Clone)]
pub struct Family {
    store: Store,
    config: BanyanConfig,
}

impl Family {
    pub fn open(config: BanyanConfig) -> Result<Self> {
        let store = Store::open(&config)?;
        Ok(Self { store, config })
    }

    pub fn from_store(store: Store) -> Self {
        Self {
            store,
            config: BanyanConfig::default(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &BanyanConfig {
        &self.config
    }

    pub fn ids(&self) -> Vec<PersonId> {
        self.store.ids()
    }

    pub fn person(&self, id: PersonId) -> Result<Person> {
        Person::from_record(self.store.person(id)?)
    }

    pub fn people(&self) -> Result<Vec<Person>> {
        self.store.people().map(Person::from_record).collect()
    }

    /// Case-insensitive name search.
    pub fn search(&self, needle: &str) -> Result<Vec<Person>> {
        self.store
            .people_matching(needle)
            .into_iter()
            .map(Person::from_record)
            .collect()
    }

    /// A parent link to a spurious-excluded person reads as no parent.
    pub fn father(&self, id: PersonId) -> Result<Option<Person>> {
        self.parent_view(self.store.person(id)?.father_id)
    }

    pub fn mother(&self, id: PersonId) -> Result<Option<Person>> {
        self.parent_view(self.store.person(id)?.mother_id)
    }

    fn parent_view(&self, parent_id: Option<PersonId>) -> Result<Option<Person>> {
        let Some(pid) = parent_id else {
            return Ok(None);
        };
        match self.store.person(pid) {
            Ok(record) => Ok(Some(Person::from_record(record)?)),
            Err(Error::SpuriousConnection { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn parents(&self, id: PersonId) -> Result<Vec<Person>> {
        let mut out = Vec::new();
        if let Some(father) = self.father(id)? {
            out.push(father);
        }
        if let Some(mother) = self.mother(id)? {
            out.push(mother);
        }
        Ok(out)
    }

    pub fn children(&self, id: PersonId) -> Result<Vec<Person>> {
        self.store
            .children_of(id)
            .into_iter()
            .map(Person::from_record)
            .collect()
    }

    pub fn siblings(&self, id: PersonId) -> Result<Vec<Person>> {
        self.store
            .siblings_of(id)?
            .into_iter()
            .map(Person::from_record)
            .collect()
    }

    pub fn full_siblings(&self, id: PersonId) -> Result<Vec<Person>> {
        self.store
            .full_siblings_of(id)?
            .into_iter()
            .map(Person::from_record)
            .collect()
    }

    pub fn half_siblings(&self, id: PersonId) -> Result<Vec<Person>> {
        self.store
            .half_siblings_of(id)?
            .into_iter()
            .map(Person::from_record)
            .collect()
    }

    /// Subject's siblings plus the subject, in birth order.
    pub fn siblings_and_self(&self, id: PersonId) -> Result<Vec<Person>> {
        let mut out = self.siblings(id)?;
        out.push(self.person(id)?);
        out.sort_by_key(Person::birth_order_key);
        Ok(out)
    }

    /// All relationships the subject is part of, partner resolved.
    pub fn relationships_of(&self, id: PersonId) -> Result<Vec<Relationship>> {
        let mut out = Vec::new();
        for (partner_id, record) in self.store.partners_of(id) {
            out.push(self.relationship_view(record, partner_id)?);
        }
        Ok(out)
    }

    pub fn get_relationship(&self, a: PersonId, b: PersonId) -> Result<Option<Relationship>> {
        match self.store.relationship(a, b) {
            Some(record) => {
                let partner = if record.person_a_id == a {
                    record.person_b_id
                } else {
                    record.person_a_id
                };
                Ok(Some(self.relationship_view(record, partner)?))
            }
            None => Ok(None),
        }
    }

    /// The relationship between two people, stored or not: couples known only
    /// through shared children get a view over a blank marriage record.
    pub fn relationship(&self, a: PersonId, b: PersonId) -> Result<Relationship> {
        if let Some(rel) = self.get_relationship(a, b)? {
            return Ok(rel);
        }
        let record = Relationship::blank_record(a, b);
        self.relationship_view(&record, b)
    }

    fn relationship_view(&self, record: &RelationshipRecord, partner: PersonId) -> Result<Relationship> {
        let a = self.person(record.person_a_id)?;
        let b = self.person(record.person_b_id)?;
        Relationship::from_record(record, partner, a.dead || b.dead)
    }

    /// Children shared by both partners of a relationship, in birth order.
    pub fn relationship_children(&self, rel: &Relationship) -> Result<Vec<Person>> {
        self.store
            .children_of(rel.person_a)
            .into_iter()
            .filter(|r| {
                r.father_id == Some(rel.person_b) || r.mother_id == Some(rel.person_b)
            })
            .map(Person::from_record)
            .collect()
    }

    /// Stable key identifying a couple (or single parent) for grouping
    /// sibling sets: `r<relationship-id>` when the couple has a stored
    /// relationship, otherwise composed from the parent ids.
    pub fn parents_key(
        &self,
        father: Option<PersonId>,
        mother: Option<PersonId>,
    ) -> Option<String> {
        match (father, mother) {
            (Some(f), Some(m)) => match self.store.relationship(f, m) {
                Some(rel) => Some(format!("r{}", rel.relationship_id)),
                None => Some(format!("{f}_{m}")),
            },
            (Some(f), None) => Some(format!("{f}_x")),
            (None, Some(m)) => Some(format!("x_{m}")),
            (None, None) => None,
        }
    }

    /// Couple key for the subject's own parents (spurious-excluded parents
    /// read as absent, matching `father()`/`mother()`).
    pub fn parents_key_of(&self, id: PersonId) -> Result<Option<String>> {
        let father = self.father(id)?.map(|p| p.id);
        let mother = self.mother(id)?.map(|p| p.id);
        Ok(self.parents_key(father, mother))
    }

    pub fn ancestors(&self, id: PersonId) -> Result<LineNode> {
        let mut node = LineNode::new(id);
        if let Some(father) = self.father(id)? {
            node.father = Some(Box::new(self.ancestors(father.id)?));
        }
        if let Some(mother) = self.mother(id)? {
            node.mother = Some(Box::new(self.ancestors(mother.id)?));
        }
        Ok(node)
    }

    pub fn descendants(&self, id: PersonId) -> Result<LineNode> {
        let mut node = LineNode::new(id);
        for child in self.children(id)? {
            node.children.push(self.descendants(child.id)?);
        }
        Ok(node)
    }

    /// Ancestors and descendants of one person in a single tree.
    pub fn line(&self, id: PersonId) -> Result<LineNode> {
        let mut node = self.ancestors(id)?;
        node.children = self.descendants(id)?.children;
        Ok(node)
    }

    fn longest_ancestor_line(&self, id: PersonId) -> Result<Vec<PersonId>> {
        let father_line = match self.father(id)? {
            Some(f) => self.longest_ancestor_line(f.id)?,
            None => Vec::new(),
        };
        let mother_line = match self.mother(id)? {
            Some(m) => self.longest_ancestor_line(m.id)?,
            None => Vec::new(),
        };
        let mut line = if father_line.len() >= mother_line.len() {
            father_line
        } else {
            mother_line
        };
        line.push(id);
        Ok(line)
    }

    fn longest_descendant_line(&self, id: PersonId) -> Result<Vec<PersonId>> {
        let mut best = Vec::new();
        for child in self.children(id)? {
            let line = self.longest_descendant_line(child.id)?;
            if line.len() > best.len() {
                best = line;
            }
        }
        let mut out = vec![id];
        out.extend(best);
        Ok(out)
    }

    pub fn longest_line_of(&self, id: PersonId) -> Result<Vec<PersonId>> {
        let mut line = self.longest_ancestor_line(id)?;
        line.extend(self.longest_descendant_line(id)?.into_iter().skip(1));
        Ok(line)
    }

    /// The longest unbroken ancestor-to-descendant chain in the whole family.
    pub fn longest_line(&self) -> Result<Vec<PersonId>> {
        let mut best = Vec::new();
        for id in self.ids() {
            let line = self.longest_line_of(id)?;
            if line.len() > best.len() {
                best = line;
            }
        }
        Ok(best)
    }

    /// Nearest common blood ancestor of `a` and `b`.
    ///
    /// Returns `(ancestor, shorter_leg, a_depth - b_depth)`: the generation
    /// count of the closer party and the generation difference between the
    /// two legs. `None` means no blood relation.
    pub fn kinship(&self, a: PersonId, b: PersonId) -> Result<Option<Kinship>> {
        if a == b {
            return Ok(Some(Kinship {
                common_ancestor: a,
                shorter_leg: 0,
                generation_difference: 0,
            }));
        }

        let mut a_gens: Vec<Vec<PersonId>> = vec![vec![a]];
        let mut b_gens: Vec<Vec<PersonId>> = vec![vec![b]];
        let mut a_done = false;
        let mut b_done = false;

        while !(a_done && b_done) {
            if !a_done {
                let parents = self.generation_parents(a_gens.last().map_or(&[], Vec::as_slice))?;
                if parents.is_empty() {
                    a_done = true;
                } else {
                    a_gens.push(parents);
                }
            }
            if !b_done {
                let parents = self.generation_parents(b_gens.last().map_or(&[], Vec::as_slice))?;
                if parents.is_empty() {
                    b_done = true;
                } else {
                    b_gens.push(parents);
                }
            }

            if !a_done {
                let newest = a_gens.last().cloned().unwrap_or_default();
                for ancestor in &newest {
                    if let Some(b_depth) = depth_of(*ancestor, &b_gens) {
                        let a_depth = a_gens.len() - 1;
                        return Ok(Some(Kinship::from_depths(*ancestor, a_depth, b_depth)));
                    }
                }
            }
            if !b_done {
                let newest = b_gens.last().cloned().unwrap_or_default();
                for ancestor in &newest {
                    if let Some(a_depth) = depth_of(*ancestor, &a_gens) {
                        let b_depth = b_gens.len() - 1;
                        return Ok(Some(Kinship::from_depths(*ancestor, a_depth, b_depth)));
                    }
                }
            }
        }

        Ok(None)
    }

    /// English term for how `other` relates to `subject`: `brother`,
    /// `great aunt`, `mother-in-law`, `wife’s cousin`. Blood relations are
    /// named first, then relations through either party's marriages or
    /// partnerships. `None` when the pair is unrelated, or the chain is too
    /// distant for the fixed tables and the `family.maxGreatLevels` cutoff.
    pub fn kinship_term(&self, subject: PersonId, other: PersonId) -> Result<Option<String>> {
        let other_gender = self.person(other)?.gender;
        let max_great = self
            .config
            .get_u32("family.maxGreatLevels")
            .unwrap_or(3) as i32;

        if let Some(kinship) = self.kinship(subject, other)? {
            return Ok(kinship_term_for(kinship, other_gender, max_great));
        }

        // Through the subject's partner: "mother-in-law", "stepdaughter",
        // or a possessive "wife's uncle" where the spousal table is silent.
        for rel in self.relationships_of(subject)? {
            let Some(kinship) = self.kinship(rel.partner, other)? else {
                continue;
            };
            if rel.kind == RelationshipKind::Marriage {
                if let Some(term) = spousal_kin_term(
                    kinship.shorter_leg,
                    kinship.generation_difference,
                    other_gender,
                ) {
                    return Ok(Some(format!("{}{term}", rel.ex_prefix())));
                }
            }
            let Some(term) = kinship_term_for(kinship, other_gender, max_great) else {
                return Ok(None);
            };
            let head = spouse_word(rel.kind, self.person(rel.partner)?.gender);
            let composed = format!("{}{head}\u{2019}s {term}", rel.ex_prefix());
            return Ok(Some(drop_self(composed)));
        }

        // Through the other person's partner: "son-in-law", "stepmother",
        // or "niece's husband" where the affine table is silent.
        for rel in self.relationships_of(other)? {
            let Some(kinship) = self.kinship(subject, rel.partner)? else {
                continue;
            };
            if rel.kind == RelationshipKind::Marriage {
                if let Some(term) = affine_kin_term(
                    kinship.shorter_leg,
                    kinship.generation_difference,
                    other_gender,
                ) {
                    return Ok(Some(format!("{}{term}", rel.ex_prefix())));
                }
            }
            let partner_gender = self.person(rel.partner)?.gender;
            let Some(term) = kinship_term_for(kinship, partner_gender, max_great) else {
                return Ok(None);
            };
            let tail = spouse_word(rel.kind, other_gender);
            let composed = format!("{term}\u{2019}s {}{tail}", rel.ex_prefix());
            return Ok(Some(drop_self(composed)));
        }

        Ok(None)
    }

    fn generation_parents(&self, generation: &[PersonId]) -> Result<Vec<PersonId>> {
        let mut out = Vec::new();
        for id in generation {
            if let Some(father) = self.father(*id)? {
                out.push(father.id);
            }
            if let Some(mother) = self.mother(*id)? {
                out.push(mother.id);
            }
        }
        Ok(out)
    }

    /// Exports every person as a JSON document: record fields plus the
    /// parent and child links both as ids and as resolved display names.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut out = Vec::new();
        for id in self.ids() {
            let person = self.person(id)?;
            let father = self.father(id)?;
            let mother = self.mother(id)?;
            let children: Vec<serde_json::Value> = self
                .children(id)?
                .iter()
                .map(|c| json!({ "child_id": c.id, "child": c.display_name() }))
                .collect();
            out.push(json!({
                "id": person.id,
                "name": person.name,
                "gender": person.gender,
                "date_of_birth": person.date_of_birth,
                "place_of_birth": person.place_of_birth,
                "date_of_death": person.date_of_death,
                "place_of_death": person.place_of_death,
                "father_id": father.as_ref().map(|p| p.id),
                "father": father.as_ref().map(Person::display_name),
                "mother_id": mother.as_ref().map(|p| p.id),
                "mother": mother.as_ref().map(Person::display_name),
                "children": children,
            }));
        }
        let text = serde_json::to_string_pretty(&out)?;
        let path = path.as_ref();
        std::fs::write(path, text).map_err(|source| Error::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

fn depth_of(needle: PersonId, generations: &[Vec<PersonId>]) -> Option<usize> {
    generations.iter().position(|g| g.contains(&needle))
}

fn close_kin_term(shorter_leg: usize, diff: i32, gender: Option<Gender>) -> Option<&'static str> {
    use Gender::{Female, Male};
    Some(match (shorter_leg, diff, gender) {
        (0, 0, _) => "self",
        (1, 0, Some(Male)) => "brother",
        (1, 0, Some(Female)) => "sister",
        (1, 0, None) => "sibling",
        (0, 1, Some(Male)) => "father",
        (0, 1, Some(Female)) => "mother",
        (0, 1, None) => "parent",
        (0, -1, Some(Male)) => "son",
        (0, -1, Some(Female)) => "daughter",
        (0, -1, None) => "child",
        (1, 1, Some(Male)) => "uncle",
        (1, 1, Some(Female)) => "aunt",
        (1, 1, None) => "parent\u{2019}s sibling",
        (1, -1, Some(Male)) => "nephew",
        (1, -1, Some(Female)) => "niece",
        (1, -1, None) => "sibling\u{2019}s child",
        (0, 2, Some(Male)) => "grandfather",
        (0, 2, Some(Female)) => "grandmother",
        (0, 2, None) => "grandparent",
        (0, -2, Some(Male)) => "grandson",
        (0, -2, Some(Female)) => "granddaughter",
        (0, -2, None) => "grandchild",
        (1, 2, Some(Male)) => "great uncle",
        (1, 2, Some(Female)) => "great aunt",
        (1, 2, None) => "grandparent\u{2019}s sibling",
        (1, -2, Some(Male)) => "great nephew",
        (1, -2, Some(Female)) => "great niece",
        (1, -2, None) => "sibling\u{2019}s grandchild",
        (2, 0, _) => "cousin",
        _ => return None,
    })
}

/// Terms for `other` relative to the subject's spouse.
fn spousal_kin_term(shorter_leg: usize, diff: i32, gender: Option<Gender>) -> Option<&'static str> {
    use Gender::{Female, Male};
    Some(match (shorter_leg, diff, gender) {
        (0, 0, Some(Male)) => "husband",
        (0, 0, Some(Female)) => "wife",
        (0, 0, None) => "spouse",
        (1, 0, Some(Male)) => "brother-in-law",
        (1, 0, Some(Female)) => "sister-in-law",
        (1, 0, None) => "sibling-in-law",
        (0, 1, Some(Male)) => "father-in-law",
        (0, 1, Some(Female)) => "mother-in-law",
        (0, 1, None) => "parent-in-law",
        (0, -1, Some(Male)) => "stepson",
        (0, -1, Some(Female)) => "stepdaughter",
        (0, -1, None) => "stepchild",
        (1, -1, Some(Male)) => "nephew by marriage",
        (1, -1, Some(Female)) => "niece by marriage",
        (1, -1, None) => "spouse\u{2019}s sibling\u{2019}s child",
        (0, 2, Some(Male)) => "grandfather-in-law",
        (0, 2, Some(Female)) => "grandmother-in-law",
        (0, 2, None) => "grandparent-in-law",
        _ => return None,
    })
}

/// Terms for `other` when `other`'s spouse is the subject's blood relation.
fn affine_kin_term(shorter_leg: usize, diff: i32, gender: Option<Gender>) -> Option<&'static str> {
    use Gender::{Female, Male};
    Some(match (shorter_leg, diff, gender) {
        (1, 0, Some(Male)) => "brother-in-law",
        (1, 0, Some(Female)) => "sister-in-law",
        (1, 0, None) => "sibling-in-law",
        (0, 1, Some(Male)) => "stepfather",
        (0, 1, Some(Female)) => "stepmother",
        (0, 1, None) => "step-parent",
        (0, -1, Some(Male)) => "son-in-law",
        (0, -1, Some(Female)) => "daughter-in-law",
        (1, 1, Some(Male)) => "uncle by marriage",
        (1, 1, Some(Female)) => "aunt by marriage",
        (1, 2, Some(Male)) => "great uncle by marriage",
        (1, 2, Some(Female)) => "great aunt by marriage",
        _ => return None,
    })
}

fn spouse_word(kind: RelationshipKind, gender: Option<Gender>) -> &'static str {
    match (kind, gender) {
        (RelationshipKind::Marriage, Some(Gender::Male)) => "husband",
        (RelationshipKind::Marriage, Some(Gender::Female)) => "wife",
        (RelationshipKind::Marriage, None) => "spouse",
        (RelationshipKind::Couple, _) => "partner",
    }
}

/// Collapses a composed term through the trivial leg: "self's husband" is
/// just "husband", "partner's self" is just "partner".
fn drop_self(term: String) -> String {
    term.replace("self\u{2019}s ", "")
        .replace("\u{2019}s self", "")
}

fn kinship_term_for(kinship: Kinship, gender: Option<Gender>, max_great: i32) -> Option<String> {
    let diff = kinship.generation_difference;
    if let Some(term) = close_kin_term(kinship.shorter_leg, diff, gender) {
        return Some(term.to_string());
    }

    // Direct lines and their siblings extend with great- prefixes:
    // "great grandfather", "great-great granduncle". Anything deeper than
    // the cutoff (or removed cousins) would need ordinal wording.
    if kinship.shorter_leg <= 1 && diff.abs() > 2 {
        let levels = diff.abs() - 2;
        if levels > max_great {
            return None;
        }
        let sign = if diff > 0 { 1 } else { -1 };
        let base = close_kin_term(kinship.shorter_leg, sign, gender)?;
        let mut prefix = vec!["great"; levels as usize].join("-");
        prefix.push_str(" grand");
        return Some(format!("{prefix}{base}"));
    }

    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kinship {
    pub common_ancestor: PersonId,
    /// Generations from the closer of the two people up to the ancestor.
    pub shorter_leg: usize,
    /// Positive when the first person is further from the ancestor.
    pub generation_difference: i32,
}

impl Kinship {
    fn from_depths(common_ancestor: PersonId, a_depth: usize, b_depth: usize) -> Self {
        Self {
            common_ancestor,
            shorter_leg: a_depth.min(b_depth),
            generation_difference: a_depth as i32 - b_depth as i32,
        }
    }
}

/// Ancestor/descendant tree rooted at one person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineNode {
    pub person: PersonId,
    pub father: Option<Box<LineNode>>,
    pub mother: Option<Box<LineNode>>,
    pub children: Vec<LineNode>,
}

impl LineNode {
    fn new(person: PersonId) -> Self {
        Self {
            person,
            father: None,
            mother: None,
            children: Vec::new(),
        }
    }
}

/// A person view: record fields plus precision-aware formatted dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: PersonId,
    pub name: String,
    pub gender: Option<Gender>,
    pub dob: Option<NaiveDate>,
    pub dob_precision: u8,
    /// Formatted to the known precision, e.g. `4 March 1920`, `March 1920`,
    /// `1920`.
    pub date_of_birth: Option<String>,
    pub year_of_birth: Option<i32>,
    pub place_of_birth: Option<String>,
    pub dod: Option<NaiveDate>,
    pub dod_precision: u8,
    pub dod_unknown: bool,
    pub date_of_death: Option<String>,
    pub year_of_death: Option<i32>,
    pub place_of_death: Option<String>,
    pub dead: bool,
    pub occupation: Option<String>,
    pub notes: Option<String>,
    pub father_id: Option<PersonId>,
    pub mother_id: Option<PersonId>,
    pub spurious: bool,
}

impl Person {
    pub fn from_record(record: &PersonRecord) -> Result<Self> {
        let dob = parse_date(record.person_id, record.date_of_birth.as_deref())?;
        let dob_precision = record.date_of_birth_precision.min(3);
        let dod = parse_date(record.person_id, record.date_of_death.as_deref())?;
        let dod_precision = record.date_of_death_precision.min(3);

        // A death date with zero precision means only the fact of death is
        // known, same as the explicit unknown flag.
        let mut dod_unknown = record.date_of_death_unknown;
        if dod.is_some() && dod_precision == 0 {
            dod_unknown = true;
        }

        Ok(Self {
            id: record.person_id,
            name: record.person_name.clone(),
            gender: record.gender,
            dob,
            dob_precision,
            date_of_birth: dob.and_then(|d| format_precision_date(d, dob_precision)),
            year_of_birth: dob.filter(|_| dob_precision > 0).map(|d| d.year()),
            place_of_birth: record.place_of_birth.clone(),
            dod,
            dod_precision,
            dod_unknown,
            date_of_death: dod.and_then(|d| format_precision_date(d, dod_precision)),
            year_of_death: dod.filter(|_| dod_precision > 0).map(|d| d.year()),
            place_of_death: record.place_of_death.clone(),
            dead: dod.is_some() || dod_unknown,
            occupation: record.occupation.clone(),
            notes: record.notes.clone(),
            father_id: record.father_id,
            mother_id: record.mother_id,
            spurious: record.spurious,
        })
    }

    pub(crate) fn birth_order_key(&self) -> (bool, NaiveDate, PersonId) {
        (self.spurious, self.dob.unwrap_or(NaiveDate::MAX), self.id)
    }

    /// `Ada Smith (1887 – 1953)`
    pub fn display_name(&self) -> String {
        match self.years() {
            Some(years) => format!("{} ({years})", self.name),
            None => self.name.clone(),
        }
    }

    /// Full-precision date span, `4 March 1887 – 1 May 1953` / `b. …` /
    /// `d. …`.
    pub fn dates(&self) -> Option<String> {
        match (self.date_of_birth.as_deref(), self.date_of_death.as_deref()) {
            (Some(b), Some(d)) => Some(format!("{b} – {d}")),
            (Some(b), None) => Some(format!("b. {b}")),
            (None, Some(d)) => Some(format!("d. {d}")),
            (None, None) => None,
        }
    }

    /// Year-level span; a death known only as a fact shows as `†` or `?`.
    pub fn years(&self) -> Option<String> {
        match (self.year_of_birth, self.year_of_death) {
            (Some(b), Some(d)) => Some(format!("{b} – {d}")),
            (Some(b), None) if self.dod_unknown => Some(format!("{b} – ?")),
            (Some(b), None) => Some(format!("b. {b}")),
            (None, _) if self.dod_unknown => Some("†".to_string()),
            (None, Some(d)) => Some(format!("d. {d}")),
            (None, None) => None,
        }
    }

    /// `4 March 1887 in Leeds` (whichever parts are known).
    pub fn born(&self) -> Option<String> {
        join_date_place(self.date_of_birth.as_deref(), self.place_of_birth.as_deref())
    }

    pub fn died(&self) -> Option<String> {
        join_date_place(self.date_of_death.as_deref(), self.place_of_death.as_deref())
    }

    /// Age at death, or current age for the living. Reduced date precision
    /// yields an `approx.` prefix; under a year old the age is given in
    /// months, weeks or days.
    pub fn age(&self) -> Option<String> {
        self.age_at(chrono::Local::now().date_naive())
    }

    pub fn age_at(&self, today: NaiveDate) -> Option<String> {
        let start = self.dob?;
        if self.dod_unknown {
            return None;
        }
        let start_prec = self.dob_precision;
        let (end, end_prec) = match self.dod {
            Some(d) => (d, self.dod_precision),
            None => (today, 3),
        };
        let min_prec = start_prec.min(end_prec);
        if min_prec < 1 {
            return None;
        }

        let delta = DateDelta::between(start, end);

        if min_prec == 1 {
            return Some(format!("approx. {}", delta.years));
        }

        let approx = if min_prec == 2 && delta.months == 0 {
            "approx. "
        } else {
            ""
        };

        if delta.years < 1 && start_prec > 1 {
            let (age, unit) = if delta.months > 0 {
                (delta.months, "month")
            } else if delta.weeks() > 0 && start_prec > 2 {
                (delta.weeks(), "week")
            } else if start_prec > 2 {
                (delta.days, "day")
            } else {
                return Some(format!("{approx}{}", delta.years));
            };
            let plural = if age == 1 { "" } else { "s" };
            return Some(format!("{approx}{age} {unit}{plural}"));
        }

        Some(format!("{approx}{}", delta.years))
    }
}

/// Calendar-aware year/month/day difference between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DateDelta {
    years: i64,
    months: i64,
    days: i64,
}

impl DateDelta {
    fn between(start: NaiveDate, end: NaiveDate) -> Self {
        let mut years = i64::from(end.year() - start.year());
        let mut months = i64::from(end.month()) - i64::from(start.month());
        let mut days = i64::from(end.day()) - i64::from(start.day());

        if days < 0 {
            months -= 1;
            // Borrow the length of the month preceding `end`.
            let (prev_y, prev_m) = if end.month() == 1 {
                (end.year() - 1, 12)
            } else {
                (end.year(), end.month() - 1)
            };
            days += i64::from(days_in_month(prev_y, prev_m));
        }
        if months < 0 {
            years -= 1;
            months += 12;
        }

        Self {
            years,
            months,
            days,
        }
    }

    fn weeks(&self) -> i64 {
        self.days / 7
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_y, next_m) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = NaiveDate::from_ymd_opt(next_y, next_m, 1);
    match (first, next) {
        (Some(a), Some(b)) => b.signed_duration_since(a).num_days() as u32,
        _ => 30,
    }
}

fn parse_date(id: PersonId, value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(value) = value else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(Some)
        .map_err(|e| Error::InvalidDate {
            id,
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Formats a date down to its known precision: `1920`, `March 1920`,
/// `4 March 1920`.
fn format_precision_date(date: NaiveDate, precision: u8) -> Option<String> {
    match precision {
        0 => None,
        1 => Some(date.year().to_string()),
        2 => Some(format!("{} {}", date.format("%B"), date.year())),
        _ => Some(format!("{} {} {}", date.day(), date.format("%B"), date.year())),
    }
}

fn join_date_place(date: Option<&str>, place: Option<&str>) -> Option<String> {
    match (date, place) {
        (Some(d), Some(p)) => Some(format!("{d} in {p}")),
        (Some(d), None) => Some(d.to_string()),
        (None, Some(p)) => Some(format!("in {p}")),
        (None, None) => None,
    }
}

/// A relationship view relative to one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct Relationship {
    pub id: String,
    pub kind: RelationshipKind,
    pub person_a: PersonId,
    pub person_b: PersonId,
    /// The non-subject side, as resolved by the lookup that built this view.
    pub partner: PersonId,
    pub start_date: Option<String>,
    pub start_year: Option<i32>,
    pub start_place: Option<String>,
    pub end_date: Option<String>,
    pub end_year: Option<i32>,
    pub end_type: Option<RelationshipEnd>,
    /// Whether either party is dead; decides how open-ended spans render.
    pub either_dead: bool,
}

impl Relationship {
    fn from_record(record: &RelationshipRecord, partner: PersonId, either_dead: bool) -> Result<Self> {
        let start = parse_date(record.person_a_id, record.start_date.as_deref())?;
        let start_prec = record.start_date_precision.min(3);
        let end = parse_date(record.person_a_id, record.end_date.as_deref())?;
        let end_prec = record.end_date_precision.min(3);
        Ok(Self {
            id: record.relationship_id.clone(),
            kind: record.relationship_type,
            person_a: record.person_a_id,
            person_b: record.person_b_id,
            partner,
            start_date: start.and_then(|d| format_precision_date(d, start_prec)),
            start_year: start.filter(|_| start_prec > 0).map(|d| d.year()),
            start_place: record.place.clone(),
            end_date: end.and_then(|d| format_precision_date(d, end_prec)),
            end_year: end.filter(|_| end_prec > 0).map(|d| d.year()),
            end_type: record.end_type,
            either_dead,
        })
    }

    /// Builds a fresh marriage record between two people, for couples that
    /// appear in the data only through shared children.
    pub fn blank_record(a: PersonId, b: PersonId) -> RelationshipRecord {
        RelationshipRecord {
            relationship_id: uuid::Uuid::new_v4().to_string(),
            relationship_type: RelationshipKind::Marriage,
            person_a_id: a,
            person_b_id: b,
            start_date: None,
            start_date_precision: 3,
            place: None,
            end_date: None,
            end_date_precision: 3,
            end_type: None,
        }
    }

    pub fn is_ex(&self) -> bool {
        matches!(
            self.end_type,
            Some(RelationshipEnd::Divorce) | Some(RelationshipEnd::Separation)
        )
    }

    pub fn ex_prefix(&self) -> &'static str {
        if self.is_ex() { "ex-" } else { "" }
    }

    /// `husband` / `wife` / `spouse` / `partner`, with an `ex-` prefix for
    /// ended relationships.
    pub fn partner_description(&self, partner_gender: Option<Gender>) -> String {
        format!("{}{}", self.ex_prefix(), spouse_word(self.kind, partner_gender))
    }

    /// Date span; an open end renders `… –` while both live, `… – ?` once
    /// either party is dead.
    pub fn dates(&self) -> Option<String> {
        span(self.start_date.as_deref(), self.end_date.as_deref(), self.either_dead)
    }

    pub fn years(&self) -> Option<String> {
        let start = self.start_year.map(|y| y.to_string());
        let end = self.end_year.map(|y| y.to_string());
        span(start.as_deref(), end.as_deref(), self.either_dead)
    }

    /// `4 June 1950 in York`
    pub fn started(&self) -> Option<String> {
        join_date_place(self.start_date.as_deref(), self.start_place.as_deref())
    }

    /// `12 May 1972, divorce`
    pub fn ended(&self) -> Option<String> {
        let end_type = self.end_type.map(|t| end_type_name(t));
        match (self.end_date.as_deref(), end_type) {
            (Some(d), Some(t)) => Some(format!("{d}, {t}")),
            (Some(d), None) => Some(d.to_string()),
            (None, Some(t)) => Some(t.to_string()),
            (None, None) => None,
        }
    }

    pub fn description(&self) -> Option<String> {
        match (self.started(), self.ended()) {
            (Some(s), Some(e)) => Some(format!("{s}, {e}")),
            (Some(s), None) => Some(s),
            (None, Some(e)) => Some(e),
            (None, None) => None,
        }
    }
}

fn end_type_name(end: RelationshipEnd) -> &'static str {
    match end {
        RelationshipEnd::Marriage => "marriage",
        RelationshipEnd::Divorce => "divorce",
        RelationshipEnd::Separation => "separation",
        RelationshipEnd::Death => "death",
    }
}

fn span(start: Option<&str>, end: Option<&str>, either_dead: bool) -> Option<String> {
    match (start, end, either_dead) {
        (None, None, _) => None,
        (Some(s), None, false) => Some(format!("{s} –")),
        (Some(s), None, true) => Some(format!("{s} – ?")),
        (None, Some(e), _) => Some(format!("? – {e}")),
        (Some(s), Some(e), _) => Some(format!("{s} – {e}")),
    }
}
