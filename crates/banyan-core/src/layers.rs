use crate::error::Result;
use crate::family::Family;
use crate::store::{Gender, PersonId};
use indexmap::IndexMap;

/// Key shared by everyone with the same parents (see
/// [`Family::parents_key`]); `None` for people whose parents are unknown.
pub type GroupKey = Option<String>;

/// One generation row of a tree diagram.
///
/// `people` is the left-to-right drawing order. `groups` buckets the row into
/// sibling sets by parent couple; `edges` are the couple joins inside the
/// row. Both keep insertion order — layout depends on it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub people: Vec<PersonId>,
    pub groups: IndexMap<GroupKey, Vec<PersonId>>,
    pub edges: IndexMap<String, (PersonId, PersonId)>,
}

impl Layer {
    fn contains_grouped(&self, key: &GroupKey, person: PersonId) -> bool {
        self.groups
            .get(key)
            .map(|g| g.contains(&person))
            .unwrap_or(false)
    }

    fn add_grouped(&mut self, key: GroupKey, person: PersonId) {
        self.people.push(person);
        self.groups.entry(key).or_default().push(person);
    }

    fn grouped_anywhere(&self, person: PersonId) -> bool {
        self.groups.values().any(|g| g.contains(&person))
    }

    /// Inserts a couple edge, keeping the row's drawing order coherent.
    ///
    /// Rules carried over from the source system:
    /// - a couple already present (either orientation) is accepted as-is;
    /// - a person already used on both sides of existing edges cannot join
    ///   another couple (returns false, edge dropped);
    /// - a left-hand partner pairing a second time is flipped to the right
    ///   side of its earlier edge, swapping positions in `people`;
    /// - partners missing from `people` are inserted adjacent to the one
    ///   already placed.
    pub fn add_couple_edge(&mut self, key: String, father: PersonId, mother: PersonId) -> bool {
        if self
            .edges
            .values()
            .any(|&(l, r)| (l, r) == (father, mother) || (l, r) == (mother, father))
        {
            return true;
        }

        let lefts: Vec<PersonId> = self.edges.values().map(|&(l, _)| l).collect();
        let rights: Vec<PersonId> = self.edges.values().map(|&(_, r)| r).collect();

        if (lefts.contains(&father) && rights.contains(&father))
            || (lefts.contains(&mother) && rights.contains(&mother))
        {
            return false;
        }

        if lefts.contains(&father) {
            // The father already anchors an edge on the left; flip that edge
            // so he sits on its right, freeing his left slot for this one.
            if let Some((_, prev)) = self
                .edges
                .iter_mut()
                .find(|(_, (l, _))| *l == father)
            {
                let prev_mother = prev.1;
                *prev = (prev_mother, father);
                let f_index = self.people.iter().position(|&p| p == father);
                let m_index = self.people.iter().position(|&p| p == prev_mother);
                if let (Some(f), Some(m)) = (f_index, m_index) {
                    self.people.swap(f, m);
                }
            }
        }

        let (left, right) = if rights.contains(&mother) {
            (mother, father)
        } else {
            (father, mother)
        };

        let left_placed = self.people.contains(&left);
        let right_placed = self.people.contains(&right);
        if right_placed && !left_placed {
            if let Some(idx) = self.people.iter().position(|&p| p == right) {
                self.people.insert(idx, left);
            }
        }
        if left_placed && !right_placed {
            if let Some(idx) = self.people.iter().position(|&p| p == left) {
                self.people.insert(idx + 1, right);
            }
        }

        self.edges.insert(key, (left, right));
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LayerOptions {
    /// Join partners into the subject's row even without shared children.
    pub include_partners: bool,
    /// Put the subject's siblings in the subject's row.
    pub include_siblings: bool,
}

/// Extracts the generation rows for a subject's tree: ancestor rows (oldest
/// first), then the subject's row, then descendant rows.
pub fn layers_for(family: &Family, subject: PersonId, options: &LayerOptions) -> Result<Vec<Layer>> {
    let mut ancestor_layers = ancestor_layers_for(family, subject)?;
    let descendant_layers =
        descendant_layers_for(family, subject, options, &mut ancestor_layers)?;
    ancestor_layers.extend(descendant_layers);
    Ok(ancestor_layers)
}

/// Ancestor rows for `subject`, oldest generation first. The subject's own
/// row is not included.
pub fn ancestor_layers_for(family: &Family, subject: PersonId) -> Result<Vec<Layer>> {
    let mut layers: Vec<Layer> = Vec::new();
    collect_ancestors(family, subject, 0, &mut layers)?;
    // The deepest recursion opens one empty row past the top; drop it, then
    // flip so the oldest generation comes first.
    layers.pop();
    layers.reverse();
    Ok(layers)
}

fn collect_ancestors(
    family: &Family,
    person: PersonId,
    level: usize,
    layers: &mut Vec<Layer>,
) -> Result<()> {
    if level >= layers.len() {
        layers.push(Layer::default());
    }

    let father = family.father(person)?.map(|p| p.id);
    let mother = family.mother(person)?.map(|p| p.id);

    if let Some(f) = father {
        collect_ancestors(family, f, level + 1, layers)?;
    }
    if let Some(m) = mother {
        collect_ancestors(family, m, level + 1, layers)?;
    }

    for parent in [father, mother].into_iter().flatten() {
        let key = family.parents_key_of(parent)?;
        if !layers[level].contains_grouped(&key, parent) {
            layers[level].add_grouped(key, parent);
        }
    }

    if let (Some(f), Some(m)) = (father, mother) {
        if let Some(key) = family.parents_key(Some(f), Some(m)) {
            layers[level].add_couple_edge(key, f, m);
        }
    }

    Ok(())
}

fn descendant_layers_for(
    family: &Family,
    subject: PersonId,
    options: &LayerOptions,
    ancestor_layers: &mut [Layer],
) -> Result<Vec<Layer>> {
    let mut layers = vec![Layer::default()];

    let row_people: Vec<PersonId> = if options.include_siblings {
        family
            .siblings_and_self(subject)?
            .into_iter()
            .map(|p| p.id)
            .collect()
    } else {
        vec![subject]
    };

    for &person in &row_people {
        let key = family.parents_key_of(person)?;
        if !layers[0].contains_grouped(&key, person) {
            layers[0].add_grouped(key, person);
        }

        // Siblings pulled into the subject row may add parents the ancestor
        // pass never visited.
        if let Some(parent_row) = ancestor_layers.last_mut() {
            let father = family.father(person)?.map(|p| p.id);
            let mother = family.mother(person)?.map(|p| p.id);
            for parent in [father, mother].into_iter().flatten() {
                if !parent_row.people.contains(&parent) {
                    let parent_key = family.parents_key_of(parent)?;
                    parent_row.add_grouped(parent_key, parent);
                }
            }
            if let (Some(f), Some(m)) = (father, mother) {
                if let Some(couple_key) = family.parents_key(Some(f), Some(m)) {
                    parent_row.add_couple_edge(couple_key, f, m);
                }
            }
        }

        if options.include_partners {
            for rel in family.relationships_of(person)? {
                let partner = family.person(rel.partner)?;
                let subject_view = family.person(person)?;
                let (mut a, mut b) = (person, rel.partner);
                if subject_view.gender == Some(Gender::Female)
                    && partner.gender == Some(Gender::Male)
                {
                    std::mem::swap(&mut a, &mut b);
                }
                layers[0].add_couple_edge(format!("r{}", rel.id), a, b);
            }
        }
    }

    for &person in &row_people {
        collect_descendants(family, person, 1, &mut layers)?;
    }

    Ok(layers)
}

fn collect_descendants(
    family: &Family,
    person: PersonId,
    level: usize,
    layers: &mut Vec<Layer>,
) -> Result<()> {
    let children = family.children(person)?;
    if children.is_empty() {
        return Ok(());
    }

    if level >= layers.len() {
        layers.push(Layer::default());
    }

    for child in &children {
        let key = family.parents_key_of(child.id)?;
        if layers[level].contains_grouped(&key, child.id) {
            continue;
        }
        layers[level].add_grouped(key.clone(), child.id);

        let father = family.father(child.id)?.map(|p| p.id);
        let mother = family.mother(child.id)?.map(|p| p.id);
        for parent in [father, mother].into_iter().flatten() {
            let prev = &mut layers[level - 1];
            if !prev.people.contains(&parent) {
                prev.people.push(parent);
            }
            if !prev.grouped_anywhere(parent) {
                let parent_key = family.parents_key_of(parent)?;
                prev.groups.entry(parent_key).or_default().push(parent);
                if let (Some(f), Some(m)) = (father, mother) {
                    if let Some(couple_key) = key.clone() {
                        prev.add_couple_edge(couple_key, f, m);
                    }
                }
            }
        }

        collect_descendants(family, child.id, level + 1, layers)?;
    }

    Ok(())
}
