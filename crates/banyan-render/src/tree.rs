use crate::model::{Bounds, Connector, CoupleJoin, LayoutNode, TreeLayout};
use crate::text::TextStyle;
use crate::{LayoutOptions, Result};
use banyan_core::layers::{LayerOptions, layers_for};
use banyan_core::{Family, PersonId, RelationshipKind};

/// Lays out a subject's tree: one row per generation, rows centered on x=0,
/// couple joins between partners and orthogonal connectors from each couple
/// down to its children.
pub fn layout_tree(
    family: &Family,
    subject: PersonId,
    options: &LayoutOptions,
) -> Result<TreeLayout> {
    let layer_options = LayerOptions {
        include_partners: options.include_partners,
        include_siblings: options.include_siblings,
    };
    let layers = layers_for(family, subject, &layer_options)?;

    let style = TextStyle::default();
    let mut layout = TreeLayout {
        subject,
        ..TreeLayout::default()
    };
    let mut row_ranges: Vec<(usize, usize, f64, f64)> = Vec::new(); // (start, end, top, height)

    let mut y = 0.0;
    for layer in &layers {
        let start = layout.nodes.len();
        let mut row_height: f64 = 0.0;
        let mut cursor = 0.0;

        for &person_id in &layer.people {
            let person = family.person(person_id)?;
            let label = person.name.clone();
            let years = person.years();

            let label_metrics = options.text_measurer.measure(&label, &style);
            let mut width = label_metrics.width;
            let mut text_height = label_metrics.height;
            if let Some(years) = &years {
                let years_metrics = options.text_measurer.measure(years, &style);
                width = width.max(years_metrics.width);
                text_height += years_metrics.height;
            }
            let width = width + 2.0 * options.node_padding;
            let height = text_height + 2.0 * options.node_padding;
            row_height = row_height.max(height);

            layout.nodes.push(LayoutNode {
                person: person_id,
                label,
                years,
                gender: person.gender,
                is_subject: person_id == subject,
                x: cursor,
                y,
                width,
                height,
            });
            cursor += width + options.node_gap;
        }

        let end = layout.nodes.len();
        // Uniform box height per row keeps joins and connectors straight.
        for node in &mut layout.nodes[start..end] {
            node.height = row_height;
        }
        // Center the row about x = 0.
        let row_width = (cursor - options.node_gap).max(0.0);
        let offset = -row_width / 2.0;
        for node in &mut layout.nodes[start..end] {
            node.x += offset;
        }

        row_ranges.push((start, end, y, row_height));
        y += row_height + options.row_gap;
    }

    for (layer, &(start, end, top, height)) in layers.iter().zip(&row_ranges) {
        for (key, &(left, right)) in &layer.edges {
            let Some(left_node) = layout.nodes[start..end].iter().find(|n| n.person == left)
            else {
                continue;
            };
            let Some(right_node) = layout.nodes[start..end].iter().find(|n| n.person == right)
            else {
                continue;
            };
            let married = match family.get_relationship(left, right)? {
                Some(rel) => rel.kind == RelationshipKind::Marriage,
                None => false,
            };
            layout.couples.push(CoupleJoin {
                key: key.clone(),
                left,
                right,
                married,
                x: (left_node.center_x() + right_node.center_x()) / 2.0,
                y: top + height / 2.0,
            });
        }
    }

    for (level, layer) in layers.iter().enumerate().skip(1) {
        let (child_start, child_end, child_top, _) = row_ranges[level];
        let (prev_start, prev_end, _, _) = row_ranges[level - 1];

        for (key, children) in &layer.groups {
            let Some(group_key) = key else {
                continue;
            };
            let child_nodes: Vec<&LayoutNode> = layout.nodes[child_start..child_end]
                .iter()
                .filter(|n| children.contains(&n.person))
                .collect();
            if child_nodes.is_empty() {
                continue;
            }

            // Anchor on the parent couple's join point; sibling groups with a
            // single known parent hang from that parent's box instead.
            let anchor = layout
                .couples
                .iter()
                .find(|c| &c.key == group_key)
                .map(|c| (c.x, c.y))
                .or_else(|| {
                    let first_child = family.person(child_nodes[0].person).ok()?;
                    let parent = first_child.father_id.or(first_child.mother_id)?;
                    layout.nodes[prev_start..prev_end]
                        .iter()
                        .find(|n| n.person == parent)
                        .map(|n| (n.center_x(), n.bottom()))
                });
            let Some((stem_x, stem_y)) = anchor else {
                continue;
            };

            let bus_y = child_top - options.row_gap / 2.0;
            let mut drops = Vec::new();
            let mut bus_min = stem_x;
            let mut bus_max = stem_x;
            for child in &child_nodes {
                let cx = child.center_x();
                bus_min = bus_min.min(cx);
                bus_max = bus_max.max(cx);
                drops.push([(cx, bus_y), (cx, child.y)]);
            }

            layout.connectors.push(Connector {
                group: group_key.clone(),
                stem: [(stem_x, stem_y), (stem_x, bus_y)],
                bus: [(bus_min, bus_y), (bus_max, bus_y)],
                drops,
            });
        }
    }

    layout.bounds = compute_bounds(&layout);
    Ok(layout)
}

fn compute_bounds(layout: &TreeLayout) -> Bounds {
    let mut bounds: Option<Bounds> = None;
    let mut include = |x: f64, y: f64| match &mut bounds {
        Some(b) => b.include(x, y),
        None => {
            bounds = Some(Bounds {
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            });
        }
    };

    for node in &layout.nodes {
        include(node.x, node.y);
        include(node.x + node.width, node.y + node.height);
    }
    for connector in &layout.connectors {
        for &(x, y) in connector
            .stem
            .iter()
            .chain(connector.bus.iter())
            .chain(connector.drops.iter().flatten())
        {
            include(x, y);
        }
    }

    bounds.unwrap_or_default()
}
