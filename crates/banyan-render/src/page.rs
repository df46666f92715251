use crate::scroll::{StaticHost, SvgFrame, scroll_to_subject};
use crate::svg::{PersonUrlResolver, SvgOptions, escape_attr, escape_xml, fmt, render_tree_svg};
use crate::tree::layout_tree;
use crate::{LayoutOptions, Result};
use banyan_core::{Family, Person, PersonId};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct PageOptions {
    /// Pixel height of the embedded diagram viewport.
    pub diagram_px_height: f64,
    /// src of the embedded diagram document; `{id}` is replaced by the
    /// subject's id.
    pub diagram_src: String,
    /// Notes already rendered to HTML by the hosting application's notes
    /// filter. When absent the raw notes text is emitted escaped.
    pub rendered_notes: Option<String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            diagram_px_height: 500.0,
            diagram_src: "trees/{id}.svg".to_string(),
            rendered_notes: None,
        }
    }
}

/// Assembles a person's profile page body: heading, vital facts, relations,
/// notes, and the embedded tree diagram pre-scrolled to the subject.
///
/// Every section is conditional on its data being present. The outer page
/// shell (base template, assets) belongs to the hosting application.
pub fn render_person_page(
    family: &Family,
    subject: PersonId,
    resolver: &dyn PersonUrlResolver,
    layout_options: &LayoutOptions,
    options: &PageOptions,
) -> Result<String> {
    let person = family.person(subject)?;
    let mut out = String::new();

    out.push_str(r#"<article class="person">"#);
    match person.years() {
        Some(years) => {
            let _ = write!(
                &mut out,
                r#"<h1>{} <span class="years">({})</span></h1>"#,
                escape_xml(&person.name),
                escape_xml(&years),
            );
        }
        None => {
            let _ = write!(&mut out, "<h1>{}</h1>", escape_xml(&person.name));
        }
    }

    render_vitals(&mut out, &person);
    render_people_section(&mut out, "Parents", &family.parents(subject)?, resolver);
    render_people_section(&mut out, "Siblings", &family.siblings(subject)?, resolver);
    render_relationships(&mut out, family, subject, resolver)?;
    render_people_section(&mut out, "Children", &family.children(subject)?, resolver);
    render_notes(&mut out, &person, options);
    render_diagram_embed(&mut out, family, subject, resolver, layout_options, options)?;

    out.push_str("</article>");
    Ok(out)
}

fn render_vitals(out: &mut String, person: &Person) {
    let born = person.born();
    let died = person.died().or_else(|| {
        // Death known only as a fact still gets a row.
        person.dod_unknown.then(|| "unknown".to_string())
    });
    let age = person.age();
    let occupation = person.occupation.as_deref();
    if born.is_none() && died.is_none() && age.is_none() && occupation.is_none() {
        return;
    }

    out.push_str(r#"<dl class="vitals">"#);
    if let Some(born) = born {
        let _ = write!(out, "<dt>Born</dt><dd>{}</dd>", escape_xml(&born));
    }
    if let Some(died) = died {
        let _ = write!(out, "<dt>Died</dt><dd>{}</dd>", escape_xml(&died));
    }
    if let Some(age) = age {
        let label = if person.dead { "Age at death" } else { "Age" };
        let _ = write!(out, "<dt>{label}</dt><dd>{}</dd>", escape_xml(&age));
    }
    if let Some(occupation) = occupation {
        let _ = write!(out, "<dt>Occupation</dt><dd>{}</dd>", escape_xml(occupation));
    }
    out.push_str("</dl>");
}

fn render_people_section(
    out: &mut String,
    title: &str,
    people: &[Person],
    resolver: &dyn PersonUrlResolver,
) {
    if people.is_empty() {
        return;
    }
    let _ = write!(
        out,
        r#"<section class="{}"><h2>{title}</h2><ul>"#,
        title.to_lowercase(),
    );
    for person in people {
        let _ = write!(out, "<li>{}</li>", person_link(person, resolver));
    }
    out.push_str("</ul></section>");
}

fn render_relationships(
    out: &mut String,
    family: &Family,
    subject: PersonId,
    resolver: &dyn PersonUrlResolver,
) -> Result<()> {
    let relationships = family.relationships_of(subject)?;
    if relationships.is_empty() {
        return Ok(());
    }

    out.push_str(r#"<section class="relationships"><h2>Relationships</h2><ul>"#);
    for rel in &relationships {
        let partner = family.person(rel.partner)?;
        let _ = write!(
            out,
            "<li>{}: {}",
            escape_xml(&capitalize(&rel.partner_description(partner.gender))),
            person_link(&partner, resolver),
        );
        if let Some(description) = rel.description() {
            let _ = write!(out, r#" <span class="dates">({})</span>"#, escape_xml(&description));
        }
        let children = family.relationship_children(rel)?;
        if !children.is_empty() {
            out.push_str("<ul>");
            for child in &children {
                let _ = write!(out, "<li>{}</li>", person_link(child, resolver));
            }
            out.push_str("</ul>");
        }
        out.push_str("</li>");
    }
    out.push_str("</ul></section>");
    Ok(())
}

fn render_notes(out: &mut String, person: &Person, options: &PageOptions) {
    let body = match (&options.rendered_notes, &person.notes) {
        (Some(html), _) => html.clone(),
        (None, Some(text)) => format!("<p>{}</p>", escape_xml(text)),
        (None, None) => return,
    };
    let _ = write!(
        out,
        r#"<section class="notes"><h2>Notes</h2>{body}</section>"#
    );
}

fn render_diagram_embed(
    out: &mut String,
    family: &Family,
    subject: PersonId,
    resolver: &dyn PersonUrlResolver,
    layout_options: &LayoutOptions,
    options: &PageOptions,
) -> Result<()> {
    let layout = layout_tree(family, subject, layout_options)?;
    let svg = render_tree_svg(&layout, resolver, &SvgOptions::default());

    let src = options
        .diagram_src
        .replace("{id}", &subject.to_string());

    // One-shot initialization: compute the subject scroll offsets now, while
    // the rendered document is in hand, and bake them into the embed. Any
    // failure degrades to an unscrolled diagram.
    let mut host = StaticHost::new(SvgFrame::new(svg, options.diagram_px_height));
    let scroll_attrs = match scroll_to_subject(&mut host) {
        Ok(target) => format!(
            r#" data-scroll-x="{}" data-scroll-y="{}""#,
            fmt(target.x_px),
            fmt(target.y_px),
        ),
        Err(err) => {
            tracing::warn!(person = subject, error = %err, "diagram not pre-scrolled");
            String::new()
        }
    };

    let _ = write!(
        out,
        r#"<figure class="diagram"><iframe src="{src}" height="{h}"{scroll_attrs}></iframe></figure>"#,
        src = escape_attr(&src),
        h = fmt(options.diagram_px_height),
    );
    Ok(())
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn person_link(person: &Person, resolver: &dyn PersonUrlResolver) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        escape_attr(&resolver.url_for(person.id)),
        escape_xml(&person.display_name()),
    )
}
