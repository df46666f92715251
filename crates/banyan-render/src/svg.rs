use crate::model::{CoupleJoin, TreeLayout};
use crate::{LayoutOptions, Result};
use banyan_core::{Family, Gender, PersonId};
use std::fmt::Write as _;

/// Routing seam: turns a person id into the href for that person's page.
/// URL generation belongs to the hosting application.
pub trait PersonUrlResolver {
    fn url_for(&self, person: PersonId) -> String;
}

/// Bare-id URLs (`/6` style), matching the standalone renderer's stub.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdUrlResolver;

impl PersonUrlResolver for IdUrlResolver {
    fn url_for(&self, person: PersonId) -> String {
        person.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct SvgOptions {
    /// Extra space around the computed viewBox.
    pub viewbox_padding: f64,
    /// Root id; also prefixes generated element ids.
    pub diagram_id: Option<String>,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            viewbox_padding: 8.0,
            diagram_id: None,
        }
    }
}

/// Emits a laid-out tree as SVG.
///
/// Markup contract: the root `<svg>` carries the unit-space `viewBox`, and
/// exactly one element — the subject's box — carries `id="subject"`.
pub fn render_tree_svg(
    layout: &TreeLayout,
    resolver: &dyn PersonUrlResolver,
    options: &SvgOptions,
) -> String {
    let diagram_id = options.diagram_id.as_deref().unwrap_or("banyan");
    let diagram_id_esc = escape_xml(diagram_id);

    let pad = options.viewbox_padding;
    let vb_min_x = layout.bounds.min_x - pad;
    let vb_min_y = layout.bounds.min_y - pad;
    let vb_w = (layout.bounds.width() + 2.0 * pad).max(1.0);
    let vb_h = (layout.bounds.height() + 2.0 * pad).max(1.0);

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg id="{diagram_id_esc}" width="100%" xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="{minx} {miny} {w} {h}" style="max-width: {w}px;" role="graphics-document document" aria-roledescription="familyTree">"#,
        minx = fmt(vb_min_x),
        miny = fmt(vb_min_y),
        w = fmt(vb_w),
        h = fmt(vb_h),
    );
    let _ = write!(&mut out, "<style>{}</style>", tree_css(diagram_id));

    for connector in &layout.connectors {
        let mut d = String::new();
        path_segment(&mut d, connector.stem);
        path_segment(&mut d, connector.bus);
        for drop in &connector.drops {
            path_segment(&mut d, *drop);
        }
        let _ = write!(&mut out, r#"<path class="connector" d="{d}"/>"#);
    }

    for couple in &layout.couples {
        emit_couple_join(&mut out, layout, couple);
    }

    for node in &layout.nodes {
        let href = escape_attr(&resolver.url_for(node.person));
        let fill = gender_fill(node.gender);
        let subject_id = if node.is_subject {
            r#" id="subject""#
        } else {
            ""
        };
        let _ = write!(&mut out, r#"<a xlink:href="{href}">"#);
        let _ = write!(
            &mut out,
            r#"<g class="person"><rect{subject_id} x="{x}" y="{y}" width="{w}" height="{h}" fill="{fill}"/>"#,
            x = fmt(node.x),
            y = fmt(node.y),
            w = fmt(node.width),
            h = fmt(node.height),
        );
        let cx = node.center_x();
        let line_height = node.height / if node.years.is_some() { 2.0 } else { 1.0 };
        let _ = write!(
            &mut out,
            r#"<text class="name" x="{x}" y="{y}" text-anchor="middle" dominant-baseline="middle">{label}</text>"#,
            x = fmt(cx),
            y = fmt(node.y + line_height / 2.0),
            label = escape_xml(&node.label),
        );
        if let Some(years) = &node.years {
            let _ = write!(
                &mut out,
                r#"<text class="years" x="{x}" y="{y}" text-anchor="middle" dominant-baseline="middle">{years}</text>"#,
                x = fmt(cx),
                y = fmt(node.y + line_height * 1.5),
                years = escape_xml(years),
            );
        }
        out.push_str("</g></a>");
    }

    out.push_str("</svg>");
    out
}

/// Convenience: layout plus emission in one call.
pub fn render_tree_svg_for(
    family: &Family,
    subject: PersonId,
    resolver: &dyn PersonUrlResolver,
    layout_options: &LayoutOptions,
    options: &SvgOptions,
) -> Result<String> {
    let layout = crate::tree::layout_tree(family, subject, layout_options)?;
    Ok(render_tree_svg(&layout, resolver, options))
}

fn emit_couple_join(out: &mut String, layout: &TreeLayout, couple: &CoupleJoin) {
    let (Some(left), Some(right)) = (layout.node(couple.left), layout.node(couple.right)) else {
        return;
    };
    let class = if couple.married {
        "couple married"
    } else {
        "couple unmarried"
    };
    let _ = write!(
        out,
        r#"<line class="{class}" x1="{x1}" y1="{y}" x2="{x2}" y2="{y}"/>"#,
        x1 = fmt(left.x + left.width),
        x2 = fmt(right.x),
        y = fmt(couple.y),
    );
}

fn path_segment(d: &mut String, [(x1, y1), (x2, y2)]: [(f64, f64); 2]) {
    let _ = write!(d, "M{},{}L{},{}", fmt(x1), fmt(y1), fmt(x2), fmt(y2));
}

fn gender_fill(gender: Option<Gender>) -> &'static str {
    match gender {
        Some(Gender::Male) => "lightblue",
        Some(Gender::Female) => "lightpink",
        None => "gray",
    }
}

fn tree_css(diagram_id: &str) -> String {
    format!(
        "#{diagram_id} .person rect{{stroke:#333;}}\
         #{diagram_id} .person text{{font-family:\"trebuchet ms\",verdana,arial,sans-serif;font-size:14px;fill:#111;}}\
         #{diagram_id} .years{{font-size:12px;fill:#444;}}\
         #{diagram_id} .connector{{stroke:#666;fill:none;}}\
         #{diagram_id} .couple{{stroke:#666;}}\
         #{diagram_id} .couple.unmarried{{stroke-dasharray:4 3;}}"
    )
}

/// Trimmed decimal formatting: integers stay bare, everything else keeps at
/// most three decimals with trailing zeros removed.
pub(crate) fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        let mut s = format!("{rounded:.3}");
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
        s
    }
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

pub(crate) fn escape_attr(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
