use banyan_core::{BanyanConfig, Family, PersonId};
use banyan_render::page::{PageOptions, render_person_page};
use banyan_render::svg::{IdUrlResolver, PersonUrlResolver, SvgOptions, render_tree_svg};
use banyan_render::tree::layout_tree;
use banyan_render::LayoutOptions;
use chrono::Local;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Core(banyan_core::Error),
    Render(banyan_render::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Core(err) => write!(f, "{err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<banyan_core::Error> for CliError {
    fn from(value: banyan_core::Error) -> Self {
        Self::Core(value)
    }
}

impl From<banyan_render::Error> for CliError {
    fn from(value: banyan_render::Error) -> Self {
        Self::Render(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Page,
    Tree,
    Layout,
    RenderAll,
    Export,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    subject: Option<PersonId>,
    config: Option<String>,
    store: Option<String>,
    exclude_spurious: bool,
    siblings: bool,
    partners: bool,
    pretty: bool,
    diagram_id: Option<String>,
    viewport_height: Option<f64>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "banyan-cli\n\
\n\
USAGE:\n\
  banyan-cli page <person-id> [--out <path>]\n\
  banyan-cli tree <person-id> [--id <diagram-id>] [--out <path>]\n\
  banyan-cli layout <person-id> [--pretty]\n\
  banyan-cli render-all [--out <dir>]\n\
  banyan-cli export [--out <path>]\n\
\n\
OPTIONS:\n\
  --config <path>      JSON5 config file merged over the built-in defaults\n\
  --store <path>       family store JSON file (overrides store.path)\n\
  --exclude-spurious   hide people marked spurious\n\
  --siblings           include the subject's siblings in tree diagrams\n\
  --partners           include partners of descendants in tree diagrams\n\
  --height <px>        pixel height of the embedded diagram viewport\n\
\n\
NOTES:\n\
  - page and tree print to stdout by default; use --out to write a file.\n\
  - render-all writes pages/<id>.html and trees/<id>.svg under the out\n\
    directory (default ./site) for every person in the store.\n\
  - export writes the store with parent/child references resolved to names.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();
    let mut command_seen = false;

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "page" | "tree" | "layout" | "render-all" | "export" if !command_seen => {
                command_seen = true;
                args.command = match a.as_str() {
                    "page" => Command::Page,
                    "tree" => Command::Tree,
                    "layout" => Command::Layout,
                    "render-all" => Command::RenderAll,
                    _ => Command::Export,
                };
            }
            "--pretty" => args.pretty = true,
            "--exclude-spurious" => args.exclude_spurious = true,
            "--siblings" => args.siblings = true,
            "--partners" => args.partners = true,
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--store" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.store = Some(path.clone());
            }
            "--id" => {
                let Some(id) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.diagram_id = Some(id.clone());
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let h = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(h.is_finite() && h > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.viewport_height = Some(h);
            }
            "--out" | "-o" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            value => {
                if args.subject.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.subject = Some(value.parse::<PersonId>().map_err(|_| CliError::Usage(usage()))?);
            }
        }
    }

    if !command_seen {
        return Err(CliError::Usage(usage()));
    }
    if matches!(args.command, Command::Page | Command::Tree | Command::Layout)
        && args.subject.is_none()
    {
        return Err(CliError::Usage(usage()));
    }
    Ok(args)
}

fn load_config(args: &Args) -> Result<BanyanConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => BanyanConfig::load(path)?,
        // Without --config, a banyan.json5 next to the invocation is picked
        // up; otherwise the built-in defaults stand.
        None if Path::new("banyan.json5").exists() => BanyanConfig::load("banyan.json5")?,
        None => BanyanConfig::site_defaults(),
    };
    if let Some(store) = &args.store {
        config.set_value("store.path", serde_json::Value::String(store.clone()));
    }
    if args.exclude_spurious {
        config.set_value("family.excludeSpurious", serde_json::Value::Bool(true));
    }
    Ok(config)
}

fn layout_options(args: &Args, config: &BanyanConfig) -> LayoutOptions {
    let mut options = LayoutOptions::from_config(config);
    options.include_siblings |= args.siblings;
    options.include_partners |= args.partners;
    options
}

fn page_options(args: &Args) -> PageOptions {
    let mut options = PageOptions::default();
    if let Some(h) = args.viewport_height {
        options.diagram_px_height = h;
    }
    options
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    } else {
        serde_json::to_writer(std::io::stdout().lock(), value)?;
    }
    Ok(())
}

fn write_text(text: &str, out: Option<&str>) -> Result<(), CliError> {
    match out {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

/// Hrefs for a flat static site: sibling `<id>.html` documents.
#[derive(Debug, Clone, Copy, Default)]
struct SiteUrlResolver;

impl PersonUrlResolver for SiteUrlResolver {
    fn url_for(&self, person: PersonId) -> String {
        format!("{person}.html")
    }
}

fn progress(message: &str) {
    println!("[{}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
}

fn render_all(args: &Args, family: &Family, options: &LayoutOptions) -> Result<(), CliError> {
    let root = PathBuf::from(args.out.as_deref().unwrap_or("site"));
    let pages_dir = root.join("pages");
    let trees_dir = root.join("trees");
    std::fs::create_dir_all(&pages_dir)?;
    std::fs::create_dir_all(&trees_dir)?;

    let page_opts = PageOptions {
        diagram_src: "../trees/{id}.svg".to_string(),
        ..page_options(args)
    };
    let resolver = SiteUrlResolver;

    let ids = family.ids();
    progress(&format!("rendering {} people to {}", ids.len(), root.display()));
    for id in ids {
        let svg = render_tree_svg(
            &layout_tree(family, id, options)?,
            &resolver,
            &SvgOptions::default(),
        );
        std::fs::write(trees_dir.join(format!("{id}.svg")), &svg)?;

        let page = render_person_page(family, id, &resolver, options, &page_opts)?;
        std::fs::write(pages_dir.join(format!("{id}.html")), page)?;
        progress(&format!("wrote pages/{id}.html"));
    }
    progress("done");
    Ok(())
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(&args)?;
    let family = Family::open(config.clone())?;
    let options = layout_options(&args, &config);

    match args.command {
        Command::Page => {
            let subject = args.subject.unwrap_or_default();
            let page = render_person_page(
                &family,
                subject,
                &IdUrlResolver,
                &options,
                &page_options(&args),
            )?;
            write_text(&page, args.out.as_deref())
        }
        Command::Tree => {
            let subject = args.subject.unwrap_or_default();
            let svg_options = SvgOptions {
                diagram_id: args.diagram_id.clone(),
                ..Default::default()
            };
            let layout = layout_tree(&family, subject, &options)?;
            let svg = render_tree_svg(&layout, &IdUrlResolver, &svg_options);
            write_text(&svg, args.out.as_deref())
        }
        Command::Layout => {
            let subject = args.subject.unwrap_or_default();
            let layout = layout_tree(&family, subject, &options)?;
            write_json(&layout, args.pretty)
        }
        Command::RenderAll => render_all(&args, &family, &options),
        Command::Export => {
            let out = args.out.as_deref().unwrap_or("people.json");
            family.save_json(Path::new(out))?;
            progress(&format!("exported {out}"));
            Ok(())
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
