//! urakawa - print the filtered outline of a DTBook/XML document

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;

use urakawa::import::{ImportOptions, read_xml};
use urakawa::model::{Document, NodeId};
use urakawa::navigation::{ChannelFilter, ElementFilter, FilterNavigator, NodeFilter};

/// Longest text excerpt shown per entry, in characters.
const EXCERPT_CHARS: usize = 60;

#[derive(Parser)]
#[command(name = "urakawa")]
#[command(version, about = "Print a filtered outline of a DTBook/XML document", long_about = None)]
#[command(after_help = "EXAMPLES:
    urakawa book.xml -e level1 -e level2 -e h1 -e h2   Section outline
    urakawa book.xml -e span -e sent --exclude         Hide inline markup
    urakawa book.xml --channel text --json             Text runs as JSON
    urakawa book.xml -e h1 -e h2 --from chapter3       Headings of one section")]
struct Cli {
    /// Input file (DTBook or any XML)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Element local name to include (repeatable)
    #[arg(short, long = "element", value_name = "NAME")]
    elements: Vec<String>,

    /// Exclude the named elements instead of including them
    #[arg(long, requires = "elements")]
    exclude: bool,

    /// Include nodes that carry media in this channel
    #[arg(long, value_name = "NAME", conflicts_with = "elements")]
    channel: Option<String>,

    /// Start at the element with this id instead of the document root
    #[arg(long, value_name = "ID")]
    from: Option<String>,

    /// Channel that receives text runs
    #[arg(long, value_name = "NAME", default_value = "text")]
    text_channel: String,

    /// Print the outline as JSON
    #[arg(long)]
    json: bool,
}

/// Which nodes the outline shows.
enum Selection {
    All,
    Elements { filter: ElementFilter, exclude: bool },
    Channel(ChannelFilter),
}

impl NodeFilter<Document> for Selection {
    fn is_included(&self, tree: &Document, node: NodeId) -> bool {
        match self {
            Selection::All => true,
            Selection::Elements { filter, exclude } => filter.is_included(tree, node) != *exclude,
            Selection::Channel(filter) => filter.is_included(tree, node),
        }
    }
}

#[derive(Debug, Serialize)]
struct OutlineEntry {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<OutlineEntry>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "urakawa=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = ImportOptions {
        text_channel: cli.text_channel.clone(),
        ..Default::default()
    };
    let doc = read_xml(&cli.input, &options).map_err(|e| e.to_string())?;

    let start = match &cli.from {
        Some(id) => doc
            .element_by_id(id)
            .ok_or_else(|| format!("no element with id \"{id}\""))?,
        None => doc.root(),
    };

    let selection = if let Some(channel) = &cli.channel {
        Selection::Channel(ChannelFilter::new(channel.as_str()))
    } else if cli.elements.is_empty() {
        Selection::All
    } else {
        Selection::Elements {
            filter: ElementFilter::new(cli.elements.iter().cloned()),
            exclude: cli.exclude,
        }
    };
    let nav = FilterNavigator::new(&doc, selection);

    let entries = top_level(&nav, start, &cli.text_channel).map_err(|e| e.to_string())?;
    tracing::debug!(entries = entries.len(), "outline built");

    if cli.json {
        let json = serde_json::to_string_pretty(&entries).map_err(|e| e.to_string())?;
        println!("{json}");
    } else {
        for entry in &entries {
            print_entry(entry, 0);
        }
    }
    Ok(())
}

/// Outline of `start` itself when included, else of its filtered children.
fn top_level(
    nav: &FilterNavigator<'_, Document, Selection>,
    start: NodeId,
    channel: &str,
) -> urakawa::Result<Vec<OutlineEntry>> {
    if nav.is_included(start) {
        return Ok(vec![entry(nav, start, channel)?]);
    }
    let count = nav.child_count(start)?;
    (0..count)
        .map(|i| entry(nav, nav.child(start, i)?, channel))
        .collect()
}

fn entry(
    nav: &FilterNavigator<'_, Document, Selection>,
    node: NodeId,
    channel: &str,
) -> urakawa::Result<OutlineEntry> {
    let doc = nav.tree();
    let xml = doc.node(node).and_then(|n| n.properties.xml.as_ref());

    let mut children = Vec::new();
    if nav.child_count(node)? > 0 {
        let mut child = Some(nav.child(node, 0)?);
        while let Some(id) = child {
            children.push(entry(nav, id, channel)?);
            child = nav.next_sibling(id)?;
        }
    }

    let name = match xml {
        Some(x) => x.local_name.clone(),
        None if node == doc.root() => "#document".to_string(),
        None => "#text".to_string(),
    };

    Ok(OutlineEntry {
        name,
        id: xml.and_then(|x| x.id()).map(str::to_string),
        text: excerpt(&doc.text_content(node, channel)),
        children,
    })
}

/// Whitespace-collapsed text, shortened to [`EXCERPT_CHARS`].
fn excerpt(text: &str) -> Option<String> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    if collapsed.chars().count() > EXCERPT_CHARS {
        let cut: String = collapsed.chars().take(EXCERPT_CHARS).collect();
        Some(format!("{cut}..."))
    } else {
        Some(collapsed)
    }
}

fn print_entry(entry: &OutlineEntry, depth: usize) {
    let mut line = format!("{}{}", "  ".repeat(depth), entry.name);
    if let Some(id) = &entry.id {
        line.push_str(&format!(" #{id}"));
    }
    if let Some(text) = &entry.text {
        line.push_str(&format!("  \"{text}\""));
    }
    println!("{line}");
    for child in &entry.children {
        print_entry(child, depth + 1);
    }
}
