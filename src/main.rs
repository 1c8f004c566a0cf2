use clap::{Parser, Subcommand};
use content_nav::api::{ContentApi, Envelope, HttpContentApi};
use content_nav::cache::TocCache;
use content_nav::config::{self, Config};
use content_nav::hierarchy::{NavState, build_tree, load_navigation};
use content_nav::search::{SearchController, SearchSnapshot, SearchStatus};
use content_nav::toc::HeadingExtractor;
use content_nav::toc::tracking::ActiveHeadingTracker;
use content_nav::types::{ContentFragment, PageNode};
use content_nav::{output, render};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directive.
const LOG_ENV: &str = "CONTENT_NAV_LOG";

/// Interactive search: a line with only this text submits the current query.
const SUBMIT_LINE: &str = "!";

#[derive(Parser)]
#[command(name = "content-nav")]
#[command(about = "Navigation trees, tables of contents, and debounced search for a content API")]
#[command(long_about = "\
Navigation trees, tables of contents, and debounced search for a content API

Pages come from the API as a flat list with parent references; content-nav
turns them into a navigation tree. Article HTML is scanned for h2 headings,
which get stable anchor ids and become the table of contents. Search input
is debounced so that only the last change in a burst reaches the API.

API endpoints:

  GET {base_url}/page/navigation?basePath=/   → { \"data\": PageNode[] }
  GET {base_url}/search/global?query=...      → { \"data\": ResultItem[] | { category: ResultItem[] } }

Logging goes to stderr; set CONTENT_NAV_LOG=debug for timer and cancel
transitions.

Run 'content-nav gen-config' to generate a documented content-nav.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./content-nav.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build and print the navigation tree from a local page list
    Tree {
        /// JSON file: `{ "data": [...] }` or a bare array of pages
        pages: PathBuf,
        /// Page id to mark as current
        #[arg(long)]
        current: Option<String>,
    },
    /// Fetch navigation from the API and print or render it
    Nav {
        /// Section path (overrides navigation.base_path)
        #[arg(long)]
        base_path: Option<String>,
        /// Page id to mark as current
        #[arg(long)]
        current: Option<String>,
        /// Print HTML instead of a text tree
        #[arg(long)]
        html: bool,
    },
    /// Extract the table of contents from an HTML or markdown file
    Toc {
        /// Main content (.html, or .md converted first)
        file: PathBuf,
        /// Supplementary content appended after the main file
        #[arg(long)]
        supplementary: Vec<PathBuf>,
        /// Write the annotated HTML here
        #[arg(long)]
        annotate: Option<PathBuf>,
    },
    /// Search the content API
    Search {
        /// Query for a one-shot search
        #[arg(required_unless_present = "interactive")]
        query: Option<String>,
        /// Read queries from stdin, one input change per line
        #[arg(long, conflicts_with = "query")]
        interactive: bool,
    },
    /// Render a full static page: navigation, annotated content, TOC
    Render {
        /// Main content (.html, or .md converted first)
        file: PathBuf,
        /// Supplementary content appended after the main file
        #[arg(long)]
        supplementary: Vec<PathBuf>,
        /// Local page list; fetched from the API when absent
        #[arg(long)]
        pages: Option<PathBuf>,
        /// Page id to mark as current
        #[arg(long)]
        current: Option<String>,
        /// Page title (default: file stem)
        #[arg(long)]
        title: Option<String>,
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock content-nav.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let cli = Cli::parse();

    let config = match cli.command {
        Command::GenConfig => Config::default(),
        _ => config::load_config(cli.config.as_deref(), Path::new("."))?,
    };

    match cli.command {
        Command::Tree { pages, current } => {
            let pages = read_pages(&pages)?;
            output::print_tree(&build_tree(&pages), current.as_deref());
        }
        Command::Nav {
            base_path,
            current,
            html,
        } => {
            let api = HttpContentApi::new(&config.api)?;
            let base_path = base_path.unwrap_or_else(|| config.navigation.base_path.clone());
            let state = load_navigation(&api, &base_path).await;
            if html {
                println!(
                    "{}",
                    render::render_nav_state(&state, current.as_deref()).into_string()
                );
            } else {
                output::print_nav_state(&state, current.as_deref());
            }
        }
        Command::Toc {
            file,
            supplementary,
            annotate,
        } => {
            let fragments = read_fragments(&file, &supplementary)?;
            let extraction =
                HeadingExtractor::new(&config.toc.supplementary_prefix).extract(&fragments);
            output::print_toc(&extraction);
            if let Some(path) = annotate {
                std::fs::write(&path, extraction.combined_html())?;
                println!("Annotated HTML → {}", path.display());
            }
        }
        Command::Search { query, interactive } => {
            let api = HttpContentApi::new(&config.api)?;
            if interactive {
                interactive_search(api, &config).await?;
            } else if let Some(query) = query {
                let results = api.search(query.trim()).await?;
                output::print_results(&results);
            }
        }
        Command::Render {
            file,
            supplementary,
            pages,
            current,
            title,
            out,
        } => {
            let fragments = read_fragments(&file, &supplementary)?;
            let nav = match pages {
                Some(path) => NavState::from_pages(&read_pages(&path)?),
                None => {
                    let api = HttpContentApi::new(&config.api)?;
                    load_navigation(&api, &config.navigation.base_path).await
                }
            };
            let mut cache = TocCache::new(&config.toc.supplementary_prefix);
            let toc = cache.get_or_extract(&fragments);
            let mut tracker = ActiveHeadingTracker::new(&toc.headings);
            if let Some(first) = toc.headings.first() {
                tracker.set_active(&first.id);
            }
            let title = title.unwrap_or_else(|| file_title(&file));
            let page = render::render_page(&render::PageView {
                title: &title,
                nav: &nav,
                current_page_id: current.as_deref(),
                toc: &toc,
                active_heading: tracker.active(),
                toc_settings: &config.toc,
            })
            .into_string();
            match out {
                Some(path) => {
                    std::fs::write(&path, page)?;
                    println!("{} → {}", title, path.display());
                }
                None => println!("{}", page),
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Drive a [`SearchController`] from stdin. Each line is an input change;
/// snapshots are printed as they change. Exits once stdin closes and the last
/// search has settled.
async fn interactive_search(
    api: HttpContentApi,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let controller = SearchController::new(Arc::new(api), &config.search);
    let mut updates = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => match line? {
                Some(line) if line.trim() == SUBMIT_LINE => {
                    if let Some(navigation) = controller.submit() {
                        println!("→ {}", navigation.path);
                    }
                }
                Some(line) => controller.input(line),
                None => {
                    input_open = false;
                    if is_settled(&updates.borrow()) {
                        break;
                    }
                }
            },
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                output::print_snapshot(&snapshot);
                if !input_open && is_settled(&snapshot) {
                    break;
                }
            }
        }
    }

    controller.dispose();
    Ok(())
}

fn is_settled(snapshot: &SearchSnapshot) -> bool {
    !matches!(snapshot.status, SearchStatus::Pending | SearchStatus::Loading)
}

/// Accept both the API envelope and a bare page array.
fn read_pages(path: &Path) -> Result<Vec<PageNode>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    if let Ok(envelope) = serde_json::from_str::<Envelope<Vec<PageNode>>>(&content) {
        return Ok(envelope.data);
    }
    Ok(serde_json::from_str(&content)?)
}

fn read_fragments(
    main: &Path,
    supplementary: &[PathBuf],
) -> Result<Vec<ContentFragment>, std::io::Error> {
    let mut fragments = vec![ContentFragment::main(read_html(main)?)];
    for path in supplementary {
        fragments.push(ContentFragment::supplementary(read_html(path)?));
    }
    Ok(fragments)
}

fn read_html(path: &Path) -> Result<String, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"));
    Ok(if is_markdown {
        render::markdown_to_html(&content)
    } else {
        content
    })
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("Untitled")
        .to_string()
}
