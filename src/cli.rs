use std::error::Error;
use std::io::Write;
use std::time::Duration;

use atty::Stream;
use clap::{ArgAction, Parser, Subcommand};
use sdwv_client::{
    BufferRegion, ClientConfig, ContentRegion, CrossReference, DEFAULT_LIMIT, DEFAULT_PAGE_URL,
    Fragment, LookupController, LookupOutcome, Reaction, SuggestPolicy, UiEvent, plain_text,
};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "sdwv-client",
    about = "Look up words on a StarDict web viewer",
    version
)]
pub struct Cli {
    /// Page the `neigh` and lookup endpoints live next to.
    #[arg(long, global = true, default_value = DEFAULT_PAGE_URL)]
    url: String,

    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Number of suggestions to request.
    #[arg(long, global = true, default_value_t = DEFAULT_LIMIT)]
    max_suggestions: usize,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    timeout_ms: u64,

    /// Quiet period before a suggestion request, in milliseconds.
    #[arg(long, global = true, default_value_t = 300)]
    debounce_ms: u64,

    /// Shortest prefix that is sent for suggestions.
    #[arg(long, global = true, default_value_t = 1)]
    min_length: usize,

    /// Treat `w=` links in entries as ordinary links.
    #[arg(long, global = true)]
    no_link_rewrite: bool,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the words that follow a prefix.
    Suggest {
        /// Prefix as typed, sent unmodified.
        prefix: String,
    },
    /// Show the entry for a word.
    Lookup {
        word: String,
        /// Print the fragment markup even when stdout is a terminal.
        #[arg(long)]
        raw: bool,
    },
    /// Interactive lookup loop over stdin.
    Shell,
}

impl Cli {
    fn config(&self) -> ClientConfig {
        ClientConfig {
            page_url: self.url.clone(),
            max_suggestions: self.max_suggestions,
            timeout: Duration::from_millis(self.timeout_ms),
            link_rewrite: !self.no_link_rewrite,
            suggest: SuggestPolicy {
                delay: Duration::from_millis(self.debounce_ms),
                min_length: self.min_length,
            },
        }
    }
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(cli))
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = cli.config();
    match cli.command {
        Command::Suggest { prefix } => handle_suggest(&config, prefix, cli.json).await,
        Command::Lookup { word, raw } => handle_lookup(&config, word, raw, cli.json).await,
        Command::Shell => handle_shell(&config).await,
    }
}

async fn handle_suggest(
    config: &ClientConfig,
    prefix: String,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let controller = LookupController::connect(config, BufferRegion::new())?;
    let list = controller.suggestions().suggest(&prefix).await;

    if as_json {
        let payload = json!({
            "prefix": prefix,
            "limit": controller.suggestions().limit(),
            "suggestions": list,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_suggestions(&prefix, &list);
    }
    Ok(())
}

async fn handle_lookup(
    config: &ClientConfig,
    word: String,
    raw: bool,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    let mut controller = LookupController::connect(config, BufferRegion::new())?;
    controller.set_query(word.as_str());
    let outcome = controller.submit().await;

    if as_json {
        let payload = json!({
            "word": word,
            "outcome": outcome,
            "html": controller.region().html(),
            "links": controller.cross_references(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if raw || !stdout_is_tty() {
        println!("{}", controller.region().html());
    } else {
        println!("{}", plain_text(controller.region().html()));
        print_links(controller.cross_references());
    }

    match outcome {
        LookupOutcome::Loaded => Ok(()),
        LookupOutcome::Failed(status) => Err(format!("lookup of {word:?} failed: {status}").into()),
    }
}

/// Prints each fragment as it lands: plain text on a terminal, markup otherwise.
struct TerminalRegion {
    tty: bool,
}

impl ContentRegion for TerminalRegion {
    fn replace(&mut self, fragment: Fragment) {
        let html = fragment.to_html();
        if self.tty {
            println!("{}", "-".repeat(40));
            println!("{}", plain_text(&html));
        } else {
            println!("{html}");
        }
    }
}

const SHELL_HELP: &str = "?prefix  suggest | !N  pick suggestion N | !  close list | @N  follow link N | :q  quit | other  look up";

async fn handle_shell(config: &ClientConfig) -> Result<(), Box<dyn Error>> {
    let region = TerminalRegion {
        tty: stdout_is_tty(),
    };
    let mut controller = LookupController::connect(config, region)?;
    let mut listed: Vec<String> = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{SHELL_HELP}");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim_end_matches(['\r', '\n']);
        let events = match parse_shell_line(line, &listed, controller.cross_references()) {
            ShellInput::Quit => break,
            ShellInput::Nothing => continue,
            ShellInput::Invalid(message) => {
                println!("{message}");
                continue;
            }
            ShellInput::Lookup(word) => {
                controller.set_query(word);
                vec![UiEvent::FormSubmitted]
            }
            ShellInput::Events(events) => events,
        };
        for event in events {
            match controller.dispatch(event).await {
                Reaction::Suggestions(list) => {
                    print_numbered(&list);
                    listed = list;
                }
                Reaction::Superseded | Reaction::Armed => {}
                Reaction::TooShort => println!("(prefix too short)"),
                Reaction::Dismissed => {
                    println!("(list closed)");
                    listed.clear();
                }
                Reaction::Submitted(outcome) => {
                    listed.clear();
                    if let LookupOutcome::Failed(status) = outcome {
                        println!("lookup of {:?} failed: {status}", controller.query());
                    }
                    print_links(controller.cross_references());
                }
                Reaction::Navigate(href) => println!("not an entry link, open it yourself: {href}"),
            }
        }
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum ShellInput {
    Quit,
    Nothing,
    Invalid(String),
    /// Typed word, submitted without going through the list.
    Lookup(String),
    Events(Vec<UiEvent>),
}

fn parse_shell_line(line: &str, listed: &[String], links: &[CrossReference]) -> ShellInput {
    if line == ":q" {
        return ShellInput::Quit;
    }
    if line.trim().is_empty() {
        return ShellInput::Nothing;
    }
    if let Some(prefix) = line.strip_prefix('?') {
        return ShellInput::Events(vec![UiEvent::QueryChanged(prefix.to_string())]);
    }
    if let Some(rest) = line.strip_prefix('!') {
        if rest.trim().is_empty() {
            return ShellInput::Events(vec![UiEvent::ListClosed]);
        }
        return match pick(rest, listed) {
            Some(item) => ShellInput::Events(vec![
                UiEvent::ItemSelected(item.clone()),
                UiEvent::ListClosed,
            ]),
            None => ShellInput::Invalid(format!("no suggestion {}", rest.trim())),
        };
    }
    if let Some(rest) = line.strip_prefix('@') {
        return match pick(rest, links) {
            Some(link) => ShellInput::Events(vec![UiEvent::LinkClicked(link.href.clone())]),
            None => ShellInput::Invalid(format!("no link {}", rest.trim())),
        };
    }
    ShellInput::Lookup(line.to_string())
}

fn pick<'a, T>(index: &str, items: &'a [T]) -> Option<&'a T> {
    let n: usize = index.trim().parse().ok()?;
    n.checked_sub(1).and_then(|i| items.get(i))
}

fn print_suggestions(prefix: &str, list: &[String]) {
    println!("Suggestions for \"{prefix}\":");
    print_numbered(list);
}

fn print_numbered(list: &[String]) {
    let width = list.len().to_string().len();
    for (i, item) in list.iter().enumerate() {
        println!("{:>width$}. {}", i + 1, item, width = width);
    }
}

fn print_links(links: &[CrossReference]) {
    if !links.iter().any(|link| link.word.is_some()) {
        return;
    }
    println!("\nLinks:");
    for (i, link) in links.iter().enumerate() {
        if let Some(word) = &link.word {
            println!("  @{} {} -> {}", i + 1, link.label, word);
        }
    }
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}
