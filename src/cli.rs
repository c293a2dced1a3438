use std::error::Error;
#[cfg(feature = "web")]
use std::net::{IpAddr, SocketAddr};
#[cfg(feature = "web")]
use std::path::PathBuf;

use atty::Stream;
use clap::{Parser, Subcommand};
use serde_json::json;
use termgloss_rs::{DEFAULT_UPSTREAM, DirectoryClient, Term, build_snippet, pages};
use termimad::{FmtText, MadSkin, terminal_size};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "termgloss", about = "Browse a remote glossary", version)]
pub struct Cli {
    /// Emit JSON instead of human-readable output.
    #[arg(long, global = true)]
    json: bool,

    /// Base URL of the dictionary API.
    #[arg(long, global = true, env = "TERMGLOSS_UPSTREAM", default_value = DEFAULT_UPSTREAM)]
    upstream: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the glossary website.
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on.
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
        /// Interface to bind.
        #[arg(long, env = "TERMGLOSS_HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        /// Directory of static assets served after the page routes.
        #[arg(long, env = "TERMGLOSS_PUBLIC_DIR", default_value = "public")]
        public_dir: PathBuf,
    },
    /// Look up terms from the command line.
    #[command(subcommand)]
    Term(TermCommand),
}

#[derive(Subcommand, Debug)]
enum TermCommand {
    /// List every term with its aliases.
    List,
    /// Show a term by name or alias.
    Show {
        /// Name or alias, matched case-insensitively.
        name: String,
    },
    /// Search term descriptions.
    Search {
        /// Words to search for.
        query: String,
    },
}

pub fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    match cli.command {
        #[cfg(feature = "web")]
        Command::Serve {
            port,
            host,
            public_dir,
        } => {
            let config = termgloss_rs::web::WebConfig {
                addr: SocketAddr::new(host, port),
                upstream: cli.upstream,
                public_dir,
            };
            runtime.block_on(termgloss_rs::web::serve(config))?;
            Ok(())
        }
        Command::Term(command) => {
            let client = DirectoryClient::new(cli.upstream.as_str())?;
            runtime.block_on(handle_term(&client, command, cli.json))
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn handle_term(
    client: &DirectoryClient,
    command: TermCommand,
    as_json: bool,
) -> Result<(), Box<dyn Error>> {
    match command {
        TermCommand::List => {
            let directory = client.fetch_all().await?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(&directory)?);
            } else {
                print_term_table(directory.terms());
            }
        }
        TermCommand::Show { name } => {
            let directory = client.fetch_all().await?;
            let term = directory
                .resolve(&name)
                .ok_or_else(|| format!("No term or alias matches {name:?}"))?;
            if as_json {
                println!("{}", serde_json::to_string_pretty(term)?);
            } else {
                print_term(term);
            }
        }
        TermCommand::Search { query } => {
            if query.trim().is_empty() {
                return Err("Search query cannot be empty".into());
            }
            let results = client.search(query.trim()).await?;
            if as_json {
                let payload = json!({
                    "query": query.trim(),
                    "count": results.len(),
                    "results": results.iter().map(|result| {
                        json!({
                            "name": result.term.name,
                            "snippet": build_snippet(&result.term.description, result.headline.as_deref()),
                        })
                    }).collect::<Vec<_>>(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else if results.is_empty() {
                println!("No terms matched \"{}\".", query.trim());
            } else {
                for result in &results {
                    let snippet = build_snippet(&result.term.description, result.headline.as_deref())
                        .replace("<b>", "**")
                        .replace("</b>", "**");
                    render_markdown_block(&result.term.name, &snippet);
                }
            }
        }
    }
    Ok(())
}

fn print_term_table(terms: &[Term]) {
    if terms.is_empty() {
        println!("The glossary is empty.");
        return;
    }
    let width = terms
        .iter()
        .map(|term| term.name.chars().count())
        .max()
        .unwrap_or(4)
        .max("NAME".len());
    println!("{:<width$}  {}", "NAME", "ALIASES", width = width);
    println!("{:-<width$}  {}", "", "-------", width = width);
    for term in terms {
        println!(
            "{:<width$}  {}",
            term.name,
            term.aliases_or("-"),
            width = width
        );
    }
}

fn print_term(term: &Term) {
    println!("{} (ID {})", term.name, term.id);
    println!("Aliases: {}", term.aliases_or("None"));
    println!("Category: {} (#{})", term.category, term.category_id);
    println!("Added: {}", pages::format_created(&term.created));
    render_markdown_block("Description", &term.description);
    render_markdown_block("Source", &term.source);
}

fn stdout_is_tty() -> bool {
    atty::is(Stream::Stdout)
}

fn markdown_width() -> usize {
    let (width, _) = terminal_size();
    width.max(60) as usize
}

fn render_markdown_block(title: &str, body: &str) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return;
    }
    println!("\n{title}:");
    if stdout_is_tty() {
        let skin = MadSkin::default();
        let formatted = FmtText::from(&skin, trimmed, Some(markdown_width()));
        println!("{formatted}");
    } else {
        println!("{trimmed}");
    }
}
