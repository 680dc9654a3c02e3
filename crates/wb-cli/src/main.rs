//! `wb`: WritersBlock command line

use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use wb_core::prelude::*;
use wb_core::config::MAX_AUTOSAVE_DELAY_MS;
use wb_core::word_count;
use wb_slot::FileStore;

fn cli() -> Command {
    Command::new("wb")
        .version(wb_core::VERSION)
        .about("WritersBlock durable store and autosave tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store-dir")
                .long("store-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Use a file store in this directory, overriding the config"),
        )
        .subcommand(
            Command::new("get")
                .about("Print the raw value stored under a key")
                .arg(Arg::new("key").required(true)),
        )
        .subcommand(
            Command::new("set")
                .about("Store a JSON value under a key")
                .arg(Arg::new("key").required(true))
                .arg(Arg::new("json").required(true)),
        )
        .subcommand(Command::new("keys").about("List stored keys"))
        .subcommand(
            Command::new("notes")
                .about("Manage story notes")
                .subcommand_required(true)
                .subcommand(
                    Command::new("list").about("List notes").arg(
                        Arg::new("category")
                            .long("category")
                            .default_value("all")
                            .value_parser(NoteFilter::from_str)
                            .help("Person, Place, Plot, Misc or All"),
                    ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add a note")
                        .arg(Arg::new("title").long("title").required(true))
                        .arg(Arg::new("content").long("content").default_value(""))
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .default_value("Misc")
                                .value_parser(NoteCategory::from_str),
                        ),
                )
                .subcommand(
                    Command::new("remove")
                        .about("Delete a note")
                        .arg(Arg::new("id").required(true).value_parser(NoteId::from_str)),
                ),
        )
        .subcommand(
            Command::new("write")
                .about("Autosave text read from stdin into the editor document")
                .arg(Arg::new("title").long("title").help("Document title"))
                .arg(
                    Arg::new("delay-ms")
                        .long("delay-ms")
                        .value_parser(value_parser!(u64).range(..=MAX_AUTOSAVE_DELAY_MS))
                        .help("Autosave quiet period, overriding the config"),
                )
                .arg(
                    Arg::new("quiet")
                        .long("quiet")
                        .short('q')
                        .action(ArgAction::SetTrue)
                        .help("Only print the final word count"),
                ),
        )
}

fn load_config(matches: &ArgMatches) -> Result<WorkspaceConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => WorkspaceConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => WorkspaceConfig::new(),
    };
    if let Some(dir) = matches.get_one::<PathBuf>("store-dir") {
        config = config.with_store(StoreConfig::file(dir));
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    wb_diagnostics::init_logging(&config.logging.filter, config.logging.json)?;

    if !config.store.is_persistent() {
        tracing::warn!("memory store selected; values are lost when wb exits");
    }
    let store = open_store(&config.store).context("opening store")?;

    match matches.subcommand() {
        Some(("get", args)) => {
            let key = required(args, "key")?;
            match store.get(key)? {
                Some(text) => {
                    println!("{text}");
                    Ok(ExitCode::SUCCESS)
                }
                None => {
                    eprintln!("no value stored under '{key}'");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Some(("set", args)) => {
            let key = required(args, "key")?;
            let json = required(args, "json")?;
            serde_json::from_str::<serde_json::Value>(json)
                .with_context(|| format!("value for '{key}' is not valid JSON"))?;
            store.set(key, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Some(("keys", _)) => {
            if let StoreConfig::File { path } = &config.store {
                for key in FileStore::open(path)?.keys()? {
                    println!("{key}");
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("notes", args)) => run_notes(store, args),
        Some(("write", args)) => {
            let mut autosave = config.autosave;
            if let Some(delay_ms) = args.get_one::<u64>("delay-ms") {
                autosave.delay_ms = *delay_ms;
            }
            run_write(store, &autosave, args).await
        }
        _ => bail!("unknown command"),
    }
}

fn run_notes(store: std::sync::Arc<dyn DurableStore>, matches: &ArgMatches) -> Result<ExitCode> {
    let mut board = NotesBoard::open(store);

    match matches.subcommand() {
        Some(("list", args)) => {
            let filter = args
                .get_one::<NoteFilter>("category")
                .copied()
                .unwrap_or_default();
            for note in board.list(filter) {
                println!("{}  [{}] {}", note.id, note.category, note.title);
                if !note.content.is_empty() {
                    println!("    {}", note.content);
                }
            }
        }
        Some(("add", args)) => {
            let title = required(args, "title")?;
            let content = args.get_one::<String>("content").map_or("", String::as_str);
            let category = args
                .get_one::<NoteCategory>("category")
                .copied()
                .unwrap_or(NoteCategory::Misc);
            let note = board.add(title, content, category)?;
            println!("{}", note.id);
            tracing::info!(remaining = board.remaining(), "note added");
        }
        Some(("remove", args)) => {
            let id = args
                .get_one::<NoteId>("id")
                .copied()
                .context("missing note id")?;
            let note = board.remove(id)?;
            println!("removed '{}'", note.title);
        }
        _ => bail!("unknown notes command"),
    }

    if board.durability() == Durability::Diverged {
        bail!("notes were not persisted");
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_write(
    store: std::sync::Arc<dyn DurableStore>,
    autosave: &AutoSaveConfig,
    args: &ArgMatches,
) -> Result<ExitCode> {
    let quiet = args.get_flag("quiet");
    let mut session = EditorSession::open(store, autosave)?;
    if let Some(title) = args.get_one::<String>("title") {
        session.set_title(title.as_str());
    }

    let mut text = session.draft().content.clone();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !text.is_empty() {
            text.push('\n');
        }
        text.push_str(&line);
        session.set_text(text.as_str());
        if !quiet {
            eprintln!("{} words", word_count(&text));
        }
    }

    while session.status().pending || session.status().committing {
        tokio::time::sleep(session.delay().max(Duration::from_millis(10))).await;
    }

    let saved = session.saved();
    println!("{} words saved to '{}'", saved.word_count, saved.title);
    if session.durability() == Durability::Diverged {
        eprintln!("warning: the last save did not reach the store");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn required<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument '{name}'"))
}
