//! castdesk - media portal back office
//!
//! Imports embedded media from third-party video sites, edits the site
//! settings and moderates reader comments.

use anyhow::Result;
use castdesk::database::{database_url, initialize_database, DatabaseManager};
use castdesk::storage::http::build_client;
use castdesk::utils::error::CastdeskError;
use castdesk::{AppSettings, CommentModerator, EngineRegistry, MediaLibrary, SettingsCategory, SettingsManager};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, Level};

#[derive(Parser)]
#[command(name = "castdesk", version, about = "Media portal back office")]
struct Args {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the registered storage engines
    Engines,
    /// Fetch metadata for a URL without storing it
    Parse { url: String },
    /// Import one or more URLs into the library
    Import {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Show the playable URIs of a stored media file
    Uris { media_id: i64 },
    /// List the stored media files
    Media,
    #[command(subcommand)]
    Settings(SettingsCommand),
    #[command(subcommand)]
    Comments(CommentsCommand),
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show a settings category
    Show { category: String },
    /// Save `key=value` pairs in a settings category
    Save {
        category: String,
        #[arg(value_parser = parse_key_value)]
        values: Vec<(String, String)>,
    },
}

#[derive(Subcommand)]
enum CommentsCommand {
    /// List comments that are not in the trash
    List {
        #[arg(long)]
        search: Option<String>,
    },
    /// Post a new comment
    Post { subject: String, body: String },
    Approve { id: i64 },
    Trash { id: i64 },
    /// Replace a comment body
    Edit { id: i64, body: String },
}

fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got {}", raw))
}

fn main() {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let result = tokio::runtime::Runtime::new()
        .map_err(anyhow::Error::from)
        .and_then(|rt| rt.block_on(run(args)));

    if let Err(e) = result {
        error!("{:#}", e);
        let code = match e.downcast_ref::<CastdeskError>() {
            Some(CastdeskError::Validation { .. }) | Some(CastdeskError::UnsupportedUrl(_)) => 2,
            Some(CastdeskError::NotFound(_)) => 3,
            _ => 1,
        };
        std::process::exit(code);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = AppSettings::load_or_default(args.config.as_deref())?;
    let client = build_client(&config)?;
    let registry = Arc::new(EngineRegistry::with_defaults(client, &config.endpoints));

    match args.command {
        Command::Engines => {
            for engine in registry.engines() {
                println!("{}\t{}", engine.engine_type(), engine.default_name());
            }
        }
        Command::Parse { url } => {
            let (engine_type, meta) = registry.parse(&url).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "engine": engine_type,
                    "meta": meta,
                }))?
            );
        }
        Command::Import { urls } => {
            let library = MediaLibrary::new(registry, open_database(&config).await?);
            for (url, result) in library.import_many(&urls).await {
                match result {
                    Ok(file) => println!("{}\t{}", file.id.unwrap_or_default(), url),
                    Err(e) => error!("{}: {:#}", url, e),
                }
            }
        }
        Command::Uris { media_id } => {
            let library = MediaLibrary::new(registry, open_database(&config).await?);
            for uri in library.uris(media_id).await? {
                println!("{}\t{}", uri.scheme, uri.url);
            }
        }
        Command::Media => {
            let library = MediaLibrary::new(registry, open_database(&config).await?);
            for file in library.list().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    file.id.unwrap_or_default(),
                    file.storage_engine,
                    file.unique_id,
                    file.display_name.as_deref().unwrap_or("")
                );
            }
        }
        Command::Settings(command) => {
            let db = open_database(&config).await?;
            let settings = SettingsManager::load(db, config.available_languages.clone()).await?;
            run_settings(&settings, command).await?;
        }
        Command::Comments(command) => {
            let db = open_database(&config).await?;
            let settings = SettingsManager::load(db.clone(), config.available_languages.clone()).await?;
            let moderator = CommentModerator::new(db, Arc::new(settings));
            run_comments(&moderator, command).await?;
        }
    }

    Ok(())
}

async fn open_database(config: &AppSettings) -> Result<DatabaseManager> {
    let pool = initialize_database(&database_url(&config.database_path)).await?;
    Ok(DatabaseManager::new(pool))
}

async fn run_settings(settings: &SettingsManager, command: SettingsCommand) -> Result<()> {
    match command {
        SettingsCommand::Show { category } => {
            let category: SettingsCategory = category.parse()?;
            for field in settings.display(category, &HashMap::new()).await {
                println!("{} = {}", field.key, field.value);
            }
        }
        SettingsCommand::Save { category, values } => {
            let category: SettingsCategory = category.parse()?;
            let values: HashMap<String, String> = values.into_iter().collect();
            let outcome = settings.save(category, &values).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}

async fn run_comments(moderator: &CommentModerator, command: CommentsCommand) -> Result<()> {
    match command {
        CommentsCommand::List { search } => {
            for comment in moderator.list(search.as_deref()).await? {
                println!(
                    "{}\t[{}]\t{}\t{}",
                    comment.id, comment.status, comment.subject, comment.body
                );
            }
        }
        CommentsCommand::Post { subject, body } => {
            let comment = moderator.post(&subject, &body).await?;
            println!("{}\t[{}]", comment.id, comment.status);
        }
        CommentsCommand::Approve { id } => {
            println!("{}", serde_json::to_string(&moderator.approve(id).await?)?);
        }
        CommentsCommand::Trash { id } => {
            println!("{}", serde_json::to_string(&moderator.trash(id).await?)?);
        }
        CommentsCommand::Edit { id, body } => {
            let comment = moderator.save(id, &body).await?;
            println!("{}\t{}", comment.id, comment.body);
        }
    }
    Ok(())
}
