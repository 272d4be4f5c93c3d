mod cli;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use cli::{Cli, Commands, PostCommands};

use peephole_core::config::Config;
use peephole_core::{Channel, Classifier, PostId};
use peephole_db::queries::posts;
use peephole_db::SqlitePostSource;
use peephole_server::routes::channel::{render_channel, render_programme};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick defaults from the verbose flag.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "peephole=trace,peephole_core=trace,peephole_db=debug,peephole_server=debug,tower_http=debug"
                .to_string()
        } else {
            "peephole=info,peephole_core=info,peephole_db=warn,peephole_server=info,tower_http=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Start { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(host, port, config_path))
        }
        Commands::Now { at, json } => now(config_path, at.as_deref(), json),
        Commands::Programme { at } => programme(config_path, at.as_deref()),
        Commands::Scan { file } => scan(config_path, file.as_deref()),
        Commands::Post { command } => match command {
            PostCommands::Add { file, updated_at } => {
                add_post(config_path, file.as_deref(), updated_at.as_deref())
            }
            PostCommands::List { at } => list_posts(config_path, at.as_deref()),
            PostCommands::Edit {
                id,
                file,
                updated_at,
            } => edit_post(config_path, &id, file.as_deref(), updated_at.as_deref()),
            PostCommands::Rm { id } => remove_post(config_path, &id),
        },
        Commands::Validate {
            config: validate_path,
        } => {
            let path = validate_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("peephole {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

async fn start_server(host: Option<String>, port: Option<u16>, config_path: Option<&Path>) -> Result<()> {
    let mut config = Config::load_or_default(config_path);

    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    peephole_server::start(config).await?;
    Ok(())
}

fn parse_time(value: Option<&str>, flag: &str) -> Result<DateTime<Utc>> {
    match value {
        None => Ok(Utc::now()),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .with_context(|| format!("invalid {flag} timestamp '{s}'")),
    }
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn channel_for(config: &Config) -> Channel {
    Channel::new(Classifier::new(&config.classifier), config.channel.clone())
}

fn now(config_path: Option<&Path>, at: Option<&str>, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let at = parse_time(at, "--at")?;

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    let view = render_channel(&SqlitePostSource::new(&conn), &channel_for(&config), at)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        println!("{}", view.html);
    }
    Ok(())
}

fn programme(config_path: Option<&Path>, at: Option<&str>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let at = parse_time(at, "--at")?;

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    let resp = render_programme(&SqlitePostSource::new(&conn), &channel_for(&config), at)?;

    println!("Window: {} .. {}", resp.start.to_rfc3339(), resp.end.to_rfc3339());
    println!("Items: {}", resp.items.len());
    for (i, item) in resp.items.iter().enumerate() {
        println!(
            "  [{}] {} {}",
            i,
            item.kind,
            item.url.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn scan(config_path: Option<&Path>, file: Option<&Path>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let text = read_input(file)?;

    let items = Classifier::new(&config.classifier).classify_text(&text);
    if items.is_empty() {
        println!("No media found.");
    }
    for item in &items {
        println!(
            "{}\t{}",
            item.kind(),
            item.url().map(|u| u.as_str()).unwrap_or("-")
        );
    }
    Ok(())
}

fn add_post(config_path: Option<&Path>, file: Option<&Path>, updated_at: Option<&str>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let updated_at = parse_time(updated_at, "--updated-at")?;
    let raw = read_input(file)?;
    if raw.trim().is_empty() {
        anyhow::bail!("refusing to add an empty post");
    }

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    let post = posts::create_post(&conn, &raw, Utc::now(), Some(updated_at))?;

    let found = Classifier::new(&config.classifier).classify_text(&raw).len();
    println!("Added post {} ({} media item(s))", post.id, found);
    Ok(())
}

fn parse_post_id(id: &str) -> Result<PostId> {
    id.parse().with_context(|| format!("invalid post id '{id}'"))
}

fn list_posts(config_path: Option<&Path>, at: Option<&str>) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let at = parse_time(at, "--at")?;
    let (start, end) = channel_for(&config).window(at);

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    let in_window = posts::list_posts_updated_between(&conn, start, end)?;
    let total = posts::count_posts(&conn)?;

    println!("Posts in window: {} of {}", in_window.len(), total);
    for post in &in_window {
        let preview: String = post.raw.lines().next().unwrap_or("").chars().take(60).collect();
        println!("  {} {} {}", post.id, post.updated_at.to_rfc3339(), preview);
    }
    Ok(())
}

fn edit_post(
    config_path: Option<&Path>,
    id: &str,
    file: Option<&Path>,
    updated_at: Option<&str>,
) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let id = parse_post_id(id)?;
    let updated_at = parse_time(updated_at, "--updated-at")?;
    let raw = read_input(file)?;
    if raw.trim().is_empty() {
        anyhow::bail!("refusing to store an empty post");
    }

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    let post = posts::update_post_raw(&conn, id, &raw, updated_at)?;

    println!("Updated post {} at {}", post.id, post.updated_at.to_rfc3339());
    Ok(())
}

fn remove_post(config_path: Option<&Path>, id: &str) -> Result<()> {
    let config = Config::load_or_default(config_path);
    let id = parse_post_id(id)?;

    let db = peephole_server::open_db(&config)?;
    let conn = peephole_db::pool::get_conn(&db)?;
    if !posts::delete_post(&conn, id)? {
        anyhow::bail!("post {id} not found");
    }

    println!("Removed post {id}");
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            Config::load(p).with_context(|| format!("invalid config {}", p.display()))?
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("✓ Configuration is valid");
    } else {
        println!("Configuration has {} warning(s):", warnings.len());
        for w in &warnings {
            println!("  - {w}");
        }
    }
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!("  Database: {}", config.server.db_path.display());
    println!(
        "  Window: ±{} days, selection {:?}",
        config.channel.window_days, config.channel.selection
    );

    Ok(())
}
