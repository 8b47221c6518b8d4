use anyhow::Context;
use clap::{Parser, Subcommand};

use canvas_client::CanvasClient;
use canvas_core::config::{ClientConfig, Config};
use canvas_core::types::DEFAULT_TITLE;
use canvas_core::{CanvasContent, CanvasFormData};

#[derive(Parser)]
#[command(name = "canvas", about = "Manage canvases on a remote server", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Server origin, overriding the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Bearer token, overriding the config file
    #[arg(long, global = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all canvases
    List,

    /// Show one canvas
    Get { id: String },

    /// Create a canvas
    Create {
        #[arg(long)]
        title: Option<String>,

        /// Canvas payload as JSON
        #[arg(long)]
        data: Option<String>,

        /// Associate with a chat
        #[arg(long)]
        chat: Option<String>,
    },

    /// Update a canvas
    Update {
        id: String,

        #[arg(long)]
        title: Option<String>,

        /// Canvas payload as JSON
        #[arg(long)]
        data: Option<String>,

        /// Associate with a chat
        #[arg(long, conflicts_with = "detach_chat")]
        chat: Option<String>,

        /// Clear the chat association
        #[arg(long)]
        detach_chat: bool,
    },

    /// Delete a canvas
    Delete { id: String },

    /// Run a processing command over canvas content
    Process {
        id: String,

        /// Command name (summarize, echo, explain_code, ...)
        #[arg(long)]
        command: String,

        /// Plain-text content
        #[arg(long, conflicts_with = "json", required_unless_present = "json")]
        content: Option<String>,

        /// Structured content as JSON
        #[arg(long)]
        json: Option<String>,

        /// Model to process with (server default if omitted)
        #[arg(long)]
        model: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a specific config value
    Get { key: String },
    /// Validate the configuration
    Check,
}

fn init_logging(config: &Config, verbose: bool) {
    let logging = config.logging.as_ref();
    let mut directives = if verbose {
        "debug".to_string()
    } else {
        logging
            .and_then(|l| l.level.clone())
            .unwrap_or_else(|| "info".to_string())
    };
    for filter in logging.map(|l| l.filters.as_slice()).unwrap_or_default() {
        directives.push(',');
        directives.push_str(filter);
    }

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directives)),
        )
        .with_writer(std::io::stderr);

    if config.log_format() == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn parse_json(raw: &str, flag: &str) -> anyhow::Result<serde_json::Value> {
    serde_json::from_str(raw).with_context(|| format!("--{flag} is not valid JSON"))
}

fn build_form(
    title: Option<String>,
    data: Option<String>,
    chat: Option<String>,
    detach_chat: bool,
) -> anyhow::Result<CanvasFormData> {
    let mut form = CanvasFormData::new();
    if let Some(title) = title {
        form = form.with_title(title);
    }
    if let Some(data) = data {
        form = form.with_data(parse_json(&data, "data")?);
    }
    if let Some(chat) = chat {
        form = form.with_chat_id(chat);
    } else if detach_chat {
        form = form.without_chat();
    }
    Ok(form)
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .map(std::path::PathBuf::from)
        .unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path)?;

    init_logging(&config, cli.verbose);

    if cli.base_url.is_some() || cli.token.is_some() {
        let client = config.client.get_or_insert_with(ClientConfig::default);
        if let Some(base_url) = cli.base_url {
            client.base_url = Some(base_url);
        }
        if let Some(token) = cli.token {
            client.token = Some(token);
        }
    }

    let client = CanvasClient::from_config(&config);
    tracing::debug!(base_url = client.base_url(), "Using canvases API");

    match cli.command {
        Commands::List => print_json(&client.get_canvases().await?)?,
        Commands::Get { id } => print_json(&client.get_canvas_by_id(&id).await?)?,
        Commands::Create { title, data, chat } => {
            let form = build_form(title, data, chat, false)?;
            if form.title.is_none() {
                tracing::debug!("No --title given; the server will use \"{DEFAULT_TITLE}\"");
            }
            let canvas = client.create_canvas(&form).await?;
            tracing::info!(id = %canvas.id, "Created canvas");
            print_json(&canvas)?;
        }
        Commands::Update {
            id,
            title,
            data,
            chat,
            detach_chat,
        } => {
            let form = build_form(title, data, chat, detach_chat)?;
            if form.is_empty() {
                anyhow::bail!("Nothing to update: pass --title, --data, --chat or --detach-chat");
            }
            print_json(&client.update_canvas_by_id(&id, &form).await?)?;
        }
        Commands::Delete { id } => {
            client.delete_canvas_by_id(&id).await?;
            tracing::info!(%id, "Deleted canvas");
        }
        Commands::Process {
            id,
            command,
            content,
            json,
            model,
        } => {
            let content = match (content, json) {
                (Some(text), _) => CanvasContent::Text(text),
                (None, Some(raw)) => CanvasContent::from(parse_json(&raw, "json")?),
                (None, None) => anyhow::bail!("Pass --content or --json"),
            };
            let result = client
                .process_canvas_content(&id, content, command.as_str(), model.as_deref())
                .await?;
            println!("{}", result.processed_content);
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => print_json(&config)?,
            ConfigAction::Get { key } => match config.get_path(&key) {
                Some(value) => print_json(&value)?,
                None => anyhow::bail!("No config value at '{key}'"),
            },
            ConfigAction::Check => {
                let (warnings, errors) = config.validate();
                for warning in &warnings {
                    tracing::warn!("{warning}");
                }
                for error in &errors {
                    tracing::error!("{error}");
                }
                if !errors.is_empty() {
                    anyhow::bail!("Config has {} error(s)", errors.len());
                }
                println!("Config OK: {}", config_path.display());
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_build_form() {
        let form = build_form(
            Some("Plan".into()),
            Some(r#"{"blocks": []}"#.into()),
            None,
            true,
        )
        .unwrap();
        assert_eq!(
            serde_json::to_value(&form).unwrap(),
            serde_json::json!({"title": "Plan", "data": {"blocks": []}, "chat_id": null})
        );
    }

    #[test]
    fn test_build_form_rejects_bad_json() {
        let err = build_form(None, Some("{oops".into()), None, false).unwrap_err();
        assert!(err.to_string().contains("--data"));
    }

    #[test]
    fn test_process_requires_content() {
        assert!(Cli::try_parse_from(["canvas", "process", "c1", "--command", "echo"]).is_err());
        assert!(
            Cli::try_parse_from([
                "canvas", "process", "c1", "--command", "echo", "--content", "a", "--json", "{}"
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["canvas", "process", "c1", "--command", "echo", "--json", "{}"])
                .is_ok()
        );
    }
}
