use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tubechat_config::load as load_config;
use tubechat_models::{ChatMessage, ChatSession, ContentItem};
use tubechat_runtime::{shutdown_signal, telemetry, AppContext};
use tubechat_stores::{video_id_from_url, StoreError};

#[derive(Parser)]
#[command(name = "tubechat")]
#[command(about = "Chat over ingested videos and documents (console by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start interactive console (default)
    Console,
    /// Ingest a video by URL and print the stored item
    Ingest { url: String },
    /// List ingested content
    Contents,
    /// List chats of a user
    Chats {
        /// User id, defaults to the configured session user
        #[arg(long)]
        user: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;

    let config = load_config().context("failed to load configuration")?;
    let context = AppContext::initialise(&config).context("failed to initialise client")?;

    let outcome = match cli.command.unwrap_or(Commands::Console) {
        Commands::Console => run_console(&context).await,
        Commands::Ingest { url } => ingest(&context, &url).await,
        Commands::Contents => list_contents(&context).await,
        Commands::Chats { user } => list_chats(&context, user).await,
    };

    context.shutdown();
    outcome
}

async fn ingest(context: &AppContext, url: &str) -> anyhow::Result<()> {
    let item = context
        .content
        .ingest_from_external_source(url)
        .await
        .with_context(|| format!("failed to ingest {url}"))?;
    print_content(&item);
    Ok(())
}

async fn list_contents(context: &AppContext) -> anyhow::Result<()> {
    let contents = context
        .content
        .load_all()
        .await
        .context("failed to load contents")?;
    print_contents(&contents);
    Ok(())
}

async fn list_chats(context: &AppContext, user: Option<i64>) -> anyhow::Result<()> {
    let user_id = user.unwrap_or_else(|| context.user_id());
    let chats = context
        .chat
        .load_user_chats(user_id)
        .await
        .with_context(|| format!("failed to load chats of user {user_id}"))?;
    print_chats(&chats, None);
    Ok(())
}

async fn run_console(context: &AppContext) -> anyhow::Result<()> {
    info!(user_id = context.user_id(), "starting interactive console");

    println!("TubeChat Interactive Console");
    println!("Ingest a video with '/ingest <url>', then type a question to chat about it");
    println!("Type '/help' for all commands, Ctrl+C or '/quit' to exit");
    println!("---");

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::Write::flush(&mut std::io::stdout())?;

        line.clear();
        let bytes_read = tokio::select! {
            read = reader.read_line(&mut line) => read?,
            _ = shutdown_signal() => break,
        };
        if bytes_read == 0 {
            break; // EOF
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        if !input.starts_with('/') {
            send(context, input).await;
            continue;
        }

        let (command, argument) = match input.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, argument.trim()),
            None => (input, ""),
        };

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                break;
            }
            "/help" | "/h" => print_help(),
            "/ingest" | "/i" => {
                if argument.is_empty() {
                    println!("Usage: /ingest <url>");
                    continue;
                }
                match context.content.ingest_from_external_source(argument).await {
                    Ok(item) => print_content(&item),
                    Err(err) => report_failure(&err, context.content.error()),
                }
            }
            "/contents" | "/ls" => match context.content.load_all().await {
                Ok(contents) => print_contents(&contents),
                Err(err) => report_failure(&err, context.content.error()),
            },
            "/content" => {
                let Some(id) = parse_id(argument, "/content <id>") else {
                    continue;
                };
                match context.content.load_one(id).await {
                    Ok(item) => print_content(&item),
                    Err(err) => report_failure(&err, context.content.error()),
                }
            }
            "/delete" | "/rm" => {
                let Some(id) = parse_id(argument, "/delete <id>") else {
                    continue;
                };
                match context.content.delete(id).await {
                    Ok(()) => println!("Deleted content {id}"),
                    Err(err) => report_failure(&err, context.content.error()),
                }
            }
            "/clear" | "/cl" => {
                context.content.clear();
                println!("Cleared local content");
            }
            "/new" | "/n" => match context.chat.create(context.user_id()).await {
                Ok(chat) => println!("Started {}", chat.display_title().bold()),
                Err(err) => report_failure(&err, context.chat.error()),
            },
            "/open" | "/o" => {
                let Some(id) = parse_id(argument, "/open <chat_id>") else {
                    continue;
                };
                match context.chat.load(id).await {
                    Ok(chat) => {
                        println!("Opened {}", chat.display_title().bold());
                        print_history(&context.chat.sorted_messages());
                    }
                    Err(err) => report_failure(&err, context.chat.error()),
                }
            }
            "/chats" | "/c" => match context.chat.load_user_chats(context.user_id()).await {
                Ok(chats) => {
                    let active = context.chat.current_chat().map(|chat| chat.id);
                    print_chats(&chats, active);
                }
                Err(err) => report_failure(&err, context.chat.error()),
            },
            "/history" | "/hi" => {
                if context.chat.has_active_chat() {
                    print_history(&context.chat.sorted_messages());
                } else {
                    println!("No active chat, start one with '/new' or '/open <chat_id>'");
                }
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type '/help' for available commands");
            }
        }
    }

    Ok(())
}

async fn send(context: &AppContext, text: &str) {
    if !context.chat.has_active_chat() {
        match context.chat.create(context.user_id()).await {
            Ok(chat) => println!("{}", format!("Started {}", chat.display_title()).dimmed()),
            Err(err) => return report_failure(&err, context.chat.error()),
        }
    }

    let video_id = active_video_id(&context.content.contents());

    match context.chat.send_message(text, video_id.as_deref()).await {
        Ok(response) => {
            print_message(&response.message);
            if let Some(sources) = response.sources.filter(|sources| !sources.is_empty()) {
                println!("{}", format!("  ({} sources)", sources.len()).dimmed());
            }
        }
        Err(err) => report_failure(&err, context.chat.error()),
    }
}

/// Video id of the content the chat refers to: the only held item, if it is a video.
fn active_video_id(contents: &[ContentItem]) -> Option<String> {
    match contents {
        [item] if item.is_video() => item
            .source_url
            .as_deref()
            .map(|url| video_id_from_url(url).to_string()),
        _ => None,
    }
}

fn parse_id(argument: &str, usage: &str) -> Option<i64> {
    match argument.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Usage: {usage}");
            None
        }
    }
}

fn report_failure(err: &StoreError, recorded: Option<String>) {
    let message = recorded.unwrap_or_else(|| err.to_string());
    println!("{} {}", "error:".red().bold(), message);
}

fn print_help() {
    println!("Available commands:");
    println!("  /help, /h            - Show this help");
    println!("  /ingest, /i <url>    - Ingest a video (replaces local content)");
    println!("  /contents, /ls       - Load all content");
    println!("  /content <id>        - Load one content item");
    println!("  /delete, /rm <id>    - Delete a content item");
    println!("  /clear, /cl          - Forget local content");
    println!("  /new, /n             - Start a new chat");
    println!("  /open, /o <chat_id>  - Open an existing chat");
    println!("  /chats, /c           - List your chats");
    println!("  /history, /hi        - Show messages of the active chat");
    println!("  /quit, /exit, /q     - Exit console");
    println!("Anything else is sent as a message in the active chat.");
}

fn print_content(item: &ContentItem) {
    println!(
        "  {}: {} [{}]",
        item.id,
        item.title.bold(),
        item.content_type
    );
    if let Some(url) = &item.source_url {
        println!("     {}", url.dimmed());
    }
}

fn print_contents(contents: &[ContentItem]) {
    if contents.is_empty() {
        println!("No content found");
        return;
    }
    println!("Content:");
    for item in contents {
        print_content(item);
    }
}

fn print_chats(chats: &[ChatSession], active: Option<i64>) {
    if chats.is_empty() {
        println!("No chats found");
        return;
    }
    println!("Chats:");
    for chat in chats {
        let marker = if Some(chat.id) == active { "*" } else { " " };
        println!(
            " {}{}: {} ({} messages, updated {})",
            marker,
            chat.id,
            chat.display_title(),
            chat.messages.len(),
            chat.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
}

fn print_history(messages: &[ChatMessage]) {
    if messages.is_empty() {
        println!("No messages yet");
        return;
    }
    for message in messages {
        print_message(message);
    }
}

fn print_message(message: &ChatMessage) {
    let role = format!("{:>9}", message.role.as_str());
    let role = if message.is_user() {
        role.cyan()
    } else if message.is_assistant() {
        role.green()
    } else {
        role.yellow()
    };
    println!(
        "{} {} {}",
        message.created_at.format("%H:%M:%S").to_string().dimmed(),
        role,
        message.content
    );
}
