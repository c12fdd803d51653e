use std::borrow::Cow::{self, Borrowed, Owned};
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use colloquy_app::ChatService;
use colloquy_client::{ApiConfig, CredentialStore, QaClient};
use colloquy_core::conversation::{Conversation, MessageRole};

const COMMANDS: [&str; 7] = [
    "/new", "/list", "/select", "/rename", "/delete", "/history", "/quit",
];

/// CLI helper for rustyline that provides completion, highlighting, and hints.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMANDS.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];

        if line.starts_with('/') {
            let candidates: Vec<Pair> = self
                .commands
                .iter()
                .filter(|cmd| cmd.starts_with(line))
                .map(|cmd| Pair {
                    display: cmd.clone(),
                    replacement: cmd.clone(),
                })
                .collect();
            Ok((0, candidates))
        } else {
            Ok((0, vec![]))
        }
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];

        if line.starts_with('/') && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

fn print_sidebar(conversations: &[Conversation], active_id: Option<&str>) {
    if conversations.is_empty() {
        println!("{}", "No conversations yet. Just type to start one.".bright_black());
        return;
    }

    for (index, conversation) in conversations.iter().enumerate() {
        let marker = if Some(conversation.id.as_str()) == active_id {
            "*"
        } else {
            " "
        };
        let line = format!(
            "{marker} {:>2}. {}  ({})",
            index + 1,
            conversation.title,
            conversation.updated_at.format("%Y-%m-%d %H:%M")
        );
        if Some(conversation.id.as_str()) == active_id {
            println!("{}", line.bright_white());
        } else {
            println!("{line}");
        }
    }
}

fn print_transcript(conversation: &Conversation) {
    println!("{}", format!("=== {} ===", conversation.title).bright_magenta());
    for message in &conversation.messages {
        match message.role {
            MessageRole::User => println!("{}", format!("> {}", message.content).green()),
            MessageRole::Assistant => {
                for line in message.content.lines() {
                    println!("{}", line.bright_blue());
                }
            }
        }
    }
}

/// Resolves a command argument to a conversation id: a 1-based index into
/// the sidebar, or a raw id.
fn resolve_target(conversations: &[Conversation], arg: &str) -> Option<String> {
    if let Ok(index) = arg.parse::<usize>() {
        return conversations
            .get(index.checked_sub(1)?)
            .map(|c| c.id.clone());
    }
    conversations
        .iter()
        .find(|c| c.id == arg)
        .map(|c| c.id.clone())
}

async fn handle_command(service: &ChatService, line: &str) -> Result<bool> {
    let mut parts = line.splitn(3, ' ');
    let command = parts.next().unwrap_or_default();
    let arg = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default();

    match command {
        "/quit" => return Ok(true),
        "/new" => {
            service.new_conversation().await;
            println!("{}", "Started a new conversation.".bright_green());
        }
        "/list" => {
            let conversations = service.conversations().await;
            let active = service.active_conversation_id().await;
            print_sidebar(&conversations, active.as_deref());
        }
        "/select" => {
            let conversations = service.conversations().await;
            match resolve_target(&conversations, arg) {
                Some(id) => {
                    service.select_conversation(&id).await;
                    if let Some(conversation) = service.active_conversation().await {
                        print_transcript(&conversation);
                    }
                }
                None => eprintln!("{}", format!("No conversation '{arg}'").red()),
            }
        }
        "/rename" => {
            let conversations = service.conversations().await;
            match resolve_target(&conversations, arg) {
                Some(id) if !rest.trim().is_empty() => {
                    service.rename_conversation(&id, rest).await;
                    println!("{}", "Renamed.".bright_green());
                }
                Some(_) => eprintln!("{}", "Usage: /rename <number> <title>".yellow()),
                None => eprintln!("{}", format!("No conversation '{arg}'").red()),
            }
        }
        "/delete" => {
            let conversations = service.conversations().await;
            match resolve_target(&conversations, arg) {
                Some(id) => match service.delete_conversation(&id).await {
                    Ok(()) => println!("{}", "Deleted.".bright_green()),
                    Err(err) => eprintln!("{}", format!("Delete failed: {err}").red()),
                },
                None => eprintln!("{}", format!("No conversation '{arg}'").red()),
            }
        }
        "/history" => match service.load_history().await {
            Ok(count) => println!("{}", format!("Loaded {count} history records.").bright_green()),
            Err(err) => eprintln!("{}", format!("History load failed: {err}").red()),
        },
        _ => println!("{}", "Unknown command".bright_black()),
    }

    Ok(false)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ===== Backend wiring =====
    let config = ApiConfig::load().unwrap_or_else(|err| {
        eprintln!("{}", format!("Config error, using defaults: {err}").yellow());
        ApiConfig::default()
    });
    let credentials = CredentialStore::new().ok().and_then(|store| store.resolve());
    let token = credentials.as_ref().and_then(|c| c.token.clone());

    let client = QaClient::new(&config, token)?;
    let service = Arc::new(ChatService::new(Arc::new(client), credentials));

    if let Err(err) = service.load_history().await {
        eprintln!(
            "{}",
            format!("Could not load conversation history: {err}").yellow()
        );
    }

    // ===== REPL setup =====
    let helper = CliHelper::new();
    let mut rl = Editor::new()?;
    rl.set_helper(Some(helper));

    println!("{}", "=== colloquy ===".bright_magenta().bold());
    match service.credentials() {
        Some(credentials) => println!(
            "{}",
            format!("Logged in as {} (user {}).", credentials.nickname, credentials.user_id)
                .bright_black()
        ),
        None => println!(
            "{}",
            "Not logged in - sending is disabled until credentials are configured.".yellow()
        ),
    }
    println!(
        "{}",
        "Type a question, or /list, /select, /new, /rename, /delete, /history, /quit."
            .bright_black()
    );
    println!();

    // ===== Main REPL loop =====
    loop {
        let readline = rl.readline(">> ");

        match readline {
            Ok(line) => {
                let trimmed = line.trim();

                if trimmed == "quit" || trimmed == "exit" {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if trimmed.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(&line);

                if trimmed.starts_with('/') {
                    if handle_command(&service, trimmed).await? {
                        println!("{}", "Goodbye!".bright_green());
                        break;
                    }
                    continue;
                }

                println!("{}", format!("> {trimmed}").green());
                match service.send_message(trimmed).await {
                    Ok(outcome) => {
                        for line in outcome.reply.content.lines() {
                            println!("{}", line.bright_blue());
                        }
                    }
                    Err(err) => eprintln!("{}", format!("Error: {err}").red()),
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}
