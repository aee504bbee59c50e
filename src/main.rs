use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use avatar_studio::api::{AvatarApi, HttpAvatarApi};
use avatar_studio::chat::{AvatarResponder, ChatRole, ChatSession, Responder, TrainingResponder};
use avatar_studio::config::StudioConfig;
use avatar_studio::error::ChatError;
use avatar_studio::history::{ChatHistoryView, format_timestamp, sender_label};
use avatar_studio::identity::AccountRecord;
use avatar_studio::notify::{Clipboard, TracingNotifier};
use avatar_studio::store::{FileStore, LocalStore};

const USAGE: &str = "usage: avatar-studio <talk|train> <handle> [--account <base64>]\n       avatar-studio history [--account <base64>]";

/// No clipboard in a terminal session.
struct NoClipboard;

impl Clipboard for NoClipboard {
    fn write_text(&self, _text: &str) -> bool {
        false
    }
}

enum Mode {
    Talk(String),
    Train(String),
    History,
}

fn parse_args(args: &[String]) -> Option<(Mode, Option<String>)> {
    let account = args
        .iter()
        .position(|a| a == "--account")
        .and_then(|i| args.get(i + 1))
        .cloned();
    let positional: Vec<&String> = args
        .iter()
        .enumerate()
        .filter(|(i, a)| {
            !a.starts_with("--") && (*i == 0 || args[i - 1] != "--account")
        })
        .map(|(_, a)| a)
        .collect();

    let mode = match positional.as_slice() {
        [mode, handle] if mode.as_str() == "talk" => Mode::Talk(handle.to_string()),
        [mode, handle] if mode.as_str() == "train" => Mode::Train(handle.to_string()),
        [mode] if mode.as_str() == "history" => Mode::History,
        _ => return None,
    };
    Some((mode, account))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((mode, account_query)) = parse_args(&args) else {
        eprintln!("{USAGE}");
        std::process::exit(2);
    };

    let config = StudioConfig::from_env().context("loading configuration")?;
    let store: Arc<dyn LocalStore> = Arc::new(FileStore::open(&config.state_path));
    let api: Arc<dyn AvatarApi> =
        Arc::new(HttpAvatarApi::new(&config).context("building HTTP client")?);
    let account = AccountRecord::bootstrap(store.as_ref(), account_query.as_deref());

    eprintln!("🧑‍🚀 Avatar Studio v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   API: {}", config.api_base_url);

    match mode {
        Mode::Talk(handle) => {
            let responder = Arc::new(AvatarResponder::new(
                Arc::clone(&api),
                handle.clone(),
                account.contact_email(),
            ));
            eprintln!("   Talking to {}/{}", config.app_host, handle);
            run_chat(responder).await
        }
        Mode::Train(handle) => {
            let responder = Arc::new(TrainingResponder::new(Arc::clone(&api), handle.clone()));
            eprintln!("   Training {}", handle);
            run_chat(responder).await
        }
        Mode::History => {
            let view = ChatHistoryView::new(api, store, Arc::new(TracingNotifier), None);
            view.load().await;
            print_history(&view).await;
            Ok(())
        }
    }
}

async fn run_chat(responder: Arc<dyn Responder>) -> anyhow::Result<()> {
    eprintln!("   Type a message and press Enter. /edit N to rewrite message N, /quit to exit.\n");

    let session = ChatSession::new(responder, Arc::new(TracingNotifier), Arc::new(NoClipboard));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "/quit" | "/exit" => break,
            "/cancel" => {
                session.cancel_edit();
                continue;
            }
            _ => {}
        }

        if let Some(n) = line.strip_prefix("/edit ") {
            match n.trim().parse::<usize>() {
                Ok(n) => match session.begin_edit(n.saturating_sub(1)).await {
                    Ok(text) => eprintln!("editing #{n}: {text}"),
                    Err(e) => eprintln!("{e}"),
                },
                Err(_) => eprintln!("usage: /edit N"),
            }
            continue;
        }

        match session.submit(line).await {
            Ok(reply) => println!("\n{}\n", reply.content),
            Err(ChatError::EmptyInput) => {}
            Err(e) => eprintln!("{e}"),
        }
    }

    let transcript = session.transcript().await;
    let sent = transcript
        .iter()
        .filter(|m| m.role == ChatRole::LocalUser)
        .count();
    eprintln!("{sent} message(s) sent.");
    Ok(())
}

async fn print_history(view: &ChatHistoryView) {
    let Some(user_name) = view.user_name().await else {
        eprintln!("No avatar found for this account.");
        return;
    };
    println!("Conversations for {user_name}:");
    for conversation in view.visible().await {
        let participant = conversation.user.as_ref().map(|u| u.user_name.as_str());
        println!(
            "\n#{} with {}",
            conversation.conversation_id,
            participant.unwrap_or("Recruiter")
        );
        for message in &conversation.messages {
            println!(
                "  [{}] {}: {}",
                format_timestamp(message.created_at.as_deref()),
                sender_label(message, participant),
                message.message
            );
        }
    }
}
