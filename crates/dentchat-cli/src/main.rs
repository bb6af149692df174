//! dentchat: interactive terminal chat against the relay.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use dentchat_client::{ChatConfig, ChatSession, Message, MessageKind, RelayClient, run_turn};

#[derive(Parser)]
#[command(name = "dentchat", version, about)]
struct Args {
    /// Base URL of the relay endpoint.
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    relay_url: String,

    /// Read the system prompt from a file instead of the built-in one.
    #[arg(long)]
    system_prompt: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();

    let mut config = ChatConfig::default();
    if let Some(path) = &args.system_prompt {
        config.system_prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading system prompt from {}", path.display()))?;
    }

    let relay = RelayClient::new(&args.relay_url, &config.system_prompt);
    let mut session = ChatSession::new(&config);

    if let Some(greeting) = session.messages().first() {
        print_message(greeting);
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };

        session.set_draft(line);
        // The await here is the whole turn; the prompt is not shown again
        // until the submission settles, so no second request can start.
        if run_turn(&mut session, &relay).await
            && let Some(reply) = session.messages().last()
        {
            print_message(reply);
        }
    }

    Ok(())
}

fn print_message(message: &Message) {
    let tag = match message.kind {
        MessageKind::User => "you",
        MessageKind::Bot => "bot",
        MessageKind::Error => "error",
    };
    println!("[{tag}] {}", message.content);
}
