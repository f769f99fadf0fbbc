mod input;

use std::sync::Arc;

use clap::Parser;
use cricket_assistant::llm::{GeminiClient, GeminiConfig, LlmError};
use cricket_assistant::services::assistant::AssistantGateway;
use cricket_assistant::services::conversation::{ConversationSession, TurnHandle};
use cricket_assistant::state::{ConversationEvent, Message, QUICK_SUGGESTIONS, Sender};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing::{debug, info};

use input::{Input, parse_line};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("stdin read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("LLM client setup failed: {0}")]
    Llm(#[from] LlmError),
}

#[derive(Parser, Debug)]
#[command(name = "cricket-assistant", about = "Chat with the cricket expert assistant")]
struct Cli {
    /// Gemini model name; overrides `GEMINI_MODEL`.
    #[arg(long)]
    model: Option<String>,

    /// API base URL; overrides `GEMINI_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let mut config = GeminiConfig::from_env();
    if let Some(model) = cli.model {
        config = config.with_model(model);
    }
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url);
    }

    let client = GeminiClient::new(config)?;
    info!(model = client.model(), "Gemini client initialized");

    let session = ConversationSession::new(AssistantGateway::new(Arc::new(client)));
    for message in session.messages() {
        print_message(&message);
    }
    println!("(type a question, /suggest for ideas, /quit to leave)");

    let render = tokio::spawn(render_events(session.subscribe()));

    let mut last_turn: Option<TurnHandle> = None;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut quit = false;
    while let Some(line) = lines.next_line().await? {
        let submitted = match parse_line(&line) {
            Input::Quit => {
                quit = true;
                break;
            }
            Input::Suggestions => {
                print_suggestions();
                continue;
            }
            Input::Pick(index) => {
                match session.select_suggestion(index) {
                    Some(text) => println!("draft: {text} (press Enter to send)"),
                    None => println!("no suggestion #{}", index + 1),
                }
                continue;
            }
            Input::Unknown(command) => {
                println!("unknown command: {command}");
                continue;
            }
            Input::SendDraft => session.submit_draft(),
            Input::Send(text) => session.try_submit(&text),
        };
        match submitted {
            Ok(handle) => last_turn = Some(handle),
            Err(reason) => debug!(%reason, "input ignored"),
        }
    }

    // End of input lets the last turn finish; an explicit quit does not.
    if !quit {
        if let Some(handle) = last_turn {
            handle.settled().await;
        }
    }
    session.close();
    let _ = render.await;
    Ok(())
}

async fn render_events(mut events: broadcast::Receiver<ConversationEvent>) {
    loop {
        match events.recv().await {
            Ok(ConversationEvent::MessageAppended(message)) => {
                if message.sender() == Sender::Assistant {
                    print_message(&message);
                }
            }
            Ok(ConversationEvent::PendingChanged(true)) => println!("assistant is typing..."),
            Ok(ConversationEvent::PendingChanged(false)) => {}
            Ok(ConversationEvent::Closed) | Err(broadcast::error::RecvError::Closed) => break,
            Err(broadcast::error::RecvError::Lagged(skipped)) => debug!(skipped, "renderer lagged"),
        }
    }
}

fn print_message(message: &Message) {
    let who = match message.sender() {
        Sender::User => "you",
        Sender::Assistant => "assistant",
    };
    println!("[{}] {who}: {}", message.display_time(), message.text());
}

fn print_suggestions() {
    println!("Quick questions:");
    for (i, suggestion) in QUICK_SUGGESTIONS.iter().enumerate() {
        println!("  /pick {}  {suggestion}", i + 1);
    }
}
