//! Message commands.

use std::path::PathBuf;

use clap::Subcommand;
use console::style;
use serde_json::json;
use tokio::sync::broadcast::error::RecvError;

use ub_core::error::{UbError, UbResult};
use ub_live::{MessagesView, SubscriptionState};
use ub_models::{Message, MessagePosition};
use ub_services::event_bus::AppEvent;
use ub_services::AppContext;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum MessagesAction {
    /// Send a text message.
    Send {
        /// Chat id.
        chat_id: String,
        /// Message text.
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Send an image.
    SendImage {
        /// Chat id.
        chat_id: String,
        /// Image file.
        path: PathBuf,
    },
    /// Print a chat's messages as they arrive, until Ctrl-C.
    Watch {
        /// Chat id.
        chat_id: String,
    },
}

pub async fn run(ctx: &AppContext, action: MessagesAction, format: OutputFormat) -> UbResult<()> {
    let sender = ctx.session.require("using chats")?;

    match action {
        MessagesAction::Send { chat_id, text } => {
            let text = text.join(" ");
            let reply = ctx.messages.send_text(&chat_id, &sender, &text).await?;
            report_sent(&chat_id, &reply, format);
        }
        MessagesAction::SendImage { chat_id, path } => {
            let pb = super::spinner("Uploading image...");
            let result = ctx.messages.send_image(&chat_id, &sender, &path).await;
            pb.finish_and_clear();
            report_sent(&chat_id, &result?, format);
        }
        MessagesAction::Watch { chat_id } => watch(ctx, &chat_id, &sender, format).await?,
    }
    Ok(())
}

fn report_sent(chat_id: &str, reply: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => super::print_json(&json!({ "chat_id": chat_id, "message": reply })),
        OutputFormat::Text => println!("  {} Sent to {chat_id}", style("OK").green().bold()),
    }
}

async fn watch(ctx: &AppContext, chat_id: &str, me: &str, format: OutputFormat) -> UbResult<()> {
    let sync = ctx.message_sync();
    let mut views = sync.subscribe();
    let mut events = ctx.event_bus.subscribe();
    sync.load_messages(chat_id)?;

    if matches!(format, OutputFormat::Text) {
        println!(
            "{} {chat_id} (Ctrl-C to stop)",
            style("Watching chat").bold()
        );
    }

    let mut printed: Vec<String> = Vec::new();
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_new(&view, &mut printed, me, format);
                if view.state == SubscriptionState::Failed {
                    sync.close();
                    let error = view.error.unwrap_or_else(|| "subscription failed".into());
                    return Err(UbError::Subscription(error));
                }
            }
            event = events.recv() => match event {
                Ok(AppEvent::ChatDeleted { chat_id: deleted }) if deleted == chat_id => {
                    println!("Chat {chat_id} was deleted.");
                    break;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    sync.close();
    Ok(())
}

/// Print messages not printed yet. Snapshots replace the whole list, so
/// anything whose id was already shown is skipped.
fn print_new(view: &MessagesView, printed: &mut Vec<String>, me: &str, format: OutputFormat) {
    for msg in &view.messages {
        if printed.contains(&msg.id) {
            continue;
        }
        printed.push(msg.id.clone());
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Text => println!("{}", render(msg, me)),
        }
    }
}

fn render(msg: &Message, me: &str) -> String {
    let body = if msg.message_type.is_image() {
        format!("[image] {}", msg.data)
    } else {
        msg.data.clone()
    };
    let mine = msg.is_from(me) || (msg.sender.is_empty() && msg.position == MessagePosition::Right);
    let who = if mine {
        style("me".to_string()).green().bold()
    } else {
        style(msg.sender.clone()).cyan().bold()
    };
    format!("{} {who}: {body}", style(msg.timestamp.to_string()).dim())
}
