//! Chat commands.

use clap::Subcommand;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use dialoguer::Confirm;
use serde_json::json;

use ub_core::error::{UbError, UbResult};
use ub_services::chat::ChatOpened;
use ub_services::AppContext;

use crate::OutputFormat;

#[derive(Subcommand)]
pub enum ChatsAction {
    /// List the chats of the signed-in user.
    List {
        /// List another user's chats instead.
        #[arg(short, long)]
        user: Option<String>,
    },
    /// Open the chat with a station, creating it if needed.
    Open {
        /// Station account to chat with.
        receiver: String,
    },
    /// Delete a chat.
    Delete {
        /// Chat id.
        chat_id: String,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },
}

pub async fn run(ctx: &AppContext, action: ChatsAction, format: OutputFormat) -> UbResult<()> {
    match action {
        ChatsAction::List { user } => {
            let username = match user {
                Some(u) => u,
                None => ctx.session.require("listing chats")?,
            };

            let view = ctx.chats.load_chats(&username).await;
            if let Some(error) = &view.error {
                return Err(UbError::Internal(error.clone()));
            }

            match format {
                OutputFormat::Json => {
                    let chats: Vec<_> = view
                        .chats
                        .iter()
                        .map(|c| {
                            json!({
                                "id": c.id,
                                "users": c.users,
                                "with": c.counterpart(&username),
                            })
                        })
                        .collect();
                    super::print_json(&json!(chats));
                }
                OutputFormat::Text => {
                    if view.chats.is_empty() {
                        println!("No chats found.");
                        return Ok(());
                    }

                    let mut table = Table::new();
                    table
                        .load_preset(UTF8_FULL)
                        .apply_modifier(UTF8_ROUND_CORNERS)
                        .set_content_arrangement(ContentArrangement::Dynamic);
                    table.set_header(vec!["Chat", "With"]);

                    for c in &view.chats {
                        let with = match c.counterpart(&username) {
                            Some(other) => other.to_string(),
                            None => style(format!("malformed: {}", c.users.join(", ")))
                                .yellow()
                                .to_string(),
                        };
                        table.add_row(vec![c.id.clone(), with]);
                    }

                    println!("{table}");
                    println!("\n{} chat(s)", view.chats.len());
                }
            }
        }
        ChatsAction::Open { receiver } => {
            let sender = ctx.session.require("opening a chat")?;
            let opened = ctx.chats.open_chat(&sender, &receiver).await?;

            match format {
                OutputFormat::Json => super::print_json(&json!({
                    "sender": sender,
                    "receiver": receiver,
                    "created": opened.was_created(),
                })),
                OutputFormat::Text => match opened {
                    ChatOpened::Created(_) => println!(
                        "  {} Created chat with {receiver}",
                        style("OK").green().bold()
                    ),
                    ChatOpened::AlreadyExisted => println!(
                        "  {} Chat with {receiver} already exists",
                        style("OK").green().bold()
                    ),
                },
            }
        }
        ChatsAction::Delete { chat_id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete chat {chat_id}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| UbError::Internal(e.to_string()))?;
                if !confirmed {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let message = ctx.chats.delete_chat(&chat_id).await?;
            match format {
                OutputFormat::Json => super::print_json(&json!({
                    "deleted": chat_id,
                    "message": message,
                })),
                OutputFormat::Text => {
                    println!("  {} Deleted chat {chat_id}", style("OK").green().bold())
                }
            }
        }
    }
    Ok(())
}
