//! Member commands - register, show, update email, delete
//!
//! ```bash
//! shelfctl member add --name "Ada Lovelace" --email ada@example.com
//! shelfctl member show 12 --json | jq '.[0].borrow_records'
//! ```

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfctl_core::Transport;

use super::Session;

#[derive(Parser, Debug)]
pub struct MemberArgs {
    #[command(subcommand)]
    pub command: MemberCommands,
}

#[derive(Subcommand, Debug)]
pub enum MemberCommands {
    /// Register a new member
    Add {
        /// Full name
        #[arg(long)]
        name: String,
        /// Contact email address
        #[arg(long)]
        email: String,
    },
    /// Show a member with their borrow records
    Show {
        /// Member ID
        id: i64,
    },
    /// Change a member's email address
    Email {
        /// Member ID
        id: i64,
        /// New email address
        email: String,
    },
    /// Delete a member (refused while they have books out)
    Delete {
        /// Member ID
        id: i64,
    },
}

pub async fn run_member<T: Transport, W: Write>(
    args: MemberArgs,
    session: &Session<T>,
    out: &mut W,
) -> Result<()> {
    let lib = &session.library;
    let rows = match args.command {
        MemberCommands::Add { name, email } => {
            session
                .progress
                .wrap(
                    "Registering member...",
                    lib.add_member(name.trim(), email.trim()),
                )
                .await
                .context("failed to register member")?
        }
        MemberCommands::Show { id } => {
            session
                .progress
                .wrap("Fetching member...", lib.show_member(id))
                .await
                .with_context(|| format!("failed to fetch member {}", id))?
        }
        MemberCommands::Email { id, email } => {
            session
                .progress
                .wrap("Updating email...", lib.update_member_email(id, email.trim()))
                .await
                .with_context(|| format!("failed to update member {}", id))?
        }
        MemberCommands::Delete { id } => {
            session
                .progress
                .wrap("Deleting member...", lib.delete_member(id))
                .await
                .with_context(|| format!("failed to delete member {}", id))?
        }
    };
    session.print_rows(out, &rows)
}
