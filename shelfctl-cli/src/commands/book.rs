//! Book commands - add, list, search, restock, delete

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelfctl_core::Transport;

use super::Session;

#[derive(Parser, Debug)]
pub struct BookArgs {
    #[command(subcommand)]
    pub command: BookCommands,
}

#[derive(Subcommand, Debug)]
pub enum BookCommands {
    /// Add a book to the catalogue
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        category: String,
        /// Copies on the shelf
        #[arg(long, default_value = "1")]
        stock: i64,
    },
    /// List every book, ordered by title
    List,
    /// Search title, author and category (case-insensitive substring)
    Search {
        /// Text to look for
        query: String,
    },
    /// Set the stock count of a book
    Stock {
        /// Book ID
        id: i64,
        /// New number of copies
        stock: i64,
    },
    /// Delete a book (refused while a copy is borrowed)
    Delete {
        /// Book ID
        id: i64,
    },
}

pub async fn run_book<T: Transport, W: Write>(
    args: BookArgs,
    session: &Session<T>,
    out: &mut W,
) -> Result<()> {
    let lib = &session.library;
    let rows = match args.command {
        BookCommands::Add {
            title,
            author,
            category,
            stock,
        } => session.progress.wrap(
            "Adding book...",
            lib.add_book(title.trim(), author.trim(), category.trim(), stock),
        )
        .await
        .context("failed to add book")?,
        BookCommands::List => session
            .progress
            .wrap("Fetching books...", lib.list_books())
            .await
            .context("failed to list books")?,
        BookCommands::Search { query } => {
            session
                .progress
                .wrap("Searching...", lib.search_books(query.trim()))
                .await
                .with_context(|| format!("failed to search books for '{}'", query))?
        }
        BookCommands::Stock { id, stock } => {
            session
                .progress
                .wrap("Updating stock...", lib.update_book_stock(id, stock))
                .await
                .with_context(|| format!("failed to update stock of book {}", id))?
        }
        BookCommands::Delete { id } => {
            session
                .progress
                .wrap("Deleting book...", lib.delete_book(id))
                .await
                .with_context(|| format!("failed to delete book {}", id))?
        }
    };
    session.print_rows(out, &rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{session, stdout_of};
    use crate::output::OutputFormat;
    use serde_json::{json, Value};
    use shelfctl_core::Method;

    #[tokio::test]
    async fn test_list_json_output() {
        let session = session(OutputFormat::Json);
        session
            .library
            .client()
            .transport()
            .respond(json!([{"book_id": 1, "title": "Dune"}]));

        let mut out = Vec::new();
        run_book(BookArgs { command: BookCommands::List }, &session, &mut out)
            .await
            .unwrap();

        let parsed: Value = serde_json::from_str(&stdout_of(out)).unwrap();
        assert_eq!(parsed, json!([{"book_id": 1, "title": "Dune"}]));
    }

    #[tokio::test]
    async fn test_stock_update_forwards_ids() {
        let session = session(OutputFormat::Lines);
        let mut out = Vec::new();
        let args = BookArgs {
            command: BookCommands::Stock { id: 3, stock: 0 },
        };
        run_book(args, &session, &mut out).await.unwrap();

        let req = &session.library.client().transport().requests()[0];
        assert_eq!(req.method, Method::Patch);
        assert_eq!(req.query_value("book_id"), Some("eq.3"));
        assert_eq!(req.body, Some(json!({"stock": 0})));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_search_trims_query() {
        let session = session(OutputFormat::Lines);
        let mut out = Vec::new();
        let args = BookArgs {
            command: BookCommands::Search {
                query: "  herbert ".into(),
            },
        };
        run_book(args, &session, &mut out).await.unwrap();

        let req = &session.library.client().transport().requests()[0];
        assert!(req.query_value("or").unwrap().contains("author.ilike.*herbert*"));
    }
}
