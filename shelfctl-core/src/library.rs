//! Library operations.
//!
//! One function per query, each forwarding to a single backend call. Stock
//! bookkeeping, overdue detection and borrow counts are computed by the
//! database's procedures and views; nothing here second-guesses them.

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::error::{Entity, Result, ShelfError};
use crate::rest::{quote_filter_value, RestClient, Row, Transport};

pub const MEMBERS: &str = "members";
pub const BOOKS: &str = "books";
pub const BORROW_RECORDS: &str = "borrow_records";

pub const MOST_BORROWED_VIEW: &str = "most_borrowed_books";
pub const OVERDUE_VIEW: &str = "overdue_members";
pub const BORROW_COUNT_VIEW: &str = "borrowed_count_per_member";

pub const BORROW_RPC: &str = "borrow_book";
pub const RETURN_RPC: &str = "return_book";

/// Columns matched by [`Library::search_books`]
pub const SEARCH_COLUMNS: [&str; 3] = ["title", "author", "category"];

/// Result of a borrow/return procedure call
#[derive(Debug, Clone, PartialEq)]
pub enum RpcOutcome {
    /// The procedure returned something
    Completed(Value),
    /// The procedure returned an empty result (no stock, unknown ids,
    /// nothing to return)
    Rejected,
}

impl RpcOutcome {
    fn from_value(value: Value) -> Self {
        if is_empty_result(&value) {
            RpcOutcome::Rejected
        } else {
            RpcOutcome::Completed(value)
        }
    }
}

/// `null`, `false`, zero, and empty strings/arrays/objects carry no result
pub fn is_empty_result(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// The three reporting views, fetched together
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub most_borrowed: Vec<Row>,
    pub overdue_members: Vec<Row>,
    pub borrow_counts: Vec<Row>,
}

/// Query wrappers over one long-lived client
pub struct Library<T> {
    client: RestClient<T>,
}

impl<T: Transport> Library<T> {
    pub fn new(transport: T) -> Self {
        Self {
            client: RestClient::new(transport),
        }
    }

    pub fn client(&self) -> &RestClient<T> {
        &self.client
    }

    // ========================================================================
    // Registration
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn add_member(&self, name: &str, email: &str) -> Result<Vec<Row>> {
        self.client
            .table(MEMBERS)
            .insert(json!({ "name": name, "email": email }))
            .await
    }

    #[instrument(skip(self))]
    pub async fn add_book(
        &self,
        title: &str,
        author: &str,
        category: &str,
        stock: i64,
    ) -> Result<Vec<Row>> {
        self.client
            .table(BOOKS)
            .insert(json!({
                "title": title,
                "author": author,
                "category": category,
                "stock": stock,
            }))
            .await
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    /// All books, by title
    #[instrument(skip(self))]
    pub async fn list_books(&self) -> Result<Vec<Row>> {
        self.client
            .table(BOOKS)
            .select("*")
            .order("title", true)
            .fetch()
            .await
    }

    /// Case-insensitive substring match on title, author, or category
    #[instrument(skip(self))]
    pub async fn search_books(&self, query: &str) -> Result<Vec<Row>> {
        self.client
            .table(BOOKS)
            .select("*")
            .or(&search_filter(query))
            .fetch()
            .await
    }

    /// Member row with its borrow records embedded
    #[instrument(skip(self))]
    pub async fn show_member(&self, member_id: i64) -> Result<Vec<Row>> {
        self.client
            .table(MEMBERS)
            .select("*, borrow_records(*)")
            .eq("member_id", member_id)
            .fetch()
            .await
    }

    // ========================================================================
    // Updates
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn update_book_stock(&self, book_id: i64, new_stock: i64) -> Result<Vec<Row>> {
        self.client
            .table(BOOKS)
            .eq("book_id", book_id)
            .update(json!({ "stock": new_stock }))
            .await
    }

    #[instrument(skip(self))]
    pub async fn update_member_email(&self, member_id: i64, new_email: &str) -> Result<Vec<Row>> {
        self.client
            .table(MEMBERS)
            .eq("member_id", member_id)
            .update(json!({ "email": new_email }))
            .await
    }

    // ========================================================================
    // Deletes (guarded by an outstanding-borrow check)
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn delete_member(&self, member_id: i64) -> Result<Vec<Row>> {
        self.ensure_nothing_outstanding(Entity::Member, "member_id", member_id)
            .await?;
        self.client
            .table(MEMBERS)
            .eq("member_id", member_id)
            .delete()
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_book(&self, book_id: i64) -> Result<Vec<Row>> {
        self.ensure_nothing_outstanding(Entity::Book, "book_id", book_id)
            .await?;
        self.client
            .table(BOOKS)
            .eq("book_id", book_id)
            .delete()
            .await
    }

    async fn ensure_nothing_outstanding(&self, entity: Entity, column: &str, id: i64) -> Result<()> {
        let outstanding = self
            .client
            .table(BORROW_RECORDS)
            .select("*")
            .eq(column, id)
            .is_null("return_date")
            .fetch()
            .await?;
        if !outstanding.is_empty() {
            debug!(?entity, id, count = outstanding.len(), "delete refused");
            return Err(ShelfError::OutstandingBorrows { entity, id });
        }
        Ok(())
    }

    // ========================================================================
    // Circulation (remote procedures)
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn borrow_book(&self, member_id: i64, book_id: i64) -> Result<RpcOutcome> {
        let value = self
            .client
            .rpc(BORROW_RPC, circulation_args(member_id, book_id))
            .await?;
        let outcome = RpcOutcome::from_value(value);
        debug!(rejected = outcome == RpcOutcome::Rejected, "borrow processed");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    pub async fn return_book(&self, member_id: i64, book_id: i64) -> Result<RpcOutcome> {
        let value = self
            .client
            .rpc(RETURN_RPC, circulation_args(member_id, book_id))
            .await?;
        let outcome = RpcOutcome::from_value(value);
        debug!(rejected = outcome == RpcOutcome::Rejected, "return processed");
        Ok(outcome)
    }

    // ========================================================================
    // Reports
    // ========================================================================

    #[instrument(skip(self))]
    pub async fn top_most_borrowed(&self, limit: usize) -> Result<Vec<Row>> {
        self.client
            .table(MOST_BORROWED_VIEW)
            .select("*")
            .limit(limit)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    pub async fn list_overdue_members(&self) -> Result<Vec<Row>> {
        self.client.table(OVERDUE_VIEW).select("*").fetch().await
    }

    #[instrument(skip(self))]
    pub async fn count_borrowed_per_member(&self) -> Result<Vec<Row>> {
        self.client.table(BORROW_COUNT_VIEW).select("*").fetch().await
    }

    /// All three reports, fetched one after another
    pub async fn report(&self, top_limit: usize) -> Result<Report> {
        Ok(Report {
            most_borrowed: self.top_most_borrowed(top_limit).await?,
            overdue_members: self.list_overdue_members().await?,
            borrow_counts: self.count_borrowed_per_member().await?,
        })
    }
}

fn circulation_args(member_id: i64, book_id: i64) -> Value {
    json!({ "p_member_id": member_id, "p_book_id": book_id })
}

/// `or` conditions for a substring search across [`SEARCH_COLUMNS`]
pub fn search_filter(query: &str) -> String {
    let pattern = quote_filter_value(&format!("*{}*", query));
    SEARCH_COLUMNS
        .iter()
        .map(|column| format!("{}.ilike.{}", column, pattern))
        .collect::<Vec<_>>()
        .join(",")
}
