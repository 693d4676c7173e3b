//! Minimal PostgREST query builder.
//!
//! Requests are plain values ([`RestRequest`]) handed to a [`Transport`], so
//! the wrappers in `library` can be checked against an in-memory transport
//! while production traffic goes through [`crate::http::HttpTransport`].
//!
//! ```text
//! client.table("books").select("*").order("title", true).fetch()
//!   → GET rest/v1/books?select=*&order=title.asc
//! ```

use std::fmt::Display;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{Result, ShelfError};

/// One row as returned by the backend, untouched
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// A single call against the REST API, relative to `rest/v1/`
#[derive(Debug, Clone, PartialEq)]
pub struct RestRequest {
    pub method: Method,
    /// Table, view, or `rpc/<function>`
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Ask the backend to echo affected rows (`Prefer: return=representation`)
    pub returning: bool,
}

impl RestRequest {
    /// First query value for `key`
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Executes requests against the backend
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the decoded JSON body (`null` for an empty body)
    async fn execute(&self, request: RestRequest) -> Result<Value>;
}

/// Long-lived handle over a transport
pub struct RestClient<T> {
    transport: T,
}

impl<T: Transport> RestClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Start a query on a table or view
    pub fn table(&self, name: &str) -> TableQuery<'_, T> {
        TableQuery {
            client: self,
            table: name.to_string(),
            select: None,
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    /// Invoke a remote procedure by name
    pub async fn rpc(&self, function: &str, args: Value) -> Result<Value> {
        self.transport
            .execute(RestRequest {
                method: Method::Post,
                path: format!("rpc/{}", function),
                query: Vec::new(),
                body: Some(args),
                returning: false,
            })
            .await
    }
}

/// Filters and modifiers for one table request
pub struct TableQuery<'a, T> {
    client: &'a RestClient<T>,
    table: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Option<String>,
    limit: Option<usize>,
}

impl<'a, T: Transport> TableQuery<'a, T> {
    /// Columns (and embedded resources) to return; defaults to `*`
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{}", value)));
        self
    }

    pub fn is_null(mut self, column: &str) -> Self {
        self.filters.push((column.to_string(), "is.null".to_string()));
        self
    }

    /// Match any of the comma-separated `column.op.value` conditions
    pub fn or(mut self, conditions: &str) -> Self {
        self.filters
            .push(("or".to_string(), format!("({})", conditions)));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let direction = if ascending { "asc" } else { "desc" };
        self.order = Some(format!("{}.{}", column, direction));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    /// GET matching rows
    pub async fn fetch(self) -> Result<Vec<Row>> {
        let mut query = vec![(
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        )];
        query.extend(self.filters.iter().cloned());
        if let Some(order) = &self.order {
            query.push(("order".to_string(), order.clone()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        self.send(Method::Get, query, None, false).await
    }

    /// POST a new row, returning what was stored
    pub async fn insert(self, row: Value) -> Result<Vec<Row>> {
        self.send(Method::Post, Vec::new(), Some(row), true).await
    }

    /// PATCH matching rows, returning them after the change
    pub async fn update(self, changes: Value) -> Result<Vec<Row>> {
        self.require_filter("update")?;
        let query = self.filters.clone();
        self.send(Method::Patch, query, Some(changes), true).await
    }

    /// DELETE matching rows, returning what was removed
    pub async fn delete(self) -> Result<Vec<Row>> {
        self.require_filter("delete")?;
        let query = self.filters.clone();
        self.send(Method::Delete, query, None, true).await
    }

    fn require_filter(&self, verb: &str) -> Result<()> {
        if self.filters.is_empty() {
            return Err(ShelfError::invalid_input(
                self.table.as_str(),
                format!("refusing to {} without a filter", verb),
            ));
        }
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        query: Vec<(String, String)>,
        body: Option<Value>,
        returning: bool,
    ) -> Result<Vec<Row>> {
        let value = self
            .client
            .transport
            .execute(RestRequest {
                method,
                path: self.table.clone(),
                query,
                body,
                returning,
            })
            .await?;
        into_rows(value, &self.table)
    }
}

/// Normalize a response body into rows: arrays pass through, a lone object
/// becomes one row, `null` becomes no rows
pub fn into_rows(value: Value, context: &str) -> Result<Vec<Row>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(row) => Ok(vec![row]),
        other => serde_json::from_value(other)
            .map_err(|e| ShelfError::json(format!("rows from {}", context), e)),
    }
}

/// Quote a filter value when it contains characters that are part of the
/// PostgREST filter grammar
pub fn quote_filter_value(value: &str) -> String {
    const RESERVED: &[char] = &[',', '.', '(', ')', ':', '"', '\\'];
    if !value.contains(RESERVED) {
        return value.to_string();
    }
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}
