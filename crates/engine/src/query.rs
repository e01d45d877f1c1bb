//! Query results and the query manager seam
//!
//! ## QueryResult
//!
//! A `QueryResult` stores one ordered node sequence, captured when the result
//! is built. [`QueryResult::nodes`] and [`QueryResult::rows`] derive a fresh
//! iterator over that same sequence on every call, so both views can be
//! iterated any number of times and always agree on order.
//!
//! ## Query managers
//!
//! [`QueryManager`] is the seam application code queries through.
//! [`StaticQueryManager`] answers statements with results registered up front
//! by the test; unknown statements yield an empty result.

use crate::node::Node;
use jcrmock_core::error::{ensure, ensure_not_blank};
use jcrmock_core::{Error, Result, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// JCR-SQL2 query language
pub const JCR_SQL2: &str = "JCR-SQL2";
/// JCR-JQOM query language
pub const JCR_JQOM: &str = "JCR-JQOM";
/// XPath query language
pub const XPATH: &str = "xpath";
/// Legacy SQL query language
pub const SQL: &str = "sql";

/// Pseudo-column holding the path of the row's node
pub const PATH_COLUMN: &str = "jcr:path";
/// Pseudo-column holding the row's score
pub const SCORE_COLUMN: &str = "jcr:score";

#[derive(Debug, Clone)]
struct ResultEntry {
    node: Node,
    score: f64,
}

// =============================================================================
// QueryResult
// =============================================================================

/// Immutable ordered node sequence with node and row views
#[derive(Debug, Clone)]
pub struct QueryResult {
    entries: Arc<Vec<ResultEntry>>,
    columns: Arc<Vec<String>>,
}

impl QueryResult {
    /// Result over `nodes`, every row scoring 0.0
    pub fn new(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self::with_scores(nodes.into_iter().map(|node| (node, 0.0)))
    }

    /// Result over `(node, score)` pairs
    pub fn with_scores(entries: impl IntoIterator<Item = (Node, f64)>) -> Self {
        Self {
            entries: Arc::new(
                entries
                    .into_iter()
                    .map(|(node, score)| ResultEntry { node, score })
                    .collect(),
            ),
            columns: Arc::new(vec![PATH_COLUMN.to_string(), SCORE_COLUMN.to_string()]),
        }
    }

    /// Replace the column names (defaults to `jcr:path` and `jcr:score`)
    pub fn with_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = Arc::new(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Column names, in row value order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.as_ref().clone()
    }

    /// Number of result nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the result is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh iterator over the result nodes
    pub fn nodes(&self) -> NodeIterator {
        NodeIterator {
            cursor: Cursor::new(Arc::clone(&self.entries)),
        }
    }

    /// Fresh iterator over one row per result node
    pub fn rows(&self) -> RowIterator {
        RowIterator {
            cursor: Cursor::new(Arc::clone(&self.entries)),
            columns: Arc::clone(&self.columns),
        }
    }

    /// Sub-result starting at `offset` with at most `limit` entries
    pub(crate) fn window(&self, offset: usize, limit: Option<usize>) -> QueryResult {
        let entries: Vec<ResultEntry> = self
            .entries
            .iter()
            .skip(offset)
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect();
        QueryResult {
            entries: Arc::new(entries),
            columns: Arc::clone(&self.columns),
        }
    }
}

impl Default for QueryResult {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

// =============================================================================
// Iterators
// =============================================================================

#[derive(Debug, Clone)]
struct Cursor {
    entries: Arc<Vec<ResultEntry>>,
    position: usize,
}

impl Cursor {
    fn new(entries: Arc<Vec<ResultEntry>>) -> Self {
        Self {
            entries,
            position: 0,
        }
    }

    fn advance(&mut self) -> Option<ResultEntry> {
        let entry = self.entries.get(self.position)?.clone();
        self.position += 1;
        Some(entry)
    }

    fn remaining(&self) -> usize {
        self.entries.len() - self.position
    }

    fn skip(&mut self, count: usize) -> Result<()> {
        ensure(count <= self.remaining(), || {
            format!(
                "cannot skip {count} items at position {} of {}",
                self.position,
                self.entries.len()
            )
        })?;
        self.position += count;
        Ok(())
    }
}

/// Iterator over the nodes of a [`QueryResult`]
#[derive(Debug, Clone)]
pub struct NodeIterator {
    cursor: Cursor,
}

impl NodeIterator {
    /// Total number of nodes, independent of the position
    pub fn size(&self) -> usize {
        self.cursor.entries.len()
    }

    /// Number of nodes already returned or skipped
    pub fn position(&self) -> usize {
        self.cursor.position
    }

    /// Skip `count` nodes
    ///
    /// # Errors
    ///
    /// Precondition error if fewer than `count` nodes remain.
    pub fn skip_items(&mut self, count: usize) -> Result<()> {
        self.cursor.skip(count)
    }
}

impl Iterator for NodeIterator {
    type Item = Node;

    fn next(&mut self) -> Option<Node> {
        self.cursor.advance().map(|entry| entry.node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for NodeIterator {}

/// Iterator over the rows of a [`QueryResult`]
#[derive(Debug, Clone)]
pub struct RowIterator {
    cursor: Cursor,
    columns: Arc<Vec<String>>,
}

impl RowIterator {
    /// Total number of rows, independent of the position
    pub fn size(&self) -> usize {
        self.cursor.entries.len()
    }

    /// Number of rows already returned or skipped
    pub fn position(&self) -> usize {
        self.cursor.position
    }

    /// Skip `count` rows
    ///
    /// # Errors
    ///
    /// Precondition error if fewer than `count` rows remain.
    pub fn skip_items(&mut self, count: usize) -> Result<()> {
        self.cursor.skip(count)
    }
}

impl Iterator for RowIterator {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let entry = self.cursor.advance()?;
        Some(Row {
            node: entry.node,
            score: entry.score,
            columns: Arc::clone(&self.columns),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.cursor.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowIterator {}

// =============================================================================
// Row
// =============================================================================

/// Row view over one result node
#[derive(Debug, Clone)]
pub struct Row {
    node: Node,
    score: f64,
    columns: Arc<Vec<String>>,
}

impl Row {
    /// The underlying node
    pub fn node(&self) -> Node {
        self.node.clone()
    }

    /// Node at a path relative to the row's node
    pub fn node_at(&self, rel_path: &str) -> Option<Node> {
        self.node.node(rel_path)
    }

    /// Value of `prop`, `child/prop`, `jcr:path` or `jcr:score`
    ///
    /// Multi-valued properties yield their first value.
    pub fn value(&self, rel_path: &str) -> Option<Value> {
        match rel_path {
            PATH_COLUMN => Some(Value::from(self.node.path())),
            SCORE_COLUMN => Some(Value::from(self.score)),
            _ => self.node.property(rel_path).map(|p| p.value()),
        }
    }

    /// One value per column, `None` where the column does not resolve
    pub fn values(&self) -> Vec<Option<Value>> {
        self.columns.iter().map(|c| self.value(c)).collect()
    }

    /// Path of the underlying node
    pub fn path(&self) -> String {
        self.node.path()
    }

    /// Path of the node at a relative path
    pub fn path_at(&self, rel_path: &str) -> Option<String> {
        self.node_at(rel_path).map(|n| n.path())
    }

    /// Score attached when the result was built (0.0 by default)
    pub fn score(&self) -> f64 {
        self.score
    }
}

// =============================================================================
// Query managers
// =============================================================================

/// Entry point for creating queries against a workspace
pub trait QueryManager: Send + Sync {
    /// Build a query for `statement` in `language`
    ///
    /// # Errors
    ///
    /// Precondition error for a blank statement or an unsupported language.
    fn create_query(&self, statement: &str, language: &str) -> Result<Query>;

    /// Languages accepted by [`QueryManager::create_query`]
    fn supported_query_languages(&self) -> Vec<String>;
}

/// A query bound to a canned result
#[derive(Debug, Clone)]
pub struct Query {
    statement: String,
    language: String,
    result: QueryResult,
    limit: Option<usize>,
    offset: usize,
}

impl Query {
    /// Query answering with `result`
    pub fn new(statement: &str, language: &str, result: QueryResult) -> Self {
        Self {
            statement: statement.to_string(),
            language: language.to_string(),
            result,
            limit: None,
            offset: 0,
        }
    }

    /// Query statement
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Query language
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Cap the number of returned nodes
    pub fn set_limit(&mut self, limit: usize) {
        self.limit = Some(limit);
    }

    /// Skip the first `offset` nodes
    pub fn set_offset(&mut self, offset: usize) {
        self.offset = offset;
    }

    /// Result with offset and limit applied
    pub fn execute(&self) -> Result<QueryResult> {
        debug!(
            target: "jcrmock::query",
            language = %self.language,
            statement = %self.statement,
            offset = self.offset,
            limit = ?self.limit,
            "Executing query"
        );
        Ok(self.result.window(self.offset, self.limit))
    }
}

/// Query manager answering from results registered per `(language, statement)`
pub struct StaticQueryManager {
    languages: Vec<String>,
    results: RwLock<HashMap<(String, String), QueryResult>>,
}

impl StaticQueryManager {
    /// Manager accepting JCR-SQL2, JCR-JQOM, xpath and sql
    pub fn new() -> Self {
        Self::with_languages([JCR_SQL2, JCR_JQOM, XPATH, SQL])
    }

    /// Manager accepting only the given languages
    pub fn with_languages<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            languages: languages.into_iter().map(Into::into).collect(),
            results: RwLock::new(HashMap::new()),
        }
    }

    /// Register the result returned for a statement, replacing an earlier one
    ///
    /// # Errors
    ///
    /// Precondition error for a blank statement or an unsupported language.
    pub fn register(&self, language: &str, statement: &str, result: QueryResult) -> Result<()> {
        self.check(statement, language)?;
        self.results
            .write()
            .insert((language.to_string(), statement.to_string()), result);
        Ok(())
    }

    fn check(&self, statement: &str, language: &str) -> Result<()> {
        ensure_not_blank(statement, "query statement")?;
        if self.languages.iter().any(|l| l == language) {
            Ok(())
        } else {
            Err(Error::precondition(format!(
                "unsupported query language '{language}'"
            )))
        }
    }
}

impl Default for StaticQueryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryManager for StaticQueryManager {
    fn create_query(&self, statement: &str, language: &str) -> Result<Query> {
        self.check(statement, language)?;
        let result = self
            .results
            .read()
            .get(&(language.to_string(), statement.to_string()))
            .cloned();
        if result.is_none() {
            debug!(target: "jcrmock::query", language, statement, "No result registered");
        }
        Ok(Query::new(statement, language, result.unwrap_or_default()))
    }

    fn supported_query_languages(&self) -> Vec<String> {
        self.languages.clone()
    }
}

impl fmt::Debug for StaticQueryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticQueryManager")
            .field("languages", &self.languages)
            .field("registered", &self.results.read().len())
            .finish()
    }
}
