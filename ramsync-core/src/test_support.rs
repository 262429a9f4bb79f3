//! Test doubles for the pipeline seams.
//!
//! [`StaticPageSource`] serves canned pages without any network access and
//! [`MemoryRowStore`] enforces primary and foreign keys in memory so load
//! ordering can be exercised without a database. The [`fixtures`] module
//! builds raw records shaped like the upstream API.

use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

use crate::{
    EndpointKind, FetchError, LoadError, Page, PageSource, RawRecord, RowStore, Table, TableRow,
};

/// Base URL used by [`StaticPageSource`] unless overridden.
pub const STUB_BASE_URL: &str = "https://rickandmortyapi.test/api";

/// In-memory [`PageSource`] keyed by page URL.
///
/// Unknown URLs answer with an HTTP 404 [`FetchError`].
///
/// # Examples
///
/// ```
/// use ramsync_core::test_support::StaticPageSource;
/// use ramsync_core::{EndpointKind, fetch_all};
/// use serde_json::json;
///
/// let records = vec![json!({ "id": 1 }), json!({ "id": 2 }), json!({ "id": 3 })];
/// let source = StaticPageSource::default().paginate(EndpointKind::Episode, records, 2);
///
/// let fetched = fetch_all(&source, EndpointKind::Episode)?;
/// assert_eq!(fetched.len(), 3);
/// assert_eq!(source.requests().len(), 2);
/// # Ok::<(), ramsync_core::FetchError>(())
/// ```
#[derive(Debug)]
pub struct StaticPageSource {
    base_url: String,
    pages: HashMap<String, Result<Page, FetchError>>,
    requests: RefCell<Vec<String>>,
}

impl Default for StaticPageSource {
    fn default() -> Self {
        Self::new(STUB_BASE_URL)
    }
}

impl StaticPageSource {
    /// Create an empty source rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            pages: HashMap::new(),
            requests: RefCell::new(Vec::new()),
        }
    }

    /// Serve `page` at `url`.
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: Page) -> Self {
        self.pages.insert(url.into(), Ok(page));
        self
    }

    /// Answer requests for `url` with `error`.
    #[must_use]
    pub fn with_error(mut self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages.insert(url.into(), Err(error));
        self
    }

    /// Split `records` into pages of `page_size` linked through `next`.
    ///
    /// The first page lives at [`PageSource::first_page_url`]; later pages at
    /// `?page=N` like the upstream API. An empty record list still yields one
    /// empty page. A `page_size` of zero is treated as one.
    #[must_use]
    pub fn paginate(mut self, kind: EndpointKind, records: Vec<RawRecord>, page_size: usize) -> Self {
        let first = self.first_page_url(kind);
        let total = u64::try_from(records.len()).unwrap_or(u64::MAX);
        let mut chunks: Vec<Vec<RawRecord>> = records
            .chunks(page_size.max(1))
            .map(<[RawRecord]>::to_vec)
            .collect();
        if chunks.is_empty() {
            chunks.push(Vec::new());
        }
        let page_count = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            let url = if index == 0 {
                first.clone()
            } else {
                format!("{first}?page={}", index + 1)
            };
            let next = (index + 1 < page_count).then(|| format!("{first}?page={}", index + 2));
            self.pages
                .insert(url, Ok(Page::new(chunk, next).with_total(total)));
        }
        self
    }

    /// URLs requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl PageSource for StaticPageSource {
    fn first_page_url(&self, kind: EndpointKind) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), kind.path())
    }

    fn fetch_page(&self, url: &str) -> Result<Page, FetchError> {
        self.requests.borrow_mut().push(url.to_owned());
        self.pages.get(url).cloned().unwrap_or_else(|| {
            Err(FetchError::Http {
                url: url.to_owned(),
                status: 404,
                message: "no stubbed page".to_owned(),
            })
        })
    }
}

/// In-memory [`RowStore`] that checks primary and foreign keys.
///
/// Batches are validated in full before anything is recorded, mirroring the
/// all-or-nothing behaviour of a transactional store.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    ids: HashMap<Table, HashSet<i64>>,
    loads: Vec<(Table, usize)>,
    failing: Option<Table>,
}

impl MemoryRowStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every batch targeting `table` with a storage error.
    #[must_use]
    pub fn failing_on(mut self, table: Table) -> Self {
        self.failing = Some(table);
        self
    }

    /// Committed batches as `(table, row count)`, in commit order.
    #[must_use]
    pub fn loads(&self) -> &[(Table, usize)] {
        &self.loads
    }

    /// Number of rows committed to `table`.
    #[must_use]
    pub fn row_count(&self, table: Table) -> usize {
        self.ids.get(&table).map_or(0, HashSet::len)
    }

    /// Whether a row with `id` has been committed to `table`.
    #[must_use]
    pub fn contains(&self, table: Table, id: i64) -> bool {
        self.ids.get(&table).is_some_and(|ids| ids.contains(&id))
    }

    fn validate<R: TableRow>(&self, rows: &[R]) -> Result<HashSet<i64>, LoadError> {
        let table = R::TABLE;
        let mut batch = HashSet::new();
        for row in rows {
            if self.contains(table, row.id()) || !batch.insert(row.id()) {
                return Err(LoadError::ConstraintViolation {
                    table,
                    message: format!("duplicate primary key {}", row.id()),
                });
            }
            if let Some((parent, id)) = row
                .references()
                .into_iter()
                .find(|(parent, id)| !self.contains(*parent, *id))
            {
                return Err(LoadError::ConstraintViolation {
                    table,
                    message: format!("row {} references missing {parent} id {id}", row.id()),
                });
            }
        }
        Ok(batch)
    }
}

impl RowStore for MemoryRowStore {
    fn load<R: TableRow>(&mut self, rows: &[R]) -> Result<usize, LoadError> {
        if self.failing == Some(R::TABLE) {
            return Err(LoadError::Storage {
                table: R::TABLE,
                operation: "insert rows",
                message: "injected failure".to_owned(),
            });
        }
        if rows.is_empty() {
            return Ok(0);
        }
        let batch = self.validate(rows)?;
        self.ids.entry(R::TABLE).or_default().extend(batch);
        self.loads.push((R::TABLE, rows.len()));
        Ok(rows.len())
    }
}

/// Builders for raw records shaped like the upstream API.
pub mod fixtures {
    use serde_json::{Value, json};

    const API: &str = "https://rickandmortyapi.com/api";

    /// A raw episode with the given character URLs.
    #[must_use]
    pub fn episode_json(id: i64, characters: &[&str]) -> Value {
        json!({
            "id": id,
            "name": format!("Episode {id}"),
            "air_date": "December 2, 2013",
            "episode": format!("S01E{id:02}"),
            "characters": characters,
            "url": format!("{API}/episode/{id}"),
            "created": "2017-11-10T12:56:33.798Z"
        })
    }

    /// A raw location with the given type and dimension.
    #[must_use]
    pub fn location_json(id: i64, kind: &str, dimension: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Location {id}"),
            "type": kind,
            "dimension": dimension,
            "residents": [],
            "url": format!("{API}/location/{id}"),
            "created": "2017-11-10T12:42:04.162Z"
        })
    }

    /// A raw character with the given origin and location URLs.
    #[must_use]
    pub fn character_json(id: i64, origin_url: &str, location_url: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Character {id}"),
            "status": "Alive",
            "species": "Human",
            "type": "",
            "gender": "Male",
            "origin": { "name": "origin", "url": origin_url },
            "location": { "name": "location", "url": location_url },
            "image": format!("{API}/character/avatar/{id}.jpeg"),
            "episode": [],
            "url": format!("{API}/character/{id}"),
            "created": "2017-11-04T18:48:46.250Z"
        })
    }

    /// URL of the character with `id`.
    #[must_use]
    pub fn character_url(id: i64) -> String {
        format!("{API}/character/{id}")
    }

    /// URL of the location with `id`.
    #[must_use]
    pub fn location_url(id: i64) -> String {
        format!("{API}/location/{id}")
    }
}
