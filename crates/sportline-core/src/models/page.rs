use serde::{Deserialize, Serialize};

/// Pagination envelope returned by every list endpoint.
///
/// The server wraps list responses as
/// `{ "count": n, "next": url|null, "previous": url|null, "results": [...] }`.
/// Callers that only want the items can take `results`; `next`/`previous`
/// are full URLs for the adjacent pages when the result set is larger than
/// one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    /// Consume the envelope, keeping only the items.
    pub fn into_results(self) -> Vec<T> {
        self.results
    }
}
