//! Cursor-following traversal over a paginated collection endpoint
//!
//! The traversal threads the continuation cursor of each response into the
//! next fetch and stops as soon as a response carries no cursor. A hard page
//! bound guarantees termination even against a source that keeps handing out
//! cursors. Each call to [`paginate`] starts a fresh traversal; there is no
//! mid-traversal resume.

use crate::error::{IngestError, Result};
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use std::future::Future;

/// An ordered batch of raw items plus the optional continuation cursor.
///
/// No cursor means the collection is exhausted; a present cursor means at
/// least one further fetch is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

struct Traversal<T> {
    cursor: Option<String>,
    buffered: VecDeque<T>,
    pages_fetched: u32,
    exhausted: bool,
}

/// Lazily yield every item of a paginated collection, in page order.
///
/// `fetch` is invoked once per page with the cursor extracted from the
/// previous response (`None` for the first page). A page without items does
/// not terminate the traversal as long as it still carries a cursor.
///
/// # Errors
///
/// Any fetch error ends the stream; fetching more than `max_pages` pages
/// yields [`IngestError::PageLimitExceeded`].
pub fn paginate<T, F, Fut>(
    endpoint: &'static str,
    fetch: F,
    max_pages: u32,
) -> impl Stream<Item = Result<T>>
where
    F: Fn(Option<String>) -> Fut + Clone,
    Fut: Future<Output = Result<Page<T>>>,
{
    let start = Traversal {
        cursor: None,
        buffered: VecDeque::new(),
        pages_fetched: 0,
        exhausted: false,
    };

    stream::try_unfold(start, move |mut traversal: Traversal<T>| {
        let fetch = fetch.clone();
        async move {
            loop {
                if let Some(item) = traversal.buffered.pop_front() {
                    return Ok(Some((item, traversal)));
                }

                if traversal.exhausted {
                    return Ok(None);
                }

                if traversal.pages_fetched >= max_pages {
                    return Err(IngestError::PageLimitExceeded {
                        endpoint,
                        limit: max_pages,
                    });
                }

                let page = fetch(traversal.cursor.take()).await?;
                traversal.pages_fetched += 1;
                traversal.exhausted = page.next_page_token.is_none();
                traversal.cursor = page.next_page_token;
                traversal.buffered.extend(page.items);
            }
        }
    })
}
