use std::future::Future;

/// One page of a token-paginated listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// Fetches pages one after another until `limit` items are collected or the
/// backend stops handing out tokens. The result never exceeds `limit`.
pub async fn collect_pages<T, E, F, Fut>(limit: Option<usize>, mut fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut items = Vec::new();
    let mut token = None;
    loop {
        let page = fetch(token.take()).await?;
        items.extend(page.items);
        if limit.is_some_and(|l| items.len() >= l) {
            break;
        }
        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(next) => token = Some(next),
            None => break,
        }
    }
    if let Some(limit) = limit {
        items.truncate(limit);
    }
    Ok(items)
}
