//! Continuation-cursor pagination.
//!
//! Both remote APIs hand back one page at a time plus a cursor for the next
//! page. [`Pages`] turns a page-fetching closure into a lazy iterator that
//! stops at the first page without a cursor, or right after the first error.
//! It cannot be restarted; callers that need a full snapshot use
//! [`Pages::exhaust`].

/// One page of results and the cursor for the page after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T, C> {
    pub items: Vec<T>,
    pub next: Option<C>,
}

impl<T, C> Page<T, C> {
    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self { items, next: None }
    }
}

/// Lazy iterator over pages produced by `fetch`.
///
/// `fetch` receives `None` for the first page and the previous page's cursor
/// afterwards.
pub struct Pages<T, C, E, F>
where
    F: FnMut(Option<&C>) -> Result<Page<T, C>, E>,
{
    fetch: F,
    cursor: Option<C>,
    done: bool,
    fetched: usize,
}

impl<T, C, E, F> Pages<T, C, E, F>
where
    F: FnMut(Option<&C>) -> Result<Page<T, C>, E>,
{
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: None,
            done: false,
            fetched: 0,
        }
    }

    /// Number of pages fetched so far.
    pub fn pages_fetched(&self) -> usize {
        self.fetched
    }

    /// Drain every page into one vector, failing on the first error.
    pub fn exhaust(self) -> Result<Vec<T>, E> {
        let mut all = Vec::new();
        for page in self {
            all.extend(page?);
        }
        Ok(all)
    }
}

impl<T, C, E, F> Iterator for Pages<T, C, E, F>
where
    F: FnMut(Option<&C>) -> Result<Page<T, C>, E>,
{
    type Item = Result<Vec<T>, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match (self.fetch)(self.cursor.as_ref()) {
            Ok(page) => {
                self.fetched += 1;
                self.cursor = page.next;
                if self.cursor.is_none() {
                    self.done = true;
                }
                Some(Ok(page.items))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// Treat an absent or empty continuation token as "no more pages".
pub fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_cursor_until_exhausted() {
        let pages = Pages::new(|cursor: Option<&String>| -> Result<Page<u32, String>, ()> {
            Ok(match cursor.map(String::as_str) {
                None => Page { items: vec![1, 2], next: Some("b".to_string()) },
                Some("b") => Page { items: vec![3], next: Some("c".to_string()) },
                Some(_) => Page::last(vec![4]),
            })
        });
        assert_eq!(pages.exhaust(), Ok(vec![1, 2, 3, 4]));
    }

    #[test]
    fn stops_after_first_error() {
        let mut calls = 0;
        let mut pages = Pages::new(|cursor: Option<&u32>| {
            calls += 1;
            match cursor {
                None => Ok(Page { items: vec!["a"], next: Some(1) }),
                Some(_) => Err("boom"),
            }
        });
        assert_eq!(pages.next(), Some(Ok(vec!["a"])));
        assert_eq!(pages.next(), Some(Err("boom")));
        assert_eq!(pages.next(), None);
        assert_eq!(pages.pages_fetched(), 1);
        drop(pages);
        assert_eq!(calls, 2);
    }

    #[test]
    fn empty_token_ends_pagination() {
        assert_eq!(next_token(Some(String::new())), None);
        assert_eq!(next_token(None), None);
        assert_eq!(next_token(Some("p2".into())), Some("p2".to_string()));
    }
}
