//! Crawl tasks and their structural identity
//!
//! A task is one HTTP request the crawl intends to issue. Identity is
//! structural over (method, URL, canonicalized payload) so the visited set
//! can guarantee each distinct request is issued at most once per crawl.

/// HTTP method of a crawl task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Canonicalized form payload
///
/// Pairs are sorted on construction so two payloads with the same key/value
/// pairs in different order compare and hash identically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Payload(Vec<(String, String)>);

impl Payload {
    pub fn new(mut pairs: Vec<(String, String)>) -> Self {
        pairs.sort();
        Payload(pairs)
    }

    /// The canonical key/value pairs, in sorted order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for Payload {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Payload::new(iter.into_iter().collect())
    }
}

/// One pending HTTP request
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Task {
    pub method: Method,
    pub url: String,
    pub payload: Option<Payload>,
}

impl Task {
    pub fn get(url: impl Into<String>) -> Self {
        Task {
            method: Method::Get,
            url: url.into(),
            payload: None,
        }
    }

    pub fn post(url: impl Into<String>, pairs: Vec<(String, String)>) -> Self {
        let payload = if pairs.is_empty() {
            None
        } else {
            Some(Payload::new(pairs))
        };
        Task {
            method: Method::Post,
            url: url.into(),
            payload,
        }
    }
}
