//! In-memory content source for tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde_json::json;

use super::{ContentSource, Document, Predicate, Query, SearchResponse};
use crate::error::{Error, Result};

pub const ENDPOINT: &str = "https://blog.cdn.prismic.io/api/v2";

/// Ref reported as the published content version
pub const MASTER_REF: &str = "master";

/// Evaluates queries against a fixed set of documents.
///
/// Documents listed under a preview ref replace published documents with
/// the same id when that ref is queried.
#[derive(Default)]
pub struct MemorySource {
    pub documents: Vec<Document>,
    pub previews: HashMap<String, Vec<Document>>,
    fail: AtomicBool,
    attempts: AtomicUsize,
    master_refs: AtomicUsize,
    cursors: Mutex<HashMap<String, (Query, usize)>>,
    searches: Mutex<Vec<Query>>,
    counter: AtomicUsize,
}

impl MemorySource {
    pub fn new(documents: Vec<Document>) -> Self {
        Self {
            documents,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        let source = Self::default();
        source.set_failing(true);
        source
    }

    /// Make every following call fail as an unreachable backend would
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, AtomicOrdering::SeqCst);
    }

    /// Backend calls made so far, failed ones included
    pub fn attempts(&self) -> usize {
        self.attempts.load(AtomicOrdering::SeqCst)
    }

    /// Times the master ref was resolved
    pub fn master_refs(&self) -> usize {
        self.master_refs.load(AtomicOrdering::SeqCst)
    }

    fn check(&self) -> Result<()> {
        self.attempts.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail.load(AtomicOrdering::SeqCst) {
            return Err(Error::NoMasterRef);
        }
        Ok(())
    }

    /// Every query received so far
    pub fn searches(&self) -> Vec<Query> {
        self.searches.lock().unwrap().clone()
    }

    fn documents_for(&self, reference: Option<&str>) -> Vec<Document> {
        let mut docs = self.documents.clone();
        if let Some(overrides) = reference.and_then(|r| self.previews.get(r)) {
            for doc in overrides {
                match docs.iter_mut().find(|d| d.id == doc.id) {
                    Some(existing) => *existing = doc.clone(),
                    None => docs.push(doc.clone()),
                }
            }
        }
        docs
    }

    fn run(&self, query: Query, page: usize) -> SearchResponse {
        let mut docs: Vec<Document> = self
            .documents_for(query.reference.as_deref())
            .into_iter()
            .filter(|d| query.predicates.iter().all(|p| matches(d, p)))
            .collect();

        if let Some(ordering) = &query.ordering {
            docs.sort_by_key(|d| sort_key(d, &ordering.field));
            if ordering.descending {
                docs.reverse();
            }
        }

        if let Some(after) = &query.after {
            docs = match docs.iter().position(|d| &d.id == after) {
                Some(pos) => docs.split_off(pos + 1),
                None => Vec::new(),
            };
        }

        let size = query.page_size.unwrap_or(20).max(1) as usize;
        let total = docs.len();
        let total_pages = total.div_ceil(size);
        let results: Vec<Document> = docs.into_iter().skip((page - 1) * size).take(size).collect();

        let next_page = if page < total_pages {
            let id = self.counter.fetch_add(1, AtomicOrdering::SeqCst);
            let cursor = format!("{}/documents/search?page={}&cursor={}", ENDPOINT, page + 1, id);
            self.cursors
                .lock()
                .unwrap()
                .insert(cursor.clone(), (query.clone(), page + 1));
            Some(cursor)
        } else {
            None
        };

        SearchResponse {
            page: page as u32,
            results_per_page: size as u32,
            total_results_size: total as u32,
            total_pages: total_pages as u32,
            next_page,
            prev_page: None,
            results,
        }
    }
}

impl ContentSource for MemorySource {
    async fn master_ref(&self) -> Result<String> {
        self.check()?;
        self.master_refs.fetch_add(1, AtomicOrdering::SeqCst);
        Ok(MASTER_REF.to_string())
    }

    async fn search(&self, query: Query) -> Result<SearchResponse> {
        self.check()?;
        self.searches.lock().unwrap().push(query.clone());
        Ok(self.run(query, 1))
    }

    async fn fetch_page(&self, cursor: &str) -> Result<SearchResponse> {
        self.check()?;
        let entry = self.cursors.lock().unwrap().get(cursor).cloned();
        match entry {
            Some((query, page)) => Ok(self.run(query, page)),
            None => Err(Error::ForeignCursor(cursor.to_string())),
        }
    }
}

fn matches(doc: &Document, predicate: &Predicate) -> bool {
    match predicate {
        Predicate::At { path, value } => match path.as_str() {
            "document.type" => &doc.doc_type == value,
            "document.id" => &doc.id == value,
            p if p.ends_with(".uid") => doc.uid.as_deref() == Some(value.as_str()),
            _ => false,
        },
    }
}

fn sort_key(doc: &Document, field: &str) -> Option<DateTime<Utc>> {
    match field {
        "document.first_publication_date" => doc.first_publication_date,
        "document.last_publication_date" => doc.last_publication_date,
        _ => None,
    }
}

/// Build a post document with one content block of `words` words
pub fn post(id: &str, uid: &str, title: &str, day: u32, words: usize) -> Document {
    let published = crate::prismic::document::parse_date(&format!("2021-03-{:02}T12:00:00+0000", day));
    let body = if words == 0 {
        json!([])
    } else {
        json!([{"type": "paragraph", "text": vec!["word"; words].join(" "), "spans": []}])
    };
    Document {
        id: id.to_string(),
        uid: Some(uid.to_string()),
        doc_type: "posts".to_string(),
        tags: Vec::new(),
        first_publication_date: published,
        last_publication_date: published,
        lang: Some("en-us".to_string()),
        data: json!({
            "title": title,
            "subtitle": format!("About {}", title),
            "author": "Ada",
            "banner": {"url": format!("https://images.example/{}.png", uid), "alt": null},
            "content": [{
                "heading": "",
                "body": body
            }]
        }),
    }
}
