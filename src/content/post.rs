//! Post models and normalization of raw documents

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::prismic::Document;
use crate::richtext::RichText;

/// Words per minute used by the reading time estimate
pub const WORDS_PER_MINUTE: usize = 200;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub slug: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A full post
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    /// Backend document id, used as the `after` anchor for navigation
    pub id: String,
    pub slug: String,
    pub first_publication_date: Option<DateTime<Utc>>,
    pub last_publication_date: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub banner: Banner,
    pub content: Vec<ContentBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Banner {
    pub url: Option<String>,
    pub alt: Option<String>,
}

/// A titled section of a post body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBlock {
    pub heading: String,
    pub body: RichText,
}

#[derive(Deserialize)]
struct SummaryFields {
    title: String,
    #[serde(default)]
    subtitle: String,
    author: String,
}

#[derive(Deserialize)]
struct PostFields {
    title: String,
    #[serde(default)]
    subtitle: String,
    author: String,
    #[serde(default)]
    banner: Banner,
    #[serde(default)]
    content: Vec<ContentBlockFields>,
}

#[derive(Deserialize)]
struct ContentBlockFields {
    #[serde(default)]
    heading: Option<String>,
    #[serde(default)]
    body: RichText,
}

fn slug_of(doc: &Document) -> Result<String> {
    doc.uid.clone().ok_or_else(|| Error::Document {
        id: doc.id.clone(),
        reason: "missing uid".to_string(),
    })
}

fn fields<T: serde::de::DeserializeOwned>(doc: &Document) -> Result<T> {
    serde_json::from_value(doc.data.clone()).map_err(|e| Error::Document {
        id: doc.id.clone(),
        reason: e.to_string(),
    })
}

impl TryFrom<&Document> for PostSummary {
    type Error = Error;

    fn try_from(doc: &Document) -> Result<Self> {
        let data: SummaryFields = fields(doc)?;
        Ok(Self {
            slug: slug_of(doc)?,
            first_publication_date: doc.first_publication_date,
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
        })
    }
}

impl TryFrom<&Document> for Post {
    type Error = Error;

    fn try_from(doc: &Document) -> Result<Self> {
        let data: PostFields = fields(doc)?;
        Ok(Self {
            id: doc.id.clone(),
            slug: slug_of(doc)?,
            first_publication_date: doc.first_publication_date,
            last_publication_date: doc.last_publication_date,
            title: data.title,
            subtitle: data.subtitle,
            author: data.author,
            banner: data.banner,
            content: data
                .content
                .into_iter()
                .map(|block| ContentBlock {
                    heading: block.heading.unwrap_or_default(),
                    body: block.body,
                })
                .collect(),
        })
    }
}

/// Estimated reading time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadingTime {
    /// No words to count yet
    Calculating,
    Minutes(usize),
}

impl ReadingTime {
    pub fn from_words(words: usize) -> Self {
        match words {
            0 => ReadingTime::Calculating,
            n => ReadingTime::Minutes(n.div_ceil(WORDS_PER_MINUTE)),
        }
    }

    pub fn minutes(&self) -> Option<usize> {
        match self {
            ReadingTime::Calculating => None,
            ReadingTime::Minutes(m) => Some(*m),
        }
    }
}

impl Post {
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            slug: self.slug.clone(),
            first_publication_date: self.first_publication_date,
            title: self.title.clone(),
            subtitle: self.subtitle.clone(),
            author: self.author.clone(),
        }
    }

    /// Headings and plain-text bodies of every block, concatenated
    pub fn plain_text(&self) -> String {
        self.content.iter().fold(String::new(), |mut acc, block| {
            acc.push_str(&block.heading);
            acc.push_str(&block.body.as_text());
            acc
        })
    }

    /// Number of single-space separated pieces of the plain text
    pub fn word_count(&self) -> usize {
        let text = self.plain_text();
        if text.is_empty() {
            0
        } else {
            text.split(' ').count()
        }
    }

    pub fn reading_time(&self) -> ReadingTime {
        ReadingTime::from_words(self.word_count())
    }

    /// Whether the post changed after it was first published
    pub fn is_edited(&self) -> bool {
        match (self.first_publication_date, self.last_publication_date) {
            (Some(first), Some(last)) => last > first,
            _ => false,
        }
    }
}
