//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Route of the listing page
pub const HOME_PATH: &str = "/";

/// Route that leaves preview mode
pub const EXIT_PREVIEW_PATH: &str = "/api/exit-preview";

/// Route serving further listing pages as JSON
pub const LOAD_MORE_PATH: &str = "/api/posts";

/// Generate the route of a post page
///
/// # Examples
/// ```ignore
/// post_path("hello world") // -> "/post/hello%20world"
/// ```
pub fn post_path(slug: &str) -> String {
    format!("/post/{}", utf8_percent_encode(slug, SEGMENT))
}

/// Output file of a post page relative to the public dir
pub fn post_output_path(slug: &str) -> String {
    let segment = match slug {
        "." => "%2E".to_string(),
        ".." => "%2E%2E".to_string(),
        _ => utf8_percent_encode(slug, SEGMENT).to_string(),
    };
    format!("post/{}/index.html", segment)
}
