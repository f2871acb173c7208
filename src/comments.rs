//! Third-party discussion widget

use crate::config::CommentsConfig;
use crate::helpers::{html_escape, script_tag};

/// Id of the element the widget script attaches to
pub const MOUNT_ID: &str = "inject-comments-for-uterances";

/// Render the mount point with its embed script, or `None` when no
/// repository is configured.
///
/// Post pages include the result exactly once.
pub fn render(config: &CommentsConfig) -> Option<String> {
    let repo = config.repo.trim();
    if repo.is_empty() {
        return None;
    }

    let script = script_tag(&[
        ("src", Some(config.script_src.as_str())),
        ("repo", Some(repo)),
        ("issue-term", Some(config.issue_term.as_str())),
        ("theme", Some(config.theme.as_str())),
        ("crossorigin", Some("anonymous")),
        ("async", None),
    ]);

    Some(format!(
        r#"<div id="{}" class="comments">{}</div>"#,
        html_escape(MOUNT_ID),
        script
    ))
}
