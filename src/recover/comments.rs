//! Text rendering of a document's comment threads.

use serde_json::Value;

use crate::doc::scalar_text;

/// The comment list of a comments response, which may be wrapped in an
/// `items` object or be a bare array.
pub fn comment_items(response: &Value) -> Option<&[Value]> {
    match response {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("items").and_then(Value::as_array).map(Vec::as_slice),
        _ => None,
    }
}

/// Renders every comment, numbered from 1, followed by its numbered replies
/// and a blank separator. Fields a comment does not carry render empty.
pub fn format_comments(comments: &[Value]) -> String {
    let mut parts = Vec::new();
    for (i, comment) in comments.iter().enumerate() {
        parts.push(format!(
            "{num}. comment: {content} \nauthor: {author}, status: {status}, created: {created}, \
             modified: {modified}, deleted: {deleted} \nreplies:",
            num = i + 1,
            content = field(comment, "content"),
            author = author(comment),
            status = field(comment, "status"),
            created = field(comment, "createdDate"),
            modified = field(comment, "modifiedDate"),
            deleted = field(comment, "deleted"),
        ));
        let replies = comment
            .get("replies")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for (j, reply) in replies.iter().enumerate() {
            parts.push(format!(
                "\n\t({num}) reply: {content} \n\tauthor: {author}, created: {created}, \
                 modified: {modified}, deleted: {deleted}",
                num = j + 1,
                content = field(reply, "content"),
                author = author(reply),
                created = field(reply, "createdDate"),
                modified = field(reply, "modifiedDate"),
                deleted = field(reply, "deleted"),
            ));
        }
        parts.push("\n\n".to_string());
    }
    parts.join("\n")
}

fn field(item: &Value, key: &str) -> String {
    item.get(key).map(scalar_text).unwrap_or_default()
}

fn author(item: &Value) -> String {
    item.get("author")
        .map(|author| field(author, "displayName"))
        .unwrap_or_default()
}
