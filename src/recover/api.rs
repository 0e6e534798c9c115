//! Vendor endpoints a fetcher implementation talks to.

use serde_json::{Map, Value, json};

use crate::doc::Drawing;

use super::Service;

pub const API_BASE: &str = "https://docs.google.com";

/// Revision log covering revisions `start..=end`.
pub fn log_url(service: Service, file_id: &str, start: u64, end: u64) -> String {
    format!(
        "{API_BASE}/{}/d/{file_id}/revisions/load?start={start}&end={end}",
        service.tag()
    )
}

/// Endpoint that resolves image ids into download links.
pub fn render_url(service: Service, file_id: &str) -> String {
    format!(
        "{API_BASE}/{}/d/{file_id}/renderdata?id={file_id}",
        service.tag()
    )
}

/// A drawing rendered at the size it was inserted with.
pub fn drawing_url(drawing: &Drawing) -> String {
    format!(
        "{API_BASE}/{}/d/{}/image?w={}&h={}",
        Service::Drawing.tag(),
        drawing.id,
        drawing.width,
        drawing.height
    )
}

/// `renderOps` payload for [`render_url`]: one `r{N}` request per image.
pub fn render_ops<'a>(file_id: &str, image_ids: impl IntoIterator<Item = &'a str>) -> Value {
    let ops: Map<String, Value> = image_ids
        .into_iter()
        .enumerate()
        .map(|(n, id)| {
            (
                format!("r{n}"),
                json!(["image", {"cosmoId": id, "container": file_id}]),
            )
        })
        .collect();
    Value::Object(ops)
}
