use kumo::{ImageSource, Presentation, RawLog, slide_images};
use serde_json::json;

const PRESENTATION_LOG: &str = include_str!("fixtures/presentation_log.json");

fn fixture() -> RawLog {
    RawLog::from_saved(PRESENTATION_LOG).unwrap()
}

#[test]
fn test_fixture_slides_and_boxes() {
    let presentation = Presentation::from_log(&fixture()).unwrap();
    assert_eq!(presentation.slides(), ["p", "s2"]);
    assert_eq!(presentation.boxes_on("s2"), ["b1", "img-box"]);
    assert_eq!(presentation.text_box("b1").unwrap().text, "Hello");
    assert_eq!(presentation.text_box("i1").unwrap().text, "Sub!");
}

#[test]
fn test_fixture_text_files() {
    let presentation = Presentation::from_log(&fixture()).unwrap();
    assert_eq!(
        presentation.text_files(),
        vec![
            ("slide0/box0.txt".to_string(), "Title"),
            ("slide0/box1.txt".to_string(), "Sub!"),
            ("slide1/box0.txt".to_string(), "Hello"),
        ]
    );
}

#[test]
fn test_fixture_images() {
    let images = slide_images(&fixture()).unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images.get("url-image-1").map(String::as_str), Some("s2"));
}

#[test]
fn test_slide_lifecycle() {
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [],
        "changelog": [
            [[1], 0, 0],
            [[12, "a", 1], 1, 1],
            [[12, "b", 2], 2, 2],
            [[14, 0, 2], 3, 3],
            [[13, 0, 0, 0, "wrong"], 4, 4],
            [[13, 1, 0, 0, "a"], 5, 5],
            [[3, "x", 0, 0, 0, "b:notes"], 6, 6],
            [[15, "x", 0, 0, "speaker notes"], 7, 7],
            [[0, ["i0", "missing"]], 8, 8]
        ]
    }))
    .unwrap();
    let presentation = Presentation::from_log(&log).unwrap();
    assert_eq!(presentation.slides(), ["b", "p"]);
    assert_eq!(presentation.boxes_on("p"), ["i1", "i3"]);
    assert_eq!(presentation.boxes_on("b"), ["x"]);
    assert_eq!(
        presentation.text_files(),
        vec![("slide0/box0.txt".to_string(), "speaker notes")]
    );
}

#[test]
fn test_video_inserts_are_not_images() {
    let mut video = vec![serde_json::Value::Null; 18];
    video[11] = json!("video-id");
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [],
        "changelog": [
            [[4, [[3, "v", 0, 0, video, "p"], [44, "v"]]], 1, 1]
        ]
    }))
    .unwrap();
    assert!(slide_images(&log).unwrap().is_empty());
    assert_eq!(
        kumo::slides::decode_image_insert(&log.changelog().unwrap()[0]).map(|i| i.source),
        Some(ImageSource::Video)
    );
}
