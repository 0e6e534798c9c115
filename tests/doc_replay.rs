use kumo::{FlatLog, RawLog, flatten, replay};
use serde_json::json;

const DOCUMENT_LOG: &str = include_str!("fixtures/document_log.json");

#[test]
fn test_fixture_plain_text() {
    let log = RawLog::from_saved(DOCUMENT_LOG).unwrap();
    assert_eq!(replay(&flatten(&log, '|').unwrap()), "world?");
}

#[test]
fn test_replay_from_saved_flat_log() {
    let log = RawLog::from_saved(DOCUMENT_LOG).unwrap();
    let text = flatten(&log, '|').unwrap().to_text().unwrap();
    assert_eq!(replay(&FlatLog::parse(&text, '|')), "world?");
}

#[test]
fn test_document_without_pasted_content() {
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [[{"ty": "as", "st": "text", "si": 1, "ei": 1, "sm": {}}]],
        "changelog": [
            [{"ty": "is", "ibi": 1, "s": "abc"}, 1, 1],
            [{"ty": "mlti", "mts": [
                {"ty": "ds", "si": 2, "ei": 2},
                {"ty": "is", "ibi": 3, "s": "Z"}
            ]}, 2, 2]
        ]
    }))
    .unwrap();
    assert_eq!(replay(&flatten(&log, '|').unwrap()), "acZ");
}

#[test]
fn test_unicode_positions() {
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [[{"ty": "is", "ibi": 1, "s": "naïve 😀"}]],
        "changelog": [
            [{"ty": "ds", "si": 3, "ei": 3}, 1, 1],
            [{"ty": "is", "ibi": 6, "s": "!"}, 2, 2]
        ]
    }))
    .unwrap();
    assert_eq!(replay(&flatten(&log, '|').unwrap()), "nave !😀");
}

#[test]
fn test_replay_of_flat_log_with_bare_headers() {
    let text = "chunkedSnapshot\n\
                {\"type\": \"is\", \"string\": \"hello\"}\n\
                changelog\n\
                1|u|ins|{\"type\": \"is\", \"ins_index\": 6, \"string\": \" world\"}";
    assert_eq!(replay(&FlatLog::parse(text, '|')), "hello world");
}

#[test]
fn test_extreme_positions_clamp() {
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [],
        "changelog": [
            [{"ty": "is", "ibi": i64::MIN, "s": "x"}, 1, 1],
            [{"ty": "is", "ibi": i64::MAX, "s": "y"}, 2, 2],
            [{"ty": "ds", "si": i64::MAX, "ei": i64::MAX}, 3, 3],
            [{"ty": "is", "ibi": i64::MIN, "s": "w"}, 4, 4]
        ]
    }))
    .unwrap();
    assert_eq!(replay(&flatten(&log, '|').unwrap()), "wxy");
}
