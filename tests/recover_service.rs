use kumo::{
    Download, Drawing, FetchError, Fetcher, FileChoice, OfflineFetcher, RawLog, RecoveredObject,
    RecoveryConfig, Service, recover,
};
use serde_json::{Value, json};

const DOCUMENT_LOG: &str = include_str!("fixtures/document_log.json");
const PRESENTATION_LOG: &str = include_str!("fixtures/presentation_log.json");

/// Serves the ids it knows about and fails for everything else.
struct StubFetcher {
    images: Vec<&'static str>,
    drawings: Vec<&'static str>,
}

impl Fetcher for StubFetcher {
    fn comments(&self, _file_id: &str) -> Result<Vec<Value>, FetchError> {
        Ok(vec![json!({"content": "ok", "author": {"displayName": "Ana"}})])
    }

    fn image(&self, _choice: &FileChoice, image_id: &str) -> Result<Download, FetchError> {
        if self.images.contains(&image_id) {
            Ok(Download::new(
                image_id.as_bytes().to_vec(),
                Some(format!(r#"attachment; filename="{image_id}.png""#)),
            ))
        } else {
            Err(FetchError::Http {
                status: 404,
                url: image_id.to_string(),
            })
        }
    }

    fn drawing(&self, drawing: &Drawing) -> Result<Download, FetchError> {
        if self.drawings.contains(&drawing.id.as_str()) {
            Ok(Download::new(drawing.id.as_bytes().to_vec(), None))
        } else {
            Err(FetchError::Other("no such drawing".to_string()))
        }
    }
}

fn choice(service: Service) -> FileChoice {
    FileChoice {
        file_id: "file-1".to_string(),
        title: "Title".to_string(),
        service,
        max_revs: None,
    }
}

fn names(objects: &[RecoveredObject]) -> Vec<&str> {
    objects.iter().map(|o| o.filename.as_str()).collect()
}

#[test]
fn test_document_artifacts_in_order() {
    let log = RawLog::from_saved(DOCUMENT_LOG).unwrap();
    let fetcher = StubFetcher {
        images: vec!["cosmo-1"],
        drawings: vec!["drawing-1"],
    };
    let objects = recover(
        &log,
        &choice(Service::Document),
        &fetcher,
        &RecoveryConfig::default(),
    )
    .unwrap();
    assert_eq!(
        names(&objects),
        [
            "revision-log.txt",
            "flat-log.txt",
            "comments.txt",
            "drawing0.failed",
            "img0.png",
            "plaintext.txt",
            "suggestions.txt",
        ]
    );
    assert_eq!(objects[4].content, b"cosmo-1");
    assert_eq!(objects[5].content, b"world?");
}

#[test]
fn test_numbering_counts_successful_fetches() {
    let image = |id: &str| json!({"ty": "ae", "epm": {"ee_eo": {"i_cid": id}}});
    let log = RawLog::from_value(json!({
        "chunkedSnapshot": [],
        "changelog": [
            [image("gone"), 1, 1],
            [image("kept"), 2, 2],
            [image("also-kept"), 3, 3]
        ]
    }))
    .unwrap();
    let fetcher = StubFetcher {
        images: vec!["kept", "also-kept"],
        drawings: vec![],
    };
    let objects = recover(
        &log,
        &choice(Service::Document),
        &fetcher,
        &RecoveryConfig::default(),
    )
    .unwrap();
    let images: Vec<&RecoveredObject> = objects
        .iter()
        .filter(|o| o.filename.starts_with("img"))
        .collect();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].filename, "img0.png");
    assert_eq!(images[0].content, b"kept");
    assert_eq!(images[1].filename, "img1.png");
}

#[test]
fn test_offline_presentation_pass() {
    let log = RawLog::from_saved(PRESENTATION_LOG).unwrap();
    let objects = recover(
        &log,
        &choice(Service::Presentation),
        &OfflineFetcher::new(),
        &RecoveryConfig::default(),
    )
    .unwrap();
    assert_eq!(
        names(&objects),
        [
            "revision-log.txt",
            "slide0/box0.txt",
            "slide0/box1.txt",
            "slide1/box0.txt",
        ]
    );
}

#[test]
fn test_spreadsheet_and_form_passes() {
    let log = RawLog::from_value(json!({"chunkedSnapshot": [], "changelog": []})).unwrap();
    let fetcher = OfflineFetcher::with_comments(vec![]);
    let config = RecoveryConfig::default();

    let sheet = recover(&log, &choice(Service::Spreadsheet), &fetcher, &config).unwrap();
    assert_eq!(names(&sheet), ["revision-log.txt", "comments.txt"]);

    let form = recover(&log, &choice(Service::Form), &fetcher, &config).unwrap();
    assert_eq!(names(&form), ["revision-log.txt"]);
}

#[test]
fn test_config_toggles_logs() {
    let log = RawLog::from_saved(DOCUMENT_LOG).unwrap();
    let config = RecoveryConfig {
        delimiter: '\t',
        include_flat_log: true,
        include_revision_log: false,
    };
    let objects = recover(
        &log,
        &choice(Service::Document),
        &OfflineFetcher::new(),
        &config,
    )
    .unwrap();
    assert_eq!(
        names(&objects),
        ["flat-log.txt", "plaintext.txt", "suggestions.txt"]
    );
    let flat = String::from_utf8(objects[0].content.clone()).unwrap();
    assert!(flat.starts_with("chunkedSnapshot\n"));
    assert!(flat.contains("\n1500000000001\tuser-a\tins\t{"));
}

#[test]
fn test_malformed_log_aborts_the_pass() {
    let log = RawLog::from_value(json!({"chunkedSnapshot": []})).unwrap();
    let result = recover(
        &log,
        &choice(Service::Form),
        &OfflineFetcher::new(),
        &RecoveryConfig::default(),
    );
    assert!(result.is_err());
}
