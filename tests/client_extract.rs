mod support;

use ocr_sidecar::{Client, Engine, ErrorKind, OcrError, Upload, config::ServerConfig};
use support::{FakeTransport, SUCCESS_BODY};

fn client(transport: FakeTransport) -> Client<FakeTransport> {
    Client::with_transport(&ServerConfig::default(), transport)
}

#[test]
fn decodes_success_response() {
    let c = client(FakeTransport::new().reply(200, SUCCESS_BODY));
    let res = c
        .extract(&b"png-bytes"[..], "image/png", "scan.png", None)
        .unwrap();

    assert_eq!(res.text(), "Hello World");
    assert!((res.confidence() - 0.95).abs() < 0.01);
    assert_eq!(res.processing_time_ms(), 150);
    assert!(res.warnings().is_empty());
    assert!(res.is_success());

    let calls = c.transport().calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].url, "http://127.0.0.1:9292/ocr");
    assert_eq!(calls[0].filename.as_deref(), Some("scan.png"));
    assert_eq!(calls[0].content_type.as_deref(), Some("image/png"));
}

#[test]
fn missing_warnings_and_engine_default_to_empty() {
    let c = client(FakeTransport::new().reply(
        200,
        r#"{"text":"","confidence":0.0,"processing_time_ms":3}"#,
    ));
    let res = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap();
    assert!(res.warnings().is_empty());
    assert_eq!(res.engine(), "");
    assert!(res.preprocessing().is_none());
    assert!(!res.is_success());
}

#[test]
fn decodes_preprocessing_stats() {
    let body = r#"{
        "text": "abc", "confidence": 0.8, "processing_time_ms": 90,
        "warnings": ["low contrast"], "engine": "ocrs",
        "preprocessing": {"preset": "default", "total_time_ms": 40,
            "steps": [{"name": "grayscale", "time_ms": 5}, {"name": "resize", "time_ms": 35}]}
    }"#;
    let c = client(FakeTransport::new().reply(200, body));
    let res = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap();

    assert_eq!(res.engine(), "ocrs");
    assert_eq!(res.warnings(), ["low contrast".to_string()]);
    let pre = res.preprocessing().unwrap();
    assert_eq!(pre.preset, "default");
    assert_eq!(pre.total_time_ms, 40);
    let names: Vec<_> = pre.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["grayscale", "resize"]);
}

#[test]
fn confidence_is_clamped_into_unit_range() {
    let c = client(FakeTransport::new().reply(
        200,
        r#"{"text":"a","confidence":1.7,"processing_time_ms":1}"#,
    ));
    let res = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap();
    assert_eq!(res.confidence(), 1.0);
}

#[test]
fn direct_decode_clamps_confidence_too() {
    let res: ocr_sidecar::OcrResult = serde_json::from_str(
        r#"{"text":"a","confidence":-0.3,"processing_time_ms":1}"#,
    )
    .unwrap();
    assert_eq!(res.confidence(), 0.0);
}

#[test]
fn server_error_carries_server_message() {
    let c = client(FakeTransport::new().reply(500, r#"{"error":"Processing failed"}"#));
    let err = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap_err();
    assert!(matches!(err, OcrError::Server(ref m) if m == "Processing failed"));
    assert_eq!(err.to_string(), "Processing failed");
}

#[test]
fn server_error_without_body_gets_generic_message() {
    let c = client(FakeTransport::new().reply(502, "<html>bad gateway</html>"));
    let err = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap_err();
    assert!(matches!(err, OcrError::Server(ref m) if m == "server returned 502"));
}

#[test]
fn malformed_success_body_is_a_server_error() {
    let c = client(FakeTransport::new().reply(200, "not json"));
    let err = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Server);
}

#[test]
fn transport_failure_becomes_connection_error() {
    let c = client(FakeTransport::new().refuse("connection refused"));
    let err = c.extract(&b"x"[..], "image/png", "a.png", None).unwrap_err();
    assert!(matches!(err, OcrError::Connection(ref m) if m.contains("connection refused")));
}

#[test]
fn explicit_engine_overrides_configured_default() {
    let mut cfg = ServerConfig::default();
    cfg.engine = Engine::Ocrs;
    let c = Client::with_transport(&cfg, FakeTransport::new().reply(200, SUCCESS_BODY));
    c.extract(&b"x"[..], "image/png", "a.png", Some(Engine::Leptess))
        .unwrap();
    assert_eq!(c.transport().calls()[0].url, "http://127.0.0.1:9292/ocr/leptess");
}

#[test]
fn configured_engine_is_used_without_override() {
    let mut c = client(FakeTransport::new().reply(200, SUCCESS_BODY));
    c.set_engine("ocrs").unwrap();
    c.extract(&b"x"[..], "image/png", "a.png", None).unwrap();
    assert_eq!(c.transport().calls()[0].url, "http://127.0.0.1:9292/ocr/ocrs");
}

#[test]
fn invalid_engine_name_never_reaches_the_network() {
    let mut c = client(FakeTransport::new());
    let err = c.set_engine("cuneiform").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(c.transport().calls().is_empty());
}

#[test]
fn extract_from_path_infers_type_and_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("receipt.jpg");
    std::fs::write(&path, b"jpeg-bytes").unwrap();

    let c = client(FakeTransport::new().reply(200, SUCCESS_BODY));
    c.extract_from_path(&path, None, None, None).unwrap();

    let call = &c.transport().calls()[0];
    assert_eq!(call.filename.as_deref(), Some("receipt.jpg"));
    assert_eq!(call.content_type.as_deref(), Some("image/jpeg"));
}

#[test]
fn extract_from_path_honours_explicit_type_and_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("blob.bin");
    std::fs::write(&path, b"%PDF-1.7").unwrap();

    let c = client(FakeTransport::new().reply(200, SUCCESS_BODY));
    c.extract_from_path(&path, Some("application/pdf"), Some("invoice.pdf"), None)
        .unwrap();

    let call = &c.transport().calls()[0];
    assert_eq!(call.filename.as_deref(), Some("invoice.pdf"));
    assert_eq!(call.content_type.as_deref(), Some("application/pdf"));
}

#[test]
fn missing_file_is_an_io_error_without_network() {
    let c = client(FakeTransport::new());
    let err = c
        .extract_from_path(std::path::Path::new("/nonexistent/x.png"), None, None, None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(c.transport().calls().is_empty());
}

#[test]
fn analysis_metadata_reflects_result() {
    let c = client(FakeTransport::new().reply(
        200,
        r#"{"text":"Total 12.00","confidence":0.5,"processing_time_ms":20,"engine":"leptess"}"#,
    ));
    let upload = Upload::new(b"x".to_vec(), "image/png", "a.png");
    let res = c.extract_upload(&upload, None).unwrap();
    let meta = res.analysis_metadata();
    assert_eq!(meta["ocr_text"], "Total 12.00");
    assert_eq!(meta["ocr_engine"], "leptess");
    assert_eq!(meta["ocr_processing_time_ms"], 20);
    assert!((meta["ocr_confidence"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    assert!(meta["ocr_processed_at"].as_str().unwrap().ends_with('Z'));
}
