//! Segment tree, lifecycle and serialization tests through the public API.

use anyhow::Result;
use serde_json::json;
use xray_segments::{
    Exception, HttpData, Segment, SqlData, StackFrame, TraceHeader, TraceId,
};

use crate::common::init_logging;

#[derive(Debug, thiserror::Error)]
#[error("connection reset")]
struct ResetError;

#[derive(Debug, thiserror::Error)]
#[error("query failed")]
struct QueryError {
    #[source]
    source: ResetError,
}

fn named(name: &str) -> Segment {
    let mut segment = Segment::new();
    segment.set_name(name);
    segment
}

#[test]
fn test_request_lifecycle_builds_expected_tree() -> Result<()> {
    init_logging();

    let mut root = named("frontend");
    root.set_trace_id(TraceId::generate()).set_sampled(true).begin();

    let mut db = Segment::sql(SqlData::new().with_database_type("PostgreSQL"));
    db.set_name("orders-db").begin();
    root.add_subsegment(db);
    assert_eq!(root.current_segment().name(), "orders-db");

    root.current_segment_mut()
        .add_exception(&QueryError { source: ResetError })
        .set_fault(true)
        .end();

    let mut api = Segment::http(HttpData::new().with_url("https://inventory/items").with_method("GET"));
    api.set_name("inventory").begin();
    root.add_subsegment(api);
    if let Some(http) = root.current_segment_mut().http_mut() {
        http.set_response_code(200).set_content_length(42);
    }
    root.current_segment_mut().end();
    root.end();

    assert!(!root.is_open());
    assert_eq!(root.subsegments().len(), 2);
    assert!(root.subsegments().iter().all(Segment::is_sampled));

    let json = root.to_json();
    assert_eq!(json["name"], "frontend");
    assert!(json.get("in_progress").is_none());

    let db_json = &json["subsegments"][0];
    assert_eq!(db_json["namespace"], "remote");
    assert_eq!(db_json["sql"], json!({"database_type": "PostgreSQL"}));
    assert_eq!(db_json["fault"], true);

    let exceptions = db_json["cause"]["exceptions"].as_array().cloned().unwrap_or_default();
    assert_eq!(exceptions.len(), 2);
    assert_eq!(exceptions[0]["message"], "query failed");
    assert_eq!(exceptions[1]["message"], "connection reset");
    assert_eq!(exceptions[0]["cause"], exceptions[1]["id"]);
    assert!(exceptions[1].get("cause").is_none());

    let api_json = &json["subsegments"][1];
    assert_eq!(
        api_json["http"],
        json!({
            "request": {"url": "https://inventory/items", "method": "GET"},
            "response": {"status": 200, "content_length": 42}
        })
    );
    Ok(())
}

#[test]
fn test_children_dropped_after_close() {
    let mut root = named("root");
    root.begin().end();
    root.add_subsegment(named("late"));

    assert!(root.subsegments().is_empty());
    assert!(root.to_json().get("subsegments").is_none());
}

#[test]
fn test_current_segment_follows_last_child_even_when_closed() {
    let mut root = named("A");
    root.begin();

    let mut b = named("B");
    b.begin();
    root.add_subsegment(b);

    let mut c = named("C");
    c.begin();
    root.current_segment_mut().add_subsegment(c);
    assert_eq!(root.current_segment().name(), "C");

    root.current_segment_mut().end();
    assert_eq!(root.current_segment().name(), "C");
    assert!(!root.current_segment().is_open());
}

#[test]
fn test_independent_segment_continues_remote_trace() -> Result<()> {
    let header: TraceHeader =
        "Root=1-5759e988-bd862e3fe1be46a994272793;Parent=53995c3f42cd8ad8;Sampled=1".parse()?;

    let mut segment = named("worker");
    segment.apply_trace_header(&header).set_independent(true).begin();

    let json = segment.to_json();
    assert_eq!(json["type"], "subsegment");
    assert_eq!(json["trace_id"], "1-5759e988-bd862e3fe1be46a994272793");
    assert_eq!(json["parent_id"], "53995c3f42cd8ad8");
    assert_eq!(json["in_progress"], true);
    assert!(segment.is_sampled());

    let downstream = segment.trace_header();
    assert_eq!(downstream.parent(), Some(segment.id().to_string().as_str()));
    assert_eq!(downstream.root(), header.root());
    Ok(())
}

#[test]
fn test_manual_exception_record_serializes_frames() {
    let frame = StackFrame::new()
        .with_path("src/billing.rs")
        .with_line(88)
        .with_type_qualifier("Invoice")
        .with_call_operator("::")
        .with_function("total");
    let exception = Exception::new("BillingError", "negative total").with_frame(frame);

    let mut segment = named("billing");
    segment.add_exception_record(exception).begin().end();

    let json = segment.to_json();
    let record = &json["cause"]["exceptions"][0];
    assert_eq!(record["type"], "BillingError");
    assert_eq!(
        record["stack"],
        json!([{"path": "src/billing.rs", "line": 88, "label": "Invoice::total"}])
    );
    assert!(json["cause"]["working_directory"].is_string());
}

#[test]
fn test_unsampled_parent_leaves_child_flag_alone() {
    let mut root = named("root");
    root.begin();

    let mut child = named("child");
    child.set_sampled(true);
    root.add_subsegment(child);

    assert!(!root.is_sampled());
    assert!(root.subsegments()[0].is_sampled());
}

#[inline(never)]
fn record_failure(segment: &mut Segment) -> u32 {
    segment.add_exception(&ResetError);
    line!() - 1
}

#[test]
fn test_attached_exception_stack_starts_at_caller() {
    let mut segment = named("stack");
    let line = record_failure(&mut segment);

    let json = segment.to_json();
    let stack = json["cause"]["exceptions"][0]["stack"].as_array().cloned().unwrap_or_default();
    assert!(!stack.is_empty());

    let top = &stack[0];
    assert_eq!(top["line"], line);
    assert!(top["path"].as_str().unwrap_or_default().ends_with("segment_tests.rs"));
    let label = top["label"].as_str().unwrap_or_default();
    assert!(label.ends_with("record_failure"), "unexpected top frame {label}");
    assert!(!label.starts_with("xray_segments::"));

    assert!(stack.iter().all(|frame| {
        !frame["label"].as_str().unwrap_or_default().starts_with("xray_segments::segment")
    }));
}
