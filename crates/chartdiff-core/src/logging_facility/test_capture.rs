//! In-memory capture of log events for test assertions
//!
//! The capture layer is installed once per test binary as the global
//! subscriber. Tests share it, so assertions should filter by a unique
//! `op` or by fields they control.

use crate::core_types::schema;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One captured log event
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub target: String,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    pub message: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldRecorder {
    fields: BTreeMap<String, String>,
}

impl Visit for FieldRecorder {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.fields
            .insert(field.name().to_string(), format!("{:?}", value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields
            .insert(field.name().to_string(), value.to_string());
    }
}

type Sink = Arc<Mutex<Vec<CapturedEvent>>>;

/// Layer that appends every event to a shared buffer
pub struct TestCaptureLayer {
    sink: Sink,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let sink: Sink = Arc::default();
        (
            Self { sink: sink.clone() },
            TestCapture { sink },
        )
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut recorder = FieldRecorder::default();
        event.record(&mut recorder);
        let fields = recorder.fields;

        let captured = CapturedEvent {
            level: *metadata.level(),
            target: metadata.target().to_string(),
            component: fields.get(schema::FIELD_COMPONENT).cloned(),
            op: fields.get(schema::FIELD_OP).cloned(),
            event: fields.get(schema::FIELD_EVENT).cloned(),
            message: fields.get("message").cloned(),
            fields,
        };

        if let Ok(mut events) = self.sink.lock() {
            events.push(captured);
        }
    }
}

/// Handle for reading captured events
#[derive(Clone)]
pub struct TestCapture {
    sink: Sink,
}

impl TestCapture {
    /// Snapshot of every event captured so far
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.sink.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events emitted for one operation name
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.op.as_deref() == Some(op))
            .collect()
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }

    /// # Panics
    ///
    /// Panics if no event with the given `op` and `event` was captured
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let events = self.events();
        let found = events
            .iter()
            .any(|e| e.op.as_deref() == Some(op) && e.event.as_deref() == Some(event));
        assert!(
            found,
            "expected op={} event={} among {} captured events",
            op,
            event,
            events.len()
        );
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.sink.lock() {
            events.clear();
        }
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install (once) and return the shared capture
///
/// # Example
///
/// ```
/// use chartdiff_core::logging_facility::test_capture::init_test_capture;
/// use chartdiff_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("classify");
/// capture.assert_event_exists("classify", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_lookup() {
        let mut fields = BTreeMap::new();
        fields.insert("version".to_string(), "v1".to_string());
        let event = CapturedEvent {
            level: Level::INFO,
            target: "chartdiff_core".to_string(),
            component: None,
            op: Some("render_chart".to_string()),
            event: Some("start".to_string()),
            message: None,
            fields,
        };

        assert_eq!(event.field("version"), Some("v1"));
        assert_eq!(event.field("missing"), None);
    }
}
