//! Flat JSON-lines rendering of tracing events.
//!
//! One object per line:
//!
//! ```text
//! {"correlation_id":"9f1c…","file":"timing.rs:51","func":"greeter::middleware::timing",
//!  "duration":"1.2ms","level":"info","method":"GET","msg":"request completed",
//!  "time":"2026-10-16T09:12:44.123+00:00","uri":"/"}
//! ```
//!
//! Fields recorded on the event's ancestor spans are flattened into the record,
//! root span first, so a field on the request span (`correlation_id`) shows up
//! on every event emitted beneath it. Event fields win on name clashes.

use std::fmt;
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::{Context as LayerContext, Layer};
use tracing_subscriber::registry::LookupSpan;

/// A [`Layer`] writing each event as one JSON object per line.
pub struct JsonLines<W> {
    make_writer: W,
}

impl<W> JsonLines<W>
where
    W: for<'w> MakeWriter<'w> + 'static,
{
    pub fn new(make_writer: W) -> Self {
        Self { make_writer }
    }
}

/// Field values captured from a span when it is created.
#[derive(Default)]
struct SpanFields(Map<String, Value>);

impl<S, W> Layer<S> for JsonLines<W>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = FieldVisitor::default();
        attrs.record(&mut fields);
        span.extensions_mut().insert(SpanFields(fields.0));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: LayerContext<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut fields = FieldVisitor::default();
        values.record(&mut fields);
        let mut extensions = span.extensions_mut();
        match extensions.get_mut::<SpanFields>() {
            Some(existing) => existing.0.extend(fields.0),
            None => extensions.insert(SpanFields(fields.0)),
        }
    }

    fn on_event(&self, event: &Event<'_>, ctx: LayerContext<'_, S>) {
        let meta = event.metadata();
        let mut record = Map::new();

        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                if let Some(fields) = span.extensions().get::<SpanFields>() {
                    record.extend(fields.0.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
        }

        let mut fields = FieldVisitor::default();
        event.record(&mut fields);
        record.extend(fields.0);

        let message = record.remove("message").unwrap_or(Value::String(String::new()));
        record.insert("msg".to_owned(), message);
        record.insert("level".to_owned(), Value::from(level_str(meta.level())));
        record.insert("time".to_owned(), Value::from(chrono::Utc::now().to_rfc3339()));
        if let Some(func) = meta.module_path() {
            record.insert("func".to_owned(), Value::from(func));
        }
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            let base = Path::new(file)
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file);
            record.insert("file".to_owned(), Value::from(format!("{base}:{line}")));
        }

        let Ok(mut line) = serde_json::to_vec(&record) else { return };
        line.push(b'\n');
        // A logger has nowhere to report its own write failures.
        let _ = self.make_writer.make_writer_for(meta).write_all(&line);
    }
}

fn level_str(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "trace",
        Level::DEBUG => "debug",
        Level::INFO => "info",
        Level::WARN => "warning",
        Level::ERROR => "error",
    }
}

#[derive(Default)]
struct FieldVisitor(Map<String, Value>);

impl FieldVisitor {
    fn put(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.put(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.put(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.put(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.put(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.put(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, Value::from(format!("{value:?}")));
    }
}
