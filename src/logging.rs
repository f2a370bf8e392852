//! Tracing subscriber setup.
//!
//! JSON output writes one object per event with `time`, `severity`,
//! `message` and `target`, followed by the fields of every enclosing span
//! and of the event itself.

use crate::config::{LogFormat, LoggingConfig};
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{JsonFields, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Builds the filter: `RUST_LOG` when set, the configured level otherwise.
#[must_use]
pub fn env_filter(config: &LoggingConfig, debug: bool) -> EnvFilter {
    let level = config.effective_level(debug).as_directive();
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http={}", level, level)))
}

/// Installs the global subscriber.
///
/// # Errors
/// Returns error if a global subscriber is already installed.
pub fn init(config: &LoggingConfig, debug: bool) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter(config, debug));

    match config.format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .fmt_fields(JsonFields::new())
                    .event_format(SeverityJson),
            )
            .try_init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init(),
    }
}

/// JSON event format keyed `severity` and `message`.
///
/// Span fields must be recorded with [`JsonFields`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SeverityJson;

impl<S, N> FormatEvent<S, N> for SeverityJson
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let mut fields = FieldMap::default();
        event.record(&mut fields);

        let mut record = Map::new();
        record.insert(
            "time".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record.insert(
            "severity".to_string(),
            Value::String(metadata.level().as_str().to_string()),
        );
        record.insert(
            "message".to_string(),
            fields.0.remove("message").unwrap_or(Value::String(String::new())),
        );
        record.insert(
            "target".to_string(),
            Value::String(metadata.target().to_string()),
        );

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                let extensions = span.extensions();
                let Some(formatted) = extensions.get::<FormattedFields<N>>() else {
                    continue;
                };
                if let Ok(Value::Object(span_fields)) =
                    serde_json::from_str::<Value>(formatted.fields.as_str())
                {
                    record.extend(span_fields);
                }
            }
        }
        record.extend(fields.0);

        writeln!(writer, "{}", Value::Object(record))
    }
}

/// Event fields as JSON values.
#[derive(Default)]
struct FieldMap(Map<String, Value>);

impl FieldMap {
    fn insert(&mut self, field: &Field, value: Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl Visit for FieldMap {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::String(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::String(format!("{:?}", value)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::io;
    use std::sync::Arc;
    use tracing::{info, info_span, warn};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(emit: impl FnOnce()) -> Vec<Value> {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .fmt_fields(JsonFields::new())
                .event_format(SeverityJson)
                .with_writer(move || writer.clone()),
        );
        tracing::subscriber::with_default(subscriber, emit);

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_json_uses_severity_and_message_keys() {
        let records = capture(|| info!(symbol = "TSLA", count = 3u64, "ticker added"));

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["severity"], "INFO");
        assert_eq!(record["message"], "ticker added");
        assert_eq!(record["symbol"], "TSLA");
        assert_eq!(record["count"], 3);
        assert!(record.get("level").is_none());
        assert!(record.get("msg").is_none());
        assert!(record["time"].as_str().is_some_and(|t| t.ends_with('Z')));
    }

    #[test]
    fn test_json_flattens_span_fields() {
        let records = capture(|| {
            let span = info_span!("request", method = "GET", request_id = "r-1");
            let _entered = span.enter();
            warn!(code = "NOT_FOUND", "HTTP error");
        });

        let record = &records[0];
        assert_eq!(record["severity"], "WARN");
        assert_eq!(record["method"], "GET");
        assert_eq!(record["request_id"], "r-1");
        assert_eq!(record["code"], "NOT_FOUND");
    }

    #[test]
    fn test_event_fields_override_span_fields() {
        let records = capture(|| {
            let span = info_span!("outer", id = "span");
            let _entered = span.enter();
            info!(id = "event", "shadowed");
        });

        assert_eq!(records[0]["id"], "event");
    }
}
