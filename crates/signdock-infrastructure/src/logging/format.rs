use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{format::Writer, FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// One-line JSON records for the log file.
pub(super) struct JsonFormatter {
    pid: u32,
    version: &'static str,
}

impl JsonFormatter {
    pub(super) fn new(version: &'static str) -> Self {
        Self {
            pid: std::process::id(),
            version,
        }
    }

    pub(super) fn render(
        &self,
        level: &Level,
        target: &str,
        file: Option<&str>,
        line: Option<u32>,
        fields: FieldMap,
    ) -> serde_json::Value {
        let thread = std::thread::current();
        let mut fields = fields.0;

        let mut record = serde_json::json!({
            "timestamp": chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string(),
            "level": level.to_string(),
            "pid": self.pid,
            "tid": format!("{:?}", thread.id()),
            "thread_name": thread.name().unwrap_or("unnamed"),
            "target": target,
            "version": self.version,
        });

        if let Some(file) = file {
            record["file"] = serde_json::json!(file);
        }
        if let Some(line) = line {
            record["line"] = serde_json::json!(line);
        }
        if let Some(message) = fields.remove("message") {
            record["message"] = message;
        }
        if !fields.is_empty() {
            record["fields"] = serde_json::Value::Object(fields);
        }

        record
    }
}

impl<S, N> FormatEvent<S, N> for JsonFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut fields = FieldMap::default();
        event.record(&mut fields);

        let record = self.render(
            metadata.level(),
            metadata.target(),
            metadata.file(),
            metadata.line(),
            fields,
        );

        writeln!(writer, "{}", serde_json::to_string(&record).unwrap_or_default())
    }
}

/// `2025-01-09 10:32:15.123 [INFO] (target) pid=1 tid=ThreadId(7) k=v - message (src/x.rs:12)`
pub(super) struct HumanReadableFormatter {
    pid: u32,
}

impl HumanReadableFormatter {
    pub(super) fn new() -> Self {
        Self {
            pid: std::process::id(),
        }
    }
}

impl<S, N> FormatEvent<S, N> for HumanReadableFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();

        let level = match *metadata.level() {
            Level::ERROR => "\x1b[31mERROR\x1b[0m",
            Level::WARN => "\x1b[33mWARN\x1b[0m",
            Level::INFO => "\x1b[32mINFO\x1b[0m",
            Level::DEBUG => "\x1b[36mDEBUG\x1b[0m",
            Level::TRACE => "\x1b[35mTRACE\x1b[0m",
        };

        let mut fields = FieldMap::default();
        event.record(&mut fields);
        let mut fields = fields.0;

        let message = fields
            .remove("message")
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        let extra: String = fields
            .iter()
            .map(|(k, v)| format!(" {}={}", k, v))
            .collect();

        let location = match (metadata.file(), metadata.line()) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };

        writeln!(
            writer,
            "{} [{}] ({}) pid={} tid={:?}{} - {}{}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            level,
            metadata.target(),
            self.pid,
            std::thread::current().id(),
            extra,
            message,
            location
        )
    }
}

/// Collects event fields as JSON values.
#[derive(Default)]
pub(super) struct FieldMap(serde_json::Map<String, serde_json::Value>);

impl FieldMap {
    fn insert(&mut self, field: &tracing::field::Field, value: serde_json::Value) {
        self.0.insert(field.name().to_string(), value);
    }
}

impl tracing::field::Visit for FieldMap {
    fn record_f64(&mut self, field: &tracing::field::Field, value: f64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_i64(&mut self, field: &tracing::field::Field, value: i64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_bool(&mut self, field: &tracing::field::Field, value: bool) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.insert(field, serde_json::json!(value));
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.insert(field, serde_json::json!(format!("{:?}", value)));
    }
}
