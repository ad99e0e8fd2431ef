//! Sink that writes one JSON object per event.
//!
//! Output format (one line each):
//!
//! ```text
//! {"ts":"2026-01-01T00:00:00Z","event":"chart","chart":{...}}
//! {"ts":"2026-01-01T00:00:01Z","event":"update","chart_id":"system.load","samples":[...]}
//! ```

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::warn;

use super::{ChartDef, MetricSink, Sample};

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum Record<'a> {
    Chart {
        ts: String,
        chart: &'a ChartDef,
    },
    Update {
        ts: String,
        chart_id: &'a str,
        samples: &'a [Sample],
    },
}

/// JSON-lines sink over any writer (stdout, a file, a socket).
///
/// Write errors are logged and counted, never returned to the sampler.
pub struct JsonLinesSink<W: Write> {
    out: W,
    write_errors: u64,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            write_errors: 0,
        }
    }

    /// Number of events that could not be written.
    pub fn write_errors(&self) -> u64 {
        self.write_errors
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> std::io::Result<()> {
        self.out.flush()
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_record(&mut self, record: &Record<'_>) {
        let result = serde_json::to_writer(&mut self.out, record)
            .map_err(std::io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(e) = result {
            self.write_errors += 1;
            // Log once per sink.
            if self.write_errors == 1 {
                warn!(error = %e, "failed to write metrics record");
            }
        }
    }
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

impl<W: Write> MetricSink for JsonLinesSink<W> {
    fn create_chart(&mut self, chart: &ChartDef) {
        self.write_record(&Record::Chart { ts: now(), chart });
    }

    fn update(&mut self, chart_id: &str, samples: &[Sample]) {
        self.write_record(&Record::Update {
            ts: now(),
            chart_id,
            samples,
        });
    }
}
