//! Persistence sinks
//!
//! The engine hands every assignment, performance sample, processed event and
//! run log record to a [`SimulationSink`]. Sinks are fire-and-forget: a
//! failing sink is reported but never stops a run.

use super::{assignment::Assignment, error::SinkError, event::SimEvent, logging::LogRecord};
use crate::performance::PerformanceSample;
use serde::Serialize;
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receiver of the records a run produces
pub trait SimulationSink: Send {
    /// Store a newly created assignment
    fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), SinkError>;

    /// Store a newly computed performance sample
    fn persist_performance_sample(&mut self, sample: &PerformanceSample) -> Result<(), SinkError>;

    /// Store an event after it has been processed
    fn persist_event(&mut self, event: &SimEvent) -> Result<(), SinkError>;

    /// Store a run log record
    fn append_log(&mut self, record: &LogRecord) -> Result<(), SinkError>;

    /// Flush buffered records
    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Sink keeping every record in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    /// Stored assignments
    pub assignments: Vec<Assignment>,
    /// Stored performance samples
    pub samples: Vec<PerformanceSample>,
    /// Stored events
    pub events: Vec<SimEvent>,
    /// Stored log records
    pub log: Vec<LogRecord>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }
}

impl SimulationSink for MemorySink {
    fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), SinkError> {
        self.assignments.push(assignment.clone());
        Ok(())
    }

    fn persist_performance_sample(&mut self, sample: &PerformanceSample) -> Result<(), SinkError> {
        self.samples.push(sample.clone());
        Ok(())
    }

    fn persist_event(&mut self, event: &SimEvent) -> Result<(), SinkError> {
        self.events.push(event.clone());
        Ok(())
    }

    fn append_log(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.log.push(record.clone());
        Ok(())
    }
}

/// Sink discarding everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SimulationSink for NullSink {
    fn persist_assignment(&mut self, _assignment: &Assignment) -> Result<(), SinkError> {
        Ok(())
    }

    fn persist_performance_sample(&mut self, _sample: &PerformanceSample) -> Result<(), SinkError> {
        Ok(())
    }

    fn persist_event(&mut self, _event: &SimEvent) -> Result<(), SinkError> {
        Ok(())
    }

    fn append_log(&mut self, _record: &LogRecord) -> Result<(), SinkError> {
        Ok(())
    }
}

/// One line of a JSON-lines sink file
#[derive(Debug, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum JsonRecord<'a> {
    Assignment(&'a Assignment),
    PerformanceSample(&'a PerformanceSample),
    Event(&'a SimEvent),
    Log(&'a LogRecord),
}

/// Sink writing one JSON object per line
pub struct JsonLinesSink<W: Write + Send = BufWriter<File>> {
    writer: W,
    records: usize,
}

impl<W: Write + Send> fmt::Debug for JsonLinesSink<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonLinesSink").field("records", &self.records).finish()
    }
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create or truncate a file and write records to it
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Write records to any writer
    pub fn new(writer: W) -> Self {
        Self { writer, records: 0 }
    }

    /// Number of records written
    pub fn records(&self) -> usize {
        self.records
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_record(&mut self, record: JsonRecord<'_>) -> Result<(), SinkError> {
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.records += 1;
        Ok(())
    }
}

impl<W: Write + Send> SimulationSink for JsonLinesSink<W> {
    fn persist_assignment(&mut self, assignment: &Assignment) -> Result<(), SinkError> {
        self.write_record(JsonRecord::Assignment(assignment))
    }

    fn persist_performance_sample(&mut self, sample: &PerformanceSample) -> Result<(), SinkError> {
        self.write_record(JsonRecord::PerformanceSample(sample))
    }

    fn persist_event(&mut self, event: &SimEvent) -> Result<(), SinkError> {
        self.write_record(JsonRecord::Event(event))
    }

    fn append_log(&mut self, record: &LogRecord) -> Result<(), SinkError> {
        self.write_record(JsonRecord::Log(record))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssignmentId;

    fn sample_assignment() -> Assignment {
        Assignment {
            id: AssignmentId(1),
            operator: "OP1".into(),
            task: "T1".into(),
            machine: "M1".into(),
            start: 0.0,
            end: 20.0,
            duration: 20.0,
            performance: 0.5,
            in_progress: false,
            completed: false,
        }
    }

    #[test]
    fn test_memory_sink_keeps_records() {
        let mut sink = MemorySink::new();
        sink.persist_assignment(&sample_assignment()).unwrap();
        sink.append_log(&LogRecord::info("started", 0.0)).unwrap();

        assert_eq!(sink.assignments.len(), 1);
        assert_eq!(sink.log[0].message, "started");
    }

    #[test]
    fn test_json_lines_sink_writes_one_line_per_record() {
        let mut sink = JsonLinesSink::new(Vec::new());
        sink.persist_assignment(&sample_assignment()).unwrap();
        sink.append_log(&LogRecord::error("boom", 3.0)).unwrap();
        assert_eq!(sink.records(), 2);

        let output = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> =
            output.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["record"], "assignment");
        assert_eq!(lines[0]["task"], "T1");
        assert_eq!(lines[1]["record"], "log");
        assert_eq!(lines[1]["is_error"], true);
    }

    #[test]
    fn test_json_lines_sink_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut sink = JsonLinesSink::create(&path).unwrap();
        sink.append_log(&LogRecord::info("hello", 1.0)).unwrap();
        sink.flush().unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }
}
