//! Report sink for human-readable dispatch output.

/// Destination for messages produced while dispatching events.
///
/// Reporting is fire-and-forget; the dispatcher never inspects the outcome.
pub trait ReportSink: Send + Sync {
    fn report(&self, message: &str);
}

/// Sink that forwards every message to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn report(&self, message: &str) {
        tracing::info!(target: "arrival_monitor::report", "{}", message);
    }
}

impl<F> ReportSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) {
        self(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_closure_sink() {
        let messages = Mutex::new(Vec::new());
        let sink = |message: &str| messages.lock().push(message.to_string());

        sink.report("one");
        ReportSink::report(&sink, "two");
        assert_eq!(*messages.lock(), vec!["one", "two"]);
    }

    #[test]
    fn test_tracing_sink_accepts_messages() {
        TracingSink.report("Toaster fired a device arrival event");
    }
}
