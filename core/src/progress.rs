use log::info;

/// Narrow capability for human-readable status output. The formatter
/// never consumes anything back from the sink; any implementation
/// (null, buffered, streaming) satisfies it.
pub trait ProgressSink {
    fn status(&mut self, msg: &str);
}

/// Discards all status text.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn status(&mut self, _msg: &str) {}
}

/// Forwards status text to the `log` facade at info level.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn status(&mut self, msg: &str) {
        info!("{}", msg);
    }
}

/// Collects status lines in memory, mainly for tests.
#[derive(Default)]
pub struct BufferedProgress {
    pub lines: Vec<String>,
}

impl ProgressSink for BufferedProgress {
    fn status(&mut self, msg: &str) {
        self.lines.push(msg.to_string());
    }
}
