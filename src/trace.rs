use std::collections::VecDeque;
use std::fmt;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Debug,
    Warn,
}

/// Receives trace lines as they are produced. A browser host installs one
/// that writes to the console.
///
/// Debug lines only reach the sink while tracing is enabled. Warnings
/// always do.
pub trait TraceSink {
    fn emit(&mut self, level: TraceLevel, line: &str);
}

/// Bounded log of controller decisions. Every line also goes to `tracing`,
/// whether or not the buffer is enabled.
pub(crate) struct TraceLog {
    enabled: bool,
    to_stderr: bool,
    lines: VecDeque<String>,
    limit: usize,
    sink: Option<Box<dyn TraceSink>>,
}

impl fmt::Debug for TraceLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceLog")
            .field("enabled", &self.enabled)
            .field("to_stderr", &self.to_stderr)
            .field("lines", &self.lines.len())
            .field("limit", &self.limit)
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

impl TraceLog {
    pub(crate) fn new(enabled: bool, limit: usize) -> Self {
        Self {
            enabled,
            to_stderr: false,
            lines: VecDeque::new(),
            limit: limit.max(1),
            sink: None,
        }
    }

    pub(crate) fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub(crate) fn set_stderr(&mut self, enabled: bool) {
        self.to_stderr = enabled;
    }

    pub(crate) fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = Some(sink);
    }

    pub(crate) fn set_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::InvalidConfig(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.limit = max_entries;
        while self.lines.len() > self.limit {
            self.lines.pop_front();
        }
        Ok(())
    }

    pub(crate) fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines).into()
    }

    pub(crate) fn debug(&mut self, line: String) {
        tracing::debug!(target: "site_interactions", "{line}");
        if !self.enabled {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(TraceLevel::Debug, &line);
        }
        self.record(line);
    }

    pub(crate) fn warn(&mut self, line: String) {
        tracing::warn!(target: "site_interactions", "{line}");
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(TraceLevel::Warn, &line);
        }
        if self.enabled {
            self.record(format!("[warn] {line}"));
        }
    }

    fn record(&mut self, line: String) {
        if self.to_stderr {
            eprintln!("{line}");
        }
        if self.lines.len() >= self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Default, Clone)]
    struct Captured(Rc<RefCell<Vec<(TraceLevel, String)>>>);

    impl TraceSink for Captured {
        fn emit(&mut self, level: TraceLevel, line: &str) {
            self.0.borrow_mut().push((level, line.to_string()));
        }
    }

    #[test]
    fn disabled_log_records_nothing() {
        let mut log = TraceLog::new(false, 10);
        log.debug("[menu] open".into());
        assert!(log.take().is_empty());
    }

    #[test]
    fn sink_gets_warnings_even_when_disabled() {
        let captured = Captured::default();
        let mut log = TraceLog::new(false, 10);
        log.set_sink(Box::new(captured.clone()));
        log.debug("[menu] open".into());
        log.warn("[header] failed".into());
        assert!(log.take().is_empty());

        log.set_enabled(true);
        log.debug("[menu] close".into());
        assert_eq!(
            *captured.0.borrow(),
            vec![
                (TraceLevel::Warn, "[header] failed".to_string()),
                (TraceLevel::Debug, "[menu] close".to_string()),
            ]
        );
        assert_eq!(log.take(), vec!["[menu] close".to_string()]);
    }

    #[test]
    fn limit_drops_oldest_lines() -> Result<()> {
        let mut log = TraceLog::new(true, 10);
        for idx in 0..5 {
            log.debug(format!("line {idx}"));
        }
        log.set_limit(2)?;
        assert_eq!(log.take(), vec!["line 3".to_string(), "line 4".to_string()]);
        log.debug("a".into());
        log.warn("b".into());
        log.debug("c".into());
        assert_eq!(log.take(), vec!["[warn] b".to_string(), "c".to_string()]);
        assert!(log.set_limit(0).is_err());
        Ok(())
    }
}
