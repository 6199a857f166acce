use tracing::info;

/// Destination of attached command output, one line at a time.
pub trait OutputSink: Send + Sync + 'static {
    fn line(&self, service: &str, line: &str);
}

/// Writes every line to the scheduler log under target `csched.exec.output`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, service: &str, line: &str) {
        info!(target: "csched.exec.output", service, "{line}");
    }
}

/// Splits a chunked byte stream into lines.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8], mut emit: impl FnMut(&str)) {
        self.pending.extend_from_slice(chunk);
        while let Some(at) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=at).collect();
            emit(trim_eol(&String::from_utf8_lossy(&line)));
        }
    }

    pub(crate) fn flush(&mut self, mut emit: impl FnMut(&str)) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            emit(trim_eol(&String::from_utf8_lossy(&rest)));
        }
    }
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
