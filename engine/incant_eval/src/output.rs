//! Ordered print output for one invocation.

/// Collects PRINT output in statement order.
///
/// Segments are concatenated without a separator when the invocation
/// succeeds; a failed invocation discards the whole buffer.
#[derive(Default)]
pub struct OutputBuffer {
    segments: Vec<String>,
}

impl OutputBuffer {
    pub fn new() -> Self {
        OutputBuffer::default()
    }

    pub fn push(&mut self, segment: String) {
        self.segments.push(segment);
    }

    /// Whether any PRINT ran.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Flatten the buffer to the final output string.
    pub fn finish(self) -> String {
        self.segments.concat()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn segments_concatenate_without_separator() {
        let mut out = OutputBuffer::new();
        out.push("Hello ".to_string());
        out.push("world".to_string());
        assert_eq!(out.finish(), "Hello world");
    }

    #[test]
    fn empty_buffer_reports_no_output() {
        let out = OutputBuffer::new();
        assert!(out.is_empty());
        assert_eq!(out.finish(), "");
    }
}
