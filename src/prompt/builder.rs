use std::fmt;

/// One labeled input interpolated after the instruction block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSegment {
    pub label: String,
    pub text: String,
}

impl PromptSegment {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Instructions plus ordered segments, bounded by `size_limit` characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSpec {
    pub instructions: String,
    pub segments: Vec<PromptSegment>,
    pub size_limit: usize,
}

impl PromptSpec {
    pub fn new(instructions: impl Into<String>, size_limit: usize) -> Self {
        Self {
            instructions: instructions.into(),
            segments: Vec::new(),
            size_limit,
        }
    }

    pub fn with_segment(mut self, label: impl Into<String>, text: impl Into<String>) -> Self {
        self.segments.push(PromptSegment::new(label, text));
        self
    }

    /// Renders the prompt, failing if it is longer than `size_limit`.
    pub fn render(&self) -> Result<String, OversizeError> {
        PromptBuilder::new(self.size_limit).build(&self.instructions, &self.segments)
    }
}

/// Character count of one rendered input, reported on overflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentSize {
    pub label: String,
    pub chars: usize,
}

/// The rendered prompt is longer than the configured limit.
///
/// Carries every segment's size so the caller can decide what to truncate,
/// chunk or reject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OversizeError {
    pub limit: usize,
    pub rendered_chars: usize,
    pub instructions_chars: usize,
    pub segments: Vec<SegmentSize>,
}

impl fmt::Display for OversizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Prompt is {} characters, limit is {} (instructions: {}",
            self.rendered_chars, self.limit, self.instructions_chars
        )?;
        for segment in &self.segments {
            write!(f, ", {}: {}", segment.label, segment.chars)?;
        }
        write!(f, ")")
    }
}

impl std::error::Error for OversizeError {}

/// Renders instruction blocks and labeled segments into a single prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    size_limit: usize,
}

impl PromptBuilder {
    pub fn new(size_limit: usize) -> Self {
        Self { size_limit }
    }

    pub fn size_limit(&self) -> usize {
        self.size_limit
    }

    /// Instructions first, then each segment in order as `label:` followed by
    /// its text on the next line. Segments are separated by a blank line.
    pub fn build(
        &self,
        instructions: &str,
        segments: &[PromptSegment],
    ) -> Result<String, OversizeError> {
        let capacity = instructions.len()
            + segments
                .iter()
                .map(|s| s.label.len() + s.text.len() + 4)
                .sum::<usize>()
            + 1;
        let mut prompt = String::with_capacity(capacity);

        prompt.push_str(instructions.trim_end());
        for segment in segments {
            prompt.push_str("\n\n");
            prompt.push_str(&segment.label);
            prompt.push_str(":\n");
            prompt.push_str(&segment.text);
        }
        prompt.push('\n');

        let rendered_chars = prompt.chars().count();
        if rendered_chars > self.size_limit {
            return Err(OversizeError {
                limit: self.size_limit,
                rendered_chars,
                instructions_chars: instructions.chars().count(),
                segments: segments
                    .iter()
                    .map(|s| SegmentSize {
                        label: s.label.clone(),
                        chars: s.text.chars().count(),
                    })
                    .collect(),
            });
        }

        Ok(prompt)
    }
}
