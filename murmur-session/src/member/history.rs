/// Append-only list of chat lines shown to a member. Kept in memory only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageHistory {
    lines: Vec<String>,
}

impl MessageHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
