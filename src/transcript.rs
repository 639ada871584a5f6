//! Accumulates speech-recognition results for one attempt.
//!
//! Final results are appended; interim results replace each other and are
//! shown but never scored.

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptBuffer {
    final_text: String,
    interim: String,
}

impl TranscriptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str, is_final: bool) {
        let text = text.trim();
        if !is_final {
            self.interim = text.to_string();
            return;
        }
        self.interim.clear();
        if text.is_empty() {
            return;
        }
        if !self.final_text.is_empty() {
            self.final_text.push(' ');
        }
        self.final_text.push_str(text);
    }

    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    pub fn is_empty(&self) -> bool {
        self.final_text.is_empty() && self.interim.is_empty()
    }

    pub fn reset(&mut self) {
        self.final_text.clear();
        self.interim.clear();
    }
}
