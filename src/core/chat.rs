//! Chat lines as forwarded by the browser's Twitch client.
//!
//! The browser sends `"<display-name>: <message>"` as one raw frame. The
//! relay never changes the frame; it only splits it to log who is talking.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLine {
    pub display_name: String,
    pub text: String,
}

impl ChatLine {
    pub fn new(display_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            text: text.into(),
        }
    }

    /// Renders the frame the browser sends for this line.
    #[cfg(test)]
    pub fn to_prompt(&self) -> String {
        format!("{}: {}", self.display_name, self.text)
    }

    /// Splits a frame on its first `": "`. Returns `None` for frames that
    /// were typed into the UI directly and carry no speaker.
    pub fn parse(frame: &str) -> Option<Self> {
        let (name, text) = frame.split_once(": ")?;
        let name = name.trim();
        // Twitch display names never contain spaces.
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }
        Some(Self::new(name, text))
    }
}
