//! Rendering options and configuration.

/// Options for the native page renderings.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Maximum heading level (1-6)
    pub max_heading_level: u8,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters
    pub escape_special_chars: bool,

    /// Markdown emitted in place of a picture
    pub image_placeholder: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Set the picture placeholder.
    pub fn with_image_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.image_placeholder = placeholder.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_heading_level: 6,
            list_marker: '-',
            escape_special_chars: true,
            image_placeholder: "<!-- image -->".to_string(),
        }
    }
}
