//! Page-level types.

use super::ImageData;
use serde::{Deserialize, Serialize};

/// A single page in the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,

    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,

    /// Page height in points
    pub height: f32,

    /// Rendered page image, when the parser produced one
    #[serde(default)]
    pub image: Option<ImageData>,
}

impl Page {
    /// Create a new page with standard Letter size (8.5 x 11 inches).
    pub fn new(number: u32) -> Self {
        Self::with_size(number, 612.0, 792.0)
    }

    /// Create a new page with the given dimensions.
    pub fn with_size(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            image: None,
        }
    }

    /// Attach a rendered page image.
    pub fn with_image(mut self, image: ImageData) -> Self {
        self.image = Some(image);
        self
    }

    /// Check if the page is in landscape orientation.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_new() {
        let page = Page::new(1);
        assert_eq!(page.number, 1);
        assert_eq!(page.width, 612.0);
        assert!(!page.is_landscape());
        assert!(page.image.is_none());
    }
}
