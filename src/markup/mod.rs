//! Conversion between the document tree and the Markdown-subset dialect.
//!
//! - [`to_markup`]: tree to markup, a pure total function
//! - [`from_markup`]: markup to structured markup (editor HTML)
//!
//! The two directions are not exact inverses. Serializing a tree, reading
//! the markup back and serializing again reproduces the first markup string.

mod from_markup;
mod to_markup;

pub use from_markup::from_markup;
pub use to_markup::to_markup;

use crate::document::Document;

impl Document {
    /// Serialize to markup. See [`to_markup`].
    pub fn to_markup(&self) -> String {
        to_markup(self)
    }

    /// Read markup into a tree by way of structured markup.
    ///
    /// # Example
    ///
    /// ```
    /// use richmark::document::Document;
    ///
    /// let doc = Document::from_markup("# Title\n\nSome **bold** text");
    /// assert_eq!(doc.to_markup(), "# Title\n\nSome **bold** text");
    /// ```
    pub fn from_markup(text: &str) -> Self {
        Self::parse_html(&from_markup(text))
    }
}
