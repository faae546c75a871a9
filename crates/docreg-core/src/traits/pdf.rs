//! PDF rendering backend trait.

use bytes::Bytes;

use crate::result::AppResult;
use crate::types::content::RenderedContent;

/// Turns rendered template content into PDF bytes.
///
/// Rendering is synchronous and CPU-bound; async callers are expected to
/// run it on a blocking thread.
pub trait PdfRenderer: Send + Sync + std::fmt::Debug + 'static {
    /// Return the backend name (e.g., "genpdf").
    fn backend(&self) -> &str;

    /// Compose a PDF from a filled layout or from a markup body.
    fn render(&self, content: &RenderedContent) -> AppResult<Bytes>;
}
