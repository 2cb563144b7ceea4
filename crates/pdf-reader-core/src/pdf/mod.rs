mod document;
mod text;

pub use document::PdfDocument;
pub use text::{FragmentSource, TextExtractor};
