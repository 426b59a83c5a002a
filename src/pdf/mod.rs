pub mod document;
pub mod text;

pub use document::PdfDocument;
pub use text::{PageSource, PdfPages};
