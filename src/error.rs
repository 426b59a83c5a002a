use thiserror::Error;

/// Errors raised while attaching page text to parsed sections.
#[derive(Error, Debug)]
pub enum SectionError {
    /// A section bound is not an integer page number
    #[error("Malformed page range for section '{name}': start={start:?}, end={end:?}")]
    MalformedPageRange {
        name: String,
        start: String,
        end: String,
    },

    /// The page provider could not produce text for a section
    #[error("Failed to extract pages {start}..{end} for section '{name}'")]
    PageExtractionFailed {
        name: String,
        start: usize,
        end: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}
