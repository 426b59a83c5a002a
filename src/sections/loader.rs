use super::Section;
use crate::error::SectionError;

/// Attach the body text of each section.
///
/// `provider(start, end)` returns the text of the zero-based pages
/// `start..end`. The first failure is returned as is, nothing is retried.
pub fn load_contents<F, E>(
    sections: Vec<Section>,
    mut provider: F,
) -> Result<Vec<Section>, SectionError>
where
    F: FnMut(usize, usize) -> Result<String, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync + 'static>>,
{
    let mut loaded = Vec::with_capacity(sections.len());

    for mut section in sections {
        let (start, end) = page_bounds(&section)?;
        match provider(start, end) {
            Ok(text) => section.content = text,
            Err(e) => {
                return Err(SectionError::PageExtractionFailed {
                    name: section.name,
                    start,
                    end,
                    source: e.into(),
                });
            }
        }
        loaded.push(section);
    }

    Ok(loaded)
}

fn page_bounds(section: &Section) -> Result<(usize, usize), SectionError> {
    let malformed = || SectionError::MalformedPageRange {
        name: section.name.clone(),
        start: section.start.clone(),
        end: section.end.clone(),
    };

    let start = section.start.trim().parse::<usize>().map_err(|_| malformed())?;
    let end = section.end.trim().parse::<usize>().map_err(|_| malformed())?;
    Ok((start, end))
}
