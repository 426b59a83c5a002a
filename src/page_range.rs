use anyhow::{anyhow, bail, Result};

/// One page bound as typed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRef {
    Number(u32),
    End,
}

impl PageRef {
    fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("end") {
            return Ok(PageRef::End);
        }
        s.parse::<u32>()
            .map(PageRef::Number)
            .map_err(|_| anyhow!("Invalid page number: {}", s))
    }

    fn resolve(self, total_pages: u32) -> u32 {
        match self {
            PageRef::Number(n) => n,
            PageRef::End => total_pages,
        }
    }
}

/// An inclusive, ascending run of 1-based pages such as "3-25" or "40-end".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpan {
    pub first: PageRef,
    pub last: PageRef,
}

impl PageSpan {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            bail!("Empty page range");
        }

        match s.split_once('-') {
            Some(("", _)) => bail!("Invalid page range: {}", s),
            Some((first, last)) => Ok(PageSpan {
                first: PageRef::parse(first)?,
                last: PageRef::parse(last)?,
            }),
            None => {
                let page = PageRef::parse(s)?;
                Ok(PageSpan {
                    first: page,
                    last: page,
                })
            }
        }
    }

    /// Page numbers covered by this span, checked against the document length
    pub fn expand(&self, total_pages: u32) -> Result<Vec<u32>> {
        let first = self.first.resolve(total_pages);
        let last = self.last.resolve(total_pages);

        if first == 0 || last == 0 {
            bail!("Page numbers must be >= 1");
        }
        if last > total_pages {
            bail!("Page {} exceeds total pages {}", last, total_pages);
        }
        if first > last {
            bail!("Page range {}-{} runs backwards", first, last);
        }

        Ok((first..=last).collect())
    }
}

/// Expand a comma-separated list like "3-5,7,40-end" into 1-based page numbers
pub fn expand_page_ranges(s: &str, total_pages: u32) -> Result<Vec<u32>> {
    let mut pages = Vec::new();
    for part in s.split(',') {
        pages.extend(PageSpan::parse(part)?.expand(total_pages)?);
    }
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        let span = PageSpan::parse("5").unwrap();
        assert_eq!(span.first, PageRef::Number(5));
        assert_eq!(span.expand(10).unwrap(), vec![5]);
    }

    #[test]
    fn test_toc_span() {
        let span = PageSpan::parse("3-6").unwrap();
        assert_eq!(span.expand(30).unwrap(), vec![3, 4, 5, 6]);
    }

    #[test]
    fn test_end_keyword() {
        assert_eq!(expand_page_ranges("8-END", 10).unwrap(), vec![8, 9, 10]);
    }

    #[test]
    fn test_comma_separated() {
        assert_eq!(
            expand_page_ranges("1-3, 7,9-10", 10).unwrap(),
            vec![1, 2, 3, 7, 9, 10]
        );
    }

    #[test]
    fn test_backwards_span_rejected() {
        assert!(expand_page_ranges("5-1", 10).is_err());
    }

    #[test]
    fn test_invalid_pages() {
        assert!(expand_page_ranges("0", 10).is_err());
        assert!(expand_page_ranges("15", 10).is_err());
        assert!(expand_page_ranges("-5", 10).is_err());
        assert!(expand_page_ranges("", 10).is_err());
        assert!(expand_page_ranges("two", 10).is_err());
    }
}
