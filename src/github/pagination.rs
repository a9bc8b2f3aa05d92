//! `Link` header parsing for paginated GitHub listings
use url::Url;

/// Page cursors advertised by a response
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageLinks {
    /// Next page to request, `None` on the last page
    pub next: Option<u32>,

    /// Last page of the listing
    pub last: Option<u32>,
}

impl PageLinks {
    /// Parse a `Link` header such as
    /// `<https://api.github.com/user/repos?page=2>; rel="next", <...?page=5>; rel="last"`.
    pub(crate) fn parse(header: &str) -> Self {
        let mut links = PageLinks::default();
        for entry in header.split(',') {
            let mut parts = entry.split(';');
            let Some(target) = parts.next() else {
                continue;
            };
            let target = target.trim().trim_start_matches('<').trim_end_matches('>');
            let Some(page) = page_param(target) else {
                continue;
            };
            for param in parts {
                match param.trim() {
                    "rel=\"next\"" | "rel=next" => links.next = Some(page),
                    "rel=\"last\"" | "rel=last" => links.last = Some(page),
                    _ => {}
                }
            }
        }
        links
    }

    /// Total page count to show while downloading `current`.
    pub(crate) fn total(&self, current: u32) -> u32 {
        self.last.unwrap_or(current).max(current)
    }
}

/// The `page` query parameter of `target`
fn page_param(target: &str) -> Option<u32> {
    let url = Url::parse(target).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == "page")
        .and_then(|(_, value)| value.parse().ok())
}
