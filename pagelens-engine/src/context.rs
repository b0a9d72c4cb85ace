use crate::document::Document;
use crate::fetch::FetchResult;
use crate::probes::AncillaryData;
use url::Url;

/// Everything an analyzer may consume: the parsed tree, the normalized page
/// URL, the raw response (bytes, headers, timing) and the joined ancillary
/// data. Shared immutably across all checks.
pub struct AnalyzeContext<'a> {
    pub doc: &'a Document,
    pub url: &'a Url,
    pub fetch: &'a FetchResult,
    pub ancillary: &'a AncillaryData,
}

impl<'a> AnalyzeContext<'a> {
    pub fn raw_html(&self) -> &str {
        &self.fetch.body
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.fetch.headers.get(name).map(String::as_str)
    }
}
