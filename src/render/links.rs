//! Link targets on the fitness browser

use crate::hits::Hit;

/// Builds detail-page URLs relative to the fitness browser root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    server_root: String,
    detail_query_limit: usize,
}

impl Links {
    pub fn new(server_root: impl Into<String>, detail_query_limit: usize) -> Self {
        Self {
            server_root: server_root.into(),
            detail_query_limit,
        }
    }

    /// Endpoint that runs the search itself
    pub fn search_url(&self) -> String {
        format!("{}cgi-bin/seqservice.cgi", self.server_root)
    }

    pub fn fitness_url(&self, hit: &Hit) -> String {
        format!(
            "{}cgi-bin/singleFit.cgi?orgId={}&locusId={}",
            self.server_root, hit.org_id, hit.locus_id
        )
    }

    pub fn cofit_url(&self, hit: &Hit) -> String {
        format!(
            "{}cgi-bin/cofit.cgi?orgId={}&locusId={}",
            self.server_root, hit.org_id, hit.locus_id
        )
    }

    /// Full search page for the query. Only the first `detail_query_limit`
    /// characters go into the link, to stay under URL length limits.
    pub fn detail_url(&self, sequence: &str) -> String {
        let query: String = sequence.chars().take(self.detail_query_limit).collect();
        format!("{}cgi-bin/mySeqSearch.cgi?query={}", self.server_root, query)
    }

    /// Gene display name linked to its fitness page
    pub fn locus_link(&self, hit: &Hit) -> String {
        format!(
            "<A HREF=\"{}\">{}</A>",
            self.fitness_url(hit),
            hit.display_name()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hits::tests::hit;

    #[test]
    fn test_urls() {
        let links = Links::new("https://fit.genomics.lbl.gov/", 8000);
        let h = hit("b2451", 90.0, 1.0);
        assert_eq!(links.search_url(), "https://fit.genomics.lbl.gov/cgi-bin/seqservice.cgi");
        assert_eq!(
            links.fitness_url(&h),
            "https://fit.genomics.lbl.gov/cgi-bin/singleFit.cgi?orgId=Keio&locusId=b2451"
        );
        assert_eq!(
            links.cofit_url(&h),
            "https://fit.genomics.lbl.gov/cgi-bin/cofit.cgi?orgId=Keio&locusId=b2451"
        );
        assert_eq!(
            links.locus_link(&h),
            "<A HREF=\"https://fit.genomics.lbl.gov/cgi-bin/singleFit.cgi?orgId=Keio&locusId=b2451\">b2451</A>"
        );
    }

    #[test]
    fn test_detail_url_is_capped() {
        let links = Links::new("/", 8000);
        let sequence = "M".repeat(9000);
        let url = links.detail_url(&sequence);
        let query = url.strip_prefix("/cgi-bin/mySeqSearch.cgi?query=").unwrap();
        assert_eq!(query.len(), 8000);

        let short = Links::new("/", 3).detail_url("MKTAYIA");
        assert_eq!(short, "/cgi-bin/mySeqSearch.cgi?query=MKT");
    }
}
