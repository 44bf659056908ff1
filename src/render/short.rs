//! Short summary: at most two lines describing the most informative hits

use crate::config::Thresholds;
use crate::hits::Hit;

use super::{to_fixed, Links};

/// Hits picked for the summary
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Selection<'a> {
    /// First well-covered hit above the close-identity threshold
    pub close: Option<&'a Hit>,
    /// First useful hit found while the close hit was missing or not useful
    pub phenotype: Option<&'a Hit>,
}

impl<'a> Selection<'a> {
    pub fn hits(&self) -> impl Iterator<Item = &'a Hit> {
        self.close.into_iter().chain(self.phenotype)
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_none() && self.phenotype.is_none()
    }
}

/// Scan hits in server order and stop as soon as the summary is decided.
///
/// A close hit that is also useful ends the scan on its own. Otherwise the
/// first useful hit seen afterwards (or before any close hit) is taken, even
/// if a later hit would be closer or stronger.
pub fn select<'a>(hits: &'a [Hit], thresholds: &Thresholds) -> Selection<'a> {
    let mut selection = Selection::default();

    for hit in hits {
        if !hit.has_coverage(thresholds) {
            continue;
        }
        let useful = hit.is_useful(thresholds);
        if selection.close.is_none() && hit.is_close(thresholds) {
            selection.close = Some(hit);
            if useful {
                break;
            }
        } else if useful {
            selection.phenotype = Some(hit);
            break;
        }
    }

    selection
}

/// One summary line for a hit
pub fn describe(hit: &Hit, links: &Links, thresholds: &Thresholds) -> String {
    let significance = hit.significance(thresholds);
    let mut phrase = match &hit.fitness {
        Some(fitness) => format!(
            "<A TITLE=\"fitness {} to {}\" HREF=\"{}\">{}</A>",
            to_fixed(fitness.min, 1),
            to_fixed(fitness.max, 1),
            links.fitness_url(hit),
            significance
        ),
        None => significance.to_string(),
    };

    if let Some(cofit) = hit.max_cofit.filter(|_| hit.has_cofit(thresholds)) {
        phrase.push_str(&format!(
            ", <A TITLE=\"top cofitness {}\" HREF=\"{}\">cofit</A>",
            to_fixed(cofit, 2),
            links.cofit_url(hit)
        ));
    }

    format!(
        "{}% id. to {} from {}: {}",
        to_fixed(hit.identity, 0),
        links.locus_link(hit),
        hit.organism,
        phrase
    )
}

/// Render the summary lines followed by a link to the full results
pub fn render(hits: &[Hit], sequence: &str, links: &Links, thresholds: &Thresholds) -> String {
    let selection = select(hits, thresholds);

    let lines: Vec<String> = if selection.is_empty() {
        vec!["No hits with phenotypes".to_string()]
    } else {
        selection
            .hits()
            .map(|hit| describe(hit, links, thresholds))
            .collect()
    };

    format!(
        "{} (<A HREF='{}' TITLE='View more hits'>more</A>)",
        lines.join("<BR>"),
        links.detail_url(sequence)
    )
}
