//! Full results table

use crate::config::Thresholds;
use crate::hits::{Fitness, Hit};

use super::{to_fixed, Links};

pub const COLUMNS: [&str; 6] = ["Identity", "Organism", "Locus", "Description", "Fitness", "Cofit"];

const STRONG: &str = "#0000FF";
const NEUTRAL: &str = "#666666";
const MODERATE_LOW: &str = "#7777FF";
const MODERATE_HIGH: &str = "#AAAA00";

/// Colored "low to high" fitness range
fn fitness_range(fitness: &Fitness, thresholds: &Thresholds) -> String {
    let color_low = if fitness.min < -thresholds.min_abs_strong {
        STRONG
    } else if fitness.min < -thresholds.min_abs_fit {
        MODERATE_LOW
    } else {
        NEUTRAL
    };
    let color_high = if fitness.max > thresholds.min_abs_strong {
        STRONG
    } else if fitness.max > thresholds.min_abs_fit {
        MODERATE_HIGH
    } else {
        NEUTRAL
    };

    format!(
        "<span style=\"color:{}\">{}</span><span style=\"color:{}\"> <small>to</small> </span><span style=\"color:{}\">{}</span>",
        color_low,
        to_fixed(fitness.min, 1),
        NEUTRAL,
        color_high,
        to_fixed(fitness.max, 1)
    )
}

/// Cell contents for one hit, in `COLUMNS` order
pub fn cells(hit: &Hit, links: &Links, thresholds: &Thresholds) -> [String; 6] {
    let fitness = match &hit.fitness {
        None => "No data".to_string(),
        Some(f) if hit.is_useful(thresholds) => format!("<b>{}</b>", fitness_range(f, thresholds)),
        Some(f) => fitness_range(f, thresholds),
    };

    let cofit = match hit.max_cofit.filter(|_| hit.has_cofit(thresholds)) {
        Some(c) => format!("<A HREF=\"{}\">{}</A>", links.cofit_url(hit), to_fixed(c, 2)),
        None => String::new(),
    };

    [
        format!("{}%", hit.identity_text),
        hit.organism.clone(),
        links.locus_link(hit),
        format!("<small>{}</small>", hit.description),
        fitness,
        format!("&nbsp; {}", cofit),
    ]
}

/// Render every well-covered hit as a table row
pub fn render(hits: &[Hit], links: &Links, thresholds: &Thresholds) -> String {
    let kept: Vec<&Hit> = hits.iter().filter(|h| h.has_coverage(thresholds)).collect();
    if kept.is_empty() {
        return "No hits with high coverage".to_string();
    }

    let mut html = String::from("<table class=\"fitblast\"><thead><tr>");
    for column in COLUMNS {
        html.push_str(&format!("<th>{}</th>", column));
    }
    html.push_str("</tr></thead><tbody>");

    for hit in kept {
        html.push_str("<tr>");
        for cell in cells(hit, links, thresholds) {
            html.push_str(&format!("<td>{}</td>", cell));
        }
        html.push_str("</tr>");
    }

    html.push_str("</tbody></table>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hits::tests::{hit, with_fitness};

    fn links() -> Links {
        Links::new("http://fit/", 8000)
    }

    #[test]
    fn test_no_high_coverage_hits() {
        let t = Thresholds::default();
        assert_eq!(render(&[], &links(), &t), "No hits with high coverage");

        let hits = vec![hit("a", 99.0, 0.5), hit("b", 90.0, 0.7499)];
        assert_eq!(render(&hits, &links(), &t), "No hits with high coverage");
    }

    #[test]
    fn test_low_coverage_rows_are_dropped() {
        let t = Thresholds::default();
        let hits = vec![hit("kept", 50.0, 0.75), hit("dropped", 99.0, 0.2)];
        let html = render(&hits, &links(), &t);
        assert!(html.contains("locusId=kept"));
        assert!(!html.contains("dropped"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_header_order() {
        let t = Thresholds::default();
        let html = render(&[hit("a", 99.0, 1.0)], &links(), &t);
        assert!(html.starts_with(
            "<table class=\"fitblast\"><thead><tr><th>Identity</th><th>Organism</th><th>Locus</th>\
             <th>Description</th><th>Fitness</th><th>Cofit</th></tr></thead><tbody>"
        ));
        assert!(html.ends_with("</tbody></table>"));
    }

    #[test]
    fn test_cells_without_data() {
        let t = Thresholds::default();
        let mut h = hit("b2451", 98.5, 1.0);
        h.max_cofit = Some(0.6);
        let cells = cells(&h, &links(), &t);
        assert_eq!(cells[0], "98.5%");
        assert_eq!(cells[1], "Escherichia coli BW25113");
        assert_eq!(cells[3], "<small>hypothetical protein</small>");
        assert_eq!(cells[4], "No data");
        assert_eq!(cells[5], "&nbsp; ");
    }

    #[test]
    fn test_fitness_colors_and_bold() {
        let t = Thresholds::default();
        let mut h = with_fitness(hit("b2451", 100.0, 1.0), -2.54, 1.26, -12.0, 3.0);
        h.max_cofit = Some(0.834);
        let cells = cells(&h, &links(), &t);

        assert_eq!(cells[0], "100%");
        assert_eq!(
            cells[4],
            "<b><span style=\"color:#0000FF\">-2.5</span><span style=\"color:#666666\"> <small>to</small> </span>\
             <span style=\"color:#AAAA00\">1.3</span></b>"
        );
        assert_eq!(
            cells[5],
            "&nbsp; <A HREF=\"http://fit/cgi-bin/cofit.cgi?orgId=Keio&locusId=b2451\">0.83</A>"
        );
    }

    #[test]
    fn test_identity_printed_as_received() {
        let t = Thresholds::default();
        let body = format!(
            "{}\nKeio\tb2451\t\t\tdesc\tE. coli\t100.000\t1.0\t0\t900\t\t\t\t\t\n\
             Keio\tb2452\t\t\tdesc\tE. coli\t98.50\t1.0\t0\t800\t\t\t\t\t\n",
            crate::hits::tests::HEADER
        );
        let crate::hits::ServiceResponse::Hits(hits) = crate::hits::parse_response(&body) else {
            panic!("expected hits");
        };
        assert_eq!(cells(&hits[0], &links(), &t)[0], "100.000%");
        assert_eq!(cells(&hits[1], &links(), &t)[0], "98.50%");
        assert!(render(&hits, &links(), &t).contains("<td>100.000%</td>"));
    }

    #[test]
    fn test_fitness_not_bold_when_not_useful() {
        let t = Thresholds::default();
        let h = with_fitness(hit("x", 70.0, 1.0), -1.2, 0.4, -2.0, 1.0);
        let cells = cells(&h, &links(), &t);
        assert!(!cells[4].starts_with("<b>"));
        assert!(cells[4].contains("color:#7777FF\">-1.2"));
        assert!(cells[4].contains("color:#666666\">0.4"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let t = Thresholds::default();
        let hits = vec![
            with_fitness(hit("a", 88.0, 0.9), -0.3, 0.2, -1.0, 1.0),
            hit("b", 55.0, 0.8),
        ];
        assert_eq!(render(&hits, &links(), &t), render(&hits, &links(), &t));
    }
}
