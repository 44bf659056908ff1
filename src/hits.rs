//! Fitness BLAST hits and parsing of the sequence service response
//!
//! The service answers with tab-separated text: a header line naming the
//! columns, then one line per hit. A column literally named `Error` in the
//! first row carries a server-side failure message instead of hits.

use serde::Serialize;

use crate::config::Thresholds;

/// Fitness summary of a hit across all experimental conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Fitness {
    /// Lowest fitness value
    pub min: f64,
    /// Highest fitness value
    pub max: f64,
    /// t-statistic paired with `min`
    pub min_t: Option<f64>,
    /// t-statistic paired with `max`
    pub max_t: Option<f64>,
}

impl Fitness {
    /// True if either extreme exceeds `min_abs` with a t-statistic beyond `min_abs_t`
    /// in the same direction.
    pub fn exceeds(&self, min_abs: f64, min_abs_t: f64) -> bool {
        let low = self.min < -min_abs && self.min_t.is_some_and(|t| t < -min_abs_t);
        let high = self.max > min_abs && self.max_t.is_some_and(|t| t > min_abs_t);
        low || high
    }
}

/// One matching reference gene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hit {
    pub org_id: String,
    pub locus_id: String,
    pub name: Option<String>,
    pub sys_name: Option<String>,
    pub organism: String,
    pub description: String,
    /// Percent identity (0-100)
    pub identity: f64,
    /// Identity exactly as the service wrote it
    #[serde(skip)]
    pub identity_text: String,
    /// Fraction of the query covered (0-1)
    pub coverage: f64,
    /// None when the gene has no fitness data
    pub fitness: Option<Fitness>,
    pub max_cofit: Option<f64>,
}

/// How strongly a hit's fitness data supports a phenotype
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Significance {
    Strong,
    Phenotype,
    Data,
    NoData,
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Significance::Strong => write!(f, "strong phenotype"),
            Significance::Phenotype => write!(f, "has phenotype"),
            Significance::Data => write!(f, "has data"),
            Significance::NoData => write!(f, "no data"),
        }
    }
}

impl Hit {
    /// Name shown for the gene: explicit name, then systematic name, then locus id
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.sys_name.as_deref())
            .unwrap_or(&self.locus_id)
    }

    pub fn has_coverage(&self, thresholds: &Thresholds) -> bool {
        self.coverage >= thresholds.min_coverage
    }

    pub fn is_close(&self, thresholds: &Thresholds) -> bool {
        self.identity >= thresholds.min_close_identity
    }

    pub fn has_cofit(&self, thresholds: &Thresholds) -> bool {
        self.max_cofit.is_some_and(|c| c >= thresholds.min_cofit)
    }

    pub fn has_phenotype(&self, thresholds: &Thresholds) -> bool {
        self.fitness
            .is_some_and(|f| f.exceeds(thresholds.min_abs_fit, thresholds.min_abs_t))
    }

    pub fn has_strong_phenotype(&self, thresholds: &Thresholds) -> bool {
        self.fitness
            .is_some_and(|f| f.exceeds(thresholds.min_abs_strong, thresholds.min_abs_t))
    }

    /// A hit is likely to be useful if it has a strong cofitness partner or
    /// a significant phenotype.
    pub fn is_useful(&self, thresholds: &Thresholds) -> bool {
        self.has_cofit(thresholds) || self.has_phenotype(thresholds)
    }

    pub fn significance(&self, thresholds: &Thresholds) -> Significance {
        if self.has_strong_phenotype(thresholds) {
            Significance::Strong
        } else if self.has_phenotype(thresholds) {
            Significance::Phenotype
        } else if self.fitness.is_some() {
            Significance::Data
        } else {
            Significance::NoData
        }
    }
}

/// Outcome of parsing the service body
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceResponse {
    /// Parsed hits in the order the server sent them
    Hits(Vec<Hit>),
    /// No data rows at all
    Empty,
    /// The first row carried an `Error` column
    ServerError(String),
}

/// Column lookup by header name; missing columns and short rows read as empty.
struct Columns {
    headers: csv::StringRecord,
}

impl Columns {
    fn get<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.headers
            .iter()
            .position(|h| h == column)
            .and_then(|i| record.get(i))
            .unwrap_or("")
    }

    fn hit(&self, record: &csv::StringRecord) -> Hit {
        let number = |column: &str| parse_number(self.get(record, column), column);
        let text = |column: &str| self.get(record, column).to_string();

        // An empty maxfit next to a minfit reads as 0
        let fitness = number("minfit").map(|min| Fitness {
            min,
            max: number("maxfit").unwrap_or(0.0),
            min_t: number("minT"),
            max_t: number("maxT"),
        });

        Hit {
            org_id: text("orgId"),
            locus_id: text("locusId"),
            name: non_empty(text("name")),
            sys_name: non_empty(text("sysName")),
            organism: text("organism"),
            description: text("description"),
            identity: number("identity").unwrap_or(0.0),
            identity_text: self.get(record, "identity").trim().to_string(),
            coverage: number("coverage").unwrap_or(0.0),
            fitness,
            max_cofit: number("maxcofit"),
        }
    }
}

/// Parse a numeric field; empty means "no value".
fn parse_number(field: &str, column: &str) -> Option<f64> {
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            log::warn!("Ignoring non-numeric {} value '{}'", column, field);
            None
        }
    }
}

fn non_empty(field: String) -> Option<String> {
    if field.is_empty() {
        None
    } else {
        Some(field)
    }
}

/// Parse the tab-separated body returned by the sequence service.
///
/// Malformed rows are skipped with a warning; the parse itself never fails.
pub fn parse_response(text: &str) -> ServiceResponse {
    if text.trim().is_empty() {
        return ServiceResponse::Empty;
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            log::warn!("Failed to read response header: {}", e);
            return ServiceResponse::Empty;
        }
    };
    let error_column = headers.iter().position(|h| h == "Error");
    let columns = Columns { headers };

    let mut hits = Vec::new();
    let mut first_row = true;
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Skipping malformed response row {}: {}", i + 1, e);
                continue;
            }
        };

        if first_row {
            first_row = false;
            if let Some(col) = error_column {
                let message = record.get(col).unwrap_or_default().to_string();
                return ServiceResponse::ServerError(message);
            }
        }

        hits.push(columns.hit(&record));
    }

    log::debug!("Parsed {} hits from sequence service response", hits.len());

    if hits.is_empty() {
        ServiceResponse::Empty
    } else {
        ServiceResponse::Hits(hits)
    }
}
