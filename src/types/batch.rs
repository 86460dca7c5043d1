use serde::{Deserialize, Serialize};

/// One calendar date of precomputed sentiment shares, as written by the
/// offline batch job. Sentiment fields may be absent or null.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchRecord {
    #[serde(default, alias = "Date")]
    pub date: Option<String>,
    #[serde(default)]
    pub pos: Option<f64>,
    #[serde(default)]
    pub neg: Option<f64>,
    #[serde(default)]
    pub neu: Option<f64>,
}
