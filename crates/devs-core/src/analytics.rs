//! Web-vitals ingestion and aggregation.
//!
//! Browsers post either a single metric object or a batch `{"metrics": [...]}`.
//! Entries without a usable `name` or finite `value` are dropped. Names are
//! uppercased (`lcp` and `LCP` are one metric) and a missing rating
//! is derived from the standard web-vitals thresholds. Accepted entries land in a
//! bounded ring (`MetricStore`) that evicts the oldest entry when full.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::fmt::format_ms;

/// Default ring capacity.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub enum Rating {
    Good,
    NeedsImprovement,
    Poor,
}

impl Rating {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "good" => Some(Rating::Good),
            "needs-improvement" => Some(Rating::NeedsImprovement),
            "poor" => Some(Rating::Poor),
            _ => None,
        }
    }

    /// Rates `value` against the thresholds for `metric`.
    /// Unknown metric names are not rated.
    pub fn for_value(metric: &str, value: f64) -> Option<Self> {
        let (good, poor) = thresholds(metric)?;
        Some(if value <= good {
            Rating::Good
        } else if value <= poor {
            Rating::NeedsImprovement
        } else {
            Rating::Poor
        })
    }
}

/// (good upper bound, needs-improvement upper bound). Times in ms, CLS unitless.
fn thresholds(metric: &str) -> Option<(f64, f64)> {
    let t = match metric.to_ascii_uppercase().as_str() {
        "LCP" => (2500.0, 4000.0),
        "FID" => (100.0, 300.0),
        "INP" => (200.0, 500.0),
        "CLS" => (0.1, 0.25),
        "FCP" => (1800.0, 3000.0),
        "TTFB" => (800.0, 1800.0),
        _ => return None,
    };
    Some(t)
}

/// Human-readable value: CLS is unitless, the other known vitals are timings.
pub fn display_value(metric: &str, value: f64) -> String {
    match metric {
        "CLS" => format!("{:.3}", value),
        _ if thresholds(metric).is_some() => format_ms(value),
        _ => format!("{:.2}", value),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct ConnectionInfo {
    pub effective_type: Option<String>,
    /// Mbit/s.
    pub downlink: Option<f64>,
    /// ms.
    pub rtt: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub rating: Option<Rating>,
    /// Unix epoch ms.
    pub timestamp: i64,
    pub id: Option<String>,
    pub navigation_type: Option<String>,
    pub path: Option<String>,
    pub connection: Option<ConnectionInfo>,
}

impl MetricEntry {
    /// Parses one metric object. Returns `None` for malformed entries.
    pub fn from_value(v: &Value, now_ms: i64) -> Option<Self> {
        let obj = v.as_object()?;
        let name = obj.get("name")?.as_str()?.trim().to_ascii_uppercase();
        if name.is_empty() {
            return None;
        }
        let value = obj.get("value")?.as_f64()?;
        if !value.is_finite() {
            return None;
        }
        let rating = obj
            .get("rating")
            .and_then(Value::as_str)
            .and_then(Rating::parse)
            .or_else(|| Rating::for_value(&name, value));
        let timestamp = obj
            .get("timestamp")
            .and_then(Value::as_f64)
            .filter(|t| t.is_finite() && *t >= 0.0)
            .map(|t| t as i64)
            .unwrap_or(now_ms);
        let text = |key: &str| obj.get(key).and_then(Value::as_str).map(str::to_string);
        let connection = obj.get("connection").and_then(Value::as_object).map(|c| {
            ConnectionInfo {
                effective_type: c
                    .get("effectiveType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                downlink: c.get("downlink").and_then(Value::as_f64),
                rtt: c.get("rtt").and_then(Value::as_f64),
            }
        });

        Some(MetricEntry {
            name,
            value,
            rating,
            timestamp,
            id: text("id"),
            navigation_type: text("navigationType"),
            path: text("path"),
            connection,
        })
    }
}

/// Parses a request body: a single metric, `{"metrics": [...]}`, or a bare array.
/// Returns the accepted entries and the number dropped.
pub fn parse_payload(body: &Value, now_ms: i64) -> (Vec<MetricEntry>, usize) {
    let items: Vec<&Value> = match body {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("metrics") {
            Some(Value::Array(items)) => items.iter().collect(),
            _ => vec![body],
        },
        _ => vec![body],
    };
    let total = items.len();
    let accepted: Vec<MetricEntry> = items
        .into_iter()
        .filter_map(|v| MetricEntry::from_value(v, now_ms))
        .collect();
    let dropped = total - accepted.len();
    (accepted, dropped)
}

// ----------------------------------------------------------------------------
// Aggregation
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct RatingCounts {
    pub good: usize,
    pub needs_improvement: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct MetricStats {
    pub count: usize,
    pub avg: f64,
    pub median: f64,
    pub p75: f64,
    /// `p75` rendered for dashboards, e.g. `"2.48s"` or `"0.120"`.
    pub p75_display: String,
    pub min: f64,
    pub max: f64,
    pub ratings: RatingCounts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "api", derive(utoipa::ToSchema))]
pub struct AnalyticsSummary {
    pub total: usize,
    pub metrics: BTreeMap<String, MetricStats>,
    pub time_range: Option<TimeRange>,
}

/// Filters for `MetricStore::summary`. Empty strings are treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "api", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "api", into_params(parameter_in = Query))]
pub struct SummaryQuery {
    pub path: Option<String>,
    pub metric: Option<String>,
}

impl SummaryQuery {
    fn matches(&self, e: &MetricEntry) -> bool {
        let path_ok = match self.path.as_deref().filter(|p| !p.is_empty()) {
            Some(p) => e.path.as_deref() == Some(p),
            None => true,
        };
        let metric_ok = match self.metric.as_deref().filter(|m| !m.is_empty()) {
            Some(m) => e.name.eq_ignore_ascii_case(m),
            None => true,
        };
        path_ok && metric_ok
    }
}

fn stats(metric: &str, values: &mut [f64], ratings: RatingCounts) -> MetricStats {
    values.sort_by(|a, b| a.total_cmp(b));
    let n = values.len();
    let sum: f64 = values.iter().sum();
    let median = if n % 2 == 0 {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    } else {
        values[n / 2]
    };
    let p75 = percentile(values, 75);
    MetricStats {
        count: n,
        avg: sum / n as f64,
        median,
        p75,
        p75_display: display_value(metric, p75),
        min: values[0],
        max: values[n - 1],
        ratings,
    }
}

/// Nearest-rank percentile over sorted, non-empty `values`.
fn percentile(values: &[f64], p: usize) -> f64 {
    let rank = (p * values.len()).div_ceil(100).max(1);
    values[rank - 1]
}

// ----------------------------------------------------------------------------
// Store
// ----------------------------------------------------------------------------

/// Bounded in-memory ring of accepted metrics.
#[derive(Debug)]
pub struct MetricStore {
    capacity: usize,
    entries: VecDeque<MetricEntry>,
}

impl Default for MetricStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl MetricStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(1024)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends entries, evicting the oldest beyond capacity. Returns the count added.
    pub fn ingest(&mut self, entries: Vec<MetricEntry>) -> usize {
        let n = entries.len();
        let mut evicted = 0usize;
        for e in entries {
            if self.entries.len() == self.capacity {
                self.entries.pop_front();
                evicted += 1;
            }
            self.entries.push_back(e);
        }
        if evicted > 0 {
            debug!(evicted, capacity = self.capacity, "analytics ring full");
        }
        n
    }

    pub fn summary(&self, query: &SummaryQuery) -> AnalyticsSummary {
        let mut groups: BTreeMap<String, (Vec<f64>, RatingCounts)> = BTreeMap::new();
        let mut total = 0usize;
        let mut range: Option<TimeRange> = None;

        for e in self.entries.iter().filter(|e| query.matches(e)) {
            total += 1;
            range = Some(match range {
                Some(r) => TimeRange {
                    from: r.from.min(e.timestamp),
                    to: r.to.max(e.timestamp),
                },
                None => TimeRange {
                    from: e.timestamp,
                    to: e.timestamp,
                },
            });
            let (values, ratings) = groups.entry(e.name.clone()).or_default();
            values.push(e.value);
            match e.rating {
                Some(Rating::Good) => ratings.good += 1,
                Some(Rating::NeedsImprovement) => ratings.needs_improvement += 1,
                Some(Rating::Poor) => ratings.poor += 1,
                None => {}
            }
        }

        let metrics = groups
            .into_iter()
            .map(|(name, (mut values, ratings))| {
                let s = stats(&name, &mut values, ratings);
                (name, s)
            })
            .collect();

        AnalyticsSummary {
            total,
            metrics,
            time_range: range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    fn lcp(value: f64, path: &str, ts: i64) -> Value {
        json!({"name": "LCP", "value": value, "path": path, "timestamp": ts})
    }

    #[test]
    fn derives_rating_from_thresholds() {
        assert_eq!(Rating::for_value("LCP", 2500.0), Some(Rating::Good));
        assert_eq!(Rating::for_value("LCP", 2501.0), Some(Rating::NeedsImprovement));
        assert_eq!(Rating::for_value("lcp", 4001.0), Some(Rating::Poor));
        assert_eq!(Rating::for_value("CLS", 0.05), Some(Rating::Good));
        assert_eq!(Rating::for_value("CLS", 0.3), Some(Rating::Poor));
        assert_eq!(Rating::for_value("CUSTOM", 1.0), None);
    }

    #[test]
    fn explicit_rating_wins() {
        let v = json!({"name": "LCP", "value": 100.0, "rating": "poor"});
        let e = MetricEntry::from_value(&v, NOW).unwrap();
        assert_eq!(e.rating, Some(Rating::Poor));
        assert_eq!(e.timestamp, NOW);
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let body = json!({"metrics": [
            {"name": "LCP", "value": 1200},
            {"name": "FID"},
            {"value": 3},
            {"name": "", "value": 3},
            {"name": "CLS", "value": "0.1"},
            42,
            {"name": "TTFB", "value": 300, "connection": {"effectiveType": "4g", "rtt": 50}}
        ]});
        let (accepted, dropped) = parse_payload(&body, NOW);
        assert_eq!(accepted.len(), 2);
        assert_eq!(dropped, 5);
        let conn = accepted[1].connection.as_ref().unwrap();
        assert_eq!(conn.effective_type.as_deref(), Some("4g"));
        assert_eq!(conn.rtt, Some(50.0));
        assert_eq!(conn.downlink, None);

        let mut store = MetricStore::new(16);
        store.ingest(accepted);
        assert_eq!(store.summary(&SummaryQuery::default()).total, 2);
    }

    #[test]
    fn single_metric_payload() {
        let (accepted, dropped) = parse_payload(&json!({"name": "INP", "value": 250}), NOW);
        assert_eq!(dropped, 0);
        assert_eq!(accepted[0].rating, Some(Rating::NeedsImprovement));
    }

    #[test]
    fn summary_matches_hand_computed_values() {
        let mut store = MetricStore::new(100);
        let body = json!([
            lcp(1000.0, "/", NOW),
            lcp(2000.0, "/", NOW + 10),
            lcp(3000.0, "/", NOW + 20),
            lcp(5000.0, "/", NOW + 30),
            lcp(9999.0, "/blog", NOW - 5),
        ]);
        let (accepted, _) = parse_payload(&body, NOW);
        store.ingest(accepted);

        let summary = store.summary(&SummaryQuery {
            path: Some("/".into()),
            metric: None,
        });
        assert_eq!(summary.total, 4);
        let s = &summary.metrics["LCP"];
        assert_eq!(s.count, 4);
        assert_eq!(s.avg, 2750.0);
        assert_eq!(s.median, 2500.0);
        assert_eq!(s.p75, 3000.0);
        assert_eq!(s.p75_display, "3.00s");
        assert_eq!(s.min, 1000.0);
        assert_eq!(s.max, 5000.0);
        assert_eq!(
            s.ratings,
            RatingCounts {
                good: 2,
                needs_improvement: 1,
                poor: 1
            }
        );
        assert_eq!(
            summary.time_range,
            Some(TimeRange {
                from: NOW,
                to: NOW + 30
            })
        );
    }

    #[test]
    fn metric_filter_is_case_insensitive() {
        let mut store = MetricStore::new(10);
        let (accepted, _) = parse_payload(
            &json!([{"name": "CLS", "value": 0.01}, {"name": "LCP", "value": 10}]),
            NOW,
        );
        store.ingest(accepted);
        let summary = store.summary(&SummaryQuery {
            path: Some(String::new()),
            metric: Some("cls".into()),
        });
        assert_eq!(summary.total, 1);
        assert!(summary.metrics.contains_key("CLS"));
    }

    #[test]
    fn metric_names_share_one_bucket() {
        let mut store = MetricStore::new(10);
        let (accepted, _) = parse_payload(
            &json!([
                {"name": "lcp", "value": 1200},
                {"name": "LCP", "value": 1800},
                {"name": " cls ", "value": 0.12}
            ]),
            NOW,
        );
        assert_eq!(accepted[0].rating, Some(Rating::Good));
        store.ingest(accepted);
        let summary = store.summary(&SummaryQuery::default());
        assert_eq!(summary.metrics.len(), 2);
        assert_eq!(summary.metrics["LCP"].count, 2);
        assert_eq!(summary.metrics["LCP"].p75_display, "1.80s");
        assert_eq!(summary.metrics["CLS"].p75_display, "0.120");
        assert_eq!(display_value("INP", 230.4), "230ms");
        assert_eq!(display_value("CUSTOM", 1.0), "1.00");
    }

    #[test]
    fn ring_evicts_oldest() {
        let mut store = MetricStore::new(3);
        for i in 0..5 {
            let (accepted, _) = parse_payload(&lcp(i as f64, "/", NOW + i), NOW);
            store.ingest(accepted);
        }
        assert_eq!(store.len(), 3);
        let s = store.summary(&SummaryQuery::default());
        assert_eq!(s.metrics["LCP"].min, 2.0);
        assert_eq!(s.time_range.unwrap().from, NOW + 2);
    }

    #[test]
    fn empty_store_summary() {
        let s = MetricStore::default().summary(&SummaryQuery::default());
        assert_eq!(s.total, 0);
        assert!(s.metrics.is_empty());
        assert!(s.time_range.is_none());
    }
}
