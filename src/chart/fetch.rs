use chrono::NaiveDate;
use futures_util::future::join_all;

use crate::api::client::ApiClient;
use crate::api::models::DataResponse;

/// Wire date format used by the backend.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parsed time series for one identifier, dates resolved to calendar days.
#[derive(Debug, Clone)]
pub struct RawSeries {
    pub id: String,
    pub points: Vec<(NaiveDate, f64)>,
}

/// Fetch the most recent `days` of data for every selected identifier.
///
/// Indicator ids hit the indicator endpoint, series ids the series endpoint;
/// all requests run as one batch. A failed or malformed fetch yields `None`
/// for that slot and never fails the others — the assembler filters the
/// `None`s out rather than propagating them.
pub async fn fetch_batch(
    client: &ApiClient,
    indicator_ids: &[String],
    series_ids: &[String],
    days: u32,
) -> Vec<Option<RawSeries>> {
    let indicator_futs = indicator_ids.iter().map(|id| async move {
        match client.indicator_data(id, days).await {
            Ok(resp) => Some(parse_points(id, resp)),
            Err(e) => {
                tracing::warn!("chart fetch failed for indicator {id}: {e}");
                None
            }
        }
    });
    let series_futs = series_ids.iter().map(|id| async move {
        match client.series_data(id, days).await {
            Ok(resp) => Some(parse_points(id, resp)),
            Err(e) => {
                tracing::warn!("chart fetch failed for series {id}: {e}");
                None
            }
        }
    });

    let (mut results, series_results) =
        tokio::join!(join_all(indicator_futs), join_all(series_futs));
    results.extend(series_results);
    results
}

/// Resolve wire dates to `NaiveDate`. An unparsable date drops that point,
/// not the whole series.
fn parse_points(id: &str, resp: DataResponse) -> RawSeries {
    let points = resp
        .items
        .into_iter()
        .filter_map(|item| match NaiveDate::parse_from_str(&item.date, DATE_FORMAT) {
            Ok(date) => Some((date, item.value)),
            Err(_) => {
                tracing::debug!("dropping point with unparsable date {:?} for {id}", item.date);
                None
            }
        })
        .collect();
    RawSeries {
        id: id.to_string(),
        points,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::DataPoint;

    fn resp(items: Vec<(&str, f64)>) -> DataResponse {
        DataResponse {
            id: "x".to_string(),
            name: "x".to_string(),
            items: items
                .into_iter()
                .map(|(date, value)| DataPoint {
                    date: date.to_string(),
                    value,
                })
                .collect(),
        }
    }

    #[test]
    fn bad_dates_drop_the_point_only() {
        let raw = parse_points("walcl", resp(vec![("2024-01-02", 1.0), ("garbage", 2.0)]));
        assert_eq!(raw.points.len(), 1);
        assert_eq!(raw.points[0].1, 1.0);
    }

    #[test]
    fn all_points_unparsable_leaves_an_empty_series() {
        let raw = parse_points("walcl", resp(vec![("02/01/2024", 1.0)]));
        assert!(raw.points.is_empty());
    }
}
