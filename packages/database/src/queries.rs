//! Synchronous location queries against a `DuckDB` connection.
//!
//! Every function here builds its SQL from fixed fragments and binds all
//! filter values as `?` parameters.

use duckdb::types::Value;
use duckdb::{Connection, Row, params_from_iter};
use locofinder_location_models::{LocationFilter, LocationPage, LocationRecord};
use locofinder_scoring_models::{Feature, FeatureRange, FeatureStats};

use crate::DbError;

/// Column list for [`row_to_location`]. Numeric columns are cast so that
/// Parquet/CSV inputs with integer or decimal types decode uniformly.
const LOCATION_COLUMNS: &str = "CAST(location_id AS VARCHAR), CAST(city AS VARCHAR), \
     CAST(county AS VARCHAR), CAST(state AS VARCHAR), \
     CAST(median_income AS DOUBLE), CAST(crime_index AS DOUBLE), \
     CAST(growth_index AS DOUBLE), CAST(home_price AS DOUBLE), \
     CAST(rent_price AS DOUBLE), CAST(population AS BIGINT), \
     CAST(lat AS DOUBLE), CAST(lon AS DOUBLE)";

/// Builds WHERE clause fragments and their bound parameters for a
/// [`LocationFilter`]. Blank or non-positive constraints are skipped.
fn build_filters(filter: &LocationFilter) -> (Vec<&'static str>, Vec<Value>) {
    let filter = filter.normalized();
    let mut frags = Vec::new();
    let mut params = Vec::new();

    if let Some(state) = filter.state {
        frags.push("state = ?");
        params.push(Value::Text(state));
    }

    if let Some(max) = filter.max_home_price {
        frags.push("home_price <= ?");
        params.push(Value::Double(max));
    }

    if let Some(max) = filter.max_rent_price {
        frags.push("rent_price <= ?");
        params.push(Value::Double(max));
    }

    if let Some(min) = filter.min_income {
        frags.push("median_income >= ?");
        params.push(Value::Double(min));
    }

    (frags, params)
}

fn where_clause(frags: &[&str]) -> String {
    if frags.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", frags.join(" AND "))
    }
}

fn row_to_location(row: &Row<'_>) -> duckdb::Result<LocationRecord> {
    Ok(LocationRecord {
        location_id: row.get(0)?,
        city: row.get(1)?,
        county: row.get(2)?,
        state: row.get(3)?,
        median_income: row.get(4)?,
        crime_index: row.get(5)?,
        growth_index: row.get(6)?,
        home_price: row.get(7)?,
        rent_price: row.get(8)?,
        population: row.get(9)?,
        lat: row.get(10)?,
        lon: row.get(11)?,
    })
}

fn query_locations(
    conn: &Connection,
    sql: &str,
    params: &[Value],
) -> Result<Vec<LocationRecord>, DbError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params_from_iter(params.iter()), row_to_location)?;
    Ok(rows.collect::<Result<Vec<_>, _>>()?)
}

/// Counts locations matching `filter`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn count_locations(conn: &Connection, filter: &LocationFilter) -> Result<u64, DbError> {
    let (frags, params) = build_filters(filter);
    let sql = format!("SELECT COUNT(*) FROM locations{}", where_clause(&frags));

    let count: i64 = conn.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?;

    u64::try_from(count).map_err(|e| DbError::Conversion {
        message: format!("Negative row count {count}: {e}"),
    })
}

/// Fetches one page of locations matching `filter`, ordered by
/// `location_id`, together with the total number of matches.
///
/// # Errors
///
/// Returns [`DbError`] if either query fails.
pub fn fetch_page(
    conn: &Connection,
    filter: &LocationFilter,
    offset: u32,
    limit: u32,
) -> Result<LocationPage, DbError> {
    let total = count_locations(conn, filter)?;

    let (frags, mut params) = build_filters(filter);
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations{} ORDER BY location_id LIMIT ? OFFSET ?",
        where_clause(&frags)
    );
    params.push(Value::BigInt(i64::from(limit)));
    params.push(Value::BigInt(i64::from(offset)));

    let locations = query_locations(conn, &sql, &params)?;

    Ok(LocationPage { locations, total })
}

/// Fetches every location matching `filter`, ordered by `location_id`.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn fetch_filtered(
    conn: &Connection,
    filter: &LocationFilter,
) -> Result<Vec<LocationRecord>, DbError> {
    let (frags, params) = build_filters(filter);
    let sql = format!(
        "SELECT {LOCATION_COLUMNS} FROM locations{} ORDER BY location_id",
        where_clause(&frags)
    );
    query_locations(conn, &sql, &params)
}

/// Looks up a single location by identifier.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn find_by_id(conn: &Connection, location_id: &str) -> Result<Option<LocationRecord>, DbError> {
    let sql = format!("SELECT {LOCATION_COLUMNS} FROM locations WHERE location_id = ? LIMIT 1");
    let mut rows = query_locations(conn, &sql, &[Value::Text(location_id.to_string())])?;
    Ok(rows.pop())
}

/// Computes `MIN`/`MAX` of every scorable feature over the locations
/// matching `filter` (or the whole dataset), in a single pass.
///
/// Features with no non-null values in the cohort are omitted, so an empty
/// cohort yields empty statistics.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn feature_ranges(
    conn: &Connection,
    filter: Option<&LocationFilter>,
) -> Result<FeatureStats, DbError> {
    let selects: Vec<String> = Feature::all()
        .iter()
        .map(|f| {
            let col = f.as_ref();
            format!("MIN(CAST({col} AS DOUBLE)), MAX(CAST({col} AS DOUBLE))")
        })
        .collect();

    let (frags, params) = filter.map(build_filters).unwrap_or_default();
    let sql = format!(
        "SELECT {} FROM locations{}",
        selects.join(", "),
        where_clause(&frags)
    );

    let bounds: Vec<(Option<f64>, Option<f64>)> =
        conn.query_row(&sql, params_from_iter(params.iter()), |row| {
            (0..Feature::all().len())
                .map(|i| -> duckdb::Result<(Option<f64>, Option<f64>)> {
                    Ok((row.get(i * 2)?, row.get(i * 2 + 1)?))
                })
                .collect()
        })?;

    Ok(Feature::all()
        .iter()
        .zip(bounds)
        .filter_map(|(feature, bound)| match bound {
            (Some(min), Some(max)) => Some((*feature, FeatureRange::new(min, max))),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::dataset;

    /// Three locations: two in CA, one in TX.
    pub(crate) fn seeded_connection() -> Connection {
        let conn = dataset::open_empty().unwrap();
        conn.execute_batch(
            "INSERT INTO locations VALUES
             ('LOC-001', 'TestA', 'CA', 'CA',
              100000.0, 20.0, 5.0, 500000.0, 2000.0, 10000, 0.0, 0.0),
             ('LOC-002', 'TestB', 'CA', 'CA',
              80000.0, 40.0, 2.0, 400000.0, 1500.0, 20000, 0.0, 0.0),
             ('LOC-003', 'TestC', 'TX', 'TX',
              150000.0, 10.0, 10.0, 800000.0, 3000.0, 5000, 0.0, 0.0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn build_filters_binds_every_value() {
        let filter = LocationFilter {
            state: Some("CA' OR '1'='1".to_string()),
            max_home_price: Some(1.0),
            max_rent_price: None,
            min_income: Some(2.0),
        };
        let (frags, params) = build_filters(&filter);
        assert_eq!(frags, ["state = ?", "home_price <= ?", "median_income >= ?"]);
        assert_eq!(params.len(), 3);
        assert!(frags.iter().all(|f| !f.contains("OR")));
    }

    #[test]
    fn blank_state_and_zero_bounds_do_not_filter() {
        let conn = seeded_connection();
        let filter = LocationFilter {
            state: Some(String::new()),
            max_home_price: Some(0.0),
            max_rent_price: Some(-5.0),
            min_income: Some(0.0),
        };
        assert!(build_filters(&filter).0.is_empty());
        assert_eq!(count_locations(&conn, &filter).unwrap(), 3);
        assert_eq!(fetch_filtered(&conn, &filter).unwrap().len(), 3);
    }

    #[test]
    fn page_total_ignores_pagination() {
        let conn = seeded_connection();
        let page = fetch_page(&conn, &LocationFilter::default(), 0, 2).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.locations.len(), 2);
        assert_eq!(page.locations[0].location_id, "LOC-001");

        let page = fetch_page(&conn, &LocationFilter::default(), 2, 2).unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.locations.len(), 1);
        assert_eq!(page.locations[0].location_id, "LOC-003");
    }

    #[test]
    fn page_filtered_by_state() {
        let conn = seeded_connection();
        let filter = LocationFilter::by_state(Some("TX".to_string()));
        let page = fetch_page(&conn, &filter, 0, 20).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.locations[0].city, "TestC");
    }

    #[test]
    fn injection_attempt_matches_nothing() {
        let conn = seeded_connection();
        let filter = LocationFilter::by_state(Some("CA' OR '1'='1".to_string()));
        assert_eq!(count_locations(&conn, &filter).unwrap(), 0);
    }

    #[test]
    fn filtered_fetch_applies_all_constraints() {
        let conn = seeded_connection();
        let filter = LocationFilter {
            state: None,
            max_home_price: Some(600_000.0),
            max_rent_price: Some(1_800.0),
            min_income: None,
        };
        let rows = fetch_filtered(&conn, &filter).unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.location_id.as_str()).collect();
        assert_eq!(ids, ["LOC-002"]);
    }

    #[test]
    fn find_by_id_hits_and_misses() {
        let conn = seeded_connection();
        let found = find_by_id(&conn, "LOC-002").unwrap().unwrap();
        assert_eq!(found.population, 20_000);
        assert!(find_by_id(&conn, "LOC-999").unwrap().is_none());
    }

    #[test]
    fn ranges_over_whole_dataset_and_cohort() {
        let conn = seeded_connection();

        let all = feature_ranges(&conn, None).unwrap();
        assert_eq!(all.len(), Feature::all().len());
        assert_eq!(all[&Feature::MedianIncome], FeatureRange::new(80_000.0, 150_000.0));
        assert_eq!(all[&Feature::HomePrice], FeatureRange::new(400_000.0, 800_000.0));

        let ca = LocationFilter::by_state(Some("CA".to_string()));
        let cohort = feature_ranges(&conn, Some(&ca)).unwrap();
        assert_eq!(cohort[&Feature::MedianIncome], FeatureRange::new(80_000.0, 100_000.0));
    }

    #[test]
    fn ranges_over_empty_cohort_are_empty() {
        let conn = seeded_connection();
        let nowhere = LocationFilter::by_state(Some("ZZ".to_string()));
        assert!(feature_ranges(&conn, Some(&nowhere)).unwrap().is_empty());
    }
}
