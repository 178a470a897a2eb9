//! Opening the location dataset as a `locations` relation.
//!
//! Three on-disk formats are understood, chosen by file extension:
//!
//! * `.duckdb` / `.db`: a `DuckDB` database opened read-only, which must
//!   contain a `locations` table.
//! * `.parquet`: exposed through a view over `read_parquet`.
//! * `.csv`: exposed through a view over `read_csv_auto`.
//!
//! When the file does not exist an empty in-memory `locations` table is
//! created instead so the service can still start and answer (with no
//! results).

use std::path::Path;

use duckdb::{AccessMode, Config, Connection};

use crate::DbError;

/// Name of the relation every query reads from.
pub const LOCATIONS_RELATION: &str = "locations";

/// On-disk dataset formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// A native `DuckDB` database file.
    DuckDb,
    /// An Apache Parquet file.
    Parquet,
    /// A CSV file with a header row.
    Csv,
}

impl DatasetFormat {
    /// Detects the format from a file extension (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::UnsupportedDataset`] for any other extension.
    pub fn from_path(path: &Path) -> Result<Self, DbError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("duckdb" | "db") => Ok(Self::DuckDb),
            Some("parquet") => Ok(Self::Parquet),
            Some("csv") => Ok(Self::Csv),
            _ => Err(DbError::UnsupportedDataset {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// Opens the dataset at `path` and returns a connection on which the
/// `locations` relation is queryable.
///
/// # Errors
///
/// Returns [`DbError`] if the format is unsupported or `DuckDB` fails to
/// open or attach the file.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    let format = DatasetFormat::from_path(path)?;

    if !path.exists() {
        log::warn!(
            "Dataset not found at {}; serving an empty location set",
            path.display()
        );
        return open_empty();
    }

    let conn = match format {
        DatasetFormat::DuckDb => {
            Connection::open_with_flags(path, Config::default().access_mode(AccessMode::ReadOnly)?)?
        }
        DatasetFormat::Parquet => {
            let conn = Connection::open_in_memory()?;
            create_view(&conn, "read_parquet", path)?;
            conn
        }
        DatasetFormat::Csv => {
            let conn = Connection::open_in_memory()?;
            create_view(&conn, "read_csv_auto", path)?;
            conn
        }
    };

    log::info!("Opened {format:?} dataset at {}", path.display());

    Ok(conn)
}

/// Opens an in-memory database holding an empty `locations` table.
///
/// # Errors
///
/// Returns [`DbError`] if the connection or schema creation fails.
pub fn open_empty() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    create_schema(&conn)?;
    Ok(conn)
}

/// Creates the `locations` table if it does not exist.
///
/// # Errors
///
/// Returns [`DbError`] if the DDL fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS locations (
            location_id TEXT NOT NULL PRIMARY KEY,
            city TEXT NOT NULL,
            county TEXT NOT NULL,
            state TEXT NOT NULL,
            median_income DOUBLE NOT NULL,
            crime_index DOUBLE NOT NULL,
            growth_index DOUBLE NOT NULL,
            home_price DOUBLE NOT NULL,
            rent_price DOUBLE NOT NULL,
            population BIGINT NOT NULL,
            lat DOUBLE NOT NULL,
            lon DOUBLE NOT NULL
        );",
    )?;
    Ok(())
}

/// Creates the `locations` view over a table function reading `path`.
///
/// Table function arguments cannot be bound as parameters, so the path is
/// embedded as an escaped SQL string literal. It comes from configuration,
/// never from a request.
fn create_view(conn: &Connection, table_function: &str, path: &Path) -> Result<(), DbError> {
    let path_str = path.to_str().ok_or_else(|| DbError::Conversion {
        message: format!("Dataset path is not valid UTF-8: {}", path.display()),
    })?;

    conn.execute_batch(&format!(
        "CREATE VIEW {LOCATIONS_RELATION} AS SELECT * FROM {table_function}({});",
        sql_string_literal(path_str)
    ))?;
    Ok(())
}

/// Quotes `value` as a SQL string literal.
fn sql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
