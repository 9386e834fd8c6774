use std::collections::BTreeSet;
use std::path::PathBuf;

use polars::prelude::*;

use crate::aggregation;
use crate::error::DashError;
use crate::schema::trip;
use crate::visualization::{self, VisualizationConfig};

/// In-memory bike-share dataset plus the base path it was loaded from.
///
/// The trips frame is read-only after `load_trips`; every per-interaction
/// computation takes an explicit year-filtered frame, so repeated selections
/// never observe mutated state.
#[cfg_attr(feature = "python", pyo3::prelude::pyclass)]
pub struct DashModel {
    base_path: PathBuf,
    trips: Option<DataFrame>,
}

impl DashModel {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            trips: None,
        }
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// Load the hourly trips CSV.
    ///
    /// Required columns: yr, season, hr, workingday, casual, registered, cnt.
    /// A missing one aborts the load. The required columns are cast to Int64;
    /// all other columns are preserved as strings. Rows are sorted by year so
    /// the year selector and grouped output follow the natural order.
    pub fn load_trips(&mut self, filename: &str) -> Result<DataFrame, DashError> {
        let raw = self.read_csv_as_strings(filename)?;

        Self::require_columns(&raw, &trip::REQUIRED)?;

        let casts: Vec<Expr> = trip::REQUIRED
            .iter()
            .map(|name| col(*name).cast(DataType::Int64))
            .collect();
        let df = raw
            .lazy()
            .with_columns(casts)
            .sort([trip::YR], Default::default())
            .collect()?;

        self.trips = Some(df.clone());
        Ok(df)
    }

    /// The full loaded trips frame.
    pub fn trips(&self) -> Result<&DataFrame, DashError> {
        self.trips
            .as_ref()
            .ok_or_else(|| DashError::NotLoaded("trips".into()))
    }

    // ── Selection ───────────────────────────────────────────────────────────

    /// Distinct years present in the dataset, ascending. These are the year
    /// selector options.
    pub fn years(&self) -> Result<Vec<i64>, DashError> {
        let years: BTreeSet<i64> = self
            .trips()?
            .column(trip::YR)?
            .i64()?
            .into_iter()
            .flatten()
            .collect();
        Ok(years.into_iter().collect())
    }

    /// Rows for one selected year. A year with no rows yields an empty frame,
    /// not an error; the aggregators map it to empty summaries.
    pub fn filter_year(&self, year: i64) -> Result<DataFrame, DashError> {
        let df = self
            .trips()?
            .clone()
            .lazy()
            .filter(col(trip::YR).eq(lit(year)))
            .collect()?;
        Ok(df)
    }

    // ── Dashboard rendering ─────────────────────────────────────────────────

    /// Run all three aggregations for one selected year and render the
    /// summary charts as a self-contained HTML string.
    pub fn dashboard_html(
        &self,
        year: i64,
        config: &VisualizationConfig,
    ) -> Result<String, DashError> {
        let selected = self.filter_year(year)?;

        let per_season = aggregation::per_season(&selected)?;
        let per_day_type = aggregation::per_day_type(&selected)?;
        let per_hour = aggregation::per_hour(&selected)?;

        visualization::generate_dashboard_html(&per_season, &per_day_type, &per_hour, config)
    }

    // ── Private helpers ─────────────────────────────────────────────────────

    /// Read a CSV file with all columns as String dtype.
    /// Trims whitespace from column names.
    fn read_csv_as_strings(&self, filename: &str) -> Result<DataFrame, DashError> {
        let path = self.base_path.join(filename);
        let mut df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0)) // all columns as String
            .try_into_reader_with_file_path(Some(path))?
            .finish()?;

        let trimmed: Vec<String> = df
            .get_column_names_str()
            .iter()
            .map(|c| c.trim().to_string())
            .collect();
        df.set_column_names(trimmed.as_slice())?;

        Ok(df)
    }

    fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), DashError> {
        for &col_name in required {
            if df.column(col_name).is_err() {
                return Err(DashError::MissingColumn(col_name.to_string()));
            }
        }
        Ok(())
    }
}

// ── Python bindings ─────────────────────────────────────────────────────────

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3_polars::PyDataFrame;

    use super::DashModel;
    use crate::aggregation;
    use crate::metrics;
    use crate::visualization::VisualizationConfig;

    #[pymethods]
    impl DashModel {
        #[new]
        fn py_new(base_path: String) -> Self {
            Self::new(base_path)
        }

        /// Load the hourly trips CSV.
        #[pyo3(name = "load_trips", signature = (filename=None))]
        fn py_load_trips(&mut self, filename: Option<&str>) -> PyResult<PyDataFrame> {
            let df = self.load_trips(filename.unwrap_or("all_data.csv"))?;
            Ok(PyDataFrame(df))
        }

        /// Distinct years in the dataset, ascending. The year selector options.
        #[pyo3(name = "years")]
        fn py_years(&self) -> PyResult<Vec<i64>> {
            Ok(self.years()?)
        }

        /// Rows for one selected year.
        #[pyo3(name = "filter_year")]
        fn py_filter_year(&self, year: i64) -> PyResult<PyDataFrame> {
            Ok(PyDataFrame(self.filter_year(year)?))
        }

        // ── Aggregation (the core) ──────────────────────────────────────────

        /// Total trips per (year, season) for a year-filtered frame.
        #[staticmethod]
        fn per_season(trips: PyDataFrame) -> PyResult<PyDataFrame> {
            Ok(PyDataFrame(aggregation::per_season(&trips.0)?))
        }

        /// Casual / registered / total trips per (year, day type), relabeled.
        #[staticmethod]
        fn per_day_type(trips: PyDataFrame) -> PyResult<PyDataFrame> {
            Ok(PyDataFrame(aggregation::per_day_type(&trips.0)?))
        }

        /// Total trips per (year, season, hour).
        #[staticmethod]
        fn per_hour(trips: PyDataFrame) -> PyResult<PyDataFrame> {
            Ok(PyDataFrame(aggregation::per_hour(&trips.0)?))
        }

        // ── Rendering boundary ──────────────────────────────────────────────

        /// (max, sum) of `total` across a summary frame, for the metric tiles.
        #[staticmethod]
        fn headline(summary: PyDataFrame) -> PyResult<(i64, i64)> {
            let m = metrics::headline(&summary.0)?;
            Ok((m.max_total, m.sum_total))
        }

        /// `total` for one group of an integer-keyed summary, or None.
        #[staticmethod]
        fn group_total(summary: PyDataFrame, keys: Vec<(String, i64)>) -> PyResult<Option<i64>> {
            let keys: Vec<(&str, i64)> = keys.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            Ok(metrics::group_total(&summary.0, &keys)?)
        }

        /// `total` for one (year, label) group of the day-type summary, or None.
        #[staticmethod]
        fn day_type_total(summary: PyDataFrame, year: i64, label: &str) -> PyResult<Option<i64>> {
            Ok(metrics::day_type_total(&summary.0, year, label)?)
        }

        /// Render the dashboard for one selected year as self-contained HTML.
        ///
        /// Use with `streamlit.components.v1.html(...)` or
        /// `IPython.display.HTML(...)`.
        #[pyo3(name = "dashboard_html", signature = (
            year,
            title = None,
            chart_width_px = 640,
            chart_height_px = 320,
        ))]
        fn py_dashboard_html(
            &self,
            year: i64,
            title: Option<String>,
            chart_width_px: u32,
            chart_height_px: u32,
        ) -> PyResult<String> {
            let config = VisualizationConfig {
                title: title.unwrap_or_else(|| VisualizationConfig::default().title),
                chart_width_px,
                chart_height_px,
            };
            Ok(self.dashboard_html(year, &config)?)
        }

        // ── Properties ──────────────────────────────────────────────────────

        #[getter]
        fn trips_df(&self) -> PyResult<Option<PyDataFrame>> {
            Ok(self.trips.clone().map(PyDataFrame))
        }
    }
}
