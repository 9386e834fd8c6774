use polars::prelude::*;

use crate::error::DashError;
use crate::schema::summary;

/// Headline scalars for one summary view, shown as metric tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadlineMetrics {
    pub max_total: i64,
    pub sum_total: i64,
}

/// Max and sum of `total` across a summary frame.
///
/// An empty frame (empty year selection) yields zeros rather than an error.
pub fn headline(summary_df: &DataFrame) -> Result<HeadlineMetrics, DashError> {
    let totals = summary_df
        .column(summary::TOTAL)?
        .as_materialized_series();

    let max = totals.max_reduce()?;
    let max_total = max.value().try_extract::<i64>().unwrap_or(0);
    let sum = totals.sum_reduce()?;
    let sum_total = sum.value().try_extract::<i64>().unwrap_or(0);

    Ok(HeadlineMetrics {
        max_total,
        sum_total,
    })
}

/// `total` for one group of an integer-keyed summary, looked up by key
/// columns, e.g. `[("year", 0), ("season", 1)]` on the season summary.
///
/// Returns `None` when no row matches the key.
pub fn group_total(
    summary_df: &DataFrame,
    keys: &[(&str, i64)],
) -> Result<Option<i64>, DashError> {
    let mut lazy = summary_df.clone().lazy();
    for (name, value) in keys {
        lazy = lazy.filter(col(*name).eq(lit(*value)));
    }
    let matched = lazy.collect()?;
    if matched.height() == 0 {
        return Ok(None);
    }

    let sum = matched
        .column(summary::TOTAL)?
        .as_materialized_series()
        .sum_reduce()?;
    Ok(Some(sum.value().try_extract::<i64>().unwrap_or(0)))
}

/// `total` for one (year, label) group of the day-type summary.
pub fn day_type_total(
    summary_df: &DataFrame,
    year: i64,
    label: &str,
) -> Result<Option<i64>, DashError> {
    let matched = summary_df
        .clone()
        .lazy()
        .filter(col(summary::YEAR).eq(lit(year)))
        .filter(col(summary::WORKINGDAY).eq(lit(label)))
        .collect()?;
    if matched.height() == 0 {
        return Ok(None);
    }

    let sum = matched
        .column(summary::TOTAL)?
        .as_materialized_series()
        .sum_reduce()?;
    Ok(Some(sum.value().try_extract::<i64>().unwrap_or(0)))
}
