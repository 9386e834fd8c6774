use polars::prelude::*;

use crate::error::DashError;
use crate::schema::{day_type, summary, trip};

/// Map a raw working-day flag to its display label.
///
/// Returns `None` for values outside {0, 1}; callers decide how an unmapped
/// value is carried through.
pub fn day_type_label(raw: i64) -> Option<&'static str> {
    match raw {
        day_type::RAW_WEEKEND => Some(day_type::WEEKEND),
        day_type::RAW_WEEKDAY => Some(day_type::WEEKDAY),
        _ => None,
    }
}

/// Total trips per (year, season).
///
/// Groups on the raw `yr` / `season` columns, sums `cnt`, and renames to the
/// summary schema. Empty input yields an empty frame with the same schema.
pub fn per_season(trips: &DataFrame) -> Result<DataFrame, DashError> {
    let df = trips
        .clone()
        .lazy()
        .group_by_stable([col(trip::YR), col(trip::SEASON)])
        .agg([col(trip::CNT).sum()])
        .rename([trip::YR, trip::CNT], [summary::YEAR, summary::TOTAL], true)
        .collect()?;
    Ok(df)
}

/// Casual / registered / total trips per (year, day type).
///
/// Grouping happens on the raw numeric `workingday` flag so that 0 and 1
/// never collide before relabeling; the display label is substituted after
/// aggregation. Flag values outside {0, 1} pass through unmapped, rendered
/// as their decimal form. Null flags stay null.
pub fn per_day_type(trips: &DataFrame) -> Result<DataFrame, DashError> {
    let mut df = trips
        .clone()
        .lazy()
        .group_by_stable([col(trip::YR), col(trip::WORKINGDAY)])
        .agg([
            col(trip::CASUAL).sum(),
            col(trip::REGISTERED).sum(),
            col(trip::CNT).sum(),
        ])
        .rename([trip::YR, trip::CNT], [summary::YEAR, summary::TOTAL], true)
        .collect()?;

    let labels: StringChunked = df
        .column(summary::WORKINGDAY)?
        .i64()?
        .into_iter()
        .map(|flag| {
            flag.map(|raw| match day_type_label(raw) {
                Some(label) => label.to_string(),
                None => raw.to_string(),
            })
        })
        .collect();
    df.replace(
        summary::WORKINGDAY,
        labels.into_series().with_name(summary::WORKINGDAY.into()),
    )?;

    Ok(df)
}

/// Total trips per (year, season, hour).
///
/// One row per distinct combination present in the input; missing hours are
/// simply absent rows, at most 24 per (year, season) pair.
pub fn per_hour(trips: &DataFrame) -> Result<DataFrame, DashError> {
    let df = trips
        .clone()
        .lazy()
        .group_by_stable([col(trip::YR), col(trip::SEASON), col(trip::HR)])
        .agg([col(trip::CNT).sum()])
        .rename(
            [trip::YR, trip::HR, trip::CNT],
            [summary::YEAR, summary::HOUR, summary::TOTAL],
            true,
        )
        .collect()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn sample_trips() -> DataFrame {
        df!(
            trip::YR => [0i64, 0, 0, 0, 1],
            trip::SEASON => [1i64, 1, 2, 2, 1],
            trip::HR => [5i64, 5, 8, 9, 5],
            trip::WORKINGDAY => [0i64, 0, 1, 1, 1],
            trip::CASUAL => [2i64, 1, 4, 6, 3],
            trip::REGISTERED => [3i64, 4, 10, 14, 7],
            trip::CNT => [5i64, 5, 14, 20, 10],
        )
        .unwrap()
    }

    fn empty_trips() -> DataFrame {
        df!(
            trip::YR => Vec::<i64>::new(),
            trip::SEASON => Vec::<i64>::new(),
            trip::HR => Vec::<i64>::new(),
            trip::WORKINGDAY => Vec::<i64>::new(),
            trip::CASUAL => Vec::<i64>::new(),
            trip::REGISTERED => Vec::<i64>::new(),
            trip::CNT => Vec::<i64>::new(),
        )
        .unwrap()
    }

    #[test]
    fn per_season_worked_example() {
        let trips = df!(
            trip::YR => [0i64, 0],
            trip::SEASON => [1i64, 1],
            trip::HR => [5i64, 5],
            trip::WORKINGDAY => [0i64, 0],
            trip::CASUAL => [2i64, 1],
            trip::REGISTERED => [3i64, 4],
            trip::CNT => [5i64, 5],
        )
        .unwrap();

        let summary = per_season(&trips).unwrap();
        let expected = df!(
            summary::YEAR => [0i64],
            summary::SEASON => [1i64],
            summary::TOTAL => [10i64],
        )
        .unwrap();
        assert!(summary.equals(&expected));
    }

    #[test]
    fn per_season_one_row_per_group() {
        let summary = per_season(&sample_trips()).unwrap();
        assert_eq!(summary.height(), 3);
        assert_eq!(
            summary.get_column_names_str(),
            vec![summary::YEAR, summary::SEASON, summary::TOTAL]
        );
    }

    #[test]
    fn per_season_conserves_totals() {
        let trips = sample_trips();
        let summary = per_season(&trips).unwrap();

        let raw_total: i64 = trips.column(trip::CNT).unwrap().i64().unwrap().sum().unwrap();
        let summed: i64 = summary
            .column(summary::TOTAL)
            .unwrap()
            .i64()
            .unwrap()
            .sum()
            .unwrap();
        assert_eq!(summed, raw_total);
    }

    #[test]
    fn per_season_is_order_independent() {
        let trips = sample_trips();
        let reversed = trips.reverse();

        let sort_keys = [summary::YEAR, summary::SEASON];
        let a = per_season(&trips)
            .unwrap()
            .sort(sort_keys, Default::default())
            .unwrap();
        let b = per_season(&reversed)
            .unwrap()
            .sort(sort_keys, Default::default())
            .unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn per_season_does_not_mutate_input() {
        let trips = sample_trips();
        let before = trips.clone();
        per_season(&trips).unwrap();
        assert!(trips.equals(&before));
    }

    #[test]
    fn per_day_type_relabels_after_aggregation() {
        let summary = per_day_type(&sample_trips()).unwrap();
        let labels: Vec<&str> = summary
            .column(summary::WORKINGDAY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(
            labels,
            vec![day_type::WEEKEND, day_type::WEEKDAY, day_type::WEEKDAY]
        );
    }

    #[test]
    fn per_day_type_sums_each_count_independently() {
        let summary = per_day_type(&sample_trips()).unwrap();
        // yr=0, workingday=0 partition: casual 2+1, registered 3+4, cnt 5+5.
        let casual = summary.column(summary::CASUAL).unwrap().i64().unwrap();
        let registered = summary.column(summary::REGISTERED).unwrap().i64().unwrap();
        let total = summary.column(summary::TOTAL).unwrap().i64().unwrap();
        assert_eq!(casual.get(0), Some(3));
        assert_eq!(registered.get(0), Some(7));
        assert_eq!(total.get(0), Some(10));
    }

    #[test]
    fn per_day_type_passes_unmapped_flags_through() {
        let trips = df!(
            trip::YR => [0i64, 0],
            trip::SEASON => [1i64, 1],
            trip::HR => [5i64, 6],
            trip::WORKINGDAY => [7i64, 0],
            trip::CASUAL => [1i64, 2],
            trip::REGISTERED => [1i64, 2],
            trip::CNT => [2i64, 4],
        )
        .unwrap();

        let summary = per_day_type(&trips).unwrap();
        assert_eq!(summary.height(), 2);
        let labels: Vec<&str> = summary
            .column(summary::WORKINGDAY)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert!(labels.contains(&"7"));
        assert!(labels.contains(&day_type::WEEKEND));
    }

    #[test]
    fn day_type_label_maps_only_known_flags() {
        assert_eq!(day_type_label(0), Some(day_type::WEEKEND));
        assert_eq!(day_type_label(1), Some(day_type::WEEKDAY));
        assert_eq!(day_type_label(2), None);
        assert_eq!(day_type_label(-1), None);
    }

    #[test]
    fn per_hour_collapses_duplicate_hours() {
        let summary = per_hour(&sample_trips()).unwrap();
        // (0,1,5) appears twice in the input and must collapse to one row.
        assert_eq!(summary.height(), 4);
        assert_eq!(
            summary.get_column_names_str(),
            vec![summary::YEAR, summary::SEASON, summary::HOUR, summary::TOTAL]
        );

        let hours = summary.column(summary::HOUR).unwrap().i64().unwrap();
        let totals = summary.column(summary::TOTAL).unwrap().i64().unwrap();
        assert_eq!(hours.get(0), Some(5));
        assert_eq!(totals.get(0), Some(10));
    }

    #[test]
    fn empty_input_yields_empty_summaries() {
        let trips = empty_trips();

        let season = per_season(&trips).unwrap();
        let day = per_day_type(&trips).unwrap();
        let hour = per_hour(&trips).unwrap();

        assert_eq!(season.height(), 0);
        assert_eq!(day.height(), 0);
        assert_eq!(hour.height(), 0);
        assert_eq!(
            season.get_column_names_str(),
            vec![summary::YEAR, summary::SEASON, summary::TOTAL]
        );
    }
}
