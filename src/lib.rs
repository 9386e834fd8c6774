#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::types::PyModule;

pub mod aggregation;
pub mod error;
pub mod metrics;
pub mod model;
pub mod schema;
pub mod visualization;

/// Export schema constants as Python submodules
#[cfg(feature = "python")]
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Raw trip columns
    let trip = PyModule::new(m.py(), "trip")?;
    trip.add("YR", schema::trip::YR)?;
    trip.add("SEASON", schema::trip::SEASON)?;
    trip.add("HR", schema::trip::HR)?;
    trip.add("WORKINGDAY", schema::trip::WORKINGDAY)?;
    trip.add("CASUAL", schema::trip::CASUAL)?;
    trip.add("REGISTERED", schema::trip::REGISTERED)?;
    trip.add("CNT", schema::trip::CNT)?;
    m.add_submodule(&trip)?;

    // Summary columns
    let summary = PyModule::new(m.py(), "summary")?;
    summary.add("YEAR", schema::summary::YEAR)?;
    summary.add("SEASON", schema::summary::SEASON)?;
    summary.add("HOUR", schema::summary::HOUR)?;
    summary.add("WORKINGDAY", schema::summary::WORKINGDAY)?;
    summary.add("CASUAL", schema::summary::CASUAL)?;
    summary.add("REGISTERED", schema::summary::REGISTERED)?;
    summary.add("TOTAL", schema::summary::TOTAL)?;
    m.add_submodule(&summary)?;

    // Day-type values
    let day_type = PyModule::new(m.py(), "day_type")?;
    day_type.add("RAW_WEEKEND", schema::day_type::RAW_WEEKEND)?;
    day_type.add("RAW_WEEKDAY", schema::day_type::RAW_WEEKDAY)?;
    day_type.add("WEEKEND", schema::day_type::WEEKEND)?;
    day_type.add("WEEKDAY", schema::day_type::WEEKDAY)?;
    m.add_submodule(&day_type)?;

    Ok(())
}

#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<model::DashModel>()?;
    add_schema_exports(m)?;
    Ok(())
}
