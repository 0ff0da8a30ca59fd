//! US EPA Air Quality Index from particulate concentrations
//!
//! Sub-indices use the EPA breakpoint tables for PM2.5 and PM10 (µg/m³); the
//! reported AQI is the highest sub-index.

use crate::models::Pollutant;

/// (concentration low, concentration high, index low, index high)
type Breakpoint = (f64, f64, f64, f64);

const PM25_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 12.0, 0.0, 50.0),
    (12.1, 35.4, 51.0, 100.0),
    (35.5, 55.4, 101.0, 150.0),
    (55.5, 150.4, 151.0, 200.0),
    (150.5, 250.4, 201.0, 300.0),
    (250.5, 500.4, 301.0, 500.0),
];

const PM10_BREAKPOINTS: [Breakpoint; 6] = [
    (0.0, 54.0, 0.0, 50.0),
    (55.0, 154.0, 51.0, 100.0),
    (155.0, 254.0, 101.0, 150.0),
    (255.0, 354.0, 151.0, 200.0),
    (355.0, 424.0, 201.0, 300.0),
    (425.0, 604.0, 301.0, 500.0),
];

fn sub_index(concentration: f64, table: &[Breakpoint]) -> Option<f64> {
    if !concentration.is_finite() || concentration < 0.0 {
        return None;
    }
    let (c_lo, c_hi, i_lo, i_hi) = table
        .iter()
        .copied()
        .find(|&(_, c_hi, _, _)| concentration <= c_hi)
        .unwrap_or(table[table.len() - 1]);
    let index = (i_hi - i_lo) / (c_hi - c_lo) * (concentration - c_lo) + i_lo;
    // Nudge past float error so exact breakpoint edges floor to the edge index
    Some((index + 1e-9).clamp(0.0, 500.0).floor())
}

/// AQI and primary pollutant for the given concentrations, or `None` when
/// neither concentration is usable.
#[must_use]
pub fn calculate_aqi(pm25: Option<f64>, pm10: Option<f64>) -> Option<(f64, Pollutant)> {
    let pm25 = pm25
        .and_then(|c| sub_index(c, &PM25_BREAKPOINTS))
        .map(|aqi| (aqi, Pollutant::Pm25));
    let pm10 = pm10
        .and_then(|c| sub_index(c, &PM10_BREAKPOINTS))
        .map(|aqi| (aqi, Pollutant::Pm10));

    match (pm25, pm10) {
        (Some(a), Some(b)) => Some(if b.0 > a.0 { b } else { a }),
        (a, b) => a.or(b),
    }
}
