//! Utility functions for visualization: colors, date axis mapping, ranges, tick labels.

use anyhow::{Result, anyhow};
use chrono::{Datelike, NaiveDate};
use num_format::{Locale, ToFormattedString};
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
/// Order: Blue, Orange, Gray, Gold, Light Blue, Green, Dark Blue, Dark Orange, Dark Gray, Brownish Gold.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// Get a color from the Office palette.
#[inline]
pub fn office_color(idx: usize) -> RGBAColor {
    OFFICE10[idx % OFFICE10.len()].to_rgba()
}

/// Map a user-provided locale tag to a num-format Locale.
/// Supported tags (case-insensitive): "en", "de", "fr", "es", "it", "pt", "nl", "pl"
pub fn map_locale(tag: &str) -> &'static Locale {
    match tag.to_lowercase().as_str() {
        "de" | "de_de" | "german" => &Locale::de,
        "fr" | "fr_fr" => &Locale::fr,
        "es" | "es_es" => &Locale::es,
        "it" | "it_it" => &Locale::it,
        "pt" | "pt_pt" | "pt_br" => &Locale::pt,
        "nl" | "nl_nl" => &Locale::nl,
        "pl" | "pl_pl" | "polish" => &Locale::pl,
        _ => &Locale::en,
    }
}

/// Dates are plotted on an `f64` axis of days since 0001-01-01.
#[inline]
pub fn day_number(d: NaiveDate) -> f64 {
    d.num_days_from_ce() as f64
}

pub fn from_day_number(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

/// Tick label for the date axis.
pub fn date_label(x: &f64) -> String {
    from_day_number(*x)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

/// Tick label for a value axis: thousands separators for large magnitudes, two decimals otherwise.
pub fn value_label(v: f64, locale: &Locale) -> String {
    if v.abs() >= 1000.0 {
        (v.round() as i64).to_formatted_string(locale)
    } else {
        format!("{v:.2}")
    }
}

/// Padded `(min, max)` of finite values; `None` when there are none.
pub fn value_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if !min.is_finite() {
        return None;
    }
    if (max - min).abs() < f64::EPSILON {
        return Some((min - 1.0, max + 1.0));
    }
    let pad = (max - min) * 0.05;
    Some((min - pad, max + pad))
}

/// Day-number range covering `dates`, widened to at least two days.
pub fn date_range(dates: impl IntoIterator<Item = NaiveDate>) -> Result<(f64, f64)> {
    let mut it = dates.into_iter();
    let first = it.next().ok_or_else(|| anyhow!("no dates to plot"))?;
    let (lo, hi) = it.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
    let (lo, hi) = (day_number(lo), day_number(hi));
    if hi - lo < 1.0 {
        Ok((lo - 1.0, hi + 1.0))
    } else {
        Ok((lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_numbers_round_trip_on_tick_labels() {
        let d = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        assert_eq!(date_label(&day_number(d)), "2021-03");
    }

    #[test]
    fn flat_series_gets_room() {
        assert_eq!(value_range([2.0, 2.0]), Some((1.0, 3.0)));
        assert_eq!(value_range([f64::NAN]), None);
        let (lo, hi) = value_range([0.0, 10.0]).unwrap();
        assert!(lo < 0.0 && hi > 10.0);
    }

    #[test]
    fn large_values_use_locale_grouping() {
        assert_eq!(value_label(1_234_567.0, map_locale("en")), "1,234,567");
        assert_eq!(value_label(1_234_567.0, map_locale("de")), "1.234.567");
        assert_eq!(value_label(12.3456, map_locale("en")), "12.35");
    }
}
