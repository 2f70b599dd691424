//! Visualization utilities: render charts to **SVG** or **PNG** (chosen by file extension).
//!
//! - [`plot_series`]: one line per column of a [`SeriesTable`]
//! - [`plot_instrument_summary`]: two panels (fund price in home currency, fund price in its
//!   own currency), each with the macro table overlaid on a secondary axis
//!
//! Text is rendered through `ab_glyph`, which does not discover system fonts. A TrueType
//! font is looked up once from `ESMACRO_FONT` or a few common install paths.

pub mod util;

use crate::models::SeriesTable;
use crate::summary::InstrumentSummary;
use anyhow::{Result, anyhow, bail};
use chrono::NaiveDate;
use log::debug;
use num_format::Locale;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontFamily;

use plotters_bitmap::BitMapBackend;
use plotters_svg::SVGBackend;

use std::path::Path;
use std::sync::OnceLock;

use util::{date_label, date_range, day_number, map_locale, office_color, value_label, value_range};

/// Environment variable naming a `.ttf` file to use for chart text.
pub const FONT_ENV: &str = "ESMACRO_FONT";

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

fn register_first_font() -> bool {
    let from_env = std::env::var(FONT_ENV).ok();
    for path in from_env.iter().map(String::as_str).chain(FONT_CANDIDATES.iter().copied()) {
        let Ok(bytes) = std::fs::read(path) else {
            continue;
        };
        // ab_glyph keeps a reference for the process lifetime.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        if plotters::style::register_font("sans-serif", FontStyle::Normal, bytes).is_ok() {
            debug!("chart font: {path}");
            return true;
        }
    }
    false
}

/// Whether a font could be registered for chart text.
pub fn fonts_available() -> bool {
    *FONT_READY.get_or_init(register_first_font)
}

fn ensure_fonts_registered() -> Result<()> {
    if fonts_available() {
        Ok(())
    } else {
        bail!("no usable TrueType font found; set {FONT_ENV} to a .ttf file")
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"))
}

/// Line chart of every column of `table`, locale `"en"`.
pub fn plot_series<P: AsRef<Path>>(
    table: &SeriesTable,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
) -> Result<()> {
    plot_series_locale(table, out_path, width, height, title, "en")
}

/// Same as [`plot_series`] with a locale tag for tick labels (e.g. `"de"`).
pub fn plot_series_locale<P: AsRef<Path>>(
    table: &SeriesTable,
    out_path: P,
    width: u32,
    height: u32,
    title: &str,
    locale_tag: &str,
) -> Result<()> {
    if table.is_empty() {
        return Err(anyhow!("no data to plot"));
    }
    ensure_fonts_registered()?;
    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    let locale = map_locale(locale_tag);

    if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_series_chart(root, table, title, locale)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_series_chart(root, table, title, locale)
    }
}

fn table_points(table: &SeriesTable, idx: usize) -> Vec<(f64, f64)> {
    table
        .dates
        .iter()
        .zip(&table.values)
        .map(|(d, row)| (day_number(*d), row[idx]))
        .collect()
}

fn draw_series_chart<DB>(
    root: DrawingArea<DB, Shift>,
    table: &SeriesTable,
    title: &str,
    locale: &Locale,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;

    let (x_min, x_max) = date_range(table.dates.iter().copied())?;
    let (y_min, y_max) = value_range(table.values.iter().flatten().copied())
        .ok_or_else(|| anyhow!("no numeric values to plot"))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(16)
        .caption(title, (FontFamily::SansSerif, 24))
        .set_label_area_size(LabelAreaPosition::Left, 80)
        .set_label_area_size(LabelAreaPosition::Bottom, 44)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?;

    let y_label_fmt = |v: &f64| value_label(*v, locale);
    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc("Value")
        .x_labels(10)
        .y_labels(10)
        .x_label_formatter(&date_label)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 16))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    for (idx, column) in table.columns.iter().enumerate() {
        let color = office_color(idx);
        chart
            .draw_series(LineSeries::new(table_points(table, idx), color.stroke_width(2)))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(column.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

/// Two-panel comparison chart of a fund against a macro table.
///
/// The macro table is drawn unmodified on the secondary (right) axis, limited to
/// dates on or after the fund's first priced day.
pub fn plot_instrument_summary<P: AsRef<Path>>(
    summary: &InstrumentSummary,
    macro_table: &SeriesTable,
    out_path: P,
    width: u32,
    height: u32,
) -> Result<()> {
    let first = summary
        .first_date()
        .ok_or_else(|| anyhow!("no prices to plot for {}", summary.symbol))?;
    ensure_fonts_registered()?;
    let overlay = macro_table.since(first);

    let panels = [
        (
            summary.close_home_series(),
            format!("{}, {}", summary.symbol, summary.home),
        ),
        (
            summary.close_series(),
            format!("{}, {}", summary.symbol, summary.currency),
        ),
    ];

    let out_path = out_path.as_ref();
    let path_string = out_path.to_string_lossy().into_owned();
    if is_svg(out_path) {
        let root = SVGBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_summary_chart(root, &panels, &overlay)
    } else {
        let root = BitMapBackend::new(path_string.as_str(), (width, height)).into_drawing_area();
        draw_summary_chart(root, &panels, &overlay)
    }
}

fn draw_summary_chart<DB>(
    root: DrawingArea<DB, Shift>,
    panels: &[(Vec<(NaiveDate, f64)>, String)],
    overlay: &SeriesTable,
) -> Result<()>
where
    DB: DrawingBackend,
{
    root.fill(&WHITE).map_err(|e| anyhow!("{:?}", e))?;
    let areas = root.split_evenly((panels.len(), 1));
    for (area, (series, label)) in areas.iter().zip(panels) {
        draw_panel(area, series, label, overlay)?;
    }
    root.present().map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}

fn draw_panel<DB>(
    area: &DrawingArea<DB, Shift>,
    series: &[(NaiveDate, f64)],
    label: &str,
    overlay: &SeriesTable,
) -> Result<()>
where
    DB: DrawingBackend,
{
    let (x_min, x_max) = date_range(
        series
            .iter()
            .map(|(d, _)| *d)
            .chain(overlay.dates.iter().copied()),
    )?;
    let (y_min, y_max) =
        value_range(series.iter().map(|(_, v)| *v)).unwrap_or((0.0, 1.0));
    let (r_min, r_max) =
        value_range(overlay.values.iter().flatten().copied()).unwrap_or((0.0, 1.0));

    let mut chart = ChartBuilder::on(area)
        .margin(16)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Right, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(|e| anyhow!("{:?}", e))?
        .set_secondary_coord(x_min..x_max, r_min..r_max);

    let y_label_fmt = |v: &f64| format!("{v:.2}");
    chart
        .configure_mesh()
        .x_labels(10)
        .y_labels(8)
        .x_label_formatter(&date_label)
        .y_label_formatter(&y_label_fmt)
        .y_desc(label)
        .label_style((FontFamily::SansSerif, 12))
        .axis_desc_style((FontFamily::SansSerif, 14))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    chart
        .configure_secondary_axes()
        .y_labels(8)
        .y_label_formatter(&y_label_fmt)
        .label_style((FontFamily::SansSerif, 12))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;

    let price_color = office_color(0);
    chart
        .draw_series(LineSeries::new(
            series.iter().map(|(d, v)| (day_number(*d), *v)),
            price_color.stroke_width(2),
        ))
        .map_err(|e| anyhow!("{:?}", e))?
        .label(label.to_string())
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], price_color));

    for (idx, column) in overlay.columns.iter().enumerate() {
        let color = office_color(idx + 1).mix(0.5);
        chart
            .draw_secondary_series(LineSeries::new(
                table_points(overlay, idx),
                color.stroke_width(2),
            ))
            .map_err(|e| anyhow!("{:?}", e))?
            .label(column.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], color));
    }

    chart
        .configure_series_labels()
        .border_style(&BLACK)
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.85))
        .label_font((FontFamily::SansSerif, 13))
        .draw()
        .map_err(|e| anyhow!("{:?}", e))?;
    Ok(())
}
