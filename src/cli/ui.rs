use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::core::error::QuoteError;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Label,
    Positive,
    Negative,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Label => style(text).bold(),
        StyleType::Positive => style(text).green().bold(),
        StyleType::Negative => style(text).red().bold(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats an `Option<T>` into a `Cell`. `None` is displayed as "N/A".
pub fn format_optional_cell<T>(value: Option<T>, format_fn: impl Fn(T) -> String) -> Cell {
    value.map_or(
        Cell::new("N/A")
            .fg(Color::DarkGrey)
            .set_alignment(CellAlignment::Right),
        |v| Cell::new(format_fn(v)).set_alignment(CellAlignment::Right),
    )
}

/// Signed percentage with two decimals, e.g. `+2.00%`. Undefined values read "undefined".
pub fn format_change(change: &Result<f64, QuoteError>) -> String {
    match change {
        Ok(value) => format!("{value:+.2}%"),
        Err(_) => "undefined".to_string(),
    }
}

/// Same as [`format_change`] for a fraction, e.g. `0.02` is `+2.00%`.
pub fn format_fraction(change: &Result<f64, QuoteError>) -> String {
    format_change(&change.clone().map(|v| v * 100.0))
}

/// Unsigned percentage of a fraction with `decimals` places, e.g. `0.0123` is `1.23%`.
pub fn format_percent(fraction: Option<f64>, decimals: usize) -> String {
    fraction.map_or("undefined".to_string(), |v| {
        format!("{:.*}%", decimals, v * 100.0)
    })
}

/// Compact dollar amount, e.g. `$3.02T`.
pub fn format_large(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${value:.0}")
    }
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: &Result<f64, QuoteError>) -> Cell {
    let text = format_change(change);
    let color = match change {
        Ok(value) if *value >= 0.0 => Color::Green,
        Ok(_) => Color::Red,
        Err(_) => Color::DarkGrey,
    };
    Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
}

/// Styles a change for inline text output.
pub fn change_text(change: &Result<f64, QuoteError>) -> String {
    let text = format_change(change);
    match change {
        Ok(value) if *value >= 0.0 => style_text(&text, StyleType::Positive),
        Ok(_) => style_text(&text, StyleType::Negative),
        Err(_) => style_text(&text, StyleType::Subtle),
    }
}

/// Creates a cell for "N/A" values, with error-specific styling.
pub fn na_cell(has_error: bool) -> Cell {
    let color = if has_error {
        Color::Red
    } else {
        Color::DarkGrey
    };
    Cell::new("N/A").fg(color)
}

pub fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

/// Compact volume, e.g. `51.2M`.
pub fn format_volume(volume: u64) -> String {
    let v = volume as f64;
    if v >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if v >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if v >= 1e3 {
        format!("{:.1}K", v / 1e3)
    } else {
        volume.to_string()
    }
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, with_message: bool) -> ProgressBar {
    let template = if with_message {
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    } else {
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})"
    };

    let pb = ProgressBar::new(len);
    if let Ok(bar_style) = ProgressStyle::default_bar().template(template) {
        pb.set_style(bar_style.progress_chars("#>-"));
    }
    pb
}

/// Prints a separator line matching the terminal width.
pub fn print_separator() {
    let term_width = console::Term::stdout()
        .size_checked()
        .map(|(_, w)| w as usize)
        .unwrap_or(80);
    println!("\n{}", "─".repeat(term_width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_change_signs_and_undefined() {
        assert_eq!(format_change(&Ok(2.0000000000000004)), "+2.00%");
        assert_eq!(format_change(&Ok(-1.234)), "-1.23%");
        assert_eq!(
            format_change(&Err(QuoteError::ComputationUndefined("percent change"))),
            "undefined"
        );
        assert_eq!(format_fraction(&Ok(0.0203)), "+2.03%");
    }

    #[test]
    fn test_format_percent_is_unsigned() {
        assert_eq!(format_percent(Some(0.0123), 2), "1.23%");
        assert_eq!(format_percent(Some(0.2557), 1), "25.6%");
        assert_eq!(format_percent(None, 2), "undefined");
        assert!(!format_percent(Some(0.0203), 2).starts_with('+'));
    }

    #[test]
    fn test_format_large() {
        assert_eq!(format_large(3.02e12), "$3.02T");
        assert_eq!(format_large(45_600_000_000.0), "$45.60B");
        assert_eq!(format_large(7_250_000.0), "$7.25M");
        assert_eq!(format_large(950.0), "$950");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(999), "999");
        assert_eq!(format_volume(51_234_567), "51.2M");
        assert_eq!(format_volume(2_500_000_000), "2.5B");
        assert_eq!(format_volume(12_300), "12.3K");
    }
}
