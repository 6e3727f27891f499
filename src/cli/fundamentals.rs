use super::ui;
use crate::App;
use crate::core::fundamentals::Fundamentals;
use crate::core::symbol::Symbol;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color};

pub async fn run(app: &App, symbol: &str) -> Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let fundamentals = app
        .cache
        .fundamentals(symbol.as_str(), app.config.cache.fundamentals_ttl())
        .await?;

    let name = fundamentals.long_name.as_deref().unwrap_or(symbol.as_str());
    println!(
        "{}",
        ui::style_text(&format!("{name} ({symbol})"), ui::StyleType::Title)
    );
    println!(
        "{} {}   {} {}",
        ui::style_text("Industry:", ui::StyleType::Label),
        fundamentals.industry.as_deref().unwrap_or("N/A"),
        ui::style_text("Website:", ui::StyleType::Label),
        fundamentals.website.as_deref().unwrap_or("N/A")
    );

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    for (label, value) in fundamentals_rows(&fundamentals) {
        let cell = Cell::new(&value).set_alignment(CellAlignment::Right);
        let cell = if value == "undefined" {
            cell.fg(Color::DarkGrey)
        } else {
            cell
        };
        table.add_row(vec![Cell::new(label), cell]);
    }
    table.add_row(vec![
        Cell::new("Source"),
        Cell::new(&fundamentals.source).fg(Color::DarkGrey),
    ]);
    println!("{table}");
    Ok(())
}

/// Label and rendered value per figure. Missing figures read "undefined".
pub(crate) fn fundamentals_rows(f: &Fundamentals) -> Vec<(&'static str, String)> {
    let ratio = |v: Option<f64>| v.map_or("undefined".to_string(), |v| format!("{v:.2}"));
    let dollars = |v: Option<f64>| v.map_or("undefined".to_string(), ui::format_large);
    vec![
        ("Market Cap", dollars(f.market_cap)),
        ("Enterprise Value", dollars(f.enterprise_value)),
        ("Beta", ratio(f.beta)),
        ("Trailing P/E", ratio(f.trailing_pe)),
        ("Forward P/E", ratio(f.forward_pe)),
        ("Trailing EPS", ratio(f.trailing_eps)),
        ("Forward EPS", ratio(f.forward_eps)),
        ("Dividend Yield", ui::format_percent(f.dividend_yield, 2)),
        ("Profit Margin", ui::format_percent(f.profit_margin, 1)),
        ("Return on Equity", ui::format_percent(f.return_on_equity, 1)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_render_figures_and_undefined_gaps() {
        let fundamentals = Fundamentals {
            source: "yahoo".to_string(),
            market_cap: Some(3.09e12),
            beta: Some(1.68),
            trailing_pe: Some(58.4012),
            dividend_yield: Some(0.0003),
            profit_margin: Some(0.5312),
            return_on_equity: Some(1.2348),
            ..Fundamentals::default()
        };
        let rows = fundamentals_rows(&fundamentals);
        let value = |label: &str| {
            rows.iter()
                .find(|(l, _)| *l == label)
                .map(|(_, v)| v.clone())
                .unwrap()
        };

        assert_eq!(rows.len(), 10);
        assert_eq!(value("Market Cap"), "$3.09T");
        assert_eq!(value("Beta"), "1.68");
        assert_eq!(value("Trailing P/E"), "58.40");
        assert_eq!(value("Dividend Yield"), "0.03%");
        assert_eq!(value("Profit Margin"), "53.1%");
        assert_eq!(value("Return on Equity"), "123.5%");
        assert_eq!(value("Forward P/E"), "undefined");
        assert_eq!(value("Enterprise Value"), "undefined");
        assert_eq!(value("Trailing EPS"), "undefined");
    }
}
