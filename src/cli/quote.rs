use super::ui;
use crate::App;
use crate::core::error::QuoteError;
use crate::core::quote::Quote;
use anyhow::Result;
use comfy_table::{Cell, Color};
use futures::future::join_all;

struct QuoteRow {
    requested: String,
    result: Result<Quote, QuoteError>,
}

pub async fn run(app: &App, symbols: &[String]) -> Result<()> {
    let ttl = app.config.cache.quote_ttl();

    let pb = ui::new_progress_bar(symbols.len() as u64, false);
    let futures = symbols.iter().map(|requested| {
        let pb = pb.clone();
        async move {
            let result = app.cache.get(requested, ttl).await;
            pb.inc(1);
            QuoteRow {
                requested: requested.clone(),
                result,
            }
        }
    });
    let rows: Vec<QuoteRow> = join_all(futures).await;
    pb.finish_and_clear();

    display_quotes(&rows);

    let failures: Vec<&QuoteRow> = rows.iter().filter(|r| r.result.is_err()).collect();
    for row in &failures {
        if let Err(e) = &row.result {
            println!("{}", ui::style_text(&format!("• {e}"), ui::StyleType::Error));
        }
    }
    if !failures.is_empty() {
        println!(
            "{}",
            ui::style_text(
                "Could not load some tickers; double-check the symbols.",
                ui::StyleType::Subtle
            )
        );
    }

    Ok(())
}

fn display_quotes(rows: &[QuoteRow]) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Price"),
        ui::header_cell("Prev Close"),
        ui::header_cell("Change"),
        ui::header_cell("52W Low"),
        ui::header_cell("52W High"),
        ui::header_cell("Volume"),
        ui::header_cell("Source"),
    ]);

    for row in rows {
        table.add_row(quote_cells(row));
    }

    println!("{table}");
}

fn quote_cells(row: &QuoteRow) -> Vec<Cell> {
    match &row.result {
        Ok(quote) => {
            let price_label = |p: f64| match &quote.details.currency {
                Some(currency) => format!("{} {}", ui::format_price(p), currency),
                None => ui::format_price(p),
            };
            vec![
                Cell::new(quote.symbol.as_str()),
                Cell::new(quote.details.long_name.as_deref().unwrap_or("")),
                ui::format_optional_cell(quote.price, price_label),
                ui::format_optional_cell(quote.previous_close, ui::format_price),
                ui::change_cell(&quote.change_percent()),
                ui::format_optional_cell(quote.details.fifty_two_week_low, ui::format_price),
                ui::format_optional_cell(quote.details.fifty_two_week_high, ui::format_price),
                ui::format_optional_cell(quote.details.volume, ui::format_volume),
                Cell::new(&quote.source).fg(Color::DarkGrey),
            ]
        }
        Err(_) => {
            let mut cells = vec![Cell::new(row.requested.trim()).fg(Color::Red)];
            cells.extend((0..8).map(|_| ui::na_cell(true)));
            cells
        }
    }
}
