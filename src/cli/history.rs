use super::ui;
use crate::App;
use crate::core::analytics::{
    daily_returns, moving_average, period_change, sharpe_like, volatility,
};
use crate::core::quote::{HistoryPeriod, HistorySeries};
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

const SHORT_WINDOW: usize = 50;
const LONG_WINDOW: usize = 200;

pub async fn run(app: &App, symbol: &str, period: HistoryPeriod, rows: usize) -> Result<()> {
    let series = app
        .cache
        .history(symbol, period, app.config.cache.history_ttl())
        .await?;

    println!(
        "{}",
        ui::style_text(
            &format!("{} · {} · {} bars", series.symbol, series.period, series.bars.len()),
            ui::StyleType::Title
        )
    );
    display_stats(&series);
    if rows > 0 {
        ui::print_separator();
    }
    display_bars(&series, rows);
    Ok(())
}

fn display_stats(series: &HistorySeries) {
    let closes = series.closes();
    let returns = daily_returns(&closes);
    let ma_short = moving_average(&closes, SHORT_WINDOW);
    let ma_long = moving_average(&closes, LONG_WINDOW);

    let mut table = ui::new_styled_table();
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    table.add_row(vec![
        Cell::new("Period change"),
        ui::change_cell(&period_change(&closes).map(|c| c * 100.0)),
    ]);
    table.add_row(vec![
        Cell::new("Daily volatility"),
        Cell::new(ui::format_percent(volatility(&returns).ok(), 2))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Sharpe-like"),
        Cell::new(
            sharpe_like(&returns).map_or("undefined".to_string(), |s| format!("{s:.3}")),
        )
        .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new(format!("MA{SHORT_WINDOW}")),
        ui::format_optional_cell(ma_short.last().copied().flatten(), ui::format_price),
    ]);
    table.add_row(vec![
        Cell::new(format!("MA{LONG_WINDOW}")),
        ui::format_optional_cell(ma_long.last().copied().flatten(), ui::format_price),
    ]);
    table.add_row(vec![
        Cell::new("Source"),
        Cell::new(&series.source).set_alignment(CellAlignment::Right),
    ]);
    println!("{table}");
}

fn display_bars(series: &HistorySeries, rows: usize) {
    if rows == 0 {
        return;
    }
    let closes = series.closes();
    let ma_short = moving_average(&closes, SHORT_WINDOW);
    let ma_long = moving_average(&closes, LONG_WINDOW);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Date"),
        ui::header_cell("Open"),
        ui::header_cell("High"),
        ui::header_cell("Low"),
        ui::header_cell("Close"),
        ui::header_cell("Volume"),
        ui::header_cell(&format!("MA{SHORT_WINDOW}")),
        ui::header_cell(&format!("MA{LONG_WINDOW}")),
    ]);

    let start = series.bars.len().saturating_sub(rows);
    for (i, bar) in series.bars.iter().enumerate().skip(start) {
        table.add_row(vec![
            Cell::new(bar.date.format("%Y-%m-%d")),
            Cell::new(ui::format_price(bar.open)).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_price(bar.high)).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_price(bar.low)).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_price(bar.close)).set_alignment(CellAlignment::Right),
            Cell::new(ui::format_volume(bar.volume)).set_alignment(CellAlignment::Right),
            ui::format_optional_cell(ma_short[i], ui::format_price),
            ui::format_optional_cell(ma_long[i], ui::format_price),
        ]);
    }
    println!("{table}");
}
