use super::ui;
use crate::App;
use crate::core::boardroom::{Debate, ScenarioView, Synthesis, debate, synthesize};
use crate::core::quote::HistoryPeriod;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment};

/// Debate view over the last month of closes.
pub async fn run_debate(app: &App, symbol: &str) -> Result<()> {
    let series = app
        .cache
        .history(symbol, HistoryPeriod::OneMonth, app.config.cache.history_ttl())
        .await?;
    let result = debate(&series.closes())?;

    println!(
        "{}",
        ui::style_text(&format!("Boardroom · {}", series.symbol), ui::StyleType::Title)
    );
    display_debate(&result);
    Ok(())
}

fn display_debate(result: &Debate) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Analyst"),
        ui::header_cell("Temperament"),
        ui::header_cell("Opinion"),
    ]);
    for (stance, opinion) in &result.opinions {
        table.add_row(vec![
            Cell::new(stance.label()),
            Cell::new(stance.temperament()),
            ui::change_cell(&Ok(opinion * 100.0)),
        ]);
    }
    println!("{table}");

    println!(
        "{} {}",
        ui::style_text("1M change:", ui::StyleType::Label),
        ui::change_text(&Ok(result.price_change * 100.0))
    );
    println!(
        "{} {}",
        ui::style_text("Volatility:", ui::StyleType::Label),
        ui::format_percent(result.volatility, 2)
    );
    println!(
        "{} {} ({})",
        ui::style_text("Verdict:", ui::StyleType::Label),
        ui::style_text(
            &result.verdict.to_string(),
            if result.consensus > 0.0 {
                ui::StyleType::Positive
            } else {
                ui::StyleType::Negative
            }
        ),
        ui::format_fraction(&Ok(result.consensus))
    );
}

/// Synthetic consensus over the configured analyst panel.
pub fn run_consensus(app: &App) -> Result<()> {
    let panel = &app.config.boardroom.panel;
    let synthesis = synthesize(panel)?;
    println!("{}", ui::style_text("Consensus", ui::StyleType::Title));
    display_synthesis(panel, &synthesis);
    Ok(())
}

fn display_synthesis(panel: &[ScenarioView], synthesis: &Synthesis) {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Analyst"),
        ui::header_cell("Expected Move"),
        ui::header_cell("Confidence"),
    ]);
    for (view, (name, ev)) in panel.iter().zip(&synthesis.expected_values) {
        table.add_row(vec![
            Cell::new(name),
            ui::change_cell(&Ok(ev * 100.0)),
            Cell::new(format!("{:.0}%", view.confidence() * 100.0))
                .set_alignment(CellAlignment::Right),
        ]);
    }
    table.add_row(vec![
        Cell::new("Target").add_attribute(comfy_table::Attribute::Bold),
        ui::change_cell(&Ok(synthesis.target * 100.0)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Conviction"),
        Cell::new(format!("{:.1}%", synthesis.conviction * 100.0))
            .set_alignment(CellAlignment::Right),
        Cell::new(""),
    ]);
    println!("{table}");

    println!(
        "{} {}   {} {}",
        ui::style_text("Market state:", ui::StyleType::Label),
        synthesis.market_state,
        ui::style_text("Directive:", ui::StyleType::Label),
        synthesis.directive
    );
}
