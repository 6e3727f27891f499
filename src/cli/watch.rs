use super::ui;
use crate::App;
use crate::core::quote::Quote;
use crate::core::symbol::Symbol;
use crate::refresh::{QuoteUpdate, RefreshLoop};
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Streams quotes until Ctrl-C, or until `count` updates have been printed.
pub async fn run(
    app: &App,
    symbol: &str,
    interval: Duration,
    count: Option<usize>,
) -> Result<()> {
    let symbol = Symbol::parse(symbol)?;
    if count == Some(0) {
        debug!("Update count is zero, nothing to watch");
        return Ok(());
    }
    let refresh = RefreshLoop::new(
        Arc::clone(&app.cache),
        symbol.clone(),
        interval,
        app.config.cache.quote_ttl(),
    );

    println!(
        "{}",
        ui::style_text(
            &format!(
                "Watching {} every {}s via {} (Ctrl-C to stop)",
                refresh.symbol(),
                interval.as_secs_f64(),
                app.cache.provider_name()
            ),
            ui::StyleType::Subtle
        )
    );

    let mut handle = refresh.spawn();
    let mut printed = 0usize;
    loop {
        tokio::select! {
            update = handle.recv() => {
                let Some(update) = update else { break };
                let last_known = app.cache.last_known(&symbol);
                println!("{}", format_update(&symbol, &update, last_known.as_ref()));
                printed += 1;
                if count.is_some_and(|limit| printed >= limit) {
                    debug!(printed, "Update count reached");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping refresh loop");
                break;
            }
        }
    }

    handle.shutdown().await?;
    Ok(())
}

fn format_update(symbol: &Symbol, update: &QuoteUpdate, last_known: Option<&Quote>) -> String {
    match update {
        Ok(quote) => {
            let price = quote
                .display_price()
                .map_or("N/A".to_string(), ui::format_price);
            format!(
                "[{}] {} {} {} via {}",
                quote.observed_at.format("%H:%M:%S"),
                ui::style_text(symbol.as_str(), ui::StyleType::Label),
                price,
                ui::change_text(&quote.change_percent()),
                quote.source
            )
        }
        Err(e) => {
            let fallback = match last_known.and_then(|q| q.display_price().map(|p| (p, q))) {
                Some((price, quote)) => format!(
                    "last known {} at {}",
                    ui::format_price(price),
                    quote.observed_at.format("%H:%M:%S")
                ),
                None => "no previous value".to_string(),
            };
            format!(
                "{} {} {}",
                ui::style_text(&format!("{symbol} degraded:"), ui::StyleType::Error),
                e,
                ui::style_text(&format!("({fallback})"), ui::StyleType::Subtle)
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::QuoteError;
    use crate::core::quote::QuoteDetails;
    use chrono::{TimeZone, Utc};

    fn quote(price: f64) -> Quote {
        Quote {
            symbol: Symbol::parse("NVDA").unwrap(),
            price: Some(price),
            previous_close: Some(100.0),
            observed_at: Utc.with_ymd_and_hms(2024, 8, 28, 14, 30, 5).unwrap(),
            source: "yahoo".to_string(),
            details: QuoteDetails::default(),
        }
    }

    #[test]
    fn test_format_live_and_degraded_lines() {
        console::set_colors_enabled(false);
        let symbol = Symbol::parse("NVDA").unwrap();

        let live = format_update(&symbol, &Ok(quote(102.0)), None);
        assert_eq!(live, "[14:30:05] NVDA 102.00 +2.00% via yahoo");

        let failure: QuoteUpdate = Err(QuoteError::DataUnavailable {
            symbol: "NVDA".to_string(),
            reason: "timeout".to_string(),
        });
        let degraded = format_update(&symbol, &failure, Some(&quote(101.5)));
        assert!(degraded.starts_with("NVDA degraded:"));
        assert!(degraded.ends_with("(last known 101.50 at 14:30:05)"));

        let cold = format_update(&symbol, &failure, None);
        assert!(cold.ends_with("(no previous value)"));
    }
}
