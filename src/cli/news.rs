use super::ui;
use crate::App;
use crate::core::news::NewsItem;
use crate::core::symbol::Symbol;
use anyhow::Result;
use tracing::info;

pub async fn run(app: &App, symbol: &str, limit: usize) -> Result<()> {
    let symbol = Symbol::parse(symbol)?;
    let items = app.news.fetch_news(&symbol, limit).await?;
    info!(%symbol, count = items.len(), "Fetched headlines");

    println!(
        "{}",
        ui::style_text(&format!("Latest headlines for {symbol}"), ui::StyleType::Title)
    );
    if items.is_empty() {
        println!("{}", ui::style_text("No headlines found.", ui::StyleType::Subtle));
        return Ok(());
    }
    for item in &items {
        println!("{}", format_item(item));
    }
    Ok(())
}

fn format_item(item: &NewsItem) -> String {
    let mut meta = Vec::new();
    if let Some(publisher) = &item.publisher {
        meta.push(publisher.clone());
    }
    if let Some(published) = item.published {
        meta.push(published.format("%Y-%m-%d %H:%M UTC").to_string());
    }

    let mut line = format!("• {}", ui::style_text(&item.title, ui::StyleType::Label));
    if !meta.is_empty() {
        let meta = ui::style_text(&meta.join(" · "), ui::StyleType::Subtle);
        line.push_str(&format!("\n  {meta}"));
    }
    line.push_str(&format!("\n  {}", item.link));
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_item_includes_available_metadata() {
        console::set_colors_enabled(false);
        let item = NewsItem {
            title: "Nvidia beats".to_string(),
            published: Some(Utc.with_ymd_and_hms(2024, 8, 28, 20, 25, 0).unwrap()),
            link: "https://example.com/a".to_string(),
            publisher: Some("Reuters".to_string()),
        };
        assert_eq!(
            format_item(&item),
            "• Nvidia beats\n  Reuters · 2024-08-28 20:25 UTC\n  https://example.com/a"
        );

        let bare = NewsItem {
            published: None,
            publisher: None,
            ..item
        };
        assert_eq!(format_item(&bare), "• Nvidia beats\n  https://example.com/a");
    }
}
