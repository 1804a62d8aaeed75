use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

use crate::deck::Deck;
use crate::view::TableOfContents;

/// Print the table of contents of a slide document.
pub fn run(file: &Path, json: bool) -> Result<()> {
    let deck =
        Deck::load(file).with_context(|| format!("Failed to read {}", file.display()))?;
    let toc = TableOfContents::build(&deck);

    if json {
        println!("{}", serde_json::to_string_pretty(&toc)?);
        return Ok(());
    }

    if let Some(title) = &deck.title {
        println!("{}", title.bold());
    }
    for (entry, slide) in toc.entries.iter().zip(&deck.slides) {
        let steps = slide.fragment_count();
        let detail = if steps > 0 {
            format!(" ({steps} step{})", if steps == 1 { "" } else { "s" })
        } else {
            String::new()
        };
        println!(
            "{}  {}{}",
            format!("{:>4}", format!("#{}", entry.index + 1)).cyan(),
            entry.title,
            detail.dimmed()
        );
    }
    Ok(())
}
