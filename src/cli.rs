use crate::model::{NormalizedRecord, Source};
use clap::{Parser, Subcommand};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "basket-optimiser", about = "Compare unit prices across retail sites")]
pub struct Cli {
    /// Path to the JSON config file
    #[arg(long, default_value = "config.json")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest every *.json dataset in a folder (source inferred from file name)
    Ingest { dir: PathBuf },
    /// Ingest a single dataset file
    IngestFile {
        file: PathBuf,
        /// amazon, target or walmart; inferred from the file name if omitted
        #[arg(long)]
        source: Option<Source>,
    },
    /// Show the best unit prices for a product keyword
    Best {
        keyword: String,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the best unit prices for every configured product
    Compare {
        #[arg(long, default_value_t = 3)]
        limit: usize,
    },
}

/// Plain-text ranking, cheapest per unit first.
pub fn format_ranking(keyword: &str, records: &[NormalizedRecord], limit: usize) -> String {
    let mut out = String::new();
    if records.is_empty() {
        let _ = writeln!(out, "No data available for {}.", keyword);
        return out;
    }

    let _ = writeln!(out, "Best unit prices for {}:", keyword);
    for (i, r) in records.iter().take(limit).enumerate() {
        let unit = r.normalized_unit.as_deref().unwrap_or("unit");
        let _ = writeln!(
            out,
            "{}. {} — {} — ${:.3} / {}",
            i + 1,
            r.source,
            r.title,
            r.price_per_unit.unwrap_or_default(),
            unit
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PricePerUnitStatus;
    use chrono::Utc;

    fn record(source: &str, ppu: f64) -> NormalizedRecord {
        NormalizedRecord {
            id: "id".into(),
            title: "Protein Bar 12 ct".into(),
            price: Some(12.0),
            unit_text: None,
            normalized_unit_qty: Some(12.0),
            normalized_unit: Some("unit".into()),
            price_per_unit: Some(ppu),
            price_per_unit_status: PricePerUnitStatus::Ok,
            source: source.into(),
            url: None,
            normalized_at: Utc::now(),
        }
    }

    #[test]
    fn formats_ranked_lines() {
        let text = format_ranking("Protein Bar", &[record("Target", 1.0), record("Amazon", 1.25)], 10);
        assert_eq!(
            text,
            "Best unit prices for Protein Bar:\n\
             1. Target — Protein Bar 12 ct — $1.000 / unit\n\
             2. Amazon — Protein Bar 12 ct — $1.250 / unit\n"
        );
    }

    #[test]
    fn respects_limit_and_empty() {
        let text = format_ranking("x", &[record("Target", 1.0), record("Amazon", 2.0)], 1);
        assert_eq!(text.lines().count(), 2);
        assert_eq!(format_ranking("Eggs", &[], 5), "No data available for Eggs.\n");
    }

    #[test]
    fn parses_subcommands() {
        let cli = Cli::try_parse_from(["basket-optimiser", "ingest-file", "x.json", "--source", "walmart"]).unwrap();
        match cli.command {
            Command::IngestFile { source, .. } => assert_eq!(source, Some(Source::Walmart)),
            other => panic!("unexpected command: {other:?}"),
        }

        let cli = Cli::try_parse_from(["basket-optimiser", "--config", "c.json", "best", "toilet paper"]).unwrap();
        assert_eq!(cli.config, "c.json");
        assert!(matches!(cli.command, Command::Best { ref keyword, limit: 10 } if keyword == "toilet paper"));
    }
}
