use std::io::Read;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use coc_import::catalog::{MemoryStore, NullCatalog, StaticLocalizer};
use coc_import::config::AppConfig;
use coc_import::importer::{
    import_character, language_or_default, parse_statblock, ConversionMode, EntityKind,
    ImportOptions,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EditionArg {
    /// Convert when the statblock reads as 6th edition
    Auto,
    /// Always apply the 6th-to-7th edition conversion
    Sixth,
    /// Leave values as printed
    Seventh,
}

impl From<EditionArg> for ConversionMode {
    fn from(value: EditionArg) -> Self {
        match value {
            EditionArg::Auto => ConversionMode::Auto,
            EditionArg::Sixth => ConversionMode::Convert,
            EditionArg::Seventh => ConversionMode::Skip,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Character,
    Npc,
    Creature,
}

impl From<KindArg> for EntityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Character => EntityKind::Character,
            KindArg::Npc => EntityKind::Npc,
            KindArg::Creature => EntityKind::Creature,
        }
    }
}

#[derive(Parser)]
#[command(name = "coc-import", version)]
#[command(about = "Parse a pasted Call of Cthulhu statblock into structured JSON")]
struct Cli {
    /// Statblock text file, or '-' to read stdin
    input: String,
    /// Statblock language (en, fr, de, es); defaults to the config value
    #[arg(short, long)]
    language: Option<String>,
    /// Source edition handling
    #[arg(long, value_enum, default_value_t = EditionArg::Auto)]
    edition: EditionArg,
    /// Kind of entity to create
    #[arg(long, value_enum, default_value_t = KindArg::Character)]
    kind: KindArg,
    /// Print only the intermediate parsed record, skipping assembly
    #[arg(long)]
    record_only: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load();
    let language = match &cli.language {
        Some(code) => language_or_default(code),
        None => config.language(),
    };

    let text = if cli.input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(&cli.input)
            .with_context(|| format!("failed to read {}", cli.input))?
    };

    let localizer = StaticLocalizer::new();

    if cli.record_only {
        let record = parse_statblock(&text, language, cli.edition.into(), &localizer);
        println!("{}", to_json(&record, cli.pretty)?);
        return Ok(());
    }

    let catalog = NullCatalog;
    let store = MemoryStore::new();
    let options = ImportOptions {
        language,
        entity_kind: cli.kind.into(),
        conversion: cli.edition.into(),
        item_search_order: config.import.item_search_order.clone(),
    };
    let imported = import_character(&text, &options, &localizer, &catalog, &store).await?;
    println!("{}", to_json(&imported, cli.pretty)?);
    Ok(())
}
