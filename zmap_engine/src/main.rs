#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** zmap **
//! Dungeon reachability mapper and progression-blocker finder.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use zmap_data::{DungeonGroup, ItemCode, item_name};
use zmap_engine::{DecodeMode, Rom, format_json, format_text, load_config, load_level_map, run_mapping};

#[derive(Parser)]
#[command(author, version, about = "Map dungeon reachability and find progression blockers in a ROM image.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map every level, print the maps, blocker warnings and items found.
    Map(MapArgs),
    /// Overwrite the item code of one room and save the image.
    SetItem(SetItemArgs),
}

#[derive(Args)]
struct MapArgs {
    /// ROM image to read.
    rom: PathBuf,
    /// Read the XOR-paired room tables through the pointer table.
    #[arg(long)]
    decode_mode: bool,
    /// TOML file overriding special items, combat rules and hypotheses.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Print without ANSI colors.
    #[arg(long)]
    no_color: bool,
}

#[derive(Args)]
struct SetItemArgs {
    /// ROM image to patch.
    rom: PathBuf,
    /// Room number (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_byte)]
    room: u8,
    #[arg(long, value_enum)]
    group: Group,
    /// Item code (decimal or 0x-prefixed hex).
    #[arg(long, value_parser = parse_byte)]
    item: ItemCode,
    /// Write the patched image here instead of over the input.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Group {
    #[value(name = "1-6")]
    Early,
    #[value(name = "7-9")]
    Late,
}

impl From<Group> for DungeonGroup {
    fn from(group: Group) -> Self {
        match group {
            Group::Early => DungeonGroup::Early,
            Group::Late => DungeonGroup::Late,
        }
    }
}

fn parse_byte(text: &str) -> Result<u8, String> {
    let value = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse(),
    };
    value.map_err(|e| format!("'{text}' is not a byte value: {e}"))
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Map(args) => map(&args),
        Commands::SetItem(args) => set_item(&args),
    }
}

fn map(args: &MapArgs) -> Result<()> {
    if args.no_color {
        colored::control::set_override(false);
    }
    let mode = if args.decode_mode {
        DecodeMode::Encoded
    } else {
        DecodeMode::Direct
    };
    let config = load_config(args.config.as_deref());
    let rom = Rom::open(&args.rom).context("while loading ROM image")?;
    let mut levels = load_level_map(&rom, mode).context("while decoding dungeon data")?;

    let report = run_mapping(&mut levels, &config);
    info!(
        "mapping finished: {} levels, {} blocker warnings",
        report.levels.len(),
        report.warning_count()
    );
    match args.format {
        Format::Text => print!("{}", format_text(&report)),
        Format::Json => println!("{}", format_json(&report)?),
    }
    Ok(())
}

fn set_item(args: &SetItemArgs) -> Result<()> {
    let Some(name) = item_name(args.item) else {
        bail!("item code {:#04x} is outside the item table", args.item);
    };
    let mut rom = Rom::open(&args.rom).context("while loading ROM image")?;
    rom.write_room_item_code(args.room, args.group.into(), args.item)
        .with_context(|| format!("while setting the item of room {:#04x}", args.room))?;
    let out = args.out.as_ref().unwrap_or(&args.rom);
    rom.save(out).context("while saving ROM image")?;
    println!("room {:#04x} now holds {name}; wrote '{}'", args.room, out.display());
    Ok(())
}
