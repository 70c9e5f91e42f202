use anyhow::{bail, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;

use eegmontage::{
    adjust_chan_kind, evaluate_selection, get_chanlocs, io::{load_recording, write_report},
    parse_selection, position_pipeline, rank_montages, GlobalLog, JsonDirCatalog, MatchConfig,
    PositionMethod, Ranking, SelectionRejection,
};

#[derive(Parser)]
#[command(name = "find_montage", about = "Rank standard EEG montages against a recording's electrode positions")]
struct Args {
    /// raw.safetensors with chan_pos / ch_names (/ ch_kinds)
    #[arg(long)]
    input: PathBuf,

    /// Directory of <montage>.json layout files
    #[arg(long)]
    montages: PathBuf,

    /// Matching method: "position" or "channel_name"
    #[arg(long, default_value = "position")]
    method: String,

    /// Number of ranked montages to offer
    #[arg(long, default_value_t = 5)]
    show: usize,

    /// Pick this 1-based candidate instead of prompting
    #[arg(long)]
    select: Option<usize>,

    /// Write results, ranking and selection as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let log = GlobalLog;

    let method: PositionMethod = args.method.parse()?;
    let cfg = MatchConfig { method, show_n_montages: args.show, ..MatchConfig::default() };

    let mut info = load_recording(&args.input)?;
    adjust_chan_kind(&mut info, cfg.tolerance, &log);
    let recording = get_chanlocs(&info, &log)?;
    println!("Loaded {} EEG channels ({} total)", recording.len(), info.chs.len());

    let catalog = JsonDirCatalog::new(&args.montages);
    let names = catalog.available();
    if names.is_empty() {
        bail!("no montage files found in {}", args.montages.display());
    }
    let results = position_pipeline(&recording, &catalog, &names[..], &cfg, &log)?;

    if method == PositionMethod::ChannelName {
        for r in &results {
            println!("{}: {}", r.montage, r.match_ratio);
        }
        if let Some(path) = &args.report {
            write_report(path, &results, None, None)?;
        }
        return Ok(());
    }

    let ranking = rank_montages(&results)?;
    let shown = ranking.top(cfg.show_n_montages);
    for line in shown.scoreboard() {
        println!("{line}");
    }

    let selected = match args.select {
        Some(idx) => Some(evaluate_selection(idx, &shown)?),
        None => prompt(&shown)?,
    };

    match &selected {
        Some(name) => {
            println!("\n*********\nSelected {name} montage\n*********");
            if let Some(r) = results.iter().find(|r| &r.montage == name) {
                for (from, to) in r.channel_mapping() {
                    println!("  {from} -> {to}");
                }
            }
        }
        None => println!("Selection cancelled..."),
    }

    if let Some(path) = &args.report {
        write_report(path, &results, Some(&ranking), selected.as_deref())?;
        println!("Written → {}", path.display());
    }
    Ok(())
}

/// Read picks from stdin until one is accepted or the operator cancels.
fn prompt(shown: &Ranking) -> Result<Option<String>> {
    println!("\nType in the number of montage you want to select (e to cancel): ");
    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        match parse_selection(&line).and_then(|i| evaluate_selection(i, shown)) {
            Ok(name) => return Ok(Some(name)),
            Err(SelectionRejection::Cancelled) => return Ok(None),
            Err(reason) => println!("\n{reason}"),
        }
    }
    Ok(None)
}
