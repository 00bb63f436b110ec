use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use ecotrial::{parse_mat_with, positive_cells, EventField, FrameSeq, MatFile};

#[derive(Parser)]
#[command(name = "trialdump", about = "Summarize a trial-structured .mat session file")]
struct Args {
    /// Session .mat file (uncompressed Level 5, e.g. `save -v6`)
    input: PathBuf,

    /// Also list the positive-cell indices stored in the file
    #[arg(long)]
    positive: bool,

    /// Print the dFoF row counts for an event-anchored window,
    /// e.g. --window offer_on:10
    #[arg(long)]
    window: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let extract = |mat: &MatFile| {
        if args.positive {
            positive_cells(mat).map(Some)
        } else {
            Ok(None)
        }
    };
    let (cts, trs, ets, positive) = parse_mat_with(&args.input, extract)?;

    println!("Parsed {} trials from {}", cts.len(), args.input.display());
    for (idx, ct) in cts.iter() {
        println!("trial {idx:>5}: {ct}");
        println!("             {}", trs[idx]);
        println!("             {}", ets[idx]);
    }

    if let Some(cells) = positive {
        println!("{} positive cells (zero-based columns): {cells:?}", cells.len());
    }

    if let Some(spec) = args.window.as_deref() {
        let (field, n) = parse_window(spec)?;
        let template = FrameSeq::at_event(field, n);
        println!("window {field}:{n}");
        for (idx, et) in ets.iter() {
            let (span, dfof) = cts[idx].frames(template.resolve(et))?;
            println!("trial {idx:>5}: {span} → {} × {} dFoF", dfof.nrows(), dfof.ncols());
        }
    }

    Ok(())
}

/// Parse `--window event:count`, e.g. `offer_on:10`.
fn parse_window(spec: &str) -> Result<(EventField, usize)> {
    let (field, count) = spec
        .split_once(':')
        .ok_or_else(|| anyhow::anyhow!("expected event:count, got `{spec}`"))?;
    let field: EventField = field.parse()?;
    let count: usize = count.parse()?;
    Ok((field, count))
}
