//! lem - terminal loop recorder
//!
//! Run with: cargo run -- <bpm> [--metronome <path>] [--block <frames>]

mod app;

use std::path::PathBuf;

use color_eyre::eyre::{bail, eyre, Result as EyreResult, WrapErr};
use lem::{sequencing::BPM_RANGE, Looper, LooperConfig};

use app::LooperApp;

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args(std::env::args().skip(1))?;
    let mut config = LooperConfig::default();
    if let Some(path) = args.metronome {
        config = config.metronome_path(path);
    }
    if let Some(block) = args.block {
        config = config.block_size(block);
    }

    let looper = Looper::configure(args.bpm, &config)
        .wrap_err_with(|| format!("failed to start the looper at {} BPM", args.bpm))?;
    LooperApp::new(looper).run()
}

#[derive(Debug, PartialEq)]
struct Args {
    bpm: u32,
    metronome: Option<PathBuf>,
    block: Option<usize>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> EyreResult<Args> {
    let mut bpm = None;
    let mut metronome = None;
    let mut block = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--metronome" => {
                let path = args.next().ok_or_else(|| eyre!("--metronome needs a path"))?;
                metronome = Some(PathBuf::from(path));
            }
            "--block" => {
                let raw = args.next().ok_or_else(|| eyre!("--block needs a frame count"))?;
                let frames = raw
                    .parse()
                    .wrap_err_with(|| format!("invalid block size {:?}", raw))?;
                block = Some(frames);
            }
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ if bpm.is_none() => bpm = Some(parse_bpm(&arg)?),
            _ => bail!("unexpected argument {:?}", arg),
        }
    }

    let bpm = bpm.ok_or_else(|| eyre!("usage: lem <bpm> [--metronome <path>] [--block <frames>]"))?;
    Ok(Args {
        bpm,
        metronome,
        block,
    })
}

/// Tempo from user input, restricted to `BPM_RANGE`
fn parse_bpm(raw: &str) -> EyreResult<u32> {
    let bpm: u32 = raw
        .trim()
        .parse()
        .wrap_err_with(|| format!("BPM must be a whole number, got {:?}", raw))?;
    if !BPM_RANGE.contains(&bpm) {
        bail!(
            "BPM {} outside {}..={}",
            bpm,
            BPM_RANGE.start(),
            BPM_RANGE.end()
        );
    }
    Ok(bpm)
}
