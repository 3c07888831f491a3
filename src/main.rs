mod benchmark;
mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, ErrorKind};

use cli::{Cli, SmoothingMode};
use output::{Format, LevelWriter};
use pianolizer::audio::{decode, input, mixdown};
use pianolizer::{PianoTuning, Pianolizer, Smoothing};

const HEAVY_HISTORY_SECONDS: f64 = 1.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();

    if let Some(path) = config::find_config(cli.config.as_deref()) {
        if let Some(cfg) = config::load_config(&path) {
            log::info!("Loaded config from {}", path.display());
            cfg.merge_into(&mut cli);
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }

    cli.validate()?;

    if cli.list_keys {
        return list_keys(&cli);
    }

    if cli.benchmark {
        return run_benchmark(&cli);
    }

    match cli.input.clone() {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            log::info!("Input: {}", path.display());
            let audio = decode::decode_audio(&path)?;
            process_samples(&cli, &audio.samples, audio.sample_rate)
        }
        None => process_stdin(&cli),
    }
}

fn tuning(cli: &Cli, sample_rate: u32) -> PianoTuning {
    PianoTuning::with_keys(sample_rate, cli.keys, cli.reference_key, cli.pitch_fork)
        .tolerance(cli.tolerance)
}

fn smoothing(cli: &Cli) -> Smoothing {
    match cli.smoothing {
        SmoothingMode::Fast => Smoothing::Fast,
        // At least one second of history so the window can be raised later.
        SmoothingMode::Heavy => Smoothing::Heavy {
            max_window_seconds: cli.average_window.max(HEAVY_HISTORY_SECONDS),
        },
        SmoothingMode::None => Smoothing::None,
    }
}

fn build(cli: &Cli, sample_rate: u32) -> Result<Pianolizer> {
    let pianolizer = Pianolizer::with_tuning(tuning(cli, sample_rate), smoothing(cli))
        .context("Failed to build the filter bank")?;
    log::info!(
        "{} keys @ {}Hz, A={}Hz on key {}, {:?} smoothing over {}s",
        pianolizer.key_count(),
        sample_rate,
        cli.pitch_fork,
        cli.reference_key,
        cli.smoothing,
        cli.average_window
    );
    Ok(pianolizer)
}

fn list_keys(cli: &Cli) -> Result<()> {
    let bands = tuning(cli, cli.sample_rate).bands();
    if cli.format == Format::Json {
        println!("{}", serde_json::to_string_pretty(&bands)?);
        return Ok(());
    }

    println!("Key  Name   Frequency   Bandwidth      k       N");
    for band in &bands {
        println!(
            "{:>3}  {:<5} {:>10.3} {:>11.3} {:>6} {:>7}",
            band.key, band.name, band.frequency, band.bandwidth, band.values.k, band.values.n
        );
    }
    Ok(())
}

fn run_benchmark(cli: &Cli) -> Result<()> {
    let mut pianolizer = build(cli, cli.sample_rate)?;
    let report = benchmark::run(&mut pianolizer, benchmark::BENCHMARK_SAMPLES, cli.average_window);

    log::info!(
        "Processed {} samples in {:.3}s ({:.0} samples/s, {:.1}x realtime)",
        report.samples,
        report.elapsed.as_secs_f64(),
        report.samples_per_second(),
        report.samples_per_second() / cli.sample_rate as f64
    );

    for key in benchmark::REPORTED_KEYS {
        if let Some(level) = report.levels.get(key) {
            println!("{} {:<4} {:.6}", key, pianolizer.tuning().key_name(key), level);
        }
    }
    Ok(())
}

/// Returns `Ok(false)` once the reader of stdout has gone away.
fn emit<W: io::Write>(writer: &mut LevelWriter<W>, levels: &[f32], time: f64) -> Result<bool> {
    match writer.write_levels(levels, time) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e).context("Failed to write levels"),
    }
}

fn process_stdin(cli: &Cli) -> Result<()> {
    let mut pianolizer = build(cli, cli.sample_rate)?;
    let mut writer = LevelWriter::new(io::stdout().lock(), cli.format, cli.threshold, cli.square_root);
    let mut stdin = io::stdin().lock();

    let mut raw = vec![0.0f32; cli.buffer_size * cli.channels];
    let mut mono = vec![0.0f32; cli.buffer_size];
    let mut frames_consumed = 0usize;

    log::info!(
        "Reading {}-channel float PCM from stdin in blocks of {} frames",
        cli.channels,
        cli.buffer_size
    );

    loop {
        let read = input::read_block(&mut stdin, &mut raw).context("Failed to read from stdin")?;
        // Mixdown accumulates; `process` zeroes `mono` again.
        let frames = mixdown::mix_interleaved(&raw[..read], cli.channels, &mut mono);
        if frames == 0 {
            break;
        }
        frames_consumed += frames;

        let levels = pianolizer.process(&mut mono[..frames], cli.average_window);
        let time = frames_consumed as f64 / cli.sample_rate as f64;
        if !emit(&mut writer, levels, time)? {
            break;
        }

        if read < raw.len() {
            break;
        }
    }

    log::info!(
        "Done: {:.2}s of audio",
        frames_consumed as f64 / cli.sample_rate as f64
    );
    Ok(())
}

fn process_samples(cli: &Cli, samples: &[f32], sample_rate: u32) -> Result<()> {
    let mut pianolizer = build(cli, sample_rate)?;
    let mut writer = LevelWriter::new(io::stdout().lock(), cli.format, cli.threshold, cli.square_root);
    let mut scratch = vec![0.0f32; cli.buffer_size];

    let pb = ProgressBar::new(samples.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} samples ({eta} remaining)")?
            .progress_chars("=>-"),
    );

    let mut consumed = 0usize;
    for chunk in samples.chunks(cli.buffer_size) {
        let block = &mut scratch[..chunk.len()];
        block.copy_from_slice(chunk);
        consumed += chunk.len();

        let levels = pianolizer.process(block, cli.average_window);
        if !emit(&mut writer, levels, consumed as f64 / sample_rate as f64)? {
            break;
        }
        pb.set_position(consumed as u64);
    }

    pb.finish_with_message("Analysis complete");
    Ok(())
}
