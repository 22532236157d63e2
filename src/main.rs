use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, error, info, warn};
use serde::Serialize;

use spectrum_analyzer::make_waves::{apply_fade_envelope, sine_wave};
use spectrum_analyzer::wav_input::{load_wav, WavData};
use spectrum_analyzer::{AnalyzerConfig, DisplayColumn, SpectrumAnalyzer, SpectrumSender};

const BLOCK_FRAMES: usize = 512;

#[derive(Parser, Debug)]
#[command(name = "spectrum-analyzer", about = "Overlapped FFT spectrum analyzer")]
struct Args {
    /// WAV file to analyze. A test tone is generated when omitted.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Test tone frequency in Hz
    #[arg(long, default_value_t = 1000.0)]
    tone: f32,

    /// Test tone length in seconds
    #[arg(long, default_value_t = 2.0)]
    seconds: f32,

    /// YAML analyzer configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the effective configuration to this path and continue
    #[arg(long)]
    save_config: Option<PathBuf>,

    /// Feed audio at its natural rate instead of as fast as possible
    #[arg(long)]
    realtime: bool,

    /// UI refresh interval in milliseconds
    #[arg(long, default_value_t = 30)]
    refresh_ms: u64,

    /// Print one JSON line per refresh
    #[arg(long)]
    json: bool,

    #[arg(long)]
    enable_logs: bool,
}

#[derive(Serialize)]
struct Snapshot<'a> {
    time: f64,
    drained: usize,
    transforms: usize,
    columns: &'a [DisplayColumn],
}

fn main() {
    let args = Args::parse();

    if args.enable_logs {
        // Don't override RUST_LOG if it's already set
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "spectrum_analyzer=info");
        }
        env_logger::init();
    }

    if let Err(e) = run(args) {
        error!("Analyzer encountered an error: {:?}", e);
        eprintln!("Error: {:?}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };

    let source = match &args.input {
        Some(path) => load_wav(path)?,
        None => {
            let len = (config.sample_rate as f32 * args.seconds.max(0.0)) as usize;
            let mut wave = sine_wave(args.tone, config.sample_rate as f32, len, 0.5);
            apply_fade_envelope(&mut wave, len / 100);
            info!("Generated {} Hz test tone, {} samples", args.tone, len);
            WavData {
                channels: vec![wave],
                sample_rate: config.sample_rate as u32,
            }
        }
    };
    config.sample_rate = source.sample_rate as f64;

    if let Some(path) = &args.save_config {
        config.save(path)?;
    }

    let (sender, mut analyzer) =
        SpectrumAnalyzer::new(&config).map_err(|e| anyhow!("invalid configuration: {}", e))?;

    let shutdown_flag = Arc::new(AtomicBool::new(false));
    let audio_done = Arc::new(AtomicBool::new(false));
    {
        let shutdown_flag = Arc::clone(&shutdown_flag);
        ctrlc::set_handler(move || shutdown_flag.store(true, Ordering::SeqCst))
            .context("failed to install Ctrl-C handler")?;
    }

    info!("Starting audio feed thread...");
    let audio_thread = thread::spawn({
        let shutdown_flag = Arc::clone(&shutdown_flag);
        let audio_done = Arc::clone(&audio_done);
        let realtime = args.realtime;
        move || {
            let dropped = feed_audio(sender, &source, realtime, &shutdown_flag);
            audio_done.store(true, Ordering::SeqCst);
            dropped
        }
    });

    let start = Instant::now();
    let refresh = Duration::from_millis(args.refresh_ms.max(1));
    loop {
        thread::sleep(refresh);

        let stats = analyzer.tick();
        let columns = analyzer.refresh();

        if args.json {
            let snapshot = Snapshot {
                time: start.elapsed().as_secs_f64(),
                drained: stats.drained,
                transforms: stats.transforms,
                columns,
            };
            println!("{}", serde_json::to_string(&snapshot)?);
        } else if let Some(loudest) = columns
            .iter()
            .max_by(|a, b| a.value.total_cmp(&b.value))
        {
            println!(
                "drained {:>6}  transforms {:>3}  loudest {:>9.1} Hz  value {:.6}  peak {:.6}",
                stats.drained, stats.transforms, loudest.frequency, loudest.value, loudest.peak
            );
        }

        if shutdown_flag.load(Ordering::SeqCst) {
            info!("Shutdown requested");
            break;
        }
        if audio_done.load(Ordering::SeqCst) && analyzer.pending() == 0 {
            debug!("Audio feed finished and queue drained");
            break;
        }
    }

    match audio_thread.join() {
        Ok(dropped) if dropped > 0 => {
            warn!("{} samples dropped while the UI side lagged", dropped)
        }
        Ok(_) => info!("Audio thread terminated successfully"),
        Err(_) => warn!("Audio thread may not have terminated cleanly"),
    }

    Ok(())
}

/// Pushes the source in fixed-size blocks, as an audio callback would.
/// Returns the number of samples the queue dropped.
///
/// Offline feeds never push more than the queue can hold at once, so a queue
/// smaller than one block still drains the whole source without loss.
fn feed_audio(
    mut sender: SpectrumSender,
    source: &WavData,
    realtime: bool,
    shutdown_flag: &AtomicBool,
) -> u64 {
    let block_time = Duration::from_secs_f64(BLOCK_FRAMES as f64 / source.sample_rate.max(1) as f64);
    let chunk_frames = if realtime {
        BLOCK_FRAMES
    } else {
        BLOCK_FRAMES.min(sender.capacity())
    };
    if chunk_frames < BLOCK_FRAMES {
        debug!("Queue holds {} samples, feeding in chunks of {}", sender.capacity(), chunk_frames);
    }

    let mut start = 0;
    while start < source.frames() && !shutdown_flag.load(Ordering::Relaxed) {
        let block = source.block(start, chunk_frames);
        if !realtime {
            // Offline feed: wait for room rather than dropping.
            let needed = block.first().map(|c| c.len()).unwrap_or(0);
            while sender.vacant() < needed && !shutdown_flag.load(Ordering::Relaxed) {
                thread::sleep(Duration::from_millis(1));
            }
        }
        sender.process_block(&block);
        start += chunk_frames;
        if realtime {
            thread::sleep(block_time);
        }
    }
    sender.dropped()
}
