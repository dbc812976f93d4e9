use anyhow::{bail, Context};
use instant::Instant;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use soundfield::{
    BatchSender, CategoryTaxonomy, ClassifierBatch, FrameInput, PlaybackClock, Profile,
    SpectralFrame, SpriteInstance, Visualizer,
};

const FRAME_SEC: f64 = 1.0 / 60.0;
const TRACK_SEC: f64 = 60.0;
const BATCH_INTERVAL: Duration = Duration::from_millis(250);
const SCENE_SEC: f64 = 8.0;
const WAVEFORM_LEN: usize = 256;

// Synthetic soundscapes the fake classifier cycles through.
const SCENES: &[&[(&str, f32)]] = &[
    &[("Bird", 0.45), ("Rustling leaves", 0.12), ("Insect", 0.05)],
    &[("Thunderstorm", 0.3), ("Rain", 0.25), ("Wind", 0.1)],
    &[("Car", 0.4), ("Speech", 0.6), ("Aircraft", 0.08)],
    &[("Music", 0.5), ("Drum machine", 0.2), ("Synthesizer", 0.15)],
    &[("Ocean", 0.3), ("Bird", 0.2), ("Wind", 0.15), ("Percussion", 0.1)],
    &[],
];

struct Options {
    profile: Profile,
    seconds: f64,
    model_available: bool,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut profile = None;
    let mut seconds = 30.0;
    let mut model_available = true;
    for arg in std::env::args().skip(1) {
        if arg == "--no-model" {
            model_available = false;
        } else if profile.is_none() && arg.parse::<f64>().is_err() {
            profile = Some(Profile::by_name(&arg).unwrap_or_else(|| {
                log::warn!(
                    "[native] unknown profile `{arg}`, expected one of {:?}; using immersive",
                    Profile::NAMES
                );
                Profile::immersive()
            }));
        } else {
            seconds = arg
                .parse::<f64>()
                .with_context(|| format!("invalid duration `{arg}`"))?;
        }
    }
    if seconds.is_nan() || seconds <= 0.0 {
        bail!("duration must be positive, got {seconds}");
    }
    Ok(Options {
        profile: profile.unwrap_or_else(Profile::immersive),
        seconds,
        model_available,
    })
}

/// Deposits a jittered batch from the current scene every `BATCH_INTERVAL`.
fn run_classifier(sender: BatchSender, stop: Arc<AtomicBool>, seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = Instant::now();
    let mut deposited = 0u64;
    let mut dropped = 0u64;
    while !stop.load(Ordering::Acquire) {
        let t = start.elapsed().as_secs_f64();
        let scene = SCENES[(t / SCENE_SEC) as usize % SCENES.len()];
        let batch = ClassifierBatch::from_pairs(
            scene
                .iter()
                .map(|&(label, score)| (label, (score * rng.gen_range(0.7..1.3)).min(1.0))),
        );
        if sender.deposit(batch) {
            deposited += 1;
        } else {
            dropped += 1;
        }
        thread::sleep(BATCH_INTERVAL);
    }
    log::info!("[classifier] stopped: {deposited} batches deposited, {dropped} dropped while paused");
}

fn synthetic_spectrum(t: f64, waveform: &mut [f32]) -> (f32, f32, f32) {
    let beat = ((t * 2.0 * std::f64::consts::PI).sin() * 0.5 + 0.5) as f32;
    let swell = ((t * 0.1).sin() * 0.5 + 0.5) as f32;
    for (i, s) in waveform.iter_mut().enumerate() {
        let x = i as f64 / WAVEFORM_LEN as f64;
        *s = ((x * 12.0 + t * 3.0).sin() * 0.3 * (0.3 + beat as f64)) as f32;
    }
    (200.0 * beat * swell + 20.0, 120.0 * swell, 60.0 * beat)
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let opts = parse_args()?;
    let taxonomy = match opts.profile.name {
        "immersive" | "cinema" => CategoryTaxonomy::ambient_default(),
        _ => CategoryTaxonomy::extended(),
    }
    .context("building category taxonomy")?;
    let mut vis = Visualizer::new(opts.profile, taxonomy, 42).context("invalid profile")?;

    vis.begin_loading();
    if opts.model_available {
        vis.mark_ready();
    } else {
        vis.mark_failed("model disabled with --no-model");
    }
    vis.set_playing(true);

    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let sender = vis.sender();
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("classifier".into())
            .spawn(move || run_classifier(sender, stop, 7))
            .context("spawning classifier thread")?
    };

    let mut waveform = vec![0.0f32; WAVEFORM_LEN];
    let mut spawned = 0usize;
    let mut playing = true;
    let start = Instant::now();
    let mut next_summary = 2.0;

    loop {
        let frame_start = Instant::now();
        let t = start.elapsed().as_secs_f64();
        if t >= opts.seconds {
            break;
        }

        // Pause for the last three seconds of every minute.
        let want_playing = t % TRACK_SEC < TRACK_SEC - 3.0;
        if want_playing != playing {
            playing = want_playing;
            vis.set_playing(playing);
            log::info!("[native] playback {}", if playing { "resumed" } else { "paused" });
        }

        let (bass, mid, treble) = synthetic_spectrum(t, &mut waveform);
        let input = FrameInput {
            spectral: playing.then_some(SpectralFrame {
                bass,
                mid,
                treble,
                waveform: &waveform,
            }),
            playback: playing.then_some(PlaybackClock {
                position_sec: t % TRACK_SEC,
                duration_sec: TRACK_SEC,
            }),
        };

        let events = vis.tick(&input).to_vec();
        spawned += events.len();
        for ev in &events {
            log::debug!(
                "[native] spawn {} ({:.2})",
                vis.taxonomy().label_name(ev.label),
                ev.strength
            );
        }

        let instances = vis.instances();
        if t >= next_summary {
            next_summary += 2.0;
            let hue = vis.hue();
            log::info!(
                "[native] t={:.1}s hue {:.0} balanced {} active {:?} entities {} connectors {} bass {:.2} upload {} B",
                t,
                hue.current_hue,
                hue.is_balanced_mode,
                hue.active_hues.as_slice(),
                vis.entities().len(),
                vis.connectors().len(),
                vis.bass_level(),
                instances.len() * std::mem::size_of::<SpriteInstance>()
            );
        }

        let spent = frame_start.elapsed().as_secs_f64();
        if spent < FRAME_SEC {
            thread::sleep(Duration::from_secs_f64(FRAME_SEC - spent));
        }
    }

    stop.store(true, Ordering::Release);
    if producer.join().is_err() {
        bail!("classifier thread panicked");
    }
    log::info!(
        "[native] {} frames, {} spawns, {} live entities",
        vis.frame(),
        spawned,
        vis.entities().len()
    );
    Ok(())
}
