use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context as _, bail};
use clap::{Parser, Subcommand};
use fairspin::audio::AudioContext;
use fairspin::driver::FrameSink;
use fairspin::participant::parse_name_list;
use fairspin::{
    AnimationDriver, Clock, FairSelector, ManualClock, Phase, RandomSource, SecureRandom, SeededRandom,
    SpinAudioEngine, WheelEvent, WheelState,
};
use wheel::config::{self, Settings};
use wheel::export;
use wheel::gui::{Background, CanvasSink, WheelRenderer};

/// Audio kept after the wheel stops so the win fanfare is captured.
const AUDIO_TAIL: Duration = Duration::from_millis(2600);

#[derive(Parser)]
#[command(name = "wheel", version, about = "Spin a fortune wheel headlessly")]
struct Cli {
    /// Settings file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Draw the idle wheel to a PNG
    Render {
        /// Newline separated participant names
        participants: PathBuf,
        #[arg(short, long, default_value = "wheel.png")]
        out: PathBuf,
        /// Wheel rotation in degrees
        #[arg(long, default_value_t = 0.0)]
        rotation: f64,
    },
    /// Run a full spin and report the winner
    Spin {
        participants: PathBuf,
        /// Winner declared by the caller; falls back to a fair draw if absent from the list
        #[arg(long)]
        winner: Option<String>,
        /// Reproducible draw
        #[arg(long)]
        seed: Option<u64>,
        /// Final frame
        #[arg(short, long, default_value = "spin.png")]
        out: PathBuf,
        /// Also write the spin and win sounds as WAV
        #[arg(long)]
        audio: Option<PathBuf>,
        #[arg(long, default_value_t = 60)]
        fps: u32,
    },
    /// Write the default settings file
    InitConfig,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::InitConfig => {
            let path = config::write_default_config()?;
            println!("{}", path.display());
        }
        Command::Render {
            participants,
            out,
            rotation,
        } => {
            let settings = config::load_or_default(cli.config.as_deref());
            render(&settings, &participants, &out, rotation)?;
        }
        Command::Spin {
            participants,
            winner,
            seed,
            out,
            audio,
            fps,
        } => {
            let settings = config::load_or_default(cli.config.as_deref());
            let job = SpinJob {
                settings: &settings,
                participants: &participants,
                winner: winner.as_deref(),
                out: &out,
                audio: audio.as_deref(),
                fps,
            };
            match seed {
                Some(seed) => job.run(FairSelector::new(SeededRandom::new(seed)))?,
                None => job.run(FairSelector::new(SecureRandom::new()))?,
            }
        }
    }
    Ok(())
}

fn load_state(path: &Path) -> anyhow::Result<WheelState> {
    let raw = fs_err::read_to_string(path)?;
    Ok(WheelState::new(parse_name_list(&raw)))
}

fn make_sink(settings: &Settings) -> CanvasSink {
    let background = settings
        .background_image
        .as_deref()
        .map(Background::load_or_pending);
    CanvasSink::new(
        WheelRenderer::default(),
        background,
        settings.device_pixel_ratio,
    )
}

fn render(settings: &Settings, participants: &Path, out: &Path, rotation: f64) -> anyhow::Result<()> {
    let mut state = load_state(participants)?;
    state.rotation_degrees = rotation;

    let layout = settings.label_layout();
    let display = layout.compute_display_set(&state.participants, false);
    let config = layout.compute_geometry(
        display.len(),
        fairspin::layout::wheel_radius(state.len()),
        false,
    );

    let mut sink = make_sink(settings);
    sink.present(&state, &display, &config)?;
    let surface = sink.surface().context("nothing was drawn")?;
    export::write_png(surface, out)?;
    println!("{} participants, {} drawn", state.len(), display.len());
    Ok(())
}

struct SpinJob<'a> {
    settings: &'a Settings,
    participants: &'a Path,
    winner: Option<&'a str>,
    out: &'a Path,
    audio: Option<&'a Path>,
    fps: u32,
}

impl SpinJob<'_> {
    fn run<R: RandomSource>(&self, selector: FairSelector<R>) -> anyhow::Result<()> {
        if self.fps == 0 {
            bail!("fps must be positive");
        }
        let state = load_state(self.participants)?;
        let clock = ManualClock::new();
        let (tx, rx) = async_channel::unbounded();

        let sample_rate = self.settings.sample_rate;
        let mut audio = SpinAudioEngine::with_backend(|| AudioContext::new(sample_rate));
        audio.set_muted(self.settings.muted);

        let mut driver = AnimationDriver::new(
            state,
            clock.clone(),
            make_sink(self.settings),
            selector,
            audio,
        )
        .with_layout(self.settings.label_layout())
        .with_events(tx);

        driver.request_spin(self.winner)?;

        let frame = Duration::from_secs_f64(1.0 / f64::from(self.fps));
        let mut pcm: Vec<f32> = Vec::new();
        let mut settled_at = None;

        loop {
            clock.advance(frame);
            let phase = driver.tick();

            if self.audio.is_some() {
                let due = (clock.now().as_secs_f64() * sample_rate).round() as usize;
                let start = pcm.len();
                pcm.resize(due.max(start), 0.0);
                driver.audio_mut().render(&mut pcm[start..]);
            }

            if phase != Phase::Spinning {
                let settled = *settled_at.get_or_insert(clock.now().as_secs_f64());
                let tail_done = self.audio.is_none()
                    || clock.now().as_secs_f64() - settled >= AUDIO_TAIL.as_secs_f64();
                if tail_done && !driver.is_win_voice_pending() {
                    break;
                }
            }
        }

        let surface = driver.sink().surface().context("nothing was drawn")?;
        export::write_png(surface, self.out)?;
        if let Some(path) = self.audio {
            export::write_wav(&pcm, sample_rate.round() as u32, path)?;
        }

        while let Ok(event) = rx.try_recv() {
            if let WheelEvent::WinnerResolved { name, index } = event {
                println!("{} (#{})", name, index);
            }
        }
        log::debug!("{} frames drawn", driver.sink().frames());
        Ok(())
    }
}
