//! keysynth - play the synth from a MIDI controller or the terminal
//!
//! Run with: cargo run -- --help

mod audio;
mod midi;
mod repl;

use std::{fs, path::PathBuf, thread, time::Duration};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keysynth::{io::ChannelFilter, synth::SynthHandle, SynthConfig, Waveform};
use tracing_subscriber::EnvFilter;

/// Polyphonic synthesizer driven by MIDI input or typed commands.
#[derive(Parser, Debug)]
#[command(name = "keysynth")]
#[command(version, about = "Polyphonic synthesizer for MIDI and keyboard input")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial waveform (sine, square, saw)
    #[arg(long)]
    waveform: Option<Waveform>,

    /// Maximum simultaneous voices
    #[arg(long)]
    max_voices: Option<usize>,

    /// Sample rate in Hz for the dummy output (a device uses its own rate)
    #[arg(long)]
    sample_rate: Option<f32>,

    /// Block size in frames for the dummy output
    #[arg(long)]
    block_size: Option<usize>,

    /// MIDI input port name (defaults to the first available port)
    #[arg(long)]
    midi_port: Option<String>,

    /// Only listen to this MIDI channel (1-16)
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=16))]
    channel: Option<u8>,

    /// Skip MIDI input and use typed commands only
    #[arg(long)]
    no_midi: bool,

    /// Render into a silent dummy output instead of the audio device
    #[arg(long)]
    dummy: bool,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mut config = load_config(&args)?;
    config.validate().wrap_err("invalid synth configuration")?;

    tracing::info!(
        waveform = %config.waveform,
        max_voices = config.max_voices,
        "starting keysynth"
    );

    let (handle, output) = audio::start(&mut config, args.dummy)?;

    let filter = args
        .channel
        .map_or(ChannelFilter::Omni, |ch| ChannelFilter::Channel(ch - 1));
    let midi_input = if args.no_midi {
        None
    } else {
        midi::connect(handle.clone(), args.midi_port.as_deref(), filter)
    };

    repl::print_help();
    let result = repl::run(&handle, std::io::stdin().lock());

    release_all(&handle, config.envelope.release());

    // Output first, so no block is rendered while inputs are torn down
    output.stop();
    drop(midi_input);

    result
}

/// Longest release tail played out before the output is stopped.
const MAX_RELEASE_WAIT: Duration = Duration::from_secs(1);

/// Release sounding notes and wait for their release to play out.
fn release_all(handle: &SynthHandle, release_secs: f32) {
    if handle.active_voices() == 0 {
        return;
    }
    if let Err(err) = handle.all_notes_off() {
        tracing::warn!("could not release notes before shutdown: {err}");
        return;
    }
    thread::sleep(release_tail(release_secs));
}

fn release_tail(release_secs: f32) -> Duration {
    Duration::from_secs_f32(release_secs).min(MAX_RELEASE_WAIT)
}

fn load_config(args: &Args) -> EyreResult<SynthConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read config file '{}'", path.display()))?;
            toml::from_str(&text)
                .wrap_err_with(|| format!("failed to parse config file '{}'", path.display()))?
        }
        None => SynthConfig::default(),
    };

    if let Some(waveform) = args.waveform {
        config.waveform = waveform;
    }
    if let Some(max_voices) = args.max_voices {
        config.max_voices = max_voices;
    }
    if let Some(sample_rate) = args.sample_rate {
        config.sample_rate = sample_rate;
    }
    if let Some(block_size) = args.block_size {
        config.block_size = block_size;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keysynth::{dsp::EnvelopeState, synth};

    #[test]
    fn release_tail_is_capped() {
        assert_eq!(release_tail(0.2), Duration::from_secs_f32(0.2));
        assert_eq!(release_tail(30.0), MAX_RELEASE_WAIT);
    }

    #[test]
    fn release_all_queues_note_offs_for_sounding_voices() {
        let (handle, mut synth) = synth::channel(&SynthConfig::default()).unwrap();
        handle.note_on(60, 100).unwrap();
        synth.generate_block(64);

        release_all(&handle, 0.001);
        synth.generate_block(1);

        assert_eq!(synth.voice_count(), 1);
        assert!(synth.voices().all(|v| v.state() == EnvelopeState::Release));
    }

    #[test]
    fn release_all_skips_idle_synth() {
        let config = SynthConfig {
            queue_capacity: 1,
            ..SynthConfig::default()
        };
        let (handle, _synth) = synth::channel(&config).unwrap();

        release_all(&handle, 10.0);
        // nothing was queued, so the single slot is still free
        handle.note_on(60, 100).unwrap();
    }
}
