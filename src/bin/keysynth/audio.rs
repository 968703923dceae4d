//! Audio output: the default cpal device, or a paced dummy sink when no
//! usable device exists.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use keysynth::{
    engine::{Engine, NullSink, Pacing, StopOutcome, DEFAULT_STOP_TIMEOUT},
    synth::{self, SynthHandle},
    SynthConfig, MAX_BLOCK_SIZE,
};

pub enum AudioOutput {
    Device(cpal::Stream),
    Dummy(Engine),
}

/// Start audio output and return the handle that controls it.
///
/// When a device is used, `config.sample_rate` is replaced by the device rate.
pub fn start(config: &mut SynthConfig, force_dummy: bool) -> EyreResult<(SynthHandle, AudioOutput)> {
    if !force_dummy {
        match start_device(config) {
            Ok(started) => return Ok(started),
            Err(err) => tracing::warn!("audio device unavailable, using dummy output: {err:#}"),
        }
    }

    let engine = Engine::start(config, NullSink, Pacing::RealTime)
        .wrap_err("failed to start dummy output")?;
    tracing::info!(
        sample_rate = config.sample_rate,
        block_size = config.block_size,
        "dummy audio output active, no sound will be produced"
    );
    Ok((engine.handle().clone(), AudioOutput::Dummy(engine)))
}

fn start_device(config: &mut SynthConfig) -> EyreResult<(SynthHandle, AudioOutput)> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let supported = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(eyre!(
            "device sample format {:?} is not supported, need f32",
            supported.sample_format()
        ));
    }

    config.sample_rate = supported.sample_rate().0 as f32;
    let channels = supported.channels() as usize;
    let name = device.name().unwrap_or_else(|_| "<unnamed>".to_string());
    tracing::info!(
        device = %name,
        sample_rate = config.sample_rate,
        channels,
        "using audio device"
    );

    let (handle, mut synth) = synth::channel(config)?;

    // Buffer reused by audio callback
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &supported.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;
                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);

                    let block = &mut render_buf[..frames_to_render];
                    synth.render_block(block);

                    // Duplicate mono to all channels and write to device
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        let s = s.clamp(-1.0, 1.0);
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| tracing::error!("audio stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    Ok((handle, AudioOutput::Device(stream)))
}

impl AudioOutput {
    /// Stop pulling blocks. Returns once no further block will be rendered,
    /// or after the dummy runner's stop timeout.
    pub fn stop(self) {
        match self {
            AudioOutput::Device(stream) => {
                if let Err(err) = stream.pause() {
                    tracing::warn!("failed to pause output stream: {err}");
                }
                // Dropping the stream joins cpal's callback thread
                drop(stream);
                tracing::info!("audio output stopped");
            }
            AudioOutput::Dummy(engine) => match engine.stop(DEFAULT_STOP_TIMEOUT) {
                StopOutcome::Joined(_) => tracing::info!("dummy audio output stopped"),
                StopOutcome::TimedOut | StopOutcome::Panicked => {
                    tracing::warn!("dummy audio output did not stop cleanly")
                }
            },
        }
    }
}
