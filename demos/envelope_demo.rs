/// Demonstrates ADSR envelope behavior
/// Shows attack, decay, sustain, and release phases
use keysynth::{
    synth::VoiceEnvelope, EnvelopeParams, PolySynth, SynthConfig, MAX_BLOCK_SIZE,
};

fn main() -> keysynth::Result<()> {
    println!("=== ADSR Envelope Demo ===\n");

    let sample_rate = 48_000.0;
    let attack = 0.1; // 100ms
    let decay = 0.1; // 100ms
    let sustain = 0.5; // 50% level
    let release = 0.2; // 200ms

    println!("Envelope parameters:");
    println!("  Attack:  {:.0}ms", attack * 1000.0);
    println!("  Decay:   {:.0}ms", decay * 1000.0);
    println!("  Sustain: {:.0}%", sustain * 100.0);
    println!("  Release: {:.0}ms\n", release * 1000.0);

    let config = SynthConfig::default()
        .sample_rate(sample_rate)
        .max_voices(1)
        .envelope(EnvelopeParams::new(attack, decay, sustain, release)?);
    let mut synth = PolySynth::new(&config)?;

    synth.note_on(60, 100); // Middle C

    let attack_samples = (attack * sample_rate) as usize;
    let decay_samples = (decay * sample_rate) as usize;
    let sustain_samples = (0.5 * sample_rate) as usize; // Hold for 500ms
    let release_samples = (release * sample_rate) as usize;

    println!("Phase timeline:");
    println!("  (Rendering in chunks of {} samples)", MAX_BLOCK_SIZE);
    println!();

    let mut snapshot = Vec::<VoiceEnvelope>::with_capacity(1);
    let mut render_phase = |synth: &mut PolySynth, name: &str, total_samples: usize| {
        let mut all_samples = Vec::new();
        let mut remaining = total_samples;

        while remaining > 0 {
            let chunk_size = remaining.min(MAX_BLOCK_SIZE);
            let mut buffer = vec![0.0; chunk_size];
            synth.render_block(&mut buffer);
            all_samples.extend_from_slice(&buffer);
            remaining -= chunk_size;
        }

        let peak = all_samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));

        snapshot.clear();
        synth.collect_voice_envelopes(&mut snapshot);
        let ending = match snapshot.first() {
            Some(env) => format!("{:?} at {:.3}", env.state, env.level),
            None => "voice reaped".to_string(),
        };

        println!(
            "  {:8} {:6} samples, peak: {:.3}, ends: {}",
            name, total_samples, peak, ending
        );
    };

    render_phase(&mut synth, "Attack:", attack_samples);
    render_phase(&mut synth, "Decay:", decay_samples);
    render_phase(&mut synth, "Sustain:", sustain_samples);

    synth.note_off(60);
    render_phase(&mut synth, "Release:", release_samples);

    println!("\n=== Envelope Behavior ===");
    println!("• Attack:  ramps from 0.0 → 1.0");
    println!("• Decay:   ramps from 1.0 → sustain level");
    println!("• Sustain: holds at sustain level until note_off");
    println!("• Release: ramps from current level → 0.0");
    println!("• Finished voices leave the pool at the end of their block");

    Ok(())
}
