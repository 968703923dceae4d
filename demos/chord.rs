/// Plays a C major chord through the command queue and reports block peaks
use keysynth::{synth, SynthConfig, Waveform};

fn peak(buffer: &[f32]) -> f32 {
    buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn main() -> keysynth::Result<()> {
    println!("=== Chord Example ===\n");

    let config = SynthConfig::default()
        .max_voices(4)
        .waveform(Waveform::Sawtooth);

    // Handle stays on the control side, synth goes to the audio side
    let (handle, mut synth) = synth::channel(&config)?;
    println!("Created synth with {} voices\n", synth.max_voices());

    println!("Playing C major chord:");
    for (name, note) in [("C4", 60), ("E4", 64), ("G4", 67)] {
        println!("  Note On: {name} ({note})");
        handle.note_on(note, 100)?;
    }

    let mut buffer = vec![0.0; config.block_size];
    synth.render_block(&mut buffer);
    println!("\nRendered {} samples", buffer.len());
    println!("Active voices: {}", handle.active_voices());
    println!("Peak amplitude: {:.3}", peak(&buffer));

    // Let the attack finish
    for _ in 0..40 {
        synth.render_block(&mut buffer);
    }
    println!("Peak after attack: {:.3}", peak(&buffer));

    println!("\nReleasing E4 (64)");
    handle.note_off(64)?;

    let release_blocks = (config.envelope.release() * config.sample_rate) as usize / buffer.len() + 1;
    for _ in 0..release_blocks {
        synth.render_block(&mut buffer);
    }
    println!("Active voices after release: {}", handle.active_voices());

    println!("\nSwitching to square and adding C5 (72)");
    handle.set_waveform(Waveform::Square)?;
    handle.note_on(72, 100)?;
    synth.render_block(&mut buffer);
    for voice in synth.voices() {
        println!("  note {:3} {:>6} {:8.2} Hz", voice.note(), voice.waveform(), voice.frequency());
    }

    handle.all_notes_off()?;
    Ok(())
}
