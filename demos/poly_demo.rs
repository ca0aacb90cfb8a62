//! Demonstrates polyphonic synthesis without real-time audio.
//! Shows the message queue, voice allocation, stealing and mixing.

use ferric_dsp::config::EngineConfig;
use ferric_dsp::synth::engine::PolyEngine;
use ferric_dsp::synth::message::SynthMessage;
use rtrb::RingBuffer;

fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()))
}

fn main() {
    println!("=== Polyphony Demo (Offline) ===\n");

    let sample_rate = 48_000.0;
    let block_size = 256;

    // Control messages travel over a lock-free queue, the way a MIDI
    // thread would feed the audio callback.
    let (mut tx, mut rx) = RingBuffer::<SynthMessage>::new(64);

    let config = EngineConfig {
        polyphony: 4,
        ..EngineConfig::default()
    };
    let mut engine = PolyEngine::new(config);
    engine.prepare(sample_rate, block_size);

    println!("Created PolyEngine with 4 voices\n");

    // Play a C major chord (C4, E4, G4)
    println!("Playing C major chord:");
    for note in [60u8, 64, 67] {
        println!("  Note On: {note}");
        let _ = tx.push(SynthMessage::NoteOn {
            note,
            velocity: 0.8,
            sample_offset: 0,
        });
    }

    let mut left = vec![0.0; block_size];
    let mut right = vec![0.0; block_size];

    engine.drain_messages(&mut rx);
    engine.render_block(&mut left, &mut right);
    println!("\nAfter first render:");
    println!("  Active voices: {}", engine.active_voices());
    println!("  Peak amplitude: {:.3}", peak(&left));

    // Add a 4th note
    println!("\nAdding 4th note: B4 (71)");
    let _ = tx.push(SynthMessage::NoteOn {
        note: 71,
        velocity: 0.8,
        sample_offset: 0,
    });
    engine.drain_messages(&mut rx);
    engine.render_block(&mut left, &mut right);
    println!("  Active voices: {} (max)", engine.active_voices());

    // A 5th note triggers voice stealing: the oldest note (C4) goes.
    println!("\nAdding 5th note: D5 (74) - triggers voice stealing");
    let _ = tx.push(SynthMessage::NoteOn {
        note: 74,
        velocity: 0.8,
        sample_offset: 0,
    });
    engine.drain_messages(&mut rx);
    engine.render_block(&mut left, &mut right);
    println!("  Active voices: {}", engine.active_voices());
    println!("  Note 74 sounding: {}", engine.is_note_active(74));
    println!("  Note 60 stolen:   {}", !engine.is_note_active(60));

    // Release everything and render until the tails ring out.
    let _ = tx.push(SynthMessage::AllNotesOff);
    engine.drain_messages(&mut rx);

    let mut blocks = 0;
    while engine.active_voices() > 0 {
        engine.render_block(&mut left, &mut right);
        blocks += 1;
    }
    println!("\nAll notes released; tails finished after {blocks} blocks");
}
