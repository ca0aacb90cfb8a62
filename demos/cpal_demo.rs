//! Live playback demo: a chord on the polyphonic engine and a drum
//! pattern, rendered inside a cpal output callback.
//!
//! The main thread is the "control surface": it pushes note events over
//! the lock-free queue and tweaks parameters while the stream runs.

use std::thread::sleep;
use std::time::Duration;

use color_eyre::eyre::eyre;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ferric_dsp::config::{DrumKitConfig, EngineConfig};
use ferric_dsp::synth::drum_engine::{DrumEngine, HAT_NOTE, KICK_NOTE, SNARE_NOTE};
use ferric_dsp::synth::engine::PolyEngine;
use ferric_dsp::synth::message::SynthMessage;
use ferric_dsp::MAX_BLOCK_SIZE;
use rtrb::RingBuffer;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no output device available"))?;
    let config = device.default_output_config()?;
    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (mut synth_tx, mut synth_rx) = RingBuffer::<SynthMessage>::new(256);
    let (mut drum_tx, mut drum_rx) = RingBuffer::<SynthMessage>::new(256);

    let mut synth = PolyEngine::new(EngineConfig::default());
    synth.prepare(sample_rate, MAX_BLOCK_SIZE);
    let mut drums = DrumEngine::new(DrumKitConfig::default());
    drums.prepare(sample_rate, MAX_BLOCK_SIZE);

    let mut left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut right = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut drum_left = vec![0.0f32; MAX_BLOCK_SIZE];
    let mut drum_right = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
            for chunk in data.chunks_mut(MAX_BLOCK_SIZE * channels) {
                let frames = chunk.len() / channels;

                synth.drain_messages(&mut synth_rx);
                drums.drain_messages(&mut drum_rx);
                synth.render_block(&mut left[..frames], &mut right[..frames]);
                drums.render_block(&mut drum_left[..frames], &mut drum_right[..frames]);

                for (frame, out) in chunk.chunks_mut(channels).enumerate() {
                    let l = left[frame] + drum_left[frame];
                    let r = right[frame] + drum_right[frame];
                    out[0] = l;
                    if channels > 1 {
                        out[1] = r;
                    }
                }
            }
        },
        |err| eprintln!("stream error: {err}"),
        None,
    )?;
    stream.play()?;

    println!("Playing a chord and a drum groove for four bars...");

    let beat = Duration::from_millis(500);
    for note in [48u8, 60, 64, 67] {
        let _ = synth_tx.push(SynthMessage::NoteOn {
            note,
            velocity: 0.6,
            sample_offset: 0,
        });
    }

    for bar in 0..4 {
        for step in 0..4 {
            if step == 0 || step == 2 {
                let _ = drum_tx.push(SynthMessage::NoteOn {
                    note: KICK_NOTE,
                    velocity: 1.0,
                    sample_offset: 0,
                });
            }
            if step == 1 || step == 3 {
                let _ = drum_tx.push(SynthMessage::NoteOn {
                    note: SNARE_NOTE,
                    velocity: 0.8,
                    sample_offset: 0,
                });
            }
            let _ = drum_tx.push(SynthMessage::NoteOn {
                note: HAT_NOTE,
                velocity: 0.5,
                sample_offset: 0,
            });
            sleep(beat);
        }
        println!("  bar {}", bar + 1);
    }

    let _ = synth_tx.push(SynthMessage::AllNotesOff);
    sleep(Duration::from_millis(800));

    Ok(())
}
