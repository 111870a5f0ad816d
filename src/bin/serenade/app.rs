//! Audio stream setup: engine on the cpal callback, handle on our side.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Consumer, RingBuffer};

use serenade::synth::{engine_with_handle, EngineHandle, SynthConfig};
use serenade::MAX_BLOCK_SIZE;

/// Samples of rendered audio kept around for the UI meter.
const TAP_RING_SIZE: usize = 8192;

/// A running output stream plus the control-side pieces.
pub struct AudioSystem {
    /// Keep alive for the duration of playback
    pub stream: cpal::Stream,
    /// Scheduler transport (clock + tone queue)
    pub handle: EngineHandle,
    /// Rendered-sample tap feeding the UI meter
    pub tap: Consumer<f32>,
    pub sample_rate: f32,
}

/// Open the default output device and start rendering.
///
/// The engine moves into the audio callback; everything the UI thread needs
/// travels through the returned handle and tap ring.
pub fn start_audio() -> EyreResult<AudioSystem> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f32;
    let channels = config.channels() as usize;

    let (mut engine, handle) = engine_with_handle(SynthConfig {
        sample_rate,
        ..SynthConfig::default()
    });
    let (mut tap_tx, tap_rx) = RingBuffer::<f32>::new(TAP_RING_SIZE);

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            &config.into(),
            move |data: &mut [f32], _| {
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let block = &mut render_buf[..frames_to_render];
                    engine.render_block(block);

                    // Copy to output (mono to all channels) and feed the tap
                    let out_off = frames_written * channels;
                    for (i, &s) in block.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                        let _ = tap_tx.push(s);
                    }

                    frames_written += frames_to_render;
                }
            },
            |err| eprintln!("audio error: {}", err),
            None,
        )
        .wrap_err("failed to build output stream")?;

    stream.play().wrap_err("failed to start output stream")?;

    Ok(AudioSystem {
        stream,
        handle,
        tap: tap_rx,
        sample_rate,
    })
}
