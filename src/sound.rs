use std::io::Write;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use anyhow::{anyhow, Context};
use chipvm::Buzzer;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use log::{debug, error, warn};

const TONE_HZ: f32 = 440.0;
const BEEP_MS: usize = 150;

/// Claims one frame of the current beep. A beep that lands mid-callback resets
/// the count instead of being overwritten.
fn take_frame(remaining: &AtomicUsize) -> bool {
    remaining
        .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| left.checked_sub(1))
        .is_ok()
}

/// 440 Hz sine tone on the default output device. The stream runs for the
/// life of the emulator and writes silence unless a beep is in progress.
pub struct Sound {
    stream: cpal::Stream,
    remaining: Arc<AtomicUsize>,
    beep_frames: usize,
}

impl Sound {
    pub fn new() -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("no output device available"))?;
        let supported_config = device
            .default_output_config()
            .context("error while querying output config")?;
        let sample_format = supported_config.sample_format();
        let config: cpal::StreamConfig = supported_config.into();
        let remaining = Arc::new(AtomicUsize::new(0));

        let stream = match sample_format {
            cpal::SampleFormat::I8 => Self::build::<i8>(&device, &config, &remaining),
            cpal::SampleFormat::I16 => Self::build::<i16>(&device, &config, &remaining),
            cpal::SampleFormat::I32 => Self::build::<i32>(&device, &config, &remaining),
            cpal::SampleFormat::I64 => Self::build::<i64>(&device, &config, &remaining),
            cpal::SampleFormat::U8 => Self::build::<u8>(&device, &config, &remaining),
            cpal::SampleFormat::U16 => Self::build::<u16>(&device, &config, &remaining),
            cpal::SampleFormat::U32 => Self::build::<u32>(&device, &config, &remaining),
            cpal::SampleFormat::U64 => Self::build::<u64>(&device, &config, &remaining),
            cpal::SampleFormat::F32 => Self::build::<f32>(&device, &config, &remaining),
            cpal::SampleFormat::F64 => Self::build::<f64>(&device, &config, &remaining),
            sample_format => return Err(anyhow!("unsupported sample format '{sample_format}'")),
        }?;
        stream.play().context("failed to start audio stream")?;

        let beep_frames = config.sample_rate.0 as usize * BEEP_MS / 1000;
        debug!(
            "audio ready: {} Hz, {} channels, {sample_format}",
            config.sample_rate.0, config.channels
        );
        Ok(Self {
            stream,
            remaining,
            beep_frames,
        })
    }

    fn build<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        remaining: &Arc<AtomicUsize>,
    ) -> anyhow::Result<cpal::Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let sample_rate = config.sample_rate.0 as f32;
        let channels = config.channels as usize;
        let remaining = Arc::clone(remaining);

        let mut sample_clock = 0f32;
        let mut next_value = move || {
            if !take_frame(&remaining) {
                return 0.0;
            }
            sample_clock = (sample_clock + 1.0) % sample_rate;
            // quieter than full scale
            0.25 * (sample_clock * TONE_HZ * 2.0 * std::f32::consts::PI / sample_rate).sin()
        };

        let err_fn = |err| error!("an error occurred on stream: {}", err);

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                Self::write_data(data, channels, &mut next_value)
            },
            err_fn,
            None,
        )?;
        Ok(stream)
    }

    fn write_data<T>(output: &mut [T], channels: usize, next_sample: &mut dyn FnMut() -> f32)
    where
        T: Sample + FromSample<f32>,
    {
        for frame in output.chunks_mut(channels) {
            let value: T = T::from_sample(next_sample());
            for sample in frame.iter_mut() {
                *sample = value;
            }
        }
    }
}

impl Buzzer for Sound {
    fn beep(&mut self) {
        self.remaining.store(self.beep_frames, Ordering::Relaxed);
        if let Err(e) = self.stream.play() {
            warn!("could not resume audio stream: {e}");
        }
    }
}

/// Fallback when there is no audio device or sound is muted.
pub struct TerminalBell;

impl Buzzer for TerminalBell {
    fn beep(&mut self) {
        let mut out = std::io::stdout();
        if out.write_all(b"\x07").and_then(|_| out.flush()).is_err() {
            warn!("could not ring terminal bell");
        }
    }
}
