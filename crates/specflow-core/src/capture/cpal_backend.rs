//! Microphone capture through cpal.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::analyser::ByteSpectrumAnalyser;
use super::{AudioHandle, CaptureError, CaptureSource, Result};
use crate::config::CaptureConfig;

/// Samples written by the audio callback, drained by the render loop
struct SharedInput {
    queue: VecDeque<f32>,
    capacity: usize,
    fault: Option<String>,
}

impl SharedInput {
    fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
            fault: None,
        }
    }

    fn push_frames<T>(&mut self, data: &[T], channels: usize)
    where
        T: Sample,
        f32: FromSample<T>,
    {
        for frame in data.chunks(channels) {
            let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
            self.queue.push_back(sum / frame.len() as f32);
        }
        let overflow = self.queue.len().saturating_sub(self.capacity);
        if overflow > 0 {
            self.queue.drain(..overflow);
        }
    }
}

/// List the names of all input devices of the default host
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host
        .input_devices()
        .map_err(|e| CaptureError::PermissionDenied(format!("Failed to list devices: {}", e)))?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

/// Capture source reading the default (or a named) input device
pub struct CpalCapture {
    config: CaptureConfig,
}

impl CpalCapture {
    /// Create a capture source. Nothing is opened until [`CaptureSource::open`].
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    fn find_device(&self, host: &cpal::Host) -> Result<cpal::Device> {
        match &self.config.device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| CaptureError::PermissionDenied(e.to_string()))?
                .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                .ok_or_else(|| {
                    CaptureError::PermissionDenied(format!("Input device '{}' not found", name))
                }),
            None => host
                .default_input_device()
                .ok_or_else(|| CaptureError::PermissionDenied("No input device found".to_string())),
        }
    }
}

impl CaptureSource for CpalCapture {
    type Handle = CpalHandle;

    fn open(&mut self) -> Result<CpalHandle> {
        let host = cpal::default_host();
        let device = self.find_device(&host)?;

        let supported = device.default_input_config().map_err(|e| {
            CaptureError::PermissionDenied(format!("Failed to get input config: {}", e))
        })?;
        let sample_format = supported.sample_format();
        let stream_config: cpal::StreamConfig = supported.into();
        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels as usize;

        info!(
            "Audio input: {} @ {}Hz, {} channel(s), {:?}",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            sample_rate,
            channels,
            sample_format
        );

        let shared = Arc::new(Mutex::new(SharedInput::new(self.config.fft_size)));

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, &shared),
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, &shared),
            SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, &shared),
            SampleFormat::I32 => build_stream::<i32>(&device, &stream_config, &shared),
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, &shared),
            SampleFormat::F64 => build_stream::<f64>(&device, &stream_config, &shared),
            other => Err(CaptureError::PermissionDenied(format!(
                "Unsupported sample format {:?}",
                other
            ))),
        }?;

        stream
            .play()
            .map_err(|e| CaptureError::PermissionDenied(format!("Failed to start stream: {}", e)))?;

        Ok(CpalHandle {
            stream: Some(stream),
            shared,
            analyser: ByteSpectrumAnalyser::new(self.config.clone()),
            drain_buffer: Vec::with_capacity(self.config.fft_size),
            sample_rate,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    shared: &Arc<Mutex<SharedInput>>,
) -> Result<cpal::Stream>
where
    T: SizedSample,
    f32: FromSample<T>,
{
    let channels = (config.channels as usize).max(1);
    let data_shared = Arc::clone(shared);
    let error_shared = Arc::clone(shared);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                data_shared.lock().push_frames(data, channels);
            },
            move |err| {
                error!("Audio stream error: {}", err);
                error_shared.lock().fault = Some(err.to_string());
            },
            None,
        )
        .map_err(|e| CaptureError::PermissionDenied(format!("Failed to build audio stream: {}", e)))
}

/// Handle for an open cpal input stream
pub struct CpalHandle {
    /// Input stream (kept alive until close)
    stream: Option<cpal::Stream>,
    shared: Arc<Mutex<SharedInput>>,
    analyser: ByteSpectrumAnalyser,
    drain_buffer: Vec<f32>,
    sample_rate: u32,
}

impl AudioHandle for CpalHandle {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bin_count(&self) -> usize {
        self.analyser.bin_count()
    }

    fn frequency_snapshot(&mut self) -> Result<&[u8]> {
        if self.stream.is_none() {
            return Err(CaptureError::Closed);
        }

        self.drain_buffer.clear();
        {
            let mut shared = self.shared.lock();
            if let Some(fault) = &shared.fault {
                return Err(CaptureError::StreamLost(fault.clone()));
            }
            self.drain_buffer.extend(shared.queue.drain(..));
        }

        self.analyser.push_samples(&self.drain_buffer);
        Ok(self.analyser.byte_frequency_data())
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause input stream: {}", e);
            }
            drop(stream);
            debug!("Audio input stream closed");
        }
    }

    fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for CpalHandle {
    fn drop(&mut self) {
        self.close();
    }
}
