//! Hardware driver on top of cpal.
//!
//! The input callback only forwards frames through an rtrb ring; the output
//! callback owns the [`LoopProcessor`] and runs it in chunks of at most one
//! block. Device errors set an xrun flag that turns the next callback into
//! an underflow cycle.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, FromSample, Host, SampleFormat, SizedSample, Stream, StreamConfig};
use rtrb::{Consumer, Producer, RingBuffer};

use crate::{
    config::LooperConfig,
    engine::{CycleStatus, LoopProcessor},
    error::{LooperError, Result},
    io::converter::{frame_from_interleaved, write_interleaved},
    track::{Frame, SILENCE},
};

use super::{AudioDriver, DriverControl};

/// Input blocks buffered between the two callbacks
const INPUT_RING_BLOCKS: usize = 8;
/// Queued input beyond this many blocks is skipped
const MAX_BACKLOG_BLOCKS: usize = 4;

pub struct CpalDriver {
    sample_rate: u32,
    block_size: usize,
    input_device: Option<String>,
    output_device: Option<String>,
}

impl CpalDriver {
    pub fn new(config: &LooperConfig) -> Self {
        Self {
            sample_rate: config.sample_rate,
            block_size: config.block_size,
            input_device: config.input_device.clone(),
            output_device: config.output_device.clone(),
        }
    }

    fn stream_config(&self, channels: cpal::ChannelCount) -> StreamConfig {
        StreamConfig {
            channels,
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: BufferSize::Fixed(self.block_size as u32),
        }
    }

    /// Open both devices and start their streams
    fn open(&self, processor: LoopProcessor) -> Result<(Stream, Stream)> {
        let host = cpal::default_host();
        let input_device = find_input_device(&host, self.input_device.as_deref())?;
        let output_device = find_output_device(&host, self.output_device.as_deref())?;
        log::info!(
            "Input device: {}",
            input_device.name().unwrap_or_else(|_| "Unknown".to_string())
        );
        log::info!(
            "Output device: {}",
            output_device.name().unwrap_or_else(|_| "Unknown".to_string())
        );

        let input_default = input_device.default_input_config().map_err(device_err)?;
        let output_default = output_device.default_output_config().map_err(device_err)?;
        let input_config = self.stream_config(input_default.channels());
        let output_config = self.stream_config(output_default.channels());

        let (producer, consumer) = RingBuffer::<Frame>::new(self.block_size * INPUT_RING_BLOCKS);
        let xrun = Arc::new(AtomicBool::new(false));

        let input_stream = match input_default.sample_format() {
            SampleFormat::F32 => build_input_stream::<f32>(&input_device, &input_config, producer, xrun.clone()),
            SampleFormat::I16 => build_input_stream::<i16>(&input_device, &input_config, producer, xrun.clone()),
            SampleFormat::U16 => build_input_stream::<u16>(&input_device, &input_config, producer, xrun.clone()),
            format => Err(LooperError::Device(format!("unsupported input format {}", format))),
        }?;

        let state = OutputState {
            processor,
            input: consumer,
            input_buf: vec![SILENCE; self.block_size],
            output_buf: vec![SILENCE; self.block_size],
            block_size: self.block_size,
            max_backlog: self.block_size * MAX_BACKLOG_BLOCKS,
            xrun: xrun.clone(),
        };
        let output_stream = match output_default.sample_format() {
            SampleFormat::F32 => build_output_stream::<f32>(&output_device, &output_config, state, xrun),
            SampleFormat::I16 => build_output_stream::<i16>(&output_device, &output_config, state, xrun),
            SampleFormat::U16 => build_output_stream::<u16>(&output_device, &output_config, state, xrun),
            format => Err(LooperError::Device(format!("unsupported output format {}", format))),
        }?;

        input_stream.play().map_err(device_err)?;
        output_stream.play().map_err(device_err)?;
        log::info!(
            "Streams running: {} Hz, {} frames per block, {} in / {} out channels",
            self.sample_rate,
            self.block_size,
            input_config.channels,
            output_config.channels
        );
        Ok((input_stream, output_stream))
    }
}

impl AudioDriver for CpalDriver {
    fn run(self: Box<Self>, processor: LoopProcessor, mut control: DriverControl) {
        // cpal streams are not Send, so they live and die on this thread
        let streams = match self.open(processor) {
            Ok(streams) => streams,
            Err(e) => {
                control.notify_ready(Err(e));
                return;
            }
        };
        control.notify_ready(Ok(()));
        control.wait_while_running(Duration::from_millis(10));
        drop(streams);
        log::debug!("cpal streams closed");
    }
}

/// State owned by the output callback
struct OutputState {
    processor: LoopProcessor,
    input: Consumer<Frame>,
    input_buf: Vec<Frame>,
    output_buf: Vec<Frame>,
    block_size: usize,
    max_backlog: usize,
    xrun: Arc<AtomicBool>,
}

impl OutputState {
    fn fill<T>(&mut self, data: &mut [T], channels: usize)
    where
        T: SizedSample + FromSample<i16>,
    {
        let status = CycleStatus {
            output_underflow: self.xrun.swap(false, Ordering::AcqRel),
        };

        let backlog = self.input.slots();
        if backlog > self.max_backlog {
            if let Ok(chunk) = self.input.read_chunk(backlog - self.max_backlog) {
                chunk.commit_all();
            }
        }

        for device_block in data.chunks_mut(channels * self.block_size) {
            let frames = device_block.len() / channels;
            let input = &mut self.input_buf[..frames];
            for frame in input.iter_mut() {
                *frame = self.input.pop().unwrap_or(SILENCE);
            }

            let output = &mut self.output_buf[..frames];
            if let Err(e) = self.processor.process(input, output, status) {
                log::error!("Processing cycle failed: {}", e);
                output.fill(SILENCE);
            }

            for (frame, device_frame) in output.iter().zip(device_block.chunks_mut(channels)) {
                write_interleaved(frame, device_frame);
            }
        }
    }
}

fn build_input_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut producer: Producer<Frame>,
    xrun: Arc<AtomicBool>,
) -> Result<Stream>
where
    T: SizedSample,
    i16: FromSample<T>,
{
    let channels = config.channels as usize;
    let err_fn = move |err| {
        log::warn!("Input stream error: {}", err);
        xrun.store(true, Ordering::Release);
    };

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                for device_frame in data.chunks_exact(channels) {
                    // Full ring: the output side is behind, drop
                    let _ = producer.push(frame_from_interleaved(device_frame));
                }
            },
            err_fn,
            None,
        )
        .map_err(device_err)
}

fn build_output_stream<T>(
    device: &Device,
    config: &StreamConfig,
    mut state: OutputState,
    xrun: Arc<AtomicBool>,
) -> Result<Stream>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels as usize;
    let err_fn = move |err| {
        log::warn!("Output stream error: {}", err);
        xrun.store(true, Ordering::Release);
    };

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| state.fill(data, channels),
            err_fn,
            None,
        )
        .map_err(device_err)
}

fn find_input_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(name) => host
            .input_devices()
            .map_err(device_err)?
            .find(|d| d.name().is_ok_and(|n| n == name))
            .ok_or_else(|| LooperError::Device(format!("input device not found: {}", name))),
        None => host
            .default_input_device()
            .ok_or_else(|| LooperError::Device("no default input device".into())),
    }
}

fn find_output_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(name) => host
            .output_devices()
            .map_err(device_err)?
            .find(|d| d.name().is_ok_and(|n| n == name))
            .ok_or_else(|| LooperError::Device(format!("output device not found: {}", name))),
        None => host
            .default_output_device()
            .ok_or_else(|| LooperError::Device("no default output device".into())),
    }
}

fn device_err(e: impl Display) -> LooperError {
    LooperError::Device(e.to_string())
}
