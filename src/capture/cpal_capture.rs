use std::collections::VecDeque;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicU64, Ordering},
    mpsc::SyncSender,
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::capture::{
    audio_frame::AudioFrame,
    capture_error::CaptureError,
    capture_source::{CaptureEvent, CaptureResult, CaptureSource},
};
use crate::log::log_sink::LogSink;
use crate::util::now_millis;
use crate::{sink_debug, sink_error, sink_info, sink_warn};

/// Fixed capture rate exchanged with the translation engine.
pub const CAPTURE_SAMPLE_RATE: u32 = 16_000;

/// Fixed capture block size, in samples.
pub const BLOCK_SAMPLES: usize = 4_096;

/// Microphone capture through CPAL.
///
/// `cpal::Stream` is not `Send`, so the stream lives and dies on a dedicated
/// worker thread, parked on a run flag. The stream callback accumulates
/// samples and drains whole blocks into the frame queue; it never blocks.
pub struct CpalCaptureSource {
    logger: Arc<dyn LogSink>,
    /// Optional device-name override (`[Audio] input_device`); default input
    /// device otherwise.
    device_name: Option<String>,
    running: Arc<AtomicBool>,
    dropped: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl CpalCaptureSource {
    #[must_use]
    pub fn new(logger: Arc<dyn LogSink>, device_name: Option<String>) -> Self {
        Self {
            logger,
            device_name,
            running: Arc::new(AtomicBool::new(false)),
            dropped: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }
}

impl CaptureSource for CpalCaptureSource {
    fn start(&mut self, tx: SyncSender<CaptureEvent>) -> CaptureResult<()> {
        if self.worker.is_some() {
            return Err(CaptureError::Runtime("capture already running".into()));
        }

        self.running.store(true, Ordering::SeqCst);
        self.dropped.store(0, Ordering::SeqCst);

        let logger = self.logger.clone();
        let device_name = self.device_name.clone();
        let running = Arc::clone(&self.running);
        let dropped = Arc::clone(&self.dropped);

        self.worker = thread::Builder::new()
            .name("babel-capture".into())
            .spawn(move || {
                if let Err(e) = run_capture(&logger, device_name, &tx, &running, &dropped) {
                    sink_error!(logger, "[Capture] {}", e);
                    let _ = tx.try_send(CaptureEvent::Error(e));
                }
            })
            .ok();

        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    fn frames_dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

fn resolve_input_device(
    host: &cpal::Host,
    device_name: Option<String>,
) -> CaptureResult<cpal::Device> {
    match device_name {
        Some(name) => host
            .input_devices()
            .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| {
                CaptureError::DeviceUnavailable(format!("input device '{name}' not found"))
            }),
        None => host
            .default_input_device()
            .ok_or_else(|| CaptureError::DeviceUnavailable("no default input device".into())),
    }
}

fn run_capture(
    logger: &Arc<dyn LogSink>,
    device_name: Option<String>,
    tx: &SyncSender<CaptureEvent>,
    running: &Arc<AtomicBool>,
    dropped: &Arc<AtomicU64>,
) -> CaptureResult<()> {
    let host = cpal::default_host();
    let device = resolve_input_device(&host, device_name)?;

    sink_info!(
        logger,
        "[Capture] using input device: {}",
        device.name().unwrap_or_default()
    );

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(CAPTURE_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    // Accumulates callback buffers until a whole block is available.
    let pending = Arc::new(Mutex::new(VecDeque::with_capacity(BLOCK_SAMPLES * 2)));
    let pending_cb = Arc::clone(&pending);

    let tx_data = tx.clone();
    let dropped_cb = Arc::clone(dropped);

    let logger_err = logger.clone();
    let err_fn = move |err: cpal::StreamError| {
        sink_warn!(logger_err, "[Capture] stream error: {}", err);
    };

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let Ok(mut buf) = pending_cb.lock() else {
                    return;
                };
                buf.extend(data.iter().copied());

                while buf.len() >= BLOCK_SAMPLES {
                    let samples: Vec<f32> = buf.drain(0..BLOCK_SAMPLES).collect();
                    let frame = AudioFrame {
                        samples,
                        sample_rate: CAPTURE_SAMPLE_RATE,
                        timestamp_ms: now_millis(),
                    };

                    // Capture must never stall real time: a full queue drops
                    // the frame instead of waiting for the consumer.
                    if tx_data.try_send(CaptureEvent::Frame(frame)).is_err() {
                        dropped_cb.fetch_add(1, Ordering::Relaxed);
                    }
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| CaptureError::StreamBuild(e.to_string()))?;

    stream
        .play()
        .map_err(|e| CaptureError::StreamPlay(e.to_string()))?;

    sink_debug!(logger, "[Capture] started");

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(50));
    }

    // Dropping the stream releases the device.
    drop(stream);
    sink_debug!(logger, "[Capture] stopped");

    Ok(())
}
