use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::log::log_sink::LogSink;
use crate::playback::{
    playback_error::PlaybackError,
    scheduler::{PLAYBACK_SAMPLE_RATE, PlaybackScheduler},
};
use crate::{sink_debug, sink_error, sink_info, sink_warn};

/// Spawns the playback worker.
///
/// The worker owns the CPAL output stream on its own thread (`cpal::Stream`
/// is not `Send`). The stream callback locks the shared scheduler and renders
/// directly from it; that mutex is the single serialization point for the
/// scheduler's clock cursor and active-source set.
///
/// # Arguments
///
/// * `logger` - Logger instance.
/// * `device_name` - Optional output-device override (`[Audio] output_device`).
/// * `scheduler` - The shared playback scheduler to render from.
/// * `running` - Flag to control the worker's lifecycle.
///
/// # Returns
///
/// The `JoinHandle` of the worker thread.
pub fn spawn_playback_worker(
    logger: Arc<dyn LogSink>,
    device_name: Option<String>,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    running: Arc<AtomicBool>,
) -> Option<JoinHandle<()>> {
    thread::Builder::new()
        .name("babel-playback".into())
        .spawn(move || {
            if let Err(e) = run_playback(&logger, device_name, &scheduler, &running) {
                sink_error!(logger, "[Playback] {}", e);
            }
        })
        .ok()
}

fn resolve_output_device(
    host: &cpal::Host,
    device_name: Option<String>,
) -> Result<cpal::Device, PlaybackError> {
    match device_name {
        Some(name) => host
            .output_devices()
            .map_err(|e| PlaybackError::DeviceUnavailable(e.to_string()))?
            .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            .ok_or_else(|| {
                PlaybackError::DeviceUnavailable(format!("output device '{name}' not found"))
            }),
        None => host
            .default_output_device()
            .ok_or_else(|| PlaybackError::DeviceUnavailable("no default output device".into())),
    }
}

fn run_playback(
    logger: &Arc<dyn LogSink>,
    device_name: Option<String>,
    scheduler: &Arc<Mutex<PlaybackScheduler>>,
    running: &Arc<AtomicBool>,
) -> Result<(), PlaybackError> {
    let host = cpal::default_host();
    let device = resolve_output_device(&host, device_name)?;

    sink_info!(
        logger,
        "[Playback] using output device: {}",
        device.name().unwrap_or_default()
    );

    let config = cpal::StreamConfig {
        channels: 1,
        sample_rate: cpal::SampleRate(PLAYBACK_SAMPLE_RATE),
        buffer_size: cpal::BufferSize::Default,
    };

    let scheduler_cb = Arc::clone(scheduler);

    let logger_cb = logger.clone();
    let err_fn = move |err: cpal::StreamError| {
        sink_warn!(logger_cb, "[Playback] stream error: {}", err);
    };

    let stream = device
        .build_output_stream(
            &config,
            move |out: &mut [f32], _: &cpal::OutputCallbackInfo| {
                if let Ok(mut sched) = scheduler_cb.lock() {
                    sched.render(out);
                } else {
                    // Lock poisoned: fall back to silence.
                    out.fill(0.0);
                }
            },
            err_fn,
            None,
        )
        .map_err(|e| PlaybackError::StreamBuild(e.to_string()))?;

    stream
        .play()
        .map_err(|e| PlaybackError::StreamPlay(e.to_string()))?;

    sink_debug!(logger, "[Playback] started");

    while running.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    sink_debug!(logger, "[Playback] stopped");

    Ok(())
}
