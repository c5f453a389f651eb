// cpal capture on a dedicated worker thread. The stream lives and dies on that
// thread; the recorder talks to it over std channels.

use std::sync::mpsc;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(2);
const STOP_TIMEOUT: Duration = Duration::from_secs(3);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, thiserror::Error)]
pub enum AudioCaptureError {
    #[error("no input device found")]
    NoInputDevice,

    #[error("failed to list input devices: {0}")]
    ListDevices(#[from] cpal::DevicesError),

    #[error("failed to get default config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error("audio worker failed: {0}")]
    Worker(String),

    #[error("audio worker startup timeout")]
    WorkerTimeout,

    #[error("recording stop timed out")]
    StopTimeout,

    #[error("internal channel error")]
    Channel,
}

/// Mono samples at the device's native rate.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

enum Cmd {
    Stop(mpsc::Sender<Vec<f32>>),
    Shutdown,
}

enum WorkerMsg {
    Ready,
    Error(String),
}

/// An open input stream that is capturing from the moment it opens until
/// [`AudioRecorder::stop`]. Dropping it releases the device.
pub struct AudioRecorder {
    cmd_tx: mpsc::Sender<Cmd>,
    worker: Option<std::thread::JoinHandle<()>>,
    sample_rate_hz: u32,
}

impl std::fmt::Debug for AudioRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioRecorder")
            .field("sample_rate_hz", &self.sample_rate_hz)
            .finish()
    }
}

impl AudioRecorder {
    pub fn list_input_device_names() -> Result<Vec<String>, AudioCaptureError> {
        let host = cpal::default_host();
        let mut out: Vec<String> = host
            .input_devices()?
            .filter_map(|d| d.name().ok())
            .collect();
        out.sort();
        out.dedup();
        Ok(out)
    }

    /// Opens the named input, or the default one when the name is empty or
    /// not found.
    pub fn open_named(device_name: Option<&str>) -> Result<Self, AudioCaptureError> {
        let host = cpal::default_host();
        let needle = device_name.map(str::trim).filter(|n| !n.is_empty());

        if let Some(needle) = needle {
            let found = host
                .input_devices()
                .ok()
                .and_then(|mut devs| devs.find(|d| d.name().is_ok_and(|n| n == needle)));
            match found {
                Some(dev) => {
                    log::info!("using input device: {needle}");
                    return Self::open(dev);
                }
                None => log::warn!("input device not found, using default: {needle}"),
            }
        }

        let device = host
            .default_input_device()
            .ok_or(AudioCaptureError::NoInputDevice)?;
        Self::open(device)
    }

    pub fn open(device: Device) -> Result<Self, AudioCaptureError> {
        let default_cfg = device.default_input_config()?;
        let sample_rate_hz = default_cfg.sample_rate().0;
        let sample_format = default_cfg.sample_format();
        let config: StreamConfig = default_cfg.into();

        let (sample_tx, sample_rx) = mpsc::channel::<Vec<f32>>();
        let (cmd_tx, cmd_rx) = mpsc::channel::<Cmd>();
        let (worker_tx, worker_rx) = mpsc::channel::<WorkerMsg>();

        let worker = std::thread::spawn(move || {
            let stream = match sample_format {
                SampleFormat::I16 => build_input_stream::<i16>(&device, &config, sample_tx),
                SampleFormat::U16 => build_input_stream::<u16>(&device, &config, sample_tx),
                SampleFormat::I32 => build_input_stream::<i32>(&device, &config, sample_tx),
                _ => build_input_stream::<f32>(&device, &config, sample_tx),
            };
            let stream = match stream.and_then(|s| {
                s.play().map_err(|e| format!("play stream: {e}"))?;
                Ok(s)
            }) {
                Ok(s) => s,
                Err(e) => {
                    log::error!("audio stream failed: {e}");
                    let _ = worker_tx.send(WorkerMsg::Error(e));
                    return;
                }
            };

            let _ = worker_tx.send(WorkerMsg::Ready);
            run_consumer(sample_rx, cmd_rx);
            drop(stream);
        });

        match worker_rx.recv_timeout(STARTUP_TIMEOUT) {
            Ok(WorkerMsg::Ready) => {}
            Ok(WorkerMsg::Error(e)) => return Err(AudioCaptureError::Worker(e)),
            Err(mpsc::RecvTimeoutError::Timeout) => return Err(AudioCaptureError::WorkerTimeout),
            Err(mpsc::RecvTimeoutError::Disconnected) => return Err(AudioCaptureError::Channel),
        }

        Ok(Self {
            cmd_tx,
            worker: Some(worker),
            sample_rate_hz,
        })
    }

    /// Returns everything captured since the stream opened and shuts the
    /// stream down.
    pub fn stop(mut self) -> Result<CapturedAudio, AudioCaptureError> {
        let (resp_tx, resp_rx) = mpsc::channel();
        self.cmd_tx
            .send(Cmd::Stop(resp_tx))
            .map_err(|_| AudioCaptureError::Channel)?;

        let samples = resp_rx.recv_timeout(STOP_TIMEOUT).map_err(|e| match e {
            mpsc::RecvTimeoutError::Timeout => AudioCaptureError::StopTimeout,
            mpsc::RecvTimeoutError::Disconnected => AudioCaptureError::Channel,
        })?;
        self.shutdown();

        Ok(CapturedAudio {
            sample_rate_hz: self.sample_rate_hz,
            samples,
        })
    }

    fn shutdown(&mut self) {
        let _ = self.cmd_tx.send(Cmd::Shutdown);
        if let Some(h) = self.worker.take() {
            let _ = h.join();
        }
    }
}

impl Drop for AudioRecorder {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn build_input_stream<T>(
    device: &Device,
    config: &StreamConfig,
    sample_tx: mpsc::Sender<Vec<f32>>,
) -> Result<Stream, String>
where
    T: Sample + SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = usize::from(config.channels.max(1));
    let cb = move |data: &[T], _: &cpal::InputCallbackInfo| {
        let mono: Vec<f32> = data
            .chunks_exact(channels)
            .map(|frame| frame.iter().map(|&s| s.to_sample::<f32>()).sum::<f32>() / channels as f32)
            .collect();
        let _ = sample_tx.send(mono);
    };

    device
        .build_input_stream(
            config,
            cb,
            |err| log::error!("audio stream error: {err}"),
            None,
        )
        .map_err(|e| format!("build stream: {e}"))
}

fn run_consumer(sample_rx: mpsc::Receiver<Vec<f32>>, cmd_rx: mpsc::Receiver<Cmd>) {
    let mut captured: Vec<f32> = Vec::new();

    loop {
        while let Ok(cmd) = cmd_rx.try_recv() {
            match cmd {
                Cmd::Stop(resp) => {
                    // Drain what the callback already queued.
                    while let Ok(samples) = sample_rx.try_recv() {
                        captured.extend_from_slice(&samples);
                    }
                    let _ = resp.send(std::mem::take(&mut captured));
                }
                Cmd::Shutdown => return,
            }
        }

        match sample_rx.recv_timeout(POLL_INTERVAL) {
            Ok(samples) => captured.extend_from_slice(&samples),
            Err(mpsc::RecvTimeoutError::Timeout) => continue,
            Err(mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}
