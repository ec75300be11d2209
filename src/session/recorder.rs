use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::encode::worker::{EncodeWorker, SampleChunk};
use crate::models::config::{RecorderConfig, NOTIFICATION_PERIOD_FRAMES};
use crate::models::error::RecorderError;
use crate::models::state::RecorderState;
use crate::processing::frame_align::aligned_buffer_size;
use crate::processing::volume_meter::VolumeMeter;
use crate::traits::delegate::RecorderDelegate;
use crate::traits::encoder::EncoderProvider;
use crate::traits::input_device::{AudioInput, InputProvider};
use crate::traits::sink::SinkProvider;

/// Ceiling for the clamped volume accessor. Raw readings occasionally
/// exceed it on hot inputs.
pub const MAX_VOLUME: i32 = 2000;

/// State shared between the host-facing session and its capture thread.
struct Shared {
    /// Loop control flag. Set before initialization so re-entrant `start()`
    /// calls are rejected immediately; cleared by `stop()`, the duration
    /// cutoff, or a loop failure.
    running: AtomicBool,
    state: Mutex<RecorderState>,
    delegate: Mutex<Option<Arc<dyn RecorderDelegate>>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            running: AtomicBool::new(false),
            state: Mutex::new(RecorderState::Idle),
            delegate: Mutex::new(None),
        }
    }

    fn set_state(&self, new_state: RecorderState) {
        *self.state.lock() = new_state;
        log::debug!("recorder state changed to {:?}", new_state);
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            delegate.on_state_changed(&new_state);
        }
    }

    fn report_error(&self, error: &RecorderError) {
        log::error!("recorder error: {}", error);
        let delegate = self.delegate.lock().clone();
        if let Some(delegate) = delegate {
            delegate.on_error(error);
        }
    }
}

/// Microphone recording session orchestrator.
///
/// Generic over the input device, encoder, and sink backends. Owns the
/// real-time read loop on a dedicated thread, meters volume synchronously
/// with each read, and hands sample chunks to an [`EncodeWorker`] that
/// drains them onto the sink in the background.
///
/// Data flow:
/// ```text
/// [AudioInput] → read loop ─┬→ [VolumeMeter]
///                           └→ [EncodeWorker] → [AudioEncoder] → [EncodedSink]
/// ```
///
/// The read loop never blocks on the worker: submission is a non-blocking
/// enqueue, so encoding latency can never cause a dropped device read.
///
/// The capture thread itself is a plain named thread; elevated low-latency
/// scheduling of the sample delivery path is the platform backend's
/// responsibility (see [`InputProvider::open`]).
pub struct MicRecorder<I: InputProvider, E: EncoderProvider, S: SinkProvider> {
    input: I,
    encoder: E,
    sink: S,
    config: RecorderConfig,
    shared: Arc<Shared>,
    meter: VolumeMeter,
    capture_handle: Mutex<Option<JoinHandle<()>>>,
}

impl<I: InputProvider, E: EncoderProvider, S: SinkProvider> MicRecorder<I, E, S> {
    pub fn new(input: I, encoder: E, sink: S) -> Self {
        Self::with_config(input, encoder, sink, RecorderConfig::default())
    }

    pub fn with_config(input: I, encoder: E, sink: S, config: RecorderConfig) -> Self {
        Self {
            input,
            encoder,
            sink,
            config,
            shared: Arc::new(Shared::new()),
            meter: VolumeMeter::new(),
            capture_handle: Mutex::new(None),
        }
    }

    /// Register the event delegate. Callbacks fire on the capture or encode
    /// thread, never on the host thread.
    pub fn set_delegate(&self, delegate: Arc<dyn RecorderDelegate>) {
        *self.shared.delegate.lock() = Some(delegate);
    }

    /// Set the output bit rate in kbps. Takes effect at the next `start()`.
    pub fn set_output_bit_rate(&mut self, kbps: u32) {
        self.config.bit_rate_kbps = kbps;
    }

    /// Set the maximum recording duration in milliseconds; a negative value
    /// means unlimited. Takes effect at the next `start()`. The cutoff is
    /// checked once per read cycle, so its resolution is bounded by the
    /// read-cycle period.
    pub fn set_max_duration(&mut self, milliseconds: i64) {
        self.config.max_duration = if milliseconds < 0 {
            None
        } else {
            Some(Duration::from_millis(milliseconds as u64))
        };
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Start a recording session. No-op if one is already starting or
    /// running.
    ///
    /// On success the device is open at the aligned buffer size, the encode
    /// worker is accepting chunks, and the read loop is spinning up on its
    /// own thread. On failure the error is also forwarded to the delegate
    /// and the session is back in `Idle` with nothing leaked.
    pub fn start(&mut self) -> Result<(), RecorderError> {
        if self.shared.running.load(Ordering::SeqCst) {
            return Ok(());
        }

        // A previous session may still be tearing down, or mid-read after a
        // stop request it has not yet observed. Join it while the flag is
        // still down so its loop can exit; raising the flag first would
        // revive the old loop and wedge this join.
        let stale = self.capture_handle.lock().take();
        if let Some(handle) = stale {
            let _ = handle.join();
        }

        if self.shared.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        self.shared.set_state(RecorderState::Starting);
        match self.init_session() {
            Ok(()) => Ok(()),
            Err(error) => {
                self.shared.report_error(&error);
                self.shared.running.store(false, Ordering::SeqCst);
                self.shared.set_state(RecorderState::Idle);
                Err(error)
            }
        }
    }

    fn init_session(&mut self) -> Result<(), RecorderError> {
        self.config
            .validate()
            .map_err(RecorderError::InvalidConfig)?;

        let spec = self.config.pcm;
        let min_buffer = self.input.minimum_buffer_size(&spec)?;
        let buffer_size_bytes =
            aligned_buffer_size(min_buffer, spec.bytes_per_frame(), NOTIFICATION_PERIOD_FRAMES);

        let device = self.input.open(&spec, buffer_size_bytes)?;
        let encoder = self.encoder.create(&self.config.encoder_params())?;
        let sink = self.sink.open()?;

        let delegate = self.shared.delegate.lock().clone();
        let worker = EncodeWorker::spawn(encoder, sink, delegate)?;

        let buffer_samples = buffer_size_bytes / (spec.bit_depth as usize / 8);
        let capture = CaptureLoop {
            device,
            worker,
            buffer: vec![0i16; buffer_samples],
            meter: self.meter.clone(),
            shared: Arc::clone(&self.shared),
            max_duration: self.config.max_duration,
        };

        let handle = thread::Builder::new()
            .name("mic-capture".into())
            .spawn(move || capture.run())
            .map_err(|e| RecorderError::Device(format!("failed to spawn capture thread: {}", e)))?;
        *self.capture_handle.lock() = Some(handle);

        log::debug!(
            "session started: {} Hz, {} byte buffer, {} kbps",
            spec.sample_rate,
            buffer_size_bytes,
            self.config.bit_rate_kbps
        );
        Ok(())
    }

    /// Request the session to stop. Idempotent, callable from any thread,
    /// including delegate callbacks.
    ///
    /// Stopping is cooperative: the read loop observes the flag between
    /// reads, so worst-case latency is one device read cycle. Use [`join`]
    /// to wait for teardown and the encode drain to complete.
    ///
    /// [`join`]: MicRecorder::join
    pub fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
    }

    /// Wait for a stopping session to finish tearing down. Once this
    /// returns, the device is released and the sink holds the complete
    /// encoded output including the flushed encoder tail.
    pub fn join(&self) {
        let handle = self.capture_handle.lock().take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn state(&self) -> RecorderState {
        *self.shared.state.lock()
    }

    /// Last measured linear amplitude, unclamped. Zero before any data.
    pub fn raw_volume(&self) -> i32 {
        self.meter.amplitude()
    }

    /// Last measured amplitude, clamped to [`MAX_VOLUME`].
    pub fn volume(&self) -> i32 {
        self.meter.amplitude().min(MAX_VOLUME)
    }

    pub fn max_volume(&self) -> i32 {
        MAX_VOLUME
    }

    /// Last measured magnitude in decibels. Zero before any data.
    pub fn volume_db(&self) -> i32 {
        self.meter.decibels()
    }
}

/// Everything the capture thread owns: the device handle, the sample
/// buffer, and the encode worker it shuts down on exit.
struct CaptureLoop {
    device: Box<dyn AudioInput>,
    worker: EncodeWorker,
    buffer: Vec<i16>,
    meter: VolumeMeter,
    shared: Arc<Shared>,
    max_duration: Option<Duration>,
}

impl CaptureLoop {
    /// Top-level run function for the capture thread.
    ///
    /// Faults are caught here and funneled through the delegate; nothing
    /// unwinds across the thread boundary. Teardown runs on every exit
    /// path: the device is stopped and released, then the worker drains
    /// and finalizes the sink.
    fn run(mut self) {
        let result = self.pump();
        if let Err(ref error) = result {
            self.shared.report_error(error);
        }

        self.shared.running.store(false, Ordering::SeqCst);
        self.shared.set_state(RecorderState::Stopping);

        let mut device = self.device;
        device.stop();
        drop(device);

        self.worker.request_stop();
        self.worker.join();

        self.shared.set_state(RecorderState::Idle);
        log::debug!("capture thread finished");
    }

    fn pump(&mut self) -> Result<(), RecorderError> {
        self.device.start()?;
        self.shared.set_state(RecorderState::Running);
        let started = Instant::now();

        while self.shared.running.load(Ordering::SeqCst) {
            let read = self.device.read(&mut self.buffer)?;
            if read > 0 {
                // Only the valid region of this read reaches the encoder
                // and the meter; stale tail samples from a previous cycle
                // never do.
                let valid = &self.buffer[..read];
                self.worker.submit(SampleChunk::from_valid_region(valid));
                self.meter.update(valid);
            }

            if let Some(max) = self.max_duration {
                if started.elapsed() > max {
                    log::debug!("maximum duration reached after {:?}", started.elapsed());
                    self.shared.running.store(false, Ordering::SeqCst);
                }
            }
        }
        Ok(())
    }
}
