use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::models::error::RecorderError;
use crate::traits::delegate::RecorderDelegate;
use crate::traits::encoder::AudioEncoder;
use crate::traits::sink::EncodedSink;

/// One capture buffer's worth of valid samples, produced by a single device
/// read. Ownership moves into the encode queue; each chunk is consumed
/// exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleChunk {
    samples: Vec<i16>,
}

impl SampleChunk {
    /// Copy the valid region of a capture buffer into an owned chunk.
    pub fn from_valid_region(buffer: &[i16]) -> Self {
        Self {
            samples: buffer.to_vec(),
        }
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

enum EncodeJob {
    Chunk(SampleChunk),
    Stop,
    Abort,
}

/// Background encoding worker.
///
/// Owns an unbounded FIFO of sample chunks and a dedicated thread that
/// drains it, feeds each chunk to the encoder, and appends the output to
/// the sink. A distinguished `Stop` sentinel triggers drain-then-terminate:
/// every chunk queued ahead of it is encoded, the encoder is flushed, the
/// tail bytes are written, and the sink is finalized before the thread
/// exits.
///
/// `submit` never blocks the caller; encoding latency shows up as queue
/// depth, never as a stalled device read.
pub struct EncodeWorker {
    tx: Sender<EncodeJob>,
    stopping: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl EncodeWorker {
    /// Spawn the drain thread.
    ///
    /// The encoder and sink are already initialized by the caller, so the
    /// worker can accept chunks as soon as this returns. Runtime failures
    /// are funneled through `delegate.on_error` from the worker thread.
    pub fn spawn(
        encoder: Box<dyn AudioEncoder>,
        sink: Box<dyn EncodedSink>,
        delegate: Option<Arc<dyn RecorderDelegate>>,
    ) -> Result<Self, RecorderError> {
        let (tx, rx) = unbounded();
        let handle = thread::Builder::new()
            .name("encode-worker".into())
            .spawn(move || {
                if let Err(error) = drain_loop(rx, encoder, sink) {
                    log::error!("encode worker aborted: {}", error);
                    if let Some(ref delegate) = delegate {
                        delegate.on_error(&error);
                    }
                }
            })
            .map_err(|e| RecorderError::Encoder(format!("failed to spawn encode worker: {}", e)))?;

        Ok(Self {
            tx,
            stopping: Arc::new(AtomicBool::new(false)),
            handle: Some(handle),
        })
    }

    /// Enqueue a chunk for encoding. Non-blocking.
    ///
    /// Chunks submitted after `request_stop` are dropped silently; they are
    /// trailing noise the caller no longer needs encoded.
    pub fn submit(&self, chunk: SampleChunk) {
        if self.stopping.load(Ordering::SeqCst) {
            log::debug!("dropping {}-sample chunk submitted after stop", chunk.len());
            return;
        }
        // Send only fails if the drain thread already exited after an error;
        // the chunk is dropped either way.
        let _ = self.tx.send(EncodeJob::Chunk(chunk));
    }

    /// Signal that no more chunks will be submitted. Idempotent.
    ///
    /// The worker drains everything already queued, flushes the encoder,
    /// finalizes the sink, and exits. Use `join` to wait for that.
    pub fn request_stop(&self) {
        if !self.stopping.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(EncodeJob::Stop);
        }
    }

    /// Wait for the drain thread to terminate. The output is complete once
    /// this returns.
    pub fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EncodeWorker {
    fn drop(&mut self) {
        // Every completion path calls request_stop explicitly. A worker
        // dropped without one is being discarded (a session that failed to
        // come up), so the thread exits without flushing the encoder or
        // finalizing the sink; partial output is left as-is.
        if !self.stopping.swap(true, Ordering::SeqCst) {
            let _ = self.tx.send(EncodeJob::Abort);
        }
        self.join();
    }
}

fn drain_loop(
    rx: Receiver<EncodeJob>,
    mut encoder: Box<dyn AudioEncoder>,
    mut sink: Box<dyn EncodedSink>,
) -> Result<(), RecorderError> {
    loop {
        match rx.recv() {
            Ok(EncodeJob::Chunk(chunk)) => {
                let bytes = encoder.encode(chunk.samples())?;
                if !bytes.is_empty() {
                    sink.write(&bytes)?;
                }
            }
            // Disconnect means every sender is gone; nothing more can arrive.
            Ok(EncodeJob::Stop) | Err(_) => break,
            Ok(EncodeJob::Abort) => return Ok(()),
        }
    }

    let tail = encoder.flush()?;
    if !tail.is_empty() {
        sink.write(&tail)?;
    }
    sink.finish()?;
    log::debug!("encode queue drained, sink finalized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::AtomicUsize;

    struct RecordingEncoder {
        calls: Arc<Mutex<Vec<Vec<i16>>>>,
        flushes: Arc<AtomicUsize>,
        fail_on_call: Option<usize>,
    }

    impl AudioEncoder for RecordingEncoder {
        fn encode(&mut self, samples: &[i16]) -> Result<Vec<u8>, RecorderError> {
            let call_index = {
                let mut calls = self.calls.lock();
                calls.push(samples.to_vec());
                calls.len()
            };
            if self.fail_on_call == Some(call_index) {
                return Err(RecorderError::Encoder("synthetic encode failure".into()));
            }
            // One output byte per input sample keeps lengths easy to assert.
            Ok(vec![0xEE; samples.len()])
        }

        fn flush(&mut self) -> Result<Vec<u8>, RecorderError> {
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(vec![0xFF; 7])
        }
    }

    struct VecSink {
        data: Arc<Mutex<Vec<u8>>>,
        finished: Arc<AtomicBool>,
    }

    impl EncodedSink for VecSink {
        fn write(&mut self, data: &[u8]) -> Result<(), RecorderError> {
            self.data.lock().extend_from_slice(data);
            Ok(())
        }

        fn finish(&mut self) -> Result<(), RecorderError> {
            self.finished.store(true, Ordering::SeqCst);
            Ok(())
        }
    }

    struct ErrorSpy {
        errors: Arc<Mutex<Vec<RecorderError>>>,
    }

    impl RecorderDelegate for ErrorSpy {
        fn on_error(&self, error: &RecorderError) {
            self.errors.lock().push(error.clone());
        }
    }

    struct Fixture {
        calls: Arc<Mutex<Vec<Vec<i16>>>>,
        flushes: Arc<AtomicUsize>,
        data: Arc<Mutex<Vec<u8>>>,
        finished: Arc<AtomicBool>,
        errors: Arc<Mutex<Vec<RecorderError>>>,
    }

    fn spawn_worker(fail_on_call: Option<usize>) -> (EncodeWorker, Fixture) {
        let fixture = Fixture {
            calls: Arc::new(Mutex::new(Vec::new())),
            flushes: Arc::new(AtomicUsize::new(0)),
            data: Arc::new(Mutex::new(Vec::new())),
            finished: Arc::new(AtomicBool::new(false)),
            errors: Arc::new(Mutex::new(Vec::new())),
        };
        let encoder = Box::new(RecordingEncoder {
            calls: Arc::clone(&fixture.calls),
            flushes: Arc::clone(&fixture.flushes),
            fail_on_call,
        });
        let sink = Box::new(VecSink {
            data: Arc::clone(&fixture.data),
            finished: Arc::clone(&fixture.finished),
        });
        let delegate = Arc::new(ErrorSpy {
            errors: Arc::clone(&fixture.errors),
        });
        let worker = EncodeWorker::spawn(encoder, sink, Some(delegate)).unwrap();
        (worker, fixture)
    }

    #[test]
    fn drains_in_fifo_order_then_flushes() {
        let (mut worker, fixture) = spawn_worker(None);

        worker.submit(SampleChunk::from_valid_region(&[1i16; 160]));
        worker.submit(SampleChunk::from_valid_region(&[2i16; 160]));
        worker.submit(SampleChunk::from_valid_region(&[3i16; 100]));
        worker.request_stop();
        worker.join();

        let calls = fixture.calls.lock();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], vec![1i16; 160]);
        assert_eq!(calls[1], vec![2i16; 160]);
        assert_eq!(calls[2], vec![3i16; 100]);

        assert_eq!(fixture.flushes.load(Ordering::SeqCst), 1);
        // 160 + 160 + 100 encoded bytes plus the 7-byte flushed tail.
        assert_eq!(fixture.data.lock().len(), 420 + 7);
        assert!(fixture.finished.load(Ordering::SeqCst));
        assert!(fixture.errors.lock().is_empty());
    }

    #[test]
    fn submit_after_stop_is_dropped_silently() {
        let (mut worker, fixture) = spawn_worker(None);

        worker.submit(SampleChunk::from_valid_region(&[1i16; 160]));
        worker.request_stop();
        worker.submit(SampleChunk::from_valid_region(&[9i16; 160]));
        worker.join();

        assert_eq!(fixture.calls.lock().len(), 1);
        assert!(fixture.errors.lock().is_empty());
    }

    #[test]
    fn request_stop_is_idempotent() {
        let (mut worker, fixture) = spawn_worker(None);

        worker.submit(SampleChunk::from_valid_region(&[4i16; 160]));
        worker.request_stop();
        worker.request_stop();
        worker.join();

        assert_eq!(fixture.flushes.load(Ordering::SeqCst), 1);
        assert!(fixture.finished.load(Ordering::SeqCst));
    }

    #[test]
    fn encode_failure_reports_and_aborts() {
        let (mut worker, fixture) = spawn_worker(Some(2));

        worker.submit(SampleChunk::from_valid_region(&[1i16; 160]));
        worker.submit(SampleChunk::from_valid_region(&[2i16; 160]));
        worker.submit(SampleChunk::from_valid_region(&[3i16; 160]));
        worker.request_stop();
        worker.join();

        // Second chunk failed: no flush, no finalize, partial output as-is.
        assert_eq!(fixture.flushes.load(Ordering::SeqCst), 0);
        assert!(!fixture.finished.load(Ordering::SeqCst));
        assert_eq!(fixture.data.lock().len(), 160);

        let errors = fixture.errors.lock();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], RecorderError::Encoder(_)));
    }

    #[test]
    fn drop_without_stop_discards_without_finalizing() {
        let (worker, fixture) = spawn_worker(None);
        worker.submit(SampleChunk::from_valid_region(&[5i16; 160]));
        drop(worker);

        // No stop was ever requested: the sink must not be finalized and no
        // flushed tail written for a session that never completed.
        assert_eq!(fixture.flushes.load(Ordering::SeqCst), 0);
        assert!(!fixture.finished.load(Ordering::SeqCst));
    }

    #[test]
    fn drop_after_stop_still_finalizes() {
        let (worker, fixture) = spawn_worker(None);
        worker.submit(SampleChunk::from_valid_region(&[5i16; 160]));
        worker.request_stop();
        drop(worker);

        assert_eq!(fixture.calls.lock().len(), 1);
        assert_eq!(fixture.flushes.load(Ordering::SeqCst), 1);
        assert!(fixture.finished.load(Ordering::SeqCst));
    }
}
