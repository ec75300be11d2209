use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::RecorderError;
use crate::traits::sink::{EncodedSink, SinkProvider};

/// Opens a fresh [`FileSink`] at a fixed path for each session.
pub struct FileSinkProvider {
    path: PathBuf,
}

impl FileSinkProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SinkProvider for FileSinkProvider {
    fn open(&self) -> Result<Box<dyn EncodedSink>, RecorderError> {
        Ok(Box::new(FileSink::create(&self.path)?))
    }
}

/// Append-only file sink for encoded audio.
///
/// Creates missing parent directories on open. `finish` flushes, closes the
/// file, and records a SHA-256 checksum of the completed output.
pub struct FileSink {
    path: PathBuf,
    file: Option<BufWriter<File>>,
    bytes_written: u64,
    checksum: Option<String>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self, RecorderError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RecorderError::Sink(format!("failed to create directory: {}", e)))?;
        }
        let file = File::create(path)
            .map_err(|e| RecorderError::Sink(format!("failed to create file: {}", e)))?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(BufWriter::new(file)),
            bytes_written: 0,
            checksum: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total encoded bytes written so far.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// SHA-256 hex digest of the finished file. `None` until `finish`.
    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }
}

impl EncodedSink for FileSink {
    fn write(&mut self, data: &[u8]) -> Result<(), RecorderError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| RecorderError::Sink("file is not open for writing".into()))?;
        file.write_all(data)
            .map_err(|e| RecorderError::Sink(format!("write failed: {}", e)))?;
        self.bytes_written += data.len() as u64;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RecorderError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| RecorderError::Sink("sink already finalized".into()))?;
        file.flush()
            .map_err(|e| RecorderError::Sink(format!("flush failed: {}", e)))?;
        drop(file);

        let checksum = sha256_file(&self.path)?;
        log::info!(
            "finalized {} ({} bytes, sha256 {})",
            self.path.display(),
            self.bytes_written,
            checksum
        );
        self.checksum = Some(checksum);
        Ok(())
    }
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, RecorderError> {
    let data = fs::read(path)
        .map_err(|e| RecorderError::Sink(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("mic_recorder_test_{}", name))
    }

    #[test]
    fn write_and_finish() {
        let path = temp_file_path("basic.bin");
        let mut sink = FileSink::create(&path).unwrap();

        sink.write(&[1, 2, 3]).unwrap();
        sink.write(&[4, 5]).unwrap();
        assert_eq!(sink.bytes_written(), 5);

        sink.finish().unwrap();
        assert_eq!(sink.checksum().map(str::len), Some(64));

        let data = fs::read(&path).unwrap();
        assert_eq!(data, vec![1, 2, 3, 4, 5]);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn creates_parent_directories() {
        let path = temp_file_path("nested").join("deeper/out.bin");
        let mut sink = FileSink::create(&path).unwrap();
        sink.write(&[0x42]).unwrap();
        sink.finish().unwrap();

        assert!(path.exists());
        fs::remove_dir_all(temp_file_path("nested")).ok();
    }

    #[test]
    fn write_after_finish_fails() {
        let path = temp_file_path("closed.bin");
        let mut sink = FileSink::create(&path).unwrap();
        sink.finish().unwrap();

        assert!(sink.write(&[1]).is_err());
        assert!(sink.finish().is_err());

        fs::remove_file(&path).ok();
    }

    #[test]
    fn provider_opens_fresh_sink() {
        let path = temp_file_path("provider.bin");
        let provider = FileSinkProvider::new(&path);

        let mut sink = provider.open().unwrap();
        sink.write(&[9, 9]).unwrap();
        sink.finish().unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![9, 9]);

        // A second session truncates and starts over.
        let mut sink = provider.open().unwrap();
        sink.write(&[1]).unwrap();
        sink.finish().unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1]);

        fs::remove_file(&path).ok();
    }
}
