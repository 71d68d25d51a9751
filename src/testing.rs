//! Test doubles for variants and media operations.

use crate::media::MediaOperations;
use crate::thumbnails::{Job, Variant};
use async_trait::async_trait;
use color_eyre::eyre::eyre;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub enum Behaviour {
    Succeed(Duration),
    Fail(String),
    Panic,
}

/// A variant whose outcome for each job is decided by a closure.
pub struct ScriptedVariant {
    name: &'static str,
    script: Box<dyn Fn(&Job) -> Behaviour + Send + Sync>,
    pub started: AtomicUsize,
    pub completed: AtomicUsize,
    outputs: Mutex<Vec<PathBuf>>,
}

impl ScriptedVariant {
    pub fn new(
        name: &'static str,
        script: impl Fn(&Job) -> Behaviour + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            script: Box::new(script),
            started: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            outputs: Mutex::new(Vec::new()),
        })
    }

    pub fn outputs(&self) -> Vec<PathBuf> {
        self.outputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Variant for ScriptedVariant {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn execute(&self, job: &Job) -> color_eyre::Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.outputs.lock().unwrap().push(job.output.clone());
        match (self.script)(job) {
            Behaviour::Succeed(delay) => {
                tokio::time::sleep(delay).await;
                self.completed.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            Behaviour::Fail(msg) => Err(eyre!(msg)),
            Behaviour::Panic => panic!("scripted panic"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MediaCall {
    Frame {
        source: PathBuf,
        skip_seconds: u64,
        max_width: u32,
        output: PathBuf,
    },
    Sprite {
        source: PathBuf,
        skip_seconds: u64,
        interval_seconds: u64,
        max_width: u32,
        output: PathBuf,
    },
}

/// Records calls and writes `FAKE_IMAGE` to every output instead of running ffmpeg.
pub struct FakeMedia {
    pub duration: f64,
    pub failure: Option<String>,
    calls: Mutex<Vec<MediaCall>>,
}

pub const FAKE_IMAGE: &[u8] = b"\xff\xd8fake-jpeg\xff\xd9";

impl FakeMedia {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::new(120.0)
        }
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    async fn finish(&self, call: MediaCall, output: &Path) -> color_eyre::Result<()> {
        self.calls.lock().unwrap().push(call);
        if let Some(msg) = &self.failure {
            return Err(eyre!("{msg}"));
        }
        tokio::fs::write(output, FAKE_IMAGE).await?;
        Ok(())
    }
}

#[async_trait]
impl MediaOperations for FakeMedia {
    async fn duration(&self, _source: &Path) -> color_eyre::Result<f64> {
        Ok(self.duration)
    }

    async fn extract_frame(
        &self,
        source: &Path,
        skip_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()> {
        let call = MediaCall::Frame {
            source: source.to_path_buf(),
            skip_seconds,
            max_width,
            output: output.to_path_buf(),
        };
        self.finish(call, output).await
    }

    async fn extract_sprite(
        &self,
        source: &Path,
        skip_seconds: u64,
        interval_seconds: u64,
        max_width: u32,
        output: &Path,
    ) -> color_eyre::Result<()> {
        let call = MediaCall::Sprite {
            source: source.to_path_buf(),
            skip_seconds,
            interval_seconds,
            max_width,
            output: output.to_path_buf(),
        };
        self.finish(call, output).await
    }
}
