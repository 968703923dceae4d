//! Engine lifecycle: a synth, its control handle and the thread driving it.
//!
//! Threads are only ever started by an explicit `start` call and stopped
//! through a [`CancellationToken`] with a bounded wait.

pub mod runner;
pub mod sink;

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use rtrb::Consumer;

pub use runner::{BlockRunner, Pacing, StopOutcome, DEFAULT_STOP_TIMEOUT};
pub use sink::{BlockSink, NullSink};

use crate::{
    config::SynthConfig,
    error::Result,
    synth::{channel, SynthHandle, SynthMessage},
};

/// Shared stop flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// A queued synth running on its own block thread.
pub struct Engine {
    handle: SynthHandle,
    runner: BlockRunner<Consumer<SynthMessage>>,
}

impl Engine {
    pub fn start<S: BlockSink>(config: &SynthConfig, sink: S, pacing: Pacing) -> Result<Self> {
        let (handle, synth) = channel(config)?;
        let runner = BlockRunner::start(synth, sink, config.block_size, pacing)?;
        Ok(Self { handle, runner })
    }

    pub fn handle(&self) -> &SynthHandle {
        &self.handle
    }

    /// Stop the block thread; see [`BlockRunner::stop`].
    pub fn stop(self, timeout: Duration) -> StopOutcome<Consumer<SynthMessage>> {
        self.runner.stop(timeout)
    }
}
