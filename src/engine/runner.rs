use std::{
    sync::mpsc::{self, RecvTimeoutError},
    thread::{self, JoinHandle},
    time::{Duration, Instant},
};

use crate::{
    engine::{sink::BlockSink, CancellationToken},
    error::{Result, SynthError},
    synth::{MessageReceiver, PolySynth},
    MAX_BLOCK_SIZE,
};

/// How long `Drop` waits for the runner thread before detaching it.
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(1);

/// How the runner schedules consecutive blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// One block per block period, like an audio device would pull them.
    RealTime,
    /// Back-to-back blocks as fast as the synth renders them.
    Freewheel,
}

/// Result of [`BlockRunner::stop`].
pub enum StopOutcome<R> {
    /// The thread finished; the synth is handed back.
    Joined(PolySynth<R>),
    /// The thread did not finish in time and was detached. It exits after
    /// its in-flight block without rendering another.
    TimedOut,
    /// The thread panicked.
    Panicked,
}

impl<R> StopOutcome<R> {
    pub fn into_synth(self) -> Option<PolySynth<R>> {
        match self {
            StopOutcome::Joined(synth) => Some(synth),
            StopOutcome::TimedOut | StopOutcome::Panicked => None,
        }
    }
}

/// Background thread that pulls blocks from a synth and hands them to a
/// sink until cancelled.
///
/// Nothing runs until [`BlockRunner::start`] is called. The cancellation
/// token is checked before every block, so once [`BlockRunner::stop`] returns
/// `Joined` no further block will ever be rendered.
pub struct BlockRunner<R> {
    token: CancellationToken,
    done_rx: mpsc::Receiver<()>,
    thread: Option<JoinHandle<PolySynth<R>>>,
}

impl<R> BlockRunner<R>
where
    R: MessageReceiver + Send + 'static,
{
    pub fn start<S: BlockSink>(
        mut synth: PolySynth<R>,
        mut sink: S,
        block_size: usize,
        pacing: Pacing,
    ) -> Result<Self> {
        if block_size == 0 || block_size > MAX_BLOCK_SIZE {
            return Err(SynthError::InvalidBlockSize {
                size: block_size,
                max: MAX_BLOCK_SIZE,
            });
        }

        let token = CancellationToken::new();
        let (done_tx, done_rx) = mpsc::channel();
        let period = Duration::from_secs_f64(block_size as f64 / synth.sample_rate() as f64);

        let thread = thread::Builder::new().name("keysynth-audio".into()).spawn({
            let token = token.clone();
            move || {
                let mut block = vec![0.0f32; block_size];
                let mut deadline = Instant::now();

                while !token.is_cancelled() {
                    synth.render_block(&mut block);
                    sink.write_block(&block);

                    if pacing == Pacing::RealTime {
                        deadline += period;
                        let now = Instant::now();
                        if deadline > now {
                            thread::sleep(deadline - now);
                        } else {
                            // fell behind; don't try to catch up with a burst
                            deadline = now;
                        }
                    }
                }

                let _ = done_tx.send(());
                synth
            }
        })?;

        tracing::info!(block_size, ?pacing, "block runner started");

        Ok(Self {
            token,
            done_rx,
            thread: Some(thread),
        })
    }
}

impl<R> BlockRunner<R> {
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, |t| t.is_finished())
    }

    /// Cancel and wait up to `timeout` for the thread to finish.
    pub fn stop(mut self, timeout: Duration) -> StopOutcome<R> {
        self.shutdown(timeout)
    }

    fn shutdown(&mut self, timeout: Duration) -> StopOutcome<R> {
        self.token.cancel();

        let Some(thread) = self.thread.take() else {
            return StopOutcome::Panicked;
        };

        match self.done_rx.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => match thread.join() {
                Ok(synth) => {
                    tracing::info!(frames = synth.frames_rendered(), "block runner stopped");
                    StopOutcome::Joined(synth)
                }
                Err(_) => {
                    tracing::error!("block runner thread panicked");
                    StopOutcome::Panicked
                }
            },
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(?timeout, "block runner did not stop in time, detaching");
                StopOutcome::TimedOut
            }
        }
    }
}

impl<R> Drop for BlockRunner<R> {
    fn drop(&mut self) {
        if self.thread.is_some() {
            let _ = self.shutdown(DEFAULT_STOP_TIMEOUT);
        }
    }
}
