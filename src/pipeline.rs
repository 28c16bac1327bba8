//! Stage queues and the workers that drive them.
//!
//! A [`Pipeline`] is the append-only chain of stages behind a
//! [`Stream`](crate::Stream). Each stage is one named thread: it reads the
//! previous stage's queue, writes its own bounded queue, and closes that queue
//! (by dropping the sender) when it returns. Blocking sends on a full queue and
//! blocking receives on an empty one give the chain its backpressure.
//!
//! Every stage consults the shared [`DeadlineGuard`] before handling an
//! element. Once the deadline has passed the stage records the truncation in
//! the correctness flag and stops, which downstream observes as an early end
//! of stream.

use crate::error::{StreamError, panic_message};
use crate::source::{Element, IndexedSource};
use anyhow::Result;
use crossbeam_channel::{Receiver, Sender, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Instant;
use tracing::{debug, warn};

/// Settings a pipeline hands to every stage it starts.
#[derive(Clone, Copy, Debug)]
pub(crate) struct StageConfig {
    pub buffer_size: usize,
    pub deadline: Option<Instant>,
}

/// Read-only handle on a stream's correctness flag.
///
/// Obtain it with [`Stream::correctness`](crate::Stream::correctness) before
/// running a terminal operation; it keeps answering after the stream has been
/// consumed.
#[derive(Clone, Debug)]
pub struct Correctness(Arc<AtomicBool>);

impl Correctness {
    /// `false` once any stage stopped early because the deadline passed.
    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Clone)]
pub(crate) struct DeadlineGuard {
    deadline: Option<Instant>,
    correct: Arc<AtomicBool>,
}

impl DeadlineGuard {
    /// `true` if the deadline has passed; marks the stream as truncated.
    pub(crate) fn expired(&self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.correct.store(false, Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

/// Handle a stage body uses to read its input and write its output.
pub(crate) struct StageContext<O> {
    name: &'static str,
    out: Sender<O>,
    guard: DeadlineGuard,
    forwarded: usize,
}

impl<O> StageContext<O> {
    /// Forward `value` downstream. Returns `false` once the consumer is gone,
    /// after which the stage should return.
    pub(crate) fn emit(&mut self, value: O) -> bool {
        if self.out.send(value).is_err() {
            return false;
        }
        self.forwarded += 1;
        true
    }

    pub(crate) const fn forwarded(&self) -> usize {
        self.forwarded
    }

    /// Deadline test performed before each element.
    pub(crate) fn expired(&self) -> bool {
        let expired = self.guard.expired();
        if expired {
            warn!(stage = self.name, forwarded = self.forwarded, "deadline passed, truncating");
        }
        expired
    }

    /// Iterate `input` until it closes or the deadline passes.
    pub(crate) fn inputs<'a, I>(&self, input: &'a Receiver<I>) -> Inputs<'a, I> {
        Inputs {
            input,
            guard: self.guard.clone(),
            stage: self.name,
        }
    }
}

pub(crate) struct Inputs<'a, I> {
    input: &'a Receiver<I>,
    guard: DeadlineGuard,
    stage: &'static str,
}

impl<I> Iterator for Inputs<'_, I> {
    type Item = I;

    fn next(&mut self) -> Option<I> {
        let item = self.input.recv().ok()?;
        if self.guard.expired() {
            warn!(stage = self.stage, "deadline passed, truncating");
            return None;
        }
        Some(item)
    }
}

struct StageHandle {
    name: &'static str,
    worker: JoinHandle<()>,
}

pub(crate) struct Pipeline {
    config: StageConfig,
    guard: DeadlineGuard,
    stages: Vec<StageHandle>,
    failure: Option<StreamError>,
}

impl Pipeline {
    pub(crate) fn new(config: StageConfig) -> Self {
        Self {
            config,
            guard: DeadlineGuard {
                deadline: config.deadline,
                correct: Arc::new(AtomicBool::new(true)),
            },
            stages: Vec::new(),
            failure: None,
        }
    }

    /// An empty pipeline with the same buffer size and deadline but its own
    /// correctness flag.
    pub(crate) fn fork(&self) -> Self {
        Self::new(self.config)
    }

    pub(crate) const fn config(&self) -> StageConfig {
        self.config
    }

    pub(crate) fn correctness(&self) -> Correctness {
        Correctness(Arc::clone(&self.guard.correct))
    }

    /// Number of stages started so far (including finished ones not yet joined).
    pub(crate) fn depth(&self) -> usize {
        self.stages.len()
    }

    /// Append a stage queue and start the worker that fills it.
    pub(crate) fn spawn_stage<O, F>(&mut self, name: &'static str, body: F) -> Receiver<O>
    where
        O: Element,
        F: FnOnce(&mut StageContext<O>) + Send + 'static,
    {
        let (out, rx) = bounded(self.config.buffer_size);
        let mut ctx = StageContext {
            name,
            out,
            guard: self.guard.clone(),
            forwarded: 0,
        };
        let index = self.stages.len();
        let spawned = thread::Builder::new()
            .name(format!("ironstream-{index}-{name}"))
            .spawn(move || {
                debug!(stage = name, index, "stage started");
                body(&mut ctx);
                debug!(stage = name, index, forwarded = ctx.forwarded, "stage finished");
            });
        match spawned {
            Ok(worker) => self.stages.push(StageHandle { name, worker }),
            Err(e) => {
                // The body (and with it the sender) was dropped, so `rx` is
                // already closed; report the failure at the terminal.
                self.failure.get_or_insert(StreamError::Spawn {
                    stage: name.to_string(),
                    message: e.to_string(),
                });
            }
        }
        rx
    }

    /// Stream every element of `source`, in order, into a new first stage.
    pub(crate) fn feed<T: Element>(&mut self, source: Box<dyn IndexedSource<T>>) -> Receiver<T> {
        self.spawn_stage("source", move |ctx| {
            for i in 0..source.len() {
                if ctx.expired() || !ctx.emit(source.get(i)) {
                    break;
                }
            }
        })
    }

    /// Join every started stage, remembering the first failure.
    ///
    /// Callers must drop the tail receiver first so no stage stays blocked on
    /// a full queue.
    pub(crate) fn settle(&mut self) {
        for stage in self.stages.drain(..) {
            if let Err(payload) = stage.worker.join() {
                self.failure.get_or_insert(StreamError::StageFailed {
                    stage: stage.name.to_string(),
                    message: panic_message(payload.as_ref()),
                });
            }
        }
    }

    /// Settle and surface any stage failure.
    pub(crate) fn finish(mut self) -> Result<()> {
        self.settle();
        match self.failure {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}
