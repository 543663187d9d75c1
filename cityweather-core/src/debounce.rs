//! Trailing-edge debounce for async handlers.

use std::{future::Future, time::Duration};

use tokio::{
    sync::mpsc,
    task::JoinHandle,
    time::{self, Instant},
};

enum Signal<T> {
    Call(T),
    Cancel,
}

/// Collapses bursts of calls into a single handler invocation.
///
/// Each [`call`](Debouncer::call) restarts the quiet period. When the period
/// elapses without another call, the handler runs once with the last argument
/// seen. Create one per input source and keep it for that source's lifetime;
/// a fresh debouncer per call never coalesces anything.
#[derive(Debug)]
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Signal<T>>,
    timer: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the timer task. Must be called from within a Tokio runtime.
    pub fn new<F, Fut>(quiet: Duration, mut handler: F) -> Self
    where
        F: FnMut(T) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Signal<T>>();

        let timer = tokio::spawn(async move {
            let mut pending: Option<T> = None;
            let sleep = time::sleep(quiet);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    signal = rx.recv() => match signal {
                        Some(Signal::Call(arg)) => {
                            pending = Some(arg);
                            sleep.as_mut().reset(Instant::now() + quiet);
                        }
                        Some(Signal::Cancel) => pending = None,
                        None => break,
                    },
                    () = &mut sleep, if pending.is_some() => {
                        if let Some(arg) = pending.take() {
                            tokio::spawn(handler(arg));
                        }
                    }
                }
            }
        });

        Self { tx, timer }
    }
}

impl<T> Debouncer<T> {
    pub fn call(&self, arg: T) {
        self.send(Signal::Call(arg), "call");
    }

    /// Forget the pending argument, if any, without running the handler.
    pub fn cancel(&self) {
        self.send(Signal::Cancel, "cancel");
    }

    fn send(&self, signal: Signal<T>, what: &str) {
        if self.tx.send(signal).is_err() {
            tracing::debug!(what, "debounce timer is gone, dropping signal");
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.timer.abort();
    }
}
