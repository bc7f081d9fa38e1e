use async_trait::async_trait;
use prometheus::Gauge;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Value source polled by a `PeriodicSampler`
#[async_trait]
pub trait GaugeSource: Send + Sync {
    async fn sample(&self) -> Result<f64, String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
    Stopped,
}

impl SamplerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Sampling,
            _ => Self::Stopped,
        }
    }
}

/// Writes a value from a `GaugeSource` into a gauge on a fixed interval.
///
/// The first sample is taken one full interval after `spawn`. The task runs
/// until `SamplerHandle::shutdown` is called or the handle is dropped.
pub struct PeriodicSampler<S> {
    name: String,
    gauge: Gauge,
    source: S,
    interval: Duration,
}

impl<S: GaugeSource + 'static> PeriodicSampler<S> {
    pub fn new(name: impl Into<String>, gauge: Gauge, source: S, interval: Duration) -> Self {
        Self {
            name: name.into(),
            gauge,
            source,
            interval,
        }
    }

    pub fn spawn(self) -> SamplerHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let state = Arc::new(AtomicU8::new(SamplerState::Idle as u8));
        let samples = Arc::new(AtomicU64::new(0));

        let task_state = state.clone();
        let task_samples = samples.clone();
        let Self {
            name,
            gauge,
            source,
            interval,
        } = self;

        let task = tokio::spawn(async move {
            tracing::info!("Sampler {} started ({:?} interval)", name, interval);

            let mut tick = interval_at(Instant::now() + interval, interval);
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    // Err means every handle is gone
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = tick.tick() => {
                        task_state.store(SamplerState::Sampling as u8, Ordering::SeqCst);
                        match source.sample().await {
                            Ok(value) => {
                                gauge.set(value);
                                task_samples.fetch_add(1, Ordering::SeqCst);
                            }
                            Err(e) => tracing::warn!("Sampler {} failed: {}", name, e),
                        }
                        task_state.store(SamplerState::Idle as u8, Ordering::SeqCst);
                    }
                }
            }

            task_state.store(SamplerState::Stopped as u8, Ordering::SeqCst);
            tracing::info!("Sampler {} stopped", name);
        });

        SamplerHandle {
            stop_tx,
            task,
            state,
            samples,
        }
    }
}

pub struct SamplerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    state: Arc<AtomicU8>,
    samples: Arc<AtomicU64>,
}

impl SamplerHandle {
    pub fn state(&self) -> SamplerState {
        SamplerState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Number of values successfully written to the gauge
    pub fn samples_taken(&self) -> u64 {
        self.samples.load(Ordering::SeqCst)
    }

    /// Signal the task to stop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Sampler task ended abnormally: {}", e);
        }
    }
}
