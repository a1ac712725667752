use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::{Mutex, ReentrantMutex};
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::alerts::AlertEngine;
use crate::config::MonitorConfig;
use crate::models::{Alert, Portfolio, RiskMetrics, RiskUpdate};
use crate::risk::RiskAggregator;
use crate::traits::event_handler::RiskEventHandler;

use super::scheduler::ScheduledTask;

/// Live risk monitor.
///
/// Owns the current `(alerts, metrics)` snapshot, re-evaluates it on a fixed
/// interval while monitoring, and pushes every new snapshot to subscribers.
/// Cloning yields another handle onto the same monitor.
#[derive(Clone)]
pub struct RiskMonitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    state: Mutex<MonitorState>,
    subscribers: Mutex<Vec<SubscriberEntry>>,
    // Held for the whole of every publish. Re-entrant so handlers may call
    // back into the monitor.
    dispatch: ReentrantMutex<()>,
    generation: AtomicU64,
    next_subscriber_id: AtomicU64,
}

struct MonitorState {
    portfolio: Option<Portfolio>,
    alerts: Vec<Alert>,
    metrics: Option<RiskMetrics>,
    engine: AlertEngine,
    task: Option<ScheduledTask>,
}

struct SubscriberEntry {
    id: u64,
    handler: Arc<dyn RiskEventHandler>,
}

/// Returned by [`RiskMonitor::subscribe`]; call [`Subscription::unsubscribe`] to stop receiving updates
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    inner: Weak<MonitorInner>,
}

impl Subscription {
    /// Remove the handler from the monitor
    pub fn unsubscribe(self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.subscribers.lock().retain(|entry| entry.id != self.id);
            debug!("Subscriber {} removed", self.id);
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl MonitorState {
    fn evaluate(&mut self) -> Option<RiskUpdate> {
        let portfolio = self.portfolio.as_ref()?;
        let metrics = RiskAggregator::compute(portfolio);
        let alerts = self.engine.evaluate(portfolio, &metrics);

        debug!(
            "Evaluated {} ({} tokens, ${:.2}): {} alert(s)",
            portfolio.address,
            portfolio.token_count(),
            portfolio.total_value,
            alerts.len()
        );

        self.alerts = alerts;
        self.metrics = Some(metrics);
        self.snapshot()
    }

    fn snapshot(&self) -> Option<RiskUpdate> {
        self.metrics.as_ref().map(|metrics| RiskUpdate {
            alerts: self.alerts.clone(),
            metrics: metrics.clone(),
        })
    }
}

impl MonitorInner {
    fn evaluate_and_publish(&self) -> Option<RiskUpdate> {
        let _dispatch = self.dispatch.lock();
        let (update, failures) = {
            let mut state = self.state.lock();
            let update = state.evaluate();
            (update, state.engine.take_failures())
        };
        if let Some(update) = &update {
            self.publish(update);
        }
        for failure in &failures {
            self.publish_error(failure);
        }
        update
    }

    fn tick(&self, generation: u64) {
        let _dispatch = self.dispatch.lock();
        if self.generation.load(Ordering::Acquire) != generation {
            debug!("Dropping tick from a stopped schedule");
            return;
        }
        self.evaluate_and_publish();
    }

    fn handlers(&self) -> Vec<(u64, Arc<dyn RiskEventHandler>)> {
        self.subscribers
            .lock()
            .iter()
            .map(|entry| (entry.id, entry.handler.clone()))
            .collect()
    }

    fn publish_error(&self, failure: &anyhow::Error) {
        for (id, handler) in self.handlers() {
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| handler.handle_error(failure)));
            if delivered.is_err() {
                error!("Subscriber {} panicked while handling an error", id);
            }
        }
    }

    fn publish(&self, update: &RiskUpdate) {
        for (id, handler) in self.handlers() {
            let alerts = update.alerts.clone();
            let metrics = update.metrics.clone();
            let delivered = panic::catch_unwind(AssertUnwindSafe(|| {
                handler.handle_risk_update(alerts, metrics);
            }));
            if delivered.is_err() {
                error!("Subscriber {} panicked while handling a risk update", id);
            }
        }
    }

    // Caller holds `dispatch`.
    fn stop_locked(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let task = self.state.lock().task.take();
        if let Some(task) = task {
            task.cancel();
            info!("Risk monitoring stopped");
        }
    }
}

impl RiskMonitor {
    /// Create a new idle monitor
    pub fn new(config: MonitorConfig) -> Self {
        let engine = AlertEngine::from_config(&config);
        Self {
            inner: Arc::new(MonitorInner {
                config,
                state: Mutex::new(MonitorState {
                    portfolio: None,
                    alerts: Vec::new(),
                    metrics: None,
                    engine,
                    task: None,
                }),
                subscribers: Mutex::new(Vec::new()),
                dispatch: ReentrantMutex::new(()),
                generation: AtomicU64::new(0),
                next_subscriber_id: AtomicU64::new(1),
            }),
        }
    }

    /// Create a monitor around a custom alert engine
    pub fn with_engine(config: MonitorConfig, engine: AlertEngine) -> Self {
        let monitor = Self::new(config);
        monitor.inner.state.lock().engine = engine;
        monitor
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Register a handler; it receives every snapshot published from now on
    pub fn subscribe<H>(&self, handler: H) -> Subscription
    where
        H: RiskEventHandler + 'static,
    {
        self.subscribe_shared(Arc::new(handler))
    }

    /// Register a handler that is shared with other owners
    pub fn subscribe_shared(&self, handler: Arc<dyn RiskEventHandler>) -> Subscription {
        let id = self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        self.inner.subscribers.lock().push(SubscriberEntry { id, handler });
        debug!("Subscriber {} registered", id);

        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Number of registered handlers
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.lock().len()
    }

    /// Start periodic evaluation of `portfolio`.
    ///
    /// Any previous schedule is stopped first. One evaluation runs before
    /// this returns; later ones follow every `interval` (the configured
    /// default when `None`). Needs a running tokio runtime.
    pub fn start_monitoring(&self, portfolio: Portfolio, interval: Option<Duration>) -> anyhow::Result<()> {
        let period = interval.unwrap_or(self.inner.config.interval);
        if period.is_zero() {
            anyhow::bail!("Monitoring interval must be greater than zero");
        }

        let _dispatch = self.inner.dispatch.lock();
        self.inner.stop_locked();

        let generation = self.inner.generation.load(Ordering::Acquire);
        let weak = Arc::downgrade(&self.inner);
        let task = ScheduledTask::every(period, move || {
            if let Some(inner) = weak.upgrade() {
                inner.tick(generation);
            }
        })?;

        info!(
            "Starting risk monitoring for {} with interval: {}ms",
            portfolio.address,
            period.as_millis()
        );

        {
            let mut state = self.inner.state.lock();
            state.portfolio = Some(portfolio);
            state.task = Some(task);
        }

        self.inner.evaluate_and_publish();
        Ok(())
    }

    /// Stop periodic evaluation. Safe to call when idle.
    ///
    /// Once this returns no handler is invoked by the stopped schedule.
    pub fn stop_monitoring(&self) {
        let _dispatch = self.inner.dispatch.lock();
        self.inner.stop_locked();
    }

    /// True while a schedule is active
    pub fn is_monitoring(&self) -> bool {
        self.inner
            .state
            .lock()
            .task
            .as_ref()
            .map_or(false, |task| task.is_active())
    }

    /// Replace the portfolio evaluated by the next tick
    pub fn update_portfolio(&self, portfolio: Portfolio) {
        debug!("Portfolio for {} refreshed ({} tokens)", portfolio.address, portfolio.token_count());
        self.inner.state.lock().portfolio = Some(portfolio);
    }

    /// Run one evaluation now and publish it; `None` when no portfolio is set
    pub fn evaluate_now(&self) -> Option<RiskUpdate> {
        self.inner.evaluate_and_publish()
    }

    /// Copy of the current alerts
    pub fn get_risk_alerts(&self) -> Vec<Alert> {
        self.inner.state.lock().alerts.clone()
    }

    /// Copy of the current metrics; `None` before the first evaluation
    pub fn get_risk_metrics(&self) -> Option<RiskMetrics> {
        self.inner.state.lock().metrics.clone()
    }

    /// Copy of the portfolio being monitored
    pub fn current_portfolio(&self) -> Option<Portfolio> {
        self.inner.state.lock().portfolio.clone()
    }

    /// Mark one alert as read and re-publish the snapshot.
    ///
    /// Returns whether the id belongs to a current alert. Handlers are
    /// notified once per call, even when nothing changed.
    pub fn mark_alert_as_read(&self, id: Uuid) -> bool {
        let _dispatch = self.inner.dispatch.lock();
        let (found, update) = {
            let mut state = self.inner.state.lock();
            let found = match state.alerts.iter_mut().find(|alert| alert.id == id) {
                Some(alert) => {
                    alert.is_read = true;
                    true
                }
                None => false,
            };
            (found, state.snapshot())
        };

        if let Some(update) = update {
            self.inner.publish(&update);
        }
        found
    }

    /// Mark every current alert as read and re-publish the snapshot
    pub fn mark_all_alerts_as_read(&self) {
        let _dispatch = self.inner.dispatch.lock();
        let update = {
            let mut state = self.inner.state.lock();
            for alert in state.alerts.iter_mut() {
                alert.is_read = true;
            }
            state.snapshot()
        };

        if let Some(update) = update {
            self.inner.publish(&update);
        }
    }
}

impl Default for RiskMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}
