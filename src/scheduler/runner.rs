//! Scheduler event loop.
//!
//! A single tokio task waits on the first of two stimuli: the reminder timer
//! and the user action channel. Firings run on a blocking worker, one at a
//! time, while the loop keeps draining actions:
//!
//! - `RemindNow` during a firing is deferred; any number of them collapse into
//!   one manual firing right after the current one completes.
//! - Open and reload actions during a firing are queued and handled in order
//!   once it completes.
//! - `Quit` is honoured immediately, abandoning an in-flight firing.
//!
//! The timer is re-armed from the moment a firing completes, so a slow firing
//! never causes a burst of catch-up reminders.

use crate::actions::{Action, ActionReceiver};
use crate::config::{AppConfig, ConfigStore};
use crate::platform::{self, FileOpener, Notifier};
use crate::scheduler::firing::{self, FiringOutcome, FiringReport, TriggerKind};
use crate::selector::Selector;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Delay before the first automatic reminder after launch.
pub const DEFAULT_STARTUP_DELAY: Duration = Duration::from_secs(60);

/// Lifecycle phase of the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting out the startup delay.
    Starting,
    /// Waiting for the timer or a user action.
    Idle,
    /// A reminder is being resolved and dispatched.
    Firing,
    /// The loop has stopped.
    ShuttingDown,
}

/// In-memory scheduler state. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleState {
    /// Current phase.
    pub phase: Phase,
    /// Whether the startup delay has elapsed.
    pub startup_elapsed: bool,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            phase: Phase::Starting,
            startup_elapsed: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Shutdown,
}

enum Stimulus {
    Timer,
    Action(Option<Action>),
}

/// Background reminder scheduler. Owns the live [`AppConfig`].
pub struct Scheduler {
    /// Live settings, replaced whole on reload.
    config: AppConfig,
    /// Where the config came from, for reload and open-config.
    store: ConfigStore,
    /// User actions.
    actions: ActionReceiver,
    notifier: Arc<dyn Notifier>,
    opener: Arc<dyn FileOpener>,
    /// Shared with the blocking firing worker; only one worker runs at a time.
    selector: Arc<Mutex<Selector>>,
    /// Optional channel receiving a report per completed firing.
    report_tx: Option<mpsc::UnboundedSender<FiringReport>>,
    startup_delay: Duration,
    state: ScheduleState,
}

impl Scheduler {
    /// Create a scheduler using the platform notifier and file opener.
    pub fn new(config: AppConfig, store: ConfigStore, actions: ActionReceiver) -> Self {
        Self {
            config,
            store,
            actions,
            notifier: platform::create_notifier(),
            opener: platform::create_opener(),
            selector: Arc::new(Mutex::new(Selector::from_entropy())),
            report_tx: None,
            startup_delay: DEFAULT_STARTUP_DELAY,
            state: ScheduleState::default(),
        }
    }

    /// Replace the notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Replace the file opener.
    pub fn with_opener(mut self, opener: Arc<dyn FileOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Replace the reminder selector.
    pub fn with_selector(mut self, selector: Selector) -> Self {
        self.selector = Arc::new(Mutex::new(selector));
        self
    }

    /// Override the delay before the first automatic reminder.
    pub fn with_startup_delay(mut self, delay: Duration) -> Self {
        self.startup_delay = delay;
        self
    }

    /// Publish a [`FiringReport`] for every completed firing.
    pub fn with_reports(mut self, report_tx: mpsc::UnboundedSender<FiringReport>) -> Self {
        self.report_tx = Some(report_tx);
        self
    }

    #[cfg(test)]
    fn config(&self) -> &AppConfig {
        &self.config
    }

    #[cfg(test)]
    fn state(&self) -> ScheduleState {
        self.state
    }

    /// Spawn [`run`](Self::run) on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Run the event loop until [`Action::Quit`] arrives or every action
    /// sender is dropped.
    pub async fn run(mut self) {
        info!(
            reminders = %self.config.reminders_path.display(),
            period = ?self.config.reminder_period,
            startup_delay = ?self.startup_delay,
            "scheduler started"
        );

        let mut deadline = Instant::now() + self.startup_delay;

        loop {
            let stimulus = tokio::select! {
                action = self.actions.recv() => Stimulus::Action(action),
                () = tokio::time::sleep_until(deadline) => Stimulus::Timer,
            };

            let control = match stimulus {
                Stimulus::Timer => {
                    if !self.state.startup_elapsed {
                        debug!("startup delay elapsed");
                        self.state.startup_elapsed = true;
                    }
                    self.fire(TriggerKind::Scheduled, &mut deadline).await
                }
                Stimulus::Action(Some(action)) => self.handle_action(action, &mut deadline).await,
                Stimulus::Action(None) => {
                    info!("all action sources closed");
                    Control::Shutdown
                }
            };

            if control == Control::Shutdown {
                break;
            }
        }

        self.state.phase = Phase::ShuttingDown;
        info!("scheduler stopped");
    }

    async fn handle_action(&mut self, action: Action, deadline: &mut Instant) -> Control {
        match action {
            Action::RemindNow => {
                info!("reminder requested");
                self.fire(TriggerKind::Manual, deadline).await
            }
            Action::Quit => {
                info!("quit requested");
                Control::Shutdown
            }
            Action::OpenRemindersFile | Action::OpenConfigFile | Action::ReloadConfig => {
                self.handle_passive(action, deadline);
                Control::Continue
            }
        }
    }

    /// Actions that never start a firing.
    fn handle_passive(&mut self, action: Action, deadline: &mut Instant) {
        match action {
            Action::OpenRemindersFile => {
                let path = self.config.reminders_path.clone();
                self.open(&path);
            }
            Action::OpenConfigFile => {
                let path = self.store.config_path();
                self.open(&path);
            }
            Action::ReloadConfig => self.reload_config(deadline),
            Action::RemindNow | Action::Quit => {
                debug!(%action, "not a passive action; ignoring");
            }
        }
    }

    /// Run one firing, then any manual firing requested while it ran.
    async fn fire(&mut self, trigger: TriggerKind, deadline: &mut Instant) -> Control {
        let mut trigger = trigger;

        loop {
            self.state.phase = Phase::Firing;
            let mut deferred = VecDeque::new();
            let mut manual_requested = false;

            let started_at = Instant::now();
            let mut job = self.spawn_firing();

            let joined = loop {
                let action = tokio::select! {
                    joined = &mut job => break joined,
                    action = self.actions.recv() => action,
                };

                match action {
                    Some(Action::RemindNow) => {
                        debug!("reminder requested mid-firing; deferring");
                        manual_requested = true;
                    }
                    Some(Action::Quit) | None => {
                        info!(%trigger, "shutting down; abandoning in-flight reminder");
                        return Control::Shutdown;
                    }
                    Some(other) => deferred.push_back(other),
                }
            };

            let outcome = joined.unwrap_or_else(|e| FiringOutcome::Skipped {
                reason: format!("firing worker failed: {e}"),
            });
            let finished_at = Instant::now();

            self.rearm(trigger, finished_at, deadline);
            self.state.phase = self.rest_phase();
            self.report(FiringReport {
                trigger,
                outcome,
                started_at,
                finished_at,
            });

            for action in deferred {
                self.handle_passive(action, deadline);
            }

            if !manual_requested {
                return Control::Continue;
            }
            trigger = TriggerKind::Manual;
        }
    }

    fn spawn_firing(&self) -> JoinHandle<FiringOutcome> {
        let path = self.config.reminders_path.clone();
        let selector = Arc::clone(&self.selector);
        let notifier = Arc::clone(&self.notifier);
        tokio::task::spawn_blocking(move || firing::fire_once(&path, &selector, notifier.as_ref()))
    }

    /// Push the timer deadline so it is never in the past when the loop
    /// goes back to waiting.
    fn rearm(&self, trigger: TriggerKind, finished_at: Instant, deadline: &mut Instant) {
        let next = finished_at + self.config.reminder_period;
        match trigger {
            TriggerKind::Scheduled => *deadline = next,
            TriggerKind::Manual if *deadline <= finished_at => *deadline = next,
            TriggerKind::Manual => {}
        }
    }

    fn rest_phase(&self) -> Phase {
        if self.state.startup_elapsed {
            Phase::Idle
        } else {
            Phase::Starting
        }
    }

    fn report(&self, report: FiringReport) {
        let trigger = report.trigger;
        let elapsed = report.finished_at.saturating_duration_since(report.started_at);
        match &report.outcome {
            FiringOutcome::Delivered { reminder } => {
                info!(%trigger, ?elapsed, "showing reminder: {reminder}");
            }
            FiringOutcome::Skipped { reason } => {
                warn!(%trigger, "no reminder shown: {reason}");
            }
            FiringOutcome::NotifyFailed { reminder, error } => {
                warn!(%trigger, reminder = %reminder, "failed to send reminder: {error}");
            }
        }

        if let Some(tx) = &self.report_tx {
            if tx.send(report).is_err() {
                debug!("firing report channel closed");
            }
        }
    }

    fn open(&self, path: &Path) {
        info!(path = %path.display(), "opening file");
        if let Err(e) = self.opener.open(path) {
            warn!(path = %path.display(), "cannot open file: {e:#}");
        }
    }

    /// Replace the live config with the persisted one, keeping the current
    /// value when the file cannot be loaded.
    ///
    /// A shorter period pulls the pending deadline in to one new period from
    /// now; a longer one applies after the next firing.
    fn reload_config(&mut self, deadline: &mut Instant) {
        match self.store.load() {
            Ok(config) => {
                info!(
                    reminders = %config.reminders_path.display(),
                    period = ?config.reminder_period,
                    "config reloaded"
                );
                if config.reminder_period < self.config.reminder_period {
                    let sooner = Instant::now() + config.reminder_period;
                    if sooner < *deadline {
                        debug!(
                            period = ?config.reminder_period,
                            "period shortened; re-arming timer"
                        );
                        *deadline = sooner;
                    }
                }
                self.config = config;
            }
            Err(e) => warn!("config reload failed, keeping current settings: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::actions::{ActionSender, action_channel};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingNotifier {
        calls: AtomicUsize,
    }

    impl Notifier for CountingNotifier {
        fn notify(&self, _title: &str, _body: &str) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<PathBuf>>,
        fail: bool,
    }

    impl FileOpener for RecordingOpener {
        fn open(&self, path: &Path) -> anyhow::Result<()> {
            self.opened.lock().unwrap().push(path.to_path_buf());
            if self.fail {
                anyhow::bail!("no default application");
            }
            Ok(())
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        store: ConfigStore,
        config: AppConfig,
        notifier: Arc<CountingNotifier>,
        opener: Arc<RecordingOpener>,
    }

    fn harness(reminders: &str, period: Duration) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path());
        let mut config = store.bootstrap();
        config.reminder_period = period;
        store.save(&config).unwrap();
        std::fs::write(&config.reminders_path, reminders).unwrap();
        Harness {
            _dir: dir,
            store,
            config,
            notifier: Arc::new(CountingNotifier::default()),
            opener: Arc::new(RecordingOpener::default()),
        }
    }

    fn scheduler(h: &Harness) -> (Scheduler, ActionSender) {
        let (tx, rx) = action_channel();
        let scheduler = Scheduler::new(h.config.clone(), h.store.clone(), rx)
            .with_notifier(h.notifier.clone())
            .with_opener(h.opener.clone())
            .with_selector(Selector::with_seed(11))
            .with_startup_delay(Duration::from_secs(3600));
        (scheduler, tx)
    }

    #[test]
    fn new_scheduler_starts_in_starting_phase() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (scheduler, _tx) = scheduler(&h);
        assert_eq!(scheduler.state(), ScheduleState::default());
        assert_eq!(scheduler.state().phase, Phase::Starting);
        assert_eq!(scheduler.config(), &h.config);
    }

    #[tokio::test]
    async fn manual_firing_returns_to_rest_phase_and_keeps_deadline() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        let armed = Instant::now() + Duration::from_secs(30);
        let mut deadline = armed;

        let control = scheduler.fire(TriggerKind::Manual, &mut deadline).await;

        assert_eq!(control, Control::Continue);
        assert_eq!(scheduler.state().phase, Phase::Starting);
        assert_eq!(deadline, armed);
        assert_eq!(h.notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn scheduled_firing_rearms_from_completion() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        scheduler.state.startup_elapsed = true;
        let before = Instant::now();
        let mut deadline = before;

        scheduler.fire(TriggerKind::Scheduled, &mut deadline).await;

        assert!(deadline >= before + Duration::from_secs(60));
        assert_eq!(scheduler.state().phase, Phase::Idle);
    }

    #[tokio::test]
    async fn manual_firing_past_deadline_rearms() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        let stale = Instant::now();
        let mut deadline = stale;

        scheduler.fire(TriggerKind::Manual, &mut deadline).await;

        assert!(deadline >= stale + Duration::from_secs(60));
    }

    #[tokio::test]
    async fn unreadable_source_does_not_stop_the_loop() {
        let h = harness("", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        let mut deadline = Instant::now();

        let control = scheduler.fire(TriggerKind::Scheduled, &mut deadline).await;

        assert_eq!(control, Control::Continue);
        assert_eq!(h.notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn open_actions_use_current_paths() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);

        let mut deadline = Instant::now();
        scheduler.handle_passive(Action::OpenRemindersFile, &mut deadline);
        scheduler.handle_passive(Action::OpenConfigFile, &mut deadline);

        let opened = h.opener.opened.lock().unwrap();
        assert_eq!(
            *opened,
            vec![h.config.reminders_path.clone(), h.store.config_path()]
        );
    }

    #[test]
    fn opener_failure_is_not_fatal() {
        let mut h = harness("stretch\n", Duration::from_secs(60));
        h.opener = Arc::new(RecordingOpener {
            fail: true,
            ..Default::default()
        });
        let (mut scheduler, _tx) = scheduler(&h);

        scheduler.handle_passive(Action::OpenRemindersFile, &mut Instant::now());

        assert_eq!(h.opener.opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn reload_replaces_whole_config() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        let updated = AppConfig {
            reminders_path: h.store.app_dir().join("other.txt"),
            reminder_period: Duration::from_secs(5 * 60),
        };
        h.store.save(&updated).unwrap();

        scheduler.handle_passive(Action::ReloadConfig, &mut Instant::now());

        assert_eq!(scheduler.config(), &updated);
    }

    #[test]
    fn shorter_period_on_reload_pulls_deadline_in() {
        let h = harness("stretch\n", Duration::from_secs(60 * 60));
        let (mut scheduler, _tx) = scheduler(&h);
        let before = Instant::now();
        let mut deadline = before + Duration::from_secs(60 * 60);
        let updated = AppConfig {
            reminder_period: Duration::from_secs(5 * 60),
            ..h.config.clone()
        };
        h.store.save(&updated).unwrap();

        scheduler.handle_passive(Action::ReloadConfig, &mut deadline);

        assert!(deadline >= before + Duration::from_secs(5 * 60));
        assert!(deadline <= Instant::now() + Duration::from_secs(5 * 60));
    }

    #[test]
    fn longer_period_on_reload_keeps_pending_deadline() {
        let h = harness("stretch\n", Duration::from_secs(5 * 60));
        let (mut scheduler, _tx) = scheduler(&h);
        let armed = Instant::now() + Duration::from_secs(5 * 60);
        let mut deadline = armed;
        let updated = AppConfig {
            reminder_period: Duration::from_secs(60 * 60),
            ..h.config.clone()
        };
        h.store.save(&updated).unwrap();

        scheduler.handle_passive(Action::ReloadConfig, &mut deadline);

        assert_eq!(deadline, armed);
        assert_eq!(scheduler.config(), &updated);
    }

    #[test]
    fn shorter_period_never_pushes_a_nearer_deadline_out() {
        let h = harness("stretch\n", Duration::from_secs(60 * 60));
        let (mut scheduler, _tx) = scheduler(&h);
        let armed = Instant::now() + Duration::from_secs(10);
        let mut deadline = armed;
        let updated = AppConfig {
            reminder_period: Duration::from_secs(5 * 60),
            ..h.config.clone()
        };
        h.store.save(&updated).unwrap();

        scheduler.handle_passive(Action::ReloadConfig, &mut deadline);

        assert_eq!(deadline, armed);
    }

    #[test]
    fn failed_reload_keeps_current_config() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (mut scheduler, _tx) = scheduler(&h);
        std::fs::write(h.store.config_path(), "{ not json").unwrap();

        let armed = Instant::now() + Duration::from_secs(30);
        let mut deadline = armed;

        scheduler.handle_passive(Action::ReloadConfig, &mut deadline);

        assert_eq!(scheduler.config(), &h.config);
        assert_eq!(deadline, armed);
    }

    #[tokio::test]
    async fn quit_during_startup_delay_stops_promptly() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (scheduler, tx) = scheduler(&h);
        let handle = scheduler.spawn();

        tx.send(Action::Quit).unwrap();

        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(joined.is_ok(), "scheduler should stop after quit");
        assert_eq!(h.notifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_every_sender_stops_the_loop() {
        let h = harness("stretch\n", Duration::from_secs(60));
        let (scheduler, tx) = scheduler(&h);
        let handle = scheduler.spawn();

        drop(tx);

        let joined = tokio::time::timeout(Duration::from_secs(2), handle).await;
        assert!(joined.is_ok(), "scheduler should stop when senders are gone");
    }

    #[tokio::test]
    async fn reminders_file_is_reread_on_each_firing() {
        let h = harness("first version\n", Duration::from_secs(60));
        let (tx, rx) = action_channel();
        let (report_tx, mut reports) = mpsc::unbounded_channel();
        let scheduler = Scheduler::new(h.config.clone(), h.store.clone(), rx)
            .with_notifier(h.notifier.clone())
            .with_opener(h.opener.clone())
            .with_startup_delay(Duration::from_secs(3600))
            .with_reports(report_tx);
        let handle = scheduler.spawn();

        tx.send(Action::RemindNow).unwrap();
        let first = reports.recv().await.expect("first report");
        std::fs::write(&h.config.reminders_path, "second version\n").unwrap();
        tx.send(Action::RemindNow).unwrap();
        let second = reports.recv().await.expect("second report");

        assert_eq!(first.outcome.reminder(), Some("first version"));
        assert_eq!(second.outcome.reminder(), Some("second version"));
        assert_eq!(second.trigger, TriggerKind::Manual);

        tx.send(Action::Quit).unwrap();
        let _ = tokio::time::timeout(Duration::from_secs(2), handle).await;
    }
}
