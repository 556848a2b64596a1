//! Tokio driver owning one showcase state machine.
//!
//! The same runtime backs the server's controller view and the standalone
//! viewer binary, so both play the identical reveal from the identical trigger.

use std::time::Duration;

use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval, sleep_until},
};
use tracing::{debug, info};

use crate::{
    services::overlay::{self, OverlayFrame, OverlayInput},
    state::{
        announcement::Announcement,
        ranking::{RankingItem, RankingSnapshot},
        state_machine::{
            ResetScope, ShowcaseEvent, ShowcaseMachine, ShowcaseSettings, ShowcaseSnapshot,
        },
    },
};

/// Frame cadence while the machine requests animation frames.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const EVENT_CAPACITY: usize = 64;
const IDLE_WAKE: Duration = Duration::from_secs(3600);

/// The runtime task has stopped and no longer accepts commands.
#[derive(Debug, Clone, Copy, Error)]
#[error("showcase runtime is no longer running")]
pub struct RuntimeClosed;

/// State published to observers after every change.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerSnapshot {
    /// Machine state.
    pub showcase: ShowcaseSnapshot,
    /// Overlay frame, absent while idle.
    pub overlay: Option<OverlayFrame>,
    /// Version of the ranking snapshot this viewer resolves winners from.
    pub ranking_version: u64,
    /// Number of entries in that ranking.
    pub ranking_len: usize,
}

enum ShowcaseCommand {
    Announce {
        announcement: Announcement,
        reply: oneshot::Sender<Vec<ShowcaseEvent>>,
    },
    ReplaceRanking(Vec<RankingItem>),
    Shutdown,
}

/// Cloneable handle to a running showcase.
#[derive(Clone)]
pub struct ShowcaseHandle {
    commands: mpsc::UnboundedSender<ShowcaseCommand>,
    snapshots: watch::Receiver<ViewerSnapshot>,
    events: broadcast::Sender<ShowcaseEvent>,
}

impl ShowcaseHandle {
    /// Spawn the runtime task on the current tokio runtime.
    pub fn spawn(settings: ShowcaseSettings) -> (Self, JoinHandle<()>) {
        let machine = ShowcaseMachine::new(settings);
        let ranking = RankingSnapshot::default();
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (snapshots_tx, snapshots_rx) = watch::channel(snapshot_of(&machine, &ranking));
        let (events_tx, _events_rx) = broadcast::channel(EVENT_CAPACITY);

        let runtime = ShowcaseRuntime {
            machine,
            ranking,
            origin: Instant::now(),
            snapshots: snapshots_tx,
            events: events_tx.clone(),
        };
        let task = tokio::spawn(runtime.run(commands_rx));

        (
            Self {
                commands: commands_tx,
                snapshots: snapshots_rx,
                events: events_tx,
            },
            task,
        )
    }

    /// Apply an announcement and wait until it has been processed.
    pub async fn announce(
        &self,
        announcement: Announcement,
    ) -> Result<Vec<ShowcaseEvent>, RuntimeClosed> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(ShowcaseCommand::Announce {
                announcement,
                reply,
            })
            .map_err(|_| RuntimeClosed)?;
        response.await.map_err(|_| RuntimeClosed)
    }

    /// Replace the ranking snapshot winners are resolved from.
    pub fn replace_ranking(&self, ranking: Vec<RankingItem>) -> Result<(), RuntimeClosed> {
        self.commands
            .send(ShowcaseCommand::ReplaceRanking(ranking))
            .map_err(|_| RuntimeClosed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ViewerSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Watch channel receiving every published snapshot.
    pub fn watch(&self) -> watch::Receiver<ViewerSnapshot> {
        self.snapshots.clone()
    }

    /// Subscribe to machine events emitted from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<ShowcaseEvent> {
        self.events.subscribe()
    }

    /// Ask the runtime task to stop.
    pub fn shutdown(&self) {
        let _ = self.commands.send(ShowcaseCommand::Shutdown);
    }
}

struct ShowcaseRuntime {
    machine: ShowcaseMachine,
    ranking: RankingSnapshot,
    origin: Instant,
    snapshots: watch::Sender<ViewerSnapshot>,
    events: broadcast::Sender<ShowcaseEvent>,
}

impl ShowcaseRuntime {
    async fn run(mut self, mut commands: mpsc::UnboundedReceiver<ShowcaseCommand>) {
        let mut ticker = interval(FRAME_INTERVAL);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            let deadline = self.machine.next_deadline().map(|due| self.origin + due);
            let wake = deadline.unwrap_or_else(|| Instant::now() + IDLE_WAKE);
            let animating = self.machine.frame_requested();

            tokio::select! {
                command = commands.recv() => match command {
                    Some(ShowcaseCommand::Announce { announcement, reply }) => {
                        debug!(?announcement, "applying announcement");
                        let now = self.now();
                        let events = self.machine.apply(announcement, self.ranking.items(), now);
                        self.publish(&events);
                        let _ = reply.send(events);
                    }
                    Some(ShowcaseCommand::ReplaceRanking(items)) => {
                        self.ranking.replace(items);
                        debug!(version = self.ranking.version(), teams = self.ranking.items().len(), "ranking snapshot replaced");
                        self.publish(&[]);
                    }
                    Some(ShowcaseCommand::Shutdown) | None => break,
                },
                _ = sleep_until(wake), if deadline.is_some() => {
                    let now = self.now();
                    let events = self.machine.on_timers_due(now);
                    self.publish(&events);
                }
                _ = ticker.tick(), if animating => {
                    let now = self.now();
                    let events = self.machine.on_frame(now);
                    self.publish(&events);
                }
            }
        }

        self.machine.reset(ResetScope::Animation);
        info!("showcase runtime stopped");
    }

    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }

    fn publish(&self, events: &[ShowcaseEvent]) {
        self.snapshots
            .send_replace(snapshot_of(&self.machine, &self.ranking));
        for event in events {
            let _ = self.events.send(event.clone());
        }
    }
}

fn snapshot_of(machine: &ShowcaseMachine, ranking: &RankingSnapshot) -> ViewerSnapshot {
    let overlay = machine.session().map(|session| {
        overlay::project(&OverlayInput::from_session(
            session,
            machine.phase(),
            machine.rotation(),
        ))
    });
    ViewerSnapshot {
        showcase: machine.snapshot(),
        overlay,
        ranking_version: ranking.version(),
        ranking_len: ranking.items().len(),
    }
}
