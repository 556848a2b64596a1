use std::time::Duration;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    services::top_three::compute_top_three,
    state::{
        announcement::{Announcement, Place},
        ledger::RevealedWinnersLedger,
        ranking::RankingItem,
        theme::{PlaceTheme, PlaceThemes},
    },
};

/// Wall-clock length of the spinning carousel.
pub const CAROUSEL_DURATION: Duration = Duration::from_millis(4600);
/// Carousel speed right after the showcase starts (degrees per second).
pub const CAROUSEL_INITIAL_SPEED: f64 = 420.0;
/// Carousel speed reached at the end of the carousel phase (degrees per second).
pub const CAROUSEL_FINAL_SPEED: f64 = 40.0;
/// Shape of the speed decay curve.
pub const CAROUSEL_DECAY_EXPONENT: f64 = 2.2;
/// Time constant of the exponential easing used while aligning on the winner.
pub const ALIGN_SMOOTHING: Duration = Duration::from_millis(520);
/// Remaining distance (degrees) under which alignment snaps onto the target.
pub const ALIGN_SNAP_THRESHOLD: f64 = 0.6;
/// Dwell time of the spotlight phase.
pub const SPOTLIGHT_DWELL: Duration = Duration::from_millis(900);
/// Dwell time of the celebration phase.
pub const CELEBRATION_DWELL: Duration = Duration::from_millis(2600);
/// Upper bound on cards in the carousel (revealed teams and winners always fit).
pub const DEFAULT_MAX_PARTICIPANTS: usize = 12;

/// Phases of a single place reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ShowcasePhase {
    /// No showcase running.
    Idle,
    /// Participants spin with a decaying speed.
    Carousel,
    /// Rotation eases forward until the winner sits at the top.
    Align,
    /// Rotation frozen, winners highlighted.
    Spotlight,
    /// Fireworks before the place is marked as revealed.
    Celebration,
}

/// Identifier of one showcase run, unique per machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// Everything a running reveal needs. Rebuilt by every viewer from the
/// broadcast place and its own ranking snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseSession {
    /// Session identifier carried by its timers.
    pub id: SessionId,
    /// Place being revealed.
    pub place: Place,
    /// Teams holding the place.
    pub winners: Vec<RankingItem>,
    /// Cards on the orbit.
    pub participants: Vec<RankingItem>,
    /// Theme of the place.
    pub theme: PlaceTheme,
    /// Set once when entering the align phase.
    pub target_rotation: Option<f64>,
}

/// How much a reset forgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResetScope {
    /// Stop the current animation only; revealed places stay revealed.
    Animation,
    /// Stop everything and forget revealed places and teams.
    Full,
}

/// Observable effects of feeding the machine.
#[derive(Debug, Clone, PartialEq)]
pub enum ShowcaseEvent {
    /// The machine entered a new phase.
    PhaseChanged {
        /// Session driving the phase, `None` when back to idle.
        session: Option<SessionId>,
        /// Phase just entered.
        phase: ShowcasePhase,
    },
    /// A showcase completed its celebration and revealed its place.
    Finalized {
        /// Finished session.
        session: SessionId,
        /// Place it revealed.
        place: Place,
    },
    /// A place was revealed without animation (empty bucket or `reveal` action).
    RevealedDirectly {
        /// Revealed place.
        place: Place,
    },
    /// Timers and frames were cancelled.
    Reset {
        /// What the reset forgot.
        scope: ResetScope,
    },
}

/// Tunables that are read once at startup.
#[derive(Debug, Clone)]
pub struct ShowcaseSettings {
    /// Place themes after config overrides.
    pub themes: PlaceThemes,
    /// Upper bound of cards on the orbit.
    pub max_participants: usize,
}

impl Default for ShowcaseSettings {
    fn default() -> Self {
        Self {
            themes: PlaceThemes::default(),
            max_participants: DEFAULT_MAX_PARTICIPANTS,
        }
    }
}

/// Read-only view of the machine, cheap to clone and publish.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseSnapshot {
    /// Current phase.
    pub phase: ShowcasePhase,
    /// Orbit rotation in degrees.
    pub rotation: f64,
    /// Running session, if any.
    pub session: Option<ShowcaseSession>,
    /// Most recently revealed place.
    pub revealed_place: Option<Place>,
    /// Revealed teams in reveal order.
    pub revealed_teams: Vec<RankingItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerAction {
    EnterAlign,
    EnterCelebration,
    Finalize,
}

#[derive(Debug, Clone, Copy)]
struct ScheduledTimer {
    id: u64,
    session: SessionId,
    due: Duration,
    action: TimerAction,
}

#[derive(Debug, Clone, Copy)]
struct FrameRequest {
    last: Duration,
}

/// Per-viewer reveal state machine.
///
/// The machine does no I/O and reads no clock: drivers pass a monotonic `now`
/// into [`apply`](Self::apply), [`on_frame`](Self::on_frame) and
/// [`on_timers_due`](Self::on_timers_due), and use
/// [`next_deadline`](Self::next_deadline) / [`frame_requested`](Self::frame_requested)
/// to know when to call back. Every scheduled timer is tracked here so a
/// teardown can cancel all of them at once.
#[derive(Debug, Clone)]
pub struct ShowcaseMachine {
    settings: ShowcaseSettings,
    phase: ShowcasePhase,
    rotation: f64,
    session: Option<ShowcaseSession>,
    revealed_place: Option<Place>,
    ledger: RevealedWinnersLedger,
    timers: Vec<ScheduledTimer>,
    frame: Option<FrameRequest>,
    carousel_started: Duration,
    next_session_id: u64,
    next_timer_id: u64,
}

impl Default for ShowcaseMachine {
    fn default() -> Self {
        Self::new(ShowcaseSettings::default())
    }
}

impl ShowcaseMachine {
    /// Create an idle machine.
    pub fn new(settings: ShowcaseSettings) -> Self {
        Self {
            settings,
            phase: ShowcasePhase::Idle,
            rotation: 0.0,
            session: None,
            revealed_place: None,
            ledger: RevealedWinnersLedger::new(),
            timers: Vec::new(),
            frame: None,
            carousel_started: Duration::ZERO,
            next_session_id: 0,
            next_timer_id: 0,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> ShowcasePhase {
        self.phase
    }

    /// Orbit rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Running session, if any.
    pub fn session(&self) -> Option<&ShowcaseSession> {
        self.session.as_ref()
    }

    /// Most recently revealed place.
    pub fn revealed_place(&self) -> Option<Place> {
        self.revealed_place
    }

    /// Teams revealed so far.
    pub fn ledger(&self) -> &RevealedWinnersLedger {
        &self.ledger
    }

    /// Whether a showcase session is in flight.
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Whether the driver should deliver animation frames.
    pub fn frame_requested(&self) -> bool {
        self.frame.is_some()
    }

    /// Earliest pending timer deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Number of timers that are still pending.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Copy of the observable state.
    pub fn snapshot(&self) -> ShowcaseSnapshot {
        ShowcaseSnapshot {
            phase: self.phase,
            rotation: self.rotation,
            session: self.session.clone(),
            revealed_place: self.revealed_place,
            revealed_teams: self.ledger.iter().cloned().collect(),
        }
    }

    /// Apply an announcement using this viewer's own ranking snapshot.
    pub fn apply(
        &mut self,
        announcement: Announcement,
        ranking: &[RankingItem],
        now: Duration,
    ) -> Vec<ShowcaseEvent> {
        match announcement {
            Announcement::StartAnimation(place) => self.start(place, ranking, now),
            Announcement::Reveal(place) => self.reveal(place, ranking),
            Announcement::Reset => self.reset(ResetScope::Full),
        }
    }

    /// Start the showcase for `place`, tearing down any session in flight first.
    pub fn start(
        &mut self,
        place: Place,
        ranking: &[RankingItem],
        now: Duration,
    ) -> Vec<ShowcaseEvent> {
        let mut events = self.reset(ResetScope::Animation);

        let top_three = compute_top_three(ranking);
        let winners = top_three.bucket(place).to_vec();
        if winners.is_empty() {
            self.revealed_place = Some(place);
            events.push(ShowcaseEvent::RevealedDirectly { place });
            return events;
        }

        let participants = build_participants(
            &self.ledger,
            &winners,
            ranking,
            self.settings.max_participants,
        );
        let id = SessionId(self.next_session_id);
        self.next_session_id += 1;

        self.session = Some(ShowcaseSession {
            id,
            place,
            winners,
            participants,
            theme: self.settings.themes.get(place.number()).clone(),
            target_rotation: None,
        });
        self.revealed_place = None;
        self.rotation = 0.0;
        self.carousel_started = now;
        self.frame = Some(FrameRequest { last: now });
        self.phase = ShowcasePhase::Carousel;
        self.schedule(id, now + CAROUSEL_DURATION, TimerAction::EnterAlign);

        events.push(ShowcaseEvent::PhaseChanged {
            session: Some(id),
            phase: ShowcasePhase::Carousel,
        });
        events
    }

    /// Skip the animation and mark `place` as revealed.
    pub fn reveal(&mut self, place: Place, ranking: &[RankingItem]) -> Vec<ShowcaseEvent> {
        let mut events = self.reset(ResetScope::Animation);
        let top_three = compute_top_three(ranking);
        self.ledger.merge(top_three.bucket(place));
        self.revealed_place = Some(place);
        events.push(ShowcaseEvent::RevealedDirectly { place });
        events
    }

    /// Cancel every timer and the frame request and return to idle.
    ///
    /// Calling this while already idle changes nothing and reports nothing.
    pub fn reset(&mut self, scope: ResetScope) -> Vec<ShowcaseEvent> {
        let had_session = self.session.is_some();
        let clears_history =
            scope == ResetScope::Full && (self.revealed_place.is_some() || !self.ledger.is_empty());

        self.timers.clear();
        self.frame = None;
        self.rotation = 0.0;
        self.carousel_started = Duration::ZERO;
        self.session = None;
        self.phase = ShowcasePhase::Idle;
        if scope == ResetScope::Full {
            self.revealed_place = None;
            self.ledger.clear();
        }

        let mut events = Vec::new();
        if had_session {
            events.push(ShowcaseEvent::PhaseChanged {
                session: None,
                phase: ShowcasePhase::Idle,
            });
        }
        if had_session || clears_history {
            events.push(ShowcaseEvent::Reset { scope });
        }
        events
    }

    /// Animation frame callback. Ignored when no frame is requested.
    pub fn on_frame(&mut self, now: Duration) -> Vec<ShowcaseEvent> {
        let Some(frame) = self.frame.as_mut() else {
            return Vec::new();
        };
        let delta = now.saturating_sub(frame.last);
        frame.last = now;

        match self.phase {
            ShowcasePhase::Carousel => {
                let elapsed = now.saturating_sub(self.carousel_started);
                let progress = elapsed.as_secs_f64() / CAROUSEL_DURATION.as_secs_f64();
                self.rotation += carousel_speed(progress) * delta.as_secs_f64();
                Vec::new()
            }
            ShowcasePhase::Align => self.align_step(delta, now),
            _ => {
                self.frame = None;
                Vec::new()
            }
        }
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn on_timers_due(&mut self, now: Duration) -> Vec<ShowcaseEvent> {
        let mut events = Vec::new();
        while let Some(index) = self.earliest_due(now) {
            let timer = self.timers.remove(index);
            events.extend(self.fire(timer));
        }
        events
    }

    fn earliest_due(&self, now: Duration) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)
    }

    fn schedule(&mut self, session: SessionId, due: Duration, action: TimerAction) {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        self.timers.push(ScheduledTimer {
            id,
            session,
            due,
            action,
        });
    }

    fn fire(&mut self, timer: ScheduledTimer) -> Vec<ShowcaseEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };
        if session.id != timer.session {
            return Vec::new();
        }
        let id = session.id;

        match (timer.action, self.phase) {
            (TimerAction::EnterAlign, ShowcasePhase::Carousel) => {
                let target = session
                    .winners
                    .first()
                    .map(|winner| {
                        forward_rotation_target(&session.participants, winner, self.rotation)
                    })
                    .unwrap_or(self.rotation);
                session.target_rotation = Some(target);
                self.phase = ShowcasePhase::Align;
                if self.frame.is_none() {
                    self.frame = Some(FrameRequest { last: timer.due });
                }
                vec![ShowcaseEvent::PhaseChanged {
                    session: Some(id),
                    phase: ShowcasePhase::Align,
                }]
            }
            (TimerAction::EnterCelebration, ShowcasePhase::Spotlight) => {
                self.phase = ShowcasePhase::Celebration;
                self.schedule(id, timer.due + CELEBRATION_DWELL, TimerAction::Finalize);
                vec![ShowcaseEvent::PhaseChanged {
                    session: Some(id),
                    phase: ShowcasePhase::Celebration,
                }]
            }
            (TimerAction::Finalize, ShowcasePhase::Celebration) => self.finalize(),
            _ => Vec::new(),
        }
    }

    fn align_step(&mut self, delta: Duration, now: Duration) -> Vec<ShowcaseEvent> {
        let Some(session) = self.session.as_ref() else {
            self.frame = None;
            return Vec::new();
        };
        let id = session.id;
        let target = session.target_rotation.unwrap_or(self.rotation);

        let easing = (delta.as_secs_f64() / ALIGN_SMOOTHING.as_secs_f64()).min(1.0);
        self.rotation += (target - self.rotation) * easing;
        if (target - self.rotation).abs() > ALIGN_SNAP_THRESHOLD {
            return Vec::new();
        }

        self.rotation = target;
        self.frame = None;
        self.phase = ShowcasePhase::Spotlight;
        self.schedule(id, now + SPOTLIGHT_DWELL, TimerAction::EnterCelebration);
        vec![ShowcaseEvent::PhaseChanged {
            session: Some(id),
            phase: ShowcasePhase::Spotlight,
        }]
    }

    fn finalize(&mut self) -> Vec<ShowcaseEvent> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };

        if let Some(target) = session.target_rotation {
            self.rotation = target;
        }
        self.ledger.merge(&session.winners);
        self.revealed_place = Some(session.place);
        self.timers.clear();
        self.frame = None;
        self.phase = ShowcasePhase::Idle;

        vec![
            ShowcaseEvent::PhaseChanged {
                session: None,
                phase: ShowcasePhase::Idle,
            },
            ShowcaseEvent::Finalized {
                session: session.id,
                place: session.place,
            },
        ]
    }
}

/// Carousel speed (degrees per second) at `progress` in `[0, 1]`.
pub fn carousel_speed(progress: f64) -> f64 {
    let clamped = progress.clamp(0.0, 1.0);
    let decay = (1.0 - clamped).powf(CAROUSEL_DECAY_EXPONENT);
    CAROUSEL_FINAL_SPEED + (CAROUSEL_INITIAL_SPEED - CAROUSEL_FINAL_SPEED) * decay
}

/// Map any angle into `[0, 360)`.
pub fn normalize_angle(value: f64) -> f64 {
    let angle = value.rem_euclid(360.0);
    if angle >= 360.0 { 0.0 } else { angle }
}

/// Absolute carousel angle that brings `winner`'s card to the top position.
pub fn winner_angle(participants: &[RankingItem], winner: &RankingItem) -> f64 {
    if participants.is_empty() {
        return 0.0;
    }
    let Some(index) = participants
        .iter()
        .position(|team| team.team_id == winner.team_id)
    else {
        return 0.0;
    };
    let step = 360.0 / participants.len() as f64;
    normalize_angle(360.0 - step * index as f64)
}

/// Rotation to reach from `current` so the winner lands on top, always moving forward.
pub fn forward_rotation_target(
    participants: &[RankingItem],
    winner: &RankingItem,
    current: f64,
) -> f64 {
    let desired = winner_angle(participants, winner);
    let forward = (desired - normalize_angle(current) + 360.0) % 360.0;
    current + forward
}

/// Cards shown in the carousel: revealed teams first, then this place's
/// winners, then the rest of the ranking until the cap is reached.
pub fn build_participants(
    ledger: &RevealedWinnersLedger,
    winners: &[RankingItem],
    ranking: &[RankingItem],
    max_participants: usize,
) -> Vec<RankingItem> {
    let desired = ranking.len().min(max_participants);
    let mut pool = indexmap::IndexMap::new();
    for team in ledger.iter().chain(winners.iter()) {
        pool.insert(team.team_id.clone(), team.clone());
    }
    for team in ranking {
        if pool.len() >= desired {
            break;
        }
        pool.entry(team.team_id.clone())
            .or_insert_with(|| team.clone());
    }
    pool.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ranking::TeamId;

    const FRAME: Duration = Duration::from_millis(16);

    fn ranking(count: i64) -> Vec<RankingItem> {
        (1..=count)
            .map(|id| RankingItem::new(id, format!("Team {id}"), 10.0 - id as f64 * 0.5))
            .collect()
    }

    /// Deterministic stand-in for the browser event loop: 60 Hz-ish frames and
    /// exact timer deadlines.
    struct Driver {
        machine: ShowcaseMachine,
        ranking: Vec<RankingItem>,
        now: Duration,
        log: Vec<(Duration, ShowcaseEvent)>,
        frames_delivered: usize,
    }

    impl Driver {
        fn new(ranking: Vec<RankingItem>) -> Self {
            Self {
                machine: ShowcaseMachine::default(),
                ranking,
                now: Duration::ZERO,
                log: Vec::new(),
                frames_delivered: 0,
            }
        }

        fn announce(&mut self, announcement: Announcement) {
            let events = self.machine.apply(announcement, &self.ranking, self.now);
            self.record(events);
        }

        fn record(&mut self, events: Vec<ShowcaseEvent>) {
            let now = self.now;
            self.log.extend(events.into_iter().map(|event| (now, event)));
        }

        fn advance(&mut self, span: Duration) {
            let end = self.now + span;
            let mut next_frame = self.now + FRAME;
            loop {
                let frame_at = self.machine.frame_requested().then_some(next_frame);
                let timer_at = self.machine.next_deadline();
                let step = match (frame_at, timer_at) {
                    (Some(f), Some(t)) => f.min(t),
                    (Some(f), None) => f,
                    (None, Some(t)) => t,
                    (None, None) => break,
                };
                if step > end {
                    break;
                }
                self.now = step;
                if timer_at.is_some_and(|t| t <= step) {
                    let events = self.machine.on_timers_due(step);
                    self.record(events);
                }
                if frame_at == Some(step) && self.machine.frame_requested() {
                    self.frames_delivered += 1;
                    let events = self.machine.on_frame(step);
                    self.record(events);
                }
                if next_frame <= step {
                    next_frame = step + FRAME;
                }
            }
            self.now = end;
        }

        fn phases(&self) -> Vec<ShowcasePhase> {
            self.log
                .iter()
                .filter_map(|(_, event)| match event {
                    ShowcaseEvent::PhaseChanged { phase, .. } => Some(*phase),
                    _ => None,
                })
                .collect()
        }

        fn entered_at(&self, wanted: ShowcasePhase) -> Duration {
            self.log
                .iter()
                .find_map(|(at, event)| match event {
                    ShowcaseEvent::PhaseChanged { phase, .. } if *phase == wanted => Some(*at),
                    _ => None,
                })
                .unwrap_or_else(|| panic!("phase {wanted:?} never entered"))
        }

        fn finalized(&self) -> Vec<(SessionId, Place)> {
            self.log
                .iter()
                .filter_map(|(_, event)| match event {
                    ShowcaseEvent::Finalized { session, place } => Some((*session, *place)),
                    _ => None,
                })
                .collect()
        }
    }

    #[test]
    fn speed_decays_from_initial_to_final() {
        assert_eq!(carousel_speed(0.0), CAROUSEL_INITIAL_SPEED);
        assert_eq!(carousel_speed(1.0), CAROUSEL_FINAL_SPEED);
        assert_eq!(carousel_speed(3.0), CAROUSEL_FINAL_SPEED);
        assert!(carousel_speed(0.25) > carousel_speed(0.5));
    }

    #[test]
    fn alignment_target_only_moves_forward() {
        let participants = ranking(8);
        for winner_index in 0..participants.len() {
            let winner = &participants[winner_index];
            let desired = winner_angle(&participants, winner);
            for step in 0..90 {
                let current = step as f64 * 37.3 - 400.0;
                let target = forward_rotation_target(&participants, winner, current);
                assert!(target >= current, "target {target} behind {current}");
                assert!(target - current < 360.0);
                let landed = normalize_angle(target);
                let distance = (landed - desired).abs().min(360.0 - (landed - desired).abs());
                assert!(distance <= ALIGN_SNAP_THRESHOLD, "landed {landed}, wanted {desired}");
            }
        }
    }

    #[test]
    fn winner_angle_puts_card_on_top() {
        let participants = ranking(4);
        assert_eq!(winner_angle(&participants, &participants[0]), 0.0);
        assert_eq!(winner_angle(&participants, &participants[1]), 270.0);
        assert_eq!(winner_angle(&participants, &participants[3]), 90.0);
        let stranger = RankingItem::new(99, "Stranger", 1.0);
        assert_eq!(winner_angle(&participants, &stranger), 0.0);
        assert_eq!(winner_angle(&[], &stranger), 0.0);
    }

    #[test]
    fn participants_start_with_revealed_teams_and_winners() {
        let ranking = ranking(20);
        let mut ledger = RevealedWinnersLedger::new();
        ledger.merge([&ranking[2]]);
        let winners = vec![ranking[1].clone()];

        let pool = build_participants(&ledger, &winners, &ranking, 12);
        assert_eq!(pool.len(), 12);
        assert_eq!(pool[0].team_id, TeamId::Number(3));
        assert_eq!(pool[1].team_id, TeamId::Number(2));
        assert_eq!(pool[2].team_id, TeamId::Number(1));
        let unique: std::collections::HashSet<_> = pool.iter().map(|t| &t.team_id).collect();
        assert_eq!(unique.len(), pool.len());
    }

    #[test]
    fn participants_capped_by_ranking_size() {
        let ranking = ranking(3);
        let pool = build_participants(&RevealedWinnersLedger::new(), &ranking[..1], &ranking, 12);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn full_lifecycle_reveals_once() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::First));

        let session = driver.machine.session().expect("session started");
        assert_eq!(session.participants.len(), 8);
        assert_eq!(session.winners.len(), 1);
        assert_eq!(driver.machine.phase(), ShowcasePhase::Carousel);

        driver.advance(Duration::from_secs(30));

        assert_eq!(
            driver.phases(),
            vec![
                ShowcasePhase::Carousel,
                ShowcasePhase::Align,
                ShowcasePhase::Spotlight,
                ShowcasePhase::Celebration,
                ShowcasePhase::Idle,
            ]
        );
        assert_eq!(driver.entered_at(ShowcasePhase::Align), CAROUSEL_DURATION);
        let spotlight = driver.entered_at(ShowcasePhase::Spotlight);
        let celebration = driver.entered_at(ShowcasePhase::Celebration);
        assert_eq!(celebration, spotlight + SPOTLIGHT_DWELL);
        assert_eq!(driver.entered_at(ShowcasePhase::Idle), celebration + CELEBRATION_DWELL);

        assert_eq!(driver.finalized().len(), 1);
        assert_eq!(driver.machine.revealed_place(), Some(Place::First));
        assert!(driver.machine.ledger().contains(&TeamId::Number(1)));
        assert!(driver.machine.session().is_none());
        assert_eq!(driver.machine.pending_timers(), 0);
        assert!(!driver.machine.frame_requested());

        let participants = ranking(8);
        let landed = normalize_angle(driver.machine.rotation());
        let gap = (landed - winner_angle(&participants, &participants[0])).abs();
        assert!(gap.min(360.0 - gap) <= ALIGN_SNAP_THRESHOLD);
    }

    #[test]
    fn carousel_rotation_follows_the_speed_curve() {
        let mut driver = Driver::new(ranking(6));
        driver.announce(Announcement::StartAnimation(Place::Second));
        driver.advance(Duration::from_millis(4000));

        let t = 4.0;
        let total = CAROUSEL_DURATION.as_secs_f64();
        let exponent = CAROUSEL_DECAY_EXPONENT + 1.0;
        let expected = CAROUSEL_FINAL_SPEED * t
            + (CAROUSEL_INITIAL_SPEED - CAROUSEL_FINAL_SPEED) * total / exponent
                * (1.0 - (1.0 - t / total).powf(exponent));
        assert!(
            (driver.machine.rotation() - expected).abs() < 5.0,
            "rotation {} expected {expected}",
            driver.machine.rotation()
        );
    }

    #[test]
    fn slow_frames_do_not_extend_the_carousel() {
        let mut machine = ShowcaseMachine::default();
        let ranking = ranking(5);
        machine.apply(Announcement::StartAnimation(Place::Third), &ranking, Duration::ZERO);

        let events = machine.on_timers_due(CAROUSEL_DURATION);
        assert_eq!(machine.phase(), ShowcasePhase::Align);
        assert_eq!(events.len(), 1);
        assert!(machine.session().unwrap().target_rotation.is_some());
    }

    #[test]
    fn reset_mid_carousel_cancels_everything() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::First));
        driver.advance(Duration::from_millis(1500));
        assert!(driver.machine.rotation() > 0.0);

        driver.announce(Announcement::Reset);
        let logged = driver.log.len();
        let frames = driver.frames_delivered;

        driver.advance(Duration::from_secs(30));

        assert_eq!(driver.log.len(), logged, "nothing fires after reset");
        assert_eq!(driver.frames_delivered, frames);
        assert_eq!(driver.machine.phase(), ShowcasePhase::Idle);
        assert_eq!(driver.machine.revealed_place(), None);
        assert_eq!(driver.machine.rotation(), 0.0);
        assert_eq!(driver.machine.pending_timers(), 0);
        assert!(driver.finalized().is_empty());
    }

    #[test]
    fn reset_is_idempotent() {
        let mut machine = ShowcaseMachine::default();
        assert!(machine.reset(ResetScope::Full).is_empty());
        assert!(machine.reset(ResetScope::Animation).is_empty());
        assert_eq!(machine.phase(), ShowcasePhase::Idle);
    }

    #[test]
    fn animation_reset_keeps_history() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::Third));
        driver.advance(Duration::from_secs(30));
        assert_eq!(driver.machine.revealed_place(), Some(Place::Third));

        driver.machine.reset(ResetScope::Animation);
        assert_eq!(driver.machine.revealed_place(), Some(Place::Third));
        assert_eq!(driver.machine.ledger().len(), 1);

        driver.machine.reset(ResetScope::Full);
        assert_eq!(driver.machine.revealed_place(), None);
        assert!(driver.machine.ledger().is_empty());
    }

    #[test]
    fn second_start_replaces_the_first_session() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::Third));
        let first = driver.machine.session().unwrap().id;
        driver.advance(Duration::from_millis(2000));

        driver.announce(Announcement::StartAnimation(Place::Second));
        let second = driver.machine.session().unwrap().id;
        assert_ne!(first, second);
        assert_eq!(driver.machine.pending_timers(), 1);

        driver.advance(Duration::from_secs(30));

        assert_eq!(driver.finalized(), vec![(second, Place::Second)]);
        assert_eq!(driver.machine.revealed_place(), Some(Place::Second));
        assert!(driver.machine.ledger().contains(&TeamId::Number(2)));
        assert!(!driver.machine.ledger().contains(&TeamId::Number(3)));

        let first_session_events_after_restart = driver.log.iter().any(|(at, event)| {
            *at > Duration::from_millis(2000)
                && matches!(event, ShowcaseEvent::PhaseChanged { session: Some(id), .. } if *id == first)
        });
        assert!(!first_session_events_after_restart);
    }

    #[test]
    fn empty_bucket_reveals_without_animation() {
        let mut machine = ShowcaseMachine::default();
        let ranking = vec![RankingItem::new(1, "Solo", 4.0)];

        let events = machine.apply(Announcement::StartAnimation(Place::Second), &ranking, Duration::ZERO);

        assert_eq!(events, vec![ShowcaseEvent::RevealedDirectly { place: Place::Second }]);
        assert_eq!(machine.revealed_place(), Some(Place::Second));
        assert_eq!(machine.pending_timers(), 0);
        assert!(!machine.frame_requested());
        assert!(!machine.is_active());
    }

    #[test]
    fn reveal_action_skips_animation_and_fills_ledger() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::Third));
        driver.advance(Duration::from_millis(500));

        driver.announce(Announcement::Reveal(Place::Second));

        assert!(!driver.machine.is_active());
        assert_eq!(driver.machine.revealed_place(), Some(Place::Second));
        assert!(driver.machine.ledger().contains(&TeamId::Number(2)));
        driver.advance(Duration::from_secs(30));
        assert!(driver.finalized().is_empty());
    }

    #[test]
    fn frames_are_ignored_once_the_phase_stops_animating() {
        let mut driver = Driver::new(ranking(8));
        driver.announce(Announcement::StartAnimation(Place::First));
        driver.advance(Duration::from_secs(30));

        let rotation = driver.machine.rotation();
        assert!(driver.machine.on_frame(Duration::from_secs(40)).is_empty());
        assert_eq!(driver.machine.rotation(), rotation);
    }

    #[test]
    fn revealed_teams_join_the_next_carousel() {
        let mut driver = Driver::new(ranking(20));
        driver.announce(Announcement::StartAnimation(Place::Third));
        driver.advance(Duration::from_secs(30));
        driver.announce(Announcement::StartAnimation(Place::Second));

        let session = driver.machine.session().unwrap();
        assert_eq!(session.participants[0].team_id, TeamId::Number(3));
        assert_eq!(session.participants[1].team_id, TeamId::Number(2));
        assert_eq!(session.participants.len(), DEFAULT_MAX_PARTICIPANTS);
        assert_eq!(session.theme.label, "2nd Place");
    }
}
