//! Scheduling session.
//!
//! Owns the mediator (and through it the grid), the renderer and the last
//! derived metrics. Every terminal drag transition triggers a full
//! recomputation; server writes are spawned and never awaited by the
//! session itself.

mod context;
mod script;

pub use context::*;
pub use script::*;

use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::availability::AvailabilityStore;
use crate::calculate::{compute_metrics, ScheduleMetrics};
use crate::config::AppConfig;
use crate::grid::{AssignmentGrid, CellRef, GridError};
use crate::mediator::{ActiveDrag, Container, DragDropMediator, DragEnd, MediatorError, PlayerChip};
use crate::models::{CaptainUpdate, FlightId, PlayerId, Roster};
use crate::render::{Paint, Renderer, ScheduleView};
use crate::sync::{dispatch, SyncGateway};

/// Errors surfaced to callers of the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Mediator(#[from] MediatorError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Result of a terminal drag transition.
#[derive(Debug)]
pub struct DropReport {
    pub end: DragEnd,

    /// Handle of the spawned server write, if the drop produced one
    pub delivery: Option<JoinHandle<()>>,
}

impl DropReport {
    /// Wait for the server write to finish. Failures were already logged.
    pub async fn delivered(self) -> DragEnd {
        if let Some(handle) = self.delivery {
            if let Err(e) = handle.await {
                warn!("Sync task did not complete: {}", e);
            }
        }
        self.end
    }
}

/// One flight's interactive scheduling state.
pub struct SchedulingSession {
    mediator: DragDropMediator,
    renderer: Renderer,
    metrics: ScheduleMetrics,
    view: ScheduleView,
    config: AppConfig,
    gateway: Arc<dyn SyncGateway>,
}

impl SchedulingSession {
    /// Fetch the flight's events and every player's availability, then build
    /// the session. Network failures are logged and leave the affected data
    /// empty.
    pub async fn load(
        gateway: Arc<dyn SyncGateway>,
        flight: FlightId,
        roster: Roster,
        config: AppConfig,
    ) -> Self {
        let events = match gateway.fetch_events(flight).await {
            Ok(events) => events,
            Err(e) => {
                error!("Could not load events for flight {}: {}", flight, e);
                Vec::new()
            }
        };

        let availability =
            AvailabilityStore::load(gateway.clone(), flight, &roster.player_ids()).await;

        let mut context = SessionContext::new(flight, roster, availability, config.league);
        context.grid.load_events(&events);
        info!(
            "Session for flight {} loaded with {} events",
            flight,
            events.len()
        );

        Self::from_context(context, config, gateway)
    }

    /// Build a session around an already populated context.
    pub fn from_context(
        context: SessionContext,
        config: AppConfig,
        gateway: Arc<dyn SyncGateway>,
    ) -> Self {
        let mut session = Self {
            mediator: DragDropMediator::new(context),
            renderer: Renderer::new(),
            metrics: ScheduleMetrics::default(),
            view: ScheduleView::default(),
            config,
            gateway,
        };
        session.recompute();
        session
    }

    pub fn context(&self) -> &SessionContext {
        self.mediator.context()
    }

    pub fn grid(&self) -> &AssignmentGrid {
        self.mediator.grid()
    }

    pub fn metrics(&self) -> &ScheduleMetrics {
        &self.metrics
    }

    pub fn view(&self) -> &ScheduleView {
        &self.view
    }

    pub fn paint(&self) -> &Paint {
        self.renderer.paint()
    }

    pub fn is_dragging(&self) -> bool {
        self.mediator.is_dragging()
    }

    /// Start dragging a player chip and paint the grid with its availability.
    pub fn pick_up(
        &mut self,
        player: PlayerId,
        origin: Container,
    ) -> Result<ActiveDrag, SessionError> {
        let drag = self.mediator.pick_up(&PlayerChip::new(player), origin)?;
        self.renderer.clear_origin();

        let context = self.mediator.context();
        self.renderer
            .highlight_availability(&context.grid, &context.availability, player);
        self.renderer.mark_origin(Some(player));
        Ok(drag)
    }

    /// Release the dragged chip over a container.
    pub fn release(&mut self, over: Container) -> Result<DropReport, SessionError> {
        let end = self.mediator.release(over)?;
        Ok(self.finish(end))
    }

    /// Abandon the current drag.
    pub fn cancel(&mut self) -> Result<DropReport, SessionError> {
        let end = self.mediator.cancel()?;
        Ok(self.finish(end))
    }

    fn finish(&mut self, end: DragEnd) -> DropReport {
        self.renderer.reset_cell_colors();
        self.recompute();

        let delivery = match &end {
            DragEnd::Dropped(outcome) => outcome
                .sync
                .clone()
                .map(|request| dispatch(self.gateway.clone(), request)),
            DragEnd::Cancelled => None,
        };

        DropReport { end, delivery }
    }

    /// Ask the server to change a cell's captain and mirror it locally on
    /// success. Returns whether the captain changed.
    pub async fn set_captain(
        &mut self,
        cell: CellRef,
        player: PlayerId,
    ) -> Result<bool, SessionError> {
        if !self.grid().cell(cell)?.contains(player) {
            warn!("Player {} is not assigned to {}; captain unchanged", player, cell);
            return Ok(false);
        }

        let update = CaptainUpdate {
            court: cell.court,
            captain: player,
        };

        match self.gateway.update_captain(cell.timeslot, &update).await {
            Ok(status) if status.is_success() => {
                let applied = self.mediator.apply_captain(cell, player)?;
                self.recompute();
                Ok(applied)
            }
            Ok(status) => {
                warn!(
                    "Server refused captain {} for {}: status '{}'",
                    player, cell, status.status
                );
                Ok(false)
            }
            Err(e) => {
                warn!("Captain update for {} failed: {}", cell, e);
                Ok(false)
            }
        }
    }

    /// Rebuild metrics and the rendered view from the grid.
    pub fn recompute(&mut self) -> &ScheduleView {
        let context = self.mediator.context();
        let players = context.roster.player_ids();
        self.metrics = compute_metrics(
            &context.grid,
            &context.availability,
            &players,
            &self.config.league,
        );
        self.view = self
            .renderer
            .refresh(&context.grid, &context.roster, &self.metrics, &self.config);
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mediator::{Disposition, Rejection};
    use crate::models::{
        Availability, AvailabilityRecord, Court, CourtId, Event, EventPayload, Player, TimeSlot,
        TimeSlotId,
    };
    use crate::render::{Highlight, GREEN, WARNING};
    use crate::sync::{RecordedCall, RecordingGateway};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn roster() -> Roster {
        let day = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        Roster {
            players: (1..=6)
                .map(|id| Player {
                    id: PlayerId(id),
                    display_name: format!("P{}", id),
                    full_name: format!("Player {}", id),
                })
                .collect(),
            timeslots: (1..=2)
                .map(|id| TimeSlot {
                    id: TimeSlotId(id),
                    start: day.and_hms_opt(8 + id as u32, 0, 0).unwrap(),
                })
                .collect(),
            courts: vec![Court::new(CourtId(1)), Court::new(CourtId(2))],
        }
    }

    fn cell(court: i64, slot: i64) -> CellRef {
        CellRef::new(CourtId(court), TimeSlotId(slot))
    }

    fn ids(raw: &[i64]) -> Vec<PlayerId> {
        raw.iter().copied().map(PlayerId).collect()
    }

    fn full_event() -> Event {
        Event {
            court: CourtId(1),
            timeslot: TimeSlotId(1),
            players: ids(&[1, 2, 3, 4]),
            captain: Some(PlayerId(1)),
        }
    }

    async fn session(gateway: RecordingGateway) -> (SchedulingSession, Arc<RecordingGateway>) {
        let gateway = Arc::new(gateway);
        let session =
            SchedulingSession::load(gateway.clone(), FlightId(1), roster(), AppConfig::default())
                .await;
        (session, gateway)
    }

    async fn drag(
        s: &mut SchedulingSession,
        player: i64,
        from: Container,
        to: Container,
    ) -> DragEnd {
        s.pick_up(PlayerId(player), from).unwrap();
        s.release(to).unwrap().delivered().await
    }

    #[tokio::test]
    async fn test_load_populates_grid_and_metrics() {
        let (s, _) = session(RecordingGateway::default().with_events(vec![full_event()])).await;

        assert_eq!(s.grid().count_at(cell(1, 1)).unwrap(), 4);
        assert_eq!(s.metrics().player(PlayerId(1)).unwrap().captain_count, 1);
        assert_eq!(s.metrics().player(PlayerId(5)).unwrap().game_count, 0);
        assert!(s.view().warnings.is_empty());
    }

    #[tokio::test]
    async fn test_completing_a_cell_sends_one_creation() {
        let (mut s, gateway) = session(RecordingGateway::default()).await;

        for p in 1..=3 {
            drag(&mut s, p, Container::Roster, Container::Cell(cell(2, 2))).await;
        }
        assert!(gateway.calls().is_empty());
        assert_eq!(s.view().warnings, vec![cell(2, 2)]);

        drag(&mut s, 4, Container::Roster, Container::Cell(cell(2, 2))).await;
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Create(EventPayload {
                court: CourtId(2),
                timeslot: TimeSlotId(2),
                players: ids(&[1, 2, 3, 4]),
            })]
        );
        assert!(s.view().warnings.is_empty());

        let end = drag(&mut s, 5, Container::Roster, Container::Cell(cell(2, 2))).await;
        assert!(matches!(
            end,
            DragEnd::Dropped(ref o) if o.disposition == Disposition::Rejected(Rejection::CellFull)
        ));
        assert_eq!(s.grid().count_at(cell(2, 2)).unwrap(), 4);
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_moving_out_sends_one_deletion_with_original_players() {
        let (mut s, gateway) = session(RecordingGateway::default().with_events(vec![full_event()])).await;

        drag(&mut s, 3, Container::Cell(cell(1, 1)), Container::Cell(cell(2, 1))).await;

        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Delete(EventPayload {
                court: CourtId(1),
                timeslot: TimeSlotId(1),
                players: ids(&[1, 2, 3, 4]),
            })]
        );
        assert_eq!(s.metrics().player(PlayerId(3)).unwrap().game_count, 1);
        assert_eq!(s.view().warnings, vec![cell(1, 1), cell(2, 1)]);
    }

    #[tokio::test]
    async fn test_drop_clears_highlights_and_shows_count_warning() {
        let gateway = RecordingGateway::default().with_availability(
            PlayerId(1),
            vec![AvailabilityRecord::new(TimeSlotId(1), Availability::Available)],
        );
        let (mut s, _) = session(gateway).await;

        s.pick_up(PlayerId(1), Container::Roster).unwrap();
        assert_eq!(s.paint().cell_color(cell(1, 1)), Some(GREEN));

        s.release(Container::Cell(cell(1, 1))).unwrap().delivered().await;
        assert!(s.paint().highlights.is_empty());
        assert_eq!(s.paint().cell_color(cell(1, 1)), Some(WARNING));
        assert_eq!(s.paint().cell_color(cell(2, 1)), None);
    }

    #[tokio::test]
    async fn test_move_completing_another_cell_sends_its_creation() {
        let (mut s, gateway) = session(RecordingGateway::default().with_events(vec![full_event()])).await;

        for p in 5..=6 {
            drag(&mut s, p, Container::Roster, Container::Cell(cell(2, 1))).await;
        }
        drag(&mut s, 3, Container::Roster, Container::Cell(cell(2, 1))).await;
        assert!(gateway.calls().is_empty());

        drag(&mut s, 4, Container::Cell(cell(1, 1)), Container::Cell(cell(2, 1))).await;
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Create(EventPayload {
                court: CourtId(2),
                timeslot: TimeSlotId(1),
                players: ids(&[5, 6, 3, 4]),
            })]
        );
        assert_eq!(s.view().warnings, vec![cell(1, 1)]);
    }

    #[tokio::test]
    async fn test_unavailable_player_is_removed_immediately() {
        let gateway = RecordingGateway::default().with_availability(
            PlayerId(6),
            vec![AvailabilityRecord::new(TimeSlotId(2), Availability::Unavailable)],
        );
        let (mut s, gateway) = session(gateway).await;

        s.pick_up(PlayerId(6), Container::Roster).unwrap();
        assert_eq!(s.paint().marker(cell(1, 2)), Some(Highlight::Unavailable));

        s.release(Container::Cell(cell(1, 2))).unwrap().delivered().await;
        assert!(s.grid().all_assignments_for_player(PlayerId(6)).is_empty());
        assert!(gateway.calls().is_empty());
        assert!(!s.is_dragging());
    }

    #[tokio::test]
    async fn test_failed_writes_keep_local_state() {
        let (mut s, gateway) =
            session(RecordingGateway::default().failing_writes()).await;

        for p in 1..=4 {
            drag(&mut s, p, Container::Roster, Container::Cell(cell(1, 2))).await;
        }

        assert_eq!(gateway.calls().len(), 1);
        assert_eq!(s.grid().count_at(cell(1, 2)).unwrap(), 4);
    }

    #[tokio::test]
    async fn test_set_captain() {
        let (mut s, gateway) = session(RecordingGateway::default().with_events(vec![full_event()])).await;

        assert!(!s.set_captain(cell(1, 1), PlayerId(5)).await.unwrap());
        assert!(gateway.calls().is_empty());

        assert!(s.set_captain(cell(1, 1), PlayerId(2)).await.unwrap());
        assert_eq!(s.grid().cell(cell(1, 1)).unwrap().captain(), Some(PlayerId(2)));
        assert_eq!(s.metrics().player(PlayerId(2)).unwrap().captain_count, 1);
        assert_eq!(s.view().captain_groups[0].selected, Some(PlayerId(2)));
        assert_eq!(
            gateway.calls(),
            vec![RecordedCall::Captain(
                TimeSlotId(1),
                CaptainUpdate {
                    court: CourtId(1),
                    captain: PlayerId(2)
                }
            )]
        );
    }

    #[tokio::test]
    async fn test_set_captain_refused_by_server() {
        let gateway = RecordingGateway::default()
            .with_events(vec![full_event()])
            .with_captain_status("error");
        let (mut s, _) = session(gateway).await;

        assert!(!s.set_captain(cell(1, 1), PlayerId(2)).await.unwrap());
        assert_eq!(s.grid().cell(cell(1, 1)).unwrap().captain(), Some(PlayerId(1)));
    }

    #[tokio::test]
    async fn test_cancel_leaves_grid_and_origin_mark() {
        let (mut s, _) = session(RecordingGateway::default()).await;

        s.pick_up(PlayerId(2), Container::Roster).unwrap();
        let report = s.cancel().unwrap();
        assert_eq!(report.end, DragEnd::Cancelled);
        assert!(report.delivery.is_none());
        assert!(s.grid().occupied_cells().next().is_none());
        assert_eq!(s.paint().origin, Some(PlayerId(2)));

        // The next pick-up replaces the stale origin mark
        s.pick_up(PlayerId(3), Container::Roster).unwrap();
        assert_eq!(s.paint().origin, Some(PlayerId(3)));
    }
}
