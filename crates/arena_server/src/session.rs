//! One match between two connections.
//!
//! A [`Session`] owns the shared [`Board`], the marks dealt to each seat, and
//! the tasks working on its behalf: one listener per seat plus at most one
//! pending rematch. Every read-modify-write of the board happens under the
//! session's table lock, so two turns racing in from both seats are applied
//! one after the other and a finished game schedules exactly one rematch.

use crate::connection::{Connection, ConnectionId};
use crate::error::TransportError;
use crate::matchmaker::Matchmaker;
use crate::registry::Registry;
use arena_tictactoe::{Board, ClientMessage, Mark, ServerMessage, Turn};
use derive_more::Display;
use derive_new::new;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique session identity, used for logging.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
#[display("session-{}", _0)]
pub struct SessionId(u64);

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Phase {
    /// Created, marks not yet dealt.
    Starting,
    /// A game is in progress.
    Active,
    /// The game ended; a rematch is pending.
    Finished,
    /// Dealing the rematch.
    Restarting,
    /// A player left. Terminal.
    Stopped,
}

/// Services a session needs from the rest of the arena.
#[derive(Debug, Clone, new)]
pub struct SessionContext {
    pub(crate) registry: Registry,
    pub(crate) matchmaker: Matchmaker,
    pub(crate) rematch_delay: Duration,
}

#[derive(Debug)]
struct Table {
    board: Board,
    marks: [Mark; 2],
    phase: Phase,
}

/// Two seated connections playing on one shared board.
pub struct Session {
    id: SessionId,
    seats: [Connection; 2],
    table: Mutex<Table>,
    tasks: std::sync::Mutex<Vec<JoinHandle<()>>>,
    stopped: AtomicBool,
    context: SessionContext,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("seats", &[self.seats[0].id(), self.seats[1].id()])
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish()
    }
}

impl Session {
    /// Seats `first` and `second` at a new table. Nothing is sent until
    /// [`Session::start`].
    #[instrument(skip_all, fields(first = %first.id(), second = %second.id()))]
    pub fn new(first: Connection, second: Connection, context: SessionContext) -> Self {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        debug!(session_id = %id, "Creating session");
        Self {
            id,
            seats: [first, second],
            table: Mutex::new(Table {
                board: Board::random(),
                marks: [Mark::Empty, Mark::Empty],
                phase: Phase::Starting,
            }),
            tasks: std::sync::Mutex::new(Vec::new()),
            stopped: AtomicBool::new(false),
            context,
        }
    }

    /// Identity of this session.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Both seated connections.
    pub fn connections(&self) -> &[Connection; 2] {
        &self.seats
    }

    /// Current lifecycle phase.
    pub async fn phase(&self) -> Phase {
        self.table.lock().await.phase
    }

    /// Snapshot of the current board.
    pub async fn board(&self) -> Board {
        self.table.lock().await.board.clone()
    }

    /// Mark currently dealt to `id`, if it is seated here.
    pub async fn mark_of(&self, id: ConnectionId) -> Option<Mark> {
        let seat = self.seat_of(id)?;
        Some(self.table.lock().await.marks[seat])
    }

    /// True once [`Session::stop`] has run.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    fn seat_of(&self, id: ConnectionId) -> Option<usize> {
        self.seats.iter().position(|c| c.id() == id)
    }

    /// Deals the first game and starts listening to both players.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] naming the connection that could not be
    /// told about the new game. The caller should stop the session with it.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub async fn start(self: &Arc<Self>) -> Result<(), TransportError> {
        {
            let mut table = self.table.lock().await;
            if table.phase != Phase::Starting {
                debug!(phase = %table.phase, "Session already started");
                return Ok(());
            }
            self.deal(&mut table)?;
            table.phase = Phase::Active;
            info!(marks = ?table.marks, active = ?table.board.active_player(), "Game started");
        }

        for seat in 0..self.seats.len() {
            let session = Arc::clone(self);
            self.spawn_tracked(session.listen(seat));
        }
        Ok(())
    }

    /// Fresh board and freshly dealt marks, announced to both seats.
    fn deal(&self, table: &mut Table) -> Result<(), TransportError> {
        let first = Mark::random();
        table.marks = [first, first.change()];
        table.board = Board::random();
        for (connection, mark) in self.seats.iter().zip(table.marks) {
            connection.send(&ServerMessage::NewGame {
                desk: table.board.clone(),
                mark,
            })?;
        }
        Ok(())
    }

    /// Feeds one seat's inbound frames into the game, in arrival order.
    #[instrument(skip(self), fields(session_id = %self.id, connection_id = %self.seats[seat].id()))]
    async fn listen(self: Arc<Self>, seat: usize) {
        let connection = &self.seats[seat];
        debug!("Listening for turns");

        while let Some(frame) = connection.next_frame().await {
            match ClientMessage::from_json(&frame) {
                Ok(ClientMessage::Turn(turn)) => self.play(seat, turn).await,
                Err(e) => debug!(error = %e, "Dropping malformed frame"),
            }
        }

        info!("Inbound stream ended");
        self.spawn_stop(connection.id());
    }

    /// Applies `turn` from `seat` and tells the opponent if it was accepted.
    ///
    /// Turns under the other seat's mark and illegal turns are dropped without
    /// a reply.
    #[instrument(skip(self), fields(session_id = %self.id))]
    async fn play(self: &Arc<Self>, seat: usize, turn: Turn) {
        let mut table = self.table.lock().await;
        if table.phase == Phase::Stopped {
            return;
        }
        if turn.mark != table.marks[seat] {
            debug!(assigned = ?table.marks[seat], "Ignoring turn under the opponent's mark");
            return;
        }
        if !table.board.apply_turn(turn) {
            debug!("Illegal turn ignored");
            return;
        }

        let opponent = &self.seats[1 - seat];
        let change = ServerMessage::DeskChange {
            desk: table.board.clone(),
        };
        if let Err(e) = opponent.send(&change) {
            warn!(error = %e, "Could not deliver move to opponent");
            self.spawn_stop(e.connection);
            return;
        }

        if table.board.is_finished() && table.phase == Phase::Active {
            table.phase = Phase::Finished;
            info!(
                winner = ?table.board.winner(),
                draw = table.board.is_draw(),
                "Game over, rematch scheduled"
            );
            let session = Arc::clone(self);
            self.spawn_tracked(session.rematch());
        }
    }

    /// Waits out the rematch delay, then deals a new game.
    #[instrument(skip(self), fields(session_id = %self.id))]
    async fn rematch(self: Arc<Self>) {
        tokio::time::sleep(self.context.rematch_delay).await;

        let mut table = self.table.lock().await;
        if table.phase != Phase::Finished {
            return;
        }
        table.phase = Phase::Restarting;
        match self.deal(&mut table) {
            Ok(()) => {
                table.phase = Phase::Active;
                info!(marks = ?table.marks, "Rematch started");
            }
            Err(e) => {
                drop(table);
                warn!(error = %e, "Could not deal rematch");
                self.spawn_stop(e.connection);
            }
        }
    }

    /// Ends the session because `leaver` disconnected.
    ///
    /// Only the first call has any effect. Both seats leave the registry and
    /// every task is cancelled before the remaining player is told and put
    /// back in the queue. Never fails: if the remaining player is gone as
    /// well, that is only logged.
    #[instrument(skip(self), fields(session_id = %self.id, leaver = %leaver))]
    pub async fn stop(&self, leaver: ConnectionId) {
        let Some(leaving_seat) = self.seat_of(leaver) else {
            warn!("Stop requested by a connection not seated here");
            return;
        };
        if self.stopped.swap(true, Ordering::SeqCst) {
            debug!("Session already stopped");
            return;
        }

        for connection in &self.seats {
            self.context.registry.remove(connection.id());
        }
        let tasks: Vec<_> = self
            .tasks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for task in tasks {
            task.abort();
        }
        self.table.lock().await.phase = Phase::Stopped;

        let survivor = &self.seats[1 - leaving_seat];
        info!(survivor = %survivor.id(), "Session stopped");
        match survivor.send(&ServerMessage::Disconnect) {
            Ok(()) => self.context.matchmaker.enqueue(survivor.clone()),
            Err(e) => debug!(error = %e, "Remaining player is gone too"),
        }
    }

    /// Stops the session from a detached task, so a tracked task can trigger
    /// a stop without being cancelled halfway through it.
    fn spawn_stop(self: &Arc<Self>, leaver: ConnectionId) {
        let session = Arc::clone(self);
        tokio::spawn(async move { session.stop(leaver).await });
    }

    /// Spawns a task that [`Session::stop`] will cancel. Does nothing once
    /// the session is stopped.
    fn spawn_tracked<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.tasks.lock().unwrap_or_else(PoisonError::into_inner);
        if self.stopped.load(Ordering::SeqCst) {
            return;
        }
        tasks.retain(|handle| !handle.is_finished());
        tasks.push(tokio::spawn(task));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::TransportEnd;
    use tokio::time::timeout;

    const RECV_TIMEOUT: Duration = Duration::from_secs(2);

    /// A started session plus the transport side of both seats.
    struct Seated {
        session: Arc<Session>,
        registry: Registry,
        transports: [TransportEnd; 2],
        marks: [Mark; 2],
        board: Board,
    }

    impl Seated {
        async fn start(rematch_delay: Duration) -> Self {
            let registry = Registry::new();
            let (matchmaker, pairing) = Matchmaker::new(registry.clone(), rematch_delay);
            tokio::spawn(pairing.run());

            let (a, transport_a) = Connection::channel();
            let (b, transport_b) = Connection::channel();
            let context = SessionContext::new(registry.clone(), matchmaker, rematch_delay);
            let session = Arc::new(Session::new(a, b, context));
            for connection in session.connections() {
                registry.put(connection.id(), Arc::clone(&session));
            }
            session.start().await.unwrap();

            let mut transports = [transport_a, transport_b];
            let mut marks = [Mark::Empty; 2];
            let mut board = Board::random();
            for (seat, transport) in transports.iter_mut().enumerate() {
                match recv(transport).await {
                    ServerMessage::NewGame { desk, mark } => {
                        marks[seat] = mark;
                        board = desk;
                    }
                    other => panic!("Expected NewGame, got {:?}", other),
                }
            }
            Self {
                session,
                registry,
                transports,
                marks,
                board,
            }
        }

        fn seat_to_move(&self) -> usize {
            if self.marks[0] == self.board.active_player() {
                0
            } else {
                1
            }
        }

        fn send_turn(&self, seat: usize, x: i32, y: i32) {
            let frame = ClientMessage::Turn(Turn::new(x, y, self.marks[seat]))
                .to_json()
                .unwrap();
            self.transports[seat].push_frame(frame).unwrap();
        }

        async fn play(&mut self, x: i32, y: i32) {
            let mover = self.seat_to_move();
            self.send_turn(mover, x, y);
            match recv(&mut self.transports[1 - mover]).await {
                ServerMessage::DeskChange { desk } => self.board = desk,
                other => panic!("Expected DeskChange, got {:?}", other),
            }
        }

        async fn assert_stopped(&self) {
            assert!(self.session.is_stopped());
            assert_eq!(self.session.phase().await, Phase::Stopped);
            assert!(self.registry.is_empty());
        }
    }

    async fn recv(transport: &mut TransportEnd) -> ServerMessage {
        let text = timeout(RECV_TIMEOUT, transport.next_outbound())
            .await
            .unwrap()
            .unwrap();
        ServerMessage::from_json(&text).unwrap()
    }

    #[tokio::test]
    async fn test_undeliverable_move_stops_session() {
        let mut seated = Seated::start(Duration::from_secs(5)).await;
        let mover = seated.seat_to_move();
        seated.transports[1 - mover].outbound.close();

        seated.send_turn(mover, 1, 1);

        assert_eq!(
            recv(&mut seated.transports[mover]).await,
            ServerMessage::Disconnect
        );
        seated.assert_stopped().await;
    }

    #[tokio::test]
    async fn test_undeliverable_rematch_stops_session() {
        let mut seated = Seated::start(Duration::from_millis(100)).await;
        let first = seated.seat_to_move();
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1), (0, 2)] {
            seated.play(x, y).await;
        }
        assert_eq!(seated.board.winner(), seated.marks[first]);
        assert_eq!(seated.session.phase().await, Phase::Finished);

        seated.transports[0].outbound.close();

        assert_eq!(
            recv(&mut seated.transports[1]).await,
            ServerMessage::Disconnect
        );
        seated.assert_stopped().await;
    }
}
