//! Latency/optimism shim.
//!
//! Presentation code dispatches mutations here instead of applying them
//! directly. A dispatched mutation is validated at once against the
//! optimistic projection, then committed after a simulated round trip by the
//! worker that owns its board. Each board has a single FIFO worker, so two
//! mutations against the same board commit in issue order whatever their
//! individual delays. Mutations on different boards commit independently.
//!
//! Commits are atomic: the committed snapshot is replaced as a whole and
//! published through a watch channel, then saved. Readers never see a
//! partially applied mutation.

use crate::config::EngineConfig;
use crate::error::{KanbanError, Result};
use crate::ids::BoardId;
use crate::mutation::{KanbanMutation, Mutation};
use crate::store::{load_or_seed, StateStorage};
use crate::types::BoardState;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch, Mutex as TokioMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Outcome of a committed mutation
#[derive(Debug)]
pub struct CommitReport {
    /// The affected entity as committed, or a deletion receipt
    pub value: Value,
    /// Set when the commit stands in memory but could not be persisted
    pub save_error: Option<KanbanError>,
}

impl CommitReport {
    pub fn is_saved(&self) -> bool {
        self.save_error.is_none()
    }
}

/// Handle to a dispatched mutation.
///
/// Dropping the handle does not cancel anything: the mutation still commits.
#[derive(Debug)]
pub struct PendingMutation {
    op: &'static str,
    value: Value,
    receiver: oneshot::Receiver<Result<CommitReport>>,
}

impl PendingMutation {
    pub fn op(&self) -> &'static str {
        self.op
    }

    /// The result the mutation produced against the optimistic projection
    pub fn optimistic(&self) -> &Value {
        &self.value
    }

    /// Wait for the commit.
    ///
    /// Fails with the commit-time error if the mutation no longer applied
    /// to the committed snapshot, e.g. because a racing delete removed its
    /// target.
    pub async fn committed(self) -> Result<CommitReport> {
        self.receiver
            .await
            .unwrap_or(Err(KanbanError::DispatcherClosed))
    }
}

/// One queued mutation
struct Job {
    seq: u64,
    mutation: KanbanMutation,
    commit_at: Instant,
    reply: oneshot::Sender<Result<CommitReport>>,
}

/// Issued but not yet committed mutations, and the state they project
struct Optimistic {
    pending: Vec<(u64, KanbanMutation)>,
    projection: BoardState,
}

/// State shared between the dispatcher and its board workers
struct Shared {
    storage: Arc<dyn StateStorage>,
    committed: watch::Sender<Arc<BoardState>>,
    /// Held across apply, publish and save so saves land in commit order
    commit_lock: TokioMutex<()>,
    optimistic: Mutex<Optimistic>,
}

/// Board queues. Dropping a sender lets its worker drain and exit.
#[derive(Default)]
struct Queues {
    closed: bool,
    next_seq: u64,
    senders: HashMap<BoardId, mpsc::UnboundedSender<Job>>,
    workers: HashMap<BoardId, JoinHandle<()>>,
}

impl Queues {
    /// Forget workers that have exited and senders nobody receives on
    fn prune(&mut self) {
        self.workers.retain(|_, worker| !worker.is_finished());
        self.senders.retain(|_, sender| !sender.is_closed());
    }

    fn sender(&mut self, shared: &Arc<Shared>, board_id: &BoardId) -> mpsc::UnboundedSender<Job> {
        match self.senders.get(board_id) {
            Some(sender) if !sender.is_closed() => sender.clone(),
            _ => self.spawn_worker(shared, board_id),
        }
    }

    /// Start a worker for `board_id`. A worker still draining for the same
    /// id is handed over and awaited first, so commits stay in issue order.
    fn spawn_worker(
        &mut self,
        shared: &Arc<Shared>,
        board_id: &BoardId,
    ) -> mpsc::UnboundedSender<Job> {
        let (sender, receiver) = mpsc::unbounded_channel();
        let previous = self.workers.remove(board_id);
        let worker = Arc::clone(shared).worker_loop(board_id.clone(), receiver, previous);
        self.workers.insert(board_id.clone(), tokio::spawn(worker));
        self.senders.insert(board_id.clone(), sender.clone());
        sender
    }

    /// Stop feeding a board's worker. It exits once its queue is empty.
    fn retire(&mut self, board_id: &BoardId) {
        if self.senders.remove(board_id).is_some() {
            debug!(board = %board_id, "board worker retired");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Replay pending mutations over a committed snapshot, skipping any that no
/// longer apply
fn replay(base: &BoardState, pending: &[(u64, KanbanMutation)]) -> BoardState {
    pending
        .iter()
        .fold(base.clone(), |state, (seq, mutation)| match mutation.apply(&state) {
            Ok(applied) => applied.state,
            Err(e) => {
                debug!(
                    seq,
                    op = mutation.op(),
                    error = %e,
                    "pending mutation dropped from projection"
                );
                state
            }
        })
}

impl Shared {
    /// Apply a job to the latest committed snapshot, publish and save
    async fn commit(&self, job: Job) {
        let Job {
            seq,
            mutation,
            reply,
            ..
        } = job;
        let _guard = self.commit_lock.lock().await;

        let current = self.committed.borrow().clone();
        let outcome = match mutation.apply(&current) {
            Ok(applied) => {
                let snapshot = Arc::new(applied.state);
                self.committed.send_replace(Arc::clone(&snapshot));
                self.settle(seq, &snapshot);
                debug!(seq, op = mutation.op(), board = %mutation.board_id(), "committed");

                let save_error = self.storage.save(&snapshot).await.err();
                if let Some(e) = &save_error {
                    warn!(seq, op = mutation.op(), error = %e, "committed but not saved");
                }
                Ok(CommitReport {
                    value: applied.value,
                    save_error,
                })
            }
            Err(e) => {
                warn!(seq, op = mutation.op(), error = %e, "mutation rejected at commit");
                self.settle(seq, &current);
                Err(e)
            }
        };

        if reply.send(outcome).is_err() {
            debug!(seq, "commit outcome unobserved");
        }
    }

    /// Retire a pending mutation and rebuild the projection
    fn settle(&self, seq: u64, committed: &BoardState) {
        let mut optimistic = lock(&self.optimistic);
        optimistic.pending.retain(|(s, _)| *s != seq);
        optimistic.projection = replay(committed, &optimistic.pending);
    }

    async fn worker_loop(
        self: Arc<Self>,
        board_id: BoardId,
        mut receiver: mpsc::UnboundedReceiver<Job>,
        previous: Option<JoinHandle<()>>,
    ) {
        if let Some(previous) = previous {
            if let Err(e) = previous.await {
                warn!(board = %board_id, error = %e, "previous board worker failed");
            }
        }
        debug!(board = %board_id, "board worker started");
        while let Some(job) = receiver.recv().await {
            tokio::time::sleep_until(job.commit_at).await;
            self.commit(job).await;
        }
        debug!(board = %board_id, "board worker drained");
    }
}

/// Per-board FIFO mutation queue in front of the committed state
pub struct Dispatcher {
    shared: Arc<Shared>,
    queues: Mutex<Queues>,
    latency: Duration,
    recovered: Option<KanbanError>,
}

impl Dispatcher {
    /// Load (or seed) the state from `storage` and start dispatching.
    ///
    /// A corrupt document is not fatal: the dispatcher starts from the seed
    /// state and the load error is kept in [`Dispatcher::recovered_error`].
    pub async fn open(config: &EngineConfig, storage: Arc<dyn StateStorage>) -> Result<Self> {
        let (state, recovered) = load_or_seed(storage.as_ref(), &config.seed()).await?;
        info!(
            boards = state.boards.len(),
            latency_ms = config.latency_ms,
            recovered = recovered.is_some(),
            "dispatcher opened"
        );
        let mut dispatcher = Self::with_state(state, storage, config.latency());
        dispatcher.recovered = recovered;
        Ok(dispatcher)
    }

    /// Start dispatching from an already loaded state
    pub fn with_state(
        state: BoardState,
        storage: Arc<dyn StateStorage>,
        latency: Duration,
    ) -> Self {
        let (committed, _) = watch::channel(Arc::new(state.clone()));
        Self {
            shared: Arc::new(Shared {
                storage,
                committed,
                commit_lock: TokioMutex::new(()),
                optimistic: Mutex::new(Optimistic {
                    pending: Vec::new(),
                    projection: state,
                }),
            }),
            queues: Mutex::new(Queues::default()),
            latency,
            recovered: None,
        }
    }

    /// The corrupt-data error recovered from at open, if any
    pub fn recovered_error(&self) -> Option<&KanbanError> {
        self.recovered.as_ref()
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// The last committed snapshot
    pub fn snapshot(&self) -> Arc<BoardState> {
        self.shared.committed.borrow().clone()
    }

    /// The committed snapshot with every pending mutation applied in issue order
    pub fn projection(&self) -> BoardState {
        lock(&self.shared.optimistic).projection.clone()
    }

    /// Number of board workers still running
    pub fn active_workers(&self) -> usize {
        lock(&self.queues)
            .workers
            .values()
            .filter(|worker| !worker.is_finished())
            .count()
    }

    /// Number of mutations issued but not yet committed
    pub fn pending_count(&self) -> usize {
        lock(&self.shared.optimistic).pending.len()
    }

    /// Receive every committed snapshot
    pub fn subscribe(&self) -> watch::Receiver<Arc<BoardState>> {
        self.shared.committed.subscribe()
    }

    /// Dispatch with the configured latency
    pub fn dispatch(&self, mutation: impl Into<KanbanMutation>) -> Result<PendingMutation> {
        self.dispatch_with_latency(mutation, self.latency)
    }

    /// Validate `mutation` now and schedule its commit after `latency`.
    ///
    /// Validation errors are returned immediately and nothing is queued.
    /// Must be called from within a tokio runtime.
    pub fn dispatch_with_latency(
        &self,
        mutation: impl Into<KanbanMutation>,
        latency: Duration,
    ) -> Result<PendingMutation> {
        let mutation = mutation.into();
        let mut queues = lock(&self.queues);
        if queues.closed {
            return Err(KanbanError::DispatcherClosed);
        }
        queues.prune();

        let seq = queues.next_seq;
        let (value, board_gone) = {
            let mut optimistic = lock(&self.shared.optimistic);
            let applied = mutation.apply(&optimistic.projection)?;
            let board_gone = !applied.state.contains_board(mutation.board_id());
            optimistic.projection = applied.state;
            optimistic.pending.push((seq, mutation.clone()));
            (applied.value, board_gone)
        };
        queues.next_seq += 1;

        let (reply, receiver) = oneshot::channel();
        let op = mutation.op();
        let board_id = mutation.board_id().clone();
        let job = Job {
            seq,
            mutation,
            commit_at: Instant::now() + latency,
            reply,
        };

        let sender = queues.sender(&self.shared, &board_id);
        if let Err(mpsc::error::SendError(job)) = sender.send(job) {
            // The worker died after the liveness check
            warn!(seq, board = %board_id, "board worker unavailable, restarting");
            if queues.spawn_worker(&self.shared, &board_id).send(job).is_err() {
                self.shared.settle(seq, &self.snapshot());
                return Err(KanbanError::DispatcherClosed);
            }
        }
        if board_gone {
            queues.retire(&board_id);
        }

        debug!(seq, op, board = %board_id, latency_ms = latency.as_millis() as u64, "queued");
        Ok(PendingMutation {
            op,
            value,
            receiver,
        })
    }

    /// Stop accepting mutations and wait until every queued one has committed
    pub async fn shutdown(&self) {
        let workers = {
            let mut queues = lock(&self.queues);
            queues.closed = true;
            queues.senders.clear();
            std::mem::take(&mut queues.workers)
        };

        info!(
            workers = workers.len(),
            pending = self.pending_count(),
            "dispatcher shutting down"
        );
        for handle in workers.into_values() {
            if let Err(e) = handle.await {
                warn!(error = %e, "board worker failed during shutdown");
            }
        }
        info!("dispatcher shutdown complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{AddBoard, DeleteBoard};
    use crate::column::AddColumn;
    use crate::store::MemoryStore;
    use crate::task::{AddTask, DeleteTask};
    use crate::types::TaskFields;

    fn setup() -> (Dispatcher, Arc<MemoryStore>, BoardId) {
        let add = AddBoard::new("Sprint").with_default_columns();
        let state = add.apply(&BoardState::empty()).unwrap().state;
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::with_state(state, store.clone(), Duration::from_millis(100));
        (dispatcher, store, add.id)
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_commits_after_latency() {
        let (dispatcher, store, board_id) = setup();
        let column_id = dispatcher.snapshot().boards[0].columns[0].id.clone();
        let add = AddTask::new(&board_id, &column_id, TaskFields::new("Later"));
        let task_id = add.id.clone();

        let started = Instant::now();
        let pending = dispatcher.dispatch(add).unwrap();
        assert_eq!(pending.op(), "add task");
        assert_eq!(pending.optimistic()["title"], "Later");
        assert!(!dispatcher.snapshot().contains_task(&task_id));
        assert!(dispatcher.projection().contains_task(&task_id));
        assert_eq!(dispatcher.pending_count(), 1);

        let report = pending.committed().await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(report.is_saved());
        assert!(dispatcher.snapshot().contains_task(&task_id));
        assert_eq!(dispatcher.pending_count(), 0);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_is_synchronous() {
        let (dispatcher, store, board_id) = setup();
        let column_id = dispatcher.snapshot().boards[0].columns[0].id.clone();

        let err = dispatcher
            .dispatch(AddTask::new(&board_id, &column_id, TaskFields::new("  ")))
            .unwrap_err();
        assert!(err.is_validation());

        let err = dispatcher
            .dispatch(AddColumn::new(&board_id, "Review"))
            .unwrap_err();
        assert!(err.is_conflict());

        assert_eq!(dispatcher.pending_count(), 0);
        dispatcher.shutdown().await;
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_validation_sees_pending_mutations() {
        let (dispatcher, _store, _) = setup();
        let board = AddBoard::new("Next");
        let board_id = board.id.clone();
        dispatcher.dispatch(board).unwrap();

        // The new board only exists in the projection, yet it can be targeted
        let column = dispatcher.dispatch(AddColumn::new(&board_id, "Review")).unwrap();
        let report = column.committed().await.unwrap();
        assert_eq!(report.value["title"], "Review");
        assert_eq!(dispatcher.snapshot().board(&board_id).unwrap().columns.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_failure_keeps_commit() {
        let (dispatcher, store, board_id) = setup();
        store.set_failing(true);
        let column_id = dispatcher.snapshot().boards[0].columns[0].id.clone();
        let add = AddTask::new(&board_id, &column_id, TaskFields::new("Unsaved"));
        let task_id = add.id.clone();

        let report = dispatcher.dispatch(add).unwrap().committed().await.unwrap();
        assert!(matches!(report.save_error, Some(KanbanError::Io(_))));
        assert!(dispatcher.snapshot().contains_task(&task_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_commit_time_rejection_leaves_snapshot() {
        let (dispatcher, store, board_id) = setup();
        let column_id = dispatcher.snapshot().boards[0].columns[0].id.clone();
        let before = dispatcher.snapshot();

        let (reply, receiver) = oneshot::channel();
        dispatcher
            .shared
            .commit(Job {
                seq: 99,
                mutation: DeleteTask::new(&board_id, &column_id, "gone").into(),
                commit_at: Instant::now(),
                reply,
            })
            .await;

        assert!(receiver.await.unwrap().unwrap_err().is_not_found());
        assert_eq!(dispatcher.snapshot(), before);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_commits() {
        let (dispatcher, _store, board_id) = setup();
        let mut updates = dispatcher.subscribe();
        let column_id = dispatcher.snapshot().boards[0].columns[0].id.clone();
        let add = AddTask::new(&board_id, &column_id, TaskFields::new("Watched"));
        let task_id = add.id.clone();

        dispatcher.dispatch(add).unwrap();
        updates.changed().await.unwrap();
        assert!(updates.borrow_and_update().contains_task(&task_id));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispatch_after_shutdown() {
        let (dispatcher, _store, _) = setup();
        dispatcher.shutdown().await;
        let err = dispatcher.dispatch(AddBoard::new("Late")).unwrap_err();
        assert!(matches!(err, KanbanError::DispatcherClosed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deleted_boards_retire_their_workers() {
        let (dispatcher, _store, _) = setup();
        for i in 0..50 {
            let board = AddBoard::new(format!("Scratch {i}"));
            let board_id = board.id.clone();
            dispatcher.dispatch(board).unwrap();
            let delete = dispatcher.dispatch(DeleteBoard::new(&board_id)).unwrap();
            assert!(!lock(&dispatcher.queues).senders.contains_key(&board_id));
            delete.committed().await.unwrap();
            assert!(lock(&dispatcher.queues).workers.len() <= 2);
        }

        // Let the last worker notice its closed queue
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert!(lock(&dispatcher.queues).senders.is_empty());
        assert_eq!(dispatcher.active_workers(), 0);
        assert_eq!(dispatcher.snapshot().boards.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reused_board_id_waits_for_retired_worker() {
        let (dispatcher, _store, _) = setup();
        let board = AddBoard::new("Phoenix");
        let board_id = board.id.clone();
        let mut reborn = AddBoard::new("Phoenix again");
        reborn.id = board_id.clone();

        let first = dispatcher.dispatch(board).unwrap();
        let delete = dispatcher.dispatch(DeleteBoard::new(&board_id)).unwrap();
        let second = dispatcher
            .dispatch_with_latency(reborn, Duration::ZERO)
            .unwrap();

        first.committed().await.unwrap();
        delete.committed().await.unwrap();
        second.committed().await.unwrap();
        let snapshot = dispatcher.snapshot();
        assert_eq!(snapshot.board(&board_id).unwrap().name, "Phoenix again");
        assert_eq!(dispatcher.active_workers(), 1);
    }
}
