//! Asynchronous path requests.
//!
//! Each requester has at most one outstanding query. Issuing a new request supersedes
//! the previous one: its result is still computed but dropped when it arrives. Results
//! are handed back on the caller's thread through [`PathService::dispatch_completed`].

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use thiserror::Error;
use tracing::trace;

use crate::types::{EntityId, WorldPos};

use super::{PathResult, PathfindingEngine};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to build path worker pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// Receives finished path queries.
pub trait PathListener {
    /// Requesters that no longer want a path have their results discarded unseen.
    fn wants_path(&self, requester: EntityId) -> bool {
        let _ = requester;
        true
    }

    fn on_path_found(&mut self, requester: EntityId, waypoints: &[WorldPos], success: bool);
}

#[derive(Debug)]
struct Completion {
    requester: EntityId,
    ticket: u64,
    result: PathResult,
}

#[derive(Default)]
struct Tickets {
    next: u64,
    outstanding: HashMap<EntityId, u64>,
}

pub struct PathService {
    engine: PathfindingEngine,
    pool: Arc<ThreadPool>,
    channel: (Sender<Completion>, Receiver<Completion>),
    tickets: Mutex<Tickets>,
}

impl PathService {
    /// Builds a dedicated worker pool sized from the engine's settings.
    pub fn new(engine: PathfindingEngine) -> Result<Self, ServiceError> {
        let threads = engine.settings().worker_threads.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("path-worker-{index}"))
            .build()?;
        Ok(Self::with_pool(engine, Arc::new(pool)))
    }

    pub fn with_pool(engine: PathfindingEngine, pool: Arc<ThreadPool>) -> Self {
        Self {
            engine,
            pool,
            channel: crossbeam_channel::unbounded(),
            tickets: Mutex::new(Tickets::default()),
        }
    }

    pub fn engine(&self) -> &PathfindingEngine {
        &self.engine
    }

    /// Queues a search for `requester`, superseding any query it still has outstanding.
    pub fn request(&self, requester: EntityId, start: WorldPos, goal: WorldPos) {
        let ticket = {
            let mut tickets = self.tickets.lock();
            tickets.next += 1;
            let ticket = tickets.next;
            if tickets.outstanding.insert(requester, ticket).is_some() {
                trace!(?requester, ticket, "superseding outstanding path request");
            }
            ticket
        };

        let engine = self.engine.clone();
        let sender = self.channel.0.clone();
        self.pool.spawn(move || {
            let result = engine.find_path(start, goal);
            // The receiver only disappears with the service itself.
            let _ = sender.send(Completion { requester, ticket, result });
        });
    }

    /// Drops any outstanding query for `requester`; its result will be discarded.
    pub fn forget(&self, requester: EntityId) {
        self.tickets.lock().outstanding.remove(&requester);
    }

    pub fn is_pending(&self, requester: EntityId) -> bool {
        self.tickets.lock().outstanding.contains_key(&requester)
    }

    pub fn pending_count(&self) -> usize {
        self.tickets.lock().outstanding.len()
    }

    /// Delivers every result that has already arrived. Returns how many reached `listener`.
    pub fn dispatch_completed<L>(&self, listener: &mut L) -> usize
    where
        L: PathListener + ?Sized,
    {
        let mut delivered = 0;
        while let Ok(completion) = self.channel.1.try_recv() {
            delivered += usize::from(self.deliver(completion, listener));
        }
        delivered
    }

    /// Blocks until no request is outstanding or `timeout` elapses, delivering results as
    /// they arrive. Returns how many reached `listener`.
    pub fn dispatch_until_idle<L>(&self, listener: &mut L, timeout: Duration) -> usize
    where
        L: PathListener + ?Sized,
    {
        let deadline = Instant::now() + timeout;
        let mut delivered = self.dispatch_completed(listener);
        while self.pending_count() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.channel.1.recv_timeout(remaining) {
                Ok(completion) => delivered += usize::from(self.deliver(completion, listener)),
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => break,
            }
        }
        delivered
    }

    fn deliver<L>(&self, completion: Completion, listener: &mut L) -> bool
    where
        L: PathListener + ?Sized,
    {
        let Completion { requester, ticket, result } = completion;
        {
            let mut tickets = self.tickets.lock();
            if tickets.outstanding.get(&requester) != Some(&ticket) {
                trace!(?requester, ticket, "dropping superseded path result");
                return false;
            }
            tickets.outstanding.remove(&requester);
        }
        if !listener.wants_path(requester) {
            trace!(?requester, "requester no longer wants a path");
            return false;
        }
        trace!(
            ?requester,
            success = result.success,
            steps = result.waypoints.len(),
            "path ready"
        );
        listener.on_path_found(requester, &result.waypoints, result.success);
        true
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;
    use std::thread;

    use slotmap::SlotMap;

    use super::*;
    use crate::config::PathSettings;
    use crate::grid::TileGrid;
    use crate::types::{Pos, TileKind};

    #[derive(Default)]
    struct Recorder {
        found: Vec<(EntityId, Vec<WorldPos>, bool)>,
        ignored: BTreeSet<EntityId>,
    }

    impl PathListener for Recorder {
        fn wants_path(&self, requester: EntityId) -> bool {
            !self.ignored.contains(&requester)
        }

        fn on_path_found(&mut self, requester: EntityId, waypoints: &[WorldPos], success: bool) {
            self.found.push((requester, waypoints.to_vec(), success));
        }
    }

    fn service() -> (PathService, TileGrid) {
        let grid = TileGrid::new(16, 12, TileKind::Floor);
        let engine = PathfindingEngine::new(Arc::new(grid.clone()), PathSettings::default());
        (PathService::new(engine).expect("pool builds"), grid)
    }

    fn ids(count: usize) -> Vec<EntityId> {
        let mut slots = SlotMap::<EntityId, ()>::with_key();
        (0..count).map(|_| slots.insert(())).collect()
    }

    #[test]
    fn results_are_delivered_to_the_listener() {
        let (service, grid) = service();
        let [a, b] = ids(2).try_into().expect("two ids");
        let world = |x, y| grid.grid_to_world(Pos::new(x, y));
        service.request(a, world(1, 1), world(6, 4));
        service.request(b, world(2, 2), world(0, 0));
        assert!(service.is_pending(a) && service.is_pending(b));

        let mut recorder = Recorder::default();
        let delivered = service.dispatch_until_idle(&mut recorder, Duration::from_secs(10));

        assert_eq!(delivered, 2);
        assert_eq!(service.pending_count(), 0);
        let (_, waypoints, success) =
            recorder.found.iter().find(|(id, ..)| *id == a).expect("a answered");
        assert!(success);
        assert_eq!(waypoints.last(), Some(&world(6, 4)));
        let (_, waypoints, success) =
            recorder.found.iter().find(|(id, ..)| *id == b).expect("b answered");
        assert!(!success && waypoints.is_empty());
    }

    #[test]
    fn newer_request_supersedes_the_outstanding_one() {
        let (service, grid) = service();
        let [a] = ids(1).try_into().expect("one id");
        let start = grid.grid_to_world(Pos::new(1, 1));
        service.request(a, start, grid.grid_to_world(Pos::new(10, 1)));
        service.request(a, start, grid.grid_to_world(Pos::new(1, 8)));

        let mut recorder = Recorder::default();
        service.dispatch_until_idle(&mut recorder, Duration::from_secs(10));
        // Give the superseded search time to land.
        thread::sleep(Duration::from_millis(50));
        service.dispatch_completed(&mut recorder);

        assert_eq!(recorder.found.len(), 1);
        let (_, waypoints, _) = &recorder.found[0];
        assert_eq!(waypoints.last(), Some(&grid.grid_to_world(Pos::new(1, 8))));
    }

    #[test]
    fn forgotten_and_unwanted_results_are_dropped() {
        let (service, grid) = service();
        let [forgotten, unwanted, kept] = ids(3).try_into().expect("three ids");
        let start = grid.grid_to_world(Pos::new(1, 1));
        let goal = grid.grid_to_world(Pos::new(5, 5));
        for id in [forgotten, unwanted, kept] {
            service.request(id, start, goal);
        }
        service.forget(forgotten);
        assert!(!service.is_pending(forgotten));

        let mut recorder = Recorder::default();
        recorder.ignored.insert(unwanted);
        let delivered = service.dispatch_until_idle(&mut recorder, Duration::from_secs(10));

        assert_eq!(delivered, 1);
        assert_eq!(recorder.found.len(), 1);
        assert_eq!(recorder.found[0].0, kept);
    }
}
