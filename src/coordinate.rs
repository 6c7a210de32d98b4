//! Single-flight compile coordination.
//!
//! At most one compile runs per destination path at any time. The first
//! request to find a target stale registers an in-flight token and owns the
//! compile; later requests for the same destination park on a channel until
//! the owner finishes, then re-validate freshness (the artifact a waiter
//! wakes to may already have been superseded).
//!
//! The registry is owned per coordinator instance: two mounts with different
//! roots never contend with each other.

use crossbeam::channel::{self, Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::freshness::DependencyRegistry;
use crate::pipeline::PipelineError;
use crate::sass::{CompileOutput, CompileRequest, Compiler};

/// Upper bound on how long an in-flight token is honored. A token this old
/// usually means its owner died without releasing (a panicking compiler);
/// the next entrant reclaims it rather than locking the destination out
/// forever. Tokens carry a generation so a slow-but-alive owner outlasting
/// the bound cannot release the reclaimer's token. Not a user-facing
/// timeout.
const TOKEN_RECLAIM_AFTER: Duration = Duration::from_secs(300);

/// Outcome of a coordinated compile attempt.
#[derive(Debug)]
pub enum CompileAttempt {
    /// This call ran the compiler; the artifact is persisted.
    Compiled(CompileOutput),
    /// Another request's compile for the same destination finished (either
    /// way) while we waited. Caller must re-validate freshness.
    Waited,
}

struct InFlight {
    generation: u64,
    started: Instant,
    waiters: Vec<Sender<()>>,
}

impl InFlight {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            started: Instant::now(),
            waiters: Vec::new(),
        }
    }
}

enum Admission {
    Owner(u64),
    Wait(Receiver<()>),
}

/// Coordinates compiler invocations and records their dependency sets.
pub struct CompileCoordinator {
    compiler: Box<dyn Compiler>,
    in_flight: DashMap<PathBuf, InFlight>,
    deps: DependencyRegistry,
    generations: AtomicU64,
    reclaim_after: Duration,
}

impl CompileCoordinator {
    pub fn new(compiler: Box<dyn Compiler>) -> Self {
        Self::with_reclaim_after(compiler, TOKEN_RECLAIM_AFTER)
    }

    fn with_reclaim_after(compiler: Box<dyn Compiler>, reclaim_after: Duration) -> Self {
        Self {
            compiler,
            in_flight: DashMap::new(),
            deps: DependencyRegistry::new(),
            generations: AtomicU64::new(0),
            reclaim_after,
        }
    }

    pub fn dependencies(&self) -> &DependencyRegistry {
        &self.deps
    }

    /// Compile `request` for `destination`, or wait for the in-flight compile
    /// already producing it.
    ///
    /// `persist` runs between compiler success and waiter wakeup, so a waiter
    /// that observes success can immediately read identical bytes back from
    /// disk. On compiler failure nothing is persisted and the error carries
    /// the compiler's message.
    pub fn compile(
        &self,
        request: &CompileRequest,
        destination: &Path,
        persist: impl FnOnce(&CompileOutput) -> std::io::Result<()>,
    ) -> Result<CompileAttempt, PipelineError> {
        match self.admit(destination) {
            Admission::Wait(rx) => {
                // A closed channel also means the owner is done (reclaimed or
                // panicked); either way, re-validate
                let _ = rx.recv();
                Ok(CompileAttempt::Waited)
            }
            Admission::Owner(generation) => {
                let result = self.run_compile(request, destination, persist);
                self.release(destination, generation);
                result.map(CompileAttempt::Compiled)
            }
        }
    }

    fn run_compile(
        &self,
        request: &CompileRequest,
        destination: &Path,
        persist: impl FnOnce(&CompileOutput) -> std::io::Result<()>,
    ) -> Result<CompileOutput, PipelineError> {
        let output = self.compiler.compile(request)?;
        persist(&output)?;
        self.deps.record(destination, output.included_files.clone());
        Ok(output)
    }

    /// Insert-if-absent on the in-flight registry.
    fn admit(&self, destination: &Path) -> Admission {
        match self.in_flight.entry(destination.to_path_buf()) {
            Entry::Vacant(entry) => {
                let generation = self.next_generation();
                entry.insert(InFlight::new(generation));
                Admission::Owner(generation)
            }
            Entry::Occupied(mut entry) => {
                if entry.get().started.elapsed() > self.reclaim_after {
                    // Dropping the stale token's senders wakes its waiters;
                    // they re-validate and find the new owner's result later
                    let generation = self.next_generation();
                    entry.insert(InFlight::new(generation));
                    return Admission::Owner(generation);
                }
                let (tx, rx) = channel::bounded(1);
                entry.get_mut().waiters.push(tx);
                Admission::Wait(rx)
            }
        }
    }

    fn next_generation(&self) -> u64 {
        self.generations.fetch_add(1, Ordering::Relaxed)
    }

    /// Remove the owner's token and wake every parked waiter.
    ///
    /// Removal is conditional on the generation: a token reclaimed while
    /// this owner ran belongs to the reclaimer now and stays put, and the
    /// reclaimer's own release finds nothing. Both cases are quiet no-ops.
    fn release(&self, destination: &Path, generation: u64) {
        let removed = self
            .in_flight
            .remove_if(destination, |_, token| token.generation == generation);
        if let Some((_, token)) = removed {
            for waiter in token.waiters {
                let _ = waiter.send(());
            }
        }
    }
}

impl std::fmt::Debug for CompileCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompileCoordinator")
            .field("in_flight", &self.in_flight.len())
            .finish_non_exhaustive()
    }
}
