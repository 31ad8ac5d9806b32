//! Managed-accounts query.
//!
//! Reads the members of every role in a [`RoleSet`] concurrently, waits for
//! all of them, and reconciles the lists into [`ManagedAccount`]s. A failed
//! read fails the whole invocation; there is no partial list.
//!
//! [`ManagedAccountsQuery`] wraps the fetch with observable state for a
//! rendering layer. Every invocation takes a generation number when it
//! starts and commits only if no newer invocation has started since, so a
//! slow superseded fetch can never overwrite a fresher result. An invocation
//! dropped before it commits (an aborted task, a cancelled `select!` branch)
//! clears the loading flag it raised if it is still the current one.

use std::future::Future;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{instrument, Instrument, Span};

use crate::domain::{ManagedAccount, QueryError, QueryResult, RoleSet};
use crate::interactor::RoleReader;
use crate::obs;
use crate::reconcile::{reconcile_roles, RoleMembers};

/// Read every role in `roles` concurrently and reconcile the results.
#[instrument(skip(reader, roles), fields(roles = roles.len()))]
pub async fn fetch_managed_accounts(
    reader: &dyn RoleReader,
    roles: &RoleSet,
) -> QueryResult<Vec<ManagedAccount>> {
    let reads = roles.iter().map(|info| async move {
        let members = reader.read_role_members(info.id).await?;
        Ok::<_, QueryError>(RoleMembers::new(info.id, members))
    });
    let lists = try_join_all(reads).await?;
    Ok(reconcile_roles(&lists))
}

/// Observable state of a [`ManagedAccountsQuery`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ManagedAccountsState {
    pub accounts: Vec<ManagedAccount>,
    pub is_loading: bool,
    pub error: Option<QueryError>,
    /// Generation of the invocation that produced `accounts`/`error`; 0 before
    /// the first commit.
    pub generation: u64,
}

/// Outcome of a single invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The invocation was current and its result is now the visible state.
    Committed(QueryResult<Vec<ManagedAccount>>),
    /// A newer invocation started first; this result was discarded.
    Superseded { generation: u64, current: u64 },
}

impl FetchOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, FetchOutcome::Committed(_))
    }
}

/// Token identifying one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation {
    generation: u64,
}

impl Invocation {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Refetchable managed-accounts list with loading/error bookkeeping.
pub struct ManagedAccountsQuery {
    reader: Arc<dyn RoleReader>,
    roles: RoleSet,
    generation: AtomicU64,
    state: watch::Sender<ManagedAccountsState>,
}

impl ManagedAccountsQuery {
    pub fn new(reader: Arc<dyn RoleReader>, roles: RoleSet) -> Self {
        let (state, _) = watch::channel(ManagedAccountsState::default());
        ManagedAccountsQuery {
            reader,
            roles,
            generation: AtomicU64::new(0),
            state,
        }
    }

    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Current state.
    pub fn snapshot(&self) -> ManagedAccountsState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every loading transition and commit.
    pub fn subscribe(&self) -> watch::Receiver<ManagedAccountsState> {
        self.state.subscribe()
    }

    /// Start a new invocation, superseding any in flight.
    pub fn begin(&self) -> Invocation {
        let mut generation = 0;
        self.state.send_modify(|state| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.is_loading = true;
        });
        obs::emit_accounts_query_started(generation, self.roles.len());
        Invocation { generation }
    }

    pub fn is_current(&self, invocation: Invocation) -> bool {
        self.generation.load(Ordering::SeqCst) == invocation.generation
    }

    /// Run `invocation` to completion and commit its result if still current.
    ///
    /// Dropping the returned future early, even before its first poll, counts
    /// as cancelling the invocation.
    pub fn run(&self, invocation: Invocation) -> impl Future<Output = FetchOutcome> + Send + '_ {
        let guard = LoadingGuard::new(self, invocation);
        async move {
            let outcome = guard.query.execute(invocation).await;
            guard.disarm();
            outcome
        }
    }

    async fn execute(&self, invocation: Invocation) -> FetchOutcome {
        let started = Instant::now();
        let result = fetch_managed_accounts(self.reader.as_ref(), &self.roles).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let committed = self.state.send_if_modified(|state| {
            // Checked under the channel lock so `begin` cannot interleave.
            if !self.is_current(invocation) {
                return false;
            }
            state.is_loading = false;
            state.generation = invocation.generation;
            match &result {
                Ok(accounts) => {
                    state.accounts = accounts.clone();
                    state.error = None;
                }
                Err(err) => {
                    state.accounts.clear();
                    state.error = Some(err.clone());
                }
            }
            true
        });

        if !committed {
            let current = self.generation.load(Ordering::SeqCst);
            obs::emit_accounts_query_superseded(invocation.generation, current);
            return FetchOutcome::Superseded {
                generation: invocation.generation,
                current,
            };
        }

        match &result {
            Ok(accounts) => {
                obs::emit_accounts_query_committed(invocation.generation, accounts.len(), elapsed_ms)
            }
            Err(err) => obs::emit_accounts_query_failed(invocation.generation, err),
        }
        FetchOutcome::Committed(result)
    }

    /// Begin and run a fresh invocation.
    pub async fn refetch(&self) -> FetchOutcome {
        let invocation = self.begin();
        self.run(invocation).await
    }

    /// Begin an invocation now and drive it on the tokio runtime.
    pub fn spawn_refetch(self: &Arc<Self>) -> JoinHandle<FetchOutcome> {
        let invocation = self.begin();
        // Owned by the task so an abort before the first poll still clears.
        let guard = LoadingGuard::new(Arc::clone(self), invocation);
        tokio::spawn(
            async move {
                let outcome = guard.query.execute(invocation).await;
                guard.disarm();
                outcome
            }
            .instrument(Span::current()),
        )
    }
}

/// Clears `is_loading` if the invocation is dropped while still current.
struct LoadingGuard<Q>
where
    Q: Deref<Target = ManagedAccountsQuery>,
{
    query: Q,
    invocation: Invocation,
    armed: bool,
}

impl<Q> LoadingGuard<Q>
where
    Q: Deref<Target = ManagedAccountsQuery>,
{
    fn new(query: Q, invocation: Invocation) -> Self {
        LoadingGuard {
            query,
            invocation,
            armed: true,
        }
    }

    /// The invocation reached `execute`'s commit point.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl<Q> Drop for LoadingGuard<Q>
where
    Q: Deref<Target = ManagedAccountsQuery>,
{
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let query: &ManagedAccountsQuery = &self.query;
        let invocation = self.invocation;
        let cleared = query.state.send_if_modified(|state| {
            if !query.is_current(invocation) || !state.is_loading {
                return false;
            }
            state.is_loading = false;
            true
        });
        if cleared {
            obs::emit_accounts_query_cancelled(invocation.generation);
        }
    }
}
