//! Consensus engine interface and in-process implementation
//!
//! The node core only ever talks to consensus through [`ConsensusEngine`]:
//! propose an entry, read the (advisory) leadership hint, enumerate peers,
//! and register the single ordered apply callback. Election, log shipping
//! and persistence live behind this trait.
//!
//! [`LocalRaft`] is a minimal in-process engine in the same spirit as a
//! simplified single-binary Raft wrapper: good for single-node deployments
//! and for running several nodes inside one test process. For a production
//! cluster, plug a full Raft library in behind the trait.

use crate::common::{ClusterMember, Error, Result};
use std::sync::{Arc, Mutex};

/// Callback invoked once per committed entry, in log order, on every node.
pub type ApplyFn = Box<dyn Fn(&[u8]) + Send + Sync>;

/// The operations the node core requires from a consensus engine.
pub trait ConsensusEngine: Send + Sync {
    /// Submits one record and returns its log index once a quorum durably
    /// stores and applies it. `NotLeader` when this node cannot commit,
    /// `ConsensusTimeout` when a quorum is unreachable in time. This result
    /// is authoritative; `is_leader` is only a hint.
    fn propose(&self, entry: Vec<u8>) -> Result<u64>;

    /// Advisory leadership hint; can go stale immediately.
    fn is_leader(&self) -> bool;

    /// This node's current role, as advisory as `is_leader`.
    fn role(&self) -> RaftRole;

    /// Last known leader ID, if any.
    fn leader_hint(&self) -> Option<u64>;

    /// The cluster roster minus this node.
    fn peers(&self) -> Vec<ClusterMember>;

    /// Registers the apply callback. The engine invokes it strictly in log
    /// order and never concurrently with itself; this is the only path that
    /// drives state machine mutation.
    fn on_apply(&self, apply: ApplyFn);
}

/// Raft role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaftRole {
    Follower,
    Candidate,
    Leader,
}

impl std::fmt::Display for RaftRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RaftRole::Follower => write!(f, "follower"),
            RaftRole::Candidate => write!(f, "candidate"),
            RaftRole::Leader => write!(f, "leader"),
        }
    }
}

struct SharedLogInner {
    entries: Vec<Vec<u8>>,
    subscribers: Vec<ApplyFn>,
}

/// Ordered committed log shared by every [`LocalRaft`] in one process.
///
/// Appending an entry delivers it to every subscriber under the log lock,
/// so all nodes replay the identical sequence and no apply callback ever
/// runs concurrently with another.
pub struct SharedLog {
    inner: Mutex<SharedLogInner>,
}

impl SharedLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SharedLogInner {
                entries: Vec::new(),
                subscribers: Vec::new(),
            }),
        })
    }

    fn append(&self, entry: Vec<u8>) -> u64 {
        let mut inner = self.inner.lock().unwrap();
        inner.entries.push(entry);
        let index = inner.entries.len() as u64;
        let committed = inner.entries.last().cloned().unwrap_or_default();
        for apply in &inner.subscribers {
            apply(&committed);
        }
        index
    }

    fn subscribe(&self, apply: ApplyFn) {
        self.inner.lock().unwrap().subscribers.push(apply);
    }

    /// Number of committed entries. Exposed for tests.
    pub fn len(&self) -> u64 {
        self.inner.lock().unwrap().entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process consensus engine over a [`SharedLog`].
pub struct LocalRaft {
    node_id: u64,
    role: Mutex<RaftRole>,
    leader_id: Mutex<Option<u64>>,
    roster: Vec<ClusterMember>,
    log: Arc<SharedLog>,
}

impl LocalRaft {
    /// Joins `log` as a follower.
    pub fn new(node_id: u64, roster: Vec<ClusterMember>, log: Arc<SharedLog>) -> Self {
        Self {
            node_id,
            role: Mutex::new(RaftRole::Follower),
            leader_id: Mutex::new(None),
            roster,
            log,
        }
    }

    /// Single-node engine that is immediately leader.
    pub fn single(member: ClusterMember) -> Self {
        let node = Self::new(member.id, vec![member], SharedLog::new());
        node.become_leader();
        node
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    /// Assume leadership. For bootstrap and tests; a production engine
    /// elects instead.
    pub fn become_leader(&self) {
        *self.role.lock().unwrap() = RaftRole::Leader;
        *self.leader_id.lock().unwrap() = Some(self.node_id);
        tracing::info!("node {} became leader", self.node_id);
    }

    /// Step down to follower, recording the new leader if known.
    pub fn step_down(&self, leader_id: Option<u64>) {
        *self.role.lock().unwrap() = RaftRole::Follower;
        *self.leader_id.lock().unwrap() = leader_id;
    }

    /// Make the other nodes' engines aware of the leader, roster-wide.
    pub fn note_leader(&self, leader_id: u64) {
        *self.leader_id.lock().unwrap() = Some(leader_id);
    }
}

impl ConsensusEngine for LocalRaft {
    fn propose(&self, entry: Vec<u8>) -> Result<u64> {
        if !self.is_leader() {
            let hint = self
                .leader_hint()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(Error::NotLeader(hint));
        }
        Ok(self.log.append(entry))
    }

    fn is_leader(&self) -> bool {
        matches!(*self.role.lock().unwrap(), RaftRole::Leader)
    }

    fn role(&self) -> RaftRole {
        *self.role.lock().unwrap()
    }

    fn leader_hint(&self) -> Option<u64> {
        *self.leader_id.lock().unwrap()
    }

    fn peers(&self) -> Vec<ClusterMember> {
        self.roster
            .iter()
            .filter(|m| m.id != self.node_id)
            .cloned()
            .collect()
    }

    fn on_apply(&self, apply: ApplyFn) {
        self.log.subscribe(apply);
    }
}
