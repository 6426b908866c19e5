use std::collections::BTreeMap;

use vigil_core::instance::{DEFAULT_INSTANCE_ID, Instance};
use vigil_core::status::AggregateStatus;

/// Inactivity window before an active instance is considered stalled.
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Cadence of the background timeout sweep.
pub const DEFAULT_SWEEP_INTERVAL_MS: u64 = 10_000;

/// In-memory table of reporting agent sessions, keyed by instance id.
///
/// Instances are created implicitly by the first `start` or `stop` call
/// for an unseen id and removed only by explicit unregistration; the
/// timeout sweep flips stale instances to inactive but never deletes
/// them. State is ephemeral and lost on restart.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: BTreeMap<String, Instance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map a missing instance id from a request body to the default.
    pub fn resolve_id(id: Option<String>) -> String {
        id.unwrap_or_else(|| DEFAULT_INSTANCE_ID.to_string())
    }

    /// Mark an instance as actively working, creating it if unseen.
    /// Idempotent; repeated calls refresh activity.
    pub fn start(&mut self, id: &str, name: Option<String>, source: Option<String>, now: u64) {
        match self.instances.get_mut(id) {
            Some(inst) => {
                inst.is_active = true;
                inst.last_activity = now;
                if let Some(name) = name {
                    inst.name = name;
                }
                if source.is_some() {
                    inst.source = source;
                }
            },
            None => {
                self.instances
                    .insert(id.to_string(), Instance::new(id, name, source, true, now));
            },
        }
        tracing::info!(instance = %id, "instance started working");
    }

    /// Mark an instance as waiting for input, creating it if unseen (an
    /// agent may report "waiting" before ever reporting "working").
    pub fn stop(&mut self, id: &str, source: Option<String>, now: u64) {
        match self.instances.get_mut(id) {
            Some(inst) => {
                inst.is_active = false;
                inst.last_activity = now;
                if source.is_some() {
                    inst.source = source;
                }
            },
            None => {
                self.instances
                    .insert(id.to_string(), Instance::new(id, None, source, false, now));
            },
        }
        tracing::info!(instance = %id, "instance stopped, needs attention");
    }

    /// Refresh activity for a working instance. Returns false for an
    /// unknown or inactive instance: a heartbeat cannot resurrect a
    /// stopped or timed-out session, only a fresh `start` can.
    pub fn heartbeat(&mut self, id: &str, now: u64) -> bool {
        match self.instances.get_mut(id) {
            Some(inst) if inst.is_active => {
                inst.last_activity = now;
                tracing::debug!(instance = %id, "heartbeat");
                true
            },
            _ => false,
        }
    }

    /// Remove an instance entirely; returns whether it existed.
    pub fn unregister(&mut self, id: &str) -> bool {
        let removed = self.instances.remove(id).is_some();
        if removed {
            tracing::info!(instance = %id, "instance unregistered");
        }
        removed
    }

    /// Flip active instances idle past `timeout_ms` to inactive, leaving
    /// `last_activity` untouched so each timeout is logged once. Returns
    /// how many flipped.
    pub fn sweep_timeouts(&mut self, now: u64, timeout_ms: u64) -> usize {
        let mut flipped = 0;
        for inst in self.instances.values_mut() {
            if inst.is_active && now.saturating_sub(inst.last_activity) > timeout_ms {
                inst.is_active = false;
                flipped += 1;
                tracing::info!(instance = %inst.id, "instance timed out due to inactivity");
            }
        }
        flipped
    }

    /// Ordered snapshot of all instances (sorted by id).
    pub fn snapshot(&self) -> Vec<Instance> {
        self.instances.values().cloned().collect()
    }

    /// Reduce the current snapshot to the aggregate verdict. Callers
    /// must sweep first so the verdict never reflects stale liveness.
    pub fn aggregate(&self) -> AggregateStatus {
        AggregateStatus::from_instances(self.snapshot())
    }

    pub fn get(&self, id: &str) -> Option<&Instance> {
        self.instances.get(id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
