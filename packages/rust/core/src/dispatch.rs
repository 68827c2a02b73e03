//! Identity-based handler dispatch.
//!
//! A fixed, process-wide registry maps allow-listed caller identities to
//! handlers. The privileged registration is always first so the remaining
//! handlers can be enumerated as "skip index 0". Unrecognized callers are
//! dropped silently: default-deny, not an error.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use sysinfo::System;
use tracing::{debug, info, instrument};

use texset_shared::{CallerId, InboundRequest, Result, TexsetError};

use crate::sink::MessageSink;

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

/// A request handler invocable through the registry.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, request: &InboundRequest, sink: &dyn MessageSink) -> Result<()>;
}

/// One registry entry: a named handler and the identities allowed to invoke it.
pub struct Registration {
    /// Handler name; also the prefix of its `_USER_IDS` environment key.
    pub name: &'static str,
    /// Identities authorized for this handler. Never empty.
    pub ids: Vec<CallerId>,
    pub handler: Arc<dyn Handler>,
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Fixed ordered handler registry, built once at startup.
pub struct Registry {
    entries: Vec<Registration>,
}

impl Registry {
    /// Build the registry. The privileged registration must be first.
    ///
    /// An identity claimed by more than one registration is rejected here,
    /// at startup — lookups may then assume at most one match and ambiguity
    /// can never surface as a runtime race.
    pub fn new(entries: Vec<Registration>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            for id in &entry.ids {
                if !seen.insert(*id) {
                    return Err(TexsetError::config(format!(
                        "caller id {id} is claimed by more than one handler"
                    )));
                }
            }
        }
        Ok(Self { entries })
    }

    /// All registrations in order, privileged first.
    pub fn entries(&self) -> &[Registration] {
        &self.entries
    }

    /// Resolve a caller to its registration, if any.
    pub fn resolve(&self, caller: CallerId) -> Option<&Registration> {
        self.entries.iter().find(|entry| entry.ids.contains(&caller))
    }

    /// Resolve and invoke the handler for `request.caller`.
    ///
    /// Unknown callers produce no handler invocation and no send.
    #[instrument(skip_all, fields(caller = %request.caller))]
    pub async fn dispatch(&self, request: &InboundRequest, sink: &dyn MessageSink) -> Result<()> {
        match self.resolve(request.caller) {
            Some(entry) => {
                info!(handler = entry.name, "dispatching request");
                entry.handler.handle(request, sink).await
            }
            None => {
                debug!("caller not in any allow-list, ignoring");
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Memory snapshot
// ---------------------------------------------------------------------------

/// Point-in-time host memory usage, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct MemorySnapshot {
    pub used: u64,
    pub free: u64,
    pub total: u64,
}

const MIB: u64 = 1024 * 1024;

impl MemorySnapshot {
    /// Capture current host memory usage.
    pub fn capture() -> Self {
        let mut system = System::new();
        system.refresh_memory();
        Self {
            used: system.used_memory(),
            free: system.free_memory(),
            total: system.total_memory(),
        }
    }
}

impl std::fmt::Display for MemorySnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Memory usage: {} MiB (free: {} MiB, total: {} MiB)",
            self.used / MIB,
            self.free / MIB,
            self.total / MIB
        )
    }
}

// ---------------------------------------------------------------------------
// Admin handler
// ---------------------------------------------------------------------------

/// Privileged handler: fans the request out to every non-privileged handler
/// in registration order, then reports a memory-usage diagnostic.
pub struct AdminHandler {
    delegates: Vec<Arc<dyn Handler>>,
}

impl AdminHandler {
    /// `delegates` are the non-privileged handlers in registration order.
    pub fn new(delegates: Vec<Arc<dyn Handler>>) -> Self {
        Self { delegates }
    }
}

#[async_trait]
impl Handler for AdminHandler {
    async fn handle(&self, request: &InboundRequest, sink: &dyn MessageSink) -> Result<()> {
        for handler in &self.delegates {
            handler.handle(request, sink).await?;
        }

        let memory = MemorySnapshot::capture();
        sink.send_text(&format!("You are an admin!\n{memory}")).await
    }
}
