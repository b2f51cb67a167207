//! The transfer engine: admission of new transfers and per-tick progress.
//!
//! Each tick every link in the registry is evaluated over a snapshot of its
//! files. A reachable link splits its bandwidth evenly across that snapshot
//! (never less than one byte per file); an unreachable link that had carried
//! data is resolved by the abort rules, which depend on whether a
//! teleporting satellite just relocated.

use crate::entity::{Entity, EntityKind, EntityMap};
use crate::error::TransferError;
use crate::file::{prefix, slice, strip_teleport_noise, File};
use crate::registry::{InFlight, LinkKey, TransferRegistry};
use crate::visibility::can_reach;
use tracing::{debug, info, warn};

/// How a file fared during one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Admitted while unreachable and still waiting for a first link
    Pending,

    /// Advanced by its ration
    Progressed { ration: usize },

    /// Fully delivered and now resident at the receiver
    Completed,

    /// Link lost; the file was removed from both endpoints
    Dropped,

    /// Link lost; the receiver's shell was discarded, the sender kept its copy
    Discarded,

    /// A teleport stripped the sender's resident copy
    SourceCorrupted,

    /// A satellite link with a teleporting end broke, leaving a damaged
    /// partial file at the receiver
    PartialDelivered,
}

impl Outcome {
    pub fn is_resolved(self) -> bool {
        !matches!(self, Outcome::Pending | Outcome::Progressed { .. })
    }

    pub fn is_abort(self) -> bool {
        self.is_resolved() && self != Outcome::Completed
    }
}

/// Record of what happened to one in-flight file during a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub link: LinkKey,
    pub filename: String,
    pub outcome: Outcome,
}

/// Validates and registers a transfer of `filename` from `from` to `to`.
///
/// All-or-nothing: on error neither the entities nor the registry change.
pub fn admit(
    entities: &mut EntityMap,
    registry: &mut TransferRegistry,
    filename: &str,
    from: &str,
    to: &str,
) -> Result<(), TransferError> {
    let sender = entities.get(from).ok_or_else(|| TransferError::unknown(from))?;
    let receiver = entities.get(to).ok_or_else(|| TransferError::unknown(to))?;

    if sender.kind().is_device() && receiver.kind().is_device() {
        return Err(TransferError::UnsupportedLink {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let source = sender
        .file(filename)
        .filter(|file| file.is_complete())
        .ok_or_else(|| TransferError::NotFound(filename.to_string()))?;

    if receiver.file(filename).is_some() {
        return Err(TransferError::AlreadyExists(filename.to_string()));
    }

    if receiver.kind() == EntityKind::RelaySatellite {
        return Err(TransferError::NoBandwidth(filename.to_string()));
    }

    check_capacity(receiver, source)?;

    let mut flight = InFlight::new(filename, source.content(), source.size());
    let shell = File::shell(filename, source.size(), from, to);

    if let Some(file) = entities.get_mut(from).and_then(|e| e.file_mut(filename)) {
        file.begin_send(from, to);
    }
    if let Some(receiver) = entities.get_mut(to) {
        receiver.insert_file(shell);
    }

    let key = LinkKey::new(from, to);
    flight.linked = can_reach(entities, from, to);
    if flight.linked {
        info!("Transfer of {} on {} admitted", filename, key);
    } else {
        info!("Transfer of {} on {} admitted, waiting for a link", filename, key);
    }
    registry.admit(key, flight);
    Ok(())
}

/// Quota and storage checks against the receiving entity.
fn check_capacity(receiver: &Entity, file: &File) -> Result<(), TransferError> {
    let caps = receiver.capabilities();

    if receiver.kind().is_satellite() {
        if let Some(quota) = caps.receive_bandwidth {
            if receiver.files_in_flight() + 1 > quota {
                return Err(TransferError::NoBandwidth(file.name().to_string()));
            }
        }
    }

    if let Some(max_files) = caps.max_files {
        if receiver.files().len() + 1 > max_files {
            return Err(TransferError::storage("Max Files Reached"));
        }
    }

    if let Some(max_bytes) = caps.max_bytes {
        if receiver.stored_bytes() + file.size() > max_bytes {
            return Err(TransferError::storage("Max Storage Reached"));
        }
    }

    Ok(())
}

/// Bytes per tick a link can carry. Devices never limit a link.
pub fn link_bandwidth(sender: &Entity, receiver: &Entity) -> usize {
    match (
        sender.capabilities().send_bandwidth,
        receiver.capabilities().receive_bandwidth,
    ) {
        (Some(send), Some(receive)) => send.min(receive),
        (Some(send), None) => send,
        (None, Some(receive)) => receive,
        (None, None) => 0,
    }
}

/// Per-file share of `bandwidth` when `share` files use the link.
pub fn ration(bandwidth: usize, share: usize) -> usize {
    (bandwidth / share.max(1)).max(1)
}

/// Runs one tick of the transfer engine over every registered link.
pub fn step(entities: &mut EntityMap, registry: &mut TransferRegistry) -> Vec<TransferEvent> {
    let mut events = Vec::new();

    for key in registry.links() {
        let snapshot: Vec<String> = registry
            .files(&key)
            .iter()
            .map(|f| f.filename.clone())
            .collect();

        let reachable = can_reach(entities, &key.from, &key.to);
        let bandwidth = match (entities.get(&key.from), entities.get(&key.to)) {
            (Some(sender), Some(receiver)) => link_bandwidth(sender, receiver),
            _ => 0,
        };
        let ration = ration(bandwidth, snapshot.len());

        for filename in snapshot {
            let Some(flight) = registry.get_mut(&key, &filename) else {
                continue;
            };
            let outcome = advance_file(entities, &key, flight, reachable, ration);
            if outcome.is_resolved() {
                registry.remove(&key, &filename);
            }
            events.push(TransferEvent {
                link: key.clone(),
                filename,
                outcome,
            });
        }
    }

    events
}

fn advance_file(
    entities: &mut EntityMap,
    key: &LinkKey,
    flight: &mut InFlight,
    reachable: bool,
    ration: usize,
) -> Outcome {
    if reachable {
        flight.linked = true;
        flight.bytes_sent = (flight.bytes_sent + ration).min(flight.size);
        publish_progress(entities, key, flight);
        debug!(
            "{} on {}: {}/{} bytes",
            flight.filename, key, flight.bytes_sent, flight.size
        );
    }

    if flight.is_complete() {
        complete(entities, key, flight);
        info!("Transfer of {} on {} complete", flight.filename, key);
        return Outcome::Completed;
    }

    if reachable {
        return Outcome::Progressed { ration };
    }
    if !flight.linked {
        return Outcome::Pending;
    }

    let outcome = abort(entities, key, flight);
    warn!("Transfer of {} on {} lost its link: {:?}", flight.filename, key, outcome);
    outcome
}

fn publish_progress(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) {
    if let Some(shell) = file_at(entities, &key.to, &flight.filename) {
        shell.reveal(&flight.content, flight.bytes_sent);
    }
    if let Some(source) = file_at(entities, &key.from, &flight.filename) {
        source.set_bytes_sent(flight.bytes_sent);
    }
}

fn complete(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) {
    if let Some(delivered) = file_at(entities, &key.to, &flight.filename) {
        delivered.reveal(&flight.content, flight.size);
        delivered.settle();
    }
    restore_source(entities, key, flight);
}

fn abort(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) -> Outcome {
    let (Some(sender), Some(receiver)) = (entities.get(&key.from), entities.get(&key.to)) else {
        discard_shell(entities, key, flight);
        restore_source(entities, key, flight);
        return Outcome::Discarded;
    };

    let sender_kind = sender.kind();
    let receiver_kind = receiver.kind();

    if sender_kind.is_device() && receiver_kind == EntityKind::TeleportingSatellite {
        let teleported = receiver.just_teleported();
        discard_shell(entities, key, flight);
        if teleported {
            if let Some(source) = file_at(entities, &key.from, &flight.filename) {
                let stripped = strip_teleport_noise(source.content());
                source.overwrite(stripped);
            }
            return Outcome::SourceCorrupted;
        }
        restore_source(entities, key, flight);
        return Outcome::Discarded;
    }

    if sender_kind.is_satellite()
        && (receiver_kind == EntityKind::TeleportingSatellite
            || sender_kind == EntityKind::TeleportingSatellite)
    {
        let remainder = slice(&flight.content, flight.bytes_sent, flight.size);
        let patched = prefix(&flight.content, flight.bytes_sent) + &strip_teleport_noise(&remainder);
        if let Some(delivered) = file_at(entities, &key.to, &flight.filename) {
            delivered.overwrite(patched);
        }
        restore_source(entities, key, flight);
        return Outcome::PartialDelivered;
    }

    discard_shell(entities, key, flight);
    if let Some(sender) = entities.get_mut(&key.from) {
        sender.remove_file(&flight.filename);
    }
    Outcome::Dropped
}

fn file_at<'a>(entities: &'a mut EntityMap, id: &str, filename: &str) -> Option<&'a mut File> {
    entities.get_mut(id)?.file_mut(filename)
}

fn discard_shell(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) {
    if let Some(receiver) = entities.get_mut(&key.to) {
        receiver.remove_file(&flight.filename);
    }
}

/// Makes the sender's copy resident again.
pub(crate) fn restore_source(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) {
    if let Some(source) = file_at(entities, &key.from, &flight.filename) {
        source.settle();
    }
}

/// Unwinds a transfer whose link was purged because an endpoint disappeared.
pub(crate) fn unwind(entities: &mut EntityMap, key: &LinkKey, flight: &InFlight) {
    discard_shell(entities, key, flight);
    restore_source(entities, key, flight);
}
