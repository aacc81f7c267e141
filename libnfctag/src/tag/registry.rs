// libnfctag/src/tag/registry.rs

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use log::{debug, info};

use crate::tag::TagRecord;
use crate::types::DiscoveryId;
use crate::utils::sync::{read, write};

/// Receiver of tag discovery and loss, implemented by the owning NFC service.
pub trait TagListener: Send + Sync {
    /// A new tag is ready for use. Called once per tag.
    fn on_tag_discovered(&self, id: DiscoveryId);
    /// A published tag left the field or the engine shut down.
    fn on_tag_lost(&self, id: DiscoveryId);
}

#[derive(Debug)]
struct Entry {
    record: TagRecord,
    published: bool,
}

/// Owner of every live [`TagRecord`], keyed by discovery id.
///
/// Readers get snapshots; nothing outside the registry holds a record.
/// Listener callbacks run after the map lock is released.
#[derive(Default)]
pub struct TagRegistry {
    entries: RwLock<HashMap<DiscoveryId, Entry>>,
    listener: RwLock<Option<Arc<dyn TagListener>>>,
}

impl std::fmt::Debug for TagRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRegistry")
            .field("tags", &read(&self.entries).len())
            .finish()
    }
}

impl TagRegistry {
    /// Empty registry without a listener.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the listener; `None` disables callbacks.
    pub fn set_listener(&self, listener: Option<Arc<dyn TagListener>>) {
        *write(&self.listener) = listener;
    }

    /// Store a record without announcing it yet.
    pub fn insert(&self, record: TagRecord) {
        let id = record.discovery_id();
        debug!("registry: insert tag {}", id);
        write(&self.entries).insert(
            id,
            Entry {
                record,
                published: false,
            },
        );
    }

    /// Announce a stored record through `on_tag_discovered`. Publishing the
    /// same id twice notifies once.
    pub fn publish(&self, id: DiscoveryId) -> bool {
        let newly = match write(&self.entries).get_mut(&id) {
            Some(entry) if !entry.published => {
                entry.published = true;
                true
            }
            _ => false,
        };
        if newly {
            info!("tag {} discovered", id);
            if let Some(listener) = self.listener() {
                listener.on_tag_discovered(id);
            }
        }
        newly
    }

    /// Snapshot of a record, published or not.
    pub fn get(&self, id: DiscoveryId) -> Option<TagRecord> {
        read(&self.entries).get(&id).map(|e| e.record.clone())
    }

    /// Whether `id` is stored.
    pub fn contains(&self, id: DiscoveryId) -> bool {
        read(&self.entries).contains_key(&id)
    }

    /// Snapshot of every published record ordered by discovery id.
    pub fn tags(&self) -> Vec<TagRecord> {
        let mut tags: Vec<TagRecord> = read(&self.entries)
            .values()
            .filter(|e| e.published)
            .map(|e| e.record.clone())
            .collect();
        tags.sort_by_key(|t| t.discovery_id());
        tags
    }

    /// The record whose technology is currently connected, if any.
    pub fn connected(&self) -> Option<TagRecord> {
        read(&self.entries)
            .values()
            .find(|e| e.record.connected_tech_index.is_some())
            .map(|e| e.record.clone())
    }

    /// Mark `index` of tag `id` as connected and clear every other record,
    /// so at most one record is ever connected.
    pub fn set_connected(&self, id: DiscoveryId, index: Option<usize>) {
        let mut entries = write(&self.entries);
        for (key, entry) in entries.iter_mut() {
            entry.record.connected_tech_index = if *key == id { index } else { None };
        }
    }

    /// Apply `f` to the stored record of `id`.
    pub fn update<F>(&self, id: DiscoveryId, f: F) -> bool
    where
        F: FnOnce(&mut TagRecord),
    {
        match write(&self.entries).get_mut(&id) {
            Some(entry) => {
                f(&mut entry.record);
                true
            }
            None => false,
        }
    }

    /// Drop the record of `id`, firing `on_tag_lost` if it had been
    /// announced. Returns whether a record was removed.
    pub fn remove_lost(&self, id: DiscoveryId) -> bool {
        let removed = write(&self.entries).remove(&id);
        match removed {
            Some(entry) => {
                if entry.published {
                    info!("tag {} lost", id);
                    if let Some(listener) = self.listener() {
                        listener.on_tag_lost(id);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Drop every record, notifying loss of the published ones.
    pub fn clear_lost(&self) {
        let drained: Vec<(DiscoveryId, Entry)> = write(&self.entries).drain().collect();
        let listener = self.listener();
        for (id, entry) in drained {
            if entry.published {
                if let Some(l) = &listener {
                    l.on_tag_lost(id);
                }
            }
        }
    }

    /// Number of stored records, published or not.
    pub fn len(&self) -> usize {
        read(&self.entries).len()
    }

    /// True when no record is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn listener(&self) -> Option<Arc<dyn TagListener>> {
        read(&self.listener).clone()
    }
}
