//! Logger registry — id → resolved [`LoggerRecord`].
//!
//! Registration resolves the label chain and shade once; lookups are plain
//! reads. Ids are trusted as given: two client processes minting the same id
//! overwrite each other's entry (last write wins).

use std::collections::HashMap;

use crate::color::color_index;
use crate::types::{LoggerDescriptor, LoggerId, LoggerRecord};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("logger {id} references unregistered ancestor {ancestor}")]
    MissingAncestor { id: LoggerId, ancestor: LoggerId },
}

#[derive(Debug, Default)]
pub struct Registry {
    loggers: HashMap<LoggerId, LoggerRecord>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve and store `descriptor`, replacing any record with the same id.
    ///
    /// Fails without modifying the registry if any id in the parent path is
    /// not yet registered.
    pub fn register(
        &mut self,
        descriptor: LoggerDescriptor,
    ) -> Result<&LoggerRecord, RegistryError> {
        let record = self.resolve(descriptor)?;
        Ok(self.insert(record))
    }

    /// Register a root logger. Cannot fail.
    pub fn register_root(&mut self, id: LoggerId, label: impl Into<String>) -> &LoggerRecord {
        self.insert(LoggerRecord::root(id, label))
    }

    pub fn lookup(&self, id: LoggerId) -> Option<&LoggerRecord> {
        self.loggers.get(&id)
    }

    pub fn contains(&self, id: LoggerId) -> bool {
        self.loggers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }

    fn resolve(&self, descriptor: LoggerDescriptor) -> Result<LoggerRecord, RegistryError> {
        let mut extended_label = descriptor
            .parent_path
            .iter()
            .map(|ancestor| {
                self.lookup(*ancestor)
                    .map(|record| record.label.clone())
                    .ok_or(RegistryError::MissingAncestor {
                        id: descriptor.id,
                        ancestor: *ancestor,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        extended_label.push(descriptor.label.clone());

        let base_logger_id = descriptor.base_logger_id();
        Ok(LoggerRecord {
            id: descriptor.id,
            label: descriptor.label,
            parent_path: descriptor.parent_path,
            base_logger_id,
            extended_label,
            color_index: color_index(base_logger_id),
            enabled: descriptor.enabled,
        })
    }

    fn insert(&mut self, record: LoggerRecord) -> &LoggerRecord {
        let id = record.id;
        self.loggers.insert(id, record);
        &self.loggers[&id]
    }
}
