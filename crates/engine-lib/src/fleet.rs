//! Read-only access to vehicle registration metadata
//!
//! The vehicle repository itself belongs to the fleet backend; the engine
//! only needs a lookup by id. `InMemoryVehicleStore` backs the standalone
//! server and the tests.

use crate::models::VehicleRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Lookup of a vehicle's registration timestamp and activity flag
#[async_trait]
pub trait VehicleLookup: Send + Sync {
    /// `Ok(None)` when no vehicle has this id
    async fn find_vehicle(&self, id: Uuid) -> Result<Option<VehicleRecord>>;
}

/// Concurrent in-memory vehicle table
#[derive(Debug, Default)]
pub struct InMemoryVehicleStore {
    vehicles: DashMap<Uuid, VehicleRecord>,
}

impl InMemoryVehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = VehicleRecord>) -> Self {
        let store = Self::new();
        for record in records {
            store.insert(record);
        }
        store
    }

    /// Load a JSON array of vehicle records
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read vehicle file {:?}", path))?;
        let records: Vec<VehicleRecord> = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse vehicle file {:?}", path))?;

        let store = Self::from_records(records);
        info!(path = %path.display(), vehicles = store.len(), "Loaded vehicle store");
        Ok(store)
    }

    pub fn insert(&self, record: VehicleRecord) {
        self.vehicles.insert(record.id, record);
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

#[async_trait]
impl VehicleLookup for InMemoryVehicleStore {
    async fn find_vehicle(&self, id: Uuid) -> Result<Option<VehicleRecord>> {
        Ok(self.vehicles.get(&id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use std::io::Write;

    fn vehicle(active: bool) -> VehicleRecord {
        VehicleRecord {
            id: Uuid::new_v4(),
            registered_at: Utc::now() - Duration::days(90),
            active,
        }
    }

    #[tokio::test]
    async fn test_find_existing_vehicle() {
        let record = vehicle(true);
        let store = InMemoryVehicleStore::from_records([record.clone()]);

        let found = store.find_vehicle(record.id).await.unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_unknown_vehicle_is_none() {
        let store = InMemoryVehicleStore::from_records([vehicle(true)]);
        assert!(store.find_vehicle(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[test]
    fn test_insert_replaces_by_id() {
        let store = InMemoryVehicleStore::new();
        assert!(store.is_empty());

        let mut record = vehicle(true);
        store.insert(record.clone());
        record.active = false;
        store.insert(record.clone());

        assert_eq!(store.len(), 1);
        let found = tokio_test::block_on(store.find_vehicle(record.id)).unwrap();
        assert_eq!(found, Some(record));
    }

    #[tokio::test]
    async fn test_load_from_json_file() {
        let records = vec![vehicle(true), vehicle(false)];
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&records).unwrap().as_bytes())
            .unwrap();

        let store = InMemoryVehicleStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 2);
        for record in records {
            assert_eq!(store.find_vehicle(record.id).await.unwrap(), Some(record));
        }
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        assert!(InMemoryVehicleStore::load(file.path()).is_err());
    }
}
