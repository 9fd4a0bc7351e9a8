use rail_graph_db::{GraphStorage, Graphid};
use serde_json::json;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    error::RailResult,
    models::{
        schedule::{HAS_STOPS_LABEL, SCHEDULE_EDGE_LABEL, SCHEDULE_LABEL, STOP_LABEL, TRAIN_LABEL},
        EntityKey, Schedule, Stop,
    },
};

/// Schedules, their stops, and the `Train` nodes that own them
///
/// Writes are serialised so each train keeps a single node.
pub struct ScheduleRepository {
    storage: Arc<dyn GraphStorage>,
    writes: Mutex<()>,
}

impl ScheduleRepository {
    pub fn new(storage: Arc<dyn GraphStorage>) -> Self {
        Self {
            storage,
            writes: Mutex::new(()),
        }
    }

    /// Store a schedule with its stops in one graph transaction
    ///
    /// Creates the train's node on first use and links it to the schedule
    /// with a `SCHEDULE` edge.
    pub async fn create_schedule(&self, schedule: &Schedule) -> RailResult<Schedule> {
        let _guard = self.writes.lock().await;

        let existing_train_node = self.find_train_node(schedule.train_id).await?;

        let mut tx = self.storage.begin_transaction().await?;

        let train_node = match existing_train_node {
            Some(id) => id,
            None => {
                tx.create_vertex(TRAIN_LABEL, json!({"train_id": schedule.train_id.to_int()}))
                    .await?
                    .id
            }
        };

        let vertex = tx
            .create_vertex(SCHEDULE_LABEL, schedule.properties())
            .await?;
        tx.create_edge(SCHEDULE_EDGE_LABEL, train_node, vertex.id, json!({}))
            .await?;

        let mut stored = schedule.clone();
        stored.id = Some(vertex.id);

        for stop in stored.stops.iter_mut() {
            let stop_vertex = tx.create_vertex(STOP_LABEL, stop.properties()).await?;
            tx.create_edge(HAS_STOPS_LABEL, vertex.id, stop_vertex.id, json!({}))
                .await?;
            stop.id = Some(stop_vertex.id);
        }

        tx.commit().await?;

        tracing::debug!(schedule = %vertex.id, train = %schedule.train_id, "stored schedule");
        Ok(stored)
    }

    /// All schedules with their stops in order
    pub async fn list_schedules(&self) -> RailResult<Vec<Schedule>> {
        let vertices = self.storage.scan_vertices(SCHEDULE_LABEL).await?;

        let mut schedules = Vec::with_capacity(vertices.len());
        for vertex in vertices {
            let mut schedule = Schedule::from_vertex(&vertex)?;
            schedule.stops = self.load_stops(vertex.id).await?;
            schedules.push(schedule);
        }

        Ok(schedules)
    }

    pub async fn schedules_for_train(&self, train: EntityKey) -> RailResult<Vec<Schedule>> {
        Ok(self
            .list_schedules()
            .await?
            .into_iter()
            .filter(|s| s.train_id == train)
            .collect())
    }

    /// `Train` graph nodes with the key each one carries
    pub async fn train_nodes(&self) -> RailResult<Vec<(Graphid, EntityKey)>> {
        Ok(self
            .storage
            .scan_vertices(TRAIN_LABEL)
            .await?
            .into_iter()
            .filter_map(|v| v.i64_property("train_id").map(|k| (v.id, EntityKey::new(k))))
            .collect())
    }

    pub async fn find_train_node(&self, train: EntityKey) -> RailResult<Option<Graphid>> {
        Ok(self
            .train_nodes()
            .await?
            .into_iter()
            .find(|(_, key)| *key == train)
            .map(|(id, _)| id))
    }

    /// Delete every schedule of a train and the train's node
    ///
    /// Returns the number of schedules removed; an unknown train removes
    /// nothing.
    pub async fn delete_train_schedules(&self, train: EntityKey) -> RailResult<usize> {
        let schedules = self.schedules_for_train(train).await?;
        let train_nodes: Vec<Graphid> = self
            .train_nodes()
            .await?
            .into_iter()
            .filter(|(_, key)| *key == train)
            .map(|(id, _)| id)
            .collect();

        self.delete_cascade(&schedules, &train_nodes).await?;
        Ok(schedules.len())
    }

    /// Remove schedules (with stops and edges) and train nodes in one graph
    /// transaction
    pub async fn delete_cascade(
        &self,
        schedules: &[Schedule],
        train_nodes: &[Graphid],
    ) -> RailResult<()> {
        if schedules.is_empty() && train_nodes.is_empty() {
            return Ok(());
        }

        let _guard = self.writes.lock().await;

        let mut edges = BTreeSet::new();
        let mut vertices = BTreeSet::new();

        for schedule in schedules {
            let Some(id) = schedule.id else { continue };

            for edge in self.storage.get_outgoing_edges(id).await? {
                if edge.label == HAS_STOPS_LABEL {
                    vertices.insert(edge.end);
                }
                edges.insert(edge.id);
            }
            for edge in self.storage.get_incoming_edges(id).await? {
                edges.insert(edge.id);
            }
            vertices.insert(id);
        }

        for &node in train_nodes {
            for edge in self.storage.get_outgoing_edges(node).await? {
                edges.insert(edge.id);
            }
            for edge in self.storage.get_incoming_edges(node).await? {
                edges.insert(edge.id);
            }
            vertices.insert(node);
        }

        let mut tx = self.storage.begin_transaction().await?;
        for edge in &edges {
            tx.delete_edge(*edge).await?;
        }
        for vertex in &vertices {
            tx.delete_vertex(*vertex).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            schedules = schedules.len(),
            train_nodes = train_nodes.len(),
            edges = edges.len(),
            "deleted schedule cascade"
        );
        Ok(())
    }

    async fn load_stops(&self, schedule: Graphid) -> RailResult<Vec<Stop>> {
        let mut stops = Vec::new();

        for edge in self.storage.get_outgoing_edges(schedule).await? {
            if edge.label != HAS_STOPS_LABEL {
                continue;
            }
            if let Some(vertex) = self.storage.get_vertex(edge.end).await? {
                stops.push(Stop::from_vertex(&vertex)?);
            }
        }

        stops.sort_by_key(|s| s.order);
        Ok(stops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rail_graph_db::storage::rocksdb_store::RocksDbStorage;
    use tempfile::TempDir;

    fn setup() -> (ScheduleRepository, Arc<dyn GraphStorage>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage: Arc<dyn GraphStorage> =
            Arc::new(RocksDbStorage::new(temp_dir.path(), "test_rail").unwrap());
        (ScheduleRepository::new(storage.clone()), storage, temp_dir)
    }

    fn schedule_for(train: i64) -> Schedule {
        Schedule {
            id: None,
            train_id: EntityKey::new(train),
            starting_hours_24_h: 7,
            starting_minutes: 30,
            valid_from: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            valid_until: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
            stops: vec![
                Stop::new(EntityKey::new(1), 0, 0),
                Stop::new(EntityKey::new(2), 5, 1),
                Stop::new(EntityKey::new(3), 0, 2),
            ],
        }
    }

    #[tokio::test]
    async fn test_create_and_list_schedule() {
        let (repo, _storage, _temp) = setup();

        let stored = repo.create_schedule(&schedule_for(7)).await.unwrap();
        assert!(stored.id.is_some());
        assert!(stored.stops.iter().all(|s| s.id.is_some()));

        let listed = repo.list_schedules().await.unwrap();
        assert_eq!(listed.len(), 1);
        let orders: Vec<u32> = listed[0].stops.iter().map(|s| s.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(listed[0].stops[1].waiting_time, 5);
    }

    #[tokio::test]
    async fn test_train_node_is_shared_between_schedules() {
        let (repo, _storage, _temp) = setup();

        repo.create_schedule(&schedule_for(7)).await.unwrap();
        repo.create_schedule(&schedule_for(7)).await.unwrap();
        repo.create_schedule(&schedule_for(8)).await.unwrap();

        assert_eq!(repo.train_nodes().await.unwrap().len(), 2);
        assert_eq!(repo.schedules_for_train(EntityKey::new(7)).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_delete_train_schedules_cascades() {
        let (repo, storage, _temp) = setup();

        repo.create_schedule(&schedule_for(7)).await.unwrap();
        repo.create_schedule(&schedule_for(8)).await.unwrap();

        let removed = repo.delete_train_schedules(EntityKey::new(7)).await.unwrap();
        assert_eq!(removed, 1);

        let remaining = repo.list_schedules().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].train_id, EntityKey::new(8));
        assert!(repo.find_train_node(EntityKey::new(7)).await.unwrap().is_none());
        assert_eq!(storage.scan_vertices(STOP_LABEL).await.unwrap().len(), 3);
        assert_eq!(storage.scan_edges(HAS_STOPS_LABEL).await.unwrap().len(), 3);
        assert_eq!(storage.scan_edges(SCHEDULE_EDGE_LABEL).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_train_is_noop() {
        let (repo, _storage, _temp) = setup();

        repo.create_schedule(&schedule_for(7)).await.unwrap();
        assert_eq!(repo.delete_train_schedules(EntityKey::new(99)).await.unwrap(), 0);
        assert_eq!(repo.list_schedules().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_schedules_share_one_train_node() {
        let (repo, _storage, _temp) = setup();
        let repo = Arc::new(repo);
        let barrier = Arc::new(tokio::sync::Barrier::new(4));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (repo, barrier) = (repo.clone(), barrier.clone());
                tokio::spawn(async move {
                    barrier.wait().await;
                    repo.create_schedule(&schedule_for(7)).await
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(repo.train_nodes().await.unwrap().len(), 1);
        assert_eq!(repo.schedules_for_train(EntityKey::new(7)).await.unwrap().len(), 4);
    }
}
