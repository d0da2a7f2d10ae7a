use std::sync::Arc;

use mongodb::{bson, Collection, Database as MongoHandle};
use parking_lot::RwLock;

use crate::campaign::db::CampaignStore;
use crate::campaign::Campaign;
use crate::error::Error;
use crate::segment::db::SegmentStore;
use crate::segment::Segment;

pub type MongoSegmentStore = Collection<Segment>;
pub type MongoCampaignStore = Collection<Campaign>;
pub type MemorySegmentStore = RwLock<Vec<Segment>>;
pub type MemoryCampaignStore = RwLock<Vec<Campaign>>;

const SEGMENTS: &str = "segments";
const CAMPAIGNS: &str = "campaigns";

/// The document stores the lifecycle managers read and write through.
pub trait Database: Send + Sync {
    fn segments(&self) -> &dyn SegmentStore;
    fn campaigns(&self) -> &dyn CampaignStore;
}

#[derive(Debug, Clone)]
pub struct MongoDatabase {
    segments: Collection<Segment>,
    campaigns: Collection<Campaign>,
}

impl MongoDatabase {
    pub async fn initialize(db: MongoHandle) -> Result<MongoDatabase, Error> {
        // ping the database to ensure connection is established
        db.run_command(bson::doc! { "ping": 1 }, None).await?;

        for collection in [SEGMENTS, CAMPAIGNS] {
            db.run_command(
                bson::doc! {
                    "createIndexes": collection,
                    "indexes": [
                        { "key": { "created_at": -1, "_id": -1 }, "name": "by_created_at" },
                    ]
                },
                None,
            )
            .await?;
        }

        Ok(MongoDatabase {
            segments: db.collection(SEGMENTS),
            campaigns: db.collection(CAMPAIGNS),
        })
    }
}

impl Database for MongoDatabase {
    fn segments(&self) -> &dyn SegmentStore {
        &self.segments
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &self.campaigns
    }
}

/// Process-local store, shared by every clone. Used for tests and for running
/// the dashboard without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    segments: Arc<MemorySegmentStore>,
    campaigns: Arc<MemoryCampaignStore>,
}

impl MemoryDatabase {
    pub fn new() -> MemoryDatabase {
        MemoryDatabase::default()
    }
}

impl Database for MemoryDatabase {
    fn segments(&self) -> &dyn SegmentStore {
        &*self.segments
    }

    fn campaigns(&self) -> &dyn CampaignStore {
        &*self.campaigns
    }
}
