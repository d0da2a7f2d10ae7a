use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson;
use mongodb::options::FindOptions;

use crate::database::{MemoryCampaignStore, MongoCampaignStore};
use crate::error::Error;
use crate::utils::next_modified_at;

use super::{Campaign, CampaignId};

#[async_trait]
pub trait CampaignStore: Send + Sync {
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error>;

    /// Newest first.
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error>;

    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error>;

    async fn update_campaign(&self, campaign: Campaign) -> Result<Campaign, Error>;

    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error>;
}

#[async_trait]
impl CampaignStore for MongoCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.insert_one(campaign, None).await?;

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let options = FindOptions::builder()
            .sort(bson::doc! { "created_at": -1, "_id": -1 })
            .build();

        let campaigns: Vec<Campaign> = self
            .find(bson::doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign: Option<Campaign> = self
            .find_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(&self, mut campaign: Campaign) -> Result<Campaign, Error> {
        let old_modified_at = bson::DateTime::from_chrono(campaign.modified_at);
        campaign.modified_at = next_modified_at(campaign.modified_at);

        let result = self
            .replace_one(
                bson::doc! { "_id": campaign.id, "modified_at": old_modified_at },
                &campaign,
                None,
            )
            .await?;

        if result.matched_count == 0 {
            return Err(Error::ConcurrentModificationDetected);
        }

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.delete_one(bson::doc! { "_id": campaign_id }, None)
            .await?;

        Ok(())
    }
}

#[async_trait]
impl CampaignStore for MemoryCampaignStore {
    #[tracing::instrument(skip(self))]
    async fn insert_campaign(&self, campaign: &Campaign) -> Result<(), Error> {
        self.write().push(campaign.clone());

        Ok(())
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaigns(&self) -> Result<Vec<Campaign>, Error> {
        let mut campaigns = self.read().clone();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(campaigns)
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_campaign_by_id(
        &self,
        campaign_id: CampaignId,
    ) -> Result<Option<Campaign>, Error> {
        let campaign = self.read().iter().find(|c| c.id == campaign_id).cloned();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn update_campaign(&self, mut campaign: Campaign) -> Result<Campaign, Error> {
        let mut campaigns = self.write();
        let stored = campaigns
            .iter_mut()
            .find(|c| c.id == campaign.id && c.modified_at == campaign.modified_at)
            .ok_or(Error::ConcurrentModificationDetected)?;

        campaign.modified_at = next_modified_at(campaign.modified_at);
        *stored = campaign.clone();

        Ok(campaign)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_campaign(&self, campaign_id: CampaignId) -> Result<(), Error> {
        self.write().retain(|c| c.id != campaign_id);

        Ok(())
    }
}
