use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::campaign::{Campaign, CampaignStatus};
use crate::database::Database;
use crate::error::Error;
use crate::segment::{Segment, SegmentCriteria};
use crate::typedid::{TypedId, TypedIdMarker};

fn id<T: TypedIdMarker>(id: &str) -> Result<TypedId<T>, Error> {
    id.parse()
        .map_err(|err| Error::ExistentialState(format!("seed id {}: {}", id, err)))
}

fn date(date: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|err| Error::ExistentialState(format!("seed date {}: {}", date, err)))
}

fn created(day: &str) -> Result<DateTime<Utc>, Error> {
    let datetime = date(day)?
        .and_hms_opt(9, 0, 0)
        .ok_or_else(|| Error::ExistentialState(format!("seed date {}", day)))?;

    Ok(Utc.from_utc_datetime(&datetime))
}

fn criteria(
    demographics: Option<&str>,
    purchase_history: Option<&str>,
    engagement_behavior: Option<&str>,
) -> SegmentCriteria {
    SegmentCriteria {
        demographics: demographics.map(Into::into),
        purchase_history: purchase_history.map(Into::into),
        engagement_behavior: engagement_behavior.map(Into::into),
    }
}

fn segment(
    segment_id: &str,
    name: &str,
    description: &str,
    customer_count: i64,
    criteria: SegmentCriteria,
    created_day: &str,
) -> Result<Segment, Error> {
    let created_at = created(created_day)?;

    Ok(Segment {
        id: id(segment_id)?,
        name: name.to_string(),
        description: Some(description.to_string()),
        criteria,
        customer_count,
        created_at,
        modified_at: created_at,
    })
}

struct Results {
    sent_count: i64,
    failed_count: i64,
    open_rate: f64,
    click_rate: f64,
}

fn campaign(
    campaign_id: &str,
    name: &str,
    subject: &str,
    target: &Segment,
    status: CampaignStatus,
    sent_day: Option<&str>,
    created_day: &str,
    results: Option<Results>,
) -> Result<Campaign, Error> {
    let created_at = created(created_day)?;
    let sent_date = sent_day.map(date).transpose()?;

    let mut campaign = Campaign {
        id: id(campaign_id)?,
        name: name.to_string(),
        subject: subject.to_string(),
        email_content: format!("{}: a message for our {} segment.", name, target.name),
        target_segment_id: target.id,
        target_segment_name: Some(target.name.clone()),
        status,
        sent_date,
        created_at,
        modified_at: created_at,
        audience_size: Some(target.customer_count),
        sent_count: None,
        failed_count: None,
        open_rate: None,
        click_rate: None,
    };

    if let Some(results) = results {
        campaign.sent_count = Some(results.sent_count);
        campaign.failed_count = Some(results.failed_count);
        campaign.open_rate = Some(results.open_rate);
        campaign.click_rate = Some(results.click_rate);
    } else if status == CampaignStatus::Scheduled {
        campaign.sent_count = Some(0);
        campaign.failed_count = Some(0);
    }

    Ok(campaign)
}

/// Fills empty stores with the sample dashboard data. Stores that already
/// hold records are left alone.
#[tracing::instrument(skip(db))]
pub async fn seed(db: &dyn Database) -> Result<(), Error> {
    let has_segments = !db.segments().fetch_segments().await?.is_empty();
    let has_campaigns = !db.campaigns().fetch_campaigns().await?.is_empty();
    if has_segments || has_campaigns {
        tracing::info!("database already has data, skipping seed");
        return Ok(());
    }

    let high_engagement = segment(
        "SEG-3F1C2A4E-7B6D-4E11-9C1A-0B5E8D2F6A01",
        "High Engagement Users",
        "Users who frequently open emails and click links.",
        1250,
        criteria(
            Some("Age 25-45"),
            Some(">= 3 purchases"),
            Some("Opened 5+ emails in last 30 days"),
        ),
        "2024-06-01",
    )?;
    let recent_signups = segment(
        "SEG-8A2B4C6D-1E3F-4A5B-8C7D-9E0F1A2B3C02",
        "Recent Signups",
        "Users who signed up in the last 30 days.",
        300,
        criteria(Some("All"), Some("Any"), Some("Signed up < 30 days ago")),
        "2024-06-02",
    )?;
    let potential_churn = segment(
        "SEG-5D4C3B2A-6F7E-4D8C-9B0A-1C2D3E4F5A03",
        "Potential Churn",
        "Users with decreasing activity.",
        150,
        criteria(None, None, Some("Last active > 60 days ago")),
        "2024-06-03",
    )?;
    let loyal_spenders = segment(
        "SEG-9E8D7C6B-5A4F-4E3D-8C2B-1A0F9E8D7C04",
        "Loyal Spenders",
        "Customers with high purchase frequency and value.",
        420,
        criteria(None, Some("Total spend > $500 AND > 5 purchases"), None),
        "2024-06-04",
    )?;

    let campaigns = vec![
        campaign(
            "CPN-16E77539-8873-4C8A-BCA3-2036010474AD",
            "Summer Kick-off Sale",
            "\u{2600}\u{fe0f} Summer Deals Are Here!",
            &high_engagement,
            CampaignStatus::Sent,
            Some("2024-06-15"),
            "2024-06-10",
            Some(Results {
                sent_count: 1245,
                failed_count: 5,
                open_rate: 35.2,
                click_rate: 8.1,
            }),
        )?,
        campaign(
            "CPN-2B7F4E91-0C3D-4A6E-B5F8-3D1A9C7E2B05",
            "New User Welcome",
            "Welcome to ClientPulse!",
            &recent_signups,
            CampaignStatus::Scheduled,
            Some("2024-07-25"),
            "2024-07-10",
            None,
        )?,
        campaign(
            "CPN-7C1E5A3B-9D2F-4B8E-A6C4-5E3B1D9F7A06",
            "Re-engagement Offer",
            "We Miss You! Here's 15% Off",
            &potential_churn,
            CampaignStatus::Draft,
            None,
            "2024-07-18",
            None,
        )?,
        campaign(
            "CPN-4E9A2C7F-1B5D-4F3A-9E8C-7B6A5D4C3B07",
            "VIP Exclusive Preview",
            "VIPs: Early Access to New Arrivals",
            &loyal_spenders,
            CampaignStatus::Sent,
            Some("2024-07-01"),
            "2024-06-25",
            Some(Results {
                sent_count: 418,
                failed_count: 2,
                open_rate: 55.8,
                click_rate: 15.3,
            }),
        )?,
        campaign(
            "CPN-0A9B8C7D-6E5F-4A3B-8C1D-2E3F4A5B6C08",
            "Holiday Special Early Bird",
            "\u{1f384} Early Access to Holiday Deals!",
            &high_engagement,
            CampaignStatus::Draft,
            None,
            "2024-07-22",
            None,
        )?,
    ];

    for segment in [high_engagement, recent_signups, potential_churn, loyal_spenders] {
        db.segments().insert_segment(&segment).await?;
    }
    for campaign in &campaigns {
        db.campaigns().insert_campaign(campaign).await?;
    }

    tracing::info!(campaigns = campaigns.len(), "seeded sample data");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryDatabase;

    #[tokio::test]
    async fn seeds_empty_stores_once() {
        let db = MemoryDatabase::new();

        seed(&db).await.unwrap();
        seed(&db).await.unwrap();

        let segments = db.segments().fetch_segments().await.unwrap();
        let campaigns = db.campaigns().fetch_campaigns().await.unwrap();
        assert_eq!(segments.len(), 4);
        assert_eq!(campaigns.len(), 5);
        assert_eq!(campaigns[0].name, "Holiday Special Early Bird");
        assert_eq!(campaigns[4].name, "Summer Kick-off Sale");
    }

    #[tokio::test]
    async fn seeded_campaigns_snapshot_their_segment() {
        let db = MemoryDatabase::new();
        seed(&db).await.unwrap();

        let campaigns = db.campaigns().fetch_campaigns().await.unwrap();
        let welcome = campaigns
            .iter()
            .find(|c| c.name == "New User Welcome")
            .unwrap();

        assert_eq!(welcome.status, CampaignStatus::Scheduled);
        assert_eq!(welcome.target_segment_name.as_deref(), Some("Recent Signups"));
        assert_eq!(welcome.audience_size, Some(300));
        assert_eq!(welcome.sent_date, NaiveDate::from_ymd_opt(2024, 7, 25));
        assert!(campaigns.iter().all(|c| c.email_content.chars().count() >= 20));
    }
}
