//! Marketing API ad campaign endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{Ack, CreatedId, MetaApi, MetaApiError, Page};

const CAMPAIGN_FIELDS: &str = "id,name,objective,status,daily_budget,created_time";

const INSIGHT_FIELDS: &str = "impressions,reach,clicks,spend,ctr,cpc";

/// Status Meta accepts for a campaign.
pub mod ad_statuses {
    pub const ACTIVE: &str = "ACTIVE";
    pub const PAUSED: &str = "PAUSED";

    pub const ALL: &[&str] = &[ACTIVE, PAUSED];
}

/// A campaign as listed by `GET /act_{id}/campaigns`.
///
/// Budgets come back as strings in the account currency's minor unit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AdCampaign {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub objective: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub daily_budget: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
}

/// Parameters for creating a campaign.
#[derive(Debug, Clone)]
pub struct NewAdCampaign<'a> {
    pub name: &'a str,
    pub objective: &'a str,
    /// Minor currency units.
    pub daily_budget: Option<i64>,
    pub status: &'a str,
}

/// Graph ad account path segment (`act_` prefix added when missing).
pub fn ad_account_path(ad_account_id: &str) -> String {
    if ad_account_id.starts_with("act_") {
        ad_account_id.to_string()
    } else {
        format!("act_{ad_account_id}")
    }
}

impl MetaApi {
    pub async fn list_ad_campaigns(
        &self,
        token: &str,
        ad_account_id: &str,
    ) -> Result<Vec<AdCampaign>, MetaApiError> {
        let page: Page<AdCampaign> = self
            .get_json(
                token,
                &format!("{}/campaigns", ad_account_path(ad_account_id)),
                &[("fields", CAMPAIGN_FIELDS)],
            )
            .await?;
        Ok(page.data)
    }

    /// Create a campaign. Returns Meta's campaign id.
    pub async fn create_ad_campaign(
        &self,
        token: &str,
        ad_account_id: &str,
        campaign: &NewAdCampaign<'_>,
    ) -> Result<CreatedId, MetaApiError> {
        let mut body = json!({
            "name": campaign.name,
            "objective": campaign.objective,
            "status": campaign.status,
            "special_ad_categories": [],
        });
        if let Some(budget) = campaign.daily_budget {
            body["daily_budget"] = json!(budget);
        }
        self.post_json(
            token,
            &format!("{}/campaigns", ad_account_path(ad_account_id)),
            &body,
        )
        .await
    }

    pub async fn update_ad_campaign_status(
        &self,
        token: &str,
        campaign_id: &str,
        status: &str,
    ) -> Result<Ack, MetaApiError> {
        self.post_json(token, campaign_id, &json!({ "status": status }))
            .await
    }

    /// Lifetime insight rows for a campaign (empty before any delivery).
    pub async fn get_ad_insights(
        &self,
        token: &str,
        campaign_id: &str,
    ) -> Result<Vec<Value>, MetaApiError> {
        let page: Page<Value> = self
            .get_json(
                token,
                &format!("{campaign_id}/insights"),
                &[("fields", INSIGHT_FIELDS), ("date_preset", "maximum")],
            )
            .await?;
        Ok(page.data)
    }
}
