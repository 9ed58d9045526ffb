//! Airtime, mobile data, and TV subscription purchases.

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::client::{ApiClient, ApiError};

/// Mobile networks the top-up service recognizes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mtn,
    Airtel,
    Glo,
    #[serde(rename = "9mobile")]
    #[value(name = "9mobile")]
    NineMobile,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mtn => "mtn",
            Network::Airtel => "airtel",
            Network::Glo => "glo",
            Network::NineMobile => "9mobile",
        }
    }
}

/// TV providers the subscription service recognizes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TvProvider {
    Dstv,
    Gotv,
    Startimes,
}

impl TvProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            TvProvider::Dstv => "dstv",
            TvProvider::Gotv => "gotv",
            TvProvider::Startimes => "startimes",
        }
    }
}

/// A purchasable data bundle. `amount` is the price in kobo.
#[derive(Deserialize, Debug, Clone)]
pub struct DataPlan {
    pub id: String,
    pub name: String,
    pub amount: i64,
    pub validity: String,
}

/// A purchasable TV bouquet. `amount` is the price in kobo.
#[derive(Deserialize, Debug, Clone)]
pub struct TvPackage {
    pub code: String,
    pub name: String,
    pub amount: i64,
}

/// Who a smartcard belongs to, shown before buying a subscription
/// for someone else's decoder.
#[derive(Deserialize, Debug, Clone)]
pub struct SmartcardOwner {
    pub customer_name: String,
}

#[derive(Serialize, Debug)]
pub struct AirtimeRequest<'a> {
    pub phone: &'a str,
    pub network: Network,
    pub amount: i64,
    pub pin: &'a str,
}

#[derive(Serialize, Debug)]
pub struct DataRequest<'a> {
    pub phone: &'a str,
    pub network: Network,
    pub plan_id: &'a str,
    pub pin: &'a str,
}

#[derive(Serialize, Debug)]
pub struct TvRequest<'a> {
    pub provider: TvProvider,
    pub smartcard: &'a str,
    pub package_code: &'a str,
    pub pin: &'a str,
}

/// Receipt shared by all three purchase endpoints.
#[derive(Deserialize, Debug, Clone)]
pub struct TopupReceipt {
    pub reference: String,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl ApiClient {
    pub async fn buy_airtime(&self, req: &AirtimeRequest<'_>) -> Result<TopupReceipt, ApiError> {
        self.post_json("/topup/airtime", req).await
    }

    pub async fn data_plans(&self, network: Network) -> Result<Vec<DataPlan>, ApiError> {
        self.get_json_query("/topup/data/plans", &[("network", network.as_str())])
            .await
    }

    pub async fn buy_data(&self, req: &DataRequest<'_>) -> Result<TopupReceipt, ApiError> {
        self.post_json("/topup/data", req).await
    }

    pub async fn tv_packages(&self, provider: TvProvider) -> Result<Vec<TvPackage>, ApiError> {
        self.get_json_query("/topup/tv/packages", &[("provider", provider.as_str())])
            .await
    }

    /// Resolves a smartcard number to its owner, so the buyer can confirm
    /// the decoder before paying.
    pub async fn validate_smartcard(
        &self,
        provider: TvProvider,
        smartcard: &str,
    ) -> Result<SmartcardOwner, ApiError> {
        self.get_json_query(
            "/topup/tv/validate",
            &[("provider", provider.as_str()), ("smartcard", smartcard)],
        )
        .await
    }

    pub async fn buy_tv(&self, req: &TvRequest<'_>) -> Result<TopupReceipt, ApiError> {
        self.post_json("/topup/tv", req).await
    }
}
