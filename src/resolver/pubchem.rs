//! PubChem PUG REST クライアント
//!
//! 同期（blocking）reqwestクライアント。リトライ・バックオフはしない。
//! - 検索: `/compound/name/<name>/property/CanonicalSMILES/JSON`
//! - SDF:  `/compound/name/<name>/SDF?record_type=2d`

use super::{CompoundHit, CompoundSource, LookupError};
use reqwest::blocking::{Client, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyResponse {
    property_table: PropertyTable,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PropertyTable {
    #[serde(default)]
    properties: Vec<CompoundProperties>,
}

#[derive(Deserialize)]
struct CompoundProperties {
    #[serde(rename = "CID")]
    cid: u64,
    // PubChemはCanonicalSMILESをConnectivitySMILESとして返すことがある
    #[serde(rename = "CanonicalSMILES", alias = "ConnectivitySMILES", alias = "SMILES", default)]
    smiles: Option<String>,
}

/// PubChem APIクライアント
#[derive(Clone)]
pub struct PubChemClient {
    http: Client,
    base_url: String,
    record_type: String,
}

impl PubChemClient {
    /// `timeout` が None ならタイムアウトなし
    pub fn new(base_url: &str, record_type: &str, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let http = Client::builder()
            .user_agent(concat!("gcms-pipeline/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Unexpected(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            record_type: record_type.to_string(),
        })
    }

    /// `<base>/compound/name/<name>/<tail...>`（名前はパーセントエンコード）
    fn endpoint(&self, name: &str, tail: &[&str]) -> Result<Url, LookupError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| LookupError::Unexpected(format!("不正なURL {}: {}", self.base_url, e)))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| LookupError::Unexpected(format!("不正なURL: {}", self.base_url)))?;
            segments.pop_if_empty().extend(["compound", "name", name]).extend(tail);
        }
        Ok(url)
    }

    fn get(&self, url: Url) -> Result<Response, LookupError> {
        log::debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::NOT_FOUND => Err(LookupError::NotFound),
            status => {
                let message = response.text().unwrap_or_default();
                Err(LookupError::Http {
                    status: status.as_u16(),
                    message: fault_message(&message),
                })
            }
        }
    }
}

/// PubChemのFaultレスポンスから要約を取り出す
fn fault_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["Fault"]["Message"].as_str().map(String::from))
        .unwrap_or_else(|| body.chars().take(200).collect())
}

fn first_hit(response: PropertyResponse) -> Result<CompoundHit, LookupError> {
    let first = response
        .property_table
        .properties
        .into_iter()
        .next()
        .ok_or(LookupError::NotFound)?;
    Ok(CompoundHit {
        cid: first.cid,
        smiles: first.smiles.unwrap_or_else(|| gcms_common::NA.to_string()),
    })
}

impl CompoundSource for PubChemClient {
    fn lookup(&self, name: &str) -> Result<CompoundHit, LookupError> {
        let url = self.endpoint(name, &["property", "CanonicalSMILES", "JSON"])?;
        let response: PropertyResponse = self
            .get(url)?
            .json()
            .map_err(|e| LookupError::Unexpected(format!("レスポンス解析エラー: {}", e)))?;
        first_hit(response)
    }

    fn fetch_sdf(&self, name: &str) -> Result<Vec<u8>, LookupError> {
        let mut url = self.endpoint(name, &["SDF"])?;
        url.query_pairs_mut()
            .append_pair("record_type", &self.record_type);
        let bytes = self
            .get(url)?
            .bytes()
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
