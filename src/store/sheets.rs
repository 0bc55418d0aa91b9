//! Google Sheets backend (Sheets API v4).

use super::auth::{ServiceAccountKey, TokenProvider};
use super::{
    locate_row, records_from_grid, FleetStore, StatusUpdate, StoreInfo, TableNames, ID_COLUMN,
    NAME_COLUMN, STATUS_COLUMN,
};
use crate::config::SheetsSettings;
use crate::error::{Result, SkylarkError};
use crate::fleet::FleetSnapshot;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/";

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchValueRanges {
    #[serde(default)]
    value_ranges: Vec<ValueRange>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetMeta {
    properties: SpreadsheetProperties,
}

/// Fleet store backed by a Google spreadsheet.
pub struct SheetsStore {
    http: reqwest::Client,
    auth: TokenProvider,
    base_url: Url,
    spreadsheet_id: String,
    tables: TableNames,
}

impl SheetsStore {
    /// Create a store from settings and the service account key on disk.
    pub fn from_settings(settings: &SheetsSettings, key_path: &Path) -> Result<Self> {
        if settings.spreadsheet_id.trim().is_empty() {
            return Err(SkylarkError::Config(
                "sheets.spreadsheet_id is not set".to_string(),
            ));
        }

        let key = ServiceAccountKey::from_file(key_path)?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Self::with_base_url(
            key,
            http,
            SHEETS_API_BASE,
            settings.spreadsheet_id.trim(),
            TableNames::from(settings),
        )
    }

    /// Create a store that talks to a Sheets-compatible API at `base_url`.
    pub fn with_base_url(
        key: ServiceAccountKey,
        http: reqwest::Client,
        base_url: &str,
        spreadsheet_id: &str,
        tables: TableNames,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| SkylarkError::Config(format!("Invalid Sheets API base {}: {}", base_url, e)))?;

        Ok(Self {
            auth: TokenProvider::new(key, http.clone()),
            http,
            base_url,
            spreadsheet_id: spreadsheet_id.to_string(),
            tables,
        })
    }

    /// Service account the store authenticates as.
    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        spreadsheet_url(&self.base_url, &self.spreadsheet_id, segments)
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url);
        let token = self.auth.token().await?;
        let response = self.http.get(url).bearer_auth(token).send().await?;
        parse_response(response).await
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = self.url(&["values", range])?;
        let body: ValueRange = self.get(url).await?;
        Ok(body.values)
    }

    async fn put_value(&self, range: &str, value: &str) -> Result<()> {
        let mut url = self.url(&["values", range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");

        debug!("PUT {}", url);
        let token = self.auth.token().await?;
        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [[value]],
            }))
            .send()
            .await?;
        let _: serde_json::Value = parse_response(response).await?;
        Ok(())
    }
}

#[async_trait]
impl FleetStore for SheetsStore {
    async fn fetch_all(&self) -> Result<FleetSnapshot> {
        let mut url = self.url(&["values:batchGet"])?;
        {
            let mut query = url.query_pairs_mut();
            for tab in self.tables.all() {
                query.append_pair("ranges", &quote_tab(tab));
            }
        }

        let body: BatchValueRanges = self.get(url).await?;
        let mut grids = body.value_ranges.into_iter().map(|r| r.values);
        let mut next = || grids.next().unwrap_or_default();
        let (pilots, drones, missions) = (next(), next(), next());

        Ok(FleetSnapshot::from_rows(
            records_from_grid(&pilots),
            records_from_grid(&drones),
            records_from_grid(&missions),
        ))
    }

    async fn update_pilot_status(&self, pilot_id: &str, new_status: &str) -> Result<StatusUpdate> {
        let tab = &self.tables.pilots;
        let column = column_letter(ID_COLUMN);
        let ids: Vec<String> = self
            .get_values(&format!("{}!{}:{}", quote_tab(tab), column, column))
            .await?
            .into_iter()
            .map(|row| row.into_iter().next().unwrap_or_default())
            .collect();

        let Some(row) = locate_row(&ids, pilot_id) else {
            return Ok(StatusUpdate::NotFound {
                pilot_id: pilot_id.to_string(),
            });
        };

        self.put_value(&cell_range(tab, row, STATUS_COLUMN), new_status)
            .await?;
        info!("Updated {} status to '{}' at row {}", pilot_id, new_status, row);

        // Read back so the confirmation reflects what the sheet now holds.
        let readback = self
            .get_values(&format!(
                "{}!{}{}:{}{}",
                quote_tab(tab),
                column_letter(NAME_COLUMN),
                row,
                column_letter(STATUS_COLUMN),
                row
            ))
            .await?;
        let cells = readback.into_iter().next().unwrap_or_default();
        let at = |column: usize| {
            cells
                .get(column - NAME_COLUMN)
                .cloned()
                .unwrap_or_default()
        };

        Ok(StatusUpdate::Verified {
            pilot_id: pilot_id.to_string(),
            name: at(NAME_COLUMN),
            status: at(STATUS_COLUMN),
            row,
        })
    }

    async fn describe(&self) -> Result<StoreInfo> {
        let mut url = self.url(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "properties.title,sheets.properties.title");

        let meta: SpreadsheetMeta = self.get(url).await?;
        Ok(StoreInfo {
            title: meta.properties.title,
            tabs: meta.sheets.into_iter().map(|s| s.properties.title).collect(),
        })
    }
}

async fn parse_response<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(SkylarkError::Sheets(format!("{}: {}", status, body.trim())));
    }
    Ok(response.json().await?)
}

fn spreadsheet_url(base: &Url, spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| SkylarkError::Config(format!("Invalid Sheets API base: {}", base)))?
        .pop_if_empty()
        .push("spreadsheets")
        .push(spreadsheet_id)
        .extend(segments);
    Ok(url)
}

/// Column number (1-based) to A1 letters.
fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Tab name quoted for A1 notation.
fn quote_tab(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

fn cell_range(tab: &str, row: usize, column: usize) -> String {
    format!("{}!{}{}", quote_tab(tab), column_letter(column), row)
}
