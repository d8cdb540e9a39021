//! Reqwest-backed gateway for the league server's JSON routes.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::{SyncError, SyncGateway};
use crate::config::ServerConfig;
use crate::models::{
    AvailabilityRecord, AvailabilityResponse, CaptainUpdate, Event, EventPayload, EventsResponse,
    FlightId, PlayerId, StatusResponse, TimeSlotId,
};

/// Gateway that talks to the league server over HTTP.
pub struct HttpGateway {
    client: Client,
    base_url: Url,
}

impl HttpGateway {
    /// Build a gateway from server configuration.
    pub fn new(config: &ServerConfig) -> Result<Self, SyncError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: normalize_base(&config.base_url)?,
        })
    }

    fn url(&self, path: &str) -> Result<Url, SyncError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, SyncError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// POST where only the status code matters.
    async fn post_ack<B>(&self, url: Url, body: &B) -> Result<(), SyncError>
    where
        B: Serialize + ?Sized + Sync,
    {
        debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

/// `Url::join` drops the last path segment unless the base ends in '/'.
fn normalize_base(base: &str) -> Result<Url, url::ParseError> {
    if base.ends_with('/') {
        Url::parse(base)
    } else {
        Url::parse(&format!("{}/", base))
    }
}

async fn check_status(response: Response) -> Result<Response, SyncError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(SyncError::HttpStatus {
        status: status.as_u16(),
        message: if body.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            body
        },
    })
}

#[async_trait]
impl SyncGateway for HttpGateway {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch_events(&self, flight: FlightId) -> Result<Vec<Event>, SyncError> {
        let url = self.url(&format!("flights/{}/events/get", flight))?;
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let parsed: EventsResponse = check_status(response).await?.json().await?;

        match parsed.error {
            Some(message) => Err(SyncError::Server(message)),
            None => Ok(parsed.events),
        }
    }

    async fn fetch_availability(
        &self,
        player: PlayerId,
        flight: FlightId,
    ) -> Result<Vec<AvailabilityRecord>, SyncError> {
        let mut url = self.url(&format!("players/{}/getAvailability", player))?;
        url.query_pairs_mut()
            .append_pair("flight_id", &flight.to_string());

        let parsed: AvailabilityResponse = self.post_json(url, &serde_json::json!({})).await?;
        Ok(parsed.availability)
    }

    async fn create_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        let url = self.url(&format!("timeslot/{}/events/new", payload.timeslot))?;
        self.post_ack(url, payload).await
    }

    async fn delete_event(&self, payload: &EventPayload) -> Result<(), SyncError> {
        let url = self.url(&format!("timeslot/{}/events/delete", payload.timeslot))?;
        self.post_ack(url, payload).await
    }

    async fn update_captain(
        &self,
        timeslot: TimeSlotId,
        update: &CaptainUpdate,
    ) -> Result<StatusResponse, SyncError> {
        let url = self.url(&format!("timeslot/{}/events/updateCaptain", timeslot))?;
        self.post_json(url, update).await
    }
}
