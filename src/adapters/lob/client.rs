//! HTTP adapter for the `MailClient` port.
//!
//! Every operation is a single call against the Lob API. The key for the
//! live environment is used only for real physical sends; previews, digital
//! sends, and deliverability probes run against the test environment.

use async_trait::async_trait;
use reqwest::{multipart, StatusCode};

use crate::config::MailConfig;
use crate::domain::postcard::COMMUNITY_ADDRESS;
use crate::ports::{
    AddressDetails, CreatedAddress, CreatedPostcard, Deliverability, MailClient, MailError,
    NewAddress, PostcardAddress, PostcardRequest, PostcardSummary,
};

use super::types::{
    parse_deliverability, AddressMetadata, CreateAddressBody, DeleteAddressBody,
    PostcardListBody, ProbeBody, ProviderErrorEnvelope,
};

/// Lob API client.
pub struct LobClient {
    config: MailConfig,
    http_client: reqwest::Client,
}

impl LobClient {
    pub fn new(config: MailConfig, http_client: reqwest::Client) -> Self {
        Self {
            config,
            http_client,
        }
    }

    fn url(&self, route: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), route)
    }

    /// Lob authenticates with the API key as the basic-auth username and an
    /// empty password.
    fn auth(&self, builder: reqwest::RequestBuilder, live: bool) -> reqwest::RequestBuilder {
        builder.basic_auth(self.config.key_for(live), Some(""))
    }

    /// Convert a non-2xx response into the appropriate `MailError`.
    async fn error_from_response(&self, response: reqwest::Response) -> MailError {
        let status = response.status();
        if status.is_server_error() {
            return MailError::Unavailable {
                status: status.as_u16(),
            };
        }
        match response.json::<ProviderErrorEnvelope>().await {
            Ok(envelope) => MailError::Rejected {
                status: status.as_u16(),
                message: envelope.error.message,
                code: envelope.error.code,
            },
            Err(e) => MailError::MalformedResponse(format!(
                "undecodable error body for status {status}: {e}"
            )),
        }
    }

    fn postcard_form(request: &PostcardRequest) -> multipart::Form {
        let front = multipart::Part::bytes(request.front_image.clone()).file_name("user-upload");

        let mut form = multipart::Form::new()
            .part("front", front)
            .text("back", request.back_html.clone());

        form = write_address_fields(form, "from", &request.from);
        form = write_address_fields(form, "to", &request.to);

        form.text("metadata[to_rc_id]", request.to_member_id.to_string())
            .text("metadata[from_rc_id]", request.from_member_id.to_string())
            .text("metadata[mode]", request.mode.clone())
    }
}

fn write_address_fields(
    form: multipart::Form,
    side: &str,
    address: &PostcardAddress,
) -> multipart::Form {
    match address {
        PostcardAddress::Reference(id) => form.text(side.to_string(), id.clone()),
        PostcardAddress::Inline {
            name,
            line1,
            line2,
            city,
            state,
            zip,
        } => form
            .text(format!("{side}[name]"), name.clone())
            .text(format!("{side}[address_line1]"), line1.clone())
            .text(format!("{side}[address_line2]"), line2.clone())
            .text(format!("{side}[address_city]"), city.clone())
            .text(format!("{side}[address_state]"), state.clone())
            .text(format!("{side}[address_zip]"), zip.clone()),
    }
}

#[async_trait]
impl MailClient for LobClient {
    async fn create_address(
        &self,
        address: &NewAddress,
        owner_id: i64,
        live: bool,
    ) -> Result<CreatedAddress, MailError> {
        let body = CreateAddressBody {
            name: address.name.clone(),
            address_line1: address.line1.clone(),
            address_line2: address.line2.clone(),
            address_city: address.city.clone(),
            address_state: address.state.clone(),
            address_zip: address.zip.clone(),
            metadata: AddressMetadata {
                rc_id: owner_id.to_string(),
            },
        };

        let response = self
            .auth(self.http_client.post(self.url("addresses")), live)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }
        response
            .json::<CreatedAddress>()
            .await
            .map_err(|e| MailError::MalformedResponse(e.to_string()))
    }

    async fn get_address(
        &self,
        address_id: &str,
        live: bool,
    ) -> Result<AddressDetails, MailError> {
        let response = self
            .auth(
                self.http_client
                    .get(self.url(&format!("addresses/{address_id}"))),
                live,
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }
        response
            .json::<AddressDetails>()
            .await
            .map_err(|e| MailError::MalformedResponse(e.to_string()))
    }

    async fn delete_address(&self, address_id: &str, live: bool) -> Result<(), MailError> {
        let response = self
            .auth(
                self.http_client
                    .delete(self.url(&format!("addresses/{address_id}"))),
                live,
            )
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }
        let body = response
            .json::<DeleteAddressBody>()
            .await
            .map_err(|e| MailError::MalformedResponse(e.to_string()))?;
        tracing::debug!(address_id = %body.address_id, deleted = body.deleted, "address deleted");
        Ok(())
    }

    async fn verify_deliverability(
        &self,
        address: &NewAddress,
    ) -> Result<Deliverability, MailError> {
        // Probe by creating a test-environment postcard to the candidate
        // address: 200 means deliverable, 422 means the provider refused
        // the destination.
        let form = multipart::Form::new()
            .text("front", "<body>Hello!</body>")
            .text("back", "<body>Goodbye!</body>")
            .text("from[name]", COMMUNITY_ADDRESS.name)
            .text("from[address_line1]", COMMUNITY_ADDRESS.line1)
            .text("from[address_line2]", COMMUNITY_ADDRESS.line2)
            .text("from[address_city]", COMMUNITY_ADDRESS.city)
            .text("from[address_state]", COMMUNITY_ADDRESS.state)
            .text("from[address_zip]", COMMUNITY_ADDRESS.zip)
            .text("to[name]", address.name.clone())
            .text("to[address_line1]", address.line1.clone())
            .text("to[address_line2]", address.line2.clone())
            .text("to[address_city]", address.city.clone())
            .text("to[address_state]", address.state.clone())
            .text("to[address_zip]", address.zip.clone())
            .text("metadata[mode]", "verification");

        let response = self
            .auth(self.http_client.post(self.url("postcards")), false)
            .multipart(form)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .json::<ProbeBody>()
                    .await
                    .map_err(|e| MailError::MalformedResponse(e.to_string()))?;
                Ok(body
                    .deliverability
                    .as_deref()
                    .map(parse_deliverability)
                    .unwrap_or(Deliverability::Deliverable))
            }
            StatusCode::UNPROCESSABLE_ENTITY => Ok(Deliverability::Undeliverable),
            _ => Err(self.error_from_response(response).await),
        }
    }

    async fn create_postcard(
        &self,
        request: &PostcardRequest,
    ) -> Result<CreatedPostcard, MailError> {
        let form = Self::postcard_form(request);

        let response = self
            .auth(self.http_client.post(self.url("postcards")), request.live)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }
        response
            .json::<CreatedPostcard>()
            .await
            .map_err(|e| MailError::MalformedResponse(e.to_string()))
    }

    async fn list_postcards(
        &self,
        recipient_id: i64,
        live: bool,
    ) -> Result<Vec<PostcardSummary>, MailError> {
        let response = self
            .auth(self.http_client.get(self.url("postcards")), live)
            .query(&[("metadata[to_rc_id]", recipient_id.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(self.error_from_response(response).await);
        }
        let body = response
            .json::<PostcardListBody>()
            .await
            .map_err(|e| MailError::MalformedResponse(e.to_string()))?;

        Ok(body
            .data
            .into_iter()
            .map(|item| PostcardSummary {
                id: item.id,
                url: item.url,
                from_member_id: item.metadata.from_rc_id,
                to_member_id: item.metadata.to_rc_id,
                mode: item.metadata.mode,
                date_created: item.date_created,
                expected_delivery_date: item.expected_delivery_date,
            })
            .collect())
    }
}
