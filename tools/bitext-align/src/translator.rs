//! Azure Translator client used to translate chapter abstracts.

use std::time::Duration;

use anyhow::{Context, Result};
use bitext::Translator;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Global Azure Translator endpoint.
pub const ENDPOINT: &str = "https://api.cognitive.microsofttranslator.com";

#[derive(Serialize)]
struct RequestItem<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponseItem {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    text: String,
}

/// Translates text through the Azure Translator REST API (v3).
pub struct AzureTranslator {
    client: Client,
    endpoint: String,
    key: String,
    region: String,
    from: String,
    to: String,
}

impl AzureTranslator {
    pub fn new(key: String, region: String, from: String, to: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            endpoint: ENDPOINT.to_string(),
            key,
            region,
            from,
            to,
        })
    }

    /// Sends requests to `endpoint` instead of the global one.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn request(&self, text: &str) -> Result<String> {
        let url = format!("{}/translate", self.endpoint.trim_end_matches('/'));
        let response: Vec<ResponseItem> = self
            .client
            .post(url)
            .query(&[
                ("api-version", "3.0"),
                ("from", self.from.as_str()),
                ("to", self.to.as_str()),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header("Ocp-Apim-Subscription-Region", &self.region)
            .json(&[RequestItem { text }])
            .send()?
            .error_for_status()?
            .json()?;

        first_translation(response).context("response carried no translation")
    }
}

impl Translator for AzureTranslator {
    fn translate(&self, text: &str) -> String {
        match self.request(text) {
            Ok(translation) => translation,
            Err(e) => {
                warn!(error = %e, "translation failed, keeping paragraph untranslated");
                String::new()
            }
        }
    }
}

fn first_translation(response: Vec<ResponseItem>) -> Option<String> {
    response
        .into_iter()
        .next()?
        .translations
        .into_iter()
        .next()
        .map(|t| t.text)
}
