use anyhow::{anyhow, bail, Context, Result};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use ragdb_core::config::{api_key_from_env, EmbeddingSettings};
use ragdb_core::traits::Embedder;

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

/// Embedder backed by an OpenAI-compatible `/v1/embeddings` endpoint.
///
/// Returned vectors are L2-normalised locally, since not every server does.
pub struct RemoteEmbedder {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dim: usize,
    max_len: usize,
}

impl RemoteEmbedder {
    pub fn from_settings(settings: &EmbeddingSettings, dim: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            client,
            url: format!("{}/v1/embeddings", settings.base_url.trim_end_matches('/')),
            model: settings.model.clone(),
            api_key: api_key_from_env(settings.api_key_env.as_deref()),
            dim,
            max_len: settings.max_len,
        })
    }
}

impl Embedder for RemoteEmbedder {
    fn dim(&self) -> usize { self.dim }

    fn max_len(&self) -> usize { self.max_len }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut req = self.client.post(&self.url).json(&EmbeddingsRequest { model: &self.model, input: texts });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }
        let response = req.send().with_context(|| format!("POST {}", self.url))?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            bail!("embeddings endpoint returned HTTP {}: {}", status, body);
        }
        let mut parsed: EmbeddingsResponse = response.json().context("decoding embeddings response")?;
        if parsed.data.len() != texts.len() {
            bail!("embeddings endpoint returned {} vectors for {} texts", parsed.data.len(), texts.len());
        }
        parsed.data.sort_by_key(|d| d.index.unwrap_or(usize::MAX));

        parsed
            .data
            .into_iter()
            .map(|d| {
                if d.embedding.len() != self.dim {
                    return Err(anyhow!(
                        "embedding has dimension {}, expected {}",
                        d.embedding.len(),
                        self.dim
                    ));
                }
                Ok(normalize(d.embedding))
            })
            .collect()
    }
}

fn normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut v { *x /= norm; }
    }
    v
}
