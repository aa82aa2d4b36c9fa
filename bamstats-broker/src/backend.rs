//! Requests to a bamstats backend.
//!
//! [`Backend`] is the seam between the broker and the network: [`HttpBackend`] talks to
//! a real server over `reqwest`, while tests plug in scripted implementations.

use std::future::Future;

use log::debug;
use reqwest::{Client, Response, Url};
use serde::Serialize;
use serde_json::Value;

use bamstats_core::models::SampleWindow;
use bamstats_core::utils::AlignmentKind;

use crate::config::BackendConfig;
use crate::consts::{BAI_READ_DEPTH_ENDPOINT, CRAI_READ_DEPTH_ENDPOINT};
use crate::errors::BrokerError;

/// Incrementally readable response body.
pub trait ChunkStream: Send + 'static {
    /// Next chunk of the body, or `None` once the body is complete.
    fn next_chunk(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, BrokerError>> + Send;
}

pub trait Backend: Send + Sync + 'static {
    type Stream: ChunkStream;

    /// POST a JSON body to a backend endpoint and read the whole text response.
    fn post_text(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> impl Future<Output = Result<String, BrokerError>> + Send;

    /// POST a JSON body to a backend endpoint and stream its response.
    fn post_stream(
        &self,
        endpoint: &str,
        body: &Value,
    ) -> impl Future<Output = Result<Self::Stream, BrokerError>> + Send;

    /// GET an arbitrary text resource, such as a user-supplied interval file.
    fn get_text(&self, url: &str) -> impl Future<Output = Result<String, BrokerError>> + Send;
}

/// Body of the read-depth and header requests.
#[derive(Debug, Clone, Serialize)]
pub struct UrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionRequest<'a> {
    pub name: &'a str,
    pub start: u64,
    pub end: u64,
}

impl<'a> From<&'a SampleWindow> for RegionRequest<'a> {
    fn from(window: &'a SampleWindow) -> Self {
        RegionRequest {
            name: &window.reference_name,
            start: window.start,
            end: window.end,
        }
    }
}

/// Body of the streaming statistics request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRequest<'a> {
    pub url: &'a str,
    pub index_url: &'a str,
    pub regions: Vec<RegionRequest<'a>>,
}

///
/// Read-depth endpoint serving the index of the given alignment file.
///
pub fn coverage_endpoint(kind: AlignmentKind) -> &'static str {
    match kind {
        AlignmentKind::Bam => BAI_READ_DEPTH_ENDPOINT,
        AlignmentKind::Cram => CRAI_READ_DEPTH_ENDPOINT,
    }
}

///
/// Derive the index location of an alignment file by appending `.bai` (or `.crai`
/// for CRAM) to the path of its URL. Query strings are preserved. Locations that
/// don't parse as URLs have the suffix appended verbatim.
///
pub fn derive_index_url(source: &str) -> String {
    let suffix = AlignmentKind::detect(source).index_suffix();
    match Url::parse(source) {
        Ok(mut url) => {
            let path = format!("{}{}", url.path(), suffix);
            url.set_path(&path);
            url.to_string()
        }
        Err(_) => format!("{}{}", source, suffix),
    }
}

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    config: BackendConfig,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BrokerError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|source| BrokerError::Http {
                endpoint: config.base_url.clone(),
                source,
            })?;

        Ok(HttpBackend {
            client,
            config: config.clone(),
        })
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Response, BrokerError> {
        let url = self.config.endpoint(endpoint);
        debug!("POST {}", url);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|source| BrokerError::Http {
                endpoint: url.clone(),
                source,
            })?;
        check_status(url, response)
    }
}

fn check_status(url: String, response: Response) -> Result<Response, BrokerError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(BrokerError::Status {
            endpoint: url,
            status: status.as_u16(),
        })
    }
}

async fn read_text(url: &str, response: Response) -> Result<String, BrokerError> {
    response.text().await.map_err(|source| BrokerError::Http {
        endpoint: url.to_string(),
        source,
    })
}

impl Backend for HttpBackend {
    type Stream = HttpStream;

    async fn post_text(&self, endpoint: &str, body: &Value) -> Result<String, BrokerError> {
        let response = self.post(endpoint, body).await?;
        read_text(endpoint, response).await
    }

    async fn post_stream(&self, endpoint: &str, body: &Value) -> Result<HttpStream, BrokerError> {
        let response = self.post(endpoint, body).await?;
        Ok(HttpStream {
            endpoint: endpoint.to_string(),
            response,
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, BrokerError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| BrokerError::Http {
                endpoint: url.to_string(),
                source,
            })?;
        let response = check_status(url.to_string(), response)?;
        read_text(url, response).await
    }
}

/// Streaming body of an HTTP response.
#[derive(Debug)]
pub struct HttpStream {
    endpoint: String,
    response: Response,
}

impl ChunkStream for HttpStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, BrokerError> {
        let chunk = self
            .response
            .chunk()
            .await
            .map_err(|source| BrokerError::Http {
                endpoint: self.endpoint.clone(),
                source,
            })?;
        Ok(chunk.map(|bytes| bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    #[case("https://example.org/data/NA12878.bam", "https://example.org/data/NA12878.bam.bai")]
    #[case("https://example.org/data/NA12878.cram", "https://example.org/data/NA12878.cram.crai")]
    #[case(
        "https://example.org/data/NA12878.bam?sig=abc",
        "https://example.org/data/NA12878.bam.bai?sig=abc"
    )]
    #[case("NA12878.bam", "NA12878.bam.bai")]
    fn test_derive_index_url(#[case] source: &str, #[case] expected: &str) {
        assert_eq!(derive_index_url(source), expected);
    }

    #[rstest]
    fn test_coverage_endpoint() {
        assert_eq!(coverage_endpoint(AlignmentKind::Bam), "/baiReadDepth");
        assert_eq!(coverage_endpoint(AlignmentKind::Cram), "/craiReadDepth");
    }

    #[rstest]
    fn test_stats_request_body() {
        let windows = vec![SampleWindow {
            reference_name: "chr1".to_string(),
            start: 100,
            end: 10_100,
        }];
        let request = StatsRequest {
            url: "a.bam",
            index_url: "a.bam.bai",
            regions: windows.iter().map(RegionRequest::from).collect(),
        };

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "url": "a.bam",
                "indexUrl": "a.bam.bai",
                "regions": [{"name": "chr1", "start": 100, "end": 10100}],
            })
        );
    }
}
