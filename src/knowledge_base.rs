//! The `search_eks_troubleshoot_guide` tool.
//!
//! Sends the agent's question to the hosted EKS troubleshooting knowledge
//! base and hands back whatever text it answers with. Requests are signed
//! with SigV4 for API Gateway (`execute-api`) in `us-west-2`.

use std::sync::Arc;
use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::header::{HeaderName, HeaderValue};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const SEARCH_EKS_TROUBLESHOOT_GUIDE: &str = "search_eks_troubleshoot_guide";

pub const API_ENDPOINT: &str = "https://mcpserver.eks-beta.us-west-2.api.aws/";
pub const AWS_REGION: &str = "us-west-2";
pub const AWS_SERVICE: &str = "execute-api";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchTroubleshootGuideArgs {
    /// Question or symptom description to look up in the troubleshooting guide
    pub query: String,
}

#[derive(Debug, Serialize)]
struct Question<'a> {
    question: &'a str,
}

/// Adds authentication to an outgoing request.
#[async_trait]
pub trait RequestSigner: Send + Sync {
    async fn sign(&self, request: &mut reqwest::Request) -> Result<(), ApiError>;
}

/// SigV4 header signing with credentials from the AWS provider chain.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: Option<SharedCredentialsProvider>,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(
        credentials: Option<SharedCredentialsProvider>,
        region: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signer for the knowledge base using the SDK config's credentials.
    pub fn for_knowledge_base(config: &SdkConfig) -> Self {
        Self::new(config.credentials_provider(), AWS_REGION, AWS_SERVICE)
    }
}

#[async_trait]
impl RequestSigner for SigV4Signer {
    async fn sign(&self, request: &mut reqwest::Request) -> Result<(), ApiError> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or_else(|| ApiError::Credentials("no credentials provider configured".to_string()))?;
        let identity: Identity = provider
            .provide_credentials()
            .await
            .map_err(|e| ApiError::Credentials(e.to_string()))?
            .into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(&self.service)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| ApiError::invalid("SignRequest", e))?
            .into();

        let headers: Vec<(String, String)> = request
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = request
            .body()
            .and_then(|b| b.as_bytes())
            .unwrap_or_default();

        let signable = SignableRequest::new(
            request.method().as_str(),
            request.url().as_str(),
            headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            SignableBody::Bytes(body),
        )
        .map_err(|e| ApiError::invalid("SignRequest", e))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| ApiError::invalid("SignRequest", e))?
            .into_parts();

        let signed: Vec<(HeaderName, HeaderValue)> = instructions
            .headers()
            .map(|(name, value)| {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| ApiError::invalid("SignRequest", e))?;
                let value =
                    HeaderValue::from_str(value).map_err(|e| ApiError::invalid("SignRequest", e))?;
                Ok((name, value))
            })
            .collect::<Result<_, ApiError>>()?;

        for (name, value) in signed {
            request.headers_mut().insert(name, value);
        }
        Ok(())
    }
}

/// Serves `search_eks_troubleshoot_guide`.
#[derive(Clone)]
pub struct KnowledgeBaseHandler {
    http: reqwest::Client,
    endpoint: String,
    signer: Arc<dyn RequestSigner>,
}

impl KnowledgeBaseHandler {
    pub fn new(http: reqwest::Client, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            http,
            endpoint: API_ENDPOINT.to_string(),
            signer,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Search the EKS troubleshooting guide.
    ///
    /// Returns the knowledge base's answer verbatim, or `Error: ...` when
    /// the request fails.
    pub async fn search_eks_troubleshoot_guide(&self, query: &str) -> String {
        match self.ask(query).await {
            Ok(answer) => answer,
            Err(e) => {
                log::error!("Error in search_eks_troubleshoot_guide: {e}");
                format!("Error: {e}")
            }
        }
    }

    async fn ask(&self, query: &str) -> Result<String, ApiError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&Question { question: query })
            .build()
            .map_err(|e| ApiError::invalid("SearchTroubleshootGuide", e))?;

        self.signer.sign(&mut request).await?;

        log::debug!("Querying EKS knowledge base at {}", self.endpoint);

        let response = self
            .http
            .execute(request)
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| ApiError::request("SearchTroubleshootGuide", e))?;

        response
            .text()
            .await
            .map_err(|e| ApiError::request("SearchTroubleshootGuide", e))
    }
}
