//! Client for the remote `ai-analysis` procedure. The analysis payload
//! is opaque: it is passed through without interpretation, and failures
//! surface as an unsuccessful outcome rather than an error. No retries.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisKind {
    WellnessAnalysis,
    BurnoutPrediction,
    TeamInsights,
    Recommendations,
}

impl AnalysisKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AnalysisKind::WellnessAnalysis => "wellness_analysis",
            AnalysisKind::BurnoutPrediction => "burnout_prediction",
            AnalysisKind::TeamInsights => "team_insights",
            AnalysisKind::Recommendations => "recommendations",
        }
    }
}

#[derive(Serialize)]
struct AnalysisRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a Value,
    tenant_id: Uuid,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AnalysisOutcome {
    pub success: bool,
    #[serde(default)]
    pub analysis: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisOutcome {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            analysis: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Clone)]
pub struct AiClient {
    endpoint: Option<String>,
    http: reqwest::Client,
}

impl AiClient {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(std::env::var("AI_ANALYSIS_URL").ok())
    }

    pub async fn analyze(&self, kind: AnalysisKind, data: &Value, tenant_id: Uuid) -> AnalysisOutcome {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return AnalysisOutcome::failure("ai-analysis endpoint is not configured");
        };
        let payload = AnalysisRequest {
            kind: kind.as_str(),
            data,
            tenant_id,
        };
        let response = match self.http.post(endpoint).json(&payload).send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "ai-analysis call failed");
                return AnalysisOutcome::failure(format!("ai-analysis unreachable: {}", err));
            }
        };
        let response = match response.error_for_status() {
            Ok(response) => response,
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "ai-analysis returned an error status");
                return AnalysisOutcome::failure(format!("ai-analysis failed: {}", err));
            }
        };
        match response.json::<AnalysisOutcome>().await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(kind = kind.as_str(), error = %err, "ai-analysis response was not decodable");
                AnalysisOutcome::failure(format!("ai-analysis response invalid: {}", err))
            }
        }
    }
}
