//! Wire types for the synthesis backend

use crate::citations::Citation;
use serde::{Deserialize, Serialize};

/// Request body for `POST {api_base}/process`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub prompt: String,
}

/// Response body for `POST {api_base}/process`
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    #[serde(default)]
    pub design: Option<DesignResult>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Response body for `GET {api_base}/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// A generated design concept
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignResult {
    pub name: String,
    #[serde(alias = "product_type")]
    pub product_type: String,
    #[serde(alias = "target_market")]
    pub target_market: String,
    pub scores: DesignScores,
    #[serde(default)]
    pub features: Vec<DesignFeature>,
    #[serde(default, alias = "leonardoPrinciples", alias = "leonardo_principles")]
    pub principles: Vec<String>,
    #[serde(default, alias = "references")]
    pub citations: Vec<Citation>,
}

/// Scores on a 0-10 scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignScores {
    pub innovation: f64,
    pub feasibility: f64,
    pub viability: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignFeature {
    pub description: String,
    #[serde(alias = "development_stage", alias = "stage")]
    pub development_stage: String,
    #[serde(alias = "engineering_note")]
    pub engineering_note: String,
    #[serde(default, alias = "leonardoInspiration", alias = "leonardo_inspiration")]
    pub inspiration: String,
}
