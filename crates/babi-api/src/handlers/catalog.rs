//! Public catalog handlers.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use babi_models::{PlanCatalog, ToolInfo, ToolKind};

use crate::state::AppState;

/// Subscription plans and credit packs.
pub async fn list_plans(State(state): State<AppState>) -> Json<PlanCatalog> {
    Json(state.catalog.as_ref().clone())
}

#[derive(Debug, Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolInfo>,
}

pub async fn list_tools() -> Json<ToolsResponse> {
    Json(ToolsResponse {
        tools: ToolKind::ALL.iter().copied().map(ToolInfo::from).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_video_generation_is_available() {
        let Json(response) = tokio_test::block_on(list_tools());
        let available: Vec<_> = response
            .tools
            .iter()
            .filter(|t| t.available)
            .map(|t| t.id)
            .collect();
        assert_eq!(available, vec![ToolKind::VideoGeneration]);
    }
}
