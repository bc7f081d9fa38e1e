use axum::{extract::State, Json};
use std::sync::Arc;

use crate::config::ServiceRole;
use crate::AppState;
use super::interface::ApiError;
use super::schema::{ActionResponse, Item, ItemsResponse};

const ITEM_COUNT: u32 = 10;

// =============================================================================
// GET /api/items - List catalog items
// =============================================================================

pub async fn list_items(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ItemsResponse>, ApiError> {
    let simulation = &state.simulation;

    let delay = simulation.latency(simulation.config().items_max_latency_ms);
    tokio::time::sleep(delay).await;

    if simulation.should_fail() {
        return Err(ApiError::Simulated);
    }

    let items = (1..=ITEM_COUNT)
        .map(|id| Item {
            id,
            name: format!("Item {}", id),
            price: simulation.between(10..110),
        })
        .collect();

    Ok(Json(ItemsResponse {
        service: state.config.service_name.clone(),
        items,
    }))
}

// =============================================================================
// POST /api/action - Perform a simulated business action
// =============================================================================

pub async fn perform_action(State(state): State<Arc<AppState>>) -> Json<ActionResponse> {
    let simulation = &state.simulation;

    let delay = simulation.latency(simulation.config().action_max_latency_ms);
    tokio::time::sleep(delay).await;

    if state.config.role == ServiceRole::Order {
        let amount = simulation.between(20..220);
        state.business_metrics.record_order(amount as f64);
        tracing::debug!("Order recorded: {} EUR", amount);
    }

    Json(ActionResponse {
        success: true,
        service: state.config.service_name.clone(),
    })
}
