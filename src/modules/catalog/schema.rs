use serde::{Deserialize, Serialize};

// =============================================================================
// ITEMS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    pub price: u32,
}

// Response for GET /api/items
#[derive(Debug, Serialize, Deserialize)]
pub struct ItemsResponse {
    pub service: String,
    pub items: Vec<Item>,
}

// =============================================================================
// ACTION
// =============================================================================

// Response for POST /api/action
#[derive(Debug, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub service: String,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
