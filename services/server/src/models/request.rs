//! Item request model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::item::Item;

/// Standing ask for an item nobody lists yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRequest {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: NaiveDateTime,
}

/// New item request payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItemRequest {
    pub description: String,
}

/// Response for item request operations, with the items answering it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequestResponse {
    pub id: i64,
    pub description: String,
    pub requestor_id: i64,
    pub created: NaiveDateTime,
    pub items: Vec<Item>,
}

impl ItemRequestResponse {
    pub fn new(request: ItemRequest, items: Vec<Item>) -> Self {
        ItemRequestResponse {
            id: request.id,
            description: request.description,
            requestor_id: request.requestor_id,
            created: request.created,
            items,
        }
    }
}
