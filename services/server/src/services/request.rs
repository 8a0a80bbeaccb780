//! Item requests and the items answering them

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::{
    clock::Clock,
    error::{ServerError, ServerResult},
    models::{
        item::Item,
        request::{ItemRequest, ItemRequestResponse, NewItemRequest},
    },
    repositories::Repositories,
    services::{require_user, resolve_page},
};

#[derive(Clone)]
pub struct RequestService {
    repositories: Repositories,
    clock: Arc<dyn Clock>,
}

impl RequestService {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            clock,
        }
    }

    pub async fn create(
        &self,
        requestor_id: i64,
        new_request: NewItemRequest,
    ) -> ServerResult<ItemRequestResponse> {
        require_user(self.repositories.users.as_ref(), requestor_id).await?;

        let request = self
            .repositories
            .requests
            .create(requestor_id, &new_request.description, self.clock.now())
            .await?;

        info!("User {} opened request {}", requestor_id, request.id);
        Ok(ItemRequestResponse::new(request, Vec::new()))
    }

    pub async fn get(
        &self,
        request_id: i64,
        requestor_id: i64,
    ) -> ServerResult<ItemRequestResponse> {
        require_user(self.repositories.users.as_ref(), requestor_id).await?;

        let request = self
            .repositories
            .requests
            .find_by_id(request_id)
            .await?
            .ok_or(ServerError::RequestNotFound(request_id))?;

        let mut responses = self.with_items(vec![request]).await?;
        responses
            .pop()
            .ok_or(ServerError::RequestNotFound(request_id))
    }

    /// Requests the user authored, newest first
    pub async fn list_own(&self, requestor_id: i64) -> ServerResult<Vec<ItemRequestResponse>> {
        require_user(self.repositories.users.as_ref(), requestor_id).await?;

        let requests = self
            .repositories
            .requests
            .find_by_requestor(requestor_id)
            .await?;
        self.with_items(requests).await
    }

    /// Everybody else's requests, newest first
    pub async fn list_others(
        &self,
        requestor_id: i64,
        from: Option<i64>,
        size: Option<i64>,
    ) -> ServerResult<Vec<ItemRequestResponse>> {
        let page = resolve_page(from, size)?;
        require_user(self.repositories.users.as_ref(), requestor_id).await?;

        let requests = self
            .repositories
            .requests
            .find_by_other_requestors(requestor_id, page)
            .await?;
        self.with_items(requests).await
    }

    async fn with_items(
        &self,
        requests: Vec<ItemRequest>,
    ) -> ServerResult<Vec<ItemRequestResponse>> {
        let ids: Vec<i64> = requests.iter().map(|r| r.id).collect();

        let mut answers: HashMap<i64, Vec<Item>> = HashMap::new();
        for item in self.repositories.items.find_by_request_ids(&ids).await? {
            if let Some(request_id) = item.request_id {
                answers.entry(request_id).or_default().push(item);
            }
        }

        Ok(requests
            .into_iter()
            .map(|request| {
                let items = answers.remove(&request.id).unwrap_or_default();
                ItemRequestResponse::new(request, items)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ServerError;
    use crate::models::{item::NewItem, request::NewItemRequest};
    use crate::services::testing;

    fn ask(description: &str) -> NewItemRequest {
        NewItemRequest {
            description: description.to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_carries_answering_items() {
        let services = testing::services();
        let asker = testing::user(&services, "Asker").await;
        let owner = testing::user(&services, "Owner").await;

        let request = services
            .requests
            .create(asker, ask("Need a ladder"))
            .await
            .unwrap();
        assert!(request.items.is_empty());
        assert_eq!(request.created, testing::now());

        let ladder = services
            .items
            .create(
                owner,
                NewItem {
                    name: "Ladder".to_string(),
                    description: "Three meters".to_string(),
                    available: true,
                    request_id: Some(request.id),
                },
            )
            .await
            .unwrap();

        let fetched = services.requests.get(request.id, owner).await.unwrap();
        assert_eq!(fetched.items, vec![ladder]);
    }

    #[tokio::test]
    async fn test_listings_split_own_and_others() {
        let services = testing::services();
        let asker = testing::user(&services, "Asker").await;
        let other = testing::user(&services, "Other").await;

        let first = services.requests.create(asker, ask("Tent")).await.unwrap();
        let second = services.requests.create(asker, ask("Stove")).await.unwrap();
        let foreign = services.requests.create(other, ask("Kayak")).await.unwrap();

        let own: Vec<i64> = services
            .requests
            .list_own(asker)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(own, vec![second.id, first.id]);

        let others: Vec<i64> = services
            .requests
            .list_others(asker, None, None)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(others, vec![foreign.id]);
    }

    #[tokio::test]
    async fn test_missing_request_and_user() {
        let services = testing::services();
        let asker = testing::user(&services, "Asker").await;

        assert!(matches!(
            services.requests.get(42, asker).await,
            Err(ServerError::RequestNotFound(42))
        ));
        assert!(matches!(
            services.requests.get(42, 777).await,
            Err(ServerError::UserNotFound(777))
        ));
    }
}
