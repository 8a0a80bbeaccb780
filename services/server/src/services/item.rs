//! Item management, search and comments

use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::{
    clock::Clock,
    error::{ServerError, ServerResult},
    models::{
        booking::BookingShort,
        comment::{CommentResponse, NewComment},
        item::{Item, ItemDetails, NewItem, UpdateItem},
    },
    repositories::Repositories,
    services::{require_user, resolve_page},
};

#[derive(Clone)]
pub struct ItemService {
    repositories: Repositories,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    pub fn new(repositories: Repositories, clock: Arc<dyn Clock>) -> Self {
        Self {
            repositories,
            clock,
        }
    }

    async fn require_item(&self, item_id: i64) -> ServerResult<Item> {
        self.repositories
            .items
            .find_by_id(item_id)
            .await?
            .ok_or(ServerError::ItemNotFound(item_id))
    }

    pub async fn create(&self, owner_id: i64, new_item: NewItem) -> ServerResult<Item> {
        require_user(self.repositories.users.as_ref(), owner_id).await?;

        if let Some(request_id) = new_item.request_id {
            self.repositories
                .requests
                .find_by_id(request_id)
                .await?
                .ok_or(ServerError::RequestNotFound(request_id))?;
        }

        let item = self.repositories.items.create(owner_id, &new_item).await?;
        info!("User {} listed item {}", owner_id, item.id);
        Ok(item)
    }

    pub async fn update(
        &self,
        owner_id: i64,
        item_id: i64,
        patch: UpdateItem,
    ) -> ServerResult<Item> {
        require_user(self.repositories.users.as_ref(), owner_id).await?;
        let item = self.require_item(item_id).await?;

        if item.owner_id != owner_id {
            return Err(ServerError::NotOwnerOfItem {
                item_id,
                user_id: owner_id,
            });
        }

        let item = self.repositories.items.update(&patch.apply(item)).await?;
        info!("User {} updated item {}", owner_id, item.id);
        Ok(item)
    }

    /// Item with comments; booking context only for its owner
    pub async fn get(&self, item_id: i64, viewer_id: i64) -> ServerResult<ItemDetails> {
        require_user(self.repositories.users.as_ref(), viewer_id).await?;
        let item = self.require_item(item_id).await?;

        let is_owner = item.owner_id == viewer_id;
        let mut details = self.with_context(vec![item], is_owner).await?;
        details.pop().ok_or(ServerError::ItemNotFound(item_id))
    }

    pub async fn list_by_owner(
        &self,
        owner_id: i64,
        from: Option<i64>,
        size: Option<i64>,
    ) -> ServerResult<Vec<ItemDetails>> {
        let page = resolve_page(from, size)?;
        require_user(self.repositories.users.as_ref(), owner_id).await?;

        let items = self.repositories.items.find_by_owner(owner_id, page).await?;
        if items.is_empty() {
            return Err(ServerError::OwnerHasNoItems(owner_id));
        }
        self.with_context(items, true).await
    }

    pub async fn search(
        &self,
        text: &str,
        from: Option<i64>,
        size: Option<i64>,
    ) -> ServerResult<Vec<Item>> {
        let page = resolve_page(from, size)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.repositories.items.search_available(text, page).await?)
    }

    pub async fn add_comment(
        &self,
        item_id: i64,
        author_id: i64,
        comment: NewComment,
    ) -> ServerResult<CommentResponse> {
        require_user(self.repositories.users.as_ref(), author_id).await?;
        self.require_item(item_id).await?;

        let now = self.clock.now();
        if !self
            .repositories
            .bookings
            .has_completed(item_id, author_id, now)
            .await?
        {
            return Err(ServerError::NotRenter {
                item_id,
                user_id: author_id,
            });
        }

        let comment = self
            .repositories
            .comments
            .create(item_id, author_id, &comment.text, now)
            .await?;
        info!("User {} commented on item {}", author_id, item_id);
        Ok(comment.into())
    }

    /// Attach comments, and last/next bookings when `with_bookings`, to a
    /// page of items with one query per relation.
    async fn with_context(
        &self,
        items: Vec<Item>,
        with_bookings: bool,
    ) -> ServerResult<Vec<ItemDetails>> {
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();

        let mut comments: HashMap<i64, Vec<CommentResponse>> = HashMap::new();
        for comment in self.repositories.comments.find_by_item_ids(&ids).await? {
            comments
                .entry(comment.item_id)
                .or_default()
                .push(comment.into());
        }

        let (mut last, mut next) = (HashMap::new(), HashMap::new());
        if with_bookings {
            let now = self.clock.now();
            for booking in self.repositories.bookings.find_last_for_items(&ids, now).await? {
                last.insert(booking.item.id, BookingShort::from(&booking));
            }
            for booking in self.repositories.bookings.find_next_for_items(&ids, now).await? {
                next.insert(booking.item.id, BookingShort::from(&booking));
            }
        }

        Ok(items
            .into_iter()
            .map(|item| ItemDetails {
                last_booking: last.remove(&item.id),
                next_booking: next.remove(&item.id),
                comments: comments.remove(&item.id).unwrap_or_default(),
                item,
            })
            .collect())
    }
}
