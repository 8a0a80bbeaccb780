//! In-memory repositories for service and router tests

use async_trait::async_trait;
use chrono::NaiveDateTime;
use common::error::{DatabaseError, DatabaseResult};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{
    Page,
    booking::{Booking, BookingScope, BookingState, BookingStatus, NewBooking},
    comment::Comment,
    item::{Item, NewItem},
    request::ItemRequest,
    user::User,
};
use crate::repositories::{
    BookingRepository, CommentRepository, ItemRepository, Repositories, RequestRepository,
    UserRepository,
};

#[derive(Debug, Clone)]
struct BookingRow {
    id: i64,
    start: NaiveDateTime,
    end: NaiveDateTime,
    item_id: i64,
    booker_id: i64,
    status: BookingStatus,
}

#[derive(Debug, Clone)]
struct CommentRow {
    id: i64,
    text: String,
    item_id: i64,
    author_id: i64,
    created: NaiveDateTime,
}

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: Vec<User>,
    items: Vec<Item>,
    bookings: Vec<BookingRow>,
    requests: Vec<ItemRequest>,
    comments: Vec<CommentRow>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }

    fn resolve(&self, row: &BookingRow) -> Option<Booking> {
        let item = self.items.iter().find(|i| i.id == row.item_id)?.clone();
        let booker = self.users.iter().find(|u| u.id == row.booker_id)?.clone();
        Some(Booking {
            id: row.id,
            start: row.start,
            end: row.end,
            item,
            booker,
            status: row.status,
        })
    }

    fn bookings(&self) -> Vec<Booking> {
        self.bookings.iter().filter_map(|b| self.resolve(b)).collect()
    }

    fn resolve_comment(&self, row: &CommentRow) -> Option<Comment> {
        let author = self.users.iter().find(|u| u.id == row.author_id)?;
        Some(Comment {
            id: row.id,
            text: row.text.clone(),
            item_id: row.item_id,
            author_id: row.author_id,
            author_name: author.name.clone(),
            created: row.created,
        })
    }
}

/// Shared in-memory store implementing every repository trait
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry whose repositories all share this store
    pub fn repositories(&self) -> Repositories {
        Repositories {
            users: Arc::new(self.clone()),
            items: Arc::new(self.clone()),
            bookings: Arc::new(self.clone()),
            requests: Arc::new(self.clone()),
            comments: Arc::new(self.clone()),
        }
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store lock poisoned")
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(&self, name: &str, email: &str) -> DatabaseResult<User> {
        let mut tables = self.tables();
        if tables.email_taken(email, None) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        let user = User {
            id: tables.next_id(),
            name: name.to_string(),
            email: email.to_string(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> DatabaseResult<User> {
        let mut tables = self.tables();
        if tables.email_taken(&user.email, Some(user.id)) {
            return Err(DatabaseError::UniqueViolation("users_email_key".to_string()));
        }
        let stored = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))?;
        *stored = user.clone();
        Ok(user.clone())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<User>> {
        Ok(self.tables().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_all(&self) -> DatabaseResult<Vec<User>> {
        Ok(self.tables().users.clone())
    }

    async fn delete(&self, id: i64) -> DatabaseResult<bool> {
        let mut tables = self.tables();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Ok(false);
        }

        let owned: Vec<i64> = tables
            .items
            .iter()
            .filter(|i| i.owner_id == id)
            .map(|i| i.id)
            .collect();
        let authored: Vec<i64> = tables
            .requests
            .iter()
            .filter(|r| r.requestor_id == id)
            .map(|r| r.id)
            .collect();

        tables.items.retain(|i| i.owner_id != id);
        tables
            .bookings
            .retain(|b| b.booker_id != id && !owned.contains(&b.item_id));
        tables
            .comments
            .retain(|c| c.author_id != id && !owned.contains(&c.item_id));
        tables.requests.retain(|r| r.requestor_id != id);
        for item in tables.items.iter_mut() {
            if item.request_id.is_some_and(|r| authored.contains(&r)) {
                item.request_id = None;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl ItemRepository for MemoryStore {
    async fn create(&self, owner_id: i64, item: &NewItem) -> DatabaseResult<Item> {
        let mut tables = self.tables();
        let item = Item {
            id: tables.next_id(),
            name: item.name.clone(),
            description: item.description.clone(),
            available: item.available,
            owner_id,
            request_id: item.request_id,
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn update(&self, item: &Item) -> DatabaseResult<Item> {
        let mut tables = self.tables();
        let stored = tables
            .items
            .iter_mut()
            .find(|i| i.id == item.id)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))?;
        stored.name = item.name.clone();
        stored.description = item.description.clone();
        stored.available = item.available;
        Ok(stored.clone())
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Item>> {
        Ok(self.tables().items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_by_owner(&self, owner_id: i64, page: Page) -> DatabaseResult<Vec<Item>> {
        let tables = self.tables();
        Ok(page.slice(
            tables
                .items
                .iter()
                .filter(|i| i.owner_id == owner_id)
                .cloned(),
        ))
    }

    async fn find_ids_by_owner(&self, owner_id: i64) -> DatabaseResult<Vec<i64>> {
        Ok(self
            .tables()
            .items
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .map(|i| i.id)
            .collect())
    }

    async fn search_available(&self, text: &str, page: Page) -> DatabaseResult<Vec<Item>> {
        let needle = text.to_lowercase();
        let tables = self.tables();
        Ok(page.slice(
            tables
                .items
                .iter()
                .filter(|i| i.available)
                .filter(|i| {
                    i.name.to_lowercase().contains(&needle)
                        || i.description.to_lowercase().contains(&needle)
                })
                .cloned(),
        ))
    }

    async fn find_by_request_ids(&self, request_ids: &[i64]) -> DatabaseResult<Vec<Item>> {
        Ok(self
            .tables()
            .items
            .iter()
            .filter(|i| i.request_id.is_some_and(|r| request_ids.contains(&r)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn create(&self, booker_id: i64, booking: &NewBooking) -> DatabaseResult<Booking> {
        let mut tables = self.tables();
        let taken = tables
            .bookings()
            .iter()
            .any(|b| b.item.id == booking.item_id && b.conflicts_with(booking.start, booking.end));
        if taken {
            return Err(DatabaseError::Conflict(format!(
                "item {} is reserved",
                booking.item_id
            )));
        }

        let row = BookingRow {
            id: tables.next_id(),
            start: booking.start,
            end: booking.end,
            item_id: booking.item_id,
            booker_id,
            status: BookingStatus::Waiting,
        };
        tables.bookings.push(row.clone());
        tables
            .resolve(&row)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<Booking>> {
        let tables = self.tables();
        Ok(tables
            .bookings
            .iter()
            .find(|b| b.id == id)
            .and_then(|b| tables.resolve(b)))
    }

    async fn transition_status(
        &self,
        id: i64,
        from: BookingStatus,
        to: BookingStatus,
    ) -> DatabaseResult<bool> {
        let mut tables = self.tables();
        match tables
            .bookings
            .iter_mut()
            .find(|b| b.id == id && b.status == from)
        {
            Some(row) => {
                row.status = to;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_conflicting(
        &self,
        item_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        Ok(self
            .tables()
            .bookings()
            .into_iter()
            .filter(|b| b.item.id == item_id && b.conflicts_with(start, end))
            .collect())
    }

    async fn find_by_scope(
        &self,
        scope: &BookingScope,
        state: BookingState,
        now: NaiveDateTime,
        page: Page,
    ) -> DatabaseResult<Vec<Booking>> {
        let mut found: Vec<Booking> = self
            .tables()
            .bookings()
            .into_iter()
            .filter(|b| match scope {
                BookingScope::Booker(booker_id) => b.booker.id == *booker_id,
                BookingScope::Items(item_ids) => item_ids.contains(&b.item.id),
            })
            .filter(|b| state.matches(b, now))
            .collect();
        found.sort_by(|a, b| b.start.cmp(&a.start).then(b.id.cmp(&a.id)));
        Ok(page.slice(found))
    }

    async fn find_last_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        let bookings = self.tables().bookings();
        Ok(item_ids
            .iter()
            .filter_map(|item_id| {
                bookings
                    .iter()
                    .filter(|b| b.item.id == *item_id && b.status.is_active() && b.start < now)
                    .max_by_key(|b| (b.start, b.id))
                    .cloned()
            })
            .collect())
    }

    async fn find_next_for_items(
        &self,
        item_ids: &[i64],
        now: NaiveDateTime,
    ) -> DatabaseResult<Vec<Booking>> {
        let bookings = self.tables().bookings();
        Ok(item_ids
            .iter()
            .filter_map(|item_id| {
                bookings
                    .iter()
                    .filter(|b| b.item.id == *item_id && b.status.is_active() && b.start >= now)
                    .min_by_key(|b| (b.start, b.id))
                    .cloned()
            })
            .collect())
    }

    async fn has_completed(
        &self,
        item_id: i64,
        booker_id: i64,
        now: NaiveDateTime,
    ) -> DatabaseResult<bool> {
        Ok(self
            .tables()
            .bookings
            .iter()
            .any(|b| b.item_id == item_id && b.booker_id == booker_id && b.end < now))
    }
}

#[async_trait]
impl RequestRepository for MemoryStore {
    async fn create(
        &self,
        requestor_id: i64,
        description: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<ItemRequest> {
        let mut tables = self.tables();
        let request = ItemRequest {
            id: tables.next_id(),
            description: description.to_string(),
            requestor_id,
            created,
        };
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn find_by_id(&self, id: i64) -> DatabaseResult<Option<ItemRequest>> {
        Ok(self.tables().requests.iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_requestor(&self, requestor_id: i64) -> DatabaseResult<Vec<ItemRequest>> {
        let mut found: Vec<ItemRequest> = self
            .tables()
            .requests
            .iter()
            .filter(|r| r.requestor_id == requestor_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn find_by_other_requestors(
        &self,
        requestor_id: i64,
        page: Page,
    ) -> DatabaseResult<Vec<ItemRequest>> {
        let mut found: Vec<ItemRequest> = self
            .tables()
            .requests
            .iter()
            .filter(|r| r.requestor_id != requestor_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        Ok(page.slice(found))
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create(
        &self,
        item_id: i64,
        author_id: i64,
        text: &str,
        created: NaiveDateTime,
    ) -> DatabaseResult<Comment> {
        let mut tables = self.tables();
        let row = CommentRow {
            id: tables.next_id(),
            text: text.to_string(),
            item_id,
            author_id,
            created,
        };
        tables.comments.push(row.clone());
        tables
            .resolve_comment(&row)
            .ok_or(DatabaseError::Query(sqlx::Error::RowNotFound))
    }

    async fn find_by_item_ids(&self, item_ids: &[i64]) -> DatabaseResult<Vec<Comment>> {
        let tables = self.tables();
        Ok(tables
            .comments
            .iter()
            .filter(|c| item_ids.contains(&c.item_id))
            .filter_map(|c| tables.resolve_comment(c))
            .collect())
    }
}
