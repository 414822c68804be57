//! # Tasks: per-principal access to lists and items
//!
//! This module is the core of the checklist data layer. [`Tasks`] binds a storage
//! backend to one authenticated user and exposes every list and item operation a
//! request handler needs. Nothing here reads ambient state: the principal is fixed
//! when the [`Tasks`] value is built, and every call to the backend passes it on
//! explicitly.
//!
//! ## Store traits
//!
//! [`TaskStore`] is the row-level interface a backend implements. Every method takes
//! the owner id and must never read or write rows that belong to another owner.
//! [`UserStore`] covers the `users` table. Implementations live in
//! [`crate::MemoryStore`] (tests) and in the `checklist-api` crate (PostgreSQL).
//!
//! ## Ordering
//!
//! | Method | Order |
//! |--------|-------|
//! | [`sorted_lists`](Tasks::sorted_lists) | undone lists first, then case-insensitive title, then id. Items inside each list keep store order. |
//! | [`sorted_items`](Tasks::sorted_items) | undone items first, then case-insensitive title, then id. |
//!
//! ## Composite reads
//!
//! [`load_list`](Tasks::load_list) reads the list row and its items concurrently.
//! The two reads are not atomic: a writer racing between them can leave the items
//! slightly newer or older than the list row.

use std::future::Future;

use crate::models::{Item, ItemId, ListId, TodoList, User, UserId};
use crate::outcome::{Created, Mutation};

/// Row-level access to lists and items, always filtered by owner.
pub trait TaskStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// All lists of the owner, each with its items, in no particular order.
    fn lists(
        &self,
        owner: UserId,
    ) -> impl Future<Output = Result<Vec<TodoList>, Self::Error>> + Send;

    /// A single list row with `items` left empty.
    fn list(
        &self,
        owner: UserId,
        list_id: ListId,
    ) -> impl Future<Output = Result<Option<TodoList>, Self::Error>> + Send;

    /// Items of one list, in no particular order.
    fn items(
        &self,
        owner: UserId,
        list_id: ListId,
    ) -> impl Future<Output = Result<Vec<Item>, Self::Error>> + Send;

    fn item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> impl Future<Output = Result<Option<Item>, Self::Error>> + Send;

    fn list_title_exists(
        &self,
        owner: UserId,
        title: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Insert a list. A title the owner already uses yields [`Created::Duplicate`].
    fn insert_list(
        &self,
        owner: UserId,
        title: &str,
    ) -> impl Future<Output = Result<Created<ListId>, Self::Error>> + Send;

    fn rename_list(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> impl Future<Output = Result<Mutation, Self::Error>> + Send;

    /// Delete a list and all of its items.
    fn delete_list(
        &self,
        owner: UserId,
        list_id: ListId,
    ) -> impl Future<Output = Result<Mutation, Self::Error>> + Send;

    /// Insert an item under a list the owner holds, otherwise [`Created::NotFound`].
    fn insert_item(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> impl Future<Output = Result<Created<ItemId>, Self::Error>> + Send;

    fn toggle_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> impl Future<Output = Result<Mutation, Self::Error>> + Send;

    /// Mark every undone item of the list done. Returns the number of rows changed.
    fn complete_items(
        &self,
        owner: UserId,
        list_id: ListId,
    ) -> impl Future<Output = Result<u64, Self::Error>> + Send;

    fn delete_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> impl Future<Output = Result<Mutation, Self::Error>> + Send;
}

/// Access to registered accounts.
pub trait UserStore {
    type Error: std::error::Error + Send + Sync + 'static;

    fn find_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

    /// Insert an account. A taken username yields [`Created::Duplicate`].
    fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<Created<UserId>, Self::Error>> + Send;
}

/// The list and item operations of one authenticated user.
#[derive(Clone, Debug)]
pub struct Tasks<S> {
    store: S,
    owner: UserId,
}

impl<S: TaskStore> Tasks<S> {
    pub fn new(store: S, owner: UserId) -> Self {
        Self { store, owner }
    }

    /// The principal every call is scoped to.
    pub fn owner(&self) -> UserId {
        self.owner
    }

    /// All lists of the principal with their items, undone lists first.
    pub async fn sorted_lists(&self) -> Result<Vec<TodoList>, S::Error> {
        let mut lists = self.store.lists(self.owner).await?;
        sort_lists(&mut lists);
        tracing::debug!(owner = self.owner, count = lists.len(), "loaded lists");
        Ok(lists)
    }

    /// Load a list and its items, or `None` if the principal has no such list.
    pub async fn load_list(&self, list_id: ListId) -> Result<Option<TodoList>, S::Error> {
        let (list, items) = futures::try_join!(
            self.store.list(self.owner, list_id),
            self.store.items(self.owner, list_id)
        )?;

        Ok(list.map(|mut list| {
            list.items = items;
            list
        }))
    }

    pub async fn create_list(&self, title: &str) -> Result<Created<ListId>, S::Error> {
        let created = self.store.insert_list(self.owner, title).await?;
        tracing::debug!(owner = self.owner, title, ?created, "create list");
        Ok(created)
    }

    /// Whether the principal already has a list with exactly this title.
    pub async fn exists_list_title(&self, title: &str) -> Result<bool, S::Error> {
        self.store.list_title_exists(self.owner, title).await
    }

    pub async fn set_list_title(
        &self,
        list_id: ListId,
        title: &str,
    ) -> Result<Mutation, S::Error> {
        let outcome = self.store.rename_list(self.owner, list_id, title).await?;
        tracing::debug!(owner = self.owner, list_id, title, ?outcome, "rename list");
        Ok(outcome)
    }

    /// Delete a list together with its items.
    pub async fn delete_list(&self, list_id: ListId) -> Result<Mutation, S::Error> {
        let outcome = self.store.delete_list(self.owner, list_id).await?;
        tracing::debug!(owner = self.owner, list_id, ?outcome, "delete list");
        Ok(outcome)
    }

    /// Items of an already loaded list, undone first, then by title.
    pub async fn sorted_items(&self, list: &TodoList) -> Result<Vec<Item>, S::Error> {
        let mut items = self.store.items(self.owner, list.id).await?;
        sort_items(&mut items);
        Ok(items)
    }

    pub async fn load_item(
        &self,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Option<Item>, S::Error> {
        self.store.item(self.owner, list_id, item_id).await
    }

    pub async fn create_item(
        &self,
        list_id: ListId,
        title: &str,
    ) -> Result<Created<ItemId>, S::Error> {
        let created = self.store.insert_item(self.owner, list_id, title).await?;
        tracing::debug!(owner = self.owner, list_id, title, ?created, "create item");
        Ok(created)
    }

    /// Flip the done flag of one item.
    pub async fn toggle_item_done(
        &self,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, S::Error> {
        let outcome = self.store.toggle_item(self.owner, list_id, item_id).await?;
        tracing::debug!(owner = self.owner, list_id, item_id, ?outcome, "toggle item");
        Ok(outcome)
    }

    /// Mark every item of the list done.
    ///
    /// Returns [`Mutation::Updated`] with the number of items that changed,
    /// [`Mutation::NoEffect`] when the list exists but had no undone items, and
    /// [`Mutation::NotFound`] when the principal has no such list. Telling the last
    /// two apart takes a second read after the update.
    pub async fn complete_all_items(&self, list_id: ListId) -> Result<Mutation, S::Error> {
        let rows = self.store.complete_items(self.owner, list_id).await?;
        let outcome = if rows > 0 {
            Mutation::Updated(rows)
        } else if self.store.list(self.owner, list_id).await?.is_some() {
            Mutation::NoEffect
        } else {
            Mutation::NotFound
        };
        tracing::debug!(owner = self.owner, list_id, ?outcome, "complete all items");
        Ok(outcome)
    }

    pub async fn delete_item(
        &self,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, S::Error> {
        let outcome = self.store.delete_item(self.owner, list_id, item_id).await?;
        tracing::debug!(owner = self.owner, list_id, item_id, ?outcome, "delete item");
        Ok(outcome)
    }
}

/// Undone lists first, then case-insensitive title, then id.
pub fn sort_lists(lists: &mut [TodoList]) {
    lists.sort_by_cached_key(|list| (list.is_done(), list.title.to_lowercase(), list.id));
}

/// Undone items first, then case-insensitive title, then id.
pub fn sort_items(items: &mut [Item]) {
    items.sort_by_cached_key(|item| (item.done, item.title.to_lowercase(), item.id));
}
