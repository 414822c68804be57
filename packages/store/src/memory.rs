use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use crate::models::{Item, ItemId, ListId, TodoList, User, UserId};
use crate::outcome::{Created, Mutation};
use crate::repo::{TaskStore, UserStore};

/// In-memory store for tests and local tooling.
///
/// Mirrors the constraints of the SQL schema: usernames are unique, list titles are
/// unique per owner, and deleting a list deletes its items.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    lists: BTreeMap<ListId, ListRow>,
    items: BTreeMap<ItemId, ItemRow>,
}

#[derive(Debug)]
struct ListRow {
    owner: UserId,
    title: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct ItemRow {
    owner: UserId,
    list_id: ListId,
    title: String,
    done: bool,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn owned_list(&self, owner: UserId, list_id: ListId) -> Option<&ListRow> {
        self.lists.get(&list_id).filter(|row| row.owner == owner)
    }

    fn to_list(id: ListId, row: &ListRow) -> TodoList {
        TodoList {
            id,
            title: row.title.clone(),
            created_at: row.created_at,
            items: Vec::new(),
        }
    }

    fn to_item(id: ItemId, row: &ItemRow) -> Item {
        Item {
            id,
            list_id: row.list_id,
            title: row.title.clone(),
            done: row.done,
        }
    }

    fn items_of(&self, owner: UserId, list_id: ListId) -> Vec<Item> {
        self.items
            .iter()
            .filter(|(_, row)| row.owner == owner && row.list_id == list_id)
            .map(|(id, row)| Self::to_item(*id, row))
            .collect()
    }

    fn owned_item_mut(
        &mut self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Option<&mut ItemRow> {
        self.items
            .get_mut(&item_id)
            .filter(|row| row.owner == owner && row.list_id == list_id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskStore for MemoryStore {
    type Error = Infallible;

    async fn lists(&self, owner: UserId) -> Result<Vec<TodoList>, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .lists
            .iter()
            .filter(|(_, row)| row.owner == owner)
            .map(|(id, row)| {
                let mut list = State::to_list(*id, row);
                list.items = state.items_of(owner, *id);
                list
            })
            .collect())
    }

    async fn list(&self, owner: UserId, list_id: ListId) -> Result<Option<TodoList>, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .owned_list(owner, list_id)
            .map(|row| State::to_list(list_id, row)))
    }

    async fn items(&self, owner: UserId, list_id: ListId) -> Result<Vec<Item>, Infallible> {
        Ok(self.state.lock().unwrap().items_of(owner, list_id))
    }

    async fn item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Option<Item>, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .get(&item_id)
            .filter(|row| row.owner == owner && row.list_id == list_id)
            .map(|row| State::to_item(item_id, row)))
    }

    async fn list_title_exists(&self, owner: UserId, title: &str) -> Result<bool, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .lists
            .values()
            .any(|row| row.owner == owner && row.title == title))
    }

    async fn insert_list(&self, owner: UserId, title: &str) -> Result<Created<ListId>, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state
            .lists
            .values()
            .any(|row| row.owner == owner && row.title == title)
        {
            return Ok(Created::Duplicate);
        }

        let id = state.next_id();
        state.lists.insert(
            id,
            ListRow {
                owner,
                title: title.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(Created::New(id))
    }

    async fn rename_list(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> Result<Mutation, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state.owned_list(owner, list_id).is_none() {
            return Ok(Mutation::NotFound);
        }
        if state
            .lists
            .iter()
            .any(|(id, row)| *id != list_id && row.owner == owner && row.title == title)
        {
            return Ok(Mutation::Duplicate);
        }

        if let Some(row) = state.lists.get_mut(&list_id) {
            row.title = title.to_string();
        }
        Ok(Mutation::Updated(1))
    }

    async fn delete_list(&self, owner: UserId, list_id: ListId) -> Result<Mutation, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state.owned_list(owner, list_id).is_none() {
            return Ok(Mutation::NotFound);
        }

        state.lists.remove(&list_id);
        state.items.retain(|_, row| row.list_id != list_id);
        Ok(Mutation::Updated(1))
    }

    async fn insert_item(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> Result<Created<ItemId>, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state.owned_list(owner, list_id).is_none() {
            return Ok(Created::NotFound);
        }

        let id = state.next_id();
        state.items.insert(
            id,
            ItemRow {
                owner,
                list_id,
                title: title.to_string(),
                done: false,
            },
        );
        Ok(Created::New(id))
    }

    async fn toggle_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, Infallible> {
        let mut state = self.state.lock().unwrap();
        match state.owned_item_mut(owner, list_id, item_id) {
            Some(row) => {
                row.done = !row.done;
                Ok(Mutation::Updated(1))
            }
            None => Ok(Mutation::NotFound),
        }
    }

    async fn complete_items(&self, owner: UserId, list_id: ListId) -> Result<u64, Infallible> {
        let mut state = self.state.lock().unwrap();
        let mut rows = 0;
        for row in state.items.values_mut() {
            if row.owner == owner && row.list_id == list_id && !row.done {
                row.done = true;
                rows += 1;
            }
        }
        Ok(rows)
    }

    async fn delete_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state.owned_item_mut(owner, list_id, item_id).is_none() {
            return Ok(Mutation::NotFound);
        }
        state.items.remove(&item_id);
        Ok(Mutation::Updated(1))
    }
}

impl UserStore for MemoryStore {
    type Error = Infallible;

    async fn find_user(&self, username: &str) -> Result<Option<User>, Infallible> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Created<UserId>, Infallible> {
        let mut state = self.state.lock().unwrap();
        if state.users.values().any(|user| user.username == username) {
            return Ok(Created::Duplicate);
        }

        let id = state.next_id();
        state.users.insert(
            id,
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(Created::New(id))
    }
}
