//! PostgreSQL implementation of the checklist stores.
//!
//! Every statement filters on `owner_id`, so a row that belongs to another user is
//! indistinguishable from a missing one. Title and username uniqueness is enforced by
//! the schema; a unique violation comes back as `Duplicate` instead of an error.

use std::collections::HashMap;

use checklist_store::{
    Created, Item, ItemId, ListId, Mutation, TaskStore, TodoList, User, UserId, UserStore,
};
use sqlx::PgPool;

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

impl TaskStore for PgStore {
    type Error = sqlx::Error;

    async fn lists(&self, owner: UserId) -> Result<Vec<TodoList>, sqlx::Error> {
        let lists = sqlx::query_as::<_, TodoList>(
            "SELECT id, title, created_at FROM lists WHERE owner_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool);
        let items = sqlx::query_as::<_, Item>(
            "SELECT id, list_id, title, done FROM items WHERE owner_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.pool);

        let (mut lists, items) = futures::try_join!(lists, items)?;

        let mut by_list: HashMap<ListId, Vec<Item>> = HashMap::new();
        for item in items {
            by_list.entry(item.list_id).or_default().push(item);
        }
        for list in &mut lists {
            list.items = by_list.remove(&list.id).unwrap_or_default();
        }
        Ok(lists)
    }

    async fn list(&self, owner: UserId, list_id: ListId) -> Result<Option<TodoList>, sqlx::Error> {
        sqlx::query_as("SELECT id, title, created_at FROM lists WHERE id = $1 AND owner_id = $2")
            .bind(list_id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await
    }

    async fn items(&self, owner: UserId, list_id: ListId) -> Result<Vec<Item>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, list_id, title, done FROM items WHERE list_id = $1 AND owner_id = $2",
        )
        .bind(list_id)
        .bind(owner)
        .fetch_all(&self.pool)
        .await
    }

    async fn item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Option<Item>, sqlx::Error> {
        sqlx::query_as(
            "SELECT id, list_id, title, done FROM items
             WHERE id = $1 AND list_id = $2 AND owner_id = $3",
        )
        .bind(item_id)
        .bind(list_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await
    }

    async fn list_title_exists(&self, owner: UserId, title: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM lists WHERE owner_id = $1 AND title = $2)")
            .bind(owner)
            .bind(title)
            .fetch_one(&self.pool)
            .await
    }

    async fn insert_list(&self, owner: UserId, title: &str) -> Result<Created<ListId>, sqlx::Error> {
        let result: Result<ListId, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO lists (title, owner_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(title)
        .bind(owner)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(Created::New(id)),
            Err(e) if is_unique_violation(&e) => Ok(Created::Duplicate),
            Err(e) => Err(e),
        }
    }

    async fn rename_list(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> Result<Mutation, sqlx::Error> {
        let result = sqlx::query("UPDATE lists SET title = $1 WHERE id = $2 AND owner_id = $3")
            .bind(title)
            .bind(list_id)
            .bind(owner)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(Mutation::from_rows(done.rows_affected())),
            Err(e) if is_unique_violation(&e) => Ok(Mutation::Duplicate),
            Err(e) => Err(e),
        }
    }

    async fn delete_list(&self, owner: UserId, list_id: ListId) -> Result<Mutation, sqlx::Error> {
        // Items go with the list through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM lists WHERE id = $1 AND owner_id = $2")
            .bind(list_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(Mutation::from_rows(result.rows_affected()))
    }

    async fn insert_item(
        &self,
        owner: UserId,
        list_id: ListId,
        title: &str,
    ) -> Result<Created<ItemId>, sqlx::Error> {
        let id: Option<ItemId> = sqlx::query_scalar(
            "INSERT INTO items (title, list_id, owner_id)
             SELECT $1, id, owner_id FROM lists WHERE id = $2 AND owner_id = $3
             RETURNING id",
        )
        .bind(title)
        .bind(list_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id.map_or(Created::NotFound, Created::New))
    }

    async fn toggle_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE items SET done = NOT done WHERE id = $1 AND list_id = $2 AND owner_id = $3",
        )
        .bind(item_id)
        .bind(list_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(Mutation::from_rows(result.rows_affected()))
    }

    async fn complete_items(&self, owner: UserId, list_id: ListId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE items SET done = TRUE WHERE NOT done AND list_id = $1 AND owner_id = $2",
        )
        .bind(list_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_item(
        &self,
        owner: UserId,
        list_id: ListId,
        item_id: ItemId,
    ) -> Result<Mutation, sqlx::Error> {
        let result = sqlx::query("DELETE FROM items WHERE id = $1 AND list_id = $2 AND owner_id = $3")
            .bind(item_id)
            .bind(list_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(Mutation::from_rows(result.rows_affected()))
    }
}

impl UserStore for PgStore {
    type Error = sqlx::Error;

    async fn find_user(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT id, username, password_hash FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }

    async fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Created<UserId>, sqlx::Error> {
        let result: Result<UserId, sqlx::Error> = sqlx::query_scalar(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(id) => Ok(Created::New(id)),
            Err(e) if is_unique_violation(&e) => Ok(Created::Duplicate),
            Err(e) => Err(e),
        }
    }
}

// These run against a real database: `DATABASE_URL=... cargo test -- --ignored`.
#[cfg(test)]
mod tests {
    use super::*;
    use checklist_store::Tasks;

    async fn tasks(pool: PgPool, username: &str) -> Tasks<PgStore> {
        let store = PgStore::new(pool);
        let owner = store
            .insert_user(username, "hash")
            .await
            .unwrap()
            .id()
            .unwrap();
        Tasks::new(store, owner)
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_groceries_scenario(pool: PgPool) {
        let tasks = tasks(pool, "alice").await;

        let list_id = tasks.create_list("Groceries").await.unwrap().id().unwrap();
        let item_id = tasks.create_item(list_id, "Milk").await.unwrap().id().unwrap();

        let list = tasks.load_list(list_id).await.unwrap().unwrap();
        let items = tasks.sorted_items(&list).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Milk");
        assert!(!items[0].done);

        assert_eq!(
            tasks.toggle_item_done(list_id, item_id).await.unwrap(),
            Mutation::Updated(1)
        );
        let list = tasks.load_list(list_id).await.unwrap().unwrap();
        assert!(list.is_done());

        assert_eq!(tasks.complete_all_items(list_id).await.unwrap(), Mutation::NoEffect);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_delete_list_cascades(pool: PgPool) {
        let tasks = tasks(pool.clone(), "alice").await;
        let list_id = tasks.create_list("Groceries").await.unwrap().id().unwrap();
        tasks.create_item(list_id, "Milk").await.unwrap();

        assert_eq!(tasks.delete_list(list_id).await.unwrap(), Mutation::Updated(1));
        assert!(tasks.load_list(list_id).await.unwrap().is_none());

        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE list_id = $1")
            .bind(list_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_titles_are_unique_per_owner(pool: PgPool) {
        let alice = tasks(pool.clone(), "alice").await;
        let bob = tasks(pool, "bob").await;

        let work = alice.create_list("Work").await.unwrap().id().unwrap();
        assert_eq!(alice.create_list("Work").await.unwrap(), Created::Duplicate);
        assert!(!bob.exists_list_title("Work").await.unwrap());
        assert!(bob.create_list("Work").await.unwrap().is_created());

        alice.create_list("Home").await.unwrap();
        assert_eq!(
            alice.set_list_title(work, "Home").await.unwrap(),
            Mutation::Duplicate
        );
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_users_are_isolated(pool: PgPool) {
        let alice = tasks(pool.clone(), "alice").await;
        let bob = tasks(pool, "bob").await;

        let bob_list = bob.create_list("Work").await.unwrap().id().unwrap();
        let bob_item = bob.create_item(bob_list, "Report").await.unwrap().id().unwrap();

        assert!(alice.load_list(bob_list).await.unwrap().is_none());
        assert!(alice.sorted_lists().await.unwrap().is_empty());
        assert_eq!(
            alice.create_item(bob_list, "Sneaky").await.unwrap(),
            Created::NotFound
        );
        assert_eq!(
            alice.toggle_item_done(bob_list, bob_item).await.unwrap(),
            Mutation::NotFound
        );
        assert_eq!(
            alice.complete_all_items(bob_list).await.unwrap(),
            Mutation::NotFound
        );
        assert_eq!(alice.delete_list(bob_list).await.unwrap(), Mutation::NotFound);

        let lists = bob.sorted_lists().await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].items.len(), 1);
    }

    #[sqlx::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_duplicate_username(pool: PgPool) {
        let store = PgStore::new(pool);
        assert!(store.insert_user("alice", "h1").await.unwrap().is_created());
        assert_eq!(
            store.insert_user("alice", "h2").await.unwrap(),
            Created::Duplicate
        );
        let user = store.find_user("alice").await.unwrap().unwrap();
        assert_eq!(user.password_hash, "h1");
    }
}
