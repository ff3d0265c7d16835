//! Repository layer: entity store traits and their implementations
//!
//! `Repository` talks to PostgreSQL through sqlx; `MemoryStore` keeps
//! everything in process and backs the test suite and demo mode.

pub mod authors;
pub mod books;
pub mod copies;
pub mod genres;
pub mod memory;
pub mod sessions;
pub mod users;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{
        author::{Author, CreateAuthor},
        book::{Book, BookShort, CreateBook},
        book_instance::{BookInstance, CopyFilter, LoanEntry, LoanStatus},
        genre::{CreateGenre, Genre},
        page::PageRequest,
        user::{CreateUser, User},
    },
};

pub use memory::MemoryStore;

#[async_trait]
pub trait AuthorStore: Send + Sync {
    /// Authors ordered by last name then first name
    async fn list_authors(&self, page: PageRequest) -> AppResult<(Vec<Author>, i64)>;
    async fn get_author(&self, id: i32) -> AppResult<Author>;
    async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author>;
    async fn update_author(&self, author: &Author) -> AppResult<Author>;
    /// Refused with `Conflict` while books still reference the author
    async fn delete_author(&self, id: i32) -> AppResult<()>;
    async fn count_authors(&self) -> AppResult<i64>;
}

#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn list_genres(&self) -> AppResult<Vec<Genre>>;
    async fn create_genre(&self, genre: &CreateGenre) -> AppResult<Genre>;
    async fn genres_for_book(&self, book_id: i32) -> AppResult<Vec<Genre>>;
    /// Genres whose name contains `term`, case-insensitive
    async fn count_genres_matching(&self, term: &str) -> AppResult<i64>;
}

#[async_trait]
pub trait BookStore: Send + Sync {
    /// Books ordered by title, optionally only those of one author
    async fn list_books(&self, author_id: Option<i32>, page: PageRequest) -> AppResult<(Vec<BookShort>, i64)>;
    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>>;
    async fn get_book(&self, id: i32) -> AppResult<Book>;
    async fn create_book(&self, book: &CreateBook) -> AppResult<Book>;
    /// `genre_ids` replaces the genre set when present
    async fn update_book(&self, book: &Book, genre_ids: Option<&[i32]>) -> AppResult<Book>;
    /// Deletes the book's copies along with it
    async fn delete_book(&self, id: i32) -> AppResult<()>;
    async fn count_books(&self) -> AppResult<i64>;
    /// Books whose title contains `term`, case-insensitive
    async fn count_books_matching(&self, term: &str) -> AppResult<i64>;
}

#[async_trait]
pub trait CopyStore: Send + Sync {
    async fn copies_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>>;
    /// Copies matching `filter`, oldest first
    async fn list_copies(&self, filter: CopyFilter, page: PageRequest) -> AppResult<(Vec<BookInstance>, i64)>;
    async fn get_copy(&self, id: Uuid) -> AppResult<BookInstance>;
    async fn create_copy(&self, copy: &BookInstance) -> AppResult<BookInstance>;
    async fn update_copy(&self, copy: &BookInstance) -> AppResult<BookInstance>;
    async fn delete_copy(&self, id: Uuid) -> AppResult<()>;
    async fn count_copies(&self, status: Option<LoanStatus>) -> AppResult<i64>;
    /// Copies on loan to `borrower_id`, soonest due first
    async fn loans_for(&self, borrower_id: i32, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)>;
    /// Every copy on loan, soonest due first
    async fn all_on_loan(&self, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)>;
    /// Overwrite the due date in one write; concurrent renewals resolve last-writer-wins
    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance>;
    /// Lend an available copy. `Conflict` when the copy is not available.
    async fn checkout(&self, id: Uuid, borrower_id: i32, due_back: NaiveDate) -> AppResult<BookInstance>;
    /// Take back a copy on loan. `Conflict` when the copy is not on loan.
    async fn return_copy(&self, id: Uuid) -> AppResult<BookInstance>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_user(&self, id: i32) -> AppResult<User>;
    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    /// `password_hash` replaces the clear text password of `user`
    async fn create_user(&self, user: &CreateUser, password_hash: &str) -> AppResult<User>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Count one more visit for the session and return the new total
    async fn record_visit(&self, session_id: Uuid) -> AppResult<i64>;
    /// Forget sessions not seen since `cutoff`, returning how many went
    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64>;
}

/// Everything the services need from storage
#[async_trait]
pub trait CatalogStore:
    AuthorStore + GenreStore + BookStore + CopyStore + UserStore + SessionStore
{
    /// Check the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL implementation of the entity store
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for Repository {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
