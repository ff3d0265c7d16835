//! In-process entity store
//!
//! Same contract as the PostgreSQL repository. Rows live in insertion
//! ordered vectors behind one `RwLock`, so each operation is atomic with
//! respect to the others.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        author::{Author, CreateAuthor},
        book::{Book, BookShort, CreateBook},
        book_instance::{BookInstance, CopyFilter, LoanEntry, LoanStatus},
        genre::{CreateGenre, Genre},
        page::PageRequest,
        user::{CreateUser, User},
    },
};

use super::{AuthorStore, BookStore, CatalogStore, CopyStore, GenreStore, SessionStore, UserStore};

#[derive(Default)]
struct MemoryState {
    authors: Vec<Author>,
    genres: Vec<Genre>,
    books: Vec<Book>,
    /// (book_id, genre_id) in display order
    book_genres: Vec<(i32, i32)>,
    copies: Vec<BookInstance>,
    users: Vec<User>,
    sessions: HashMap<Uuid, Session>,
    last_author_id: i32,
    last_genre_id: i32,
    last_book_id: i32,
    last_user_id: i32,
}

struct Session {
    visits: i64,
    last_seen: DateTime<Utc>,
}

fn next_id(last: &mut i32) -> i32 {
    *last += 1;
    *last
}

fn paginate<T: Clone>(rows: &[T], page: PageRequest) -> (Vec<T>, i64) {
    let items = rows
        .iter()
        .skip(page.offset().max(0) as usize)
        .take(page.limit() as usize)
        .cloned()
        .collect();
    (items, rows.len() as i64)
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl MemoryState {
    fn author(&self, id: i32) -> AppResult<&Author> {
        self.authors
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", id)))
    }

    fn book_short(&self, book: &Book) -> BookShort {
        let author = self
            .author(book.author_id)
            .map(|a| a.display_name())
            .unwrap_or_default();
        BookShort {
            id: book.id,
            title: book.title.clone(),
            author_id: book.author_id,
            author,
        }
    }

    fn copy_mut(&mut self, id: Uuid) -> AppResult<&mut BookInstance> {
        self.copies
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    fn set_genres(&mut self, book_id: i32, genre_ids: &[i32]) -> AppResult<()> {
        let mut ids: Vec<i32> = Vec::with_capacity(genre_ids.len());
        for id in genre_ids {
            if !self.genres.iter().any(|g| g.id == *id) {
                return Err(AppError::field("genre_ids", "Unknown genre id"));
            }
            if !ids.contains(id) {
                ids.push(*id);
            }
        }

        self.book_genres.retain(|(b, _)| *b != book_id);
        self.book_genres.extend(ids.into_iter().map(|g| (book_id, g)));
        Ok(())
    }

    /// On-loan copies matching `filter`, soonest due first
    fn loans<F>(&self, filter: F) -> Vec<LoanEntry>
    where
        F: Fn(&BookInstance) -> bool,
    {
        let mut copies: Vec<&BookInstance> = self
            .copies
            .iter()
            .filter(|c| c.status == LoanStatus::OnLoan && filter(c))
            .collect();
        // stable: equal due dates keep insertion order, missing dates go last
        copies.sort_by_key(|c| (c.due_back.is_none(), c.due_back));

        copies
            .into_iter()
            .map(|c| LoanEntry {
                id: c.id,
                book_id: c.book_id,
                title: self
                    .books
                    .iter()
                    .find(|b| b.id == c.book_id)
                    .map(|b| b.title.clone())
                    .unwrap_or_default(),
                imprint: c.imprint.clone(),
                due_back: c.due_back,
                status: c.status,
                borrower_id: c.borrower_id,
                borrower_username: c
                    .borrower_id
                    .and_then(|id| self.users.iter().find(|u| u.id == id))
                    .map(|u| u.username.clone()),
                is_overdue: false,
            })
            .collect()
    }
}

/// Entity store held entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuthorStore for MemoryStore {
    async fn list_authors(&self, page: PageRequest) -> AppResult<(Vec<Author>, i64)> {
        let state = self.state.read().await;
        let mut authors = state.authors.clone();
        authors.sort_by(|a, b| {
            (&a.last_name, &a.first_name, a.id).cmp(&(&b.last_name, &b.first_name, b.id))
        });
        Ok(paginate(&authors, page))
    }

    async fn get_author(&self, id: i32) -> AppResult<Author> {
        self.state.read().await.author(id).cloned()
    }

    async fn create_author(&self, author: &CreateAuthor) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let created = Author {
            id: next_id(&mut state.last_author_id),
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: author.date_of_birth,
            date_of_death: author.date_of_death,
        };
        state.authors.push(created.clone());
        Ok(created)
    }

    async fn update_author(&self, author: &Author) -> AppResult<Author> {
        let mut state = self.state.write().await;
        let existing = state
            .authors
            .iter_mut()
            .find(|a| a.id == author.id)
            .ok_or_else(|| AppError::NotFound(format!("Author with id {} not found", author.id)))?;
        *existing = author.clone();
        Ok(author.clone())
    }

    async fn delete_author(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.author(id)?;

        let nb_books = state.books.iter().filter(|b| b.author_id == id).count();
        if nb_books > 0 {
            return Err(AppError::Conflict(format!(
                "Author {} still has {} book(s)",
                id, nb_books
            )));
        }

        state.authors.retain(|a| a.id != id);
        Ok(())
    }

    async fn count_authors(&self) -> AppResult<i64> {
        Ok(self.state.read().await.authors.len() as i64)
    }
}

#[async_trait]
impl GenreStore for MemoryStore {
    async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        let mut genres = self.state.read().await.genres.clone();
        genres.sort_by(|a, b| (&a.name, a.id).cmp(&(&b.name, b.id)));
        Ok(genres)
    }

    async fn create_genre(&self, genre: &CreateGenre) -> AppResult<Genre> {
        let mut state = self.state.write().await;
        let created = Genre {
            id: next_id(&mut state.last_genre_id),
            name: genre.name.clone(),
        };
        state.genres.push(created.clone());
        Ok(created)
    }

    async fn genres_for_book(&self, book_id: i32) -> AppResult<Vec<Genre>> {
        let state = self.state.read().await;
        Ok(state
            .book_genres
            .iter()
            .filter(|(b, _)| *b == book_id)
            .filter_map(|(_, g)| state.genres.iter().find(|genre| genre.id == *g).cloned())
            .collect())
    }

    async fn count_genres_matching(&self, term: &str) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .genres
            .iter()
            .filter(|g| contains_ignore_case(&g.name, term))
            .count() as i64)
    }
}

#[async_trait]
impl BookStore for MemoryStore {
    async fn list_books(&self, author_id: Option<i32>, page: PageRequest) -> AppResult<(Vec<BookShort>, i64)> {
        let state = self.state.read().await;
        let mut books: Vec<BookShort> = state
            .books
            .iter()
            .filter(|b| author_id.map_or(true, |id| b.author_id == id))
            .map(|b| state.book_short(b))
            .collect();
        books.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(paginate(&books, page))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let state = self.state.read().await;
        let mut books: Vec<BookShort> = state
            .books
            .iter()
            .filter(|b| b.author_id == author_id)
            .map(|b| state.book_short(b))
            .collect();
        books.sort_by(|a, b| (&a.title, a.id).cmp(&(&b.title, b.id)));
        Ok(books)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        self.state
            .read()
            .await
            .books
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let mut state = self.state.write().await;
        state.author(book.author_id)?;

        let id = state.last_book_id + 1;
        state.set_genres(id, &book.genre_ids)?;
        state.last_book_id = id;

        let created = Book {
            id,
            title: book.title.clone(),
            summary: book.summary.clone(),
            isbn: book.isbn.clone(),
            author_id: book.author_id,
        };
        state.books.push(created.clone());
        Ok(created)
    }

    async fn update_book(&self, book: &Book, genre_ids: Option<&[i32]>) -> AppResult<Book> {
        let mut state = self.state.write().await;
        if !state.books.iter().any(|b| b.id == book.id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", book.id)));
        }
        state.author(book.author_id)?;

        if let Some(genre_ids) = genre_ids {
            state.set_genres(book.id, genre_ids)?;
        }
        if let Some(existing) = state.books.iter_mut().find(|b| b.id == book.id) {
            *existing = book.clone();
        }
        Ok(book.clone())
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        let mut state = self.state.write().await;
        if !state.books.iter().any(|b| b.id == id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        state.books.retain(|b| b.id != id);
        state.book_genres.retain(|(b, _)| *b != id);
        state.copies.retain(|c| c.book_id != id);
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        Ok(self.state.read().await.books.len() as i64)
    }

    async fn count_books_matching(&self, term: &str) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .books
            .iter()
            .filter(|b| contains_ignore_case(&b.title, term))
            .count() as i64)
    }
}

#[async_trait]
impl CopyStore for MemoryStore {
    async fn copies_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let state = self.state.read().await;
        Ok(state
            .copies
            .iter()
            .filter(|c| c.book_id == book_id)
            .cloned()
            .collect())
    }

    async fn list_copies(&self, filter: CopyFilter, page: PageRequest) -> AppResult<(Vec<BookInstance>, i64)> {
        let state = self.state.read().await;
        let copies: Vec<BookInstance> = state
            .copies
            .iter()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        Ok(paginate(&copies, page))
    }

    async fn get_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        self.state
            .read()
            .await
            .copies
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn create_copy(&self, copy: &BookInstance) -> AppResult<BookInstance> {
        copy.check_borrower()?;
        let mut state = self.state.write().await;
        if !state.books.iter().any(|b| b.id == copy.book_id) {
            return Err(AppError::NotFound(format!("Book with id {} not found", copy.book_id)));
        }
        if state.copies.iter().any(|c| c.id == copy.id) {
            return Err(AppError::Conflict(format!("Copy {} already exists", copy.id)));
        }
        state.copies.push(copy.clone());
        Ok(copy.clone())
    }

    async fn update_copy(&self, copy: &BookInstance) -> AppResult<BookInstance> {
        copy.check_borrower()?;
        let mut state = self.state.write().await;
        let existing = state.copy_mut(copy.id)?;
        *existing = copy.clone();
        Ok(copy.clone())
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        let mut state = self.state.write().await;
        let before = state.copies.len();
        state.copies.retain(|c| c.id != id);
        if state.copies.len() == before {
            return Err(AppError::NotFound(format!("Copy {} not found", id)));
        }
        Ok(())
    }

    async fn count_copies(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .copies
            .iter()
            .filter(|c| status.map(|s| c.status == s).unwrap_or(true))
            .count() as i64)
    }

    async fn loans_for(&self, borrower_id: i32, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)> {
        let state = self.state.read().await;
        let loans = state.loans(|c| c.borrower_id == Some(borrower_id));
        Ok(paginate(&loans, page))
    }

    async fn all_on_loan(&self, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)> {
        let state = self.state.read().await;
        let loans = state.loans(|_| true);
        Ok(paginate(&loans, page))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut state = self.state.write().await;
        let copy = state.copy_mut(id)?;
        copy.due_back = Some(due_back);
        Ok(copy.clone())
    }

    async fn checkout(&self, id: Uuid, borrower_id: i32, due_back: NaiveDate) -> AppResult<BookInstance> {
        let mut state = self.state.write().await;
        let copy = state.copy_mut(id)?;
        if copy.status != LoanStatus::Available {
            return Err(AppError::Conflict(format!(
                "Copy {} is '{}', expected '{}'",
                id,
                copy.status,
                LoanStatus::Available
            )));
        }
        copy.status = LoanStatus::OnLoan;
        copy.borrower_id = Some(borrower_id);
        copy.due_back = Some(due_back);
        Ok(copy.clone())
    }

    async fn return_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        let mut state = self.state.write().await;
        let copy = state.copy_mut(id)?;
        if copy.status != LoanStatus::OnLoan {
            return Err(AppError::Conflict(format!(
                "Copy {} is '{}', expected '{}'",
                id,
                copy.status,
                LoanStatus::OnLoan
            )));
        }
        copy.status = LoanStatus::Available;
        copy.borrower_id = None;
        copy.due_back = None;
        Ok(copy.clone())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_user(&self, id: i32) -> AppResult<User> {
        self.state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    async fn find_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .read()
            .await
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, user: &CreateUser, password_hash: &str) -> AppResult<User> {
        let mut state = self.state.write().await;
        if state.users.iter().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                user.username
            )));
        }

        let created = User {
            id: next_id(&mut state.last_user_id),
            username: user.username.clone(),
            password: password_hash.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            permissions: user.permissions.clone(),
        };
        state.users.push(created.clone());
        Ok(created)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn record_visit(&self, session_id: Uuid) -> AppResult<i64> {
        let mut state = self.state.write().await;
        let now = Utc::now();
        let session = state.sessions.entry(session_id).or_insert(Session {
            visits: 0,
            last_seen: now,
        });
        session.visits += 1;
        session.last_seen = now;
        Ok(session.visits)
    }

    async fn purge_sessions(&self, cutoff: DateTime<Utc>) -> AppResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.last_seen >= cutoff);
        Ok((before - state.sessions.len()) as u64)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
