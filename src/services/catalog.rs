//! Catalog management service: authors, books, genres and copies

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::{
        author::{Author, AuthorDetails, AuthorShort, CreateAuthor, UpdateAuthor},
        book::{self, Book, BookDetails, BookShort, CreateBook, UpdateBook},
        book_instance::{BookInstance, CopyFilter, CreateBookInstance, LoanStatus, UpdateBookInstance},
        genre::{CreateGenre, Genre},
        home::HomeSummary,
        page::{Page, PageRequest},
    },
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    config: CatalogConfig,
}

/// Died before being born
fn check_lifespan(born: Option<NaiveDate>, died: Option<NaiveDate>) -> AppResult<()> {
    if let (Some(born), Some(died)) = (born, died) {
        if died < born {
            return Err(AppError::field(
                "date_of_death",
                "Date of death cannot precede date of birth",
            ));
        }
    }
    Ok(())
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, config: CatalogConfig) -> Self {
        Self { store, config }
    }

    // --- Authors ---

    /// Authors by name, `authors_per_page` at a time
    pub async fn list_authors(&self, page: Option<&str>) -> AppResult<Page<AuthorShort>> {
        let request = PageRequest::parse(page, self.config.authors_per_page)?;
        let (authors, total) = self.store.list_authors(request).await?;
        Ok(Page::new(authors, total, request)?.map(AuthorShort::from))
    }

    pub async fn get_author(&self, id: i32) -> AppResult<AuthorDetails> {
        let author = self.store.get_author(id).await?;
        let books = self.store.books_by_author(id).await?;
        Ok(AuthorDetails {
            name: author.display_name(),
            author,
            books,
        })
    }

    pub async fn create_author(&self, author: CreateAuthor) -> AppResult<Author> {
        author.validate()?;
        check_lifespan(author.date_of_birth, author.date_of_death)?;

        let created = self.store.create_author(&author).await?;
        tracing::info!("Author {} created: {}", created.id, created);
        Ok(created)
    }

    pub async fn update_author(&self, id: i32, update: UpdateAuthor) -> AppResult<Author> {
        update.validate()?;
        let author = update.apply(self.store.get_author(id).await?);
        check_lifespan(author.date_of_birth, author.date_of_death)?;
        self.store.update_author(&author).await
    }

    pub async fn delete_author(&self, id: i32) -> AppResult<()> {
        self.store.delete_author(id).await?;
        tracing::info!("Author {} deleted", id);
        Ok(())
    }

    // --- Books ---

    /// Books by title, `books_per_page` at a time
    pub async fn list_books(&self, author_id: Option<i32>, page: Option<&str>) -> AppResult<Page<BookShort>> {
        let request = PageRequest::parse(page, self.config.books_per_page)?;
        let (books, total) = self.store.list_books(author_id, request).await?;
        Page::new(books, total, request)
    }

    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.store.get_book(id).await?;
        let author = self.store.get_author(book.author_id).await?;
        let genres = self.store.genres_for_book(id).await?;
        let copies = self.store.copies_for_book(id).await?;

        Ok(BookDetails {
            display_genre: book::display_genre(&genres),
            book,
            author: author.into(),
            genres,
            copies,
        })
    }

    /// An unknown author is a bad value in the request, not a missing resource
    async fn check_author(&self, author_id: i32) -> AppResult<()> {
        match self.store.get_author(author_id).await {
            Ok(_) => Ok(()),
            Err(AppError::NotFound(_)) => Err(AppError::field(
                "author_id",
                format!("Author {} does not exist", author_id),
            )),
            Err(e) => Err(e),
        }
    }

    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()?;
        self.check_author(book.author_id).await?;

        let created = self.store.create_book(&book).await?;
        tracing::info!("Book {} created: {}", created.id, created);
        Ok(created)
    }

    pub async fn update_book(&self, id: i32, update: UpdateBook) -> AppResult<Book> {
        update.validate()?;
        let book = update.apply(self.store.get_book(id).await?);
        if update.author_id.is_some() {
            self.check_author(book.author_id).await?;
        }
        self.store
            .update_book(&book, update.genre_ids.as_deref())
            .await
    }

    pub async fn delete_book(&self, id: i32) -> AppResult<()> {
        self.store.delete_book(id).await?;
        tracing::info!("Book {} deleted with its copies", id);
        Ok(())
    }

    // --- Genres ---

    pub async fn list_genres(&self) -> AppResult<Vec<Genre>> {
        self.store.list_genres().await
    }

    pub async fn create_genre(&self, genre: CreateGenre) -> AppResult<Genre> {
        genre.validate()?;
        self.store.create_genre(&genre).await
    }

    // --- Copies ---

    pub async fn list_copies(&self, filter: CopyFilter, page: Option<&str>) -> AppResult<Page<BookInstance>> {
        let request = PageRequest::parse(page, self.config.copies_per_page)?;
        let (copies, total) = self.store.list_copies(filter, request).await?;
        Page::new(copies, total, request)
    }

    pub async fn get_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        self.store.get_copy(id).await
    }

    /// A borrower must be an existing user and the copy must be on loan
    async fn check_copy(&self, copy: &BookInstance) -> AppResult<()> {
        copy.check_borrower()?;
        if let Some(borrower_id) = copy.borrower_id {
            match self.store.get_user(borrower_id).await {
                Ok(_) => {}
                Err(AppError::NotFound(_)) => {
                    return Err(AppError::field(
                        "borrower_id",
                        format!("User {} does not exist", borrower_id),
                    ))
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    pub async fn create_copy(&self, book_id: i32, copy: CreateBookInstance) -> AppResult<BookInstance> {
        copy.validate()?;
        self.store.get_book(book_id).await?;

        let copy = copy.into_instance(book_id);
        self.check_copy(&copy).await?;

        let created = self.store.create_copy(&copy).await?;
        tracing::info!("Copy {} of book {} created", created.id, book_id);
        Ok(created)
    }

    pub async fn update_copy(&self, id: Uuid, update: UpdateBookInstance) -> AppResult<BookInstance> {
        update.validate()?;
        let copy = update.apply(self.store.get_copy(id).await?);
        self.check_copy(&copy).await?;
        self.store.update_copy(&copy).await
    }

    pub async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        self.store.delete_copy(id).await?;
        tracing::info!("Copy {} deleted", id);
        Ok(())
    }

    // --- Home ---

    /// Catalog counts plus the visit count of `session_id`, this visit included.
    /// Missing terms fall back to the configured ones.
    pub async fn home(
        &self,
        session_id: Uuid,
        genre_term: Option<&str>,
        title_term: Option<&str>,
    ) -> AppResult<HomeSummary> {
        let genre_term = genre_term.unwrap_or(&self.config.home_genre_term).to_string();
        let title_term = title_term.unwrap_or(&self.config.home_title_term).to_string();

        let cutoff = Utc::now() - Duration::hours(self.config.session_ttl_hours);
        let purged = self.store.purge_sessions(cutoff).await?;
        if purged > 0 {
            tracing::debug!("Purged {} idle sessions", purged);
        }
        let num_visits = self.store.record_visit(session_id).await?;

        Ok(HomeSummary {
            num_books: self.store.count_books().await?,
            num_instances: self.store.count_copies(None).await?,
            num_instances_available: self.store.count_copies(Some(LoanStatus::Available)).await?,
            num_authors: self.store.count_authors().await?,
            num_genres_matching: self.store.count_genres_matching(&genre_term).await?,
            num_books_matching: self.store.count_books_matching(&title_term).await?,
            genre_term,
            title_term,
            num_visits,
        })
    }
}
