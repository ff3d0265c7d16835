//! Books repository for database operations

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookShort, CreateBook},
        page::PageRequest,
    },
};

use super::{BookStore, Repository};

const BOOK_COLUMNS: &str = "id, title, summary, isbn, author_id";

const BOOK_SHORT_SELECT: &str = r#"
    SELECT b.id, b.title, b.author_id, a.last_name || ', ' || a.first_name AS author
    FROM books b
    JOIN authors a ON a.id = b.author_id
"#;

/// Replace the genre set of a book, keeping the given order
async fn set_genres(
    tx: &mut Transaction<'_, Postgres>,
    book_id: i32,
    genre_ids: &[i32],
) -> AppResult<()> {
    let mut ids: Vec<i32> = Vec::with_capacity(genre_ids.len());
    for id in genre_ids {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }

    let known: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM genres WHERE id = ANY($1)")
        .bind(&ids)
        .fetch_one(&mut **tx)
        .await?;

    if known != ids.len() as i64 {
        return Err(AppError::field("genre_ids", "Unknown genre id"));
    }

    sqlx::query("DELETE FROM book_genres WHERE book_id = $1")
        .bind(book_id)
        .execute(&mut **tx)
        .await?;

    for (position, genre_id) in ids.iter().enumerate() {
        sqlx::query("INSERT INTO book_genres (book_id, genre_id, position) VALUES ($1, $2, $3)")
            .bind(book_id)
            .bind(genre_id)
            .bind(position as i32)
            .execute(&mut **tx)
            .await?;
    }

    Ok(())
}

#[async_trait]
impl BookStore for Repository {
    async fn list_books(&self, author_id: Option<i32>, page: PageRequest) -> AppResult<(Vec<BookShort>, i64)> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE ($1::INT IS NULL OR author_id = $1)")
                .bind(author_id)
                .fetch_one(&self.pool)
                .await?;

        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE ($1::INT IS NULL OR b.author_id = $1) ORDER BY b.title, b.id LIMIT $2 OFFSET $3",
            BOOK_SHORT_SELECT
        ))
        .bind(author_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((books, total))
    }

    async fn books_by_author(&self, author_id: i32) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(&format!(
            "{} WHERE b.author_id = $1 ORDER BY b.title, b.id",
            BOOK_SHORT_SELECT
        ))
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    async fn get_book(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    async fn create_book(&self, book: &CreateBook) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Book>(&format!(
            r#"
            INSERT INTO books (title, summary, isbn, author_id)
            VALUES ($1, $2, $3, $4)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .fetch_one(&mut *tx)
        .await?;

        set_genres(&mut tx, created.id, &book.genre_ids).await?;

        tx.commit().await?;
        Ok(created)
    }

    async fn update_book(&self, book: &Book, genre_ids: Option<&[i32]>) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Book>(&format!(
            r#"
            UPDATE books
            SET title = $2, summary = $3, isbn = $4, author_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.summary)
        .bind(&book.isbn)
        .bind(book.author_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", book.id)))?;

        if let Some(genre_ids) = genre_ids {
            set_genres(&mut tx, book.id, genre_ids).await?;
        }

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete_book(&self, id: i32) -> AppResult<()> {
        // book_instances and book_genres rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    async fn count_books(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn count_books_matching(&self, term: &str) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE POSITION(LOWER($1) IN LOWER(title)) > 0",
        )
        .bind(term)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
