//! Book instances (copies) repository: availability and loan queries

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{
        book_instance::{BookInstance, CopyFilter, LoanEntry, LoanStatus},
        page::PageRequest,
    },
};

use super::{CopyStore, Repository};

const COPY_COLUMNS: &str = "id, book_id, imprint, due_back, status, borrower_id";

const LOAN_SELECT: &str = r#"
    SELECT bi.id, bi.book_id, b.title, bi.imprint, bi.due_back, bi.status,
           bi.borrower_id, u.username AS borrower_username
    FROM book_instances bi
    JOIN books b ON b.id = bi.book_id
    LEFT JOIN users u ON u.id = bi.borrower_id
"#;

/// Soonest due first; equal dates keep insertion order
const LOAN_ORDER: &str = "ORDER BY bi.due_back ASC NULLS LAST, bi.created_at, bi.id";

impl Repository {
    /// Tell a missing copy apart from one in the wrong state
    async fn copy_state_conflict(&self, id: Uuid, expected: LoanStatus) -> AppError {
        match self.get_copy(id).await {
            Ok(copy) => AppError::Conflict(format!(
                "Copy {} is '{}', expected '{}'",
                id, copy.status, expected
            )),
            Err(e) => e,
        }
    }
}

#[async_trait]
impl CopyStore for Repository {
    async fn copies_for_book(&self, book_id: i32) -> AppResult<Vec<BookInstance>> {
        let copies = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE book_id = $1 ORDER BY created_at, id",
            COPY_COLUMNS
        ))
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    async fn get_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances WHERE id = $1",
            COPY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn list_copies(&self, filter: CopyFilter, page: PageRequest) -> AppResult<(Vec<BookInstance>, i64)> {
        const COPY_FILTER: &str = "WHERE ($1::TEXT IS NULL OR status = $1) AND ($2::DATE IS NULL OR due_back <= $2)";

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM book_instances {}", COPY_FILTER))
            .bind(filter.status)
            .bind(filter.due_by)
            .fetch_one(&self.pool)
            .await?;

        let copies = sqlx::query_as::<_, BookInstance>(&format!(
            "SELECT {} FROM book_instances {} ORDER BY created_at, id LIMIT $3 OFFSET $4",
            COPY_COLUMNS, COPY_FILTER
        ))
        .bind(filter.status)
        .bind(filter.due_by)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((copies, total))
    }

    async fn create_copy(&self, copy: &BookInstance) -> AppResult<BookInstance> {
        copy.check_borrower()?;
        let created = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            INSERT INTO book_instances (id, book_id, imprint, due_back, status, borrower_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(copy.id)
        .bind(copy.book_id)
        .bind(&copy.imprint)
        .bind(copy.due_back)
        .bind(copy.status)
        .bind(copy.borrower_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn update_copy(&self, copy: &BookInstance) -> AppResult<BookInstance> {
        copy.check_borrower()?;
        sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET imprint = $2, due_back = $3, status = $4, borrower_id = $5
            WHERE id = $1
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(copy.id)
        .bind(&copy.imprint)
        .bind(copy.due_back)
        .bind(copy.status)
        .bind(copy.borrower_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", copy.id)))
    }

    async fn delete_copy(&self, id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM book_instances WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Copy {} not found", id)));
        }
        Ok(())
    }

    async fn count_copies(&self, status: Option<LoanStatus>) -> AppResult<i64> {
        let count: i64 = match status {
            Some(status) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
                    .bind(status)
                    .fetch_one(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM book_instances")
                    .fetch_one(&self.pool)
                    .await?
            }
        };
        Ok(count)
    }

    async fn loans_for(&self, borrower_id: i32, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM book_instances WHERE borrower_id = $1 AND status = $2",
        )
        .bind(borrower_id)
        .bind(LoanStatus::OnLoan)
        .fetch_one(&self.pool)
        .await?;

        let loans = sqlx::query_as::<_, LoanEntry>(&format!(
            "{} WHERE bi.borrower_id = $1 AND bi.status = $2 {} LIMIT $3 OFFSET $4",
            LOAN_SELECT, LOAN_ORDER
        ))
        .bind(borrower_id)
        .bind(LoanStatus::OnLoan)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((loans, total))
    }

    async fn all_on_loan(&self, page: PageRequest) -> AppResult<(Vec<LoanEntry>, i64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM book_instances WHERE status = $1")
            .bind(LoanStatus::OnLoan)
            .fetch_one(&self.pool)
            .await?;

        let loans = sqlx::query_as::<_, LoanEntry>(&format!(
            "{} WHERE bi.status = $1 {} LIMIT $2 OFFSET $3",
            LOAN_SELECT, LOAN_ORDER
        ))
        .bind(LoanStatus::OnLoan)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((loans, total))
    }

    async fn set_due_back(&self, id: Uuid, due_back: NaiveDate) -> AppResult<BookInstance> {
        sqlx::query_as::<_, BookInstance>(&format!(
            "UPDATE book_instances SET due_back = $2 WHERE id = $1 RETURNING {}",
            COPY_COLUMNS
        ))
        .bind(id)
        .bind(due_back)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Copy {} not found", id)))
    }

    async fn checkout(&self, id: Uuid, borrower_id: i32, due_back: NaiveDate) -> AppResult<BookInstance> {
        let updated = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET status = $2, borrower_id = $3, due_back = $4
            WHERE id = $1 AND status = $5
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(id)
        .bind(LoanStatus::OnLoan)
        .bind(borrower_id)
        .bind(due_back)
        .bind(LoanStatus::Available)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(copy) => Ok(copy),
            None => Err(self.copy_state_conflict(id, LoanStatus::Available).await),
        }
    }

    async fn return_copy(&self, id: Uuid) -> AppResult<BookInstance> {
        let updated = sqlx::query_as::<_, BookInstance>(&format!(
            r#"
            UPDATE book_instances
            SET status = $2, borrower_id = NULL, due_back = NULL
            WHERE id = $1 AND status = $3
            RETURNING {}
            "#,
            COPY_COLUMNS
        ))
        .bind(id)
        .bind(LoanStatus::Available)
        .bind(LoanStatus::OnLoan)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(copy) => Ok(copy),
            None => Err(self.copy_state_conflict(id, LoanStatus::OnLoan).await),
        }
    }
}
