//! Access control: which capabilities each operation needs, and the gate
//! that checks a caller against them.
//!
//! Authentication is always checked before any permission, so an anonymous
//! caller gets `Unauthenticated` even on operations that also need a
//! permission. Handlers run the gate before looking up the target entity,
//! which means a caller without permission never learns whether an id exists.

use crate::{
    error::{AppError, AppResult},
    models::user::{Permission, UserClaims},
};

/// A requirement an operation places on its caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Permission(Permission),
}

/// Every operation exposed by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Home,
    CurrentUser,
    ListAuthors,
    ViewAuthor,
    CreateAuthor,
    UpdateAuthor,
    DeleteAuthor,
    ListBooks,
    ViewBook,
    CreateBook,
    UpdateBook,
    DeleteBook,
    ListGenres,
    CreateGenre,
    ListCopies,
    ViewCopy,
    CreateCopy,
    UpdateCopy,
    DeleteCopy,
    MyLoans,
    AllLoans,
    RenewLoan,
    Checkout,
    Return,
}

const NONE: &[Capability] = &[];
const AUTHENTICATED: &[Capability] = &[Capability::Authenticated];
const MANAGE_AUTHORS: &[Capability] = &[
    Capability::Authenticated,
    Capability::Permission(Permission::ManageAuthors),
];
const MANAGE_BOOKS: &[Capability] = &[
    Capability::Authenticated,
    Capability::Permission(Permission::ManageBooks),
];
const VIEW_ALL_LOANS: &[Capability] = &[
    Capability::Authenticated,
    Capability::Permission(Permission::ViewAllLoans),
];
const MARK_RETURNED: &[Capability] = &[
    Capability::Authenticated,
    Capability::Permission(Permission::MarkReturned),
];

impl Operation {
    pub fn requirements(&self) -> &'static [Capability] {
        match self {
            Operation::Home
            | Operation::ViewAuthor
            | Operation::ViewBook
            | Operation::ListGenres
            | Operation::ViewCopy => NONE,
            Operation::CurrentUser
            | Operation::ListAuthors
            | Operation::ListBooks
            | Operation::MyLoans => AUTHENTICATED,
            Operation::CreateAuthor | Operation::UpdateAuthor | Operation::DeleteAuthor => {
                MANAGE_AUTHORS
            }
            Operation::CreateBook
            | Operation::UpdateBook
            | Operation::DeleteBook
            | Operation::CreateGenre
            | Operation::ListCopies
            | Operation::CreateCopy
            | Operation::UpdateCopy
            | Operation::DeleteCopy => MANAGE_BOOKS,
            Operation::AllLoans => VIEW_ALL_LOANS,
            Operation::RenewLoan | Operation::Checkout | Operation::Return => MARK_RETURNED,
        }
    }
}

/// The identity behind a request, if any
#[derive(Debug, Clone, Default)]
pub struct Caller {
    claims: Option<UserClaims>,
    /// Requested path, handed back to unauthenticated callers
    path: Option<String>,
}

impl Caller {
    pub fn anonymous(path: Option<String>) -> Self {
        Self { claims: None, path }
    }

    pub fn authenticated(claims: UserClaims, path: Option<String>) -> Self {
        Self {
            claims: Some(claims),
            path,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.claims.is_some()
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.claims
            .as_ref()
            .map(|c| c.has_permission(permission))
            .unwrap_or(false)
    }

    /// Claims of an authenticated caller
    pub fn claims(&self) -> AppResult<&UserClaims> {
        self.claims.as_ref().ok_or_else(|| AppError::Unauthenticated {
            next: self.path.clone(),
        })
    }

    /// Check the caller against everything `operation` requires
    pub fn authorize(&self, operation: Operation) -> AppResult<()> {
        let required = operation.requirements();

        let needs_identity = required
            .iter()
            .any(|c| matches!(c, Capability::Authenticated | Capability::Permission(_)));
        if needs_identity && !self.is_authenticated() {
            return Err(AppError::Unauthenticated {
                next: self.path.clone(),
            });
        }

        for capability in required {
            if let Capability::Permission(permission) = capability {
                if !self.has_permission(*permission) {
                    tracing::debug!(?operation, %permission, "permission denied");
                    return Err(AppError::Forbidden(format!(
                        "Permission '{}' required",
                        permission
                    )));
                }
            }
        }

        Ok(())
    }
}
