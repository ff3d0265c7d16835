//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod home;
pub mod page;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetails, AuthorShort};
pub use book::{Book, BookDetails, BookShort};
pub use book_instance::{BookInstance, LoanEntry, LoanStatus};
pub use genre::Genre;
pub use home::{HomeQuery, HomeSummary};
pub use page::{Page, PageQuery, PageRequest};
pub use user::{Permission, User, UserClaims};
