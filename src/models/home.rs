//! Home page summary

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Counts shown on the home page
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HomeSummary {
    pub num_books: i64,
    pub num_instances: i64,
    pub num_instances_available: i64,
    pub num_authors: i64,
    /// Term matched against genre names
    pub genre_term: String,
    pub num_genres_matching: i64,
    /// Term matched against book titles
    pub title_term: String,
    pub num_books_matching: i64,
    /// Home visits within the caller's session, this one included
    pub num_visits: i64,
}

/// Optional overrides of the configured search terms
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HomeQuery {
    pub genre: Option<String>,
    pub title: Option<String>,
}
