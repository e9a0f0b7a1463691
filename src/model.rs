use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub cover_url: String,
}

/// One user's reading state for one book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBook {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub status: String,
    pub rating: Option<i64>,
    pub review: String,
    pub progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserBookDetails {
    #[serde(flatten)]
    pub user_book: UserBook,
    pub title: String,
    pub author: String,
    pub description: String,
    pub isbn: String,
    pub cover_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub version: String,
    pub database: String,
    pub user: String,
    pub tables_count: i64,
}
