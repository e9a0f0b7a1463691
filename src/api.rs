use crate::model::{Book, UserBook, UserBookDetails};
use serde::{Deserialize, Deserializer, Serialize};

/// Optional body fields: absent and `null` both take the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub isbn: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_url: String,
}

impl NewBook {
    pub fn into_book(self, id: i64) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            description: self.description,
            isbn: self.isbn,
            cover_url: self.cover_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUserBook {
    pub user_id: i64,
    pub book_id: i64,
    pub status: String,
    #[serde(default)]
    pub rating: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress: i64,
}

impl NewUserBook {
    pub fn into_user_book(self, id: i64) -> UserBook {
        UserBook {
            id,
            user_id: self.user_id,
            book_id: self.book_id,
            status: self.status,
            rating: self.rating,
            review: self.review,
            progress: self.progress,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RatingUpdate {
    pub rating: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub review: String,
}

#[derive(Debug, Deserialize)]
pub struct UserBooksQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: &'static str,
    pub db_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookCreated {
    pub message: &'static str,
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct UserBookCreated {
    pub message: &'static str,
    pub user_book: UserBook,
}

#[derive(Debug, Serialize)]
pub struct RatingUpdated {
    pub message: &'static str,
    pub rating: i64,
    pub review: String,
}

#[derive(Debug, Serialize)]
pub struct UserBooksResponse {
    pub user_id: i64,
    pub books: Vec<UserBookDetails>,
    pub count: usize,
}
