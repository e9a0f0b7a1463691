use libsql::Row;

use crate::api::{NewBook, NewUserBook, RatingUpdate};
use crate::db::Database;
use crate::error::GatewayError;
use crate::model::{DatabaseInfo, UserBook, UserBookDetails};

/// The statements behind each API operation.
pub struct Library<'a> {
    db: &'a Database,
}

impl<'a> Library<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub async fn add_book(&self, book: &NewBook) -> Result<i64, GatewayError> {
        let query = r#"
            INSERT INTO books (title, author, description, isbn, cover_url)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
        "#;

        self.db
            .query_row(
                query,
                libsql::params![
                    book.title.as_str(),
                    book.author.as_str(),
                    book.description.as_str(),
                    book.isbn.as_str(),
                    book.cover_url.as_str()
                ],
                |row| row.get::<i64>(0),
            )
            .await
    }

    pub async fn add_user_book(&self, entry: &NewUserBook) -> Result<i64, GatewayError> {
        let query = r#"
            INSERT INTO user_books (user_id, book_id, status, rating, review, progress)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id
        "#;

        self.db
            .query_row(
                query,
                libsql::params![
                    entry.user_id,
                    entry.book_id,
                    entry.status.as_str(),
                    entry.rating,
                    entry.review.as_str(),
                    entry.progress
                ],
                |row| row.get::<i64>(0),
            )
            .await
    }

    /// Returns the number of rows touched; zero means no such user book.
    pub async fn update_rating(&self, id: i64, update: &RatingUpdate) -> Result<u64, GatewayError> {
        let query = r#"
            UPDATE user_books
            SET rating = ?, review = ?, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            WHERE id = ?
        "#;

        self.db
            .execute(query, libsql::params![update.rating, update.review.as_str(), id])
            .await
    }

    pub async fn remove_user_book(&self, id: i64) -> Result<u64, GatewayError> {
        self.db
            .execute("DELETE FROM user_books WHERE id = ?", libsql::params![id])
            .await
    }

    pub async fn list_user_books(&self, user_id: i64) -> Result<Vec<UserBookDetails>, GatewayError> {
        let query = r#"
            SELECT ub.id, ub.user_id, ub.book_id, ub.status, ub.rating, ub.review, ub.progress,
                   b.title, b.author, b.description, b.isbn, b.cover_url
            FROM user_books ub
            JOIN books b ON ub.book_id = b.id
            WHERE ub.user_id = ?
            ORDER BY ub.id
        "#;

        self.db
            .query_set(query, libsql::params![user_id], row_to_details)
            .await
    }

    /// Diagnostic scalars. Each lookup is allowed to fail on its own and
    /// falls back to the zero value instead of failing the whole call.
    pub async fn info(&self) -> DatabaseInfo {
        let version = self
            .db
            .query_row("SELECT sqlite_version()", (), |row| row.get::<String>(0))
            .await
            .unwrap_or_default();
        let database = self
            .db
            .query_row(
                "SELECT file FROM pragma_database_list WHERE name = 'main'",
                (),
                |row| row.get::<Option<String>>(0),
            )
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        let tables_count = self
            .db
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
                (),
                |row| row.get::<i64>(0),
            )
            .await
            .unwrap_or_default();

        DatabaseInfo {
            version,
            database,
            user: self.db.user().to_string(),
            tables_count,
        }
    }
}

fn text(row: &Row, idx: i32) -> libsql::Result<String> {
    Ok(row.get::<Option<String>>(idx)?.unwrap_or_default())
}

fn row_to_details(row: &Row) -> libsql::Result<UserBookDetails> {
    Ok(UserBookDetails {
        user_book: UserBook {
            id: row.get(0)?,
            user_id: row.get(1)?,
            book_id: row.get(2)?,
            status: row.get(3)?,
            rating: row.get(4)?,
            review: text(row, 5)?,
            progress: row.get::<Option<i64>>(6)?.unwrap_or(0),
        },
        title: row.get(7)?,
        author: row.get(8)?,
        description: text(row, 9)?,
        isbn: text(row, 10)?,
        cover_url: text(row, 11)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::db::seed_user;
    use std::path::Path;

    async fn memory_db() -> Database {
        Database::new(&DatabaseConfig::default(), Path::new("."))
            .await
            .unwrap()
    }

    fn dune() -> NewBook {
        NewBook {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            description: "Spice".to_string(),
            isbn: "9780441013593".to_string(),
            cover_url: String::new(),
        }
    }

    fn reading(user_id: i64, book_id: i64) -> NewUserBook {
        NewUserBook {
            user_id,
            book_id,
            status: "reading".to_string(),
            rating: None,
            review: String::new(),
            progress: 12,
        }
    }

    #[tokio::test]
    async fn added_books_get_increasing_ids() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let first = lib.add_book(&dune()).await.unwrap();
        let second = lib.add_book(&dune()).await.unwrap();
        assert!(first > 0);
        assert!(second > first);
    }

    #[tokio::test]
    async fn list_joins_book_details() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let user_id = seed_user(&db, "paul").await;
        let book_id = lib.add_book(&dune()).await.unwrap();
        let id = lib.add_user_book(&reading(user_id, book_id)).await.unwrap();

        let books = lib.list_user_books(user_id).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].user_book.id, id);
        assert_eq!(books[0].user_book.progress, 12);
        assert_eq!(books[0].user_book.rating, None);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].description, "Spice");

        assert!(lib.list_user_books(user_id + 1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_pair_fails() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let user_id = seed_user(&db, "paul").await;
        let book_id = lib.add_book(&dune()).await.unwrap();
        lib.add_user_book(&reading(user_id, book_id)).await.unwrap();
        assert!(lib.add_user_book(&reading(user_id, book_id)).await.is_err());
    }

    #[tokio::test]
    async fn unknown_user_is_rejected_by_store() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let book_id = lib.add_book(&dune()).await.unwrap();
        assert!(matches!(
            lib.add_user_book(&reading(7, book_id)).await,
            Err(GatewayError::Store(_))
        ));
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected_by_store() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let user_id = seed_user(&db, "paul").await;
        let book_id = lib.add_book(&dune()).await.unwrap();
        let mut entry = reading(user_id, book_id);
        entry.rating = Some(9);
        assert!(matches!(
            lib.add_user_book(&entry).await,
            Err(GatewayError::Store(_))
        ));
    }

    #[tokio::test]
    async fn update_and_remove_report_rows_affected() {
        let db = memory_db().await;
        let lib = Library::new(&db);
        let user_id = seed_user(&db, "paul").await;
        let book_id = lib.add_book(&dune()).await.unwrap();
        let id = lib.add_user_book(&reading(user_id, book_id)).await.unwrap();
        let update = RatingUpdate {
            rating: 4,
            review: "solid".to_string(),
        };

        assert_eq!(lib.update_rating(id, &update).await.unwrap(), 1);
        assert_eq!(lib.update_rating(id + 100, &update).await.unwrap(), 0);
        assert_eq!(lib.remove_user_book(id).await.unwrap(), 1);
        assert_eq!(lib.remove_user_book(id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn info_reports_version_and_tables() {
        let db = memory_db().await;
        let info = Library::new(&db).info().await;
        assert!(!info.version.is_empty());
        assert_eq!(info.tables_count, 11);
        assert_eq!(info.database, "");
    }
}
