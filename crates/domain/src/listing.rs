//! Wire envelope of the list-books API.

use serde::{Deserialize, Serialize};

use crate::book::Book;

/// `{ "success": bool, "message": Book[] | string }`.
///
/// On success `message` carries the books; otherwise a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookListing {
    pub success: bool,
    pub message: ListingMessage,
}

/// Payload slot of [`BookListing`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListingMessage {
    Books(Vec<Book>),
    Text(String),
}

impl BookListing {
    #[must_use]
    pub fn books(books: Vec<Book>) -> Self {
        Self {
            success: true,
            message: ListingMessage::Books(books),
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            message: ListingMessage::Text(reason.into()),
        }
    }

    /// The books, when the envelope reports success and carries a list.
    #[must_use]
    pub fn into_books(self) -> Option<Vec<Book>> {
        match (self.success, self.message) {
            (true, ListingMessage::Books(books)) => Some(books),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BookId;

    #[test]
    fn should_parse_successful_listing() {
        let listing: BookListing = serde_json::from_str(
            r#"{"success":true,"message":[{"id":1,"name":"Shawshank Redemption"}]}"#,
        )
        .unwrap();
        let books = listing.into_books().unwrap();
        assert_eq!(books[0].id, BookId(1));
    }

    #[test]
    fn should_parse_rejected_listing() {
        let listing: BookListing =
            serde_json::from_str(r#"{"success":false,"message":"POST method not allowed"}"#)
                .unwrap();
        assert_eq!(
            listing.message,
            ListingMessage::Text("POST method not allowed".to_string())
        );
        assert!(listing.into_books().is_none());
    }

    #[test]
    fn should_not_yield_books_when_flag_is_false() {
        let listing = BookListing {
            success: false,
            message: ListingMessage::Books(vec![]),
        };
        assert!(listing.into_books().is_none());
    }

    #[test]
    fn should_serialize_rejection_in_wire_shape() {
        let json = serde_json::to_value(BookListing::rejected("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"success": false, "message": "nope"}));
    }
}
