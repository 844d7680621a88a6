use garde::Validate;
use serde::{Deserialize, Serialize};

pub const MIN_YEAR_PUBLISHED: i32 = 1400;
pub const MAX_YEAR_PUBLISHED: i32 = 9999;

/// A catalog entry as stored in the `book` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Assigned by storage on first save; `None` until then
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    pub year_published: i32,
}

impl Book {
    /// Unsaved book carrying the request's fields
    pub fn from_request(request: BookRequest) -> Self {
        Self {
            id: None,
            title: request.title.unwrap_or_default(),
            author: request.author.unwrap_or_default(),
            year_published: request.year_published,
        }
    }

    /// Overwrite every mutable field; nothing from the previous state survives.
    pub fn apply(&mut self, request: BookRequest) {
        self.title = request.title.unwrap_or_default();
        self.author = request.author.unwrap_or_default();
        self.year_published = request.year_published;
    }
}

/// Body of create and full-update requests.
///
/// `title` and `author` accept missing or `null` values so that they surface as validation
/// errors alongside any other violations instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    #[serde(default)]
    #[garde(custom(title_not_blank))]
    pub title: Option<String>,
    #[serde(default)]
    #[garde(custom(author_not_blank))]
    pub author: Option<String>,
    #[garde(custom(year_in_range))]
    pub year_published: i32,
}

fn title_not_blank(value: &Option<String>, _: &()) -> garde::Result {
    not_blank(value.as_deref(), "Title is required")
}

fn author_not_blank(value: &Option<String>, _: &()) -> garde::Result {
    not_blank(value.as_deref(), "Author is required")
}

fn not_blank(value: Option<&str>, message: &str) -> garde::Result {
    match value.map(str::trim) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(garde::Error::new(message)),
    }
}

fn year_in_range(value: &i32, _: &()) -> garde::Result {
    if *value < MIN_YEAR_PUBLISHED {
        Err(garde::Error::new(format!(
            "Year published must be greater than or equal to {}",
            MIN_YEAR_PUBLISHED
        )))
    } else if *value > MAX_YEAR_PUBLISHED {
        Err(garde::Error::new(format!(
            "Year published must be less than {}",
            MAX_YEAR_PUBLISHED + 1
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, author: &str, year_published: i32) -> BookRequest {
        BookRequest {
            title: Some(title.to_string()),
            author: Some(author.to_string()),
            year_published,
        }
    }

    fn messages(request: BookRequest) -> Vec<String> {
        match request.validate() {
            Ok(()) => Vec::new(),
            Err(report) => report
                .iter()
                .map(|(path, error)| format!("{}: {}", path, error.message()))
                .collect(),
        }
    }

    #[test]
    fn valid_request_passes() {
        assert!(messages(request("Dune", "Herbert", 1965)).is_empty());
        assert!(messages(request("Incunable", "Anon", 1400)).is_empty());
        assert!(messages(request("Far Future", "Someone", 9999)).is_empty());
    }

    #[test]
    fn blank_title_is_rejected() {
        assert_eq!(
            messages(request("   ", "Herbert", 1965)),
            vec!["title: Title is required"]
        );
    }

    #[test]
    fn blank_author_is_rejected() {
        assert_eq!(
            messages(request("Dune", "", 1965)),
            vec!["author: Author is required"]
        );
    }

    #[test]
    fn missing_title_and_author_are_rejected() {
        let request = BookRequest {
            title: None,
            author: None,
            year_published: 1965,
        };
        assert_eq!(
            messages(request),
            vec!["title: Title is required", "author: Author is required"]
        );
    }

    #[test]
    fn absent_fields_deserialize_to_none() {
        let request: BookRequest =
            serde_json::from_str(r#"{"author":null,"yearPublished":1965}"#).unwrap();
        assert_eq!(request.title, None);
        assert_eq!(request.author, None);
    }

    #[test]
    fn year_out_of_range_is_rejected() {
        assert_eq!(
            messages(request("Dune", "Herbert", 1399)),
            vec!["year_published: Year published must be greater than or equal to 1400"]
        );
        assert_eq!(
            messages(request("Dune", "Herbert", 10000)),
            vec!["year_published: Year published must be less than 10000"]
        );
    }

    #[test]
    fn book_serializes_with_camel_case_keys() {
        let book = Book {
            id: Some(3),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            year_published: 1965,
        };
        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            serde_json::json!({
                "id": 3,
                "title": "Dune",
                "author": "Herbert",
                "yearPublished": 1965
            })
        );
    }

    #[test]
    fn apply_overwrites_all_fields() {
        let mut book = Book::from_request(request("Old", "Someone", 1500));
        book.id = Some(9);
        book.apply(request("New", "Another", 2001));
        assert_eq!(book.id, Some(9));
        assert_eq!(book.title, "New");
        assert_eq!(book.author, "Another");
        assert_eq!(book.year_published, 2001);
    }
}
