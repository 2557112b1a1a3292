//! Book catalogue entities guarded by the authorization gates.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 200;
/// Maximum author length, in characters.
pub const AUTHOR_MAX: usize = 150;

/// Validation failures for book form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    EmptyAuthor,
    AuthorTooLong { max: usize },
    InvalidPrice,
    NonPositivePrice,
}

impl fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::TitleTooLong { max } => write!(f, "Title must be at most {max} characters"),
            Self::EmptyAuthor => write!(f, "Author is required"),
            Self::AuthorTooLong { max } => write!(f, "Author must be at most {max} characters"),
            Self::InvalidPrice => write!(f, "Price must be a number with at most two decimals"),
            Self::NonPositivePrice => write!(f, "Price must be greater than zero"),
        }
    }
}

impl std::error::Error for BookValidationError {}

/// Book identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Strictly positive price held as integer cents.
///
/// # Examples
/// ```
/// use bookshelf::domain::Price;
///
/// let price = Price::parse("12.5").unwrap();
/// assert_eq!(price.cents(), 1250);
/// assert_eq!(price.to_string(), "12.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Price(u64);

impl Price {
    /// Parse a decimal with up to two fractional digits.
    pub fn parse(raw: &str) -> Result<Self, BookValidationError> {
        let raw = raw.trim();
        let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
        let digits_only = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if whole.is_empty() || !digits_only(whole) || !digits_only(fraction) || fraction.len() > 2
        {
            return Err(BookValidationError::InvalidPrice);
        }
        if raw.ends_with('.') {
            return Err(BookValidationError::InvalidPrice);
        }

        let whole: u64 = whole
            .parse()
            .map_err(|_| BookValidationError::InvalidPrice)?;
        let fraction: u64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<u64>().map_err(|_| BookValidationError::InvalidPrice)? * 10,
            _ => fraction
                .parse()
                .map_err(|_| BookValidationError::InvalidPrice)?,
        };
        let cents = whole
            .checked_mul(100)
            .and_then(|value| value.checked_add(fraction))
            .ok_or(BookValidationError::InvalidPrice)?;
        Self::from_cents(cents)
    }

    /// Build from a cent amount, rejecting zero.
    pub fn from_cents(cents: u64) -> Result<Self, BookValidationError> {
        if cents == 0 {
            return Err(BookValidationError::NonPositivePrice);
        }
        Ok(Self(cents))
    }

    pub fn cents(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl From<Price> for String {
    fn from(value: Price) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for Price {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Validated create/update payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub price: Price,
    pub description: Option<String>,
}

impl BookDraft {
    /// Validate every field and report all failures at once.
    pub fn try_from_parts(
        title: &str,
        author: &str,
        price: &str,
        description: Option<&str>,
    ) -> Result<Self, Vec<BookValidationError>> {
        let mut errors = Vec::new();
        let title = required_text(
            title,
            BookValidationError::EmptyTitle,
            BookValidationError::TitleTooLong { max: TITLE_MAX },
            TITLE_MAX,
        )
        .map_err(|err| errors.push(err))
        .ok();
        let author = required_text(
            author,
            BookValidationError::EmptyAuthor,
            BookValidationError::AuthorTooLong { max: AUTHOR_MAX },
            AUTHOR_MAX,
        )
        .map_err(|err| errors.push(err))
        .ok();
        let price = Price::parse(price).map_err(|err| errors.push(err)).ok();
        let description = description
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_owned);

        match (title, author, price) {
            (Some(title), Some(author), Some(price)) => Ok(Self {
                title,
                author,
                price,
                description,
            }),
            _ => Err(errors),
        }
    }
}

fn required_text(
    raw: &str,
    empty: BookValidationError,
    too_long: BookValidationError,
    max: usize,
) -> Result<String, BookValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > max {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: BookId,
    #[schema(example = "Cien años de soledad")]
    pub title: String,
    #[schema(example = "Gabriel García Márquez")]
    pub author: String,
    #[schema(value_type = String, example = "19.90")]
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Book {
    pub fn from_draft(id: BookId, draft: BookDraft) -> Self {
        let BookDraft {
            title,
            author,
            price,
            description,
        } = draft;
        Self {
            id,
            title,
            author,
            price,
            description,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("10", 1000)]
    #[case("10.5", 1050)]
    #[case("10.05", 1005)]
    #[case(" 0.01 ", 1)]
    fn price_parses_decimal_text(#[case] raw: &str, #[case] cents: u64) {
        assert_eq!(Price::parse(raw).map(Price::cents), Ok(cents));
    }

    #[rstest]
    #[case("", BookValidationError::InvalidPrice)]
    #[case("abc", BookValidationError::InvalidPrice)]
    #[case("-3", BookValidationError::InvalidPrice)]
    #[case("1.234", BookValidationError::InvalidPrice)]
    #[case("1.", BookValidationError::InvalidPrice)]
    #[case(".5", BookValidationError::InvalidPrice)]
    #[case("0", BookValidationError::NonPositivePrice)]
    #[case("0.00", BookValidationError::NonPositivePrice)]
    fn price_rejects_bad_input(#[case] raw: &str, #[case] expected: BookValidationError) {
        assert_eq!(Price::parse(raw), Err(expected));
    }

    #[rstest]
    fn draft_collects_every_error() {
        let errors = BookDraft::try_from_parts(" ", "", "0", None).expect_err("invalid draft");
        assert_eq!(
            errors,
            vec![
                BookValidationError::EmptyTitle,
                BookValidationError::EmptyAuthor,
                BookValidationError::NonPositivePrice,
            ]
        );
    }

    #[rstest]
    fn draft_rejects_overlong_title() {
        let title = "t".repeat(TITLE_MAX + 1);
        let errors =
            BookDraft::try_from_parts(&title, "Author", "1", None).expect_err("title too long");
        assert_eq!(
            errors,
            vec![BookValidationError::TitleTooLong { max: TITLE_MAX }]
        );
    }

    #[rstest]
    fn draft_trims_and_drops_blank_description() {
        let draft = BookDraft::try_from_parts(" Title ", " Author ", "9.99", Some("  "))
            .expect("valid draft");
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.author, "Author");
        assert_eq!(draft.description, None);
    }
}
