//! Catalog entities and validated inputs
//!
//! `Album` and `Genre` are what the store hands back. `NewAlbum` and
//! `NewGenre` are what callers hand in; their fields are newtypes that
//! can only be built through validating constructors.

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// Server-generated album identifier
pub type AlbumId = i64;

/// Server-generated genre identifier
pub type GenreId = i64;

/// Maximum length for titles, artist names and genre names
const MAX_TEXT_LEN: usize = 255;

/// Largest price representable by the `NUMERIC(10,2)` column
const MAX_PRICE: f64 = 99_999_999.99;

/// A genre as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// An album as stored, with its genres ordered by genre id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist: String,
    pub price: f64,
    pub genres: Vec<Genre>,
}

fn non_empty(field: &'static str, s: &str) -> Result<String, ValidationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field,
            max: MAX_TEXT_LEN,
        });
    }
    Ok(trimmed.to_owned())
}

macro_rules! text_newtype {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name(String);

        impl $name {
            /// Trim and validate: non-empty, at most 255 characters.
            pub fn new(s: &str) -> Result<Self, ValidationError> {
                non_empty($field, s).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

text_newtype!(
    /// Validated album title
    AlbumTitle,
    "title"
);
text_newtype!(
    /// Validated artist name
    ArtistName,
    "artist"
);
text_newtype!(
    /// Validated genre name
    GenreName,
    "genre name"
);

/// Validated album price: finite, non-negative, fits `NUMERIC(10,2)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Price(f64);

impl Price {
    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must be a finite number",
            });
        }
        if value < 0.0 {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must not be negative",
            });
        }
        if value > MAX_PRICE {
            return Err(ValidationError::OutOfRange {
                field: "price",
                reason: "must not exceed 99999999.99",
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

/// Check that an identifier supplied by a caller is positive.
pub fn validate_id(field: &'static str, id: i64) -> Result<i64, ValidationError> {
    if id <= 0 {
        return Err(ValidationError::InvalidId {
            field,
            value: id.to_string(),
        });
    }
    Ok(id)
}

/// Album creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewAlbum {
    pub title: AlbumTitle,
    pub artist: ArtistName,
    pub price: Price,
    /// Genres to associate in the same transaction, in request order
    pub genre_ids: Vec<GenreId>,
}

impl NewAlbum {
    /// Validate every field of an album creation request.
    ///
    /// # Example
    /// ```
    /// use musicshop_core::NewAlbum;
    ///
    /// assert!(NewAlbum::new("Kind of Blue", "Miles Davis", 9.99, vec![1, 2]).is_ok());
    /// assert!(NewAlbum::new("  ", "Miles Davis", 9.99, vec![]).is_err());
    /// assert!(NewAlbum::new("Kind of Blue", "Miles Davis", -1.0, vec![]).is_err());
    /// ```
    pub fn new(
        title: &str,
        artist: &str,
        price: f64,
        genre_ids: Vec<GenreId>,
    ) -> Result<Self, ValidationError> {
        let genre_ids = genre_ids
            .into_iter()
            .map(|id| validate_id("genre id", id))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            title: AlbumTitle::new(title)?,
            artist: ArtistName::new(artist)?,
            price: Price::new(price)?,
            genre_ids,
        })
    }
}

/// Genre creation request
#[derive(Debug, Clone, PartialEq)]
pub struct NewGenre {
    pub name: GenreName,
}

impl NewGenre {
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: GenreName::new(name)?,
        })
    }
}
