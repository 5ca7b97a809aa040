use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }
    };
}

id_newtype!(WorkId);
id_newtype!(CreatorId);
id_newtype!(CategoryId);

/// Columns a result list may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    CreatedAt,
    Views,
    Title,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::CreatedAt, SortField::Views, SortField::Title];

    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::Views => "views",
            SortField::Title => "title",
        }
    }

    pub fn from_column(column: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.column() == column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Asc
    }
}

/// A whitelisted `(field, direction)` pair, written as `{field}_{asc|desc}`
/// in links and form values (`created_at_desc`, `views_asc`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn token(&self) -> String {
        format!("{}_{}", self.field.column(), self.direction.as_str())
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized sort token '{0}'")]
pub struct UnknownSort(pub String);

impl FromStr for SortSpec {
    type Err = UnknownSort;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let (column, direction) = if let Some(column) = token.strip_suffix("_asc") {
            (column, SortDirection::Asc)
        } else if let Some(column) = token.strip_suffix("_desc") {
            (column, SortDirection::Desc)
        } else {
            return Err(UnknownSort(token.to_string()));
        };

        SortField::from_column(column)
            .map(|field| Self::new(field, direction))
            .ok_or_else(|| UnknownSort(token.to_string()))
    }
}
