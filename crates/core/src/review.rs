//! Review constants and submission validation.
//!
//! Reviews are validated before anything is written to the remote store.
//! The rating scale is 1 to 5 inclusive.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::DbId;

/* --------------------------------------------------------------------------
Constants
-------------------------------------------------------------------------- */

/// Lowest accepted rating.
pub const MIN_RATING: i32 = 1;

/// Highest accepted rating.
pub const MAX_RATING: i32 = 5;

/// Maximum length for a reviewer's display name.
pub const MAX_AUTHOR_LENGTH: usize = 100;

/// Maximum length for a review comment.
pub const MAX_COMMENT_LENGTH: usize = 2_000;

/* --------------------------------------------------------------------------
Input
-------------------------------------------------------------------------- */

/// A review as submitted by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ReviewInput {
    #[validate(range(min = 1, message = "restaurant_id must reference a restaurant"))]
    pub restaurant_id: DbId,
    #[validate(length(min = 1, max = 100, message = "author must be 1-100 characters"))]
    pub author: String,
    #[validate(range(min = 1, max = 5, message = "rating must be between 1 and 5"))]
    pub rating: i32,
    #[serde(default)]
    #[validate(length(max = 2000, message = "comment must be at most 2000 characters"))]
    pub comment: String,
}

impl ReviewInput {
    /// Trim surrounding whitespace from the free-text fields.
    pub fn normalized(mut self) -> Self {
        self.author = self.author.trim().to_string();
        self.comment = self.comment.trim().to_string();
        self
    }

    /// Normalize, then validate. Returns the input that should be written.
    pub fn into_validated(self) -> Result<Self, CoreError> {
        let input = self.normalized();
        input
            .validate()
            .map_err(|e| CoreError::Validation(e.to_string()))?;
        Ok(input)
    }
}
