//! Core types for Campfinder.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cost;
pub mod email;
pub mod id;
pub mod pagination;
pub mod patch;
pub mod role;
pub mod slug;
pub mod taxonomy;

pub use cost::{CreditTotals, average_cost};
pub use email::{Email, EmailError};
pub use id::*;
pub use pagination::{Pagination, PaginationError};
pub use patch::FieldPatch;
pub use role::{ParseRoleError, Role};
pub use slug::Slug;
pub use taxonomy::{Career, MinimumSkill, ParseTaxonomyError};
