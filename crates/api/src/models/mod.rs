//! Domain models for the bootcamp directory.
//!
//! - `user` - Accounts and one-time token state
//! - `bootcamp` - Listings with derived slug and location
//! - `course` - Courses and their enrolled students

pub mod bootcamp;
pub mod course;
pub mod user;
