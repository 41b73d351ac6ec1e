//! Review aggregation, listing, voting and moderation.
//!
//! Every function takes its stores as trait objects and the caller's
//! `Identity` as an explicit argument.

pub mod helpful;
pub mod listing;
pub mod moderation;
pub mod rating;
