pub mod helpful_vote;
pub mod rating;
pub mod review;
