pub mod helpful_vote;
pub mod review;
