//! Postings: models, listing queries, and the posting API.

pub mod gateway;
pub mod model;
pub mod query;

pub use gateway::RecruitApi;
pub use model::{BookmarkList, Deadline, EmploymentEnd, Post, PostPage};
pub use query::{decode_query_params, encode_query_params, PostQuery};
