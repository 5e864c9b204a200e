//! Lexical relevance ranking over cached chunks

mod ranker;

pub use ranker::{rank, score, tokenize, RelevanceRanker};
