pub use annealing::IsingSearch;
pub use candidate::Candidate;
pub use genetic::GeneticSearch;

mod annealing;
mod candidate;
mod genetic;
