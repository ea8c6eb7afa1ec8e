pub use branch_and_bound::BranchAndBound;

mod branch_and_bound;
