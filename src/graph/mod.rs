pub use incidence_graph::{CoverCheck, IncidenceGraph};

mod incidence_graph;
