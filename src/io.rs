use crate::graph::IncidenceGraph;
use crate::solver::{Tracer, VertexCover};
use log::warn;
use std::convert::TryFrom;
use std::io;
use std::io::{BufRead, Write};
use std::path::Path;

fn invalid(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message.to_string())
}

/// Reader for the adjacency-list graph format: the first line carries
/// `num_vertices num_edges`, followed by one line of 1-based neighbor ids
/// per vertex (both directions of every edge listed). Neighbor ids are
/// converted to 0-based internally; the edge count is derived from the
/// adjacency lists.
pub struct MetisReader<T: BufRead>(pub T);

impl<T: BufRead> TryFrom<MetisReader<T>> for IncidenceGraph {
    type Error = io::Error;

    fn try_from(reader: MetisReader<T>) -> Result<Self, Self::Error> {
        let mut lines = reader.0.lines();

        let first = lines
            .next()
            .ok_or_else(|| invalid("empty input"))??;
        let header: Vec<usize> = first
            .split_whitespace()
            .map(|token| token.parse())
            .collect::<Result<_, _>>()
            .map_err(|_| invalid("first line must contain two integers"))?;
        if header.len() != 2 {
            return Err(invalid("first line must contain two integers"));
        }
        let (num_vertices, num_edges) = (header[0], header[1]);

        let mut adjacency: Vec<Vec<usize>> = Vec::with_capacity(num_vertices);
        for line in lines.take(num_vertices) {
            let line = line?;
            let row = line
                .split_whitespace()
                .map(|token| {
                    token
                        .parse::<usize>()
                        .ok()
                        .and_then(|v| v.checked_sub(1))
                        .ok_or_else(|| invalid("adjacency lines must contain 1-based vertex ids"))
                })
                .collect::<Result<Vec<usize>, io::Error>>()?;
            adjacency.push(row);
        }
        // trailing isolated vertices may be omitted from the file
        adjacency.resize(num_vertices, Vec::new());

        let graph = IncidenceGraph::from_adjacency(adjacency);
        if graph.size() != num_edges {
            warn!(
                "header declares {} edges, adjacency lists contain {}",
                num_edges,
                graph.size()
            );
        }
        Ok(graph)
    }
}

/// Writes a solution file: best cover size on the first line, then the
/// comma-separated covered vertex ids, 1-based for external consumption.
pub fn write_solution<W: Write>(mut writer: W, cover: &VertexCover) -> io::Result<()> {
    writeln!(writer, "{}", cover.size())?;
    let line: Vec<String> = cover
        .vertices()
        .iter()
        .map(|v| (v + 1).to_string())
        .collect();
    writeln!(writer, "{}", line.join(","))
}

/// Append-only trace sink: one `elapsed_seconds, best_size` line per
/// improvement, flushed immediately so the trace survives a hard kill.
pub struct TraceWriter<W: Write> {
    writer: W,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> Tracer for TraceWriter<W> {
    fn improved(&mut self, elapsed_secs: f64, size: usize) {
        let result = writeln!(self.writer, "{:.2}, {}", elapsed_secs, size)
            .and_then(|_| self.writer.flush());
        if let Err(e) = result {
            warn!("failed to append trace entry: {}", e);
        }
    }
}

fn output_filename(
    input: &Path,
    method: &str,
    cutoff_secs: f64,
    seed: Option<u64>,
    extension: &str,
) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_string());
    let cutoff = if cutoff_secs.fract() == 0.0 {
        format!("{}", cutoff_secs as u64)
    } else {
        format!("{}", cutoff_secs)
    };
    match seed {
        Some(seed) => format!("{}_{}_{}_{}.{}", stem, method, cutoff, seed, extension),
        None => format!("{}_{}_{}.{}", stem, method, cutoff, extension),
    }
}

pub fn solution_filename(input: &Path, method: &str, cutoff_secs: f64, seed: Option<u64>) -> String {
    output_filename(input, method, cutoff_secs, seed, "sol")
}

pub fn trace_filename(input: &Path, method: &str, cutoff_secs: f64, seed: Option<u64>) -> String {
    output_filename(input, method, cutoff_secs, seed, "trace")
}

#[cfg(test)]
mod tests {
    use crate::graph::IncidenceGraph;
    use crate::io::{
        solution_filename, trace_filename, write_solution, MetisReader, TraceWriter,
    };
    use crate::solver::{Tracer, VertexCover};
    use std::convert::TryFrom;
    use std::io::Cursor;
    use std::path::Path;

    #[test]
    fn reads_a_small_graph() {
        // 4-cycle, 1-based neighbor lists
        let input = "4 4\n2 4\n1 3\n2 4\n3 1\n";
        let reader = MetisReader(Cursor::new(input));
        let graph = IncidenceGraph::try_from(reader).unwrap();
        assert_eq!(graph.order(), 4);
        assert_eq!(graph.size(), 4);
        assert!(graph.has_edge(0, 1));
        assert!(graph.has_edge(3, 0));
        assert!(!graph.has_edge(0, 2));
    }

    #[test]
    fn tolerates_missing_trailing_lines() {
        let input = "3 1\n2\n1\n";
        let reader = MetisReader(Cursor::new(input));
        let graph = IncidenceGraph::try_from(reader).unwrap();
        assert_eq!(graph.order(), 3);
        assert_eq!(graph.size(), 1);
        assert_eq!(graph.degree(2), 0);
    }

    #[test]
    fn rejects_malformed_first_line() {
        for input in &["", "four four\n", "4\n", "4 4 extra\n"] {
            let reader = MetisReader(Cursor::new(*input));
            assert!(
                IncidenceGraph::try_from(reader).is_err(),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn rejects_zero_based_neighbor_ids() {
        let input = "2 1\n0\n1\n";
        let reader = MetisReader(Cursor::new(input));
        assert!(IncidenceGraph::try_from(reader).is_err());
    }

    #[test]
    fn solution_file_format() {
        let cover = VertexCover::new(vec![2, 0]);
        let mut out = Vec::new();
        write_solution(&mut out, &cover).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "2\n1,3\n");
    }

    #[test]
    fn empty_solution_file_format() {
        let cover = VertexCover::new(Vec::new());
        let mut out = Vec::new();
        write_solution(&mut out, &cover).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "0\n\n");
    }

    #[test]
    fn trace_lines_are_appended() {
        let mut out = Vec::new();
        {
            let mut tracer = TraceWriter::new(&mut out);
            tracer.improved(0.5, 10);
            tracer.improved(1.25, 8);
        }
        assert_eq!(String::from_utf8(out).unwrap(), "0.50, 10\n1.25, 8\n");
    }

    #[test]
    fn output_filenames() {
        let input = Path::new("data/power.graph");
        assert_eq!(
            solution_filename(input, "BB", 600.0, None),
            "power_BB_600.sol"
        );
        assert_eq!(
            trace_filename(input, "GA", 1.5, Some(42)),
            "power_GA_1.5_42.trace"
        );
    }
}
