//! File formats for point matrices and graphs.
//!
//! Point matrices are plain text, one point per line. Graphs are written as a
//! text edge list, as JSON or as `bincode`.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::graph::{GraphDocument, ProximityGraph};
use crate::neighborhood::EdgeList;
use crate::point_set::PointSet;

/// Graph file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// `source target weight` lines after a comment header.
    EdgeList,
    /// [`GraphDocument`] as JSON.
    Json,
    /// [`GraphDocument`] as `bincode` (default).
    #[default]
    Binary,
}

impl OutputFormat {
    /// File extension without the dot.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::EdgeList => "edges",
            Self::Json => "json",
            Self::Binary => "bin",
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EdgeList => write!(f, "edge_list"),
            Self::Json => write!(f, "json"),
            Self::Binary => write!(f, "binary"),
        }
    }
}

/// Reads a point matrix from a text file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, [`Error::InvalidData`]
/// for unparsable or ragged lines and [`Error::IndexBuild`] if no point is
/// found.
pub fn read_points<P: AsRef<Path>>(path: P) -> Result<PointSet> {
    let file = File::open(path.as_ref())?;
    parse_points(BufReader::new(file))
}

/// Parses a point matrix: values separated by whitespace or commas, one
/// point per line. Blank lines and lines starting with `#` are skipped.
///
/// # Errors
///
/// See [`read_points`].
pub fn parse_points<R: BufRead>(reader: R) -> Result<PointSet> {
    let mut rows: Vec<Vec<f32>> = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let row = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f32>().map_err(|e| {
                    Error::InvalidData(format!("line {}: '{field}': {e}", number + 1))
                })
            })
            .collect::<Result<Vec<f32>>>()?;

        if let Some(first) = rows.first() {
            if row.len() != first.len() {
                return Err(Error::InvalidData(format!(
                    "line {}: expected {} values, found {}",
                    number + 1,
                    first.len(),
                    row.len()
                )));
            }
        }
        rows.push(row);
    }

    PointSet::from_rows(&rows)
}

/// Writes a point matrix in the format read by [`read_points`].
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_points<P: AsRef<Path>>(path: P, points: &PointSet) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for row in points.rows() {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(writer, "{}", line.join(" "))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes `graph` to `path` in `format`.
///
/// # Errors
///
/// Returns an error if the file cannot be written or serialization fails.
pub fn save_graph<P: AsRef<Path>>(
    path: P,
    graph: &ProximityGraph,
    format: OutputFormat,
) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    match format {
        OutputFormat::EdgeList => {
            writeln!(writer, "# vertices {}", graph.vertex_count())?;
            writeln!(writer, "# directed {}", graph.is_directed())?;
            for (s, t, w) in graph.edges() {
                writeln!(writer, "{s} {t} {w}")?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, &GraphDocument::from(graph))?;
        }
        OutputFormat::Binary => {
            bincode::serialize_into(&mut writer, &GraphDocument::from(graph))?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Reads a graph written by [`save_graph`].
///
/// Edge lists carry no labels, so vertices are labeled `0..N`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn load_graph<P: AsRef<Path>>(path: P, format: OutputFormat) -> Result<ProximityGraph> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let document: GraphDocument = match format {
        OutputFormat::EdgeList => return parse_edge_list(reader),
        OutputFormat::Json => serde_json::from_reader(reader)?,
        OutputFormat::Binary => bincode::deserialize_from(reader)?,
    };
    document.into_graph()
}

fn parse_edge_list<R: BufRead>(reader: R) -> Result<ProximityGraph> {
    let mut vertices: Option<usize> = None;
    let mut directed = false;
    let mut edges = EdgeList::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if let Some(header) = trimmed.strip_prefix('#') {
            let mut parts = header.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some("vertices"), Some(n)) => vertices = Some(parse_field(n, number)?),
                (Some("directed"), Some(flag)) => directed = parse_field(flag, number)?,
                _ => {}
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }

        let fields: Vec<&str> = trimmed.split_whitespace().collect();
        let [s, t, w] = fields.as_slice() else {
            return Err(Error::InvalidData(format!(
                "line {}: expected 'source target weight'",
                number + 1
            )));
        };
        edges.push(
            parse_field(s, number)?,
            parse_field(t, number)?,
            parse_field(w, number)?,
        );
    }

    let vertex_count = match vertices {
        Some(n) => n,
        None => edges
            .edges()
            .iter()
            .map(|&(s, t)| s.max(t) + 1)
            .max()
            .unwrap_or(0),
    };
    ProximityGraph::assemble(vertex_count, directed, &edges)
}

fn parse_field<T>(field: &str, number: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    field
        .parse()
        .map_err(|e| Error::InvalidData(format!("line {}: '{field}': {e}", number + 1)))
}
