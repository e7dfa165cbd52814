//! Error types for the editor core

/// Errors raised at the boundary of the editor core.
///
/// The resolution engines themselves never fail: missing assets resolve to
/// empty decorations. These variants cover configuration, snapshot hand-off
/// and caller-supplied coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    IoError(String),
    ConfigError(String),
    ParseError(String),
    SerializeError(String),
    /// A coordinate outside the `size x size` grid reached the boundary
    OutOfBounds { x: i32, y: i32, size: u32 },
    /// A snapshot whose cell count does not match its declared size
    SnapshotSize { expected: usize, actual: usize },
    /// Grid edge length outside `1..=MAX_GRID_SIZE`
    GridSize { size: u32 },
    /// Key is not present in the tile/wall catalog
    UnknownKey { kind: &'static str, key: u32 },
    /// The history entry for an edit could not be allocated
    HistoryAllocation { cells: usize },
}

impl std::fmt::Display for EditorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditorError::IoError(e) => write!(f, "IO error: {}", e),
            EditorError::ConfigError(e) => write!(f, "Config error: {}", e),
            EditorError::ParseError(e) => write!(f, "Parse error: {}", e),
            EditorError::SerializeError(e) => write!(f, "Serialize error: {}", e),
            EditorError::OutOfBounds { x, y, size } => {
                write!(f, "Cell ({}, {}) is outside the {}x{} grid", x, y, size, size)
            }
            EditorError::SnapshotSize { expected, actual } => write!(
                f,
                "Snapshot holds {} cells, expected {}",
                actual, expected
            ),
            EditorError::GridSize { size } => write!(
                f,
                "Grid size {} is outside 1..={}",
                size,
                crate::config::MAX_GRID_SIZE
            ),
            EditorError::UnknownKey { kind, key } => write!(f, "Unknown {} key {}", kind, key),
            EditorError::HistoryAllocation { cells } => write!(
                f,
                "Could not allocate undo history for {} changed cells",
                cells
            ),
        }
    }
}

impl std::error::Error for EditorError {}

pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_out_of_bounds() {
        let err = EditorError::OutOfBounds { x: 16, y: -1, size: 16 };
        assert_eq!(err.to_string(), "Cell (16, -1) is outside the 16x16 grid");
    }

    #[test]
    fn test_display_grid_size() {
        let err = EditorError::GridSize { size: 0 };
        assert_eq!(err.to_string(), "Grid size 0 is outside 1..=1024");
    }
}
