/// Error types for mesh construction, import, and export

/// Errors from procedural mesh construction.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("ring requires at least 3 segments, got {0}")]
    TooFewSegments(usize),

    #[error("ring radius must be positive, got {0}")]
    NonPositiveRadius(f32),

    #[error("ring thickness must be positive, got {0}")]
    NonPositiveThickness(f32),

    #[error("axis direction must be a non-zero vector")]
    ZeroAxis,
}

/// Errors during STL export.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExportError {
    #[error("triangle {triangle} references vertex {index}, but mesh has {vertex_count} vertices")]
    IndexOutOfBounds {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },
}

/// Errors during STL import.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StlParseError {
    #[error("file too small to be a valid STL")]
    TooSmall,

    #[error("unexpected end of binary STL data")]
    Truncated,

    #[error("failed to parse ASCII STL: {0}")]
    Ascii(String),
}
