// taskloss-core/src/types.rs

/// Defines the possible data types for tensor elements.
///
/// This enum allows the crate to handle tensors with different element
/// types dynamically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// 32-bit floating-point type.
    F32,
    /// 64-bit floating-point type.
    F64,
    /// Boolean type (true/false values).
    Bool,
}

impl DType {
    /// Returns true for the floating-point dtypes.
    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}
