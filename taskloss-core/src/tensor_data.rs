// taskloss-core/src/tensor_data.rs

use std::sync::Arc;

use crate::buffer::Buffer;
use crate::error::TaskLossError;
use crate::types::DType;

/// Internal storage and metadata for a [`Tensor`](crate::tensor::Tensor).
///
/// Holds the shared data buffer together with the shape, strides and offset
/// that define the logical view onto it. It is wrapped in
/// `Arc<RwLock<TensorData>>` by the `Tensor` struct so that clones and views
/// can share one allocation.
#[derive(Debug)]
pub struct TensorData {
    /// The underlying typed buffer, shared between views.
    pub(crate) buffer: Arc<Buffer>,
    /// The data type of the elements in the buffer.
    pub(crate) dtype: DType,
    /// The shape (dimensions) of the tensor.
    pub(crate) shape: Vec<usize>,
    /// The strides for each dimension: the jump in buffer elements needed to
    /// move one step along that dimension.
    pub(crate) strides: Vec<usize>,
    /// Offset of the first element inside the shared buffer (used by views).
    pub(crate) offset: usize,
}

impl TensorData {
    /// Creates a new `TensorData` with the given f32 data and shape.
    ///
    /// Takes ownership of the data vector (row-major order) and calculates
    /// contiguous strides automatically.
    ///
    /// # Errors
    /// Returns `TaskLossError::TensorCreationError` if the data length does
    /// not match the number of elements implied by `shape`.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(TaskLossError::TensorCreationError { data_len, shape });
        }
        let strides = Self::calculate_contiguous_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(Buffer::F32(Arc::new(data_vec))),
            dtype: DType::F32,
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a new `TensorData` with the given f64 data and shape.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(TaskLossError::TensorCreationError { data_len, shape });
        }
        let strides = Self::calculate_contiguous_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(Buffer::F64(Arc::new(data_vec))),
            dtype: DType::F64,
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a new `TensorData` with the given boolean data and shape.
    pub fn new_bool(data_vec: Vec<bool>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let numel: usize = shape.iter().product();
        let data_len = data_vec.len();
        if data_len != numel {
            return Err(TaskLossError::TensorCreationError { data_len, shape });
        }
        let strides = Self::calculate_contiguous_strides(&shape);
        Ok(TensorData {
            buffer: Arc::new(Buffer::Bool(Arc::new(data_vec))),
            dtype: DType::Bool,
            shape,
            strides,
            offset: 0,
        })
    }

    /// Creates a new `TensorData` representing a view of an existing buffer.
    ///
    /// Does **not** allocate new memory for the data; only new metadata
    /// (offset, shape, strides) is attached to the shared `buffer`. The
    /// dtype is inferred from the buffer.
    pub(crate) fn new_view(
        buffer: Arc<Buffer>,
        offset: usize,
        shape: Vec<usize>,
        strides: Vec<usize>,
    ) -> Self {
        debug_assert!(offset <= buffer.len());
        let dtype = buffer.dtype();
        TensorData {
            buffer,
            dtype,
            shape,
            strides,
            offset,
        }
    }

    /// Provides access to the underlying shared data buffer.
    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    /// Calculates the strides for a contiguous tensor of the given shape.
    pub fn calculate_contiguous_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![0; shape.len()];
        if shape.is_empty() {
            return strides;
        }
        strides[shape.len() - 1] = 1;
        for i in (0..shape.len() - 1).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Calculates the linear offset into the shared buffer for the given
    /// multi-dimensional indices, honoring strides and the view offset.
    ///
    /// Panics if the number of indices does not match the tensor rank or if
    /// any index is out of bounds.
    pub fn get_offset(&self, indices: &[usize]) -> usize {
        assert_eq!(
            indices.len(),
            self.shape.len(),
            "Number of indices ({}) does not match tensor rank ({}) for shape {:?}",
            indices.len(),
            self.shape.len(),
            self.shape
        );
        let mut relative_offset = 0;
        for i in 0..self.shape.len() {
            assert!(
                indices[i] < self.shape[i],
                "Index {} is out of bounds for dimension {} with size {} (shape: {:?})",
                indices[i],
                i,
                self.shape[i],
                self.shape
            );
            relative_offset += indices[i] * self.strides[i];
        }
        self.offset + relative_offset
    }

    /// Checks if the tensor is contiguous in memory, i.e. laid out in
    /// row-major order without gaps given its strides.
    pub fn is_contiguous(&self) -> bool {
        if self.shape.is_empty() {
            return true;
        }
        let mut current_stride = 1;
        for i in (0..self.shape.len()).rev() {
            let shape_i = self.shape[i];
            if shape_i == 0 {
                return true;
            }
            if shape_i != 1 {
                if self.strides[i] != current_stride {
                    return false;
                }
                current_stride *= shape_i;
            }
        }
        true
    }
}
