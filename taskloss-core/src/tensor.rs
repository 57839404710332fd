// taskloss-core/src/tensor.rs

use std::fmt;
use std::sync::{Arc, RwLock};

use crate::error::TaskLossError;
use crate::tensor_data::TensorData;
use crate::types::DType;

/// A dense multi-dimensional array.
///
/// `Tensor` wraps its storage in `Arc<RwLock<TensorData>>`:
/// 1. **Shared ownership:** clones are cheap and share the underlying
///    buffer, so a cached tensor handed out twice is the *same* storage,
///    observable through [`Tensor::ptr_eq`].
/// 2. **Views:** operations like transpose produce new metadata over the
///    same buffer without copying data.
pub struct Tensor {
    /// Arc for shared ownership, RwLock for interior access to TensorData.
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Clone for Tensor {
    fn clone(&self) -> Self {
        Tensor {
            data: Arc::clone(&self.data),
        }
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        f.debug_struct("Tensor")
            .field("dtype", &guard.dtype)
            .field("shape", &guard.shape)
            .finish()
    }
}

impl Tensor {
    /// Creates a new f32 tensor with the given data and shape.
    ///
    /// This is the primary constructor for creating tensors from raw data.
    /// Contiguous strides are calculated automatically.
    pub fn new(data_vec: Vec<f32>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let tensor_data = TensorData::new(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a new f64 tensor with the given data and shape.
    pub fn new_f64(data_vec: Vec<f64>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let tensor_data = TensorData::new_f64(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Creates a new boolean tensor with the given data and shape.
    pub fn new_bool(data_vec: Vec<bool>, shape: Vec<usize>) -> Result<Self, TaskLossError> {
        let tensor_data = TensorData::new_bool(data_vec, shape)?;
        Ok(Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        })
    }

    /// Returns the data type (`DType`) of the tensor elements.
    pub fn dtype(&self) -> DType {
        self.read_data().dtype
    }

    /// Returns a clone of the tensor's shape.
    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    /// Returns a clone of the tensor's strides.
    pub fn strides(&self) -> Vec<usize> {
        self.read_data().strides.clone()
    }

    /// Returns the number of elements in the tensor.
    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    /// Checks if the tensor is contiguous in memory.
    pub fn is_contiguous(&self) -> bool {
        self.read_data().is_contiguous()
    }

    /// Returns true if `self` and `other` share the same storage.
    ///
    /// Clones of a tensor compare equal under `ptr_eq`; tensors built from
    /// separate computations do not, even when their values coincide.
    pub fn ptr_eq(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Acquires a read lock on the tensor's data.
    ///
    /// The lock is released when the returned guard goes out of scope.
    /// Panics if the RwLock is poisoned.
    pub fn read_data(&self) -> std::sync::RwLockReadGuard<'_, TensorData> {
        self.data.read().expect("RwLock poisoned")
    }

    /// Returns the tensor data as a `Vec<f32>` in logical (row-major) order.
    ///
    /// Works on views: non-contiguous tensors are gathered through their
    /// strides.
    pub fn get_f32_data(&self) -> Result<Vec<f32>, TaskLossError> {
        let guard = self.read_data();
        let buffer = guard.buffer().try_get_f32()?;
        Ok(gather(&guard, buffer.as_slice()))
    }

    /// Returns the tensor data as a `Vec<f64>` in logical (row-major) order.
    pub fn get_f64_data(&self) -> Result<Vec<f64>, TaskLossError> {
        let guard = self.read_data();
        let buffer = guard.buffer().try_get_f64()?;
        Ok(gather(&guard, buffer.as_slice()))
    }

    /// Returns the tensor data as a `Vec<bool>` in logical (row-major) order.
    pub fn get_bool_data(&self) -> Result<Vec<bool>, TaskLossError> {
        let guard = self.read_data();
        let buffer = guard.buffer().try_get_bool()?;
        Ok(gather(&guard, buffer.as_slice()))
    }
}

/// Collects the logical elements of a (possibly non-contiguous) tensor into
/// a freshly allocated row-major vector.
fn gather<T: Copy>(td: &TensorData, data: &[T]) -> Vec<T> {
    let numel = td.numel();
    let mut out = Vec::with_capacity(numel);
    if numel == 0 {
        return out;
    }
    if td.is_contiguous() {
        out.extend_from_slice(&data[td.offset..td.offset + numel]);
        return out;
    }
    let rank = td.shape.len();
    let mut indices = vec![0usize; rank];
    for _ in 0..numel {
        out.push(data[td.get_offset(&indices)]);
        let mut dim = rank;
        while dim > 0 {
            dim -= 1;
            indices[dim] += 1;
            if indices[dim] < td.shape[dim] {
                break;
            }
            indices[dim] = 0;
        }
    }
    out
}
