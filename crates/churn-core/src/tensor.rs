use crate::dtype::Float;
use crate::error::{TensorError, TensorResult};
use crate::shape::Shape;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// N-dimensional tensor — the fundamental data structure of the pipeline.
///
/// Stores data in a flat contiguous `Vec<T>` with row-major (C-order) layout.
/// Feature matrices are `[rows, features]`, label vectors are `[rows]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "T: Float")]
pub struct Tensor<T: Float> {
    data: Vec<T>,
    shape: Shape,
}

// ─── Construction ───────────────────────────────────────────────────────────

impl<T: Float> Tensor<T> {
    /// Create a tensor from raw data and shape.
    pub fn new(data: Vec<T>, shape: Vec<usize>) -> TensorResult<Self> {
        let s = Shape::new(shape);
        if data.len() != s.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: s.to_vec(),
                got: vec![data.len()],
            });
        }
        Ok(Tensor { data, shape: s })
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let s = Shape::new(shape);
        Tensor {
            data: vec![T::ZERO; s.numel()],
            shape: s,
        }
    }

    /// Create a 1-D tensor from a slice.
    pub fn from_slice(data: &[T]) -> Self {
        Tensor {
            data: data.to_vec(),
            shape: Shape::new(vec![data.len()]),
        }
    }

    /// Create a 2-D tensor from a nested slice.
    pub fn from_vec2d(data: &[Vec<T>]) -> TensorResult<Self> {
        if data.is_empty() {
            return Ok(Tensor::zeros(vec![0, 0]));
        }
        let rows = data.len();
        let cols = data[0].len();
        for row in data {
            if row.len() != cols {
                return Err(TensorError::InvalidOperation(
                    "All rows must have the same number of columns".to_string(),
                ));
            }
        }
        let flat: Vec<T> = data.iter().flat_map(|r| r.iter().copied()).collect();
        Tensor::new(flat, vec![rows, cols])
    }

    /// Random tensor with uniform distribution in [0, 1).
    pub fn rand(shape: Vec<usize>, seed: Option<u64>) -> Self {
        let s = Shape::new(shape);
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let data: Vec<T> = (0..s.numel())
            .map(|_| T::from_f64(rand::Rng::gen::<f64>(&mut rng)))
            .collect();
        Tensor { data, shape: s }
    }

    /// Random tensor with standard normal distribution (approximate via Box-Muller).
    pub fn randn(shape: Vec<usize>, seed: Option<u64>) -> Self {
        let s = Shape::new(shape);
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let n = s.numel();
        let mut data = Vec::with_capacity(n);

        // Box-Muller transform
        let mut i = 0;
        while i < n {
            let u1: f64 = rand::Rng::gen::<f64>(&mut rng).max(1e-10);
            let u2: f64 = rand::Rng::gen::<f64>(&mut rng);
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f64::consts::PI * u2;
            data.push(T::from_f64(r * theta.cos()));
            if i + 1 < n {
                data.push(T::from_f64(r * theta.sin()));
            }
            i += 2;
        }
        data.truncate(n);
        Tensor { data, shape: s }
    }

    // ─── Accessors ──────────────────────────────────────────────────────────

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn shape_vec(&self) -> Vec<usize> {
        self.shape.to_vec()
    }

    pub fn ndim(&self) -> usize {
        self.shape.ndim()
    }

    pub fn numel(&self) -> usize {
        self.data.len()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Multi-dimensional indexing: compute flat offset from indices.
    pub fn get(&self, indices: &[usize]) -> TensorResult<T> {
        let strides = self.shape.strides();
        if indices.len() != self.ndim() {
            return Err(TensorError::DimensionMismatch(format!(
                "Expected {} indices, got {}",
                self.ndim(),
                indices.len()
            )));
        }
        let mut offset = 0;
        for (i, &idx) in indices.iter().enumerate() {
            let dim_size = self.shape.dim(i)?;
            if idx >= dim_size {
                return Err(TensorError::IndexOutOfBounds {
                    index: idx,
                    axis: i,
                    size: dim_size,
                });
            }
            offset += idx * strides[i];
        }
        Ok(self.data[offset])
    }

    /// Extract row `i` from a 2D tensor as a 1D tensor.
    pub fn row(&self, i: usize) -> TensorResult<Tensor<T>> {
        if self.ndim() != 2 {
            return Err(TensorError::InvalidOperation(
                "row() requires a 2D tensor".to_string(),
            ));
        }
        let rows = self.shape.dim(0)?;
        let cols = self.shape.dim(1)?;
        if i >= rows {
            return Err(TensorError::IndexOutOfBounds {
                index: i,
                axis: 0,
                size: rows,
            });
        }
        let data = self.data[i * cols..(i + 1) * cols].to_vec();
        Tensor::new(data, vec![cols])
    }

    /// Extract column `j` from a 2D tensor as a 1D tensor.
    pub fn col(&self, j: usize) -> TensorResult<Tensor<T>> {
        if self.ndim() != 2 {
            return Err(TensorError::InvalidOperation(
                "col() requires a 2D tensor".to_string(),
            ));
        }
        let rows = self.shape.dim(0)?;
        let cols = self.shape.dim(1)?;
        if j >= cols {
            return Err(TensorError::IndexOutOfBounds {
                index: j,
                axis: 1,
                size: cols,
            });
        }
        let data: Vec<T> = (0..rows).map(|i| self.data[i * cols + j]).collect();
        Tensor::new(data, vec![rows])
    }

    /// Gather rows of a 2D tensor (or elements of a 1D tensor) by index list.
    ///
    /// Indices may repeat; the output has one row per index, in index order.
    pub fn take_rows(&self, indices: &[usize]) -> TensorResult<Tensor<T>> {
        match self.ndim() {
            1 => {
                let n = self.shape.dim(0)?;
                let mut data = Vec::with_capacity(indices.len());
                for &idx in indices {
                    if idx >= n {
                        return Err(TensorError::IndexOutOfBounds {
                            index: idx,
                            axis: 0,
                            size: n,
                        });
                    }
                    data.push(self.data[idx]);
                }
                Tensor::new(data, vec![indices.len()])
            }
            2 => {
                let rows = self.shape.dim(0)?;
                let cols = self.shape.dim(1)?;
                let mut data = Vec::with_capacity(indices.len() * cols);
                for &idx in indices {
                    if idx >= rows {
                        return Err(TensorError::IndexOutOfBounds {
                            index: idx,
                            axis: 0,
                            size: rows,
                        });
                    }
                    data.extend_from_slice(&self.data[idx * cols..(idx + 1) * cols]);
                }
                Tensor::new(data, vec![indices.len(), cols])
            }
            _ => Err(TensorError::InvalidOperation(
                "take_rows requires a 1D or 2D tensor".to_string(),
            )),
        }
    }

    /// Insert a size-1 dimension at `axis`.
    pub fn unsqueeze(&self, axis: usize) -> TensorResult<Tensor<T>> {
        if axis > self.ndim() {
            return Err(TensorError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }
        let mut dims = self.shape.to_vec();
        dims.insert(axis, 1);
        Tensor::new(self.data.clone(), dims)
    }

    /// Concatenate tensors along `axis` (0 = rows, 1 = columns for 2D).
    pub fn concatenate(tensors: &[&Tensor<T>], axis: usize) -> TensorResult<Tensor<T>> {
        if tensors.is_empty() {
            return Err(TensorError::EmptyTensor);
        }
        let ndim = tensors[0].ndim();
        if axis >= ndim {
            return Err(TensorError::InvalidAxis { axis, ndim });
        }
        for t in tensors {
            if t.ndim() != ndim {
                return Err(TensorError::DimensionMismatch(
                    "concatenate requires tensors of equal rank".to_string(),
                ));
            }
            for d in 0..ndim {
                if d != axis && t.shape.dim(d)? != tensors[0].shape.dim(d)? {
                    return Err(TensorError::ShapeMismatch {
                        expected: tensors[0].shape_vec(),
                        got: t.shape_vec(),
                    });
                }
            }
        }

        let mut out_dims = tensors[0].shape.to_vec();
        out_dims[axis] = tensors.iter().map(|t| t.shape.dims()[axis]).sum();

        let outer: usize = out_dims[..axis].iter().product();
        let inner: usize = out_dims[axis + 1..].iter().product();

        let mut data = Vec::with_capacity(out_dims.iter().product());
        for o in 0..outer {
            for t in tensors {
                let t_axis = t.shape.dims()[axis];
                let start = o * t_axis * inner;
                data.extend_from_slice(&t.data[start..start + t_axis * inner]);
            }
        }

        Tensor::new(data, out_dims)
    }

    // ─── Element-wise Operations ────────────────────────────────────────────

    /// Apply a function element-wise, producing a new tensor.
    pub fn apply<F: Fn(T) -> T>(&self, f: F) -> Tensor<T> {
        let data: Vec<T> = self.data.iter().map(|&x| f(x)).collect();
        Tensor {
            data,
            shape: self.shape.clone(),
        }
    }

    pub fn sqrt(&self) -> Tensor<T> {
        self.apply(T::sqrt)
    }

    pub fn div_scalar(&self, s: T) -> Tensor<T> {
        self.apply(|x| x / s)
    }

    fn broadcast_binary_op<F: Fn(T, T) -> T>(
        &self,
        other: &Tensor<T>,
        op: F,
    ) -> TensorResult<Tensor<T>> {
        // Fast path: same shape
        if self.shape == other.shape {
            let data: Vec<T> = self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(&a, &b)| op(a, b))
                .collect();
            return Ok(Tensor {
                data,
                shape: self.shape.clone(),
            });
        }

        let out_shape = Shape::broadcast_shape(&self.shape, &other.shape)?;
        let out_numel = out_shape.numel();
        let out_strides = out_shape.strides();
        let a_strides = self.shape.strides();
        let b_strides = other.shape.strides();
        let a_dims = self.shape.dims();
        let b_dims = other.shape.dims();
        let out_dims = out_shape.dims();
        let ndim = out_dims.len();

        let mut data = Vec::with_capacity(out_numel);

        for flat_idx in 0..out_numel {
            // Convert flat index to multi-dim index
            let mut remaining = flat_idx;
            let mut a_offset = 0usize;
            let mut b_offset = 0usize;

            for d in 0..ndim {
                let idx = remaining / out_strides[d];
                remaining %= out_strides[d];

                let a_dim_offset = ndim as isize - a_dims.len() as isize;
                let a_d = d as isize - a_dim_offset;
                if a_d >= 0 {
                    let a_d = a_d as usize;
                    if a_dims[a_d] > 1 {
                        a_offset += idx * a_strides[a_d];
                    }
                }

                let b_dim_offset = ndim as isize - b_dims.len() as isize;
                let b_d = d as isize - b_dim_offset;
                if b_d >= 0 {
                    let b_d = b_d as usize;
                    if b_dims[b_d] > 1 {
                        b_offset += idx * b_strides[b_d];
                    }
                }
            }

            data.push(op(self.data[a_offset], other.data[b_offset]));
        }

        Ok(Tensor {
            data,
            shape: out_shape,
        })
    }

    pub fn sub(&self, other: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.broadcast_binary_op(other, |a, b| a - b)
    }

    pub fn div(&self, other: &Tensor<T>) -> TensorResult<Tensor<T>> {
        self.broadcast_binary_op(other, |a, b| a / b)
    }

    // ─── Reduction Operations ───────────────────────────────────────────────

    /// Sum along a specific axis, collapsing that dimension.
    pub fn sum_axis(&self, axis: usize) -> TensorResult<Tensor<T>> {
        let dims = self.shape.dims();
        if axis >= dims.len() {
            return Err(TensorError::InvalidAxis {
                axis,
                ndim: self.ndim(),
            });
        }

        let outer: usize = dims[..axis].iter().product();
        let axis_size = dims[axis];
        let inner: usize = dims[axis + 1..].iter().product();

        let mut new_dims: Vec<usize> = dims.to_vec();
        new_dims.remove(axis);
        if new_dims.is_empty() {
            new_dims.push(1);
        }

        let mut result = vec![T::ZERO; outer * inner];
        for o in 0..outer {
            for a in 0..axis_size {
                for i in 0..inner {
                    let src = o * axis_size * inner + a * inner + i;
                    let dst = o * inner + i;
                    result[dst] = result[dst] + self.data[src];
                }
            }
        }

        Tensor::new(result, new_dims)
    }

    /// Mean along a specific axis.
    pub fn mean_axis(&self, axis: usize) -> TensorResult<Tensor<T>> {
        let axis_size = self.shape.dim(axis)?;
        let s = self.sum_axis(axis)?;
        Ok(s.div_scalar(T::from_usize(axis_size)))
    }

    /// Variance along axis (population variance).
    pub fn var_axis(&self, axis: usize) -> TensorResult<Tensor<T>> {
        let mean = self.mean_axis(axis)?;
        let dims = self.shape.dims();
        let outer: usize = dims[..axis].iter().product();
        let axis_size = dims[axis];
        let inner: usize = dims[axis + 1..].iter().product();

        let mut result = vec![T::ZERO; outer * inner];
        for o in 0..outer {
            for a in 0..axis_size {
                for i in 0..inner {
                    let src = o * axis_size * inner + a * inner + i;
                    let mu = mean.data[o * inner + i];
                    let diff = self.data[src] - mu;
                    result[o * inner + i] = result[o * inner + i] + diff * diff;
                }
            }
        }
        for v in result.iter_mut() {
            *v = *v / T::from_usize(axis_size);
        }

        let mut new_dims: Vec<usize> = dims.to_vec();
        new_dims.remove(axis);
        if new_dims.is_empty() {
            new_dims.push(1);
        }
        Tensor::new(result, new_dims)
    }

    /// Standard deviation along axis.
    pub fn std_axis(&self, axis: usize) -> TensorResult<Tensor<T>> {
        let var = self.var_axis(axis)?;
        Ok(var.sqrt())
    }
}

impl<T: Float> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tensor{} {:?}", self.shape, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_bad_shape() {
        let r = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]);
        assert!(r.is_err());
    }

    #[test]
    fn test_row_col_access() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0, 3.0],
            vec![4.0, 5.0, 6.0],
        ]).unwrap();
        assert_eq!(t.row(1).unwrap().data(), &[4.0, 5.0, 6.0]);
        assert_eq!(t.col(2).unwrap().data(), &[3.0, 6.0]);
        assert_eq!(t.get(&[1, 0]).unwrap(), 4.0);
    }

    #[test]
    fn test_take_rows() {
        let t: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![3.0, 4.0],
            vec![5.0, 6.0],
        ]).unwrap();
        let taken = t.take_rows(&[2, 0, 2]).unwrap();
        assert_eq!(taken.shape_vec(), vec![3, 2]);
        assert_eq!(taken.data(), &[5.0, 6.0, 1.0, 2.0, 5.0, 6.0]);

        let v: Tensor<f64> = Tensor::from_slice(&[10.0, 20.0, 30.0]);
        assert_eq!(v.take_rows(&[1, 1]).unwrap().data(), &[20.0, 20.0]);

        assert!(t.take_rows(&[3]).is_err());
    }

    #[test]
    fn test_concatenate_cols() {
        let a: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0], vec![3.0]]).unwrap();
        let b: Tensor<f64> = Tensor::from_vec2d(&[vec![2.0, 9.0], vec![4.0, 8.0]]).unwrap();
        let c = Tensor::concatenate(&[&a, &b], 1).unwrap();
        assert_eq!(c.shape_vec(), vec![2, 3]);
        assert_eq!(c.data(), &[1.0, 2.0, 9.0, 3.0, 4.0, 8.0]);
    }

    #[test]
    fn test_concatenate_rows() {
        let a: Tensor<f64> = Tensor::from_vec2d(&[vec![1.0, 2.0]]).unwrap();
        let b: Tensor<f64> = Tensor::from_vec2d(&[vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        let c = Tensor::concatenate(&[&a, &b], 0).unwrap();
        assert_eq!(c.shape_vec(), vec![3, 2]);
        assert_eq!(c.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_broadcast_sub_row_vector() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 10.0],
            vec![3.0, 20.0],
        ]).unwrap();
        let mu = Tensor::from_slice(&[2.0, 15.0]).unsqueeze(0).unwrap();
        let centered = x.sub(&mu).unwrap();
        assert_eq!(centered.data(), &[-1.0, -5.0, 1.0, 5.0]);
    }

    #[test]
    fn test_axis_stats() {
        let x: Tensor<f64> = Tensor::from_vec2d(&[
            vec![1.0, 2.0],
            vec![3.0, 6.0],
        ]).unwrap();
        let mean = x.mean_axis(0).unwrap();
        assert_eq!(mean.data(), &[2.0, 4.0]);
        let var = x.var_axis(0).unwrap();
        assert_eq!(var.data(), &[1.0, 4.0]);
        let std = x.std_axis(0).unwrap();
        assert_eq!(std.data(), &[1.0, 2.0]);
    }

    #[test]
    fn test_randn_is_deterministic_under_seed() {
        let a: Tensor<f64> = Tensor::randn(vec![100], Some(7));
        let b: Tensor<f64> = Tensor::randn(vec![100], Some(7));
        assert_eq!(a.data(), b.data());
    }
}
