#[derive(thiserror::Error, Clone, Debug)]
#[error("Couldn't construct matrix: expected {expected} cells, got {got}")]
pub struct Matrix2dFromVecError {
	expected: usize,
	got: usize,
}

/// Row-major grid. `ix` is the column, `iy` the row.
#[derive(Clone, Debug)]
pub struct Matrix2d<T> {
	width: usize,
	height: usize,
	data: Vec<T>,
}

impl<T> Matrix2d<T> {
	pub fn width(&self) -> usize {
		self.width
	}

	pub fn height(&self) -> usize {
		self.height
	}

	pub fn contains(&self, ix: usize, iy: usize) -> bool {
		ix < self.width && iy < self.height
	}

	pub fn get(&self, ix: usize, iy: usize) -> Option<&T> {
		if !self.contains(ix, iy) {
			return None;
		}
		self.data.get(iy * self.width + ix)
	}

	/// Cells in row-major order.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.data.iter()
	}

	/// Build cell by cell in row-major order, stopping at the first error.
	pub fn try_from_fn<E>(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Result<T, E>) -> Result<Self, E> {
		let mut data = Vec::with_capacity(width * height);
		for iy in 0..height {
			for ix in 0..width {
				data.push(f(ix, iy)?);
			}
		}

		Ok(Self { width, height, data })
	}

	pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Matrix2dFromVecError> {
		if data.len() != width * height {
			return Err(Matrix2dFromVecError {
				expected: width * height,
				got: data.len(),
			});
		}

		Ok(Self { width, height, data })
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn row_major_layout() {
		let matrix = Matrix2d::from_vec(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
		assert_eq!(matrix.get(0, 0), Some(&0));
		assert_eq!(matrix.get(2, 0), Some(&2));
		assert_eq!(matrix.get(0, 1), Some(&3));
		assert_eq!(matrix.get(2, 1), Some(&5));
		assert_eq!(matrix.iter().copied().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
	}

	#[test]
	fn out_of_range_is_none() {
		let matrix = Matrix2d::from_vec(2, 2, vec![0u8; 4]).unwrap();
		assert!(matrix.get(2, 0).is_none());
		assert!(matrix.get(0, 2).is_none());
		assert!(!matrix.contains(5, 5));
	}

	#[test]
	fn build_from_fn_stops_on_error() {
		let matrix = Matrix2d::try_from_fn(2, 2, |ix, iy| Ok::<_, ()>(ix + 10 * iy)).unwrap();
		assert_eq!(matrix.get(1, 1), Some(&11));
		assert_eq!((matrix.width(), matrix.height()), (2, 2));

		let failed = Matrix2d::try_from_fn(2, 2, |ix, iy| if iy == 1 { Err(ix) } else { Ok(ix) });
		assert_eq!(failed.unwrap_err(), 0);
	}

	#[test]
	fn wrong_length_is_rejected() {
		assert!(Matrix2d::from_vec(2, 2, vec![1, 2, 3]).is_err());
	}
}
