//! # Matrix Stack
//!
//! A stack of 4x4 transforms where only the top is current. Rendering code pushes a
//! copy, edits it, draws, and pops back to the saved transform.

use cgmath::{Matrix4, SquareMatrix, Vector3};

/// A bounded stack of transforms.
///
/// The bottom entry can never be popped, so `top` always has a value.
///
/// # Examples
///
/// ```
/// use cgmath::{Matrix4, SquareMatrix, Vector3};
/// use voxel_client::core::matrix_stack::MatrixStack;
///
/// let mut stack = MatrixStack::new(4);
/// stack.push();
/// stack.translate(Vector3::new(1.0, 2.0, 0.0));
/// assert_ne!(*stack.top(), Matrix4::identity());
/// stack.pop();
/// assert_eq!(*stack.top(), Matrix4::identity());
/// ```
#[derive(Debug, Clone)]
pub struct MatrixStack {
    matrices: Vec<Matrix4<f32>>,
    max_depth: usize,
}

impl MatrixStack {
    /// Creates a stack holding only the identity, allowing `max_depth` entries in total.
    pub fn new(max_depth: usize) -> Self {
        let mut matrices = Vec::with_capacity(max_depth);
        matrices.push(Matrix4::identity());
        Self {
            matrices,
            max_depth: max_depth.max(1),
        }
    }

    /// The current transform.
    pub fn top(&self) -> &Matrix4<f32> {
        // never empty, see `pop`
        &self.matrices[self.matrices.len() - 1]
    }

    fn top_mut(&mut self) -> &mut Matrix4<f32> {
        let last = self.matrices.len() - 1;
        &mut self.matrices[last]
    }

    /// Saves the current transform.
    ///
    /// # Panics
    /// Panics if the stack is already at its maximum depth.
    pub fn push(&mut self) {
        assert!(
            self.matrices.len() < self.max_depth,
            "matrix stack overflow at depth {}",
            self.max_depth
        );
        let top = *self.top();
        self.matrices.push(top);
    }

    /// Restores the transform saved by the matching `push`.
    ///
    /// # Panics
    /// Panics if there is no matching `push`.
    pub fn pop(&mut self) {
        assert!(self.matrices.len() > 1, "matrix stack underflow");
        self.matrices.pop();
    }

    /// Replaces the current transform.
    pub fn set(&mut self, matrix: Matrix4<f32>) {
        *self.top_mut() = matrix;
    }

    /// Resets the current transform to the identity.
    pub fn identity(&mut self) {
        self.set(Matrix4::identity());
    }

    /// Post-multiplies the current transform by `matrix`.
    pub fn mul(&mut self, matrix: Matrix4<f32>) {
        let top = self.top_mut();
        *top = *top * matrix;
    }

    /// Post-multiplies the current transform by a translation.
    pub fn translate(&mut self, offset: Vector3<f32>) {
        self.mul(Matrix4::from_translation(offset));
    }

    /// Post-multiplies the current transform by a per-axis scale.
    pub fn scale(&mut self, x: f32, y: f32, z: f32) {
        self.mul(Matrix4::from_nonuniform_scale(x, y, z));
    }
}
