//! Bounded geometry staging and the flush protocol.
//!
//! A `BatchBuffer` owns two fixed-size CPU regions, one for vertex bytes and one for
//! `u32` indices. Geometry is written between `begin` and `end`, and is handed to the
//! graphics device in flushes of at most one region's worth. Each flush is exactly one
//! indexed draw call.
//!
//! # Flush Rules
//!
//! - `end` always flushes.
//! - An `emit` that completes a primitive flushes once either region is within one
//!   primitive of the current mode of its capacity.
//! - Flushing with no vertices does nothing.
//! - The first flush creates the device buffers from the whole regions; later flushes
//!   only upload the written prefix.
//!
//! # Example
//!
//! ```ignore
//! let mut scope = batch.begin(DrawMode::Quads, &mut render_context);
//! scope.indices(&[0, 1, 2, 2, 3, 0]).color_rgba(0xffffffff);
//! scope.vertex(0.0, 1.0, 0.0).tex_coords(0.0, 0.0).emit();
//! scope.vertex(0.0, 0.0, 0.0).tex_coords(0.0, 1.0).emit();
//! scope.vertex(1.0, 0.0, 0.0).tex_coords(1.0, 1.0).emit();
//! scope.vertex(1.0, 1.0, 0.0).tex_coords(1.0, 0.0).emit();
//! scope.end();
//! ```

use super::{
    draw_mode::DrawMode,
    vertex::{Vertex, VERTEX_SIZE},
};

/// The device side of a batch: buffer storage and indexed draws.
///
/// Implemented by the wgpu render context. The batch never talks to the GPU except
/// through this trait.
pub trait GeometryDevice {
    /// Handle to one vertex buffer and one index buffer.
    type Buffers;

    /// Creates streaming buffers initialised with the full backing regions.
    fn create_buffers(&mut self, vertices: &[u8], indices: &[u32]) -> Self::Buffers;

    /// Overwrites the start of existing buffers.
    fn update_buffers(&mut self, buffers: &Self::Buffers, vertices: &[u8], indices: &[u32]);

    /// Draws the first `index_count` indices.
    fn draw_indexed(&mut self, buffers: &Self::Buffers, mode: DrawMode, index_count: u32);

    /// Destroys buffers created by this device.
    fn release_buffers(&mut self, buffers: Self::Buffers);
}

/// Fixed-capacity vertex and index staging.
///
/// `B` is the buffer handle of the `GeometryDevice` the batch is flushed to.
pub struct BatchBuffer<B> {
    vertices: Vec<u8>,
    indices: Vec<u32>,
    vertex_capacity: usize,
    index_capacity: usize,
    vertex_count: usize,
    index_count: usize,
    byte_offset: usize,
    pending: Vertex,
    mode: DrawMode,
    buffers: Option<B>,
    flush_count: u32,
}

impl<B> BatchBuffer<B> {
    /// Creates a batch able to hold `vertex_capacity` vertices and
    /// `index_capacity` indices between flushes.
    pub fn new(vertex_capacity: usize, index_capacity: usize) -> Self {
        log::debug!(
            "Allocating batch for {} vertices and {} indices",
            vertex_capacity,
            index_capacity
        );
        Self {
            vertices: vec![0; vertex_capacity * VERTEX_SIZE],
            indices: vec![0; index_capacity],
            vertex_capacity,
            index_capacity,
            vertex_count: 0,
            index_count: 0,
            byte_offset: 0,
            pending: Vertex::default(),
            mode: DrawMode::Quads,
            buffers: None,
            flush_count: 0,
        }
    }

    /// Opens a span of geometry drawn with `mode` on `device`.
    ///
    /// The returned scope borrows both the batch and the device until `end`.
    pub fn begin<'a, D>(&'a mut self, mode: DrawMode, device: &'a mut D) -> BatchScope<'a, B, D>
    where
        D: GeometryDevice<Buffers = B>,
    {
        self.clear();
        self.mode = mode;
        BatchScope {
            batch: self,
            device,
        }
    }

    /// Hands the device buffers back to `device`. Later calls do nothing.
    pub fn release<D>(&mut self, device: &mut D)
    where
        D: GeometryDevice<Buffers = B>,
    {
        if let Some(buffers) = self.buffers.take() {
            device.release_buffers(buffers);
            log::debug!("Released batch buffers");
        }
    }

    /// Vertices written since the last flush.
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Indices written since the last flush.
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    /// Bytes of vertex data written since the last flush.
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Returns how many draws were issued since the previous call.
    pub fn take_flush_count(&mut self) -> u32 {
        std::mem::take(&mut self.flush_count)
    }

    fn clear(&mut self) {
        self.vertex_count = 0;
        self.index_count = 0;
        self.byte_offset = 0;
    }

    fn emit(&mut self) -> bool {
        assert!(
            self.vertex_count < self.vertex_capacity,
            "batch vertex capacity of {} exceeded",
            self.vertex_capacity
        );
        let end = self.byte_offset + VERTEX_SIZE;
        self.vertices[self.byte_offset..end].copy_from_slice(bytemuck::bytes_of(&self.pending));
        self.byte_offset = end;
        self.vertex_count += 1;

        let primitive_vertices = self.mode.primitive_vertices();
        self.vertex_count % primitive_vertices == 0
            && (self.vertex_count + primitive_vertices >= self.vertex_capacity
                || self.index_count + self.mode.primitive_indices() >= self.index_capacity)
    }

    fn push_indices(&mut self, indices: &[u32]) {
        let end = self.index_count + indices.len();
        assert!(
            end <= self.index_capacity,
            "batch index capacity of {} exceeded",
            self.index_capacity
        );
        let base = self.vertex_count as u32;
        for (slot, index) in self.indices[self.index_count..end].iter_mut().zip(indices) {
            *slot = index + base;
        }
        self.index_count = end;
    }

    fn flush<D>(&mut self, device: &mut D)
    where
        D: GeometryDevice<Buffers = B>,
    {
        if self.vertex_count == 0 {
            return;
        }
        debug_assert!(self.indices[..self.index_count]
            .iter()
            .all(|&index| (index as usize) < self.vertex_count));

        let buffers = match self.buffers.take() {
            Some(buffers) => {
                device.update_buffers(
                    &buffers,
                    &self.vertices[..self.byte_offset],
                    &self.indices[..self.index_count],
                );
                buffers
            }
            None => device.create_buffers(&self.vertices, &self.indices),
        };
        device.draw_indexed(&buffers, self.mode, self.index_count as u32);
        self.buffers = Some(buffers);
        self.flush_count += 1;

        self.clear();
    }
}

/// An open begin/end span on a `BatchBuffer`.
///
/// Setters only change the pending vertex; `emit` appends it. Colour and texture
/// coordinates carry over from one vertex to the next until changed.
#[must_use = "geometry is only drawn once the scope is ended"]
pub struct BatchScope<'a, B, D>
where
    D: GeometryDevice<Buffers = B>,
{
    batch: &'a mut BatchBuffer<B>,
    device: &'a mut D,
}

impl<B, D> BatchScope<'_, B, D>
where
    D: GeometryDevice<Buffers = B>,
{
    /// Sets the pending position.
    pub fn vertex(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.batch.pending.position = [x, y, z];
        self
    }

    /// Sets the pending position on the `z = 0` plane.
    pub fn vertex_2d(&mut self, x: f32, y: f32) -> &mut Self {
        self.vertex(x, y, 0.0)
    }

    /// Sets the pending colour from its components.
    pub fn color(&mut self, r: u8, g: u8, b: u8, a: u8) -> &mut Self {
        self.batch.pending.color = [r, g, b, a];
        self
    }

    /// Sets the pending colour from a packed `0xRRGGBBAA` value.
    pub fn color_rgba(&mut self, rgba: u32) -> &mut Self {
        self.batch.pending.color = rgba.to_be_bytes();
        self
    }

    /// Sets the pending texture coordinates.
    pub fn tex_coords(&mut self, u: f32, v: f32) -> &mut Self {
        self.batch.pending.tex_coords = [u, v];
        self
    }

    /// Appends indices relative to the next vertex to be emitted.
    ///
    /// Call this before emitting the vertices of a primitive so each group can be
    /// written as if it were the first.
    ///
    /// # Panics
    /// Panics if the index region would overflow.
    pub fn indices(&mut self, indices: &[u32]) -> &mut Self {
        self.batch.push_indices(indices);
        self
    }

    /// Appends the pending vertex, flushing if the batch is full.
    ///
    /// # Panics
    /// Panics if the vertex region is already full.
    pub fn emit(&mut self) {
        if self.batch.emit() {
            self.batch.flush(self.device);
        }
    }

    /// Draws everything written so far and starts a new window.
    pub fn flush(&mut self) {
        self.batch.flush(self.device);
    }

    /// Draws the remaining geometry and closes the span.
    pub fn end(self) {
        self.batch.flush(self.device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUAD: [u32; 6] = [0, 1, 2, 2, 3, 0];

    #[derive(Debug, PartialEq)]
    enum Event {
        Create {
            buffers: usize,
            vertex_bytes: Vec<u8>,
            indices: Vec<u32>,
        },
        Update {
            buffers: usize,
            vertex_bytes: usize,
            indices: Vec<u32>,
        },
        Draw {
            buffers: usize,
            mode: DrawMode,
            index_count: u32,
        },
        Release(usize),
    }

    #[derive(Default)]
    struct RecordingDevice {
        next_id: usize,
        events: Vec<Event>,
    }

    impl RecordingDevice {
        fn draws(&self) -> Vec<u32> {
            self.events
                .iter()
                .filter_map(|event| match event {
                    Event::Draw { index_count, .. } => Some(*index_count),
                    _ => None,
                })
                .collect()
        }
    }

    impl GeometryDevice for RecordingDevice {
        type Buffers = usize;

        fn create_buffers(&mut self, vertices: &[u8], indices: &[u32]) -> usize {
            self.next_id += 1;
            self.events.push(Event::Create {
                buffers: self.next_id,
                vertex_bytes: vertices.to_vec(),
                indices: indices.to_vec(),
            });
            self.next_id
        }

        fn update_buffers(&mut self, buffers: &usize, vertices: &[u8], indices: &[u32]) {
            self.events.push(Event::Update {
                buffers: *buffers,
                vertex_bytes: vertices.len(),
                indices: indices.to_vec(),
            });
        }

        fn draw_indexed(&mut self, buffers: &usize, mode: DrawMode, index_count: u32) {
            self.events.push(Event::Draw {
                buffers: *buffers,
                mode,
                index_count,
            });
        }

        fn release_buffers(&mut self, buffers: usize) {
            self.events.push(Event::Release(buffers));
        }
    }

    fn quad(scope: &mut BatchScope<'_, usize, RecordingDevice>, x: f32) {
        scope.indices(&QUAD);
        scope.vertex(x, 1.0, 0.0).tex_coords(0.0, 0.0).emit();
        scope.vertex(x, 0.0, 0.0).tex_coords(0.0, 1.0).emit();
        scope.vertex(x + 1.0, 0.0, 0.0).tex_coords(1.0, 1.0).emit();
        scope.vertex(x + 1.0, 1.0, 0.0).tex_coords(1.0, 0.0).emit();
    }

    #[test]
    fn empty_span_touches_nothing() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(16, 24);
        batch.begin(DrawMode::Quads, &mut device).end();
        assert!(device.events.is_empty());
        batch.release(&mut device);
        assert!(device.events.is_empty());
    }

    #[test]
    fn indices_chain_across_primitives() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(16, 24);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        quad(&mut scope, 0.0);
        quad(&mut scope, 1.0);
        scope.end();

        match &device.events[0] {
            Event::Create { indices, .. } => {
                assert_eq!(&indices[..12], &[0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
            }
            other => panic!("expected buffer creation, got {:?}", other),
        }
        assert_eq!(device.draws(), vec![12]);
    }

    #[test]
    fn filling_the_vertex_region_flushes_and_resets() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(8, 64);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        quad(&mut scope, 0.0);
        quad(&mut scope, 1.0);
        assert_eq!(scope.batch.vertex_count(), 0);
        assert_eq!(scope.batch.index_count(), 0);
        assert_eq!(scope.batch.byte_offset(), 0);
        scope.end();

        // each quad brings the region within one quad of its capacity
        assert_eq!(device.draws(), vec![6, 6]);
    }

    #[test]
    fn flush_fires_one_primitive_before_the_vertex_capacity() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(12, 64);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        quad(&mut scope, 0.0);
        assert_eq!(scope.batch.vertex_count(), 4);
        quad(&mut scope, 1.0);
        assert_eq!(scope.batch.vertex_count(), 0);
        quad(&mut scope, 2.0);
        assert_eq!(scope.batch.vertex_count(), 4);
        scope.end();

        assert_eq!(device.draws(), vec![12, 6]);
    }

    #[test]
    fn filling_the_index_region_flushes_early() {
        let mut device = RecordingDevice::default();
        // room for four quads of vertices but only two of indices
        let mut batch = BatchBuffer::new(16, 12);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        for i in 0..3 {
            quad(&mut scope, i as f32);
        }
        scope.end();

        assert_eq!(device.draws(), vec![6, 6, 6]);
        match &device.events[2] {
            Event::Update { indices, .. } => assert_eq!(indices, &QUAD.to_vec()),
            other => panic!("expected buffer update, got {:?}", other),
        }
    }

    #[test]
    fn later_flushes_upload_only_the_written_prefix() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(100, 150);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        quad(&mut scope, 0.0);
        scope.flush();
        quad(&mut scope, 5.0);
        scope.end();

        assert_eq!(device.events.len(), 4);
        match &device.events[0] {
            Event::Create {
                buffers,
                vertex_bytes,
                indices,
            } => {
                assert_eq!(*buffers, 1);
                assert_eq!(vertex_bytes.len(), 100 * VERTEX_SIZE);
                assert_eq!(indices.len(), 150);
            }
            other => panic!("expected buffer creation, got {:?}", other),
        }
        assert_eq!(
            device.events[2],
            Event::Update {
                buffers: 1,
                vertex_bytes: 4 * VERTEX_SIZE,
                indices: QUAD.to_vec(),
            }
        );
        assert_eq!(
            device.events[3],
            Event::Draw {
                buffers: 1,
                mode: DrawMode::Quads,
                index_count: 6,
            }
        );
        assert_eq!(batch.take_flush_count(), 2);
        assert_eq!(batch.take_flush_count(), 0);
    }

    #[test]
    fn buffers_survive_spans_and_are_released_once() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(16, 24);
        for _ in 0..2 {
            let mut scope = batch.begin(DrawMode::Quads, &mut device);
            quad(&mut scope, 0.0);
            scope.end();
        }
        batch.release(&mut device);
        batch.release(&mut device);

        let creates = device
            .events
            .iter()
            .filter(|event| matches!(event, Event::Create { .. }))
            .count();
        let releases: Vec<&Event> = device
            .events
            .iter()
            .filter(|event| matches!(event, Event::Release(_)))
            .collect();
        assert_eq!(creates, 1);
        assert_eq!(releases, vec![&Event::Release(1)]);
    }

    #[test]
    fn colors_and_uvs_are_serialized() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(3, 3);
        let mut scope = batch.begin(DrawMode::Triangles, &mut device);
        scope.indices(&[0, 1, 2]);
        scope.vertex_2d(1.0, 2.0).emit();
        scope.color_rgba(0x11223344).tex_coords(0.5, 0.75).emit();
        scope.color(1, 2, 3, 4).emit();

        let Event::Create { vertex_bytes, .. } = &device.events[0] else {
            panic!("expected the full batch to flush");
        };
        let vertices: Vec<Vertex> = vertex_bytes
            .chunks_exact(VERTEX_SIZE)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        assert_eq!(vertices[0].position, [1.0, 2.0, 0.0]);
        assert_eq!(vertices[0].color, [0xff; 4]);
        assert_eq!(vertices[1].color, [0x11, 0x22, 0x33, 0x44]);
        assert_eq!(vertices[1].tex_coords, [0.5, 0.75]);
        assert_eq!(vertices[2].color, [1, 2, 3, 4]);
        assert_eq!(vertices[2].tex_coords, [0.5, 0.75]);
    }

    #[test]
    fn line_loops_draw_eight_indices_per_outline() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(8, 16);
        let mut scope = batch.begin(DrawMode::LineLoop, &mut device);
        scope.indices(&[0, 1, 1, 2, 2, 3, 3, 0]);
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            scope.vertex_2d(x, y).emit();
        }
        scope.end();

        assert!(device.events.contains(&Event::Draw {
            buffers: 1,
            mode: DrawMode::LineLoop,
            index_count: 8,
        }));
    }

    #[test]
    #[should_panic(expected = "index capacity")]
    fn overrunning_the_index_region_panics() {
        let mut device = RecordingDevice::default();
        let mut batch = BatchBuffer::new(16, 4);
        let mut scope = batch.begin(DrawMode::Quads, &mut device);
        scope.indices(&QUAD);
    }
}
