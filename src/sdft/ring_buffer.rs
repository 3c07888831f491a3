/// Fixed-capacity circular history of samples.
///
/// The capacity is always a power of two so that wrapping is a mask instead
/// of a modulo; `new(n)` allocates enough room to look back at least `n`
/// samples. Writes and reads never allocate, which keeps this usable from an
/// audio callback.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Box<[f32]>,
    mask: usize,
    index: usize,
}

impl RingBuffer {
    pub fn new(requested_size: usize) -> Self {
        let capacity = (requested_size + 1).next_power_of_two();
        Self {
            buffer: vec![0.0; capacity].into_boxed_slice(),
            mask: capacity - 1,
            index: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn write(&mut self, value: f32) {
        self.index &= self.mask;
        self.buffer[self.index] = value;
        self.index += 1;
    }

    /// Value written `position` writes before the most recent one;
    /// `read(0)` is the last value written.
    #[inline]
    pub fn read(&self, position: usize) -> f32 {
        debug_assert!(
            position < self.buffer.len(),
            "ring buffer read at {} exceeds capacity {}",
            position,
            self.buffer.len()
        );
        self.buffer[self.index.wrapping_add(!position) & self.mask]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_is_next_power_of_two_above_request() {
        assert_eq!(RingBuffer::new(0).capacity(), 1);
        assert_eq!(RingBuffer::new(15).capacity(), 16);
        assert_eq!(RingBuffer::new(16).capacity(), 32);
        assert_eq!(RingBuffer::new(100).capacity(), 128);
        assert_eq!(RingBuffer::new(127).capacity(), 128);
        assert_eq!(RingBuffer::new(11462).capacity(), 16384);
    }

    #[test]
    fn starts_zeroed() {
        let rb = RingBuffer::new(15);
        for p in 0..rb.capacity() {
            assert_eq!(rb.read(p), 0.0);
        }
    }

    #[test]
    fn tiny_buffer_overflow() {
        let mut rb = RingBuffer::new(15);

        rb.write(1.0);
        assert_eq!(rb.read(0), 1.0, "insertion succeeded");
        assert_eq!(rb.read(1), 0.0, "boundary shifted");

        for i in 2..10 {
            rb.write(i as f32);
        }
        for i in 0..10 {
            assert_eq!(rb.read(9 - i), i as f32, "sequence value matches");
        }

        for i in 10..20 {
            rb.write(i as f32);
        }
        assert_eq!(rb.read(0), 19.0, "head as expected");
        assert_eq!(rb.read(15), 4.0, "tail as expected");
    }

    #[test]
    fn reads_back_history_after_wrapping() {
        let mut rb = RingBuffer::new(100);
        for i in 0..200 {
            rb.write(i as f32);
        }
        assert_eq!(rb.read(25), 174.0);

        for p in 0..rb.capacity() {
            assert_eq!(rb.read(p), (199 - p) as f32, "position {}", p);
        }
    }
}
