use std::io::{ErrorKind, Read};

/// Fills `buffer` with native-endian `f32` samples from `reader`.
///
/// Short reads are retried until the buffer is full or the stream ends.
/// Returns the number of complete samples read; a trailing partial sample at
/// end of stream is dropped.
pub fn read_block<R: Read>(reader: &mut R, buffer: &mut [f32]) -> std::io::Result<usize> {
    let bytes: &mut [u8] = bytemuck::cast_slice_mut(buffer);
    let mut filled = 0;
    while filled < bytes.len() {
        match reader.read(&mut bytes[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled / std::mem::size_of::<f32>())
}
