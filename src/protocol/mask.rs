//! Payload masking (RFC 6455 section 5.3).
//!
//! Masking is an XOR with a repeating 4-byte key, so the same routine both
//! masks and unmasks.

/// Byte-by-byte XOR masking: `data[i] ^= mask[i % 4]`.
#[inline]
pub fn apply_mask(data: &mut [u8], mask: [u8; 4]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= mask[i % 4];
    }
}

/// XOR masking four bytes at a time.
///
/// Produces exactly the same output as [`apply_mask`]; used on the receive
/// path where payloads fill the message buffer.
#[inline]
pub fn apply_mask_fast(data: &mut [u8], mask: [u8; 4]) {
    let mask_u32 = u32::from_ne_bytes(mask);
    let mut chunks = data.chunks_exact_mut(4);

    for chunk in &mut chunks {
        let val = u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        chunk.copy_from_slice(&(val ^ mask_u32).to_ne_bytes());
    }

    // The tail starts on a multiple of four, so the key restarts at index 0.
    for (byte, key) in chunks.into_remainder().iter_mut().zip(mask) {
        *byte ^= key;
    }
}
