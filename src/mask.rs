/// XORs `payload` with `mask` in place.
///
/// `offset` is the position of `payload[0]` within the whole frame payload, so a
/// payload that arrives in several chunks unmasks the same as one that arrives whole.
#[inline]
pub fn apply(payload: &mut [u8], mask: [u8; 4], offset: usize) {
    for (i, byte) in payload.iter_mut().enumerate() {
        *byte ^= mask[(offset + i) & 3];
    }
}
