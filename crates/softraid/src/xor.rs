//! Byte-wise XOR, the parity algebra for the distributed-parity layout.

/// `xor_in_place` XORs `src` into `dst` over the common prefix of the two
/// buffers. Associative, commutative, self-inverse; both parity synthesis
/// and reconstruction reduce to repeated application of this.
#[inline]
pub fn xor_in_place(dst: &mut [u8], src: &[u8]) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d ^= *s;
    }
}

#[cfg(test)]
mod tests {
    use super::xor_in_place;

    #[test]
    fn xor_is_self_inverse() {
        let original = [0x12u8, 0x34, 0x56, 0x78];
        let mask = [0xABu8, 0xCD, 0xEF, 0x01];

        let mut buf = original;
        xor_in_place(&mut buf, &mask);
        assert_ne!(buf, original);
        xor_in_place(&mut buf, &mask);
        assert_eq!(buf, original, "applying the same mask twice must cancel");
    }

    #[test]
    fn parity_reconstructs_any_missing_member() {
        let members = [
            [0x11u8, 0x22, 0x33, 0x44],
            [0x55u8, 0x66, 0x77, 0x88],
            [0x99u8, 0xAA, 0xBB, 0xCC],
        ];

        let mut parity = [0u8; 4];
        for member in &members {
            xor_in_place(&mut parity, member);
        }

        for missing in 0..members.len() {
            let mut rebuilt = parity;
            for (i, member) in members.iter().enumerate() {
                if i != missing {
                    xor_in_place(&mut rebuilt, member);
                }
            }
            assert_eq!(rebuilt, members[missing], "member {missing} must rebuild");
        }
    }

    #[test]
    fn xor_stops_at_the_shorter_buffer() {
        let mut dst = [0xFFu8; 4];
        xor_in_place(&mut dst, &[0xFF, 0xFF]);
        assert_eq!(dst, [0x00, 0x00, 0xFF, 0xFF]);
    }
}
