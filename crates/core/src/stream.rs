//! Deterministic HMAC-SHA256 byte stream.
//!
//! `B[32*r + j]` is the `j`-th byte of `HMAC_SHA256(server, client || ":" ||
//! decimal(nonce) || ":" || decimal(r))`. The server seed is used as the raw
//! HMAC key — it is never hex-decoded or otherwise transformed.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Bytes per HMAC-SHA256 block (one full digest).
pub const BLOCK_SIZE: usize = 32;

/// Allocation-free producer of the per-`(seeds, nonce)` byte stream.
///
/// Computes HMAC blocks lazily, one 32-byte block at a time, as the cursor
/// crosses block boundaries. Two cursors initialized at `c1 < c2` agree on
/// every byte at positions `>= c2`, since each block depends only on
/// `(server, client, nonce, round)`.
pub struct ByteCursor<'a> {
    server: &'a [u8],
    client: &'a [u8],
    nonce: u64,
    round: u64,
    position: usize,
    block: Option<[u8; BLOCK_SIZE]>,
}

impl<'a> ByteCursor<'a> {
    /// Initialize at an arbitrary logical `start_cursor`. The first HMAC
    /// block is not computed until the first byte is drawn.
    pub fn new(server: &'a [u8], client: &'a [u8], nonce: u64, start_cursor: u64) -> Self {
        Self {
            server,
            client,
            nonce,
            round: start_cursor / BLOCK_SIZE as u64,
            position: (start_cursor % BLOCK_SIZE as u64) as usize,
            block: None,
        }
    }

    /// Draw the next byte and advance the cursor by one position.
    pub fn next_byte(&mut self) -> u8 {
        if self.block.is_none() {
            self.block = Some(compute_block(self.server, self.client, self.nonce, self.round));
        }
        let byte = self.block.expect("block computed above")[self.position];
        self.position += 1;
        if self.position == BLOCK_SIZE {
            self.position = 0;
            self.round += 1;
            self.block = None;
        }
        byte
    }

    /// Fill `dest` with consecutive bytes starting at the current cursor
    /// position, without any intermediate allocation.
    pub fn fill(&mut self, dest: &mut [u8]) {
        for slot in dest.iter_mut() {
            *slot = self.next_byte();
        }
    }
}

/// `HMAC_SHA256(server, client || ":" || decimal(nonce) || ":" || decimal(round))`.
fn compute_block(server: &[u8], client: &[u8], nonce: u64, round: u64) -> [u8; BLOCK_SIZE] {
    let mut mac = HmacSha256::new_from_slice(server).expect("HMAC accepts keys of any length");
    mac.update(client);
    mac.update(b":");
    mac.update(nonce.to_string().as_bytes());
    mac.update(b":");
    mac.update(round.to_string().as_bytes());
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_byte(server: &[u8], client: &[u8], nonce: u64, cursor: u64) -> u8 {
        let round = cursor / BLOCK_SIZE as u64;
        let position = (cursor % BLOCK_SIZE as u64) as usize;
        compute_block(server, client, nonce, round)[position]
    }

    #[test]
    fn matches_reference_byte_for_byte() {
        let server = b"server-seed";
        let client = b"client-seed";
        let nonce = 42;

        let mut cursor = ByteCursor::new(server, client, nonce, 0);
        for i in 0..100u64 {
            assert_eq!(cursor.next_byte(), reference_byte(server, client, nonce, i));
        }
    }

    #[test]
    fn two_cursors_agree_past_their_common_start() {
        let server = b"s";
        let client = b"c";
        let nonce = 7;

        // A single continuous draw from 0..100 must equal the concatenation
        // of independent cursors started at 0 and at 50.
        let mut whole = ByteCursor::new(server, client, nonce, 0);
        let mut whole_bytes = [0u8; 100];
        whole.fill(&mut whole_bytes);

        let mut tail = ByteCursor::new(server, client, nonce, 50);
        let mut tail_bytes = [0u8; 50];
        tail.fill(&mut tail_bytes);

        assert_eq!(&whole_bytes[50..], &tail_bytes[..]);
    }

    #[test]
    fn crosses_block_boundary_correctly() {
        let server = b"boundary-server";
        let client = b"boundary-client";
        let nonce = 1;

        let mut cursor = ByteCursor::new(server, client, nonce, 31);
        let b0 = cursor.next_byte();
        let b1 = cursor.next_byte();

        assert_eq!(b0, reference_byte(server, client, nonce, 31));
        assert_eq!(b1, reference_byte(server, client, nonce, 32));
    }

    #[test]
    fn deterministic_across_independent_invocations() {
        let server = b"det-server";
        let client = b"det-client";
        let nonce = 999;

        let mut a = ByteCursor::new(server, client, nonce, 0);
        let mut b = ByteCursor::new(server, client, nonce, 0);

        let mut buf_a = [0u8; 256];
        let mut buf_b = [0u8; 256];
        a.fill(&mut buf_a);
        b.fill(&mut buf_b);

        assert_eq!(buf_a, buf_b);
    }
}
