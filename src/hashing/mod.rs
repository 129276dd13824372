use blake3::Hasher;

fn first_u64(hash: &blake3::Hash) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Computes a 64-bit hash of the input data using BLAKE3, truncated from 256 bits.
///
/// Used for chunk point ids, stub-embedding buckets and text fingerprints. With 64 bits the
/// collision probability stays negligible for resume pools in the millions of chunks
/// (`P ≈ n² / 2^65`).
#[inline]
pub fn hash_to_u64(data: &[u8]) -> u64 {
    first_u64(&blake3::hash(data))
}

/// Stable point id for chunk `chunk_index` of a resume.
///
/// Re-indexing the same chunk overwrites its point instead of duplicating it.
#[inline]
pub fn chunk_point_id(resume_id: u64, chunk_index: usize) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(b"resume|");
    hasher.update(&resume_id.to_le_bytes());
    hasher.update(b"|chunk|");
    hasher.update(&(chunk_index as u64).to_le_bytes());
    first_u64(&hasher.finalize())
}

/// Point id for a chunk with no owning resume id, derived from its text.
#[inline]
pub fn content_point_id(text: &str, chunk_index: usize) -> u64 {
    let mut hasher = Hasher::new();
    hasher.update(b"content|");
    hasher.update(text.as_bytes());
    hasher.update(b"|chunk|");
    hasher.update(&(chunk_index as u64).to_le_bytes());
    first_u64(&hasher.finalize())
}
