use super::*;

#[test]
fn test_allocate_bumps_byte_count() {
    let mut region = Region::with_chunk_size(1024);
    assert_eq!(region.bytes_allocated(), 0);

    let a = region.allocate(16, 8);
    assert_eq!(a.len(), 16);
    assert_eq!(region.bytes_allocated(), 16);

    let b = region.allocate(32, 8);
    assert_eq!(b.len(), 32);
    assert_eq!(region.bytes_allocated(), 48);
}

#[test]
fn test_allocations_are_disjoint_and_writable() {
    let mut region = Region::with_chunk_size(1024);
    let a = region.allocate(4, 1);
    let b = region.allocate(4, 1);

    region.bytes_mut(a).copy_from_slice(&[1, 2, 3, 4]);
    region.bytes_mut(b).copy_from_slice(&[5, 6, 7, 8]);

    assert_eq!(region.bytes(a), &[1, 2, 3, 4]);
    assert_eq!(region.bytes(b), &[5, 6, 7, 8]);
}

#[test]
fn test_oversized_request_gets_dedicated_chunk() {
    let mut region = Region::with_chunk_size(64);
    let big = region.allocate(256, 8);
    assert_eq!(big.len(), 256);
    assert_eq!(region.bytes_allocated(), 256);

    // A later small allocation still succeeds.
    let small = region.allocate(8, 8);
    assert_eq!(small.len(), 8);
}

#[test]
fn test_zero_size_allocation() {
    let mut region = Region::with_chunk_size(64);
    let empty = region.allocate(0, 1);
    assert!(empty.is_empty());
}

#[test]
#[should_panic(expected = "invalid region alignment")]
fn test_non_power_of_two_alignment_panics() {
    let mut region = Region::new();
    region.allocate(8, 3);
}
