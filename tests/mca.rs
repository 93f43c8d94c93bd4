use nbtanvil::{Node, ReadMode, Region};

#[test]
fn all_zero_bytes_is_a_valid_empty_region() {
    let bytes = vec![0u8; 8192];
    let region = Region::read(&bytes).unwrap();
    let parsed = region.parse_all();
    assert_eq!(parsed.len(), 1024);
    assert_eq!(parsed.iter().filter(|slot| slot.is_some()).count(), 0);
}

#[test]
fn multiple_chunks_round_trip_independently() {
    let mut region = Region::empty();
    for (slot, value) in [(0usize, 1i32), (512, 2), (1023, 3)] {
        let mut tree = Node::new_compound("");
        tree.append(Node::new_int("v", value)).unwrap();
        region.set_chunk_tree(slot, &tree).unwrap();
        region.set_timestamp(slot, 1000 + value);
    }

    let bytes = region.write();
    let read_back = Region::read(&bytes).unwrap();
    let parsed = read_back.parse_all();

    for (slot, value) in [(0usize, 1i32), (512, 2), (1023, 3)] {
        let tree = parsed[slot].as_ref().unwrap().as_ref().unwrap();
        assert_eq!(tree.child_by_key("v").and_then(Node::as_int), Some(value));
        assert_eq!(read_back.timestamp(slot), Some(1000 + value));
    }
    assert!(parsed[1].is_none());
}

#[test]
fn sector_offset_past_end_of_file_is_invalid_data_in_strict_mode() {
    let mut bytes = vec![0u8; 8192];
    bytes[2] = 10; // sector offset 10, well past the 2-sector file
    bytes[3] = 1;
    assert!(Region::read_with_mode(&bytes, ReadMode::Strict).is_err());
}

#[test]
fn sector_offset_past_end_of_file_nulls_the_slot_in_lenient_mode() {
    let mut bytes = vec![0u8; 8192];
    bytes[2] = 10;
    bytes[3] = 1;
    let region = Region::read_with_mode(&bytes, ReadMode::Lenient).unwrap();
    assert!(region.chunk_bytes(0).is_none());
}

#[test]
fn file_shorter_than_the_two_header_sectors_is_rejected() {
    let bytes = vec![0u8; 4096];
    assert!(Region::read(&bytes).is_err());
}
