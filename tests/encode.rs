use nbtanvil::{decode, encode, Kind, Node};

#[test]
fn round_trips_a_nested_tree_through_encode_then_decode() {
    let mut root = Node::new_compound("hello world");
    root.append(Node::new_string("name", "Bananrama")).unwrap();

    let mut list = Node::new_list("numbers");
    for n in 1..=3 {
        list.append(Node::new_int("", n)).unwrap();
    }
    root.append(list).unwrap();

    let mut nested = Node::new_compound("nested");
    nested.append(Node::new_double("pi", 3.5)).unwrap();
    root.append(nested).unwrap();

    let bytes = encode(&root).unwrap();
    let decoded = decode(&bytes).unwrap();

    assert_eq!(decoded.key(), Some("hello world"));
    assert_eq!(
        decoded.child_by_key("name").and_then(Node::as_string),
        Some("Bananrama")
    );
    let numbers = decoded.child_by_key("numbers").unwrap();
    assert_eq!(numbers.child_count(), 3);
    assert_eq!(
        decoded
            .child_by_key("nested")
            .and_then(|n| n.child_by_key("pi"))
            .and_then(Node::as_double),
        Some(3.5)
    );
}

#[test]
fn a_well_formed_byte_sequence_survives_decode_then_encode_unchanged() {
    let bytes: Vec<u8> = "0A 00 0B 68 65 6C 6C 6F 20 77 6F 72 6C 64 08 00 04 6E 61 6D 65 00 09 42 61 6E 61 6E 72 61 6D 61 00"
        .split_whitespace()
        .map(|b| u8::from_str_radix(b, 16).unwrap())
        .collect();
    let tree = decode(&bytes).unwrap();
    let re_encoded = encode(&tree).unwrap();
    assert_eq!(re_encoded, bytes);
}

#[test]
fn compound_key_order_is_preserved_through_a_round_trip() {
    let mut root = Node::new_compound("");
    root.append(Node::new_int("z", 1)).unwrap();
    root.append(Node::new_int("a", 2)).unwrap();
    root.append(Node::new_int("m", 3)).unwrap();

    let bytes = encode(&root).unwrap();
    let decoded = decode(&bytes).unwrap();
    let keys: Vec<&str> = (0..decoded.child_count())
        .map(|i| decoded.child_at(i).unwrap().key().unwrap())
        .collect();
    assert_eq!(keys, vec!["z", "a", "m"]);
}

#[test]
fn empty_list_round_trips_with_an_end_elem_kind() {
    let root = Node::new_list("");
    let bytes = encode(&root).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.kind(), Kind::List);
    assert_eq!(decoded.list_elem_kind(), Some(Kind::End));
    assert_eq!(decoded.child_count(), 0);
}

#[test]
fn zlib_wrapped_round_trip() {
    let root = Node::new_int("n", -1);
    let options = nbtanvil::EncodeOptions {
        compression: Some(nbtanvil::CompressionMode::Zlib),
        ..Default::default()
    };
    let bytes = nbtanvil::encode_with_options(&root, options).unwrap();
    assert_eq!(bytes[0], 0x78);
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded.as_int(), Some(-1));
}
