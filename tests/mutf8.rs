use nbtanvil::{decode, encode, Node};

#[test]
fn nul_codepoint_encodes_as_the_overlong_two_byte_form() {
    let encoded = nbtanvil::mutf8_encode("\u{0}");
    assert_eq!(encoded, vec![0xC0, 0x80]);
}

#[test]
fn supplementary_codepoint_encodes_as_a_surrogate_pair() {
    let encoded = nbtanvil::mutf8_encode("\u{1F600}");
    assert_eq!(encoded, vec![0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80]);
}

#[test]
fn decode_then_encode_round_trips_every_valid_codepoint_class() {
    for text in ["", "plain ascii", "caf\u{e9}", "\u{0}", "\u{1F600}\u{1F601}"] {
        let encoded = nbtanvil::mutf8_encode(text);
        let decoded = nbtanvil::mutf8_decode(&encoded, 0).unwrap();
        assert_eq!(decoded, text);
    }
}

#[test]
fn a_string_tag_carrying_supplementary_codepoints_round_trips_through_the_full_codec() {
    let mut root = Node::new_compound("");
    root.append(Node::new_string("emoji", "\u{1F600}\u{1F601}")).unwrap();
    let bytes = encode(&root).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(
        decoded.child_by_key("emoji").and_then(Node::as_string),
        Some("\u{1F600}\u{1F601}")
    );
}
