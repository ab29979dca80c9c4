//! Property tests for the binary codec.

use msgwire::protocol::{encode_delimited, DelimitedBuffer, WireType, WireWriter};
use msgwire::{decode, encode, Field, Message};
use proptest::prelude::*;

fn message_from(values: [String; 8]) -> Message {
    let mut msg = Message::new();
    for (field, value) in Field::ALL.into_iter().zip(values) {
        msg.set(field, value);
    }
    msg
}

fn arb_message() -> impl Strategy<Value = Message> {
    // Mix of empty, short ASCII, and arbitrary Unicode values
    let value = prop_oneof![
        Just(String::new()),
        "[a-z0-9@.+ ]{1,16}",
        any::<String>(),
        ".{100,400}",
    ];
    proptest::array::uniform8(value).prop_map(message_from)
}

/// An unknown entry: field number outside 1..=8 with a payload of its wire type.
fn arb_unknown_entry() -> impl Strategy<Value = Vec<u8>> {
    (9u32..100_000, 0u8..4, any::<u64>(), proptest::collection::vec(any::<u8>(), 0..32)).prop_map(
        |(field_number, kind, number, payload)| {
            let mut writer = WireWriter::new();
            match kind {
                0 => {
                    writer.write_tag(field_number, WireType::Varint);
                    writer.write_varint(number);
                }
                1 => {
                    writer.write_tag(field_number, WireType::I64);
                    let mut bytes = writer.into_inner();
                    bytes.extend_from_slice(&number.to_le_bytes());
                    return bytes.to_vec();
                }
                2 => writer.write_bytes_field(field_number, &payload),
                _ => {
                    writer.write_tag(field_number, WireType::I32);
                    let mut bytes = writer.into_inner();
                    bytes.extend_from_slice(&(number as u32).to_le_bytes());
                    return bytes.to_vec();
                }
            }
            writer.finish().to_vec()
        },
    )
}

proptest! {
    #[test]
    fn roundtrip_preserves_all_fields(msg in arb_message()) {
        let decoded = decode(&encode(&msg)).unwrap();
        prop_assert_eq!(decoded, msg);
    }

    #[test]
    fn encoded_len_is_exact(msg in arb_message()) {
        prop_assert_eq!(msg.encoded_len(), encode(&msg).len());
    }

    #[test]
    fn unknown_entries_are_ignored(
        msg in arb_message(),
        unknown in proptest::collection::vec(arb_unknown_entry(), 1..5),
    ) {
        // Interleave unknown entries before each known entry
        let mut bytes = Vec::new();
        let mut unknown = unknown.into_iter().cycle();
        for (field, value) in msg.set_fields() {
            bytes.extend(unknown.next().unwrap_or_default());
            let mut writer = WireWriter::new();
            writer.write_string_field(field.tag(), value);
            bytes.extend_from_slice(&writer.finish());
        }
        bytes.extend(unknown.next().unwrap_or_default());

        prop_assert_eq!(decode(&bytes).unwrap(), msg);
    }

    #[test]
    fn truncated_last_entry_fails(msg in arb_message()) {
        prop_assume!(!msg.is_empty());
        let bytes = encode(&msg);

        let (last_field, last_value) = msg.set_fields().last().unwrap();
        let mut single = Message::new();
        single.set(last_field, last_value);
        let last_start = bytes.len() - single.encoded_len();

        for cut in (last_start + 1)..bytes.len() {
            let err = decode(&bytes[..cut]).unwrap_err();
            prop_assert!(err.is_malformed());
        }
    }

    #[test]
    fn later_value_wins(first in ".{0,20}", second in ".{0,20}", tag in 1u32..=8) {
        let mut writer = WireWriter::new();
        writer.write_string_field(tag, &first);
        writer.write_string_field(tag, &second);

        let decoded = decode(&writer.finish()).unwrap();
        let field = Field::from_tag(tag).unwrap();
        prop_assert_eq!(decoded.get(field), second.as_str());
    }

    #[test]
    fn delimited_chunking_is_irrelevant(
        msgs in proptest::collection::vec(arb_message(), 0..5),
        chunk in 1usize..64,
    ) {
        let mut bytes = Vec::new();
        for msg in &msgs {
            bytes.extend_from_slice(&encode_delimited(msg));
        }

        let mut buffer = DelimitedBuffer::new();
        let mut received = Vec::new();
        for part in bytes.chunks(chunk) {
            received.extend(buffer.push(part).unwrap());
        }
        prop_assert_eq!(received, msgs);
    }
}
