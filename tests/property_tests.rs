//! Property-based tests using proptest
//!
//! These tests validate codec invariants across a wide range of randomly
//! generated inputs: round trips, ceilings enforced before any body is read,
//! transactional record decoding and user-name normalization.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use localchat_protocol::config::Limits;
use localchat_protocol::core::primitives::{WireFloat, WireList, WireString, WireUuid};
use localchat_protocol::core::rational::Rational;
use localchat_protocol::core::serializable::{Deserializable, Serializable};
use localchat_protocol::core::tag::tags;
use localchat_protocol::error::ErrorKind;
use localchat_protocol::package::{normalize_user_name, FieldSpec, FieldValue, Schema};
use localchat_protocol::protocol::{User, UserMessage, UserMessageHistory};
use proptest::prelude::*;
use uuid::Uuid;

fn user_strategy() -> impl Strategy<Value = User> {
    (any::<u128>(), "[a-zA-Z][a-zA-Z ]{1,30}")
        .prop_map(|(id, name)| User::new(Uuid::from_u128(id), name))
}

fn representable_f64() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1.0e15f64..1.0e15).boxed(),
        any::<i32>().prop_map(f64::from).boxed(),
        (any::<i64>(), 0u32..60).prop_map(|(n, e)| n as f64 / 2f64.powi(e as i32)).boxed(),
        Just(f64::INFINITY).boxed(),
        Just(f64::NEG_INFINITY).boxed(),
    ]
}

// Property: strings survive a round trip at exactly their character count
proptest! {
    #[test]
    fn prop_string_roundtrip(value in "\\PC{0,200}") {
        let n = value.chars().count();
        let bytes = WireString(value.clone()).to_bytes().unwrap();
        prop_assert_eq!(WireString::from_bytes(&bytes, &n).unwrap().0, value);
    }
}

// Property: one character over the limit is always rejected as framing
proptest! {
    #[test]
    fn prop_string_over_limit_rejected(value in "\\PC{1,100}") {
        let n = value.chars().count();
        let bytes = WireString(value).to_bytes().unwrap();
        let err = WireString::from_bytes(&bytes, &(n - 1)).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Framing);
    }
}

// Property: an oversized length prefix fails even with no body present
proptest! {
    #[test]
    fn prop_oversized_prefix_needs_no_body(max_chars in 0usize..1000, excess in 1u64..1_000_000) {
        let mut bytes = tags::STRING.to_bytes().to_vec();
        let length = max_chars as u64 * 4 + excess;
        bytes.extend_from_slice(&length.to_be_bytes());
        let err = WireString::from_bytes(&bytes, &max_chars).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Framing);
    }
}

// Property: a list count above the bound fails before any element is decoded
proptest! {
    #[test]
    fn prop_list_bound_precedes_elements(max in 0usize..100, excess in 1u64..u32::MAX as u64) {
        let mut bytes = tags::LIST.to_bytes().to_vec();
        bytes.extend_from_slice(&(max as u64 + excess).to_be_bytes());
        let mut calls = 0;
        let result = WireList::deserialize_with(&mut bytes.as_slice(), max, |r| {
            calls += 1;
            WireUuid::deserialize(r, &())
        });
        prop_assert_eq!(result.unwrap_err().kind(), ErrorKind::Framing);
        prop_assert_eq!(calls, 0);
    }
}

// Property: representable floats round trip bit-exactly
proptest! {
    #[test]
    fn prop_float_roundtrip(value in representable_f64()) {
        prop_assume!(Rational::is_representable(value));
        let bytes = WireFloat(value).to_bytes().unwrap();
        let decoded = WireFloat::from_bytes(&bytes, &()).unwrap().0;
        prop_assert_eq!(decoded.to_bits(), (value + 0.0).to_bits());
    }
}

// Property: finite rationals are reduced; the denominator is a power of two
proptest! {
    #[test]
    fn prop_rational_reduced(value in -1.0e12f64..1.0e12) {
        prop_assume!(Rational::is_representable(value));
        let rational = Rational::from_f64(value).unwrap();
        prop_assert!(rational.denominator.is_power_of_two());
        if rational.denominator > 1 {
            prop_assert!(rational.numerator % 2 != 0);
        }
    }
}

// Property: messages round trip
proptest! {
    #[test]
    fn prop_message_roundtrip(
        sender in user_strategy(),
        text in "\\PC{0,300}",
        timestamp in 0.0f64..4.0e9,
    ) {
        let message = UserMessage::new(sender, text, timestamp);
        let bytes = message.to_bytes().unwrap();
        let decoded = UserMessage::from_bytes(&bytes, &Limits::default()).unwrap();
        prop_assert_eq!(decoded, message);
    }
}

// Property: the user table holds exactly the distinct senders
proptest! {
    #[test]
    fn prop_history_dedup(
        users in prop::collection::vec(user_strategy(), 1..8),
        picks in prop::collection::vec(any::<prop::sample::Index>(), 0..64),
    ) {
        let history: UserMessageHistory = picks
            .iter()
            .enumerate()
            .map(|(i, pick)| UserMessage::new(pick.get(&users).clone(), format!("#{i}"), i as f64))
            .collect();

        let mut distinct: Vec<&User> = history.iter().map(|m| &m.sender).collect();
        distinct.sort_by_key(|u| (u.id, u.name.clone()));
        distinct.dedup();
        prop_assert_eq!(history.senders().len(), distinct.len());

        let decoded = UserMessageHistory::from_bytes(&history.to_bytes().unwrap(), &Limits::default()).unwrap();
        prop_assert_eq!(decoded, history);
    }
}

// Property: any major version other than the current one is rejected
proptest! {
    #[test]
    fn prop_history_major_version_gate(major in any::<u16>(), minor in any::<u16>()) {
        prop_assume!(major != 1);
        let mut bytes = UserMessageHistory::new().to_bytes().unwrap().to_vec();
        bytes[8..10].copy_from_slice(&major.to_be_bytes());
        bytes[10..12].copy_from_slice(&minor.to_be_bytes());
        let err = UserMessageHistory::from_bytes(&bytes, &Limits::default()).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Framing);
    }
}

// Property: records round trip, and a failed decode never alters the target
proptest! {
    #[test]
    fn prop_record_roundtrip_and_transactional(
        count in any::<i64>(),
        label in proptest::option::of("\\PC{0,16}"),
        garbage in prop::collection::vec(any::<u8>(), 0..64),
    ) {
        let schema = Schema::new([
            FieldSpec::integer("count"),
            FieldSpec::string("label", 16).optional(),
        ]).unwrap();

        let mut record = schema.create();
        record.set("count", count).unwrap();
        if let Some(label) = label {
            record.set("label", label).unwrap();
        }

        let bytes = record.to_bytes().unwrap();
        let decoded = schema.deserialize(&mut bytes.as_ref()).unwrap();
        prop_assert_eq!(&decoded, &record);

        let before = record.clone();
        if record.deserialize(&mut garbage.as_slice()).is_err() {
            prop_assert_eq!(&record, &before);
        }
    }
}

// Property: decoding arbitrary bytes never panics
proptest! {
    #[test]
    fn prop_arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let limits = Limits::default();
        let _ = UserMessageHistory::from_bytes(&data, &limits);
        let _ = UserMessage::from_bytes(&data, &limits);
        let schema = Schema::new([
            FieldSpec::float("f"),
            FieldSpec::user_name("u", 8).optional(),
        ]).unwrap();
        let _ = schema.deserialize(&mut data.as_slice());
    }
}

// Property: normalization is idempotent and never yields short names
proptest! {
    #[test]
    fn prop_normalize_idempotent(raw in "\\PC{0,40}|[ \\t\\r\\n a-z\\x00-\\x1f]{0,40}") {
        if let Some(once) = normalize_user_name(&raw) {
            prop_assert!(once.chars().count() >= 2);
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
            prop_assert_eq!(normalize_user_name(&once), Some(once.clone()));
        }
    }
}

// Property: integer fields accept every 128-bit value
proptest! {
    #[test]
    fn prop_integer_field_full_range(value in any::<i128>()) {
        let spec = FieldSpec::integer("n");
        let raw = spec.encode(&FieldValue::Integer(value)).unwrap();
        prop_assert_eq!(spec.decode(&raw).unwrap(), FieldValue::Integer(value));
    }
}
