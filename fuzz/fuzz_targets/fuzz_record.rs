#![no_main]

use libfuzzer_sys::fuzz_target;
use localchat_protocol::package::{options_schema, FieldSpec, Schema};

fuzz_target!(|data: &[u8]| {
    // Options file decoding - test for panics on hostile files
    let _ = options_schema().deserialize(&mut &data[..]);

    // Every field kind at once; a failed in-place decode must leave the record intact
    if let Ok(schema) = Schema::new([
        FieldSpec::bytes("b", 64),
        FieldSpec::string("s", 16).optional(),
        FieldSpec::integer("i").optional(),
        FieldSpec::float("f").optional(),
        FieldSpec::user_name("u", 16).optional(),
        FieldSpec::color("c").optional(),
    ]) {
        let mut record = schema.create();
        let _ = record.set("b", vec![1u8, 2, 3]);
        let before = record.clone();
        if record.deserialize(&mut &data[..]).is_err() {
            assert_eq!(record, before);
        }
    }
});
