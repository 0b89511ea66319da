use asm_names::serializer::serialize_names;
use asm_names::{recover, Options};

fn main() {
    let _logger = asm_names::logging::init_logging(true).unwrap();
    let listing = [
        "ffc00000: 4ffffb82\tcror\tcr31,cr31,cr31",
        "ffc00004: 00044d41\t.long\t0x44d41",
        "ffc00008: 494e0000\t.long\t0x494e0000",
        "ffc0000c: 7c0802a6\tmflr\tr0",
    ];

    let recovery = recover(listing, &Options::default()).unwrap();
    let v = serialize_names(&recovery.names, recovery.image.as_ref());
    println!("{}", serde_json::to_string_pretty(&v).unwrap());
}
