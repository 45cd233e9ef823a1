use std::env;
use std::fs;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// The board hash keys must be identical from build to build so that
// positions keep hashing the same way across versions.
const ZOBRIST_SEED: u64 = 0x00c0ffee5ab1e000;

fn push_u64_array(out: &mut String, values: &[u64]) {
    out.push('[');
    for (i, v) in values.iter().enumerate() {
        if i % 4 == 0 {
            out.push_str("\n    ");
        }
        out.push_str(&format!("{:#018x}, ", v));
    }
    out.push_str("\n]");
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    // 64 squares x 8 piece types x 2 owners.  Type 0 (empty) and type 7
    // (padding) stay zero so that hashing an empty square is a no-op.
    let mut piece_keys = [[[0u64; 2]; 8]; 64];
    for square in piece_keys.iter_mut() {
        for t in 1..7 {
            for key in square[t].iter_mut() {
                *key = rng.gen();
            }
        }
    }

    let mut passant_keys = [0u64; 64];
    for key in passant_keys.iter_mut() {
        *key = rng.gen();
    }

    let mut castle_keys = [0u64; 16];
    for key in castle_keys.iter_mut() {
        *key = rng.gen();
    }

    let turn_key: u64 = rng.gen();

    let mut out = String::new();
    out.push_str("pub const PIECE_KEYS: [[[u64; 2]; 8]; 64] = [\n");
    for square in piece_keys.iter() {
        out.push_str("    [");
        for owners in square.iter() {
            out.push_str(&format!("[{:#018x}, {:#018x}], ", owners[0], owners[1]));
        }
        out.push_str("],\n");
    }
    out.push_str("];\n\n");

    out.push_str("pub const PASSANT_KEYS: [u64; 64] = ");
    push_u64_array(&mut out, &passant_keys);
    out.push_str(";\n\n");

    out.push_str("pub const CASTLE_KEYS: [u64; 16] = ");
    push_u64_array(&mut out, &castle_keys);
    out.push_str(";\n\n");

    out.push_str(&format!("pub const TURN_KEY: u64 = {:#018x};\n", turn_key));

    let out_dir = env::var("OUT_DIR").unwrap();
    fs::write(Path::new(&out_dir).join("zobrist_tables.rs"), out).unwrap();
}
