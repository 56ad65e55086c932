use std::path::PathBuf;

fn main() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let proto = crate_dir
        .parent().unwrap()  // crates
        .parent().unwrap()  // workspace root
        .join("proto")
        .join("approval.proto");
    let generated = crate_dir.join("src").join("generated").join("approval.v1.rs");

    // Only rebuild if the proto or the checked-in stubs change
    println!("cargo:rerun-if-changed={}", proto.display());
    println!("cargo:rerun-if-changed={}", generated.display());

    if !generated.exists() {
        panic!(
            "Generated gRPC source not found at {:?}. Regenerate it from {:?} and commit it",
            generated, proto
        );
    }

    // Stale stubs are a warning, not a failure: builds must work without protoc
    if let (Ok(proto_meta), Ok(gen_meta)) = (std::fs::metadata(&proto), std::fs::metadata(&generated)) {
        if let (Ok(proto_mtime), Ok(gen_mtime)) = (proto_meta.modified(), gen_meta.modified()) {
            if proto_mtime > gen_mtime {
                println!(
                    "cargo:warning=proto {:?} is newer than generated stubs {:?}",
                    proto, generated
                );
            }
        }
    }
}
