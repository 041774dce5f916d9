use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=PREFIXMAPS_DATA_HINT");

    let hint = env::var("PREFIXMAPS_DATA_HINT")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            env::var("CARGO_MANIFEST_DIR")
                .ok()
                .map(|dir| PathBuf::from(dir).join("data"))
        });

    if let Some(candidate) = hint {
        let canonical = candidate.canonicalize().unwrap_or(candidate);

        println!("cargo:rustc-env=PREFIXMAPS_DATA_HINT={}", canonical.display());
    }
}
