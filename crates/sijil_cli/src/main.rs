//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `sijil_core` linkage and
//!   schema bootstrap.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("sijil_core version={}", sijil_core::core_version());
    println!(
        "sijil_core schema_version={}",
        sijil_core::db::migrations::latest_version()
    );

    match sijil_core::db::open_db_in_memory() {
        Ok(_) => println!("sijil_core db_bootstrap=ok"),
        Err(err) => println!("sijil_core db_bootstrap=error detail={err}"),
    }
}
