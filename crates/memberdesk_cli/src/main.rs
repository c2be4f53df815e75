//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `memberdesk_core` linkage and
//!   storage bootstrap.
//! - Keep output deterministic for quick local sanity checks.

use memberdesk_core::db::migrations::latest_version;
use memberdesk_core::db::open_db_in_memory;

fn main() {
    println!("memberdesk_core version={}", memberdesk_core::core_version());
    println!("schema latest_version={}", latest_version());

    match open_db_in_memory() {
        Ok(_conn) => println!("storage=ok"),
        Err(err) => {
            eprintln!("storage=error {err}");
            std::process::exit(1);
        }
    }
}
