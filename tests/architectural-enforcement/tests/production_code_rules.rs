//! Integration Test: Production Code Rules
//!
//! **Policy**:
//! - Async code in the core and the console MUST NOT block the runtime. Use
//!   `tokio::io`, `tokio::fs` and async `reqwest`, never `std::fs`/`std::net`
//!   or `reqwest::blocking`, inside an `async fn`. Blocking setup before the
//!   runtime starts (config loading, logging init) is fine.
//! - Generated markup MUST NOT carry inline event handlers. Interactive
//!   elements use `data-action` attributes and surfaces bind handlers.
//! - Production code MUST propagate errors instead of calling `unwrap()` or
//!   `expect()`.

use architectural_enforcement::{
    blocking_io_violations, inline_handler_violations, panic_violations, rust_files,
    scan_production, workspace_root, Violation, PRODUCTION_DIRS,
};

fn report(title: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }

    eprintln!("\n❌ {title}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }

    panic!(
        "\nFound {} violation(s) in production code.\nFix these before merging!",
        violations.len()
    );
}

#[test]
fn test_production_dirs_exist() {
    let root = workspace_root();
    for dir in PRODUCTION_DIRS {
        let files = rust_files(&root.join(dir));
        assert!(!files.is_empty(), "No Rust sources found under {dir}");
    }
}

#[test]
fn test_no_blocking_io_in_async_code() {
    report(
        "Blocking I/O inside async functions",
        &scan_production(blocking_io_violations),
    );
}

#[test]
fn test_no_inline_event_handlers() {
    report(
        "Inline event handlers in generated markup",
        &scan_production(inline_handler_violations),
    );
}

#[test]
fn test_no_unwrap_in_production_code() {
    report(
        "unwrap()/expect() in production code",
        &scan_production(panic_violations),
    );
}
