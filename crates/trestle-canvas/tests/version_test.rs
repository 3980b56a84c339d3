#[test]
fn version_matches_cargo_pkg_version() {
    assert_eq!(trestle_canvas::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(!trestle_canvas::VERSION.is_empty());
}
