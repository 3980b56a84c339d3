use trestle_canvas::{CollapseMode, CollapseState, Layout};
use trestle_core::DiagramType;

#[test]
fn collapse_state_reads_and_writes_the_layout_record() {
    let mut layout = Layout::empty(DiagramType::Architecture);
    layout.move_node("a", 0.0, 0.0);
    layout.set_collapsed("a", true);
    layout.set_collapsed("n", true);

    let mut state = CollapseState::from_layout(&layout);
    assert_eq!(state.mode("a"), CollapseMode::Collapsed);
    assert_eq!(state.mode("n"), CollapseMode::Collapsed);
    assert_eq!(state.mode("b"), CollapseMode::Expanded);

    assert_eq!(state.toggle("a"), CollapseMode::Expanded);
    assert_eq!(state.toggle("b"), CollapseMode::Collapsed);
    state.write_to(&mut layout);

    assert_eq!(layout.nodes["a"].collapsed, None);
    assert_eq!(layout.nodes["a"].x, Some(0.0));
    assert_eq!(layout.nodes["n"].collapsed, Some(true));
    assert_eq!(layout.nodes["b"].collapsed, Some(true));
    assert_eq!(CollapseState::from_layout(&layout), state);
}

#[test]
fn toggling_twice_restores_the_mode() {
    let mut state = CollapseState::default();
    assert!(!state.is_collapsed("a"));
    state.toggle("a");
    assert!(state.is_collapsed("a"));
    state.toggle("a");
    assert_eq!(state, CollapseState::default());
}

#[test]
fn explicit_modes_are_idempotent() {
    let mut state = CollapseState::default();
    state.set("a", CollapseMode::Collapsed);
    state.set("a", CollapseMode::Collapsed);
    assert_eq!(state.mode("a"), CollapseMode::Collapsed);
    state.set("a", CollapseMode::Expanded);
    state.set("a", CollapseMode::Expanded);
    assert_eq!(state, CollapseState::default());
}
