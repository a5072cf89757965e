use firstframe_diff::DiffPatch;
use firstframe_scene::{PropValue, Rect, SceneShadow, ROOT_TAG};
use firstframe_testing::node;

#[test]
fn refresh_copies_changed_props_and_reports_it() {
    let mut target = node(ROOT_TAG, "Root");
    target.set_prop("a", "1");
    target.set_prop("b", "2");
    let mut child = node(2, "Text");
    child.set_prop("text", "old");
    target.add_child(child);

    let mut from = node(ROOT_TAG, "Root");
    from.set_prop("a", "1");
    from.set_prop("b", "3");
    let mut from_child = node(2, "Text");
    from_child.set_prop("text", "new");
    from.add_child(from_child);

    assert!(DiffPatch::refresh_from(&mut target, &from));
    assert_eq!(target.prop("b"), Some(&PropValue::from("3")));
    assert_eq!(target.children[0].prop("text"), Some(&PropValue::from("new")));
}

#[test]
fn refresh_is_idempotent() {
    let mut target = node(ROOT_TAG, "Root");
    target.set_prop("a", "1");
    target.set_frame(Rect::new(0.0, 0.0, 10.0, 10.0));

    let mut from = node(ROOT_TAG, "Root");
    from.set_prop("a", "2");
    from.set_prop("b", "9");
    from.set_frame(Rect::new(0.0, 0.0, 20.0, 20.0));

    assert!(DiffPatch::refresh_from(&mut target, &from));
    // second run finds nothing left to copy
    assert!(!DiffPatch::refresh_from(&mut target, &from));
    assert_eq!(target.props(), from.props());
    assert_eq!(target.frame, from.frame);
}

#[test]
fn refresh_on_equivalent_trees_reports_no_change() {
    let mut target = node(ROOT_TAG, "Root");
    target.set_prop("a", "1");
    let from = target.deep_copy();
    assert!(!DiffPatch::refresh_from(&mut target, &from));
}

#[test]
fn refresh_preserves_target_structure() {
    let mut target = node(ROOT_TAG, "Root");
    target.add_child(node(2, "View"));
    target.add_child(node(3, "View"));

    // source with fewer children: the extra target child is left alone
    let mut from = node(ROOT_TAG, "Root");
    let mut from_child = node(2, "View");
    from_child.set_prop("k", "v");
    from.add_child(from_child);

    DiffPatch::refresh_from(&mut target, &from);
    assert_eq!(target.children.len(), 2);
    assert_eq!(target.children[0].prop("k"), Some(&PropValue::from("v")));
    assert!(target.children[1].props().is_empty());
}

#[test]
fn refresh_does_not_clobber_frame_with_unset_source() {
    let mut target = node(ROOT_TAG, "Root");
    target.set_frame(Rect::new(1.0, 2.0, 3.0, 4.0));
    let from = node(ROOT_TAG, "Root");

    assert!(!DiffPatch::refresh_from(&mut target, &from));
    assert_eq!(target.frame, Some(Rect::new(1.0, 2.0, 3.0, 4.0)));
}

#[test]
fn refresh_syncs_shadow_props() {
    let mut target = node(ROOT_TAG, "Root");
    let mut target_shadow = SceneShadow::new(ROOT_TAG, "Root");
    target_shadow.set_prop("text", "old");
    target.set_shadow(target_shadow);

    let mut from = node(ROOT_TAG, "Root");
    let mut from_shadow = SceneShadow::new(ROOT_TAG, "Root");
    from_shadow.set_prop("text", "new");
    from.set_shadow(from_shadow);

    assert!(DiffPatch::refresh_from(&mut target, &from));
    assert_eq!(
        target.shadow().unwrap().prop("text"),
        Some(&PropValue::from("new"))
    );
    assert!(!DiffPatch::refresh_from(&mut target, &from));
}
