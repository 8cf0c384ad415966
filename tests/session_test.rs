mod helpers;

use std::sync::Arc;
use std::thread;

use equalify::scholarship::session::SessionRegistry;
use equalify::scholarship::{stats, store, ListKind};

#[test]
fn sessions_are_isolated() {
    let registry = SessionRegistry::new();
    let a = registry.create();
    let b = registry.create();
    assert_ne!(a, b);

    assert_eq!(registry.with_session(&a, |s| s.mark(ListKind::Saved, "x")), Some(true));
    assert_eq!(registry.with_session(&b, |s| s.mark(ListKind::Favorited, "y")), Some(true));

    assert_eq!(registry.snapshot(&a).ids(ListKind::Saved), vec!["x"]);
    assert!(registry.snapshot(&a).ids(ListKind::Favorited).is_empty());
    assert!(registry.snapshot(&b).ids(ListKind::Saved).is_empty());
}

#[test]
fn concurrent_marks_are_all_recorded() {
    let registry = Arc::new(SessionRegistry::new());
    let session = registry.create();

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let registry = Arc::clone(&registry);
            let session = session.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    registry.with_session(&session, |s| s.mark(ListKind::Applied, &format!("{t}-{i}")));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(registry.snapshot(&session).len(ListKind::Applied), 200);
}

#[test]
fn persisted_flags_show_up_in_stats() {
    let conn = helpers::test_db();
    let ids = helpers::seed(&conn);

    store::set_flag(&conn, &ids[0], ListKind::Saved, true).unwrap();
    store::set_flag(&conn, &ids[1], ListKind::Saved, true).unwrap();
    store::set_flag(&conn, &ids[1], ListKind::Applied, true).unwrap();
    store::set_flag(&conn, &ids[2], ListKind::Favorited, true).unwrap();
    store::set_flag(&conn, &ids[2], ListKind::Favorited, false).unwrap();

    let s = stats::collection_stats(&conn).unwrap();
    assert_eq!(s.total, 4);
    assert_eq!(s.pending, 4);
    assert_eq!(s.saved, 2);
    assert_eq!(s.applied, 1);
    assert_eq!(s.favorited, 0);
    assert_eq!(s.with_due_date, 3);
    assert_eq!(s.with_reward, 3);

    // Flags do not disturb the rest of the document.
    let r = store::get(&conn, &ids[1]).unwrap().unwrap();
    assert!(r.flag(ListKind::Saved) && r.flag(ListKind::Applied));
    assert_eq!(r.title(), Some("Women in Computing Scholarship"));
}
