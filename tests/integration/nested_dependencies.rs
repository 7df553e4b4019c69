//! Nested dependencies: resolving a node reveals further dependencies that
//! are discovered only after the node's own value is registered.

use futures::channel::oneshot;
use prefetch::resolver::DependencyState;
use prefetch::{Descriptor, Node, Resolver};
use std::sync::Mutex;
use std::time::Duration;

use crate::integration::test_utils::{leaf_dep, recorded, EventLog};

#[tokio::test]
async fn test_child_resolves_after_parent_registration() {
    let log = EventLog::new();
    let render_log = log.clone();
    let parent = Node::async_node(recorded("P", false, 5, &log), move |value: &String| {
        render_log.push(format!("P:render({})", value));
        vec![Node::element(
            "Section",
            vec![leaf_dep(recorded("C", false, 0, &render_log))],
        )]
    });

    let resolution = Resolver::default()
        .resolve(Node::element("App", vec![parent]), None)
        .await;

    assert!(resolution.state.is_resolved("P"));
    assert!(resolution.state.is_resolved("C"));

    let p_done = log.position("P:done").unwrap();
    let p_render = log.position("P:render(value:P)").unwrap();
    let c_start = log.position("C:start").unwrap();
    assert!(p_done < p_render);
    assert!(p_render < c_start);
    assert_eq!(log.count("P:start"), 1);
    assert_eq!(log.count("C:start"), 1);
}

#[tokio::test]
async fn test_three_levels_converge() {
    let log = EventLog::new();
    let l1 = log.clone();
    let l2 = log.clone();
    let tree = Node::async_node(recorded("L0", false, 0, &log), move |_| {
        let l2 = l2.clone();
        vec![Node::async_node(recorded("L1", false, 0, &l1), move |_| {
            vec![leaf_dep(recorded("L2", false, 0, &l2))]
        })]
    });

    let resolution = Resolver::default().resolve(tree, None).await;

    for id in ["L0", "L1", "L2"] {
        assert!(resolution.state.is_resolved(id), "{} should be resolved", id);
        assert_eq!(resolution.report.state_of(id), Some(DependencyState::ReWalked));
    }
    assert!(log.position("L0:done").unwrap() < log.position("L1:start").unwrap());
    assert!(log.position("L1:done").unwrap() < log.position("L2:start").unwrap());
}

#[tokio::test]
async fn test_deferred_child_of_resolved_parent_is_skipped() {
    let log = EventLog::new();
    let child_log = log.clone();
    let parent = Node::async_node(recorded("P", false, 0, &log), move |_| {
        vec![leaf_dep(recorded("C", true, 0, &child_log))]
    });

    let resolution = Resolver::default().resolve(parent, None).await;

    assert!(resolution.state.is_resolved("P"));
    assert!(!resolution.state.is_resolved("C"));
    assert_eq!(
        resolution.report.state_of("C"),
        Some(DependencyState::SkippedDeferred)
    );
}

#[tokio::test]
async fn test_siblings_in_a_pass_run_concurrently() {
    // A can only finish once B has started: a sequential resolver would hang.
    let (tx, rx) = oneshot::channel::<()>();
    let rx = Mutex::new(Some(rx));
    let tx = Mutex::new(Some(tx));

    let a = Descriptor::new("A", false, move || {
        let rx = rx.lock().unwrap().take();
        async move {
            if let Some(rx) = rx {
                let _ = rx.await;
            }
            Ok::<_, anyhow::Error>("a".to_string())
        }
    });
    let b = Descriptor::new("B", false, move || {
        let tx = tx.lock().unwrap().take();
        async move {
            if let Some(tx) = tx {
                let _ = tx.send(());
            }
            Ok::<_, anyhow::Error>("b".to_string())
        }
    });
    let app = Node::element("App", vec![leaf_dep(a), leaf_dep(b)]);

    let resolution = tokio::time::timeout(
        Duration::from_secs(5),
        Resolver::default().resolve(app, None),
    )
    .await
    .expect("sibling resolvers should be in flight together");

    assert!(resolution.state.is_resolved("A"));
    assert!(resolution.state.is_resolved("B"));
}
