//! Tests for TreeBuilder: structure, counts, ordering, determinism

use rstest::rstest;

use sitetree::domain::{expand_chain, TreeBuilder, UrlTree};

fn build(urls: &[&str]) -> UrlTree {
    TreeBuilder::new().build(urls.iter().copied())
}

fn child_labels(tree: &UrlTree, id: &str) -> Vec<String> {
    let idx = tree.index_of(id).expect("node exists");
    tree.children(idx).map(|(_, n)| n.label.clone()).collect()
}

// ============================================================
// Structure
// ============================================================

#[test]
fn given_blog_example_when_building_then_branch_sorts_before_leaf() {
    // Arrange
    let urls = [
        "https://a.com/blog/post-1",
        "https://a.com/blog/post-2",
        "https://a.com/",
    ];

    // Act
    let tree = build(&urls);

    // Assert
    assert_eq!(child_labels(&tree, "root"), vec!["a.com"]);
    assert_eq!(child_labels(&tree, "host:a.com"), vec!["blog", "/"]);
    assert_eq!(
        child_labels(&tree, "host:a.com:/blog"),
        vec!["post-1", "post-2"]
    );
    assert_eq!(tree.leaf_count(), 3);

    let blog = tree.get("host:a.com:/blog").unwrap();
    assert!(blog.url.is_none());
    assert!(tree.get("host:a.com:/").unwrap().url.is_some());
}

#[test]
fn given_malformed_entry_when_building_then_dropped_without_affecting_counts() {
    let mut builder = TreeBuilder::new();
    let tree = builder.build([
        "https://a.com/blog/post-1",
        "not a url",
        "https://a.com/blog/post-2",
        "https://a.com/",
    ]);

    assert_eq!(tree.leaf_count(), 3);
    assert_eq!(builder.stats().accepted, 3);
    assert_eq!(builder.stats().dropped, 1);
}

#[test]
fn given_empty_input_when_building_then_only_root() {
    let tree = build(&[]);
    assert_eq!(tree.len(), 1);
    assert_eq!(tree.leaf_count(), 0);
    assert!(tree.root_node().children.is_empty());
}

#[test]
fn given_page_that_is_also_prefix_when_building_then_node_keeps_url_and_children() {
    let tree = build(&["https://a.com/blog", "https://a.com/blog/post-1"]);

    let blog = tree.get("host:a.com:/blog").unwrap();
    assert_eq!(blog.url.as_deref(), Some("https://a.com/blog"));
    assert_eq!(blog.children.len(), 1);
    assert_eq!(blog.leaf_count, 2);
}

#[test]
fn given_mixed_case_hosts_when_building_then_single_bucket_with_first_spelling() {
    let tree = build(&["https://Example.COM/a", "https://example.com/b"]);

    assert_eq!(tree.root_node().children.len(), 1);
    let host = tree.get("host:example.com").unwrap();
    assert_eq!(host.label, "Example.COM");
    assert_eq!(host.leaf_count, 2);
}

// ============================================================
// Properties
// ============================================================

fn sample() -> Vec<String> {
    vec![
        "https://b.org/docs/intro".into(),
        "https://a.com/Zeta".into(),
        "https://a.com/alpha/beta/gamma".into(),
        "https://a.com/alpha".into(),
        "mailto:someone@a.com".into(),
        "https://b.org/docs/intro?ref=x".into(),
        "https://c.net/x/y/z".into(),
        "https://a.com/beta".into(),
    ]
}

#[test]
fn given_same_input_when_building_twice_then_trees_identical() {
    let first = TreeBuilder::new().build(&sample());
    let second = TreeBuilder::new().build(&sample());

    let walk = |t: &UrlTree| -> Vec<String> { t.iter().map(|(_, n)| n.id.clone()).collect() };
    assert_eq!(walk(&first), walk(&second));
}

#[test]
fn given_any_tree_when_checking_counts_then_each_node_sums_its_children() {
    let tree = TreeBuilder::new().build(&sample());

    for (idx, node) in tree.iter() {
        let own = usize::from(node.url.is_some());
        let children: usize = tree.children(idx).map(|(_, c)| c.leaf_count).sum();
        assert_eq!(node.leaf_count, own + children, "node {}", node.id);
    }
}

#[test]
fn given_any_tree_when_checking_siblings_then_branches_first_then_label_order() {
    let tree = TreeBuilder::new().build(&sample());

    for (idx, _) in tree.iter() {
        let kids: Vec<_> = tree.children(idx).map(|(_, c)| c).collect();
        for pair in kids.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            match (a.url.is_some(), b.url.is_some()) {
                (true, false) => panic!("{} (leaf) before {} (branch)", a.id, b.id),
                (false, true) => {}
                _ => assert!(
                    a.label.to_lowercase() <= b.label.to_lowercase(),
                    "{} before {}",
                    a.label,
                    b.label
                ),
            }
        }
    }
}

#[test]
fn given_inserted_urls_when_expanding_chain_then_last_id_holds_url() {
    let urls = sample();
    let tree = TreeBuilder::new().build(&urls);

    for url in urls.iter().filter(|u| u.starts_with("https://")) {
        let chain = expand_chain(url);
        assert_eq!(chain[0], "root");
        let last = tree.get(chain.last().unwrap()).expect("chain ends at a node");
        assert!(last.url.is_some(), "{url} -> {}", last.id);
        // every prefix of the chain exists as an ancestor
        for id in &chain {
            assert!(tree.get(id).is_some(), "{id} missing");
        }
    }
}

#[rstest]
#[case("https://a.com/", "host:a.com:/")]
#[case("https://a.com/x/y", "host:a.com:/x/y")]
#[case("https://A.com/x?q=1#frag", "host:a.com:/x")]
fn given_url_when_building_then_node_found_by_id(#[case] url: &str, #[case] id: &str) {
    let tree = build(&[url]);
    assert_eq!(tree.get(id).unwrap().url.as_deref(), Some(url));
}
