//! Assemble flat comment rows into nested threads without recursion.

use std::collections::{HashMap, HashSet, VecDeque};
use std::slice;

use uuid::Uuid;

use crate::database::models::{Comment, CommentNode};

/// Build one tree per top-level comment (`parent_id` is `None`).
///
/// Siblings keep (created_at, id) order. Rows whose parent is not part of
/// the input are unreachable from any root and are left out.
pub fn build_forest(mut comments: Vec<Comment>) -> Vec<CommentNode> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

    let mut roots = Vec::new();
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut rows: HashMap<Uuid, Comment> = HashMap::with_capacity(comments.len());

    for comment in comments {
        match comment.parent_id {
            None => roots.push(comment.id),
            Some(parent) => children.entry(parent).or_default().push(comment.id),
        }
        rows.insert(comment.id, comment);
    }

    // Breadth-first visit order; every parent precedes its replies.
    let mut order = Vec::with_capacity(rows.len());
    let mut seen = HashSet::with_capacity(rows.len());
    let mut queue: VecDeque<Uuid> = roots.iter().copied().collect();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(kids) = children.get(&id) {
            queue.extend(kids.iter().copied());
        }
    }

    // Walk the visit order backwards so replies are complete before their parent is.
    let mut built: HashMap<Uuid, CommentNode> = HashMap::with_capacity(order.len());
    for id in order.into_iter().rev() {
        let Some(row) = rows.remove(&id) else {
            continue;
        };
        let mut node = CommentNode::from(row);
        if let Some(kids) = children.remove(&id) {
            node.replies = kids.into_iter().filter_map(|kid| built.remove(&kid)).collect();
        }
        built.insert(id, node);
    }

    roots.into_iter().filter_map(|id| built.remove(&id)).collect()
}

/// Render a forest as a JSON array of nested nodes.
///
/// Output shape per node: `{id, movie_id, user_id, content, parent_id,
/// created_at, replies: [...]}`. Nesting is tracked on an explicit stack, so
/// reply depth does not consume call stack.
pub fn forest_to_json(forest: &[CommentNode]) -> Result<Vec<u8>, serde_json::Error> {
    let mut out = Vec::with_capacity(256 * forest.len().max(1));
    out.push(b'[');

    // One open array per level: remaining siblings and whether one was written yet.
    let mut stack: Vec<(slice::Iter<'_, CommentNode>, bool)> = vec![(forest.iter(), false)];
    loop {
        let Some((siblings, written)) = stack.last_mut() else {
            break;
        };
        match siblings.next() {
            Some(node) => {
                if *written {
                    out.push(b',');
                }
                *written = true;
                write_node_head(&mut out, node)?;
                stack.push((node.replies.iter(), false));
            }
            None => {
                stack.pop();
                out.push(b']');
                if !stack.is_empty() {
                    out.push(b'}');
                }
            }
        }
    }

    Ok(out)
}

/// Scalar fields of a node, leaving its `replies` array open.
fn write_node_head(out: &mut Vec<u8>, node: &CommentNode) -> Result<(), serde_json::Error> {
    out.extend_from_slice(b"{\"id\":");
    serde_json::to_writer(&mut *out, &node.id)?;
    out.extend_from_slice(b",\"movie_id\":");
    serde_json::to_writer(&mut *out, &node.movie_id)?;
    out.extend_from_slice(b",\"user_id\":");
    serde_json::to_writer(&mut *out, &node.user_id)?;
    out.extend_from_slice(b",\"content\":");
    serde_json::to_writer(&mut *out, &node.content)?;
    out.extend_from_slice(b",\"parent_id\":");
    serde_json::to_writer(&mut *out, &node.parent_id)?;
    out.extend_from_slice(b",\"created_at\":");
    serde_json::to_writer(&mut *out, &node.created_at)?;
    out.extend_from_slice(b",\"replies\":[");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn comment(seq: i64, parent_id: Option<Uuid>, content: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            movie_id: 2,
            user_id: Uuid::nil(),
            content: content.to_string(),
            parent_id,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(seq),
        }
    }

    #[test]
    fn nests_a_three_level_chain() {
        let c1 = comment(0, None, "C1");
        let c2 = comment(1, Some(c1.id), "C2");
        let c3 = comment(2, Some(c2.id), "C3");
        let (id1, id2, id3) = (c1.id, c2.id, c3.id);

        // Input order must not matter.
        let forest = build_forest(vec![c3, c1, c2]);

        assert_eq!(forest.len(), 1);
        let root = &forest[0];
        assert_eq!(root.id, id1);
        assert_eq!(root.replies.len(), 1);
        let reply = &root.replies[0];
        assert_eq!(reply.id, id2);
        assert_eq!(reply.parent_id, Some(id1));
        assert_eq!(reply.replies.len(), 1);
        assert_eq!(reply.replies[0].id, id3);
        assert!(reply.replies[0].replies.is_empty());
    }

    #[test]
    fn keeps_roots_and_siblings_in_creation_order() {
        let first = comment(0, None, "first");
        let second = comment(5, None, "second");
        let late_reply = comment(9, Some(first.id), "late");
        let early_reply = comment(3, Some(first.id), "early");

        let forest = build_forest(vec![late_reply, second, early_reply, first]);

        let contents: Vec<&str> = forest.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, ["first", "second"]);
        let replies: Vec<&str> = forest[0].replies.iter().map(|n| n.content.as_str()).collect();
        assert_eq!(replies, ["early", "late"]);
        assert!(forest[1].replies.is_empty());
    }

    #[test]
    fn drops_rows_detached_from_every_root() {
        let root = comment(0, None, "root");
        let orphan = comment(1, Some(Uuid::new_v4()), "orphan");

        let forest = build_forest(vec![root, orphan]);

        assert_eq!(forest.len(), 1);
        assert!(forest[0].replies.is_empty());
    }

    #[test]
    fn empty_input_gives_empty_forest() {
        assert!(build_forest(Vec::new()).is_empty());
    }

    fn chain(depth: usize) -> Vec<Comment> {
        let mut rows = Vec::with_capacity(depth);
        let mut parent = None;
        for seq in 0..depth {
            let row = comment(seq as i64, parent, "reply");
            parent = Some(row.id);
            rows.push(row);
        }
        rows
    }

    #[test]
    fn json_matches_node_shape() {
        let c1 = comment(0, None, "C1 \"quoted\"");
        let c2 = comment(1, Some(c1.id), "C2");
        let c3 = comment(2, None, "C3");
        let (id1, id2, id3) = (c1.id, c2.id, c3.id);

        let forest = build_forest(vec![c1, c2, c3]);
        let json: serde_json::Value = serde_json::from_slice(&forest_to_json(&forest).unwrap()).unwrap();

        let roots = json.as_array().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["id"], id1.to_string());
        assert_eq!(roots[0]["movie_id"], 2);
        assert_eq!(roots[0]["user_id"], Uuid::nil().to_string());
        assert_eq!(roots[0]["content"], "C1 \"quoted\"");
        assert!(roots[0]["parent_id"].is_null());
        assert!(roots[0]["created_at"].is_string());

        let replies = roots[0]["replies"].as_array().unwrap();
        assert_eq!(replies.len(), 1);
        assert_eq!(replies[0]["id"], id2.to_string());
        assert_eq!(replies[0]["parent_id"], id1.to_string());
        assert_eq!(replies[0]["replies"], serde_json::json!([]));

        assert_eq!(roots[1]["id"], id3.to_string());
        assert_eq!(roots[1]["replies"], serde_json::json!([]));
    }

    #[test]
    fn empty_forest_is_an_empty_array() {
        assert_eq!(forest_to_json(&[]).unwrap(), b"[]");
    }

    #[test]
    fn deep_chain_renders_on_a_small_stack() {
        const DEPTH: usize = 100_000;

        // Same stack size as a tokio worker thread.
        let handle = std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(|| {
                let forest = build_forest(chain(DEPTH));
                let json = forest_to_json(&forest).unwrap();
                drop(forest);
                json
            })
            .unwrap();
        let json = handle.join().unwrap();

        let text = std::str::from_utf8(&json).unwrap();
        assert!(text.starts_with("[{\"id\":"));
        assert!(text.ends_with("\"replies\":[]}]}]"));
        assert_eq!(text.matches("\"replies\":[").count(), DEPTH);
        assert_eq!(text.matches('{').count(), DEPTH);
        assert_eq!(text.matches('}').count(), DEPTH);
    }

    #[test]
    fn handles_a_very_deep_reply_chain() {
        const DEPTH: usize = 10_000;

        let mut rows = chain(DEPTH);
        rows.reverse();

        let forest = build_forest(rows);
        assert_eq!(forest.len(), 1);

        let mut depth = 1;
        let mut node = &forest[0];
        while let Some(next) = node.replies.first() {
            assert_eq!(node.replies.len(), 1);
            node = next;
            depth += 1;
        }
        assert_eq!(depth, DEPTH);
    }
}
