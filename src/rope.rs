//! Generic balanced rope with aggregate line/width metrics, fingers and
//! bounded undo history.
//!
//! Nodes are reference-counted (`Rc`) rather than uniquely owned: every
//! mutation builds a new root while sharing untouched subtrees with the
//! previous version, which is what makes [`Rope::store_undo`] an O(1)
//! snapshot instead of an O(n) deep copy.

use crate::error::Error;
use std::rc::Rc;

/// Per-segment (and aggregated) line/width statistics.
///
/// Combination is associative but **not** commutative: `combine(a, b)`
/// describes `a` followed by `b`, and swapping the arguments describes a
/// different document.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Metrics {
    pub total_width: u64,
    pub break_count: u32,
    pub first_line_width: u32,
    pub last_line_width: u32,
    pub max_line_width: u32,
    pub ascii_only: bool,
    pub(crate) item_count: usize,
    pub(crate) marker_count: u32,
}

impl Metrics {
    /// The identity element: combining with it is a no-op on either side.
    #[must_use]
    pub const fn identity() -> Self {
        Self {
            total_width: 0,
            break_count: 0,
            first_line_width: 0,
            last_line_width: 0,
            max_line_width: 0,
            ascii_only: true,
            item_count: 0,
            marker_count: 0,
        }
    }

    /// Associative, non-commutative fold of `a` followed by `b`.
    #[must_use]
    pub fn combine(a: &Self, b: &Self) -> Self {
        let joined_line = a.last_line_width + b.first_line_width;
        let mut max_line_width = joined_line;
        if a.break_count > 0 {
            max_line_width = max_line_width.max(a.max_line_width);
        }
        if b.break_count > 0 {
            max_line_width = max_line_width.max(b.max_line_width);
        }
        Self {
            total_width: a.total_width + b.total_width,
            break_count: a.break_count + b.break_count,
            first_line_width: if a.break_count == 0 {
                a.first_line_width + b.first_line_width
            } else {
                a.first_line_width
            },
            last_line_width: if b.break_count == 0 {
                a.last_line_width + b.last_line_width
            } else {
                b.last_line_width
            },
            max_line_width,
            ascii_only: a.ascii_only && b.ascii_only,
            item_count: a.item_count + b.item_count,
            marker_count: a.marker_count + b.marker_count,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::identity()
    }
}

/// Trait implemented by rope payloads (text chunks, hard breaks, markers, ...).
pub trait RopeItem {
    /// This item's own contribution to the aggregate metrics.
    fn metrics(&self) -> Metrics;

    /// Sentinel items (e.g. zero-length chunks, markers) are skipped by
    /// `count`, `walk`, and index-based resolution — they exist only to be
    /// located by [`Rope::get_marker`].
    fn is_empty(&self) -> bool {
        false
    }

    /// Marker kind tag, if this item is a marker. `None` for ordinary content.
    fn marker_kind(&self) -> Option<u32> {
        None
    }
}

enum Node<T> {
    Leaf(T, Metrics),
    Inner {
        left: Rc<Node<T>>,
        right: Rc<Node<T>>,
        metrics: Metrics,
        depth: u32,
    },
}

impl<T: RopeItem> Node<T> {
    fn depth(&self) -> u32 {
        match self {
            Self::Leaf(..) => 0,
            Self::Inner { depth, .. } => *depth,
        }
    }

    fn metrics(&self) -> &Metrics {
        match self {
            Self::Leaf(_, m) => m,
            Self::Inner { metrics, .. } => metrics,
        }
    }
}

fn new_leaf<T: RopeItem>(item: T) -> Rc<Node<T>> {
    let mut metrics = item.metrics();
    metrics.item_count = usize::from(!item.is_empty());
    Rc::new(Node::Leaf(item, metrics))
}

fn make_inner_raw<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    let metrics = Metrics::combine(left.metrics(), right.metrics());
    let depth = 1 + left.depth().max(right.depth());
    Rc::new(Node::Inner {
        left,
        right,
        metrics,
        depth,
    })
}

/// Build a balanced parent, rotating once if the children's depths differ by
/// more than one (AVL-style local fixup, applied bottom-up by every caller).
fn make_inner<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    let dl = left.depth();
    let dr = right.depth();
    if dl > dr + 1 {
        if let Node::Inner {
            left: ll,
            right: lr,
            ..
        } = &*left
        {
            if ll.depth() >= lr.depth() {
                let new_right = make_inner_raw(Rc::clone(lr), right);
                return make_inner_raw(Rc::clone(ll), new_right);
            }
            if let Node::Inner {
                left: lrl,
                right: lrr,
                ..
            } = &**lr
            {
                let new_left = make_inner_raw(Rc::clone(ll), Rc::clone(lrl));
                let new_right = make_inner_raw(Rc::clone(lrr), right);
                return make_inner_raw(new_left, new_right);
            }
        }
    } else if dr > dl + 1 {
        if let Node::Inner {
            left: rl,
            right: rr,
            ..
        } = &*right
        {
            if rr.depth() >= rl.depth() {
                let new_left = make_inner_raw(left, Rc::clone(rl));
                return make_inner_raw(new_left, Rc::clone(rr));
            }
            if let Node::Inner {
                left: rll,
                right: rlr,
                ..
            } = &**rl
            {
                let new_left = make_inner_raw(left, Rc::clone(rll));
                let new_right = make_inner_raw(Rc::clone(rlr), Rc::clone(rr));
                return make_inner_raw(new_left, new_right);
            }
        }
    }
    make_inner_raw(left, right)
}

fn concat_nodes<T: RopeItem>(a: Option<Rc<Node<T>>>, b: Option<Rc<Node<T>>>) -> Option<Rc<Node<T>>> {
    match (a, b) {
        (None, b) => b,
        (a, None) => a,
        (Some(a), Some(b)) => Some(concat_balanced(a, b)),
    }
}

/// Concatenate by descending into whichever side is more than one level
/// deeper, so the seam is always joined near a leaf, then rebalancing on
/// the way back up.
fn concat_balanced<T: RopeItem>(a: Rc<Node<T>>, b: Rc<Node<T>>) -> Rc<Node<T>> {
    let da = a.depth();
    let db = b.depth();
    if da > db + 1 {
        if let Node::Inner { left, right, .. } = &*a {
            let new_right = concat_balanced(Rc::clone(right), b);
            return make_inner(Rc::clone(left), new_right);
        }
    } else if db > da + 1 {
        if let Node::Inner { left, right, .. } = &*b {
            let new_left = concat_balanced(a, Rc::clone(left));
            return make_inner(new_left, Rc::clone(right));
        }
    }
    make_inner(a, b)
}

/// Split at the `i`-th non-empty item (filtered index space): items before
/// index `i` go left, the rest go right.
fn split_node<T: RopeItem>(node: &Rc<Node<T>>, i: usize) -> (Option<Rc<Node<T>>>, Option<Rc<Node<T>>>) {
    match &**node {
        Node::Leaf(..) => {
            if i == 0 {
                (None, Some(Rc::clone(node)))
            } else {
                (Some(Rc::clone(node)), None)
            }
        }
        Node::Inner { left, right, .. } => {
            let lc = left.metrics().item_count;
            if i < lc {
                let (ll, lr) = split_node(left, i);
                (ll, concat_nodes(lr, Some(Rc::clone(right))))
            } else {
                let (rl, rr) = split_node(right, i - lc);
                (concat_nodes(Some(Rc::clone(left)), rl), rr)
            }
        }
    }
}

fn build<T: RopeItem>(items: Vec<T>) -> Option<Rc<Node<T>>> {
    match items.len() {
        0 => None,
        1 => {
            let mut it = items.into_iter();
            Some(new_leaf(it.next().unwrap()))
        }
        n => {
            let mid = n / 2;
            let mut items = items;
            let right_half = items.split_off(mid);
            concat_nodes(build(items), build(right_half))
        }
    }
}

/// A cached index position, revalidated against the rope's revision counter.
///
/// This is a deliberately simplified finger: rather than truly amortizing
/// local edits to O(1) via a retained node-stack path, it caches the index
/// and trusts the caller's locality claim. Any structural mutation bumps the
/// rope's revision, which invalidates every outstanding finger conservatively
/// (not just ones whose path it actually disturbed).
#[derive(Clone, Copy, Debug)]
pub struct Finger {
    index: usize,
    revision: u64,
}

impl Finger {
    /// The cached index, regardless of whether it is still valid.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

/// Balanced binary tree of `T` with aggregate metrics, fingers and undo history.
pub struct Rope<T> {
    root: Option<Rc<Node<T>>>,
    revision: u64,
    history: Vec<(String, Option<Rc<Node<T>>>)>,
    max_undo_depth: Option<usize>,
}

impl<T: RopeItem + Clone> Default for Rope<T> {
    fn default() -> Self {
        Self::init()
    }
}

// Manual impl: cloning a rope only clones `Rc` handles (cheap, structural
// sharing), so it must not require `T: Clone`.
impl<T> Clone for Rope<T> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            revision: self.revision,
            history: self.history.clone(),
            max_undo_depth: self.max_undo_depth,
        }
    }
}

impl<T: RopeItem + Clone> Rope<T> {
    /// Empty rope.
    #[must_use]
    pub fn init() -> Self {
        Self {
            root: None,
            revision: 0,
            history: Vec::new(),
            max_undo_depth: None,
        }
    }

    /// Build a balanced rope from items in one pass.
    #[must_use]
    pub fn from_slice(items: Vec<T>) -> Self {
        Self {
            root: build(items),
            revision: 0,
            history: Vec::new(),
            max_undo_depth: None,
        }
    }

    /// Cap the number of retained undo snapshots; oldest states are dropped first.
    pub fn set_max_undo_depth(&mut self, max: Option<usize>) {
        self.max_undo_depth = max;
        if let Some(max) = max {
            while self.history.len() > max {
                self.history.remove(0);
            }
        }
    }

    /// Number of non-empty items.
    #[must_use]
    pub fn count(&self) -> usize {
        self.root.as_ref().map_or(0, |r| r.metrics().item_count)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Aggregate metrics over the whole rope.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        self.root
            .as_ref()
            .map_or_else(Metrics::identity, |r| *r.metrics())
    }

    /// Depth of the root; used by balance property tests.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.root.as_ref().map_or(0, |r| r.depth())
    }

    /// In-order visit of every non-empty item.
    pub fn walk(&self, mut visitor: impl FnMut(&T)) {
        fn recurse<T: RopeItem>(node: &Node<T>, visitor: &mut impl FnMut(&T)) {
            match node {
                Node::Leaf(item, _) => {
                    if !item.is_empty() {
                        visitor(item);
                    }
                }
                Node::Inner { left, right, .. } => {
                    recurse(left, visitor);
                    recurse(right, visitor);
                }
            }
        }
        if let Some(r) = &self.root {
            recurse(r, &mut visitor);
        }
    }

    /// The `i`-th non-empty item.
    #[must_use]
    pub fn get(&self, i: usize) -> Option<&T> {
        fn recurse<T: RopeItem>(node: &Node<T>, i: usize) -> Option<&T> {
            match node {
                Node::Leaf(item, _) => {
                    if i == 0 && !item.is_empty() {
                        Some(item)
                    } else {
                        None
                    }
                }
                Node::Inner { left, right, .. } => {
                    let lc = left.metrics().item_count;
                    if i < lc {
                        recurse(left, i)
                    } else {
                        recurse(right, i - lc)
                    }
                }
            }
        }
        self.root.as_deref().and_then(|r| recurse(r, i))
    }

    /// Split into `(items before i, items from i on)`, both in filtered index space.
    #[must_use]
    pub fn split(&self, i: usize) -> (Self, Self) {
        let (l, r) = match &self.root {
            Some(root) => split_node(root, i.min(self.count())),
            None => (None, None),
        };
        (
            Self {
                root: l,
                revision: 0,
                history: Vec::new(),
                max_undo_depth: None,
            },
            Self {
                root: r,
                revision: 0,
                history: Vec::new(),
                max_undo_depth: None,
            },
        )
    }

    /// Append `other`'s items after this rope's, consuming both.
    #[must_use]
    pub fn concat(self, other: Self) -> Self {
        Self {
            root: concat_nodes(self.root, other.root),
            revision: 0,
            history: Vec::new(),
            max_undo_depth: None,
        }
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Insert `item` before the `i`-th non-empty item (`i == count()` appends).
    pub fn insert(&mut self, i: usize, item: T) -> Result<(), Error> {
        let len = self.count();
        if i > len {
            return Err(Error::InvalidIndex { index: i, len });
        }
        let (l, r) = match &self.root {
            Some(root) => split_node(root, i),
            None => (None, None),
        };
        let mid = concat_nodes(l, Some(new_leaf(item)));
        self.root = concat_nodes(mid, r);
        self.bump_revision();
        Ok(())
    }

    /// Insert a contiguous run of items before the `i`-th non-empty item.
    pub fn insert_slice(&mut self, i: usize, items: Vec<T>) -> Result<(), Error> {
        let len = self.count();
        if i > len {
            return Err(Error::InvalidIndex { index: i, len });
        }
        let (l, r) = match &self.root {
            Some(root) => split_node(root, i),
            None => (None, None),
        };
        let mid = concat_nodes(l, build(items));
        self.root = concat_nodes(mid, r);
        self.bump_revision();
        Ok(())
    }

    /// Append a single item at the end.
    pub fn append(&mut self, item: T) {
        let _ = self.insert(self.count(), item);
    }

    /// Replace the `i`-th non-empty item.
    pub fn replace(&mut self, i: usize, item: T) -> Result<(), Error> {
        let len = self.count();
        if i >= len {
            return Err(Error::InvalidIndex { index: i, len });
        }
        self.delete(i)?;
        self.insert(i, item)
    }

    /// Remove and return the `i`-th non-empty item.
    pub fn delete(&mut self, i: usize) -> Result<T, Error> {
        let len = self.count();
        if i >= len {
            return Err(Error::InvalidIndex { index: i, len });
        }
        let item = self.get(i).cloned().expect("index checked above");
        let root = self.root.as_ref().expect("count > 0 implies a root");
        let (l, r) = split_node(root, i);
        let r2 = match &r {
            Some(rr) => split_node(rr, 1).1,
            None => None,
        };
        self.root = concat_nodes(l, r2);
        self.bump_revision();
        Ok(item)
    }

    /// Remove `[start, end)` (filtered index space) and return it as its own rope.
    pub fn delete_range(&mut self, start: usize, end: usize) -> Result<Self, Error> {
        let len = self.count();
        if start > end || end > len {
            return Err(Error::InvalidIndex { index: end, len });
        }
        let (l, r) = match &self.root {
            Some(root) => split_node(root, start),
            None => (None, None),
        };
        let (mid, r2) = match &r {
            Some(rr) => split_node(rr, end - start),
            None => (None, None),
        };
        self.root = concat_nodes(l, r2);
        self.bump_revision();
        Ok(Self {
            root: mid,
            revision: 0,
            history: Vec::new(),
            max_undo_depth: None,
        })
    }

    /// Cumulative `total_width` up to the `n`-th marker of `kind`, if it exists.
    ///
    /// Subtrees with no markers at all are skipped in O(1) via the cached
    /// `marker_count`; within a subtree that does contain markers, kinds are
    /// checked leaf-by-leaf, so this is O(log n + markers-of-any-kind-visited)
    /// rather than a strict O(log n) per kind.
    #[must_use]
    pub fn get_marker(&self, kind: u32, n: usize) -> Option<u64> {
        fn recurse<T: RopeItem>(
            node: &Node<T>,
            kind: u32,
            remaining: &mut usize,
            acc_width: &mut u64,
        ) -> Option<u64> {
            if node.metrics().marker_count == 0 {
                *acc_width += node.metrics().total_width;
                return None;
            }
            match node {
                Node::Leaf(item, m) => {
                    if item.marker_kind() == Some(kind) {
                        if *remaining == 0 {
                            return Some(*acc_width);
                        }
                        *remaining -= 1;
                    }
                    *acc_width += m.total_width;
                    None
                }
                Node::Inner { left, right, .. } => {
                    if let Some(found) = recurse(left, kind, remaining, acc_width) {
                        return Some(found);
                    }
                    recurse(right, kind, remaining, acc_width)
                }
            }
        }
        let mut remaining = n;
        let mut acc = 0u64;
        self.root
            .as_deref()
            .and_then(|r| recurse(r, kind, &mut remaining, &mut acc))
    }

    /// A cached path to index `i`, stamped with the current revision.
    #[must_use]
    pub fn make_finger(&self, i: usize) -> Finger {
        Finger {
            index: i,
            revision: self.revision,
        }
    }

    /// Reposition a finger without checking it against the current tree.
    pub fn seek(&self, finger: &mut Finger, i: usize) {
        finger.index = i;
        finger.revision = self.revision;
    }

    /// `get(finger.index())`, but `None` if the rope mutated since the finger
    /// was minted (the finger is stale and must be re-seeked).
    #[must_use]
    pub fn get_at_finger(&self, finger: &Finger) -> Option<&T> {
        if finger.revision != self.revision {
            return None;
        }
        self.get(finger.index)
    }

    pub fn insert_at_finger(&mut self, finger: &mut Finger, item: T) -> Result<(), Error> {
        self.insert(finger.index, item)?;
        finger.revision = self.revision;
        Ok(())
    }

    pub fn delete_at_finger(&mut self, finger: &mut Finger) -> Result<T, Error> {
        let item = self.delete(finger.index)?;
        finger.revision = self.revision;
        Ok(item)
    }

    pub fn replace_at_finger(&mut self, finger: &mut Finger, item: T) -> Result<(), Error> {
        self.replace(finger.index, item)?;
        finger.revision = self.revision;
        Ok(())
    }

    /// Snapshot the current tree under `label`. O(1): only the `Rc` root is cloned.
    pub fn store_undo(&mut self, label: impl Into<String>) {
        self.history.push((label.into(), self.root.clone()));
        if let Some(max) = self.max_undo_depth {
            while self.history.len() > max {
                self.history.remove(0);
            }
        }
    }

    /// Restore the most recent snapshot, pushing the current state back onto
    /// the history stack under `current_label` so a following `undo` call
    /// acts as a redo.
    pub fn undo(&mut self, current_label: impl Into<String>) -> Option<String> {
        let (label, snapshot) = self.history.pop()?;
        let current = std::mem::replace(&mut self.root, snapshot);
        self.history.push((current_label.into(), current));
        self.bump_revision();
        Some(label)
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Unit {
        width: u32,
        is_break: bool,
        marker: Option<u32>,
        empty: bool,
    }

    impl Unit {
        fn text(width: u32) -> Self {
            Self {
                width,
                is_break: false,
                marker: None,
                empty: false,
            }
        }

        fn hard_break() -> Self {
            Self {
                width: 0,
                is_break: true,
                marker: None,
                empty: false,
            }
        }

        fn marker(kind: u32) -> Self {
            Self {
                width: 0,
                is_break: false,
                marker: Some(kind),
                empty: true,
            }
        }
    }

    impl RopeItem for Unit {
        fn metrics(&self) -> Metrics {
            if self.is_break {
                Metrics {
                    total_width: 0,
                    break_count: 1,
                    first_line_width: 0,
                    last_line_width: 0,
                    max_line_width: 0,
                    ascii_only: true,
                    item_count: 0,
                    marker_count: 0,
                }
            } else {
                Metrics {
                    total_width: u64::from(self.width),
                    break_count: 0,
                    first_line_width: self.width,
                    last_line_width: self.width,
                    max_line_width: self.width,
                    ascii_only: true,
                    item_count: 0,
                    marker_count: u32::from(self.marker.is_some()),
                }
            }
        }

        fn is_empty(&self) -> bool {
            self.empty
        }

        fn marker_kind(&self) -> Option<u32> {
            self.marker
        }
    }

    fn words(words: &[u32]) -> Rope<Unit> {
        Rope::from_slice(words.iter().map(|&w| Unit::text(w)).collect())
    }

    #[test]
    fn count_and_get_roundtrip() {
        let rope = words(&[3, 5, 7]);
        assert_eq!(rope.count(), 3);
        assert_eq!(rope.get(1).unwrap().width, 5);
        assert!(rope.get(3).is_none());
    }

    #[test]
    fn walk_visits_in_order_skipping_empties() {
        let mut rope = Rope::init();
        rope.insert(0, Unit::text(1)).unwrap();
        rope.insert(1, Unit::marker(7)).unwrap();
        rope.insert(2, Unit::text(2)).unwrap();
        let mut widths = Vec::new();
        rope.walk(|u| widths.push(u.width));
        assert_eq!(widths, vec![1, 2]);
        assert_eq!(rope.count(), 2);
    }

    #[test]
    fn split_then_concat_is_identity() {
        let rope = words(&[1, 2, 3, 4, 5]);
        let (left, right) = rope.split(2);
        let rejoined = left.concat(right);
        let mut widths = Vec::new();
        rejoined.walk(|u| widths.push(u.width));
        assert_eq!(widths, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn concat_is_associative_in_observed_content() {
        let a = words(&[1, 2]);
        let b = words(&[3]);
        let c = words(&[4, 5]);
        let left_first = a.split(0).1.concat(b.split(0).1).concat(c.split(0).1);
        let ab = words(&[1, 2]).concat(words(&[3]));
        let abc = ab.concat(words(&[4, 5]));
        let mut lhs = Vec::new();
        left_first.walk(|u| lhs.push(u.width));
        let mut rhs = Vec::new();
        abc.walk(|u| rhs.push(u.width));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn insert_delete_replace() {
        let mut rope = words(&[1, 2, 3]);
        rope.insert(1, Unit::text(9)).unwrap();
        assert_eq!(rope.get(1).unwrap().width, 9);
        let removed = rope.delete(1).unwrap();
        assert_eq!(removed.width, 9);
        rope.replace(0, Unit::text(100)).unwrap();
        assert_eq!(rope.get(0).unwrap().width, 100);
        assert!(matches!(
            rope.insert(1000, Unit::text(1)),
            Err(Error::InvalidIndex { .. })
        ));
    }

    #[test]
    fn delete_range_returns_removed_slice() {
        let mut rope = words(&[1, 2, 3, 4, 5]);
        let removed = rope.delete_range(1, 3).unwrap();
        let mut kept = Vec::new();
        rope.walk(|u| kept.push(u.width));
        assert_eq!(kept, vec![1, 4, 5]);
        let mut gone = Vec::new();
        removed.walk(|u| gone.push(u.width));
        assert_eq!(gone, vec![2, 3]);
    }

    #[test]
    fn metrics_track_lines_and_width() {
        let rope = Rope::from_slice(vec![
            Unit::text(3),
            Unit::hard_break(),
            Unit::text(10),
            Unit::text(2),
            Unit::hard_break(),
            Unit::text(1),
        ]);
        let m = rope.metrics();
        assert_eq!(m.break_count, 2);
        assert_eq!(m.first_line_width, 3);
        assert_eq!(m.last_line_width, 1);
        assert_eq!(m.max_line_width, 12);
        assert_eq!(m.total_width, 16);
    }

    #[test]
    fn get_marker_sums_weight_to_location() {
        let rope = Rope::from_slice(vec![
            Unit::text(5),
            Unit::marker(1),
            Unit::text(7),
            Unit::marker(2),
            Unit::text(3),
        ]);
        assert_eq!(rope.get_marker(1, 0), Some(5));
        assert_eq!(rope.get_marker(2, 0), Some(12));
        assert_eq!(rope.get_marker(1, 1), None);
    }

    #[test]
    fn undo_then_undo_again_acts_as_redo() {
        let mut rope = words(&[1, 2, 3]);
        rope.store_undo("before-insert");
        rope.insert(1, Unit::text(99)).unwrap();
        assert_eq!(rope.count(), 4);

        rope.undo("after-insert");
        assert_eq!(rope.count(), 3);

        rope.undo("back-to-three");
        assert_eq!(rope.count(), 4);
    }

    #[test]
    fn undo_with_empty_history_is_a_no_op() {
        let mut rope = words(&[1]);
        assert!(!rope.can_undo());
        assert_eq!(rope.undo("x"), None);
        assert_eq!(rope.count(), 1);
    }

    #[test]
    fn max_undo_depth_trims_oldest() {
        let mut rope = words(&[1]);
        rope.set_max_undo_depth(Some(2));
        rope.store_undo("a");
        rope.store_undo("b");
        rope.store_undo("c");
        assert_eq!(rope.history.len(), 2);
    }

    #[test]
    fn depth_stays_logarithmic_under_random_edits() {
        let mut rope: Rope<Unit> = Rope::init();
        let mut n: u32 = 0;
        for i in 0..500u32 {
            let pos = (i as usize * 7) % (rope.count() + 1);
            rope.insert(pos, Unit::text(1)).unwrap();
            n += 1;
            if i % 5 == 0 && rope.count() > 1 {
                let pos = (i as usize * 3) % rope.count();
                rope.delete(pos).unwrap();
                n -= 1;
            }
        }
        let bound = 4.5 * (n.max(2) as f64).log2();
        assert!(
            f64::from(rope.depth()) <= bound,
            "depth {} exceeded bound {bound} for n={n}",
            rope.depth()
        );
    }

    #[test]
    fn finger_is_invalidated_by_mutation() {
        let mut rope = words(&[1, 2, 3]);
        let mut finger = rope.make_finger(1);
        assert_eq!(rope.get_at_finger(&finger).unwrap().width, 2);
        rope.insert(0, Unit::text(42)).unwrap();
        assert!(rope.get_at_finger(&finger).is_none());
        rope.seek(&mut finger, 2);
        assert_eq!(rope.get_at_finger(&finger).unwrap().width, 2);
    }
}
