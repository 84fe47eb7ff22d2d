use std::cmp::Ordering;

struct Node<'a, V> {
    name: &'a str,
    data: &'a V,
    left: Option<usize>,
    right: Option<usize>,
}

/// Binary search tree over borrowed table entries, keyed by name.
///
/// Built once and never modified; iterate it as often as needed.
pub struct OrderedView<'a, V> {
    nodes: Vec<Node<'a, V>>,
    root: Option<usize>,
}

impl<'a, V> OrderedView<'a, V> {
    /// Builds the tree in the order entries arrive. On a repeated name the
    /// first entry is kept.
    pub fn build<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a V)>,
    {
        let mut view = OrderedView {
            nodes: Vec::new(),
            root: None,
        };
        for (name, data) in entries {
            view.insert(name, data);
        }
        view
    }

    fn insert(&mut self, name: &'a str, data: &'a V) {
        let idx = self.nodes.len();
        let Some(mut cur) = self.root else {
            self.root = Some(idx);
            self.nodes.push(Node {
                name,
                data,
                left: None,
                right: None,
            });
            return;
        };

        loop {
            let slot = match name.cmp(self.nodes[cur].name) {
                Ordering::Less => &mut self.nodes[cur].left,
                Ordering::Greater => &mut self.nodes[cur].right,
                Ordering::Equal => return,
            };
            match *slot {
                Some(next) => cur = next,
                None => {
                    *slot = Some(idx);
                    break;
                }
            }
        }
        self.nodes.push(Node {
            name,
            data,
            left: None,
            right: None,
        });
    }

    /// In-order traversal, ascending by name.
    pub fn iter(&self) -> InOrder<'_, 'a, V> {
        let mut iter = InOrder {
            view: self,
            stack: Vec::new(),
        };
        iter.descend(self.root);
        iter
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

pub struct InOrder<'v, 'a, V> {
    view: &'v OrderedView<'a, V>,
    stack: Vec<usize>,
}

impl<V> InOrder<'_, '_, V> {
    fn descend(&mut self, mut next: Option<usize>) {
        while let Some(idx) = next {
            self.stack.push(idx);
            next = self.view.nodes[idx].left;
        }
    }
}

impl<'a, V> Iterator for InOrder<'_, 'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let idx = self.stack.pop()?;
        let node = &self.view.nodes[idx];
        self.descend(node.right);
        Some((node.name, node.data))
    }
}

impl<'v, 'a, V> IntoIterator for &'v OrderedView<'a, V> {
    type Item = (&'a str, &'a V);
    type IntoIter = InOrder<'v, 'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
