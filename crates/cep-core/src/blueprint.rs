use crate::error::{CepError, CepResult};

/// A tree shape over leaf indices `0..n`, produced by an optimizer and
/// consumed by [`crate::tree::Tree::build`].
///
/// `Order` is sugar for the common left-deep case: `Order([2, 0, 1])` is
/// the same shape as nesting `Pair`s left-to-right in that sequence, and
/// is what the order-only optimizers (trivial, ascending-frequency,
/// greedy, left-deep DP, iterative improvement) emit. The bushy optimizers
/// (DP-bushy, ZStream) emit `Pair` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum Blueprint {
    Leaf(usize),
    Pair(Box<Blueprint>, Box<Blueprint>),
    Order(Vec<usize>),
}

impl Blueprint {
    /// Every leaf index `0..n` appears exactly once.
    pub fn validate(&self, n: usize) -> CepResult<()> {
        let mut indices = Vec::new();
        self.collect_leaves(&mut indices);
        indices.sort_unstable();
        let expected: Vec<usize> = (0..n).collect();
        if indices != expected {
            return Err(CepError::MalformedBlueprint(format!(
                "expected leaves {expected:?}, found {indices:?}"
            )));
        }
        Ok(())
    }

    fn collect_leaves(&self, out: &mut Vec<usize>) {
        match self {
            Blueprint::Leaf(i) => out.push(*i),
            Blueprint::Pair(l, r) => {
                l.collect_leaves(out);
                r.collect_leaves(out);
            }
            Blueprint::Order(order) => out.extend(order.iter().copied()),
        }
    }

    /// Normalize `Order` into nested left-deep `Pair`s so the tree builder
    /// only has to handle two shapes.
    pub fn into_pairs(self) -> Blueprint {
        match self {
            Blueprint::Order(order) => {
                let mut iter = order.into_iter();
                let first = iter
                    .next()
                    .expect("order blueprint must contain at least one leaf");
                iter.fold(Blueprint::Leaf(first), |acc, idx| {
                    Blueprint::Pair(Box::new(acc), Box::new(Blueprint::Leaf(idx)))
                })
            }
            other @ (Blueprint::Leaf(_) | Blueprint::Pair(_, _)) => other,
        }
    }
}
