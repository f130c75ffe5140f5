use crate::blueprint::Blueprint;
use crate::pattern::Pattern;

/// Left-deep chain over the leaves in the order they appear in the
/// pattern. The baseline every other optimizer is compared against.
pub fn plan(pattern: &Pattern) -> Blueprint {
    Blueprint::Order((0..pattern.args.len()).collect())
}
