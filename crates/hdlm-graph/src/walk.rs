//! Three-state depth-first walk

use std::collections::HashMap;

use crate::{Cycle, WalkError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

struct Walker<'a, F> {
    expand: &'a mut F,
    marks: HashMap<String, Mark>,
    stack: Vec<String>,
    order: Vec<String>,
    /// `None` in strict mode: the first cycle aborts the walk.
    cycles: Option<Vec<Cycle>>,
}

impl<F, E> Walker<'_, F>
where
    F: FnMut(&str) -> Result<Vec<String>, E>,
{
    fn visit(&mut self, name: &str) -> Result<(), WalkError<E>> {
        match self.marks.get(name) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
                let mut path: Vec<String> = self.stack[start..].to_vec();
                path.push(name.to_string());
                let cycle = Cycle { path };
                return match self.cycles.as_mut() {
                    Some(found) => {
                        found.push(cycle);
                        Ok(())
                    }
                    None => Err(WalkError::Cycle(cycle)),
                };
            }
            None => {}
        }

        self.marks.insert(name.to_string(), Mark::InProgress);
        self.stack.push(name.to_string());

        let deps = (self.expand)(name).map_err(WalkError::Expand)?;
        for dep in &deps {
            self.visit(dep)?;
        }

        self.stack.pop();
        self.marks.insert(name.to_string(), Mark::Done);
        self.order.push(name.to_string());
        Ok(())
    }
}

/// Walk the graph reachable from `roots`, returning every node
/// dependency-first.
///
/// `expand` yields the direct dependencies of a node and is called at most
/// once per node. Revisiting a node still in progress is a cycle and aborts
/// the walk.
pub fn walk<I, S, F, E>(roots: I, mut expand: F) -> Result<Vec<String>, WalkError<E>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Vec<String>, E>,
{
    let mut walker = Walker {
        expand: &mut expand,
        marks: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
        cycles: None,
    };
    for root in roots {
        walker.visit(root.as_ref())?;
    }
    Ok(walker.order)
}

/// Like [`walk`], but cycles are collected instead of aborting.
///
/// Nodes on a cycle still appear in the order (after the node that closed
/// the cycle was visited); callers decide what to do with them.
pub fn walk_lenient<I, S, F, E>(roots: I, mut expand: F) -> Result<(Vec<String>, Vec<Cycle>), E>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> Result<Vec<String>, E>,
{
    let mut walker = Walker {
        expand: &mut expand,
        marks: HashMap::new(),
        stack: Vec::new(),
        order: Vec::new(),
        cycles: Some(Vec::new()),
    };
    for root in roots {
        match walker.visit(root.as_ref()) {
            Ok(()) => {}
            Err(WalkError::Expand(e)) => return Err(e),
            Err(WalkError::Cycle(_)) => {}
        }
    }
    Ok((walker.order, walker.cycles.unwrap_or_default()))
}
