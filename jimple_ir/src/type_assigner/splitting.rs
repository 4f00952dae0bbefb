//! Local splitting along def-use webs.
//!
//! Definitions of a local that reach a common use form one web. Every web after the
//! first (in statement order of its first definition) is renamed to a fresh local
//! `<name>#<n>`, at its definitions and at the uses they reach.

use crate::error::BodyError;
use crate::ir::{Body, LocalId, StmtGraph, StmtId};
use crate::local_generator::LocalGenerator;
use std::collections::{BTreeSet, HashMap};

/// Definitions of one local that share uses, and those uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Web {
    pub defs: Vec<StmtId>,
    pub uses: Vec<StmtId>,
}

/// Locals created by splitting `original`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Split {
    pub original: LocalId,
    pub created: Vec<LocalId>,
}

/// Definitions of `local` reaching the entry of each statement.
///
/// A statement covered by a trap may throw before or after its own definition, so
/// the handler sees both what reached the statement and what it defines.
fn reaching_definitions(body: &Body, graph: &StmtGraph, local: LocalId) -> Vec<BTreeSet<StmtId>> {
    let mut ins: Vec<BTreeSet<StmtId>> = vec![BTreeSet::new(); body.stmts().len()];
    let mut changed = true;
    while changed {
        changed = false;
        for id in body.stmt_ids() {
            let out: BTreeSet<StmtId> = if body.stmt(id).def() == Some(local) {
                BTreeSet::from([id])
            } else {
                ins[id.index()].clone()
            };
            for succ in graph.successors(id) {
                for def in &out {
                    changed |= ins[succ.index()].insert(*def);
                }
            }
            let exceptional: BTreeSet<StmtId> = ins[id.index()].union(&out).copied().collect();
            for handler in graph.exceptional_successors(id) {
                for def in &exceptional {
                    changed |= ins[handler.index()].insert(*def);
                }
            }
        }
    }
    ins
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Def-use webs of `local`, ordered by their first definition.
pub(crate) fn webs(body: &Body, graph: &StmtGraph, local: LocalId) -> Vec<Web> {
    let defs = body.defs_of(local);
    if defs.is_empty() {
        return Vec::new();
    }
    let position: HashMap<StmtId, usize> = defs.iter().enumerate().map(|(i, d)| (*d, i)).collect();
    let mut parent: Vec<usize> = (0..defs.len()).collect();
    let ins = reaching_definitions(body, graph, local);

    let mut reached_uses = Vec::new();
    for use_site in body.uses_of(local) {
        let mut reaching = ins[use_site.index()].iter().map(|d| position[d]);
        let Some(first) = reaching.next() else {
            continue;
        };
        for other in reaching {
            let (a, b) = (find(&mut parent, first), find(&mut parent, other));
            if a != b {
                parent[b] = a;
            }
        }
        reached_uses.push((use_site, first));
    }

    let mut web_of_root: HashMap<usize, usize> = HashMap::new();
    let mut webs: Vec<Web> = Vec::new();
    for (i, def) in defs.iter().enumerate() {
        let root = find(&mut parent, i);
        let web = *web_of_root.entry(root).or_insert_with(|| {
            webs.push(Web {
                defs: Vec::new(),
                uses: Vec::new(),
            });
            webs.len() - 1
        });
        webs[web].defs.push(*def);
    }
    for (use_site, def) in reached_uses {
        let root = find(&mut parent, def);
        if let Some(web) = web_of_root.get(&root) {
            webs[*web].uses.push(use_site);
        }
    }
    webs
}

/// Split each of `locals` with more than one web; returns the rewritten body.
pub(crate) fn split_locals(body: &Body, locals: &[LocalId]) -> Result<(Body, Vec<Split>), BodyError> {
    let graph = StmtGraph::new(body);
    let mut generator = LocalGenerator::from_locals(body.locals());
    let mut stmts = body.stmts().to_vec();
    let mut splits = Vec::new();

    for &local in locals {
        let webs = webs(body, &graph, local);
        if webs.len() < 2 {
            continue;
        }
        let original = body.local(local);
        let mut created = Vec::new();
        for web in &webs[1..] {
            let fresh = generator.fresh(original.name(), original.ty());
            for def in &web.defs {
                if let Some(slot) = stmts[def.index()].def_slot_mut() {
                    if *slot == local {
                        *slot = fresh;
                    }
                }
            }
            for use_site in &web.uses {
                for slot in stmts[use_site.index()].use_slots_mut() {
                    if *slot == local {
                        *slot = fresh;
                    }
                }
            }
            created.push(fresh);
        }
        tracing::debug!(
            method = %body.signature(),
            local = original.name(),
            webs = webs.len(),
            "splitting local"
        );
        splits.push(Split {
            original: local,
            created,
        });
    }

    if splits.is_empty() {
        return Ok((body.clone(), splits));
    }
    let split = body.with_parts(generator.into_locals(), stmts, body.traps().to_vec())?;
    Ok((split, splits))
}
