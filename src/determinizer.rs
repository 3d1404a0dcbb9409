//! This module contains the subset construction that turns a
//! non-deterministic automaton into a deterministic one, and the merge of
//! several independently tagged deterministic machines into one disjoint
//! multi-pattern machine. The automaton is rewritten in place: every state
//! reachable from the initial state ends up with pairwise-disjoint outgoing
//! symbol ranges.

use std::collections::VecDeque;

use log::trace;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    automaton::{Context, Transition},
    errors::{RedfaErrorKind, Result},
    ids::StateId,
    symbol::Symbol,
};

/// A canonicalization table from sets of state ids to a single canonical
/// state. Keys are deduplicated and sorted, so subset construction is
/// independent of insertion order. The table may be pre-seeded with initial
/// states, each mapped 1:1 to itself; that way a singleton subset containing
/// a seeded state resolves to that exact state and externally visible ids of
/// single-pattern automata survive determinization.
#[derive(Debug, Default)]
pub(crate) struct NondeterministicStatesMap {
    canonical: FxHashMap<Vec<StateId>, StateId>,
}

impl NondeterministicStatesMap {
    pub(crate) fn new(initial_states: &[StateId]) -> Self {
        let mut canonical = FxHashMap::default();
        for &state_id in initial_states {
            canonical.insert(vec![state_id], state_id);
        }
        NondeterministicStatesMap { canonical }
    }

    /// Resolve the canonical state for a set of state ids, allocating a fresh
    /// state from the context on first request. Returns the normalized key,
    /// the canonical id and whether it was newly created.
    pub(crate) fn get_or_insert(
        &mut self,
        context: &mut Context,
        mut state_ids: Vec<StateId>,
    ) -> (Vec<StateId>, StateId, bool) {
        state_ids.sort_unstable();
        state_ids.dedup();
        if let Some(&canonical) = self.canonical.get(&state_ids) {
            return (state_ids, canonical, false);
        }
        let canonical = context.new_state();
        self.canonical.insert(state_ids.clone(), canonical);
        (state_ids, canonical, true)
    }
}

/// One entry of the finest alphabet partition of a virtual state: a symbol
/// covering one maximal cell of code points with identical behavior, and the
/// target states reached on it.
type PartitionEntry = (Symbol, Vec<StateId>);

/// Fold one `(symbol, target)` pair into the accumulating partition. Any
/// overlap between the new symbol and an existing entry splits both into
/// exclusive remainders (kept with their original target sets) plus a shared
/// entry whose target set is the union of both sides. Whatever is left of the
/// new symbol after comparing against every entry becomes a new entry.
fn fold_into_partition(partition: &mut Vec<PartitionEntry>, symbol: Symbol, target: StateId) {
    let mut remainder = symbol;
    let mut index = 0;
    while index < partition.len() && remainder.represents_something() {
        let fragments = Symbol::fragment(&remainder, &partition[index].0);
        if !fragments.shared.represents_something() {
            index += 1;
            continue;
        }
        let (_, entry_targets) = partition.remove(index);
        if fragments.second_exclusive.represents_something() {
            partition.insert(index, (fragments.second_exclusive, entry_targets.clone()));
            index += 1;
        }
        let mut shared_targets = entry_targets;
        if !shared_targets.contains(&target) {
            shared_targets.push(target);
        }
        partition.insert(index, (fragments.shared, shared_targets));
        index += 1;
        remainder = fragments.first_exclusive;
    }
    if remainder.represents_something() {
        partition.push((remainder, vec![target]));
    }
}

/// Convert the automaton reachable from `initial_state` into a deterministic
/// one, in place. Worklist-driven subset construction: virtual states are
/// subsets of original state ids, starting with the singleton containing the
/// initial state. Each subset is processed exactly once, which keeps epsilon
/// self-loops and mutual epsilon cycles safe.
pub fn determinize(context: &mut Context, initial_state: StateId) {
    let mut map = NondeterministicStatesMap::new(&[initial_state]);
    let mut work_list: VecDeque<(Vec<StateId>, StateId)> = VecDeque::new();
    work_list.push_back((vec![initial_state], initial_state));
    let mut processed: FxHashSet<StateId> = FxHashSet::default();

    while let Some((subset, canonical)) = work_list.pop_front() {
        if !processed.insert(canonical) {
            continue;
        }
        trace!("determinize subset {:?} as state {}", subset, canonical);

        // Pull final status through epsilon edges first, so membership of a
        // final state's epsilon closure counts as final.
        for &member in &subset {
            context.become_final_through_epsilon_transitions(member);
        }
        let is_final = subset.iter().any(|&member| context.state(member).is_final());
        let machine_id = subset
            .iter()
            .filter_map(|&member| {
                let state = context.state(member);
                // Final but untagged members do not contribute an id.
                if state.is_final() {
                    state.machine_id()
                } else {
                    None
                }
            })
            .min();

        // The finest alphabet partition over all reachable transitions of all
        // members.
        let mut partition: Vec<PartitionEntry> = Vec::new();
        for &member in &subset {
            for transition in context.reachable_transitions(member) {
                let symbol = transition
                    .symbol()
                    .cloned()
                    .expect("reachable transitions never carry epsilon");
                fold_into_partition(&mut partition, symbol, transition.target());
            }
        }

        let mut new_transitions = Vec::with_capacity(partition.len());
        for (symbol, targets) in partition {
            let (key, target_state, _) = map.get_or_insert(context, targets);
            if !processed.contains(&target_state) {
                work_list.push_back((key, target_state));
            }
            new_transitions.push(Transition::new(symbol, target_state));
        }

        let state = context.state_mut(canonical);
        state.remove_all_transitions();
        state.add_transitions(new_transitions);
        if is_final {
            state.set_final();
            if let Some(machine_id) = machine_id {
                state.set_machine_id(machine_id);
            }
        }
    }
}

/// Combine several already-deterministic automata, each externally tagged by
/// assigning a machine id to its final states, into one disjoint
/// multi-pattern automaton. Builds a fresh epsilon-fan-in state with an
/// epsilon transition to every machine's initial state and determinizes it.
/// Fails with a non-disjunctive final states error if determinization
/// produces a final state that cannot be attributed to one source machine.
pub fn merge(context: &mut Context, machines: &[StateId]) -> Result<StateId> {
    let initial_state = context.new_state();
    for &machine in machines {
        context.add_epsilon_transition(initial_state, machine);
    }
    trace!("merge {} machines into state {}", machines.len(), initial_state);
    determinize(context, initial_state);

    for state_id in context.transitively_reachable_states(initial_state) {
        let state = context.state(state_id);
        if state.is_final() && state.machine_id().is_none() {
            return Err(RedfaErrorKind::NonDisjunctiveFinalStates(state_id.id()).into());
        }
    }
    Ok(initial_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ids::MachineId, parser::RegularExpression};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn assert_deterministic(context: &Context, start: StateId) {
        for state_id in context.transitively_reachable_states(start) {
            let transitions = context.state(state_id).transitions();
            assert!(
                transitions.iter().all(|t| !t.is_epsilon()),
                "state {} still has epsilon transitions",
                state_id
            );
            for (i, a) in transitions.iter().enumerate() {
                for b in transitions.iter().skip(i + 1) {
                    assert!(
                        !Symbol::fragment(a.symbol().unwrap(), b.symbol().unwrap())
                            .shared
                            .represents_something(),
                        "state {} has overlapping transitions",
                        state_id
                    );
                }
            }
        }
    }

    #[test]
    fn fold_splits_overlapping_symbols_into_cells() {
        let mut ctx = Context::new();
        let t1 = ctx.new_state();
        let t2 = ctx.new_state();
        let mut partition = Vec::new();
        let mut a_to_m = Symbol::empty();
        a_to_m.add_interval(crate::Interval::new('a' as u32, 'm' as u32 + 1));
        let mut h_to_z = Symbol::empty();
        h_to_z.add_interval(crate::Interval::new('h' as u32, 'z' as u32 + 1));
        fold_into_partition(&mut partition, a_to_m, t1);
        fold_into_partition(&mut partition, h_to_z, t2);
        assert_eq!(partition.len(), 3);
        // a..h goes to t1 only, h..=m to both, n..=z to t2 only.
        let cell = |code: u32| {
            partition
                .iter()
                .find(|(symbol, _)| symbol.contains(code))
                .map(|(_, targets)| targets.clone())
                .unwrap()
        };
        assert_eq!(cell('a' as u32), vec![t1]);
        assert_eq!(cell('h' as u32), vec![t1, t2]);
        assert_eq!(cell('z' as u32), vec![t2]);
        // The cells are pairwise disjoint.
        for (i, (a, _)) in partition.iter().enumerate() {
            for (b, _) in partition.iter().skip(i + 1) {
                assert!(!Symbol::fragment(a, b).shared.represents_something());
            }
        }
    }

    #[test]
    fn determinize_keeps_the_seeded_initial_state() {
        init();
        let mut ctx = Context::new();
        let start = RegularExpression::new("a|b", &mut ctx).generate().unwrap();
        // generate determinizes already; the returned state is the automaton
        // entry the parser created, not a replacement.
        assert!(start.as_usize() < ctx.len());
        assert_deterministic(&ctx, start);
        assert_eq!(ctx.longest_match(start, "a", None), Some("a"));
    }

    #[test]
    fn determinize_resolves_epsilon_cycles() {
        init();
        let mut ctx = Context::new();
        // (a*)* produces epsilon cycles between the star entries.
        let start = RegularExpression::new("(a*)*", &mut ctx).generate().unwrap();
        assert_deterministic(&ctx, start);
        assert_eq!(ctx.longest_match(start, "", None), Some(""));
        assert_eq!(ctx.longest_match(start, "aaa", None), Some("aaa"));
    }

    #[test]
    fn merged_machines_answer_per_machine_queries() {
        init();
        let mut ctx = Context::new();
        let numbers = RegularExpression::new(r"\d+", &mut ctx).generate().unwrap();
        let idents = RegularExpression::new(r"[a-z]\w*", &mut ctx)
            .generate()
            .unwrap();
        ctx.tag_machine(numbers, MachineId::new(1));
        ctx.tag_machine(idents, MachineId::new(2));
        let merged = merge(&mut ctx, &[numbers, idents]).unwrap();
        assert_deterministic(&ctx, merged);

        assert_eq!(
            ctx.longest_match(merged, "1234", Some(MachineId::new(1))),
            Some("1234")
        );
        assert_eq!(ctx.longest_match(merged, "1234", Some(MachineId::new(2))), None);
        assert_eq!(
            ctx.longest_match(merged, "ab_9", Some(MachineId::new(2))),
            Some("ab_9")
        );
        assert_eq!(ctx.longest_match(merged, "ab_9", Some(MachineId::new(1))), None);
    }

    #[test]
    fn merge_prefers_the_lowest_machine_id_on_shared_finals() {
        init();
        let mut ctx = Context::new();
        // Both patterns accept "ab"; the shared final state must be
        // attributed to the lower machine id.
        let first = RegularExpression::new("ab", &mut ctx).generate().unwrap();
        let second = RegularExpression::new("a(b|c)", &mut ctx).generate().unwrap();
        ctx.tag_machine(first, MachineId::new(2));
        ctx.tag_machine(second, MachineId::new(5));
        let merged = merge(&mut ctx, &[first, second]).unwrap();

        assert_eq!(
            ctx.longest_match(merged, "ab", Some(MachineId::new(2))),
            Some("ab")
        );
        assert_eq!(
            ctx.longest_match(merged, "ac", Some(MachineId::new(5))),
            Some("ac")
        );
        // "ab" is claimed by machine 2, the lower id.
        assert_eq!(ctx.longest_match(merged, "ab", Some(MachineId::new(5))), None);
    }

    #[test]
    fn merge_of_untagged_machines_is_non_disjunctive() {
        init();
        let mut ctx = Context::new();
        let first = RegularExpression::new("ab", &mut ctx).generate().unwrap();
        let second = RegularExpression::new("cd", &mut ctx).generate().unwrap();
        // No tag_machine calls: the merged final states cannot be attributed.
        let err = merge(&mut ctx, &[first, second]).unwrap_err();
        assert!(matches!(
            *err.source,
            RedfaErrorKind::NonDisjunctiveFinalStates(_)
        ));
    }
}
