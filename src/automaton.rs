//! This module contains the automaton graph: states, transitions and the
//! [Context] that owns them. States form a shared, possibly cyclic graph, so
//! they live in an arena indexed by [StateId] and transitions hold ids
//! instead of references. One `Context` serves exactly one construction /
//! determinization session; ids are never unique across contexts.

use std::collections::VecDeque;

use log::trace;
use rustc_hash::FxHashSet;

use crate::{
    ids::{MachineId, StateId, StateIdBase},
    symbol::Symbol,
};

/// A transition of the automaton. A transition without a symbol is an
/// epsilon transition and consumes no input. The target is not owned; it is
/// an id into the transition's [Context].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    symbol: Option<Symbol>,
    target: StateId,
}

impl Transition {
    /// Create a symbol-bearing transition.
    pub fn new(symbol: Symbol, target: StateId) -> Self {
        Transition {
            symbol: Some(symbol),
            target,
        }
    }

    /// Create an epsilon transition.
    pub fn epsilon(target: StateId) -> Self {
        Transition {
            symbol: None,
            target,
        }
    }

    /// The symbol guarding the transition, `None` for epsilon transitions.
    pub fn symbol(&self) -> Option<&Symbol> {
        self.symbol.as_ref()
    }

    /// Returns true if the transition consumes no input.
    pub fn is_epsilon(&self) -> bool {
        self.symbol.is_none()
    }

    /// The target state of the transition.
    pub fn target(&self) -> StateId {
        self.target
    }
}

/// A state of the automaton. Transitions are owned by the state and are
/// append-only until determinization rewrites them in place.
#[derive(Debug, Clone)]
pub struct State {
    id: StateId,
    is_final: bool,
    machine_id: Option<MachineId>,
    transitions: Vec<Transition>,
}

impl State {
    fn new(id: StateId) -> Self {
        State {
            id,
            is_final: false,
            machine_id: None,
            transitions: Vec::new(),
        }
    }

    /// The id of the state, unique within its context.
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Returns true if the state accepts.
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Mark the state as accepting.
    pub fn set_final(&mut self) {
        self.is_final = true;
    }

    /// The id of the source machine this final state belongs to, if it was
    /// tagged for a multi-pattern merge.
    pub fn machine_id(&self) -> Option<MachineId> {
        self.machine_id
    }

    /// Tag the state with the machine it originates from.
    pub fn set_machine_id(&mut self, machine_id: MachineId) {
        self.machine_id = Some(machine_id);
    }

    /// The outgoing transitions, in insertion order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Append a transition.
    pub fn add_transition(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Append several transitions, keeping their order.
    pub fn add_transitions<I>(&mut self, transitions: I)
    where
        I: IntoIterator<Item = Transition>,
    {
        self.transitions.extend(transitions);
    }

    /// Remove every outgoing transition. Determinization uses this to replace
    /// the non-deterministic transitions of a state with deterministic ones.
    pub fn remove_all_transitions(&mut self) {
        self.transitions.clear();
    }
}

/// The arena and id allocator for one construction session. Allocated ids
/// grow monotonically and are never reused.
#[derive(Debug, Default)]
pub struct Context {
    states: Vec<State>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Context::default()
    }

    /// Allocate a fresh state and return its id.
    pub fn new_state(&mut self) -> StateId {
        let id = StateId::new(self.states.len() as StateIdBase);
        self.states.push(State::new(id));
        id
    }

    /// The number of states allocated so far.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no state has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Borrow a state.
    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.as_usize()]
    }

    /// Borrow a state mutably.
    pub fn state_mut(&mut self, id: StateId) -> &mut State {
        &mut self.states[id.as_usize()]
    }

    /// Append a symbol-bearing transition from `from` to `target`.
    pub fn add_transition(&mut self, from: StateId, symbol: Symbol, target: StateId) {
        self.state_mut(from).add_transition(Transition::new(symbol, target));
    }

    /// Append an epsilon transition from `from` to `target`.
    pub fn add_epsilon_transition(&mut self, from: StateId, target: StateId) {
        self.state_mut(from).add_transition(Transition::epsilon(target));
    }

    /// Collect the symbol-bearing transitions reachable from a state by zero
    /// or more epsilon hops, in discovery order. Breadth-first over a work
    /// queue seeded with the state's own transitions; every dequeued epsilon
    /// transition enqueues its target's transitions. Each transition is
    /// enqueued at most once, which guards against epsilon cycles.
    pub fn reachable_transitions(&self, start: StateId) -> Vec<Transition> {
        let mut result = Vec::new();
        // A transition's identity is (owning state, index in its list).
        let mut queue: VecDeque<(StateId, usize)> = (0..self.state(start).transitions.len())
            .map(|i| (start, i))
            .collect();
        let mut enqueued: FxHashSet<(StateId, usize)> = queue.iter().copied().collect();
        while let Some((state_id, index)) = queue.pop_front() {
            let transition = &self.state(state_id).transitions[index];
            if transition.is_epsilon() {
                let target = transition.target();
                for i in 0..self.state(target).transitions.len() {
                    if enqueued.insert((target, i)) {
                        queue.push_back((target, i));
                    }
                }
            } else {
                result.push(transition.clone());
            }
        }
        result
    }

    /// Collect every state reachable from (and including) the given state
    /// over all outgoing transitions, epsilon and symbol-bearing alike.
    /// Breadth-first, deduplicated by id, cycle-safe.
    pub fn transitively_reachable_states(&self, start: StateId) -> Vec<StateId> {
        let mut result = vec![start];
        let mut visited: FxHashSet<StateId> = FxHashSet::default();
        visited.insert(start);
        let mut i = 0;
        while i < result.len() {
            for transition in self.state(result[i]).transitions() {
                if visited.insert(transition.target()) {
                    result.push(transition.target());
                }
            }
            i += 1;
        }
        result
    }

    /// The states reachable from `start` by following only epsilon
    /// transitions, excluding `start` itself.
    fn epsilon_reachable_states(&self, start: StateId) -> Vec<StateId> {
        let mut result = Vec::new();
        let mut visited: FxHashSet<StateId> = FxHashSet::default();
        visited.insert(start);
        let mut queue: VecDeque<StateId> = VecDeque::new();
        queue.push_back(start);
        while let Some(state_id) = queue.pop_front() {
            for transition in self.state(state_id).transitions() {
                if transition.is_epsilon() && visited.insert(transition.target()) {
                    result.push(transition.target());
                    queue.push_back(transition.target());
                }
            }
        }
        result
    }

    /// Make a state final if some state reachable from it purely via epsilon
    /// edges is final, adopting that state's machine id. Forward search,
    /// cycle-safe.
    pub fn become_final_through_epsilon_transitions(&mut self, state_id: StateId) {
        if self.state(state_id).is_final() {
            return;
        }
        let mut adopted: Option<MachineId> = None;
        let mut found = false;
        for reachable in self.epsilon_reachable_states(state_id) {
            let state = self.state(reachable);
            if state.is_final() {
                found = true;
                adopted = match (adopted, state.machine_id()) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
        }
        if found {
            trace!("state {} becomes final through epsilon transitions", state_id);
            let state = self.state_mut(state_id);
            state.set_final();
            if let Some(machine_id) = adopted {
                state.set_machine_id(machine_id);
            }
        }
    }

    /// Push a state's own final status and machine id onto every state
    /// epsilon-reachable from it. Does nothing if the state is not final.
    pub fn expand_final_through_epsilon_transitions(&mut self, state_id: StateId) {
        if !self.state(state_id).is_final() {
            return;
        }
        let machine_id = self.state(state_id).machine_id();
        for reachable in self.epsilon_reachable_states(state_id) {
            trace!("state {} expands final status to {}", state_id, reachable);
            let state = self.state_mut(reachable);
            state.set_final();
            if let Some(machine_id) = machine_id {
                state.set_machine_id(machine_id);
            }
        }
    }

    /// Tag every final state reachable from `start` with the given machine
    /// id. This is the external tagging step that precedes a multi-pattern
    /// merge.
    pub fn tag_machine(&mut self, start: StateId, machine_id: MachineId) {
        for state_id in self.transitively_reachable_states(start) {
            let state = self.state_mut(state_id);
            if state.is_final() {
                state.set_machine_id(machine_id);
            }
        }
    }

    /// Scan `input` from `start` one code point at a time and return the
    /// longest matched prefix, or `None` if no visited state ever accepted.
    /// At every visited state the consumed length is recorded as the best
    /// match so far if the state is final and, when `machine_id` is given,
    /// tagged with that machine. This realizes greedy longest-match
    /// (maximal munch) semantics. The automaton must be deterministic; by
    /// construction at most one transition per state contains a code point.
    pub fn longest_match<'i>(
        &self,
        start: StateId,
        input: &'i str,
        machine_id: Option<MachineId>,
    ) -> Option<&'i str> {
        let accepts = |state: &State| {
            state.is_final()
                && machine_id.map_or(true, |requested| state.machine_id() == Some(requested))
        };
        let mut current = start;
        let mut best: Option<usize> = None;
        if accepts(self.state(current)) {
            best = Some(0);
        }
        for (index, ch) in input.char_indices() {
            let code = ch as u32;
            let Some(transition) = self
                .state(current)
                .transitions()
                .iter()
                .find(|t| t.symbol().is_some_and(|s| s.contains(code)))
            else {
                break;
            };
            current = transition.target();
            if accepts(self.state(current)) {
                best = Some(index + ch.len_utf8());
            }
        }
        best.map(|length| &input[..length])
    }
}
