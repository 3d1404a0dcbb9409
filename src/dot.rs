//! The `dot` module contains the conversion of an automaton to the graphviz
//! dot format. The functions in this module are used for testing and
//! debugging purposes.

use std::io::Write;

use dot_writer::{Attributes, DotWriter, RankDirection};

use crate::{automaton::Context, ids::StateId};

/// Render the automaton reachable from `start` to a graphviz dot format.
#[allow(dead_code)]
pub(crate) fn automaton_render<W: Write>(
    context: &Context,
    start: StateId,
    label: &str,
    output: &mut W,
) {
    let mut writer = DotWriter::from(output);
    writer.set_pretty_print(true);
    let mut digraph = writer.digraph();
    digraph
        .set_label(label)
        .set_rank_direction(RankDirection::LeftRight);
    let reachable = context.transitively_reachable_states(start);
    for &state_id in &reachable {
        let state = context.state(state_id);
        let mut node = digraph.node_named(&format!("node_{}", state_id.as_usize()));
        if state.is_final() {
            let label = match state.machine_id() {
                Some(machine_id) => format!("{}\nm{}", state_id, machine_id),
                None => state_id.to_string(),
            };
            node.set_label(&label)
                .set_color(dot_writer::Color::Red)
                .set_pen_width(3.0);
        } else {
            node.set_label(&state_id.to_string());
        }
        if state_id == start {
            node.set_shape(dot_writer::Shape::Circle)
                .set_color(dot_writer::Color::Blue)
                .set_pen_width(3.0);
        }
    }
    for &state_id in &reachable {
        for transition in context.state(state_id).transitions() {
            let label = transition
                .symbol()
                .map_or("ε".to_string(), |symbol| symbol.to_string());
            digraph
                .edge(
                    &format!("node_{}", state_id.as_usize()),
                    &format!("node_{}", transition.target().as_usize()),
                )
                .attributes()
                .set_label(&label.replace('"', "\\\""));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RegularExpression;

    #[test]
    fn render_deterministic_automaton_as_dot() {
        let (context, start) = RegularExpression::compile("(a|b)*abb").unwrap();
        let mut f = std::fs::File::create("target/ComplexDfa.dot").unwrap();
        automaton_render(&context, start, "ComplexDfa", &mut f);
    }
}
