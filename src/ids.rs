macro_rules! impl_id {
    ($name:ident, $tp:ty) => {
        /// The ID type $name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name($tp);

        impl $name {
            /// Create a new id.
            #[inline]
            pub const fn new(index: $tp) -> Self {
                $name(index)
            }

            /// Get the id as usize.
            #[inline]
            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            /// Get the id as $tp.
            #[inline]
            pub fn id(&self) -> $tp {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$tp> for $name {
            fn from(index: $tp) -> Self {
                $name::new(index)
            }
        }
    };
}

/// The ID type for automaton states. Ids are allocated by a [crate::Context]
/// and are unique within one construction session, never across sessions.
pub type StateIdBase = u32;
impl_id!(StateId, StateIdBase);

/// The ID type identifying which original pattern a merged automaton's final
/// state belongs to. Assigned externally before a merge; lower ids win when
/// several tagged final states coincide in one deterministic state.
pub type MachineIdBase = u32;
impl_id!(MachineId, MachineIdBase);
