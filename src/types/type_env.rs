//! Scoped typing environment.
//!
//! The environment is a stack of frames; lookups walk from the innermost
//! frame outwards. Frames are persistent maps, so entering a scope is a
//! cheap structural copy.

use super::{FreeVars, Substitution, TypeScheme};
use im::HashMap;

/// Typing context mapping identifiers to schemes, with lexical scopes.
#[derive(Debug, Clone)]
pub struct TypeEnv {
    frames: Vec<HashMap<String, TypeScheme>>,
}

impl TypeEnv {
    /// Creates an environment with a single empty frame.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    /// Pushes a fresh scope.
    pub fn enter_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pops the innermost scope.
    ///
    /// The outermost frame is never popped.
    pub fn exit_scope(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Binds a name in the innermost scope.
    pub fn bind(&mut self, name: impl Into<String>, scheme: TypeScheme) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.into(), scheme);
        }
    }

    /// Looks up a name, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    /// Returns true if the name is bound in any scope.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Free variables of every scheme in scope; used for generalization.
    pub fn free_vars(&self) -> FreeVars {
        let mut out = FreeVars::new();
        for frame in &self.frames {
            for scheme in frame.values() {
                out.extend(scheme.free_vars());
            }
        }
        out
    }

    /// Applies a substitution to every scheme in scope.
    pub fn apply_substitution(&mut self, subst: &Substitution) {
        for frame in &mut self.frames {
            let updated: HashMap<String, TypeScheme> = frame
                .iter()
                .map(|(name, scheme)| (name.clone(), subst.apply_to_scheme(scheme)))
                .collect();
            *frame = updated;
        }
    }

    /// Current scope depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

impl Default for TypeEnv {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Type;

    #[test]
    fn test_shadowing_and_scope_exit() {
        let mut env = TypeEnv::new();
        env.bind("x", TypeScheme::monomorphic(Type::Integer));
        env.enter_scope();
        env.bind("x", TypeScheme::monomorphic(Type::Binary));
        assert_eq!(env.lookup("x").unwrap().body, Type::Binary);
        env.exit_scope();
        assert_eq!(env.lookup("x").unwrap().body, Type::Integer);
    }

    #[test]
    fn test_outermost_frame_survives() {
        let mut env = TypeEnv::new();
        env.exit_scope();
        env.bind("x", TypeScheme::monomorphic(Type::Atom));
        assert!(env.contains("x"));
        assert_eq!(env.depth(), 1);
    }
}
