use std::fmt;

use super::BoundFields;

type Mutation<R, M> = Box<dyn Fn(&R, &mut M) + Send + Sync>;

/// Declarative `field -> mutation` table. Registering a field again replaces
/// its mutation.
pub struct PatchMap<R, M> {
    entries: Vec<(String, Mutation<R, M>)>,
}

impl<R, M> Default for PatchMap<R, M> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<R, M> fmt::Debug for PatchMap<R, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(field, _)| field))
            .finish()
    }
}

impl<R, M> PatchMap<R, M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map<F>(mut self, field: &str, mutation: F) -> Self
    where
        F: Fn(&R, &mut M) + Send + Sync + 'static,
    {
        let mutation: Mutation<R, M> = Box::new(mutation);
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(field))
        {
            Some(entry) => entry.1 = mutation,
            None => self.entries.push((field.to_string(), mutation)),
        }
        self
    }

    /// Copy one request value onto the target.
    pub fn assign<V, G, S>(self, field: &str, get: G, set: S) -> Self
    where
        G: Fn(&R) -> V + Send + Sync + 'static,
        S: Fn(&mut M, V) + Send + Sync + 'static,
    {
        self.map(field, move |request, target| set(target, get(request)))
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case(field))
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(field, _)| field.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run the mutations whose field is bound. Returns the fields applied,
    /// in table order.
    pub fn apply(&self, bound: &BoundFields, request: &R, target: &mut M) -> Vec<String> {
        let mut applied = Vec::new();
        for (field, mutation) in &self.entries {
            if bound.contains(field) {
                mutation(request, target);
                applied.push(field.clone());
            }
        }
        applied
    }
}
