mod bound;
mod map;
mod validate;

use serde::de::DeserializeOwned;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::errors::PatchError;

pub use bound::{read_bound_fields, BoundFields, PatchPayload};
pub use map::PatchMap;
pub use validate::{max_chars, not_blank, PatchValidator};

/// A partial-update body. `Target` is the domain type it mutates.
pub trait PatchRequest: DeserializeOwned + Send + Sync + 'static {
    type Target: 'static;
}

/// Rules plus mapping table for one request type.
pub struct PatchSchema<R: PatchRequest> {
    pub validator: PatchValidator<R>,
    pub map: PatchMap<R, R::Target>,
}

impl<R: PatchRequest> PatchSchema<R> {
    pub fn new(validator: PatchValidator<R>, map: PatchMap<R, R::Target>) -> Self {
        Self { validator, map }
    }

    /// Every field the schema validates or maps, as registered.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.map.fields().chain(self.validator.fields()) {
            if !names.iter().any(|known| known.eq_ignore_ascii_case(name)) {
                names.push(name);
            }
        }
        names
    }
}

impl<R: PatchRequest> fmt::Debug for PatchSchema<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchSchema")
            .field("rules", &self.validator)
            .field("map", &self.map)
            .finish()
    }
}

/// Schemas for every patchable request type, keyed by type.
///
/// Built once at startup, then shared read-only.
#[derive(Default)]
pub struct PatchRegistry {
    schemas: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for PatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchRegistry")
            .field("schemas", &self.schemas.len())
            .finish()
    }
}

impl PatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<R: PatchRequest>(mut self, schema: PatchSchema<R>) -> Self {
        if self
            .schemas
            .insert(TypeId::of::<R>(), Arc::new(schema))
            .is_some()
        {
            log::warn!("patch schema for {} registered twice", type_name::<R>());
        }
        self
    }

    pub fn schema<R: PatchRequest>(&self) -> Result<Arc<PatchSchema<R>>, PatchError> {
        self.schemas
            .get(&TypeId::of::<R>())
            .cloned()
            .and_then(|schema| schema.downcast::<PatchSchema<R>>().ok())
            .ok_or(PatchError::Configuration(type_name::<R>()))
    }

    /// Check wiring for `R` before serving traffic.
    pub fn require<R: PatchRequest>(&self) -> Result<(), PatchError> {
        self.schema::<R>().map(|_| ())
    }

    /// Bind, then validate, a raw JSON body.
    pub fn accept<R: PatchRequest>(&self, raw: &str) -> Result<ValidatedPatch<R>, PatchError> {
        let schema = self.schema::<R>()?;
        let value = serde_json::from_str(raw)?;
        let payload = PatchPayload::bind(value, &schema.field_names())?;
        Self::validate(schema, payload)
    }

    pub fn accept_value<R: PatchRequest>(
        &self,
        value: serde_json::Value,
    ) -> Result<ValidatedPatch<R>, PatchError> {
        let schema = self.schema::<R>()?;
        let payload = PatchPayload::bind(value, &schema.field_names())?;
        Self::validate(schema, payload)
    }

    fn validate<R: PatchRequest>(
        schema: Arc<PatchSchema<R>>,
        payload: PatchPayload<R>,
    ) -> Result<ValidatedPatch<R>, PatchError> {
        if let Err(errors) = schema.validator.validate(&payload) {
            log::debug!(
                "patch {} rejected: {} field error(s)",
                type_name::<R>(),
                errors.len()
            );
            return Err(PatchError::Validation(errors));
        }
        Ok(ValidatedPatch { payload, schema })
    }
}

/// A patch that passed validation and can be applied to one or more targets.
pub struct ValidatedPatch<R: PatchRequest> {
    payload: PatchPayload<R>,
    schema: Arc<PatchSchema<R>>,
}

impl<R: PatchRequest + fmt::Debug> fmt::Debug for ValidatedPatch<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidatedPatch")
            .field("payload", &self.payload)
            .finish()
    }
}

impl<R: PatchRequest> ValidatedPatch<R> {
    pub fn request(&self) -> &R {
        &self.payload.request
    }

    pub fn bound(&self) -> &BoundFields {
        &self.payload.bound
    }

    pub fn is_bound(&self, field: &str) -> bool {
        self.payload.is_bound(field)
    }

    /// Mutate `target` for every field that is both bound and mapped.
    pub fn apply(&self, target: &mut R::Target) -> Vec<String> {
        self.schema
            .map
            .apply(&self.payload.bound, &self.payload.request, target)
    }

    pub fn into_request(self) -> R {
        self.payload.request
    }
}
