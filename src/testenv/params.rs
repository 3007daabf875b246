use crate::error::{Result, TestEnvError};
use crate::modules::ParamSet;
use log::debug;
use std::any::{type_name, TypeId};
use std::collections::{BTreeMap, HashMap};

type NormalizeFn = fn(serde_json::Value) -> Result<serde_json::Value>;

fn normalize<P: ParamSet>(raw: serde_json::Value) -> Result<serde_json::Value> {
    let params: P = serde_json::from_value(raw).map_err(|e| {
        TestEnvError::Serialization(format!("failed to decode {} params: {e}", P::SUBSPACE))
    })?;
    Ok(serde_json::to_value(&params)?)
}

/// Shape of a registered parameter set
#[derive(Debug, Clone, Copy)]
pub struct ParamTypeDescriptor {
    subspace: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    normalize: NormalizeFn,
}

impl ParamTypeDescriptor {
    pub fn of<P: ParamSet>() -> ParamTypeDescriptor {
        ParamTypeDescriptor {
            subspace: P::SUBSPACE,
            type_name: type_name::<P>(),
            type_id: TypeId::of::<P>(),
            normalize: normalize::<P>,
        }
    }

    pub fn subspace(&self) -> &'static str {
        self.subspace
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn is<P: ParamSet>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    /// Decode raw params JSON through the registered type and re-encode it.
    /// Fails when the JSON does not have the registered shape.
    pub fn decode(&self, raw: serde_json::Value) -> Result<serde_json::Value> {
        (self.normalize)(raw)
    }
}

/// Parameter types known to one harness. Registration is append-only and
/// keyed by type; lookups go through the subspace name.
#[derive(Debug, Clone, Default)]
pub struct ParamTypeRegistry {
    by_type: HashMap<TypeId, ParamTypeDescriptor>,
    by_subspace: BTreeMap<&'static str, TypeId>,
}

impl ParamTypeRegistry {
    pub fn new() -> ParamTypeRegistry {
        ParamTypeRegistry::default()
    }

    /// Register `P`. Returns false if `P` is already registered or its
    /// subspace is taken by another type; the first registration wins.
    pub fn register<P: ParamSet>(&mut self) -> bool {
        let descriptor = ParamTypeDescriptor::of::<P>();
        if self.by_type.contains_key(&descriptor.type_id)
            || self.by_subspace.contains_key(descriptor.subspace)
        {
            return false;
        }
        debug!(
            "registered param type {} under {}",
            descriptor.type_name, descriptor.subspace
        );
        self.by_subspace
            .insert(descriptor.subspace, descriptor.type_id);
        self.by_type.insert(descriptor.type_id, descriptor);
        true
    }

    pub fn register_param_set<P: ParamSet>(&mut self, _params: &P) -> bool {
        self.register::<P>()
    }

    pub fn lookup(&self, subspace: &str) -> Option<&ParamTypeDescriptor> {
        self.by_subspace
            .get(subspace)
            .and_then(|type_id| self.by_type.get(type_id))
    }

    pub fn lookup_type<P: ParamSet>(&self) -> Option<&ParamTypeDescriptor> {
        self.by_type.get(&TypeId::of::<P>())
    }

    pub fn subspaces(&self) -> Vec<&'static str> {
        self.by_subspace.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}
