use super::InternalRpcError;
use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

// Type map handed to every RPC handler
#[derive(Default)]
pub struct Context {
    values: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store<T: Send + Sync + 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    pub fn has<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }

    pub fn get<T: 'static>(&self) -> Result<&T, InternalRpcError> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
            .ok_or(InternalRpcError::InternalError(
                "Requested data not found in context",
            ))
    }
}
